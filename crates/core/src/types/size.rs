//! Jersey sizes.

use core::fmt;

use serde::{Deserialize, Serialize};

/// Error returned when a size label is not one the shop sells.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
#[error("unknown size '{0}' (expected one of S, M, L, XL, XXL, XXXL)")]
pub struct SizeError(pub String);

/// The fixed set of sizes a jersey can be ordered in.
///
/// Serialized as the bare label (`"M"`, `"XXL"`), which is also what the
/// cart API stores.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Size {
    S,
    M,
    L,
    XL,
    XXL,
    XXXL,
}

impl Size {
    /// All sizes, smallest first.
    pub const ALL: [Self; 6] = [Self::S, Self::M, Self::L, Self::XL, Self::XXL, Self::XXXL];

    /// The label used on the wire and in the UI.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::S => "S",
            Self::M => "M",
            Self::L => "L",
            Self::XL => "XL",
            Self::XXL => "XXL",
            Self::XXXL => "XXXL",
        }
    }
}

impl fmt::Display for Size {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Size {
    type Err = SizeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let label = s.trim().to_ascii_uppercase();
        Self::ALL
            .into_iter()
            .find(|size| size.as_str() == label)
            .ok_or_else(|| SizeError(s.to_owned()))
    }
}
