//! Cart line items and their identity rule.
//!
//! A line item is a jersey snapshot plus a configuration (size, optional
//! name/number personalisation, patch set). Two additions with the same
//! configuration collapse into one line whose quantity grows; any
//! difference produces a separate line.

use std::collections::BTreeSet;
use std::num::NonZeroU32;

use serde::{Deserialize, Serialize};

use super::catalog::Jersey;
use super::id::{CartItemId, JerseyId};
use super::price::Price;
use super::size::Size;
use crate::pricing;

/// Patch labels offered on the jersey page.
pub const STANDARD_PATCHES: [&str; 4] = [
    "Liga",
    "Liga Europa",
    "Liga dos Campeões",
    "Campeão da Liga",
];

/// Name/number printed on the jersey.
///
/// Blank strings are treated as absent, so a form that submits `""` for an
/// untouched field does not trigger the personalisation surcharge. Stored
/// data goes through the same rule when deserialized.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "RawCustomization")]
pub struct Customization {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub number: Option<String>,
}

#[derive(Deserialize)]
struct RawCustomization {
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    number: Option<String>,
}

impl From<RawCustomization> for Customization {
    fn from(raw: RawCustomization) -> Self {
        Self::new(raw.name, raw.number)
    }
}

impl Customization {
    /// Build a personalisation, dropping blank fields.
    #[must_use]
    pub fn new(name: Option<String>, number: Option<String>) -> Self {
        Self {
            name: name.filter(|s| !s.trim().is_empty()),
            number: number.filter(|s| !s.trim().is_empty()),
        }
    }

    /// No personalisation.
    #[must_use]
    pub const fn none() -> Self {
        Self {
            name: None,
            number: None,
        }
    }

    /// Returns true if either a name or a number is printed.
    #[must_use]
    pub const fn is_present(&self) -> bool {
        self.name.is_some() || self.number.is_some()
    }
}

/// Set of selected patch labels.
///
/// Order of selection does not matter and duplicates collapse. Serialized as
/// a sorted JSON array.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PatchSet(BTreeSet<String>);

impl PatchSet {
    /// An empty patch set.
    #[must_use]
    pub const fn new() -> Self {
        Self(BTreeSet::new())
    }

    /// Number of distinct patches.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns true if no patch is selected.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Patch labels in sorted order.
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }

    /// Patch labels in sorted order, owned.
    #[must_use]
    pub fn to_vec(&self) -> Vec<String> {
        self.0.iter().cloned().collect()
    }

    /// Returns true if every label is one the storefront offers.
    #[must_use]
    pub fn is_standard(&self) -> bool {
        self.0.iter().all(|p| STANDARD_PATCHES.contains(&p.as_str()))
    }
}

impl<S: Into<String>> FromIterator<S> for PatchSet {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self(iter.into_iter().map(Into::into).collect())
    }
}

/// Errors raised when building a line item from untrusted input.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum CartItemError {
    /// Quantity must be at least one.
    #[error("quantity must be at least 1")]
    ZeroQuantity,
}

/// Identity of a cart line.
///
/// Two lines are the same iff jersey, size, personalisation and patch set
/// are all equal.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct LineKey {
    pub jersey_id: JerseyId,
    pub size: Size,
    pub customization: Customization,
    pub patches: PatchSet,
}

impl LineKey {
    #[must_use]
    pub const fn new(
        jersey_id: JerseyId,
        size: Size,
        customization: Customization,
        patches: PatchSet,
    ) -> Self {
        Self {
            jersey_id,
            size,
            customization,
            patches,
        }
    }
}

/// One entry in a cart.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartLineItem {
    /// Server-assigned id; only set for carts backed by the cart API.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub remote_id: Option<CartItemId>,
    /// Catalog snapshot taken when the line was created.
    pub jersey: Jersey,
    pub size: Size,
    pub quantity: NonZeroU32,
    #[serde(flatten)]
    pub customization: Customization,
    #[serde(default)]
    pub patches: PatchSet,
    /// Unit price fixed at creation time.
    pub final_unit_price: Price,
}

impl CartLineItem {
    /// Create a new line with quantity 1, pricing it from the jersey's
    /// current base price.
    #[must_use]
    pub fn new(jersey: Jersey, size: Size, customization: Customization, patches: PatchSet) -> Self {
        let final_unit_price = pricing::compute_unit_price(
            jersey.base_price(),
            customization.is_present(),
            patches.len(),
        );
        Self {
            remote_id: None,
            jersey,
            size,
            quantity: NonZeroU32::MIN,
            customization,
            patches,
            final_unit_price,
        }
    }

    /// Rebuild a line from stored fields (cart API rows, guest storage).
    ///
    /// # Errors
    ///
    /// Returns `CartItemError::ZeroQuantity` if `quantity` is zero.
    pub fn from_parts(
        remote_id: Option<CartItemId>,
        jersey: Jersey,
        size: Size,
        quantity: u32,
        customization: Customization,
        patches: PatchSet,
        final_unit_price: Price,
    ) -> Result<Self, CartItemError> {
        let quantity = NonZeroU32::new(quantity).ok_or(CartItemError::ZeroQuantity)?;
        Ok(Self {
            remote_id,
            jersey,
            size,
            quantity,
            customization,
            patches,
            final_unit_price,
        })
    }

    /// The identity key of this line.
    #[must_use]
    pub fn key(&self) -> LineKey {
        LineKey::new(
            self.jersey.id,
            self.size,
            self.customization.clone(),
            self.patches.clone(),
        )
    }

    /// Returns true if this line has the given identity.
    #[must_use]
    pub fn matches(&self, key: &LineKey) -> bool {
        self.jersey.id == key.jersey_id
            && self.size == key.size
            && self.customization == key.customization
            && self.patches == key.patches
    }

    /// Quantity as a plain integer.
    #[must_use]
    pub const fn quantity(&self) -> u32 {
        self.quantity.get()
    }

    /// Add one unit. The unit price is left untouched.
    pub fn increment(&mut self) {
        self.quantity = self.quantity.saturating_add(1);
    }

    /// `final_unit_price × quantity`.
    #[must_use]
    pub fn line_total(&self) -> Price {
        self.final_unit_price * self.quantity.get()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::types::id::{JerseyTypeId, TeamId};
    use crate::types::JerseyType;

    fn jersey(id: i32, price_cents: i64) -> Jersey {
        Jersey {
            id: JerseyId::new(id),
            team_id: TeamId::new(1),
            team_name: Some("Sporting".to_owned()),
            season: "2024/25".to_owned(),
            jersey_type_id: JerseyTypeId::new(1),
            jersey_type: Some(JerseyType {
                id: None,
                name: "Home".to_owned(),
                original_price: Price::from_cents(price_cents),
                current_price: Price::from_cents(price_cents),
                description: None,
            }),
            main_color: "green".to_owned(),
            description: None,
            images: Vec::new(),
        }
    }

    #[test]
    fn test_customization_blank_fields_are_absent() {
        let c = Customization::new(Some("  ".to_owned()), Some(String::new()));
        assert!(!c.is_present());
        let c = Customization::new(None, Some("7".to_owned()));
        assert!(c.is_present());
    }

    #[test]
    fn test_deserialize_drops_blank_fields() {
        let c: Customization = serde_json::from_str(r#"{"name": "", "number": " "}"#).unwrap();
        assert_eq!(c, Customization::none());
        let c: Customization = serde_json::from_str(r#"{"number": "9"}"#).unwrap();
        assert_eq!(c, Customization::new(None, Some("9".to_owned())));
    }

    #[test]
    fn test_patch_set_is_order_independent() {
        let a: PatchSet = ["Liga Europa", "Liga"].into_iter().collect();
        let b: PatchSet = ["Liga", "Liga Europa", "Liga"].into_iter().collect();
        assert_eq!(a, b);
        assert_eq!(a.len(), 2);
        assert_eq!(serde_json::to_string(&a).unwrap(), r#"["Liga","Liga Europa"]"#);
        assert!(a.is_standard());
    }

    #[test]
    fn test_new_line_prices_extras() {
        let patches: PatchSet = ["Liga", "Campeão da Liga"].into_iter().collect();
        let line = CartLineItem::new(
            jersey(1, 2000),
            Size::M,
            Customization::new(Some("EUSÉBIO".to_owned()), Some("10".to_owned())),
            patches,
        );
        assert_eq!(line.quantity(), 1);
        assert_eq!(line.final_unit_price, Price::from_cents(2700));
    }

    #[test]
    fn test_increment_keeps_price() {
        let mut line = CartLineItem::new(jersey(1, 2000), Size::L, Customization::none(), PatchSet::new());
        line.increment();
        line.increment();
        assert_eq!(line.quantity(), 3);
        assert_eq!(line.final_unit_price, Price::from_cents(2000));
        assert_eq!(line.line_total(), Price::from_cents(6000));
    }

    #[test]
    fn test_matches_requires_every_field() {
        let line = CartLineItem::new(jersey(1, 2000), Size::L, Customization::none(), PatchSet::new());
        assert!(line.matches(&line.key()));

        let other_size = LineKey::new(JerseyId::new(1), Size::XL, Customization::none(), PatchSet::new());
        assert!(!line.matches(&other_size));

        let other_name = LineKey::new(
            JerseyId::new(1),
            Size::L,
            Customization::new(Some("A".to_owned()), None),
            PatchSet::new(),
        );
        assert!(!line.matches(&other_name));

        let other_patches = LineKey::new(
            JerseyId::new(1),
            Size::L,
            Customization::none(),
            ["Liga"].into_iter().collect(),
        );
        assert!(!line.matches(&other_patches));
    }

    #[test]
    fn test_from_parts_rejects_zero_quantity() {
        let err = CartLineItem::from_parts(
            None,
            jersey(1, 2000),
            Size::S,
            0,
            Customization::none(),
            PatchSet::new(),
            Price::from_cents(2000),
        )
        .unwrap_err();
        assert_eq!(err, CartItemError::ZeroQuantity);
    }

    #[test]
    fn test_guest_serialization_has_no_remote_id() {
        let line = CartLineItem::new(
            jersey(5, 2000),
            Size::M,
            Customization::new(Some("RUI".to_owned()), None),
            PatchSet::new(),
        );
        let json = serde_json::to_value(&line).unwrap();
        assert!(json.get("remote_id").is_none());
        assert_eq!(json["name"], "RUI");
        assert_eq!(json["quantity"], 1);

        let back: CartLineItem = serde_json::from_value(json).unwrap();
        assert_eq!(back, line);
    }

    #[test]
    fn test_deserialize_rejects_zero_quantity() {
        let line = CartLineItem::new(jersey(5, 2000), Size::M, Customization::none(), PatchSet::new());
        let mut json = serde_json::to_value(&line).unwrap();
        json["quantity"] = serde_json::json!(0);
        assert!(serde_json::from_value::<CartLineItem>(json).is_err());
    }
}
