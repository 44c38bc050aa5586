//! Session-related types.
//!
//! The authentication collaborator publishes one of these values whenever a
//! customer signs in or out. The cart engine never reads ambient auth state.

use secrecy::SecretString;

use jersey_shop_core::UserId;

/// Identity of the signed-in customer. Display only; pricing never looks
/// at it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionUser {
    /// User's database ID.
    pub id: UserId,
    /// Name shown in the header.
    pub display_name: String,
}

/// An authenticated session: who is signed in and the bearer token the
/// cart API accepts for them.
#[derive(Debug, Clone)]
pub struct AuthSession {
    pub user: SessionUser,
    pub token: SecretString,
}

impl AuthSession {
    #[must_use]
    pub const fn new(user: SessionUser, token: SecretString) -> Self {
        Self { user, token }
    }
}

/// Current authentication status.
#[derive(Debug, Clone, Default)]
pub enum AuthStatus {
    /// Nobody is signed in; the cart lives on this device.
    #[default]
    Guest,
    /// A customer is signed in; the cart lives on the server.
    Authenticated(AuthSession),
}

impl AuthStatus {
    /// Returns true if a customer is signed in.
    #[must_use]
    pub const fn is_authenticated(&self) -> bool {
        matches!(self, Self::Authenticated(_))
    }

    /// The signed-in session, if any.
    #[must_use]
    pub const fn session(&self) -> Option<&AuthSession> {
        match self {
            Self::Guest => None,
            Self::Authenticated(session) => Some(session),
        }
    }
}
