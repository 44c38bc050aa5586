//! Domain models for the cart engine.

pub mod session;

pub use session::{AuthSession, AuthStatus, SessionUser};
