//! HTTP middleware for the cart API.
//!
//! # Middleware Order (outermost first)
//!
//! 1. Sentry layers (hub per request, HTTP transaction)
//! 2. `TraceLayer` (request span with status and latency)
//! 3. [`RequireUser`] extractor on cart routes

pub mod auth;

pub use auth::RequireUser;
