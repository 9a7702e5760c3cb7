//! Signed token claims, issued pairs, and redacted secret wrappers.

pub mod claims;
pub mod pair;
pub mod secret;
