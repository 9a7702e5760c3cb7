//! Public extension contracts for collaborators the lifecycle core calls out to.
//!
//! The crate ships no mail or SMS adapter; downstream services plug their own
//! delivery channel into [`ResetNotifier`].

pub mod notifier;

pub use notifier::*;
