//! Credential-domain identifiers, role sets, claims, and lifecycle records.

pub mod id;
pub mod principal;
pub mod reset;
pub mod revocation;
pub mod role;
pub mod token;

pub use id::*;
pub use principal::*;
pub use reset::*;
pub use revocation::*;
pub use role::*;
pub use token::{claims::*, pair::*, secret::*};
