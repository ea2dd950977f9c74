//! Auth-domain value types: scopes, tokens, and secret redaction.

pub mod scope;
pub mod token;

pub use scope::*;
pub use token::*;
