//! Credential plumbing: token model, secret providers, the token cache seam, and the issuer.

pub mod cache;
pub mod issuer;
pub mod provider;
pub mod token;

pub use cache::*;
pub use issuer::*;
pub use provider::*;
pub use token::{Token, secret::TokenSecret};
