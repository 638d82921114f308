//! Cross App Access demonstration library
//!
//! Implements the token-exchange delegation flow: enterprise OIDC login,
//! token exchange for an ID-JAG delegation assertion, JWT-bearer exchange
//! for a resource access token, and an inspector endpoint that projects the
//! accumulated session artifacts for the web client.

pub mod config;
pub mod exchange;
pub mod inspector;
pub mod jwt;
pub mod oidc;
pub mod server;
pub mod session;
