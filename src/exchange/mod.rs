// Copyright (c) 2025 Ronan LE MEILLAT, SCTG Development
// This file is part of the cross-app-access project and is licensed under the
// SCTG Development Non-Commercial License v1.0 (see LICENSE.md for details).

//! Token exchange orchestrator
//!
//! Implements the two sequential grant exchanges at the heart of the Cross
//! App Access flow:
//!
//! 1. **Operation A** — token exchange (RFC 8693) at the enterprise IDP:
//!    id token in, ID-JAG delegation assertion out.
//! 2. **Operation B** — JWT-bearer grant (RFC 7523) at the Resource
//!    Application's authorization server: assertion in, access token out.
//!
//! Each operation consumes the previous step's output from the session and
//! writes its own result back into it; the strict ordering is enforced by
//! precondition checks against the session's flow state.

pub mod client;
pub mod error;
pub mod handlers;

pub use client::{
    TokenClient, TokenResponse, GRANT_TYPE_JWT_BEARER, GRANT_TYPE_TOKEN_EXCHANGE,
    TOKEN_TYPE_ID_JAG, TOKEN_TYPE_ID_TOKEN,
};
pub use error::ApiError;
pub use handlers::{auth0_jwt_bearer, okta_token_exchange, ExchangeSuccess};
