// Copyright (c) 2025 Ronan LE MEILLAT, SCTG Development
// This file is part of the cross-app-access project and is licensed under the
// SCTG Development Non-Commercial License v1.0 (see LICENSE.md for details).

//! Error taxonomy for the exchange API
//!
//! Every failure of an exchange operation is translated into one of three
//! shapes before it reaches HTTP: a descriptive 400 for a missing
//! prerequisite artifact, a 400 carrying the upstream authorization server's
//! error body verbatim (the inspector is about transparency), or a generic
//! 500 whose detail exists only in the server log. Raw errors never cross
//! the HTTP boundary.

use std::io::Cursor;

use log::{error, warn};
use rocket::http::{ContentType, Status};
use rocket::request::Request;
use rocket::response::{self, Responder, Response};
use serde_json::json;
use thiserror::Error;

/// Failure of an exchange operation, ready to be rendered as a JSON response.
#[derive(Debug, Error)]
pub enum ApiError {
    /// A required upstream artifact is missing from the session; the
    /// operation was not attempted. Rendered as 400 with the message.
    #[error("{0}")]
    MissingArtifact(&'static str),

    /// The authorization server answered with a non-success status. The
    /// upstream body is forwarded verbatim with a 400 status.
    #[error("upstream authorization server rejected the request")]
    UpstreamRejected(serde_json::Value),

    /// Transport failure or any other unexpected error. Rendered as a
    /// generic 500; the detail is logged locally only.
    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl From<reqwest::Error> for ApiError {
    fn from(err: reqwest::Error) -> Self {
        ApiError::Internal(err.into())
    }
}

impl<'r> Responder<'r, 'static> for ApiError {
    fn respond_to(self, _request: &'r Request<'_>) -> response::Result<'static> {
        let (status, body) = match self {
            ApiError::MissingArtifact(message) => {
                warn!("Exchange precondition failed: {}", message);
                (Status::BadRequest, json!({ "error": message }))
            }
            ApiError::UpstreamRejected(body) => {
                warn!("Upstream rejection forwarded to caller: {}", body);
                (Status::BadRequest, body)
            }
            ApiError::Internal(err) => {
                error!("Exchange operation failed: {:#}", err);
                (
                    Status::InternalServerError,
                    json!({ "error": "Internal server error" }),
                )
            }
        };

        let body = body.to_string();
        Response::build()
            .status(status)
            .header(ContentType::JSON)
            .sized_body(body.len(), Cursor::new(body))
            .ok()
    }
}
