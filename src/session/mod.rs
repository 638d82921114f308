// Copyright (c) 2025 Ronan LE MEILLAT, SCTG Development
// This file is part of the cross-app-access project and is licensed under the
// SCTG Development Non-Commercial License v1.0 (see LICENSE.md for details).

//! Server-side session state for the delegation flow
//!
//! The flow is a strict linear chain: an authenticated identity is required
//! before the token exchange, and the delegation assertion is required before
//! the JWT-bearer exchange. Instead of a bag of optional fields, the session
//! holds an explicit [`FlowState`] whose variants carry exactly the artifacts
//! valid at that stage, so a later stage can never exist without its
//! prerequisites.
//!
//! The store itself is a plain `RwLock<HashMap>` keyed by a random session id
//! that travels in a Rocket private (encrypted) cookie. The flow is
//! human-driven and single-actor per session, so there is deliberately no
//! per-session locking or versioning: two racing exchanges resolve as
//! last-write-wins.

use std::collections::HashMap;
use std::sync::RwLock;

use chrono::{DateTime, Utc};
use log::{debug, warn};
use rocket::http::Status;
use rocket::request::{self, FromRequest, Request};
use rocket::State;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Name of the private cookie carrying the session id.
pub const SESSION_COOKIE: &str = "session_id";

/// Identity claims projected from the enterprise IDP id token.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserProfile {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
}

impl UserProfile {
    /// Build a profile from decoded id-token claims.
    pub fn from_claims(claims: &serde_json::Value) -> Self {
        let field = |key: &str| claims.get(key).and_then(|v| v.as_str()).map(String::from);
        Self {
            email: field("email"),
            name: field("name"),
            id: field("sub"),
            username: field("preferred_username"),
        }
    }
}

/// The result of a successful enterprise IDP login.
#[derive(Debug, Clone)]
pub struct AuthenticatedIdentity {
    pub profile: UserProfile,
    /// Compact id token as issued by the IDP, the subject of Operation A.
    pub id_token: String,
}

/// Stage of the delegation flow, carrying exactly the artifacts that exist at
/// that stage. An unauthenticated browser simply has no session entry.
#[derive(Debug, Clone)]
pub enum FlowState {
    /// Enterprise login completed.
    Authenticated { identity: AuthenticatedIdentity },
    /// Operation A succeeded: the id token was exchanged for an ID-JAG
    /// delegation assertion.
    AssertionObtained {
        identity: AuthenticatedIdentity,
        assertion: String,
    },
    /// Operation B succeeded: the assertion was exchanged for a resource
    /// access token.
    AccessTokenObtained {
        identity: AuthenticatedIdentity,
        assertion: String,
        access_token: String,
    },
}

impl FlowState {
    pub fn identity(&self) -> &AuthenticatedIdentity {
        match self {
            FlowState::Authenticated { identity }
            | FlowState::AssertionObtained { identity, .. }
            | FlowState::AccessTokenObtained { identity, .. } => identity,
        }
    }

    pub fn assertion(&self) -> Option<&str> {
        match self {
            FlowState::Authenticated { .. } => None,
            FlowState::AssertionObtained { assertion, .. }
            | FlowState::AccessTokenObtained { assertion, .. } => Some(assertion),
        }
    }

    pub fn access_token(&self) -> Option<&str> {
        match self {
            FlowState::AccessTokenObtained { access_token, .. } => Some(access_token),
            _ => None,
        }
    }
}

/// One session entry. Timestamps are informational (logging only); nothing
/// expires server-side, the cookie bounds the session lifetime.
#[derive(Debug, Clone)]
pub struct FlowSession {
    pub state: FlowState,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// In-memory session store, managed by Rocket and shared across workers.
#[derive(Debug, Default)]
pub struct SessionStore {
    sessions: RwLock<HashMap<Uuid, FlowSession>>,
}

impl SessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a session for a freshly authenticated identity.
    pub fn create(&self, identity: AuthenticatedIdentity) -> Uuid {
        let id = Uuid::new_v4();
        let now = Utc::now();
        let session = FlowSession {
            state: FlowState::Authenticated { identity },
            created_at: now,
            updated_at: now,
        };
        self.sessions
            .write()
            .expect("session store lock poisoned")
            .insert(id, session);
        debug!("Created session {}", id);
        id
    }

    /// Snapshot of a session, if it exists.
    pub fn get(&self, id: Uuid) -> Option<FlowSession> {
        self.sessions
            .read()
            .expect("session store lock poisoned")
            .get(&id)
            .cloned()
    }

    /// Store the delegation assertion produced by Operation A.
    ///
    /// Repeating the exchange overwrites the previous assertion. When an
    /// access token from a now-superseded assertion exists it is dropped
    /// along the way: the flow falls back to `AssertionObtained` and step
    /// three must be re-run against the fresh assertion.
    pub fn put_assertion(&self, id: Uuid, assertion: String) -> bool {
        let mut sessions = self.sessions.write().expect("session store lock poisoned");
        match sessions.get_mut(&id) {
            Some(session) => {
                if matches!(session.state, FlowState::AccessTokenObtained { .. }) {
                    debug!("Session {}: dropping access token derived from superseded assertion", id);
                }
                let identity = session.state.identity().clone();
                session.state = FlowState::AssertionObtained {
                    identity,
                    assertion,
                };
                session.updated_at = Utc::now();
                true
            }
            None => {
                warn!("Session {} vanished before assertion could be stored", id);
                false
            }
        }
    }

    /// Store the resource access token produced by Operation B.
    ///
    /// Requires the assertion stage to have been reached; returns `false`
    /// otherwise (the handler checks the precondition first, this is the
    /// backstop for a logout racing the exchange).
    pub fn put_access_token(&self, id: Uuid, access_token: String) -> bool {
        let mut sessions = self.sessions.write().expect("session store lock poisoned");
        match sessions.get_mut(&id) {
            Some(session) => match &session.state {
                FlowState::AssertionObtained {
                    identity,
                    assertion,
                }
                | FlowState::AccessTokenObtained {
                    identity,
                    assertion,
                    ..
                } => {
                    session.state = FlowState::AccessTokenObtained {
                        identity: identity.clone(),
                        assertion: assertion.clone(),
                        access_token,
                    };
                    session.updated_at = Utc::now();
                    true
                }
                FlowState::Authenticated { .. } => {
                    warn!("Session {}: no assertion present, refusing to store access token", id);
                    false
                }
            },
            None => {
                warn!("Session {} vanished before access token could be stored", id);
                false
            }
        }
    }

    /// Destroy a session and every artifact it holds. Single teardown,
    /// used by logout.
    pub fn remove(&self, id: Uuid) -> bool {
        let removed = self
            .sessions
            .write()
            .expect("session store lock poisoned")
            .remove(&id)
            .is_some();
        if removed {
            debug!("Destroyed session {}", id);
        }
        removed
    }
}

/// Request guard for routes that require an authenticated session.
///
/// Resolves the private session cookie against the store; a missing or stale
/// cookie fails with 401 (rendered as JSON by the error catcher).
pub struct SessionUser {
    pub session_id: Uuid,
    pub session: FlowSession,
}

#[rocket::async_trait]
impl<'r> FromRequest<'r> for SessionUser {
    type Error = ();

    async fn from_request(request: &'r Request<'_>) -> request::Outcome<Self, Self::Error> {
        let store = match request.guard::<&State<SessionStore>>().await {
            request::Outcome::Success(store) => store,
            _ => return request::Outcome::Error((Status::InternalServerError, ())),
        };

        let cookie = match request.cookies().get_private(SESSION_COOKIE) {
            Some(cookie) => cookie,
            None => return request::Outcome::Error((Status::Unauthorized, ())),
        };

        let session_id = match Uuid::parse_str(cookie.value()) {
            Ok(id) => id,
            Err(_) => {
                debug!("Session cookie is not a valid UUID");
                return request::Outcome::Error((Status::Unauthorized, ()));
            }
        };

        match store.get(session_id) {
            Some(session) => request::Outcome::Success(SessionUser {
                session_id,
                session,
            }),
            None => {
                debug!("Session cookie references unknown session {}", session_id);
                request::Outcome::Error((Status::Unauthorized, ()))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn identity() -> AuthenticatedIdentity {
        AuthenticatedIdentity {
            profile: UserProfile {
                email: Some("user@example.com".into()),
                name: Some("Test User".into()),
                id: Some("user-1".into()),
                username: None,
            },
            id_token: "aaa.bbb.ccc".into(),
        }
    }

    #[test]
    fn linear_progression() {
        let store = SessionStore::new();
        let id = store.create(identity());

        assert!(store.get(id).unwrap().state.assertion().is_none());
        assert!(store.put_assertion(id, "jag".into()));
        assert_eq!(store.get(id).unwrap().state.assertion(), Some("jag"));
        assert!(store.put_access_token(id, "at".into()));
        assert_eq!(store.get(id).unwrap().state.access_token(), Some("at"));
    }

    #[test]
    fn access_token_requires_assertion() {
        let store = SessionStore::new();
        let id = store.create(identity());
        assert!(!store.put_access_token(id, "at".into()));
        assert!(store.get(id).unwrap().state.access_token().is_none());
    }

    #[test]
    fn reexchange_drops_stale_access_token() {
        let store = SessionStore::new();
        let id = store.create(identity());
        store.put_assertion(id, "jag-1".into());
        store.put_access_token(id, "at-1".into());

        assert!(store.put_assertion(id, "jag-2".into()));
        let session = store.get(id).unwrap();
        assert_eq!(session.state.assertion(), Some("jag-2"));
        assert!(session.state.access_token().is_none());
    }

    #[test]
    fn remove_is_total_teardown() {
        let store = SessionStore::new();
        let id = store.create(identity());
        store.put_assertion(id, "jag".into());
        assert!(store.remove(id));
        assert!(store.get(id).is_none());
        assert!(!store.put_assertion(id, "jag-2".into()));
        assert!(!store.remove(id));
    }
}
