// Copyright (c) 2025 Ronan LE MEILLAT, SCTG Development
// This file is part of the cross-app-access project and is licensed under the
// SCTG Development Non-Commercial License v1.0 (see LICENSE.md for details).

//! Rocket server assembly
//!
//! Builds the Rocket instance: managed state (configuration, session store,
//! token client), the login and API mounts, JSON error catchers and the
//! embedded web client. During client development the static routes can be
//! proxied to a running Vite dev server via the `VITE_DEVELOPMENT`
//! environment variable.

use std::env;
use std::io::Cursor;
use std::path::PathBuf;
use std::sync::Arc;

use include_dir::{include_dir, Dir};
use log::{debug, info, warn};
use rocket::catchers;
use rocket::fairing::{Fairing, Info, Kind};
use rocket::figment::Figment;
use rocket::http::{ContentType, Header};
use rocket::serde::json::Json;
use rocket::{async_trait, catch, get, options, routes, Build, Request, Response, Rocket};
use serde_json::{json, Value};

use crate::config::Config;
use crate::exchange::TokenClient;
use crate::session::SessionStore;
use crate::{exchange, inspector, oidc};

/// Static directory containing the web client files, embedded at compile
/// time so the deployed binary has no external file dependencies.
const STATIC_DIR: Dir = include_dir!("web/dist");

/// Response type for serving static files: raw content plus content type.
#[derive(Debug)]
pub struct StaticFileResponse(Vec<u8>, ContentType);

#[async_trait]
impl<'r> rocket::response::Responder<'r, 'r> for StaticFileResponse {
    fn respond_to(self, _: &'r Request<'_>) -> rocket::response::Result<'static> {
        Response::build()
            .header(self.1)
            .header(Header {
                name: "Cache-Control".into(),
                value: "max-age=604800".into(), // 1 week
            })
            .sized_body(self.0.len(), Cursor::new(self.0))
            .ok()
    }
}

pub struct CORS;

#[rocket::async_trait]
impl Fairing for CORS {
    fn info(&self) -> Info {
        Info {
            name: "Add CORS headers to responses",
            kind: Kind::Response,
        }
    }

    async fn on_response<'r>(&self, _request: &'r Request<'_>, response: &mut Response<'r>) {
        response.set_header(Header::new("Access-Control-Allow-Origin", "*"));
        response.set_header(Header::new(
            "Access-Control-Allow-Methods",
            "POST, GET, OPTIONS",
        ));
        response.set_header(Header::new("Access-Control-Allow-Headers", "*"));
        response.set_header(Header::new("Access-Control-Allow-Credentials", "true"));
    }
}

/// Answers to OPTIONS requests (CORS preflight).
#[options("/<_path..>")]
async fn options(_path: PathBuf) -> Result<(), std::io::Error> {
    Ok(())
}

fn static_file(path: &str) -> Option<StaticFileResponse> {
    let file = STATIC_DIR.get_file(path)?;
    let content_type = file
        .path()
        .extension()
        .and_then(|ext| ext.to_str())
        .and_then(ContentType::from_extension)
        .unwrap_or(ContentType::Binary);
    Some(StaticFileResponse(file.contents().to_vec(), content_type))
}

async fn proxy_to_vite(path: &str) -> Option<StaticFileResponse> {
    let vite_base =
        env::var("VITE_DEVELOPMENT").unwrap_or_else(|_| "http://localhost:5173".to_string());
    let url = format!("{}/{}", vite_base.trim_end_matches('/'), path);
    debug!("Proxying static request to Vite dev server: {}", url);

    let response = match reqwest::get(&url).await {
        Ok(response) => response,
        Err(err) => {
            warn!("Vite dev proxy request failed: {}", err);
            return None;
        }
    };

    let content_type = response
        .headers()
        .get("content-type")
        .and_then(|header| header.to_str().ok())
        .and_then(|value| value.parse::<ContentType>().ok())
        .unwrap_or(ContentType::Binary);

    match response.bytes().await {
        Ok(bytes) => Some(StaticFileResponse(bytes.to_vec(), content_type)),
        Err(err) => {
            warn!("Vite dev proxy body read failed: {}", err);
            None
        }
    }
}

/// Serve the embedded web client's entry point.
#[get("/")]
async fn index() -> Option<StaticFileResponse> {
    if env::var("VITE_DEVELOPMENT").is_ok() {
        return proxy_to_vite("index.html").await;
    }
    static_file("index.html")
}

/// Serve web client static files, falling back to `index.html` so the
/// client can handle its own routes.
#[get("/<path..>", rank = 12)]
async fn webclient(path: PathBuf) -> Option<StaticFileResponse> {
    let path = path.to_str().unwrap_or("");
    if env::var("VITE_DEVELOPMENT").is_ok() {
        return proxy_to_vite(path).await;
    }
    static_file(path).or_else(|| static_file("index.html"))
}

#[catch(401)]
fn unauthorized() -> Json<Value> {
    Json(json!({ "error": "Authentication required" }))
}

#[catch(404)]
fn not_found() -> Json<Value> {
    Json(json!({ "error": "Not found" }))
}

#[catch(500)]
fn internal_error() -> Json<Value> {
    Json(json!({ "error": "Internal server error" }))
}

/// Assemble the Rocket figment from the application configuration.
///
/// The session secret doubles as Rocket's cookie secret key; it protects the
/// private cookies that carry the session id and the login state.
pub fn figment_from_config(config: &Config) -> Figment {
    rocket::Config::figment()
        .merge(("port", config.server.port))
        .merge(("address", config.server.address.clone()))
        .merge(("secret_key", config.server.session_secret.clone()))
}

/// Build a configured Rocket server instance.
///
/// Mounts the login handshake and static client at `/`, the exchange and
/// inspector endpoints under `/api`, and registers the JSON error catchers.
pub fn build_rocket(figment: Figment, config: Arc<Config>) -> Rocket<Build> {
    let token_client = match TokenClient::new() {
        Ok(client) => client,
        Err(err) => {
            // No sensible way to run without an HTTP client
            eprintln!("Failed to initialize the token client: {}", err);
            std::process::exit(1);
        }
    };

    info!("Assembling {} on {}:{}", config.server.name, config.server.address, config.server.port);

    rocket::custom(figment)
        .attach(CORS)
        .mount(
            "/",
            routes![
                index,
                webclient,
                options,
                oidc::login,
                oidc::login_callback,
                oidc::logout,
            ],
        )
        .mount(
            "/api",
            routes![
                exchange::okta_token_exchange,
                exchange::auth0_jwt_bearer,
                inspector::inspector_debug,
            ],
        )
        .register("/", catchers![unauthorized, not_found, internal_error])
        .manage(config)
        .manage(SessionStore::new())
        .manage(token_client)
}
