use crate::lifecycle::LifecycleManager;
use crate::server::routes;

use axum::{
    Router,
    extract::Request,
    http::{HeaderName, HeaderValue, StatusCode, Version, header::USER_AGENT},
    middleware::{self, Next},
    response::Response,
};
use base64::Engine as _;
use rand::RngCore;
use std::{sync::Arc, time::Instant};
use tracing::{error, info, warn};

const MAX_REQUEST_ID_LEN: usize = 128;
const X_REQUEST_ID: HeaderName = HeaderName::from_static("x-request-id");

#[derive(Clone)]
pub struct ProvisionState {
    pub manager: LifecycleManager,
    /// Engine used when a create request does not name one.
    pub default_engine: Arc<str>,
}

impl ProvisionState {
    pub fn new(manager: LifecycleManager, default_engine: impl Into<Arc<str>>) -> Self {
        Self {
            manager,
            default_engine: default_engine.into(),
        }
    }
}

fn new_request_id() -> String {
    // 96 random bits, 16 base64url chars.
    let mut bytes = [0u8; 12];
    rand::rng().fill_bytes(&mut bytes);
    base64::engine::general_purpose::URL_SAFE_NO_PAD.encode(bytes)
}

fn inbound_request_id(req: &Request) -> Option<String> {
    req.headers()
        .get(X_REQUEST_ID)
        .and_then(|v| v.to_str().ok())
        .filter(|v| !v.is_empty() && v.len() <= MAX_REQUEST_ID_LEN)
        .map(str::to_string)
}

fn protocol_name(version: Version) -> &'static str {
    match version {
        Version::HTTP_10 => "HTTP/1.0",
        Version::HTTP_11 => "HTTP/1.1",
        Version::HTTP_2 => "HTTP/2",
        Version::HTTP_3 => "HTTP/3",
        _ => "HTTP/?",
    }
}

async fn not_found_handler() -> StatusCode {
    StatusCode::NOT_FOUND
}

/// Tags every response with `x-request-id` and logs one line per request, at a level chosen
/// by the status class.
async fn access_log(req: Request, next: Next) -> Response {
    let method = req.method().clone();
    let path = req.uri().path().to_string();
    let protocol = protocol_name(req.version());
    let request_id = inbound_request_id(&req).unwrap_or_else(new_request_id);
    let user_agent = req
        .headers()
        .get(USER_AGENT)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("-")
        .to_string();

    let started = Instant::now();
    let mut resp = next.run(req).await;

    if let Ok(value) = HeaderValue::from_str(&request_id) {
        resp.headers_mut().insert(X_REQUEST_ID, value);
    }

    let status = resp.status().as_u16();
    let latency = started.elapsed();
    macro_rules! emit {
        ($level:ident) => {
            $level!(
                status,
                request_id = %request_id,
                method = %method,
                protocol,
                path = %path,
                latency = ?latency,
                user_agent = %user_agent,
                "request served"
            )
        };
    }
    if resp.status().is_server_error() {
        emit!(error);
    } else if resp.status().is_client_error() {
        emit!(warn);
    } else {
        emit!(info);
    }

    resp
}

pub fn provision_router(state: ProvisionState) -> Router {
    Router::new()
        .merge(routes::router())
        .fallback(not_found_handler)
        .with_state(state)
        .layer(middleware::from_fn(access_log))
}
