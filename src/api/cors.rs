//! CORS middleware
//!
//! Every response carries a fixed set of CORS headers for the configured
//! origin. `OPTIONS` requests are answered directly with 204.

use axum::{
    extract::{Request, State},
    http::{header, HeaderMap, HeaderValue, Method, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
};

use crate::error::{Error, Result};

const ALLOW_HEADERS: &str = "Content-Type,Authorization";
const ALLOW_METHODS: &str = "GET,POST,OPTIONS";

/// CORS headers for a single allowed origin
#[derive(Debug, Clone)]
pub struct Cors {
    origin: HeaderValue,
}

impl Cors {
    /// Build the header set for `origin`
    pub fn new(origin: &str) -> Result<Self> {
        let origin = HeaderValue::from_str(origin)
            .map_err(|_| Error::Config(format!("invalid CORS origin: {}", origin)))?;
        Ok(Self { origin })
    }

    fn apply(&self, headers: &mut HeaderMap) {
        headers.insert(header::ACCESS_CONTROL_ALLOW_ORIGIN, self.origin.clone());
        headers.insert(
            header::ACCESS_CONTROL_ALLOW_CREDENTIALS,
            HeaderValue::from_static("true"),
        );
        headers.insert(
            header::ACCESS_CONTROL_ALLOW_HEADERS,
            HeaderValue::from_static(ALLOW_HEADERS),
        );
        headers.insert(
            header::ACCESS_CONTROL_ALLOW_METHODS,
            HeaderValue::from_static(ALLOW_METHODS),
        );
    }
}

/// Middleware entry point, use with `axum::middleware::from_fn_with_state`
pub async fn handle_cors(State(cors): State<Cors>, request: Request, next: Next) -> Response {
    let mut response = if request.method() == Method::OPTIONS {
        StatusCode::NO_CONTENT.into_response()
    } else {
        next.run(request).await
    };
    cors.apply(response.headers_mut());
    response
}
