use crate::headers::{AppendHeaders, Cors};
use axum::{
    body::Body,
    response::{IntoResponse, Response},
};
use http::{header, HeaderMap, StatusCode};
use log::error;

#[derive(Debug)]
pub enum ProxyError {
    MissingParam { param: String },
    OriginFetch(reqwest::Error),
    Synthesis(http::Error),
}

impl ProxyError {
    pub fn status(&self) -> StatusCode {
        match self {
            ProxyError::MissingParam { .. } => StatusCode::BAD_REQUEST,
            ProxyError::OriginFetch(_) | ProxyError::Synthesis(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    fn message(&self) -> String {
        match self {
            ProxyError::MissingParam { param } => format!(
                "Missing '{}' parameter. Usage: ?{}=https://example.com",
                param, param
            ),
            ProxyError::OriginFetch(e) => format!("Proxy Error: {}", e),
            ProxyError::Synthesis(e) => format!("Proxy Error: {}", e),
        }
    }
}

impl IntoResponse for ProxyError {
    fn into_response(self) -> Response {
        match &self {
            ProxyError::MissingParam { .. } => {}
            ProxyError::OriginFetch(e) => error!("origin fetch failed: {}", e),
            ProxyError::Synthesis(e) => error!("response synthesis failed: {}", e),
        }

        build_resp_with_fallback(&self)
    }
}

// The error body stays readable cross-origin: CORS headers are attached here too
fn build_resp(err: &ProxyError) -> Result<Response, http::Error> {
    let mut cors_headers = HeaderMap::new();
    Cors::full().apply(&mut cors_headers);

    Response::builder()
        .status(err.status())
        .header(header::CONTENT_TYPE, "text/plain; charset=utf-8")
        .append_headers(&cors_headers)
        .body(Body::from(err.message()))
}

fn build_resp_with_fallback(err: &ProxyError) -> Response {
    match build_resp(err) {
        Ok(resp) => resp,
        Err(e) => {
            error!("{}", e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                StatusCode::INTERNAL_SERVER_ERROR.to_string(),
            )
                .into_response()
        }
    }
}
