use anyhow::Context;
use axum::{
    body::Body,
    extract::{ConnectInfo, Request, State},
    response::{IntoResponse, Response},
    routing::any,
    Router,
};
use clap::Parser;
use http::{HeaderMap, HeaderName, HeaderValue, Method, StatusCode};
use log::{error, info};
use std::net::SocketAddr;

mod cli;
mod error;
mod headers;
mod logging;
mod request;
mod target;
mod vars;


use error::ProxyError;
use headers::{AppendHeaders, Cors};
use logging::AccessLog;
use target::Resolver;

#[derive(Clone)]
struct AppState {
    resolver: Resolver,
    mirror: Vec<HeaderName>,
    cors: Cors,
    fallback_user_agent: HeaderValue,
    client: reqwest::Client,
}

impl AppState {
    fn from_vars() -> anyhow::Result<Self> {
        let resolver = Resolver::from_vars()?;

        let mirror = match vars::mirror_headers() {
            Some(list) => headers::parse_mirror_list(list),
            None if resolver.mirrors_by_default() => headers::MIRRORED_ORIGIN_HEADERS.to_vec(),
            None => Vec::new(),
        };

        let cors = Cors {
            permissive: vars::permissive_cors().unwrap_or(!resolver.mirrors_by_default()),
        };

        let fallback_user_agent = HeaderValue::from_str(vars::fallback_user_agent())
            .context("invalid `REFLECTD_FALLBACK_USER_AGENT` env var")?;

        let client = request::build_client().context("failed to build http client")?;

        Ok(AppState {
            resolver,
            mirror,
            cors,
            fallback_user_agent,
            client,
        })
    }
}

fn app(state: AppState) -> Router {
    Router::new()
        .route("/", any(handler))
        .route("/*path", any(handler))
        .with_state(state)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    env_logger::init();
    cli::Args::parse();

    let state = AppState::from_vars()?;
    let listener = tokio::net::TcpListener::bind(vars::bind())
        .await
        .context("failed to bind to address")?;

    info!("listening on: http://{}", vars::bind());

    axum::serve(
        listener,
        app(state).into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await
    .context("failed to run server")?;

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!("failed to listen for shutdown signal: {}", e);
    }
}

async fn handler(
    State(state): State<AppState>,
    ConnectInfo(conn_addr): ConnectInfo<SocketAddr>,
    request: Request,
) -> Response {
    // Preflight never resolves a target or contacts the origin
    if request.method() == Method::OPTIONS {
        return preflight();
    }

    let target = match state.resolver.resolve(request.uri()) {
        Ok(target) => target,
        Err(e) => {
            let resp = e.into_response();
            AccessLog::new(
                resp.status(),
                request.method(),
                request.uri(),
                "-",
                request.headers(),
                conn_addr,
            )
            .emit();

            return resp;
        }
    };

    let resp = match forward(&state, request.method().clone(), request.headers(), &target).await {
        Ok(resp) => resp,
        Err(e) => e.into_response(),
    };
    AccessLog::new(
        resp.status(),
        request.method(),
        request.uri(),
        &target,
        request.headers(),
        conn_addr,
    )
    .emit();

    resp
}

async fn forward(
    state: &AppState,
    method: Method,
    headers: &HeaderMap,
    target: &str,
) -> Result<Response, ProxyError> {
    let upstream = request::send(
        &state.client,
        method,
        target,
        headers,
        &state.fallback_user_agent,
    )
    .await
    .map_err(ProxyError::OriginFetch)?;

    let status = upstream.status();
    let mut resp_headers = headers::rewrite(upstream.headers(), &state.mirror);
    state.cors.apply(&mut resp_headers);

    // The body is passed through as a stream, untouched
    Response::builder()
        .status(status)
        .append_headers(&resp_headers)
        .body(Body::from_stream(upstream.bytes_stream()))
        .map_err(ProxyError::Synthesis)
}

fn preflight() -> Response {
    let mut cors_headers = HeaderMap::new();
    Cors::full().apply(&mut cors_headers);

    let built = Response::builder()
        .status(StatusCode::NO_CONTENT)
        .append_headers(&cors_headers)
        .body(Body::empty());

    match built {
        Ok(resp) => resp,
        Err(e) => {
            error!("{}", e);
            StatusCode::INTERNAL_SERVER_ERROR.into_response()
        }
    }
}
