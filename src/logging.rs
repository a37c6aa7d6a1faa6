use http::{header, HeaderMap, Method, StatusCode, Uri};
use log::info;
use std::net::SocketAddr;

pub struct AccessLog<'a> {
    pub status: StatusCode,
    pub method: &'a Method,
    pub path: &'a Uri,
    pub target: &'a str,
    pub user_agent: &'a str,
    pub client_ip: String,
}

impl<'a> AccessLog<'a> {
    pub fn new(
        status: StatusCode,
        method: &'a Method,
        path: &'a Uri,
        target: &'a str,
        req_headers: &'a HeaderMap,
        conn_addr: SocketAddr,
    ) -> Self {
        let user_agent = req_headers
            .get(header::USER_AGENT)
            .and_then(|v| v.to_str().ok())
            .unwrap_or_default();

        // First entry of X-Forwarded-For, falling back to the connection address
        let client_ip = req_headers
            .get("x-forwarded-for")
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.split(',').next())
            .map(|ip| ip.trim().to_owned())
            .unwrap_or_else(|| conn_addr.ip().to_string());

        AccessLog {
            status,
            method,
            path,
            target,
            user_agent,
            client_ip,
        }
    }

    pub fn emit(&self) {
        info!(
            "{} {} \"{}\" => \"{}\" [client {}] \"{}\"",
            self.status, self.method, self.path, self.target, self.client_ip, self.user_agent
        );
    }
}
