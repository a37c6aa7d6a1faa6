use http::{header, HeaderMap, HeaderName, HeaderValue};
use log::warn;

/// Headers the hosting platform is known to overwrite after the handler runs.
/// Mirroring modes duplicate them under an `x-origin-*` name.
pub const MIRRORED_ORIGIN_HEADERS: [HeaderName; 3] = [
    header::SERVER,
    header::VIA,
    HeaderName::from_static("x-cache"),
];

// Connection-level framing is determined by the serving stack
const SKIP_RESPONSE_HEADERS: [HeaderName; 2] = [header::CONNECTION, header::TRANSFER_ENCODING];

#[derive(Debug, Clone, Copy)]
pub struct Cors {
    pub permissive: bool,
}

impl Cors {
    /// The full header set, sent on preflight and error responses.
    pub fn full() -> Self {
        Cors { permissive: true }
    }

    pub fn apply(self, headers: &mut HeaderMap) {
        headers.insert(
            header::ACCESS_CONTROL_ALLOW_ORIGIN,
            HeaderValue::from_static("*"),
        );

        if self.permissive {
            headers.insert(
                header::ACCESS_CONTROL_ALLOW_METHODS,
                HeaderValue::from_static("GET, HEAD, POST, OPTIONS"),
            );
            headers.insert(
                header::ACCESS_CONTROL_ALLOW_HEADERS,
                HeaderValue::from_static("*"),
            );
            headers.insert(
                header::ACCESS_CONTROL_EXPOSE_HEADERS,
                HeaderValue::from_static("*"),
            );
        }
    }
}

/// Builds the outbound header set from an origin response: every origin header
/// is carried over, then each watched header present in the origin set is
/// duplicated under its `x-origin-*` name. CORS headers are applied separately,
/// after this copy, so an origin-supplied value never shadows them.
pub fn rewrite(origin: &HeaderMap, mirror: &[HeaderName]) -> HeaderMap {
    let mut headers = HeaderMap::with_capacity(origin.len() + mirror.len());

    for (key, value) in origin.iter() {
        if !SKIP_RESPONSE_HEADERS.contains(key) {
            headers.append(key, value.clone());
        }
    }

    for name in mirror {
        if let (Some(value), Some(mirrored)) = (origin.get(name), mirror_name(name)) {
            headers.insert(mirrored, value.clone());
        }
    }

    headers
}

// `server` mirrors as `x-origin-server`, `x-cache` as `x-origin-cache`
fn mirror_name(name: &HeaderName) -> Option<HeaderName> {
    let bare = name.as_str().strip_prefix("x-").unwrap_or(name.as_str());

    HeaderName::from_bytes(format!("x-origin-{}", bare).as_bytes()).ok()
}

pub fn parse_mirror_list(list: &str) -> Vec<HeaderName> {
    list.split(',')
        .map(str::trim)
        .filter(|name| !name.is_empty())
        .filter_map(|name| match HeaderName::from_bytes(name.as_bytes()) {
            Ok(name) => Some(name),
            Err(e) => {
                warn!("ignoring invalid mirror header `{}`: {}", name, e);
                None
            }
        })
        .collect()
}

pub trait AppendHeaders {
    fn append_headers(self, headers: &HeaderMap) -> Self;
}

impl AppendHeaders for http::response::Builder {
    fn append_headers(self, headers: &HeaderMap) -> Self {
        headers
            .iter()
            .fold(self, |builder, (key, value)| builder.header(key, value))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn origin_headers() -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(header::CONTENT_TYPE, HeaderValue::from_static("text/html"));
        headers.insert(header::SERVER, HeaderValue::from_static("ExampleCDN"));
        headers.insert(header::VIA, HeaderValue::from_static("1.1 edge-cache"));
        headers.insert("x-cache", HeaderValue::from_static("HIT"));
        headers
    }

    #[test]
    fn copies_origin_headers_verbatim() {
        let rewritten = rewrite(&origin_headers(), &[]);

        assert_eq!(rewritten.get(header::CONTENT_TYPE).unwrap(), "text/html");
        assert_eq!(rewritten.get(header::SERVER).unwrap(), "ExampleCDN");
        assert!(rewritten.get("x-origin-server").is_none());
    }

    #[test]
    fn skips_connection_level_headers() {
        let mut headers = origin_headers();
        headers.insert(header::CONNECTION, HeaderValue::from_static("keep-alive"));
        headers.insert(header::TRANSFER_ENCODING, HeaderValue::from_static("chunked"));

        let rewritten = rewrite(&headers, &[]);

        assert!(rewritten.get(header::CONNECTION).is_none());
        assert!(rewritten.get(header::TRANSFER_ENCODING).is_none());
    }

    #[test]
    fn mirrors_watched_headers() {
        let rewritten = rewrite(&origin_headers(), &MIRRORED_ORIGIN_HEADERS);

        assert_eq!(rewritten.get("x-origin-server").unwrap(), "ExampleCDN");
        assert_eq!(rewritten.get("x-origin-via").unwrap(), "1.1 edge-cache");
        assert_eq!(rewritten.get("x-origin-cache").unwrap(), "HIT");
        // the originals stay in place as well
        assert_eq!(rewritten.get(header::SERVER).unwrap(), "ExampleCDN");
    }

    #[test]
    fn absent_watched_headers_are_not_mirrored() {
        let mut headers = HeaderMap::new();
        headers.insert(header::SERVER, HeaderValue::from_static("ExampleCDN"));

        let rewritten = rewrite(&headers, &MIRRORED_ORIGIN_HEADERS);

        assert_eq!(rewritten.get("x-origin-server").unwrap(), "ExampleCDN");
        assert!(rewritten.get("x-origin-via").is_none());
        assert!(rewritten.get("x-origin-cache").is_none());
    }

    #[test]
    fn preserves_multi_valued_headers() {
        let mut headers = HeaderMap::new();
        headers.append(header::SET_COOKIE, HeaderValue::from_static("a=1"));
        headers.append(header::SET_COOKIE, HeaderValue::from_static("b=2"));

        let rewritten = rewrite(&headers, &[]);

        assert_eq!(rewritten.get_all(header::SET_COOKIE).iter().count(), 2);
    }

    #[test]
    fn cors_overrides_origin_supplied_values() {
        let mut headers = HeaderMap::new();
        headers.insert(
            header::ACCESS_CONTROL_ALLOW_ORIGIN,
            HeaderValue::from_static("https://other.example"),
        );

        let mut rewritten = rewrite(&headers, &[]);
        Cors { permissive: false }.apply(&mut rewritten);

        assert_eq!(
            rewritten.get(header::ACCESS_CONTROL_ALLOW_ORIGIN).unwrap(),
            "*"
        );
        assert!(rewritten.get(header::ACCESS_CONTROL_ALLOW_HEADERS).is_none());
    }

    #[test]
    fn permissive_cors_sends_the_full_set() {
        let mut headers = HeaderMap::new();
        Cors::full().apply(&mut headers);

        assert_eq!(headers.get(header::ACCESS_CONTROL_ALLOW_ORIGIN).unwrap(), "*");
        assert_eq!(
            headers.get(header::ACCESS_CONTROL_ALLOW_METHODS).unwrap(),
            "GET, HEAD, POST, OPTIONS"
        );
        assert_eq!(headers.get(header::ACCESS_CONTROL_ALLOW_HEADERS).unwrap(), "*");
        assert_eq!(headers.get(header::ACCESS_CONTROL_EXPOSE_HEADERS).unwrap(), "*");
    }

    #[test]
    fn parses_a_mirror_list_from_config() {
        let list = parse_mirror_list("server, via ,x-served-by,,");

        assert_eq!(
            list,
            vec![
                header::SERVER,
                header::VIA,
                HeaderName::from_static("x-served-by")
            ]
        );
    }
}
