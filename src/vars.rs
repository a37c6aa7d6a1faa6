use std::sync::LazyLock;

static BIND: LazyLock<String> =
    LazyLock::new(|| std::env::var("REFLECTD_BIND").unwrap_or("0.0.0.0:8080".to_owned()));
static MODE: LazyLock<String> =
    LazyLock::new(|| std::env::var("REFLECTD_MODE").unwrap_or("query".to_owned()));
static UPSTREAM_BASE_URL: LazyLock<String> =
    LazyLock::new(|| std::env::var("REFLECTD_UPSTREAM_BASE_URL").unwrap_or_default());
static PATH_PREFIX: LazyLock<String> =
    LazyLock::new(|| std::env::var("REFLECTD_PATH_PREFIX").unwrap_or_default());
static URL_PARAM: LazyLock<String> =
    LazyLock::new(|| std::env::var("REFLECTD_URL_PARAM").unwrap_or("url".to_owned()));
static MIRROR_HEADERS: LazyLock<Option<String>> =
    LazyLock::new(|| std::env::var("REFLECTD_MIRROR_HEADERS").ok());
static PERMISSIVE_CORS: LazyLock<Option<bool>> = LazyLock::new(|| {
    std::env::var("REFLECTD_PERMISSIVE_CORS")
        .ok()
        .and_then(|v| v.parse().ok())
});
static FALLBACK_USER_AGENT: LazyLock<String> = LazyLock::new(|| {
    std::env::var("REFLECTD_FALLBACK_USER_AGENT").unwrap_or("Mozilla/5.0".to_owned())
});

pub fn bind() -> &'static str {
    &BIND
}

pub fn mode() -> &'static str {
    &MODE
}

pub fn upstream_base_url() -> &'static str {
    &UPSTREAM_BASE_URL
}

pub fn path_prefix() -> &'static str {
    &PATH_PREFIX
}

pub fn url_param() -> &'static str {
    &URL_PARAM
}

pub fn mirror_headers() -> Option<&'static str> {
    MIRROR_HEADERS.as_deref()
}

pub fn permissive_cors() -> Option<bool> {
    *PERMISSIVE_CORS
}

pub fn fallback_user_agent() -> &'static str {
    &FALLBACK_USER_AGENT
}
