use crate::{error::ProxyError, vars};
use anyhow::bail;
use http::Uri;
use log::{error, info};
use std::str::FromStr;
use strum_macros::{Display, EnumString};

#[derive(Debug, Clone, Copy, Display, EnumString)]
#[strum(serialize_all = "lowercase")]
pub enum Mode {
    Query,
    Mirror,
    Prefix,
}

/// Maps an inbound request to exactly one origin URL.
#[derive(Debug, Clone)]
pub enum Resolver {
    /// The target is named by a query parameter.
    QueryParam { param: String },
    /// The inbound path and query are appended to a fixed base URL.
    FixedOrigin { base: String },
    /// Like `FixedOrigin`, with a path prefix prepended when not already present.
    PathPrefix { base: String, prefix: String },
}

impl Resolver {
    pub fn from_vars() -> anyhow::Result<Self> {
        let mode = match Mode::from_str(vars::mode()) {
            Ok(mode) => mode,
            Err(_) => {
                // 无效的模式，回到查询模式
                error!("invalid mode: `{}`, fallback to query mode", vars::mode());
                Mode::Query
            }
        };

        info!("proxy mode: {}", mode);

        match mode {
            Mode::Query => Ok(Resolver::QueryParam {
                param: vars::url_param().to_owned(),
            }),
            Mode::Mirror => Ok(Resolver::FixedOrigin { base: base_url()? }),
            Mode::Prefix => Ok(Resolver::PathPrefix {
                base: base_url()?,
                prefix: prefix(),
            }),
        }
    }

    pub fn mirrors_by_default(&self) -> bool {
        !matches!(self, Resolver::QueryParam { .. })
    }

    pub fn resolve(&self, uri: &Uri) -> Result<String, ProxyError> {
        match self {
            Resolver::QueryParam { param } => {
                let query = uri.query().unwrap_or_default();

                url::form_urlencoded::parse(query.as_bytes())
                    .find(|(key, _)| key.as_ref() == param.as_str())
                    .map(|(_, value)| value.into_owned())
                    .filter(|value| !value.is_empty())
                    .ok_or_else(|| ProxyError::MissingParam {
                        param: param.clone(),
                    })
            }
            Resolver::FixedOrigin { base } => {
                let path_and_query = uri.path_and_query().map(|pq| pq.as_str()).unwrap_or("/");

                Ok(format!("{}{}", base, path_and_query))
            }
            Resolver::PathPrefix { base, prefix } => {
                let path = uri.path();
                let mut target = String::with_capacity(base.len() + prefix.len() + path.len());
                target.push_str(base);
                if !path.starts_with(prefix.as_str()) {
                    target.push_str(prefix);
                }
                // The inbound path always begins with `/`, so `/` maps to `<prefix>/`
                target.push_str(path);
                if let Some(query) = uri.query() {
                    target.push('?');
                    target.push_str(query);
                }

                Ok(target)
            }
        }
    }
}

fn base_url() -> anyhow::Result<String> {
    let base = vars::upstream_base_url();
    if base.is_empty() {
        bail!("missing `REFLECTD_UPSTREAM_BASE_URL` env var");
    }

    Ok(base.trim_end_matches('/').to_owned())
}

fn prefix() -> String {
    let raw = vars::path_prefix().trim_end_matches('/');
    if raw.is_empty() || raw.starts_with('/') {
        raw.to_owned()
    } else {
        format!("/{}", raw)
    }
}
