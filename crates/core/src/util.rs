use std::sync::OnceLock;

use regex::Regex;
use url::Url;

/// A deployment URL after cleanup, plus the service name derived from its host.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NormalizedUrl {
    pub url: Option<Url>,
    pub service_name: Option<String>,
}

impl NormalizedUrl {
    /// The validated URL, without the trailing slash `Url` adds to a bare host.
    pub fn as_str(&self) -> Option<&str> {
        self.url.as_ref().map(|url| {
            let s = url.as_str();
            if url.path() == "/" && url.query().is_none() && url.fragment().is_none() {
                s.strip_suffix('/').unwrap_or(s)
            } else {
                s
            }
        })
    }
}

/// Clean up a deployment URL as reported by wrangler.
///
/// Wrangler may decorate targets, e.g. `example.com (custom domain)`, and omits the
/// scheme for custom domains. Never fails: anything unusable yields absent fields.
pub fn normalize_deployment_url(raw: Option<&str>) -> NormalizedUrl {
    let Some(raw) = raw else {
        return NormalizedUrl::default();
    };
    static ANNOTATION_REGEX: OnceLock<Regex> = OnceLock::new();
    let annotation = ANNOTATION_REGEX.get_or_init(|| Regex::new(r"\s*\([^)]*\)\s*$").unwrap());
    let stripped = annotation.replace(raw, "");
    let with_scheme = if stripped.starts_with("http://") || stripped.starts_with("https://") {
        stripped.into_owned()
    } else {
        format!("https://{stripped}")
    };
    let parsed = match Url::parse(&with_scheme) {
        Ok(url) => Some(url),
        Err(e) => {
            tracing::warn!("Invalid deployment URL '{}': {}", raw, e);
            None
        }
    };
    let service_name = parsed.as_ref().and_then(Url::host_str).and_then(service_name_from_host);
    let url = parsed.filter(|url| {
        let valid = matches!(url.scheme(), "http" | "https");
        if !valid {
            tracing::warn!("Unsupported deployment URL scheme '{}' in '{}'", url.scheme(), raw);
        }
        valid
    });
    NormalizedUrl { url, service_name }
}

/// Extract the service name from a `<name>.<subdomain>.workers.dev` host,
/// falling back to the first label of any other host.
pub fn service_name_from_host(host: &str) -> Option<String> {
    static WORKERS_DEV_REGEX: OnceLock<Regex> = OnceLock::new();
    let workers_dev = WORKERS_DEV_REGEX
        .get_or_init(|| Regex::new(r"^(?P<name>[^.]+)\.(?:[^.]+\.)?workers\.dev$").unwrap());
    if let Some(name) = workers_dev.captures(host).and_then(|c| c.name("name")) {
        return Some(name.as_str().to_string());
    }
    host.split('.').next().filter(|label| !label.is_empty()).map(str::to_string)
}

/// The first eight characters of a commit hash.
pub fn short_hash(hash: &str) -> &str {
    hash.char_indices().nth(8).map_or(hash, |(idx, _)| &hash[..idx])
}
