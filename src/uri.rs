//! URL parsing and normalization.
//!
//! [`ParsedUrl`] wraps a [`url::Url`] and exposes the parts routing looks at:
//!
//! | Part | Normalization |
//! |------|---------------|
//! | scheme | lowercase |
//! | host | lowercase; empty host reads as none |
//! | port | explicit port, else the scheme's well-known default |
//! | path | one trailing slash removed unless the path is `/`; none for opaque URLs |
//!
//! Opaque URLs such as `mailto:someone@example.com` have no hierarchical
//! path; they can only reach an endpoint's no-path handler.

use crate::error::RouterError;
use url::Url;

/// A parsed, normalized URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedUrl {
    raw: String,
    scheme: String,
    host: Option<String>,
    port: Option<u16>,
    explicit_port: Option<u16>,
    path: Option<String>,
    opaque_path: Option<String>,
    query: Option<String>,
    fragment: Option<String>,
}

impl ParsedUrl {
    /// Parse `raw`. Fails with [`RouterError::InvalidUrl`] when it is not an
    /// absolute URL.
    ///
    /// ```
    /// use neuro_router::ParsedUrl;
    ///
    /// let url = ParsedUrl::parse("HTTPS://Example.com/promo/?x=1").unwrap();
    /// assert_eq!(url.scheme(), "https");
    /// assert_eq!(url.host(), Some("example.com"));
    /// assert_eq!(url.port(), Some(443));
    /// assert_eq!(url.path(), Some("/promo"));
    /// assert_eq!(url.query(), Some("x=1"));
    /// ```
    pub fn parse(raw: &str) -> Result<Self, RouterError> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(RouterError::InvalidUrl {
                url: raw.to_string(),
                reason: "empty url".to_string(),
            });
        }

        let url = Url::parse(trimmed).map_err(|err| RouterError::InvalidUrl {
            url: raw.to_string(),
            reason: err.to_string(),
        })?;

        Ok(Self::from_url(raw, &url))
    }

    fn from_url(raw: &str, url: &Url) -> Self {
        let opaque = url.cannot_be_a_base();
        let path = if opaque {
            None
        } else {
            normalize_path(url.path())
        };

        Self {
            raw: raw.to_string(),
            scheme: url.scheme().to_ascii_lowercase(),
            host: url
                .host_str()
                .filter(|h| !h.is_empty())
                .map(str::to_ascii_lowercase),
            port: url.port_or_known_default(),
            explicit_port: url.port(),
            path,
            opaque_path: opaque.then(|| url.path().to_string()),
            query: url.query().map(str::to_string),
            fragment: url.fragment().map(str::to_string),
        }
    }

    /// The URL as given to [`parse`](Self::parse).
    pub fn raw(&self) -> &str {
        &self.raw
    }

    /// Lowercase scheme.
    pub fn scheme(&self) -> &str {
        &self.scheme
    }

    /// Lowercase host, if any.
    pub fn host(&self) -> Option<&str> {
        self.host.as_deref()
    }

    /// Port used for endpoint matching: explicit, else the scheme default.
    pub fn port(&self) -> Option<u16> {
        self.port
    }

    /// Port written in the URL, if any.
    pub fn explicit_port(&self) -> Option<u16> {
        self.explicit_port
    }

    /// Normalized path; `None` when the URL has no path or is opaque.
    pub fn path(&self) -> Option<&str> {
        self.path.as_deref()
    }

    /// Raw query string without the `?`.
    pub fn query(&self) -> Option<&str> {
        self.query.as_deref()
    }

    /// Fragment without the `#`.
    pub fn fragment(&self) -> Option<&str> {
        self.fragment.as_deref()
    }

    /// `true` for URLs without a hierarchical part, e.g. `mailto:`.
    pub fn is_opaque(&self) -> bool {
        self.opaque_path.is_some()
    }

    /// Number of `/`-separated segments of the path; `0` without a path.
    pub fn segment_count(&self) -> usize {
        self.path.as_deref().map_or(0, |p| p.matches('/').count())
    }

    /// Scheme, host, port and path, without query or fragment.
    pub fn clean(&self) -> String {
        if let Some(opaque) = &self.opaque_path {
            return format!("{}:{}", self.scheme, opaque);
        }
        let mut clean = format!("{}://{}", self.scheme, self.host.as_deref().unwrap_or(""));
        if let Some(port) = self.explicit_port {
            clean.push(':');
            clean.push_str(&port.to_string());
        }
        if let Some(path) = &self.path {
            clean.push_str(path);
        }
        clean
    }

    /// The normalized URL including query and fragment.
    pub fn normalized(&self) -> String {
        let mut normalized = self.clean();
        if let Some(query) = &self.query {
            normalized.push('?');
            normalized.push_str(query);
        }
        if let Some(fragment) = &self.fragment {
            normalized.push('#');
            normalized.push_str(fragment);
        }
        normalized
    }
}

/// `""` reads as no path, `/` stays, anything else loses one trailing slash.
fn normalize_path(path: &str) -> Option<String> {
    match path {
        "" => None,
        "/" => Some("/".to_string()),
        other => Some(other.strip_suffix('/').unwrap_or(other).to_string()),
    }
}

// ============================================================================
// Tests
// ============================================================================
