//! Instance name to URL resolution.

use crate::error::{Error, ErrorKind, Result};

/// A Fluxx instance, identified by its subdomain name.
///
/// Production instances live under `fluxx.io`; names ending in a `preprod`
/// segment (for example `acme.preprod`) live under `fluxxlabs.com`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Instance {
    name: String,
    base_url: String,
}

impl Instance {
    /// Resolve an instance name.
    pub fn new(name: impl Into<String>) -> Result<Self> {
        let name = name.into().trim().to_string();
        if name.is_empty() {
            return Err(Error::new(ErrorKind::Config(
                "instance name must not be empty".to_string(),
            )));
        }

        let (domain, suffix) = match name.rsplit('.').next() {
            Some("preprod") => ("fluxxlabs", "com"),
            _ => ("fluxx", "io"),
        };
        let base_url = format!("https://{name}.{domain}.{suffix}/");
        url::Url::parse(&base_url)?;

        Ok(Self { name, base_url })
    }

    /// Use an explicit base URL instead of deriving one from the name.
    ///
    /// Useful for proxies and local test servers. A trailing slash is added
    /// when missing.
    pub fn with_base_url(name: impl Into<String>, base_url: impl Into<String>) -> Result<Self> {
        let mut base_url = base_url.into();
        if !base_url.ends_with('/') {
            base_url.push('/');
        }
        url::Url::parse(&base_url)?;

        Ok(Self {
            name: name.into(),
            base_url,
        })
    }

    /// The instance name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Whether this is a pre-production instance.
    pub fn is_preprod(&self) -> bool {
        self.name.rsplit('.').next() == Some("preprod")
    }

    /// Base URL, always ending in `/`.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// OAuth token endpoint.
    pub fn token_url(&self) -> String {
        format!("{}{}", self.base_url, crate::TOKEN_PATH)
    }

    /// REST API root for a version, ending in `/`.
    pub fn api_url(&self, version: &str) -> String {
        format!("{}api/rest/{}/", self.base_url, version)
    }
}
