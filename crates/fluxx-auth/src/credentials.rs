//! Client credentials for a Fluxx instance.
//!
//! The client secret is redacted in Debug output.

use crate::error::{Error, ErrorKind, Result};
use crate::instance::Instance;

/// OAuth client id and secret bound to an instance.
#[derive(Clone)]
pub struct FluxxCredentials {
    instance: Instance,
    client_id: String,
    client_secret: String,
}

impl std::fmt::Debug for FluxxCredentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FluxxCredentials")
            .field("instance", &self.instance)
            .field("client_id", &self.client_id)
            .field("client_secret", &"[REDACTED]")
            .finish()
    }
}

impl FluxxCredentials {
    /// Create credentials from explicit values.
    pub fn new(
        instance: Instance,
        client_id: impl Into<String>,
        client_secret: impl Into<String>,
    ) -> Result<Self> {
        let client_id = client_id.into();
        let client_secret = client_secret.into();

        if client_id.is_empty() {
            return Err(Error::new(ErrorKind::InvalidCredentials(
                "client id must not be empty".to_string(),
            )));
        }
        if client_secret.is_empty() {
            return Err(Error::new(ErrorKind::InvalidCredentials(
                "client secret must not be empty".to_string(),
            )));
        }

        Ok(Self {
            instance,
            client_id,
            client_secret,
        })
    }

    /// Load credentials from environment variables.
    ///
    /// `prefix` is upper-cased and the following variables are read:
    /// - `{PREFIX}_INSTANCE`: instance name, e.g. `acme` or `acme.preprod`
    /// - `{PREFIX}_CLIENT`: OAuth client id
    /// - `{PREFIX}_SECRET`: OAuth client secret
    pub fn from_env(prefix: &str) -> Result<Self> {
        Self::from_lookup(prefix, |key| std::env::var(key).ok())
    }

    /// Load credentials through an arbitrary variable lookup.
    pub fn from_lookup<F>(prefix: &str, lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let prefix = prefix.trim().to_uppercase();
        let var = |suffix: &str| {
            let key = format!("{prefix}_{suffix}");
            lookup(&key)
                .filter(|value| !value.is_empty())
                .ok_or_else(|| Error::new(ErrorKind::EnvVar(key)))
        };

        let instance = Instance::new(var("INSTANCE")?)?;
        let client_id = var("CLIENT")?;
        let client_secret = var("SECRET")?;

        Self::new(instance, client_id, client_secret)
    }

    /// The instance these credentials belong to.
    pub fn instance(&self) -> &Instance {
        &self.instance
    }

    /// The OAuth client id.
    pub fn client_id(&self) -> &str {
        &self.client_id
    }

    pub(crate) fn client_secret(&self) -> &str {
        &self.client_secret
    }
}
