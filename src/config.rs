//! Client and per-write configuration.

use serde::{Deserialize, Serialize};

use crate::error::{DataError, Result};
use crate::fs::ObjectPolicy;
use crate::logging::LoggingConfig;

/// Environment variable holding the store's base URL.
pub const ENV_URL: &str = "GMDATA_URL";
/// Environment variable holding the caller's `USER_DN`.
pub const ENV_USER_DN: &str = "GMDATA_USER_DN";

/// Connection settings for one GM Data deployment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClientConfig {
    /// URL that GM Data lives at, e.g. `http://localhost:8181`.
    pub base_url: String,
    /// `USER_DN` attached to every request when set.
    #[serde(default)]
    pub identity: Option<String>,
    /// Logging settings for the application. `connect` does not install
    /// them; pass this to [`crate::init_logging`] at startup.
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl ClientConfig {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            identity: None,
            logging: LoggingConfig::default(),
        }
    }

    pub fn with_identity(mut self, identity: impl Into<String>) -> Self {
        self.identity = Some(identity.into());
        self
    }

    pub fn with_logging(mut self, logging: LoggingConfig) -> Self {
        self.logging = logging;
        self
    }

    /// Read `GMDATA_URL` and the optional `GMDATA_USER_DN`.
    pub fn from_env() -> Result<Self> {
        let base_url = std::env::var(ENV_URL)
            .ok()
            .filter(|v| !v.is_empty())
            .ok_or_else(|| DataError::Config(format!("{} is not set", ENV_URL)))?;
        let mut config = Self::new(base_url);
        if let Ok(dn) = std::env::var(ENV_USER_DN) {
            if !dn.is_empty() {
                config.identity = Some(dn);
            }
        }
        Ok(config)
    }
}

/// Options recognised by uploads, appends and directory creation.
///
/// Unset fields are inherited: from the existing node on update, from the
/// parent directory on create.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct WriteOptions {
    pub object_policy: Option<ObjectPolicy>,
    pub security: Option<String>,
    /// Overrides mimetype guessing.
    pub mimetype: Option<String>,
}

impl WriteOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_policy(mut self, policy: ObjectPolicy) -> Self {
        self.object_policy = Some(policy);
        self
    }

    /// Parse a policy given as JSON text.
    pub fn with_policy_text(self, policy: &str) -> Result<Self> {
        Ok(self.with_policy(policy.parse()?))
    }

    pub fn with_security(mut self, security: impl Into<String>) -> Self {
        self.security = Some(security.into());
        self
    }

    pub fn with_mimetype(mut self, mimetype: impl Into<String>) -> Self {
        self.mimetype = Some(mimetype.into());
        self
    }
}
