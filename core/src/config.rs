//! Client settings supplied by the host at start-up.
//!
//! Hosts pass settings as a JSON object; every field is optional and falls
//! back to the built-in defaults. An empty string means "all defaults".

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::cache::FetchPolicy;
use crate::endpoint::{Endpoint, DEFAULT_PATH, DEFAULT_PORT, DEFAULT_SCHEME, FALLBACK_HOST};
use crate::error::ConfigError;

pub const DEFAULT_TIMEOUT_SECS: u64 = 10;
pub const DEFAULT_CERTIFICATE: &str = "server.cer";

/// Which revision of the client to assemble.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ClientVariant {
    /// Logging and error links over a plain HTTP link.
    #[default]
    Basic,
    /// Adds certificate pinning and the fixed request timeout.
    Pinned,
    /// As `Pinned`, with the host resolved by gateway discovery.
    Discovered,
}

impl ClientVariant {
    pub fn name(self) -> &'static str {
        match self {
            ClientVariant::Basic => "basic",
            ClientVariant::Pinned => "pinned",
            ClientVariant::Discovered => "discovered",
        }
    }

    pub fn requires_pin(self) -> bool {
        !matches!(self, ClientVariant::Basic)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientSettings {
    pub variant: ClientVariant,
    pub scheme: String,
    /// Static host, and the fallback when discovery finds nothing.
    pub host: String,
    pub port: u16,
    pub path: String,
    pub certificate_name: String,
    pub fetch_policy: FetchPolicy,
}

impl Default for ClientSettings {
    fn default() -> Self {
        Self {
            variant: ClientVariant::default(),
            scheme: DEFAULT_SCHEME.to_string(),
            host: FALLBACK_HOST.to_string(),
            port: DEFAULT_PORT,
            path: DEFAULT_PATH.to_string(),
            certificate_name: DEFAULT_CERTIFICATE.to_string(),
            fetch_policy: FetchPolicy::default(),
        }
    }
}

impl ClientSettings {
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        if json.trim().is_empty() {
            return Ok(Self::default());
        }
        let settings: Self =
            serde_json::from_str(json).map_err(|e| ConfigError::Parse(e.to_string()))?;
        settings.validate()?;
        Ok(settings)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.host.trim().is_empty() {
            return Err(ConfigError::EmptyHost);
        }
        if self.port == 0 {
            return Err(ConfigError::InvalidPort);
        }
        if self.scheme != "https" && self.scheme != "http" {
            return Err(ConfigError::InvalidScheme(self.scheme.clone()));
        }
        if !self.path.starts_with('/') {
            return Err(ConfigError::InvalidPath(self.path.clone()));
        }
        Ok(())
    }

    /// The configured endpoint before any discovery.
    pub fn endpoint(&self) -> Endpoint {
        Endpoint::new(&self.scheme, &self.host, self.port, &self.path)
    }

    /// Request timeout, fixed for the pinned variants. The basic client
    /// leaves timing to the host.
    pub fn timeout(&self) -> Option<Duration> {
        match self.variant {
            ClientVariant::Basic => None,
            ClientVariant::Pinned | ClientVariant::Discovered => {
                Some(Duration::from_secs(DEFAULT_TIMEOUT_SECS))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_json_means_defaults() {
        let settings = ClientSettings::from_json("  ").unwrap();
        assert_eq!(settings, ClientSettings::default());
        assert_eq!(settings.endpoint().url(), "https://192.168.77.151:8443/graphql");
        assert!(settings.timeout().is_none());
    }

    #[test]
    fn partial_json_keeps_other_defaults() {
        let settings =
            ClientSettings::from_json(r#"{"variant":"pinned","host":"10.1.1.5"}"#).unwrap();
        assert_eq!(settings.variant, ClientVariant::Pinned);
        assert_eq!(settings.host, "10.1.1.5");
        assert_eq!(settings.port, 8443);
        assert_eq!(settings.timeout(), Some(Duration::from_secs(10)));
        assert_eq!(settings.certificate_name, "server.cer");
    }

    #[test]
    fn invalid_values_are_rejected() {
        assert_eq!(
            ClientSettings::from_json(r#"{"host":""}"#),
            Err(ConfigError::EmptyHost)
        );
        assert_eq!(
            ClientSettings::from_json(r#"{"port":0}"#),
            Err(ConfigError::InvalidPort)
        );
        assert_eq!(
            ClientSettings::from_json(r#"{"scheme":"ftp"}"#),
            Err(ConfigError::InvalidScheme("ftp".into()))
        );
        assert_eq!(
            ClientSettings::from_json(r#"{"path":"graphql"}"#),
            Err(ConfigError::InvalidPath("graphql".into()))
        );
    }

    #[test]
    fn timeout_is_not_configurable() {
        let settings =
            ClientSettings::from_json(r#"{"variant":"discovered","timeout_secs":0}"#).unwrap();
        assert_eq!(settings.timeout(), Some(Duration::from_secs(10)));
    }

    #[test]
    fn malformed_json_is_parse_error() {
        assert!(matches!(
            ClientSettings::from_json("{"),
            Err(ConfigError::Parse(_))
        ));
        assert!(matches!(
            ClientSettings::from_json(r#"{"variant":"quantum"}"#),
            Err(ConfigError::Parse(_))
        ));
    }

    #[test]
    fn only_basic_skips_pinning() {
        assert!(!ClientVariant::Basic.requires_pin());
        assert!(ClientVariant::Pinned.requires_pin());
        assert!(ClientVariant::Discovered.requires_pin());
    }
}
