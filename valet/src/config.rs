//! Process configuration loaded via OrthoConfig.
//!
//! Settings are read once when a component is constructed and never re-read.
//! The store and the relay each own an independent settings struct with its
//! own environment prefix, so a process can configure one without the other.

use ortho_config::OrthoConfig;
use serde::Deserialize;

const DEFAULT_RELAY_REGION: &str = "us-east-1";
const DEFAULT_MODEL_ID: &str = "anthropic.claude-3-5-sonnet-20241022-v2:0";

/// Connection parameters for the tenant-scoped store.
///
/// Host, database name, user, and password are required; only the port
/// carries a default. A missing required value surfaces as a load error at
/// open time, not as a lazily failing connection.
#[derive(Debug, Clone, Deserialize, OrthoConfig)]
#[ortho_config(prefix = "DB")]
pub struct StoreSettings {
    /// Database server host.
    pub host: String,
    /// Database server port.
    #[ortho_config(default = 5432)]
    pub port: u16,
    /// Database name.
    pub name: String,
    /// Role used to authenticate.
    pub user: String,
    /// Password used to authenticate.
    pub password: String,
}

/// Endpoint and model selection for the message relay.
#[derive(Debug, Clone, Deserialize, OrthoConfig)]
#[ortho_config(prefix = "RELAY")]
pub struct RelaySettings {
    /// Region used to derive the default service endpoint.
    pub region: Option<String>,
    /// Model identifier submitted with every invocation.
    pub model_id: Option<String>,
    /// Full endpoint override; when set, `region` is ignored.
    pub endpoint: Option<String>,
    /// Bearer credential passed through to the service verbatim.
    pub api_key: Option<String>,
}

impl RelaySettings {
    /// Return the configured region, falling back to the default.
    pub fn region(&self) -> &str {
        self.region.as_deref().unwrap_or(DEFAULT_RELAY_REGION)
    }

    /// Return the configured model identifier, falling back to the default.
    pub fn model_id(&self) -> &str {
        self.model_id.as_deref().unwrap_or(DEFAULT_MODEL_ID)
    }
}

#[cfg(test)]
mod tests {
    //! Unit tests for settings parsing and fallbacks.

    use super::*;
    use std::ffi::OsString;

    use env_lock::lock_env;
    use rstest::rstest;

    fn load_relay_from_empty_args() -> RelaySettings {
        RelaySettings::load_from_iter([OsString::from("valet")]).expect("relay config should load")
    }

    #[rstest]
    fn relay_defaults_are_used_when_missing() {
        let _guard = lock_env([
            ("RELAY_REGION", None::<String>),
            ("RELAY_MODEL_ID", None::<String>),
            ("RELAY_ENDPOINT", None::<String>),
            ("RELAY_API_KEY", None::<String>),
        ]);

        let settings = load_relay_from_empty_args();
        assert_eq!(settings.region(), DEFAULT_RELAY_REGION);
        assert_eq!(settings.model_id(), DEFAULT_MODEL_ID);
        assert!(settings.endpoint.is_none());
        assert!(settings.api_key.is_none());
    }

    #[rstest]
    fn relay_environment_overrides_are_respected() {
        let _guard = lock_env([
            ("RELAY_REGION", Some("eu-west-2".to_owned())),
            ("RELAY_MODEL_ID", Some("anthropic.claude-test:0".to_owned())),
            ("RELAY_ENDPOINT", Some("http://localhost:4000".to_owned())),
            ("RELAY_API_KEY", Some("sekrit".to_owned())),
        ]);

        let settings = load_relay_from_empty_args();
        assert_eq!(settings.region(), "eu-west-2");
        assert_eq!(settings.model_id(), "anthropic.claude-test:0");
        assert_eq!(settings.endpoint.as_deref(), Some("http://localhost:4000"));
        assert_eq!(settings.api_key.as_deref(), Some("sekrit"));
    }

    #[rstest]
    fn store_port_defaults_when_only_required_values_are_set() {
        let _guard = lock_env([
            ("DB_HOST", Some("db.internal".to_owned())),
            ("DB_PORT", None::<String>),
            ("DB_NAME", Some("valet".to_owned())),
            ("DB_USER", Some("valet".to_owned())),
            ("DB_PASSWORD", Some("hunter2".to_owned())),
        ]);

        let settings = StoreSettings::load_from_iter([OsString::from("valet")])
            .expect("store config should load");
        assert_eq!(settings.host, "db.internal");
        assert_eq!(settings.port, 5432);
        assert_eq!(settings.name, "valet");
    }

    #[rstest]
    fn store_load_fails_when_required_values_are_absent() {
        let _guard = lock_env([
            ("DB_HOST", None::<String>),
            ("DB_PORT", None::<String>),
            ("DB_NAME", None::<String>),
            ("DB_USER", None::<String>),
            ("DB_PASSWORD", None::<String>),
        ]);

        assert!(StoreSettings::load_from_iter([OsString::from("valet")]).is_err());
    }
}
