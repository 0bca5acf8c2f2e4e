//! Configuration management for the RSVP service.
//!
//! This module provides configuration loading and validation using figment,
//! supporting TOML config files, environment variables, and defaults.

use std::fmt;
use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;

use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use serde::{Deserialize, Deserializer, Serialize};

use crate::error::{Error, Result};

/// Default configuration file name.
const CONFIG_FILE_NAME: &str = "config.toml";

/// Default data directory name.
const DATA_DIR_NAME: &str = "rsvp";

/// Default database file name.
const DATABASE_FILE_NAME: &str = "rsvp.db";

/// Prefix for environment overrides, e.g. `RSVP_SERVER__PORT`.
const ENV_PREFIX: &str = "RSVP_";

/// Unprefixed variable also accepted for the admin password.
const ADMIN_PASSWORD_ENV: &str = "ADMIN_PASSWORD";

/// Application configuration.
///
/// Configuration is loaded from (in order of precedence, highest first):
/// 1. `ADMIN_PASSWORD` (admin password only)
/// 2. Environment variables prefixed with `RSVP_`, sections split by `__`
/// 3. TOML config file at `~/.config/rsvp/config.toml`
/// 4. Default values
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Storage configuration.
    pub storage: StorageConfig,
    /// HTTP server configuration.
    pub server: ServerConfig,
    /// Dashboard access.
    pub admin: AdminConfig,
    /// Details about the event itself.
    pub event: EventConfig,
}

/// Storage-related configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// Path to the database file.
    /// Defaults to `~/.local/share/rsvp/rsvp.db`
    pub database_path: Option<PathBuf>,
}

/// HTTP server configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Address to bind.
    pub host: String,
    /// Port to bind.
    pub port: u16,
    /// Sources allowed to embed the form in a frame.
    pub frame_ancestors: Vec<String>,
}

/// Dashboard access configuration.
///
/// With no password set every admin request is refused.
#[derive(Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AdminConfig {
    /// Shared dashboard password.
    #[serde(skip_serializing, deserialize_with = "deserialize_password")]
    pub password: Option<String>,
}

/// Event details used in exports and confirmations.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EventConfig {
    /// Display name, e.g. `Lily & Terron Wedding`.
    pub name: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 3000,
            frame_ancestors: default_frame_ancestors(),
        }
    }
}

impl Default for EventConfig {
    fn default() -> Self {
        Self {
            name: "Lily & Terron Wedding".to_string(),
        }
    }
}

impl fmt::Debug for AdminConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AdminConfig")
            .field("password", &self.password.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}

impl AdminConfig {
    /// The password, if one is set and not blank.
    #[must_use]
    pub fn password(&self) -> Option<&str> {
        self.password.as_deref().filter(|p| !p.trim().is_empty())
    }
}

/// Environment values that look numeric reach us as numbers; a password is
/// always text.
fn deserialize_password<'de, D>(deserializer: D) -> std::result::Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Text(String),
        Unsigned(u64),
        Signed(i64),
        Float(f64),
        Flag(bool),
    }

    Ok(Option::<Raw>::deserialize(deserializer)?.map(|raw| match raw {
        Raw::Text(s) => s,
        Raw::Unsigned(n) => n.to_string(),
        Raw::Signed(n) => n.to_string(),
        Raw::Float(n) => n.to_string(),
        Raw::Flag(b) => b.to_string(),
    }))
}

/// Hosts allowed to frame the form: the site itself and Google Sites.
fn default_frame_ancestors() -> Vec<String> {
    vec![
        "'self'".to_string(),
        "https://*.google.com".to_string(),
        "https://*.googleusercontent.com".to_string(),
        "https://sites.google.com".to_string(),
    ]
}

impl Config {
    /// Load configuration from all sources.
    ///
    /// Configuration is loaded in this order (later sources override earlier):
    /// 1. Default values
    /// 2. TOML config file (if exists)
    /// 3. Environment variables (prefixed with `RSVP_`)
    /// 4. `ADMIN_PASSWORD`
    ///
    /// # Errors
    ///
    /// Returns an error if configuration loading or parsing fails.
    pub fn load() -> Result<Self> {
        Self::load_from(None)
    }

    /// Load configuration with an optional custom config path.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration loading or parsing fails.
    pub fn load_from(config_path: Option<PathBuf>) -> Result<Self> {
        let config_file = config_path.unwrap_or_else(Self::default_config_path);

        let figment = Figment::new()
            .merge(Serialized::defaults(Config::default()))
            .merge(Toml::file(&config_file).nested())
            .merge(Env::prefixed(ENV_PREFIX).split("__"));

        let mut config: Config = figment.extract()?;

        // Taken verbatim so leading zeros survive.
        if let Ok(password) = std::env::var(ADMIN_PASSWORD_ENV) {
            config.admin.password = Some(password);
        }
        config.validate()?;
        Ok(config)
    }

    /// Get the default configuration file path.
    #[must_use]
    pub fn default_config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from(".config"))
            .join(DATA_DIR_NAME)
            .join(CONFIG_FILE_NAME)
    }

    /// Get the default data directory path.
    #[must_use]
    pub fn default_data_dir() -> PathBuf {
        dirs::data_local_dir()
            .unwrap_or_else(|| PathBuf::from(".local/share"))
            .join(DATA_DIR_NAME)
    }

    /// Validate the configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if any configuration values are invalid.
    pub fn validate(&self) -> Result<()> {
        if self.server.port == 0 {
            return Err(Error::ConfigValidation {
                message: "server.port must be greater than 0".to_string(),
            });
        }

        if self.server.host.trim().is_empty() {
            return Err(Error::ConfigValidation {
                message: "server.host cannot be empty".to_string(),
            });
        }

        for source in &self.server.frame_ancestors {
            if source.is_empty() || source.contains(|c: char| c.is_whitespace() || c == ';') {
                return Err(Error::ConfigValidation {
                    message: format!("invalid frame ancestor: {source:?}"),
                });
            }
        }

        if self.event.name.trim().is_empty() {
            return Err(Error::ConfigValidation {
                message: "event.name cannot be empty".to_string(),
            });
        }

        Ok(())
    }

    /// Get the database path, resolving defaults if not set.
    #[must_use]
    pub fn database_path(&self) -> PathBuf {
        self.storage
            .database_path
            .clone()
            .unwrap_or_else(|| Self::default_data_dir().join(DATABASE_FILE_NAME))
    }

    /// The `host:port` the server binds.
    ///
    /// # Errors
    ///
    /// Returns an error if the host is not an IP address.
    pub fn bind_addr(&self) -> Result<SocketAddr> {
        let ip: IpAddr = self
            .server
            .host
            .trim()
            .parse()
            .map_err(|_| Error::ConfigValidation {
                message: format!("invalid bind address: {}", self.server.host),
            })?;
        Ok(SocketAddr::new(ip, self.server.port))
    }

    /// Value of the `Content-Security-Policy` header.
    ///
    /// Empty when no frame ancestors are configured.
    #[must_use]
    pub fn content_security_policy(&self) -> String {
        if self.server.frame_ancestors.is_empty() {
            return String::new();
        }
        format!("frame-ancestors {};", self.server.frame_ancestors.join(" "))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use figment::Jail;

    fn load_in(jail: &Jail) -> figment::error::Result<Config> {
        Config::load_from(Some(jail.directory().join("config.toml")))
            .map_err(|e| e.to_string().into())
    }

    #[test]
    fn test_default_config() {
        let config = Config::default();

        assert_eq!(config.server.host, "127.0.0.1");
        assert_eq!(config.server.port, 3000);
        assert!(config.admin.password.is_none());
        assert_eq!(config.event.name, "Lily & Terron Wedding");
    }

    #[test]
    fn test_default_frame_ancestors() {
        let ancestors = default_frame_ancestors();
        assert_eq!(ancestors[0], "'self'");
        assert!(ancestors.contains(&"https://sites.google.com".to_string()));
    }

    #[test]
    fn test_validate_valid_config() {
        let config = Config::default();
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_zero_port() {
        let mut config = Config::default();
        config.server.port = 0;

        let err = config.validate().unwrap_err().to_string();
        assert!(err.contains("server.port"));
    }

    #[test]
    fn test_validate_empty_event_name() {
        let mut config = Config::default();
        config.event.name = "  ".to_string();

        let err = config.validate().unwrap_err().to_string();
        assert!(err.contains("event.name"));
    }

    #[test]
    fn test_validate_frame_ancestor_injection() {
        let mut config = Config::default();
        config.server.frame_ancestors = vec!["https://ok.example; script-src *".to_string()];

        let err = config.validate().unwrap_err().to_string();
        assert!(err.contains("invalid frame ancestor"));
    }

    #[test]
    fn test_admin_password_blank_is_unset() {
        let mut admin = AdminConfig::default();
        assert!(admin.password().is_none());

        admin.password = Some("   ".to_string());
        assert!(admin.password().is_none());

        admin.password = Some("letmein".to_string());
        assert_eq!(admin.password(), Some("letmein"));
    }

    #[test]
    fn test_admin_debug_redacts_password() {
        let admin = AdminConfig {
            password: Some("hunter2".to_string()),
        };
        let debug_str = format!("{admin:?}");
        assert!(!debug_str.contains("hunter2"));
        assert!(debug_str.contains("redacted"));
    }

    #[test]
    fn test_password_never_serialized() {
        let mut config = Config::default();
        config.admin.password = Some("hunter2".to_string());

        let json = serde_json::to_string(&config).unwrap();
        assert!(!json.contains("hunter2"));
    }

    #[test]
    fn test_database_path_default() {
        let config = Config::default();
        let path = config.database_path();

        assert!(path.to_string_lossy().contains("rsvp.db"));
    }

    #[test]
    fn test_database_path_custom() {
        let mut config = Config::default();
        config.storage.database_path = Some(PathBuf::from("/custom/path/db.sqlite"));

        assert_eq!(
            config.database_path(),
            PathBuf::from("/custom/path/db.sqlite")
        );
    }

    #[test]
    fn test_bind_addr() {
        let config = Config::default();
        assert_eq!(config.bind_addr().unwrap().port(), 3000);

        let mut config = Config::default();
        config.server.host = "::1".to_string();
        assert!(config.bind_addr().unwrap().is_ipv6());

        let mut config = Config::default();
        config.server.host = "not a host".to_string();
        assert!(config.bind_addr().is_err());
    }

    #[test]
    fn test_content_security_policy() {
        let mut config = Config::default();
        config.server.frame_ancestors = vec!["'self'".to_string(), "https://a.example".to_string()];
        assert_eq!(
            config.content_security_policy(),
            "frame-ancestors 'self' https://a.example;"
        );

        config.server.frame_ancestors.clear();
        assert!(config.content_security_policy().is_empty());
    }

    #[test]
    fn test_default_config_path() {
        let path = Config::default_config_path();
        assert!(path.to_string_lossy().contains("rsvp"));
        assert!(path.to_string_lossy().contains("config.toml"));
    }

    #[test]
    fn test_load_nonexistent_config() {
        Jail::expect_with(|jail| {
            jail.clear_env();
            let config = load_in(jail)?;
            assert_eq!(config.server, ServerConfig::default());
            assert_eq!(config.event, EventConfig::default());
            assert!(config.admin.password().is_none());
            Ok(())
        });
    }

    #[test]
    fn test_load_from_toml_file() {
        Jail::expect_with(|jail| {
            jail.create_file(
                "config.toml",
                r#"
                [server]
                port = 8080
                frame_ancestors = ["'self'"]

                [event]
                name = "Garden Party"
                "#,
            )?;

            let config = load_in(jail)?;
            assert_eq!(config.server.port, 8080);
            assert_eq!(config.server.host, "127.0.0.1");
            assert_eq!(config.server.frame_ancestors, vec!["'self'"]);
            assert_eq!(config.event.name, "Garden Party");
            Ok(())
        });
    }

    #[test]
    fn test_load_rejects_invalid_file() {
        Jail::expect_with(|jail| {
            jail.create_file("config.toml", "[server]\nport = 0\n")?;

            let err = Config::load_from(Some(jail.directory().join("config.toml"))).unwrap_err();
            assert!(matches!(err, Error::ConfigValidation { .. }));
            Ok(())
        });
    }

    #[test]
    fn test_prefixed_env_overrides_file() {
        Jail::expect_with(|jail| {
            jail.create_file("config.toml", "[server]\nport = 8080\n\n[admin]\npassword = \"from-file\"\n")?;
            jail.set_env("RSVP_SERVER__PORT", "8081");
            jail.set_env("RSVP_EVENT__NAME", "Garden Party");

            let config = load_in(jail)?;
            assert_eq!(config.server.port, 8081);
            assert_eq!(config.event.name, "Garden Party");
            assert_eq!(config.admin.password(), Some("from-file"));
            Ok(())
        });
    }

    #[test]
    fn test_admin_password_env_wins() {
        Jail::expect_with(|jail| {
            jail.create_file("config.toml", "[admin]\npassword = \"from-file\"\n")?;
            jail.set_env("RSVP_ADMIN__PASSWORD", "from-prefixed");
            jail.set_env("ADMIN_PASSWORD", "from-env");

            let config = load_in(jail)?;
            assert_eq!(config.admin.password(), Some("from-env"));
            Ok(())
        });
    }

    #[test]
    fn test_numeric_admin_passwords_stay_text() {
        Jail::expect_with(|jail| {
            jail.set_env("ADMIN_PASSWORD", "0020260614");
            let config = load_in(jail)?;
            assert_eq!(config.admin.password(), Some("0020260614"));
            Ok(())
        });

        Jail::expect_with(|jail| {
            jail.set_env("RSVP_ADMIN__PASSWORD", "20260614");
            let config = load_in(jail)?;
            assert_eq!(config.admin.password(), Some("20260614"));
            Ok(())
        });
    }

    #[test]
    fn test_server_config_deserialize() {
        let json = r#"{"port": 9000}"#;
        let server: ServerConfig = serde_json::from_str(json).unwrap();
        assert_eq!(server.port, 9000);
        assert_eq!(server.frame_ancestors, default_frame_ancestors());
    }
}
