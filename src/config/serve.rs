//! `server` section configuration.
//!
//! Contains development server settings.

use super::defaults;
use educe::Educe;
use serde::{Deserialize, Deserializer, Serialize, de::Error};

/// `server` section - development server settings.
///
/// # Example
/// ```json
/// "server": { "interface": "0.0.0.0", "port": 8080 }
/// ```
///
/// `port` may also be a string (`"8080"`); an empty string means the default.
#[derive(Debug, Clone, Educe, Serialize, Deserialize)]
#[educe(Default)]
#[serde(deny_unknown_fields)]
pub struct ServeConfig {
    /// Network interface to bind.
    /// - `127.0.0.1` (default): localhost only
    /// - `0.0.0.0`: all interfaces (LAN accessible)
    #[serde(default = "defaults::serve::interface")]
    #[educe(Default = defaults::serve::interface())]
    pub interface: String,

    /// HTTP port number (default: 6780).
    #[serde(
        default = "defaults::serve::port",
        deserialize_with = "port_from_number_or_string"
    )]
    #[educe(Default = defaults::serve::port())]
    pub port: u16,
}

fn port_from_number_or_string<'de, D: Deserializer<'de>>(deserializer: D) -> Result<u16, D::Error> {
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Port {
        Number(u16),
        Text(String),
    }

    match Port::deserialize(deserializer)? {
        Port::Number(port) => Ok(port),
        Port::Text(text) if text.trim().is_empty() => Ok(defaults::serve::port()),
        Port::Text(text) => text
            .trim()
            .parse()
            .map_err(|_| D::Error::custom(format!("invalid port `{text}`"))),
    }
}

#[cfg(test)]
mod tests {
    use super::super::SiteConfig;

    #[test]
    fn test_serve_config() {
        let config = r#"{ "server": { "interface": "0.0.0.0", "port": 8080 } }"#;
        let config = SiteConfig::from_json_str(config).unwrap();

        assert_eq!(config.server.interface, "0.0.0.0");
        assert_eq!(config.server.port, 8080);
    }

    #[test]
    fn test_serve_config_defaults() {
        let config = SiteConfig::from_json_str("{}").unwrap();

        assert_eq!(config.server.interface, "127.0.0.1");
        assert_eq!(config.server.port, 6780);
    }

    #[test]
    fn test_port_as_string() {
        let config = SiteConfig::from_json_str(r#"{ "server": { "port": "8080" } }"#).unwrap();
        assert_eq!(config.server.port, 8080);

        let config = SiteConfig::from_json_str(r#"{ "server": { "port": "" } }"#).unwrap();
        assert_eq!(config.server.port, 6780);

        let config = SiteConfig::from_toml_str("[server]\nport = \"3000\"").unwrap();
        assert_eq!(config.server.port, 3000);
    }

    #[test]
    fn test_invalid_port_rejected() {
        assert!(SiteConfig::from_json_str(r#"{ "server": { "port": "http" } }"#).is_err());
        assert!(SiteConfig::from_json_str(r#"{ "server": { "port": 70000 } }"#).is_err());
    }

    #[test]
    fn test_unknown_field_rejection() {
        let config = r#"{ "server": { "unknown_field": "should_fail" } }"#;
        assert!(SiteConfig::from_json_str(config).is_err());
    }
}
