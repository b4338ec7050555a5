//! Server configuration loaded from environment variables.

/// Server configuration.
///
/// Reads from environment variables:
/// - `HOST`: bind address (default `0.0.0.0`)
/// - `PORT`: listen port (default `8000`)
/// - `RUST_LOG`: tracing filter directive (default `info`)
/// - `HOTEL_STAFF_USER`: if set, a staff token is issued for this username at startup
/// - `HOTEL_SEED_ROOMS`: seed a demo inventory when truthy (default off)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub log_level: String,
    pub staff_user: Option<String>,
    pub seed_rooms: bool,
}

impl Config {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds a config from any key lookup; unset or unparseable values fall
    /// back to defaults.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();
        Self {
            host: lookup("HOST").unwrap_or(defaults.host),
            port: lookup("PORT")
                .and_then(|p| p.trim().parse().ok())
                .unwrap_or(defaults.port),
            log_level: lookup("RUST_LOG").unwrap_or(defaults.log_level),
            staff_user: lookup("HOTEL_STAFF_USER")
                .map(|u| u.trim().to_string())
                .filter(|u| !u.is_empty()),
            seed_rooms: lookup("HOTEL_SEED_ROOMS").is_some_and(|v| is_truthy(&v)),
        }
    }

    /// The `host:port` bind address.
    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8000,
            log_level: "info".to_string(),
            staff_user: None,
            seed_rooms: false,
        }
    }
}

fn is_truthy(value: &str) -> bool {
    matches!(
        value.trim().to_ascii_lowercase().as_str(),
        "1" | "true" | "yes" | "on"
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults_when_unset() {
        let config = Config::from_lookup(lookup(&[]));
        assert_eq!(config, Config::default());
        assert_eq!(config.addr(), "0.0.0.0:8000");
    }

    #[test]
    fn test_reads_every_key() {
        let config = Config::from_lookup(lookup(&[
            ("HOST", "127.0.0.1"),
            ("PORT", "9100"),
            ("RUST_LOG", "debug"),
            ("HOTEL_STAFF_USER", " frontdesk "),
            ("HOTEL_SEED_ROOMS", "Yes"),
        ]));
        assert_eq!(config.addr(), "127.0.0.1:9100");
        assert_eq!(config.log_level, "debug");
        assert_eq!(config.staff_user.as_deref(), Some("frontdesk"));
        assert!(config.seed_rooms);
    }

    #[test]
    fn test_bad_values_fall_back() {
        let config = Config::from_lookup(lookup(&[
            ("PORT", "eighty"),
            ("HOTEL_STAFF_USER", "   "),
            ("HOTEL_SEED_ROOMS", "maybe"),
        ]));
        assert_eq!(config.port, 8000);
        assert_eq!(config.staff_user, None);
        assert!(!config.seed_rooms);
    }
}
