use std::env;

use crate::ServerError;

pub const HOST_VAR: &str = "DUAL_CAPTURE_HOST";
pub const PORT_VAR: &str = "DUAL_CAPTURE_PORT";
pub const SEED_VAR: &str = "DUAL_CAPTURE_SEED";

/// Listener and startup options for the capture service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// Insert the demo records when the store starts empty.
    pub seed_demo_data: bool,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".into(),
            port: 5000,
            seed_demo_data: true,
        }
    }
}

impl ServerConfig {
    /// Defaults overridden by `DUAL_CAPTURE_HOST`, `DUAL_CAPTURE_PORT` and
    /// `DUAL_CAPTURE_SEED`.
    pub fn from_env() -> Result<Self, ServerError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ServerError> {
        let mut config = Self::default();

        if let Some(host) = lookup(HOST_VAR) {
            config.host = host.trim().to_string();
        }
        if let Some(port) = lookup(PORT_VAR) {
            config.port = port
                .trim()
                .parse()
                .map_err(|_| ServerError::Config(format!("{} is not a port: {:?}", PORT_VAR, port)))?;
        }
        if let Some(seed) = lookup(SEED_VAR) {
            config.seed_demo_data = parse_flag(&seed)
                .ok_or_else(|| ServerError::Config(format!("{} is not a boolean: {:?}", SEED_VAR, seed)))?;
        }

        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ServerError> {
        if self.host.is_empty() {
            return Err(ServerError::Config("host must not be empty".into()));
        }
        if self.host.chars().any(char::is_whitespace) {
            return Err(ServerError::Config(format!("invalid host: {:?}", self.host)));
        }
        Ok(())
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

fn parse_flag(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn defaults_without_overrides() {
        let config = ServerConfig::from_lookup(lookup(&[])).unwrap();
        assert_eq!(config, ServerConfig::default());
        assert_eq!(config.bind_address(), "127.0.0.1:5000");
    }

    #[test]
    fn overrides_apply() {
        let config = ServerConfig::from_lookup(lookup(&[
            (HOST_VAR, "0.0.0.0"),
            (PORT_VAR, "8080"),
            (SEED_VAR, "off"),
        ]))
        .unwrap();
        assert_eq!(config.bind_address(), "0.0.0.0:8080");
        assert!(!config.seed_demo_data);
    }

    #[test]
    fn bad_values_are_rejected() {
        assert!(matches!(
            ServerConfig::from_lookup(lookup(&[(PORT_VAR, "70000")])),
            Err(ServerError::Config(_))
        ));
        assert!(ServerConfig::from_lookup(lookup(&[(SEED_VAR, "maybe")])).is_err());
        assert!(ServerConfig::from_lookup(lookup(&[(HOST_VAR, "  ")])).is_err());
    }
}
