//! Daemon configuration, loaded from `config/global.toml` with `CRAFTDECK_*`
//! environment overrides. Missing file or keys fall back to defaults.

use std::path::PathBuf;

use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    /// Address the HTTP/WebSocket server binds to.
    #[serde(default = "default_listen_addr")]
    pub listen_addr: String,
    /// Directory containing the `servers/<name>/` layout.
    #[serde(default = "default_servers_root")]
    pub servers_root: PathBuf,
    /// Launcher binary. Overridable for tests and non-standard JVM installs.
    #[serde(default = "default_java_bin")]
    pub java_bin: String,
}

fn default_listen_addr() -> String {
    "127.0.0.1:57600".to_string()
}

fn default_servers_root() -> PathBuf {
    PathBuf::from(".")
}

fn default_java_bin() -> String {
    "java".to_string()
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            listen_addr: default_listen_addr(),
            servers_root: default_servers_root(),
            java_bin: default_java_bin(),
        }
    }
}

impl AppConfig {
    /// Load from `config/global.toml`, tolerating a missing or broken file,
    /// then apply environment overrides.
    pub fn load() -> Self {
        let s = std::fs::read_to_string("config/global.toml").unwrap_or_default();
        Self::from_toml_str(&s).with_env_overrides()
    }

    pub fn from_toml_str(s: &str) -> Self {
        toml::from_str(s).unwrap_or_default()
    }

    fn with_env_overrides(mut self) -> Self {
        if let Ok(addr) = std::env::var("CRAFTDECK_LISTEN_ADDR") {
            self.listen_addr = addr;
        }
        if let Ok(root) = std::env::var("CRAFTDECK_SERVERS_ROOT") {
            self.servers_root = PathBuf::from(root);
        }
        if let Ok(bin) = std::env::var("CRAFTDECK_JAVA_BIN") {
            self.java_bin = bin;
        }
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let cfg = AppConfig::default();
        assert_eq!(cfg.listen_addr, "127.0.0.1:57600");
        assert_eq!(cfg.servers_root, PathBuf::from("."));
        assert_eq!(cfg.java_bin, "java");
    }

    #[test]
    fn test_empty_toml_falls_back_to_defaults() {
        let cfg = AppConfig::from_toml_str("");
        assert_eq!(cfg.java_bin, "java");
    }

    #[test]
    fn test_partial_toml() {
        let cfg = AppConfig::from_toml_str("listen_addr = \"0.0.0.0:8080\"\n");
        assert_eq!(cfg.listen_addr, "0.0.0.0:8080");
        assert_eq!(cfg.java_bin, "java");
    }

    #[test]
    fn test_broken_toml_falls_back_to_defaults() {
        let cfg = AppConfig::from_toml_str("listen_addr = [not toml");
        assert_eq!(cfg.listen_addr, "127.0.0.1:57600");
    }
}
