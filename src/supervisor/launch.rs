//! Launch configuration for a Minecraft server instance.
//!
//! A `LaunchConfig` is immutable once handed to the supervisor. It resolves
//! the on-disk server directory under `<servers_root>/servers/<name>`,
//! which must already contain the launchable `server.jar`.

use std::path::{Path, PathBuf};

use super::error::SupervisorError;

/// Filename of the launchable artifact inside a server directory.
pub const SERVER_JAR: &str = "server.jar";

/// Filename of the license-acceptance marker the artifact checks on boot.
pub const EULA_FILE: &str = "eula.txt";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LaunchConfig {
    /// Initial JVM heap size in gigabytes (`-Xms`).
    pub min_ram_gb: u32,
    /// Maximum JVM heap size in gigabytes (`-Xmx`).
    pub max_ram_gb: u32,
    /// Directory name of the server under `<root>/servers/`.
    pub server_name: String,
}

impl LaunchConfig {
    pub fn new(min_ram_gb: u32, max_ram_gb: u32, server_name: impl Into<String>) -> Self {
        Self {
            min_ram_gb,
            max_ram_gb,
            server_name: server_name.into(),
        }
    }

    /// Check the config before any filesystem work happens.
    ///
    /// The server name is interpolated into a path, so path separators and
    /// parent references are rejected outright.
    pub fn validate(&self) -> Result<(), SupervisorError> {
        if self.min_ram_gb == 0 || self.max_ram_gb == 0 {
            return Err(SupervisorError::InvalidConfig(
                "ram sizes must be positive".into(),
            ));
        }
        if self.min_ram_gb > self.max_ram_gb {
            return Err(SupervisorError::InvalidConfig(format!(
                "min_ram ({}) exceeds max_ram ({})",
                self.min_ram_gb, self.max_ram_gb
            )));
        }
        if self.server_name.is_empty() {
            return Err(SupervisorError::InvalidConfig("server name is empty".into()));
        }
        if self.server_name.contains(['/', '\\']) || self.server_name.contains("..") {
            return Err(SupervisorError::InvalidConfig(format!(
                "server name '{}' contains path components",
                self.server_name
            )));
        }
        Ok(())
    }

    /// Resolve the working directory for this server and verify the layout.
    pub fn resolve_dir(&self, root: &Path) -> Result<PathBuf, SupervisorError> {
        let dir = root.join("servers").join(&self.server_name);
        if !dir.is_dir() {
            return Err(SupervisorError::Launch {
                reason: format!("server directory '{}' does not exist", dir.display()),
            });
        }
        if !dir.join(SERVER_JAR).is_file() {
            return Err(SupervisorError::Launch {
                reason: format!("no {} in '{}'", SERVER_JAR, dir.display()),
            });
        }
        Ok(dir)
    }

    /// JVM argument list for the launch command.
    pub fn java_args(&self) -> Vec<String> {
        vec![
            format!("-Xms{}G", self.min_ram_gb),
            format!("-Xmx{}G", self.max_ram_gb),
            "-jar".to_string(),
            SERVER_JAR.to_string(),
            "nogui".to_string(),
        ]
    }
}

/// Overwrite `eula.txt` in the server directory with an acceptance marker.
///
/// The artifact refuses to boot without it, so this runs before every spawn
/// regardless of any prior content.
pub fn accept_eula(dir: &Path) -> Result<(), SupervisorError> {
    std::fs::write(dir.join(EULA_FILE), "eula=true\n")?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cfg(name: &str) -> LaunchConfig {
        LaunchConfig::new(1, 2, name)
    }

    #[test]
    fn test_validate_accepts_sane_config() {
        assert!(cfg("survival").validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_zero_ram() {
        let c = LaunchConfig::new(0, 2, "s1");
        assert!(matches!(c.validate(), Err(SupervisorError::InvalidConfig(_))));
        let c = LaunchConfig::new(1, 0, "s1");
        assert!(matches!(c.validate(), Err(SupervisorError::InvalidConfig(_))));
    }

    #[test]
    fn test_validate_rejects_inverted_ram() {
        let c = LaunchConfig::new(4, 2, "s1");
        assert!(matches!(c.validate(), Err(SupervisorError::InvalidConfig(_))));
    }

    #[test]
    fn test_validate_rejects_path_components() {
        assert!(cfg("../escape").validate().is_err());
        assert!(cfg("a/b").validate().is_err());
        assert!(cfg("a\\b").validate().is_err());
        assert!(cfg("").validate().is_err());
    }

    #[test]
    fn test_java_args_layout() {
        let args = LaunchConfig::new(2, 8, "s1").java_args();
        assert_eq!(args, ["-Xms2G", "-Xmx8G", "-jar", "server.jar", "nogui"]);
    }

    #[test]
    fn test_resolve_dir_missing() {
        let tmp = tempfile::tempdir().unwrap();
        let err = cfg("ghost").resolve_dir(tmp.path()).unwrap_err();
        assert_eq!(err.error_code(), "LAUNCH_FAILED");
    }

    #[test]
    fn test_resolve_dir_without_jar() {
        let tmp = tempfile::tempdir().unwrap();
        std::fs::create_dir_all(tmp.path().join("servers/s1")).unwrap();
        let err = cfg("s1").resolve_dir(tmp.path()).unwrap_err();
        assert!(err.to_string().contains("server.jar"));
    }

    #[test]
    fn test_resolve_dir_ok() {
        let tmp = tempfile::tempdir().unwrap();
        let dir = tmp.path().join("servers/s1");
        std::fs::create_dir_all(&dir).unwrap();
        std::fs::write(dir.join(SERVER_JAR), b"").unwrap();
        assert_eq!(cfg("s1").resolve_dir(tmp.path()).unwrap(), dir);
    }

    #[test]
    fn test_accept_eula_overwrites() {
        let tmp = tempfile::tempdir().unwrap();
        std::fs::write(tmp.path().join(EULA_FILE), "eula=false\n").unwrap();
        accept_eula(tmp.path()).unwrap();
        let content = std::fs::read_to_string(tmp.path().join(EULA_FILE)).unwrap();
        assert_eq!(content, "eula=true\n");
    }
}
