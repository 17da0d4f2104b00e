//! Application directories for Chalice.
//!
//! Everything lives under `~/.chalice` unless `CHALICE_HOME` points elsewhere.

use std::path::PathBuf;

/// Primary home directory name.
pub const HOME_DIR_NAME: &str = ".chalice";

/// Environment variable overriding the home directory.
pub const HOME_ENV_VAR: &str = "CHALICE_HOME";

/// Application directories structure
#[derive(Debug, Clone)]
pub struct AppDirs {
    /// Root of all Chalice state (`~/.chalice`)
    pub home: PathBuf,
    /// Default output directory for generated discovery stubs
    pub stubs_dir: PathBuf,
}

impl AppDirs {
    /// Resolve directories, honouring `CHALICE_HOME`.
    ///
    /// Relative override values are resolved against the current directory.
    pub fn new() -> Option<Self> {
        let home = match std::env::var_os(HOME_ENV_VAR) {
            Some(value) if !value.is_empty() => {
                let path = PathBuf::from(value);
                if path.is_relative() {
                    std::env::current_dir().ok()?.join(path)
                } else {
                    path
                }
            }
            _ => dirs::home_dir()?.join(HOME_DIR_NAME),
        };

        Some(Self {
            stubs_dir: home.join("servers"),
            home,
        })
    }

    /// Path of the primary config file (config.toml)
    pub fn config_file(&self) -> PathBuf {
        self.home.join("config.toml")
    }
}

/// Get the Chalice home directory
pub fn get_chalice_home() -> Option<PathBuf> {
    AppDirs::new().map(|dirs| dirs.home)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    #[test]
    #[serial]
    fn test_config_file_path() {
        let dirs = AppDirs::new().unwrap();
        assert!(dirs.config_file().ends_with("config.toml"));
        assert!(dirs.stubs_dir.starts_with(&dirs.home));
    }

    #[test]
    #[serial]
    fn test_env_override() {
        let test_path = std::env::temp_dir().join("test-chalice");
        // SAFETY: serialized with the other env-mutating tests
        unsafe {
            std::env::set_var(HOME_ENV_VAR, &test_path);
        }
        let dirs = AppDirs::new().unwrap();
        unsafe {
            std::env::remove_var(HOME_ENV_VAR);
        }
        assert_eq!(dirs.home, test_path);
        assert_eq!(dirs.config_file(), test_path.join("config.toml"));
    }
}
