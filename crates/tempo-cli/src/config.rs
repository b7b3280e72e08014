//! Configuration loading and management.

use std::path::{Path, PathBuf};

use figment::Figment;
use figment::providers::{Env, Format, Serialized, Toml};
use serde::{Deserialize, Serialize};

/// Default service host.
pub const DEFAULT_HOST: &str = "www.tempotrack.com";

/// Application configuration. Command-line flags override all of it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Service host to connect to.
    pub host: String,

    /// Connect over HTTPS.
    pub https: bool,

    /// Default username.
    pub user: Option<String>,

    /// Stored login hash, as printed by `tempo login`.
    pub hash: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: DEFAULT_HOST.to_string(),
            https: false,
            user: None,
            hash: None,
        }
    }
}

impl Config {
    /// Loads configuration, optionally from a specific file.
    ///
    /// Order of precedence, later wins: built-in defaults, the platform
    /// config file, the explicit file, `TEMPO_*` environment variables.
    #[expect(
        clippy::result_large_err,
        reason = "figment::Error is large but only returned at startup"
    )]
    pub fn load_from(config_path: Option<&Path>) -> Result<Self, figment::Error> {
        let mut figment = Figment::from(Serialized::defaults(Self::default()));

        if let Some(config_dir) = dirs_config_path() {
            figment = figment.merge(Toml::file(config_dir.join("config.toml")));
        }

        if let Some(path) = config_path {
            figment = figment.merge(Toml::file(path));
        }

        figment = figment.merge(Env::prefixed("TEMPO_"));

        figment.extract()
    }
}

/// Returns the platform-specific config directory for tempo.
fn dirs_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|p| p.join("tempo"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn defaults_point_at_the_public_host() {
        let config = Config::default();
        assert_eq!(config.host, DEFAULT_HOST);
        assert!(!config.https);
        assert!(config.user.is_none());
    }

    #[test]
    fn explicit_file_overrides_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        let mut file = std::fs::File::create(&path).unwrap();
        writeln!(file, "host = \"tracker.internal\"").unwrap();
        writeln!(file, "https = true").unwrap();
        writeln!(file, "user = \"alice\"").unwrap();

        let config = Config::load_from(Some(&path)).unwrap();
        assert_eq!(config.host, "tracker.internal");
        assert!(config.https);
        assert_eq!(config.user.as_deref(), Some("alice"));
        assert!(config.hash.is_none());
    }

    #[test]
    fn config_dir_ends_with_tempo() {
        if let Some(path) = dirs_config_path() {
            assert_eq!(path.file_name().unwrap(), "tempo");
        }
    }
}
