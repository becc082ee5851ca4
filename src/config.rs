use directories::BaseDirs;
use dotenvy::dotenv;
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::PathBuf;

use crate::errors::ConfigError;

/// Credentials taken from the environment (or a `.env` file).
pub static ENV_CREDENTIALS: Lazy<EnvCredentials> = Lazy::new(|| {
    dotenv().ok(); // Load .env file if present
    EnvCredentials {
        api_key: get_env("GOOGLE_API_KEY"),
        cse_id: get_env("GOOGLE_CSE_ID"),
    }
});

#[derive(Debug, Default)]
pub struct EnvCredentials {
    pub api_key: Option<String>,
    pub cse_id: Option<String>,
}

fn get_env(key: &str) -> Option<String> {
    env::var(key).ok().filter(|v| !v.trim().is_empty())
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GoogleCredentials {
    pub api_key: String,
    pub cse_id: String,
}

/// On-disk shape of `~/.config/gdorker/config.json`.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq, Eq)]
pub struct ConfigFile {
    #[serde(default)]
    pub google_api_key: String,
    #[serde(default)]
    pub google_cse_id: String,
}

pub struct ConfigManager {
    path: PathBuf,
}

impl ConfigManager {
    /// Uses `path` or falls back to `~/.config/gdorker/config.json`.
    /// The file is created with empty values if it does not exist yet.
    pub fn open(path: Option<PathBuf>) -> Result<ConfigManager, ConfigError> {
        let path = match path {
            Some(path) => path,
            None => default_config_path()?,
        };
        let manager = ConfigManager { path };
        manager.ensure_exists()?;
        Ok(manager)
    }

    fn ensure_exists(&self) -> Result<(), ConfigError> {
        if self.path.is_file() {
            return Ok(());
        }
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|source| self.io_error(source))?;
        }
        let defaults = serde_json::to_string_pretty(&ConfigFile::default()).map_err(|source| {
            ConfigError::Parse {
                path: self.path.clone(),
                source,
            }
        })?;
        fs::write(&self.path, defaults).map_err(|source| self.io_error(source))?;
        log::debug!("created default config at {}", self.path.display());
        Ok(())
    }

    pub fn load(&self) -> Result<ConfigFile, ConfigError> {
        let content = fs::read_to_string(&self.path).map_err(|source| self.io_error(source))?;
        serde_json::from_str(&content).map_err(|source| ConfigError::Parse {
            path: self.path.clone(),
            source,
        })
    }

    /// Resolves Google credentials: command line first, then the environment,
    /// then the config file. Blank values count as unset.
    pub fn google_credentials(
        &self,
        cli_api_key: Option<&str>,
        cli_cse_id: Option<&str>,
    ) -> Result<GoogleCredentials, ConfigError> {
        self.resolve_credentials(cli_api_key, cli_cse_id, &ENV_CREDENTIALS)
    }

    pub fn resolve_credentials(
        &self,
        cli_api_key: Option<&str>,
        cli_cse_id: Option<&str>,
        env_credentials: &EnvCredentials,
    ) -> Result<GoogleCredentials, ConfigError> {
        let file = self.load()?;

        let api_key = first_non_blank([
            cli_api_key,
            env_credentials.api_key.as_deref(),
            Some(file.google_api_key.as_str()),
        ]);
        let cse_id = first_non_blank([
            cli_cse_id,
            env_credentials.cse_id.as_deref(),
            Some(file.google_cse_id.as_str()),
        ]);

        match (api_key, cse_id) {
            (Some(api_key), Some(cse_id)) => Ok(GoogleCredentials { api_key, cse_id }),
            _ => Err(ConfigError::MissingCredentials {
                path: self.path.clone(),
            }),
        }
    }

    fn io_error(&self, source: std::io::Error) -> ConfigError {
        ConfigError::Io {
            path: self.path.clone(),
            source,
        }
    }
}

fn first_non_blank(candidates: [Option<&str>; 3]) -> Option<String> {
    candidates
        .into_iter()
        .flatten()
        .map(str::trim)
        .find(|v| !v.is_empty())
        .map(str::to_string)
}

pub fn default_config_path() -> Result<PathBuf, ConfigError> {
    let dirs = BaseDirs::new().ok_or(ConfigError::NoHomeDir)?;
    Ok(dirs
        .home_dir()
        .join(".config")
        .join("gdorker")
        .join("config.json"))
}
