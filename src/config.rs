//! Application configuration loaded from CLI, environment, and files.
//!
//! A unified configuration struct merges values from command-line
//! arguments, environment variables, and configuration files using
//! ortho-config's layered approach.
//!
//! # Precedence
//!
//! Configuration values are loaded with the following precedence (lowest to
//! highest):
//!
//! 1. **Defaults** – Built-in application defaults
//! 2. **Configuration file** – `.pr-radar.toml` in current directory, home
//!    directory, or XDG config directory
//! 3. **Environment variables** – `PR_RADAR_USER`, `PR_RADAR_TOKEN`, or
//!    legacy `GITHUB_TOKEN`
//! 4. **Command-line arguments** – `--user`/`-u` and `--token`/`-t`

use std::env;
use std::fs;

use ortho_config::OrthoConfig;
use serde::{Deserialize, Serialize};

use crate::filtering::MuteConfiguration;
use crate::github::error::RefreshError;
use crate::model::UserLogin;

/// Application configuration supporting CLI, environment, and file sources.
///
/// # Environment Variables
///
/// - `PR_RADAR_USER` or `--user`: Login whose review activity is tracked
/// - `PR_RADAR_TOKEN`, `GITHUB_TOKEN`, or `--token`: Authentication token
/// - `PR_RADAR_API_URL` or `--api-url`: API base URL for enterprise hosts
/// - `PR_RADAR_MUTE_CONFIG` or `--mute-config`: Path to a JSON mute
///   configuration file
#[derive(Debug, Clone, Default, Deserialize, Serialize, OrthoConfig)]
#[serde(default)]
#[ortho_config(
    prefix = "PR_RADAR",
    discovery(
        dotfile_name = ".pr-radar.toml",
        config_file_name = "pr-radar.toml",
        app_name = "pr-radar"
    )
)]
pub struct RadarConfig {
    /// Login of the user whose pull request activity is synchronised.
    ///
    /// Can be provided via:
    /// - CLI: `--user <LOGIN>` or `-u <LOGIN>`
    /// - Environment: `PR_RADAR_USER`
    /// - Config file: `user = "..."`
    #[ortho_config(cli_short = 'u')]
    pub user: Option<String>,

    /// Personal access token for API authentication.
    ///
    /// Can be provided via:
    /// - CLI: `--token <TOKEN>` or `-t <TOKEN>`
    /// - Environment: `PR_RADAR_TOKEN` or `GITHUB_TOKEN` (legacy)
    /// - Config file: `token = "..."`
    #[ortho_config(cli_short = 't')]
    pub token: Option<String>,

    /// API base URL, for enterprise deployments.
    ///
    /// Defaults to the public API host when unset.
    ///
    /// Can be provided via:
    /// - CLI: `--api-url <URL>`
    /// - Environment: `PR_RADAR_API_URL`
    /// - Config file: `api_url = "..."`
    #[ortho_config()]
    pub api_url: Option<String>,

    /// Path to a JSON file holding the persisted [`MuteConfiguration`].
    ///
    /// When unset, a default (empty) mute configuration is used.
    ///
    /// Can be provided via:
    /// - CLI: `--mute-config <PATH>`
    /// - Environment: `PR_RADAR_MUTE_CONFIG`
    /// - Config file: `mute_config = "..."`
    #[ortho_config(cli_short = 'm')]
    pub mute_config: Option<String>,
}

impl RadarConfig {
    /// Resolves the token from configuration or the legacy `GITHUB_TOKEN`
    /// environment variable.
    ///
    /// # Errors
    ///
    /// Returns [`RefreshError::MissingToken`] when no token source provides
    /// a value.
    pub fn resolve_token(&self) -> Result<String, RefreshError> {
        self.token
            .clone()
            .or_else(|| env::var("GITHUB_TOKEN").ok())
            .ok_or(RefreshError::MissingToken)
    }

    /// Returns the configured user login, validated.
    ///
    /// # Errors
    ///
    /// Returns [`RefreshError::Configuration`] when no login is configured,
    /// or [`RefreshError::InvalidLogin`] when the configured value fails
    /// validation.
    pub fn require_user(&self) -> Result<UserLogin, RefreshError> {
        let user = self.user.as_deref().ok_or(RefreshError::Configuration {
            message: "user login is required (use --user or -u)".to_owned(),
        })?;
        UserLogin::new(user)
    }

    /// Loads the mute configuration from the configured path, or a default
    /// when no path is set.
    ///
    /// # Errors
    ///
    /// Returns [`RefreshError::Io`] when the file cannot be read and
    /// [`RefreshError::Configuration`] when it does not parse as a mute
    /// configuration.
    pub fn load_mute_configuration(&self) -> Result<MuteConfiguration, RefreshError> {
        let Some(path) = self.mute_config.as_deref() else {
            return Ok(MuteConfiguration::default());
        };
        let contents = fs::read_to_string(path).map_err(|error| RefreshError::Io {
            message: format!("failed to read mute configuration at {path}: {error}"),
        })?;
        serde_json::from_str(&contents).map_err(|error| RefreshError::Configuration {
            message: format!("invalid mute configuration at {path}: {error}"),
        })
    }
}
