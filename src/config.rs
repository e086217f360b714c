// Configuration module: every knob the client and the batch workflow need,
// resolved once at startup and handed to the components that use it.
// Values come from `HME_*` environment variables with built-in defaults.

use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;

pub const DEFAULT_BASE_URL: &str = "https://p68-maildomainws.icloud.com/v1/hme";
pub const DEFAULT_BUILD_NUMBER: &str = "2206Hotfix11";
pub const DEFAULT_LABEL: &str = "rtuna's gen";
pub const DEFAULT_NOTE: &str = "Generated by the hme-cli batch generator";
pub const DEFAULT_COOKIE_FILE: &str = "cookie.txt";
pub const DEFAULT_OUTPUT_FILE: &str = "emails.txt";
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);
pub const DEFAULT_CONCURRENCY: usize = 10;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{key} must be a positive integer, got {value:?}")]
    InvalidNumber { key: &'static str, value: String },
}

/// Runtime configuration shared by the API client and the orchestrator.
///
/// `client_id` and `dsid` are sent as query parameters but have no known
/// working default; they stay empty unless set through the environment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub base_url: String,
    pub client_build_number: String,
    pub client_mastering_number: String,
    pub client_id: String,
    pub dsid: String,
    pub label: String,
    pub note: String,
    pub cookie_file: PathBuf,
    pub output_file: PathBuf,
    pub timeout: Duration,
    pub concurrency: usize,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            base_url: DEFAULT_BASE_URL.into(),
            client_build_number: DEFAULT_BUILD_NUMBER.into(),
            client_mastering_number: DEFAULT_BUILD_NUMBER.into(),
            client_id: String::new(),
            dsid: String::new(),
            label: DEFAULT_LABEL.into(),
            note: DEFAULT_NOTE.into(),
            cookie_file: PathBuf::from(DEFAULT_COOKIE_FILE),
            output_file: PathBuf::from(DEFAULT_OUTPUT_FILE),
            timeout: DEFAULT_TIMEOUT,
            concurrency: DEFAULT_CONCURRENCY,
        }
    }
}

impl Config {
    /// Build the configuration from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build the configuration from an arbitrary key lookup. Unset keys keep
    /// their defaults.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Config::default();

        if let Some(v) = lookup("HME_BASE_URL") {
            config.base_url = v.trim_end_matches('/').to_string();
        }
        if let Some(v) = lookup("HME_CLIENT_BUILD_NUMBER") {
            config.client_build_number = v;
        }
        if let Some(v) = lookup("HME_CLIENT_MASTERING_NUMBER") {
            config.client_mastering_number = v;
        }
        if let Some(v) = lookup("HME_CLIENT_ID") {
            config.client_id = v;
        }
        if let Some(v) = lookup("HME_DSID") {
            config.dsid = v;
        }
        if let Some(v) = lookup("HME_LABEL") {
            config.label = v;
        }
        if let Some(v) = lookup("HME_NOTE") {
            config.note = v;
        }
        if let Some(v) = lookup("HME_COOKIE_FILE") {
            config.cookie_file = PathBuf::from(v);
        }
        if let Some(v) = lookup("HME_OUTPUT_FILE") {
            config.output_file = PathBuf::from(v);
        }
        if let Some(v) = lookup("HME_TIMEOUT_SECS") {
            config.timeout = Duration::from_secs(positive("HME_TIMEOUT_SECS", &v)? as u64);
        }
        if let Some(v) = lookup("HME_CONCURRENCY") {
            config.concurrency = positive("HME_CONCURRENCY", &v)?;
        }

        Ok(config)
    }

    /// Copy of this configuration carrying the label chosen for one run.
    pub fn with_label(&self, label: impl Into<String>) -> Self {
        Config {
            label: label.into(),
            ..self.clone()
        }
    }

    /// Fixed query parameters attached to every request.
    pub fn query_params(&self) -> [(&'static str, &str); 4] {
        [
            ("clientBuildNumber", self.client_build_number.as_str()),
            ("clientMasteringNumber", self.client_mastering_number.as_str()),
            ("clientId", self.client_id.as_str()),
            ("dsid", self.dsid.as_str()),
        ]
    }

    /// Cookie file to read: the configured path, or the copy kept in the
    /// user's config directory when the configured one does not exist.
    pub fn resolve_cookie_file(&self) -> PathBuf {
        if self.cookie_file.exists() || self.cookie_file.is_absolute() {
            return self.cookie_file.clone();
        }
        dirs::config_dir()
            .map(|dir| dir.join("hme-cli").join(&self.cookie_file))
            .filter(|candidate| candidate.exists())
            .unwrap_or_else(|| self.cookie_file.clone())
    }
}

fn positive(key: &'static str, value: &str) -> Result<usize, ConfigError> {
    match value.trim().parse::<usize>() {
        Ok(n) if n > 0 => Ok(n),
        _ => Err(ConfigError::InvalidNumber {
            key,
            value: value.to_string(),
        }),
    }
}
