//! Settings loaded via OrthoConfig.
//!
//! Values come from `HUNTS_*` environment variables, configuration files, and
//! command-line overrides, in OrthoConfig's usual precedence.

use std::fmt;
use std::str::FromStr;

use ortho_config::OrthoConfig;
use serde::Deserialize;

const DEFAULT_COLLECTION: &str = "hunts";

/// Output format for log lines.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    /// One JSON object per line.
    #[default]
    Json,
    /// Human-readable multi-field lines.
    Pretty,
}

/// Error returned for an unrecognised log format.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown log format `{0}`; expected `json` or `pretty`")]
pub struct UnknownLogFormat(String);

impl FromStr for LogFormat {
    type Err = UnknownLogFormat;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "json" => Ok(Self::Json),
            "pretty" => Ok(Self::Pretty),
            _ => Err(UnknownLogFormat(s.to_owned())),
        }
    }
}

impl fmt::Display for LogFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Json => f.write_str("json"),
            Self::Pretty => f.write_str("pretty"),
        }
    }
}

/// Settings for the hunts client.
#[derive(Debug, Clone, Deserialize, OrthoConfig)]
#[ortho_config(prefix = "HUNTS")]
pub struct HuntsSettings {
    /// Remote collection holding hunt documents.
    pub collection: Option<String>,
    /// `json` or `pretty`.
    pub log_format: Option<String>,
    /// Hosted backend project identifier.
    pub project_id: Option<String>,
    /// Hosted backend API key.
    pub api_key: Option<String>,
    /// Authentication domain for the hosted backend.
    pub auth_domain: Option<String>,
    /// Hosted backend application identifier.
    pub app_id: Option<String>,
    pub storage_bucket: Option<String>,
    pub messaging_sender_id: Option<String>,
}

impl HuntsSettings {
    /// Return the configured collection name, falling back to `hunts`.
    pub fn collection(&self) -> &str {
        self.collection
            .as_deref()
            .map(str::trim)
            .filter(|name| !name.is_empty())
            .unwrap_or(DEFAULT_COLLECTION)
    }

    /// Parse the configured log format, falling back to JSON.
    pub fn log_format(&self) -> Result<LogFormat, UnknownLogFormat> {
        self.log_format
            .as_deref()
            .map_or(Ok(LogFormat::default()), LogFormat::from_str)
    }

    /// Whether every identifier needed to reach the hosted backend is set.
    pub fn hosted_backend_configured(&self) -> bool {
        [&self.project_id, &self.api_key, &self.auth_domain, &self.app_id]
            .iter()
            .all(|value| value.as_deref().is_some_and(|v| !v.trim().is_empty()))
    }
}

#[cfg(test)]
mod tests {
    //! Unit tests for settings parsing.

    use super::*;
    use std::ffi::OsString;

    use env_lock::lock_env;
    use rstest::rstest;

    const VARS: [&str; 8] = [
        "HUNTS_COLLECTION",
        "HUNTS_LOG_FORMAT",
        "HUNTS_PROJECT_ID",
        "HUNTS_API_KEY",
        "HUNTS_AUTH_DOMAIN",
        "HUNTS_APP_ID",
        "HUNTS_STORAGE_BUCKET",
        "HUNTS_MESSAGING_SENDER_ID",
    ];

    fn load_from_empty_args() -> HuntsSettings {
        HuntsSettings::load_from_iter([OsString::from("hunt-console")]).expect("config should load")
    }

    #[rstest]
    fn default_values_are_used_when_missing() {
        let _guard = lock_env(VARS.map(|var| (var, None::<String>)));

        let settings = load_from_empty_args();
        assert_eq!(settings.collection(), DEFAULT_COLLECTION);
        assert_eq!(settings.log_format(), Ok(LogFormat::Json));
        assert!(!settings.hosted_backend_configured());
    }

    #[rstest]
    fn environment_overrides_are_respected() {
        let _guard = lock_env([
            ("HUNTS_COLLECTION", Some("hunts-staging".to_owned())),
            ("HUNTS_LOG_FORMAT", Some("pretty".to_owned())),
            ("HUNTS_PROJECT_ID", Some("hunt-app".to_owned())),
            ("HUNTS_API_KEY", Some("key".to_owned())),
            ("HUNTS_AUTH_DOMAIN", Some("hunt-app.example.com".to_owned())),
            ("HUNTS_APP_ID", Some("1:web:abc".to_owned())),
            ("HUNTS_STORAGE_BUCKET", None),
            ("HUNTS_MESSAGING_SENDER_ID", None),
        ]);

        let settings = load_from_empty_args();
        assert_eq!(settings.collection(), "hunts-staging");
        assert_eq!(settings.log_format(), Ok(LogFormat::Pretty));
        assert!(settings.hosted_backend_configured());
    }

    #[rstest]
    #[case("json", Ok(LogFormat::Json))]
    #[case(" Pretty ", Ok(LogFormat::Pretty))]
    #[case("xml", Err(UnknownLogFormat("xml".to_owned())))]
    fn log_formats_parse(#[case] raw: &str, #[case] expected: Result<LogFormat, UnknownLogFormat>) {
        assert_eq!(raw.parse::<LogFormat>(), expected);
    }
}
