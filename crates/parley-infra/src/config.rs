//! Environment-driven settings.
//!
//! Everything has a usable default so a bare `parley` invocation runs:
//! the database lands in `~/.parley/`, the region falls back to
//! `us-east-1`, and a missing Bedrock token simply makes inference fail
//! soft at request time.

use std::path::PathBuf;

use secrecy::SecretString;

/// Env var naming the data directory.
pub const DATA_DIR_ENV: &str = "PARLEY_DATA_DIR";

/// Env var naming the AWS region for Bedrock.
pub const REGION_ENV: &str = "AWS_REGION_NAME";

/// Env var holding the Bedrock API bearer token.
pub const BEDROCK_TOKEN_ENV: &str = "AWS_BEARER_TOKEN_BEDROCK";

/// Default AWS region when none is configured.
pub const DEFAULT_REGION: &str = "us-east-1";

/// Runtime settings resolved from the environment.
pub struct Settings {
    pub data_dir: PathBuf,
    pub aws_region: String,
    pub bedrock_token: SecretString,
}

impl Settings {
    pub fn from_env() -> Self {
        Self {
            data_dir: resolve_data_dir(),
            aws_region: std::env::var(REGION_ENV)
                .unwrap_or_else(|_| DEFAULT_REGION.to_string()),
            bedrock_token: SecretString::from(
                std::env::var(BEDROCK_TOKEN_ENV).unwrap_or_default(),
            ),
        }
    }

    /// SQLite connection URL for the database file inside the data dir.
    pub fn database_url(&self) -> String {
        format!(
            "sqlite://{}?mode=rwc",
            self.data_dir.join("parley.db").display()
        )
    }
}

/// Resolve the data directory: `PARLEY_DATA_DIR` when set, otherwise
/// `~/.parley`.
pub fn resolve_data_dir() -> PathBuf {
    match std::env::var(DATA_DIR_ENV) {
        Ok(dir) => PathBuf::from(dir),
        Err(_) => {
            let home = std::env::var("HOME").unwrap_or_else(|_| ".".to_string());
            PathBuf::from(home).join(".parley")
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_database_url_shape() {
        let settings = Settings {
            data_dir: PathBuf::from("/tmp/parley-test"),
            aws_region: DEFAULT_REGION.to_string(),
            bedrock_token: SecretString::from(""),
        };
        let url = settings.database_url();
        assert!(url.starts_with("sqlite:///tmp/parley-test"));
        assert!(url.ends_with("parley.db?mode=rwc"));
    }
}
