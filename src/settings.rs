use std::path::PathBuf;
use std::time::Duration;

use config::{Config, Environment, File};
use serde::Deserialize;

use crate::error::Result;

pub const DEFAULT_API_BASE_URL: &str = "https://country-leaders.onrender.com";
const CONFIG_FILE: &str = "leaders";
const ENV_PREFIX: &str = "LEADERS";

#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    pub api_base_url: String,
    pub request_timeout_secs: u64,
    pub token_ttl_secs: u64,
    pub user_agent: String,
    pub output_dir: PathBuf,
}

impl Settings {
    /// Defaults, then `leaders.toml` if present, then `LEADERS_*` env vars.
    pub fn load() -> Result<Self> {
        let d = Settings::default();
        let settings = Config::builder()
            .set_default("api_base_url", d.api_base_url)?
            .set_default("request_timeout_secs", d.request_timeout_secs)?
            .set_default("token_ttl_secs", d.token_ttl_secs)?
            .set_default("user_agent", d.user_agent)?
            .set_default("output_dir", d.output_dir.to_string_lossy().into_owned())?
            .add_source(File::with_name(CONFIG_FILE).required(false))
            .add_source(Environment::with_prefix(ENV_PREFIX))
            .build()?;
        Ok(settings.try_deserialize()?)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn token_ttl(&self) -> Duration {
        Duration::from_secs(self.token_ttl_secs)
    }

    pub fn endpoint(&self, path: &str) -> String {
        format!("{}{}", self.api_base_url.trim_end_matches('/'), path)
    }
}

impl Default for Settings {
    fn default() -> Self {
        Settings {
            api_base_url: DEFAULT_API_BASE_URL.to_string(),
            request_timeout_secs: 30,
            token_ttl_secs: 600,
            user_agent: default_user_agent(),
            output_dir: PathBuf::from("."),
        }
    }
}

fn default_user_agent() -> String {
    format!("leaders_scraper/{}", env!("CARGO_PKG_VERSION"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn endpoint_joins_without_double_slash() {
        let settings = Settings {
            api_base_url: "http://api.test/".into(),
            ..Settings::default()
        };
        assert_eq!(settings.endpoint("/countries"), "http://api.test/countries");
    }

    #[test]
    fn defaults_point_at_public_api() {
        let s = Settings::default();
        assert_eq!(s.endpoint("/cookie"), "https://country-leaders.onrender.com/cookie");
        assert_eq!(s.request_timeout(), Duration::from_secs(30));
        assert!(s.user_agent.starts_with("leaders_scraper/"));
    }
}
