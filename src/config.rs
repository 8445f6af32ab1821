use std::path::PathBuf;

use anyhow::Context;

pub const BASE_URL_VAR: &str = "MOD_API_BASE_URL";
pub const TOKEN_VAR: &str = "MOD_API_TOKEN";
pub const DOWNLOAD_DIR_VAR: &str = "MOD_DOWNLOAD_DIR";

pub mod endpoints {
    pub const GET_ALL: &str = "/api/MODSemanal/Getall";
    pub const GET_BY_WEEK: &str = "/api/MODSemanal/GetByWeek";
    pub const CREATE: &str = "/api/MODSemanal/CreateWeeklyPlan";
    pub const UPDATE: &str = "/api/MODSemanal/UpdateWeeklyPlan";
    pub const DOWNLOAD_REPORT: &str = "/api/MODSemanal/GenerateWeeklyReport";
}

#[derive(Debug, Clone)]
pub struct ApiConfig {
    pub base_url: String,
    pub token: Option<String>,
    pub download_dir: PathBuf,
}

impl ApiConfig {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            token: None,
            download_dir: PathBuf::from("."),
        }
    }

    pub fn with_token(mut self, token: Option<String>) -> Self {
        self.token = token.filter(|value| !value.trim().is_empty());
        self
    }

    pub fn with_download_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.download_dir = dir.into();
        self
    }

    /// Reads the environment (after an optional `.env`). The base URL is
    /// mandatory; the token and download directory are not.
    pub fn from_env() -> anyhow::Result<Self> {
        let _ = dotenvy::dotenv();
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> anyhow::Result<Self> {
        let base_url = lookup(BASE_URL_VAR)
            .with_context(|| format!("{BASE_URL_VAR} must be set to the weekly MOD API base URL"))?;
        anyhow::ensure!(!base_url.trim().is_empty(), "{BASE_URL_VAR} is empty");

        let mut config = Self::new(base_url).with_token(lookup(TOKEN_VAR));
        if let Some(dir) = lookup(DOWNLOAD_DIR_VAR) {
            config = config.with_download_dir(dir);
        }
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn base_url_drops_trailing_slash() {
        let config = ApiConfig::new("http://localhost:5000/");
        assert_eq!(config.base_url, "http://localhost:5000");
    }

    fn lookup_from<'a>(vars: &'a [(&'a str, &'a str)]) -> impl Fn(&str) -> Option<String> + 'a {
        move |name: &str| {
            vars.iter()
                .find(|(key, _)| *key == name)
                .map(|(_, value)| value.to_string())
        }
    }

    #[test]
    fn missing_base_url_fails_with_its_name() {
        let err = ApiConfig::from_lookup(lookup_from(&[(TOKEN_VAR, "secret")])).unwrap_err();
        assert!(err.to_string().contains(BASE_URL_VAR));
    }

    #[test]
    fn blank_base_url_fails_with_its_name() {
        let err = ApiConfig::from_lookup(lookup_from(&[(BASE_URL_VAR, "   ")])).unwrap_err();
        assert!(err.to_string().contains(BASE_URL_VAR));
    }

    #[test]
    fn lookup_picks_up_token_and_download_dir() {
        let config = ApiConfig::from_lookup(lookup_from(&[
            (BASE_URL_VAR, "http://mod.local/"),
            (TOKEN_VAR, "secret"),
            (DOWNLOAD_DIR_VAR, "/tmp/reports"),
        ]))
        .unwrap();

        assert_eq!(config.base_url, "http://mod.local");
        assert_eq!(config.token.as_deref(), Some("secret"));
        assert_eq!(config.download_dir, PathBuf::from("/tmp/reports"));
    }

    #[test]
    fn lookup_defaults_without_optional_vars() {
        let config = ApiConfig::from_lookup(lookup_from(&[(BASE_URL_VAR, "http://mod.local")])).unwrap();
        assert!(config.token.is_none());
        assert_eq!(config.download_dir, PathBuf::from("."));
    }

    #[test]
    fn blank_token_means_unauthenticated() {
        let config = ApiConfig::new("http://localhost").with_token(Some("  ".to_string()));
        assert!(config.token.is_none());
    }
}
