use crate::FdcError;
use crate::http_client::ReqwestFdcClient;
use secrecy::SecretString;
use std::time::Duration;

pub const DEFAULT_BASE_URL: &str = "https://api.nal.usda.gov/fdc";
pub const DEFAULT_TIMEOUT_SECS: u64 = 10;
pub const DEFAULT_PAGE_SIZE: u32 = 10;

#[derive(Clone, Debug)]
pub struct Config {
    pub api_key: SecretString,
    pub base_url: String,
    pub timeout: Duration,
    pub page_size: u32,
}

impl Config {
    pub fn from_env() -> Result<Self, FdcError> {
        Self::from_env_with(|k| std::env::var(k).ok())
    }

    /// Testable helper that reads configuration values using the provided
    /// function. This avoids mutating global environment in tests and keeps
    /// `from_env()` small and safe.
    pub fn from_env_with<F>(mut get: F) -> Result<Self, FdcError>
    where
        F: FnMut(&str) -> Option<String>,
    {
        let api = get("FDC_API_KEY")
            .filter(|k| !k.trim().is_empty())
            .ok_or_else(|| FdcError::Config("FDC_API_KEY missing".into()))?;
        let base_url = get("FDC_BASE_URL").unwrap_or_else(|| DEFAULT_BASE_URL.into());
        let timeout_secs = match get("FDC_TIMEOUT_SECS") {
            Some(raw) => raw
                .trim()
                .parse::<u64>()
                .map_err(|_| FdcError::Config(format!("FDC_TIMEOUT_SECS invalid: {raw}")))?,
            None => DEFAULT_TIMEOUT_SECS,
        };
        let page_size = match get("FDC_PAGE_SIZE") {
            Some(raw) => raw
                .trim()
                .parse::<u32>()
                .ok()
                .filter(|n| *n > 0)
                .ok_or_else(|| FdcError::Config(format!("FDC_PAGE_SIZE invalid: {raw}")))?,
            None => DEFAULT_PAGE_SIZE,
        };
        Ok(Self {
            api_key: SecretString::new(api.into()),
            base_url,
            timeout: Duration::from_secs(timeout_secs),
            page_size,
        })
    }

    pub fn build_client(&self) -> Result<ReqwestFdcClient, FdcError> {
        ReqwestFdcClient::new(&self.base_url, self.api_key.clone(), self.timeout)
    }
}
