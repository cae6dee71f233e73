//! 客戶端配置

use std::time::Duration;
use vault_core::{Result, VaultError};
use vault_cache::DEFAULT_TTL_MS;

pub const DEFAULT_API_URL: &str = "http://localhost:5000";
pub const DEFAULT_TIMEOUT_SECS: u64 = 15;

pub const ENV_API_URL: &str = "EGGVAULT_API_URL";
pub const ENV_TIMEOUT_SECS: &str = "EGGVAULT_TIMEOUT_SECS";
pub const ENV_CACHE_TTL_MS: &str = "EGGVAULT_CACHE_TTL_MS";

/// 後端連線與快取參數
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    /// 後端位址（不含結尾 `/`）
    pub base_url: String,

    /// 單次請求逾時
    pub timeout: Duration,

    /// 分頁快取有效時間（毫秒）
    pub cache_ttl_ms: u64,
}

impl ClientConfig {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: normalize_url(base_url.into()),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            cache_ttl_ms: DEFAULT_TTL_MS,
        }
    }

    /// 建構器模式：設置逾時
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// 建構器模式：設置快取有效時間
    pub fn with_cache_ttl_ms(mut self, ttl_ms: u64) -> Self {
        self.cache_ttl_ms = ttl_ms;
        self
    }

    /// 從環境變數讀取（先載入 `.env`）
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// 從任意鍵值來源讀取，未設定的項目使用預設值
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::new(lookup(ENV_API_URL).unwrap_or_else(|| DEFAULT_API_URL.to_string()));

        if let Some(raw) = lookup(ENV_TIMEOUT_SECS) {
            config.timeout = Duration::from_secs(parse_number(ENV_TIMEOUT_SECS, &raw)?);
        }
        if let Some(raw) = lookup(ENV_CACHE_TTL_MS) {
            config.cache_ttl_ms = parse_number(ENV_CACHE_TTL_MS, &raw)?;
        }

        Ok(config)
    }
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self::new(DEFAULT_API_URL)
    }
}

fn normalize_url(url: String) -> String {
    url.trim().trim_end_matches('/').to_string()
}

fn parse_number(key: &str, raw: &str) -> Result<u64> {
    raw.trim()
        .parse()
        .map_err(|_| VaultError::Config(format!("{key} 必須是非負整數: {raw:?}")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = ClientConfig::from_lookup(lookup(&[])).unwrap();
        assert_eq!(config, ClientConfig::default());
        assert_eq!(config.base_url, "http://localhost:5000");
        assert_eq!(config.timeout, Duration::from_secs(15));
        assert_eq!(config.cache_ttl_ms, 30_000);
    }

    #[test]
    fn test_overrides() {
        let config = ClientConfig::from_lookup(lookup(&[
            (ENV_API_URL, "https://granja.example/ "),
            (ENV_TIMEOUT_SECS, "5"),
            (ENV_CACHE_TTL_MS, "1000"),
        ]))
        .unwrap();

        assert_eq!(config.base_url, "https://granja.example");
        assert_eq!(config.timeout, Duration::from_secs(5));
        assert_eq!(config.cache_ttl_ms, 1_000);
    }

    #[rstest]
    #[case(ENV_CACHE_TTL_MS, "trinta")]
    #[case(ENV_TIMEOUT_SECS, "-1")]
    #[case(ENV_TIMEOUT_SECS, "1.5")]
    fn test_invalid_number_is_config_error(#[case] key: &str, #[case] raw: &str) {
        let err = ClientConfig::from_lookup(lookup(&[(key, raw)])).unwrap_err();
        assert!(matches!(err, VaultError::Config(message) if message.contains(key)));
    }

    #[test]
    fn test_builder() {
        let config = ClientConfig::new("http://127.0.0.1:8080/")
            .with_timeout(Duration::from_millis(500))
            .with_cache_ttl_ms(0);
        assert_eq!(config.base_url, "http://127.0.0.1:8080");
        assert_eq!(config.timeout, Duration::from_millis(500));
        assert_eq!(config.cache_ttl_ms, 0);
    }
}
