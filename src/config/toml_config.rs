use crate::adapters::whatsapp::{
    CloudApiChannel, CloudApiSettings, DEFAULT_API_BASE_URL, DEFAULT_API_VERSION,
};
use crate::config::credentials::{ConfiguredCredentials, EnvCredentials, StaticCredentials};
use crate::core::dispatcher::BulkDispatcher;
use crate::core::limiter::FixedIntervalLimiter;
use crate::utils::error::{DispatchError, Result};
use crate::utils::validation::{self, Validate};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

pub type CloudDispatcher =
    BulkDispatcher<CloudApiChannel<ConfiguredCredentials>, FixedIntervalLimiter>;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TomlConfig {
    pub whatsapp: WhatsAppConfig,
    pub dispatch: Option<DispatchConfig>,
    pub webhook: Option<WebhookConfig>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WhatsAppConfig {
    pub api_base_url: Option<String>,
    pub api_version: Option<String>,
    pub phone_number_id: String,
    pub access_token: Option<String>,
    pub timeout_seconds: Option<u64>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DispatchConfig {
    pub delay_ms: Option<u64>,
    pub max_batch_size: Option<usize>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WebhookConfig {
    pub verify_token: Option<String>,
}

impl TomlConfig {
    /// 從 TOML 檔案載入配置
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path).map_err(DispatchError::IoError)?;
        Self::from_toml_str(&content)
    }

    /// 從 TOML 字串解析配置
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed_content = Self::substitute_env_vars(content)?;

        toml::from_str(&processed_content).map_err(|e| DispatchError::ConfigError {
            message: format!("TOML parsing error: {}", e),
        })
    }

    /// 沒有設定檔時，從環境變數組出配置
    pub fn from_env() -> Result<Self> {
        let phone_number_id =
            std::env::var("WHATSAPP_PHONE_NUMBER_ID").map_err(|_| DispatchError::ConfigError {
                message: "WHATSAPP_PHONE_NUMBER_ID environment variable is required".to_string(),
            })?;

        Ok(Self {
            whatsapp: WhatsAppConfig {
                api_base_url: std::env::var("WHATSAPP_API_BASE_URL").ok(),
                api_version: std::env::var("WHATSAPP_API_VERSION").ok(),
                phone_number_id,
                access_token: None,
                timeout_seconds: None,
            },
            dispatch: Some(DispatchConfig {
                delay_ms: std::env::var("SEND_DELAY_MS")
                    .ok()
                    .and_then(|v| v.parse().ok()),
                max_batch_size: std::env::var("MAX_BATCH_SIZE")
                    .ok()
                    .and_then(|v| v.parse().ok()),
            }),
            webhook: Some(WebhookConfig {
                verify_token: std::env::var("VERIFY_TOKEN").ok(),
            }),
        })
    }

    /// 替換環境變數 (例如 ${WHATSAPP_ACCESS_TOKEN})；未設定的變數保持原樣
    fn substitute_env_vars(content: &str) -> Result<String> {
        use regex::Regex;
        let re = Regex::new(r"\$\{([^}]+)\}").map_err(|e| DispatchError::ConfigError {
            message: format!("Invalid substitution pattern: {}", e),
        })?;

        let result = re.replace_all(content, |caps: &regex::Captures| {
            let var_name = &caps[1];
            std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
        });

        Ok(result.to_string())
    }

    pub fn validate_config(&self) -> Result<()> {
        validation::validate_url("whatsapp.api_base_url", self.api_base_url())?;
        validation::validate_non_empty_string("whatsapp.api_version", self.api_version())?;
        validation::validate_non_empty_string(
            "whatsapp.phone_number_id",
            &self.whatsapp.phone_number_id,
        )?;

        if let Some(timeout) = self.whatsapp.timeout_seconds {
            validation::validate_range("whatsapp.timeout_seconds", timeout, 1, 300)?;
        }

        validation::validate_range("dispatch.delay_ms", self.delay_ms(), 0, 60_000)?;

        if let Some(max) = self.max_batch_size() {
            validation::validate_positive_number("dispatch.max_batch_size", max, 1)?;
        }

        Ok(())
    }

    pub fn api_base_url(&self) -> &str {
        self.whatsapp
            .api_base_url
            .as_deref()
            .unwrap_or(DEFAULT_API_BASE_URL)
    }

    pub fn api_version(&self) -> &str {
        self.whatsapp
            .api_version
            .as_deref()
            .unwrap_or(DEFAULT_API_VERSION)
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.whatsapp.timeout_seconds.unwrap_or(30))
    }

    pub fn delay_ms(&self) -> u64 {
        self.dispatch
            .as_ref()
            .and_then(|d| d.delay_ms)
            .unwrap_or(1000)
    }

    pub fn set_delay_ms(&mut self, delay_ms: u64) {
        self.dispatch.get_or_insert_with(DispatchConfig::default).delay_ms = Some(delay_ms);
    }

    pub fn max_batch_size(&self) -> Option<usize> {
        self.dispatch.as_ref().and_then(|d| d.max_batch_size)
    }

    pub fn verify_token(&self) -> Option<&str> {
        self.webhook
            .as_ref()
            .and_then(|w| w.verify_token.as_deref())
            .filter(|t| !t.trim().is_empty() && !t.contains("${"))
    }

    pub fn cloud_api_settings(&self) -> CloudApiSettings {
        CloudApiSettings {
            api_base_url: self.api_base_url().to_string(),
            api_version: self.api_version().to_string(),
            timeout: self.timeout(),
        }
    }

    /// 設定檔有 token 時直接使用，否則每次發送時讀 WHATSAPP_ACCESS_TOKEN
    pub fn credentials(&self) -> ConfiguredCredentials {
        let sender_id = self.whatsapp.phone_number_id.clone();
        match self.whatsapp.access_token.as_deref() {
            Some(token) if !token.trim().is_empty() && !token.contains("${") => {
                ConfiguredCredentials::Static(StaticCredentials::new(
                    Some(token.to_string()),
                    sender_id,
                ))
            }
            _ => ConfiguredCredentials::Env(EnvCredentials::new(sender_id)),
        }
    }

    pub fn build_dispatcher(&self) -> Result<CloudDispatcher> {
        let channel = CloudApiChannel::new(self.cloud_api_settings(), self.credentials())?;
        Ok(
            BulkDispatcher::new(channel, FixedIntervalLimiter::from_millis(self.delay_ms()))
                .with_max_batch_size(self.max_batch_size()),
        )
    }
}

impl Validate for TomlConfig {
    fn validate(&self) -> Result<()> {
        self.validate_config()
    }
}
