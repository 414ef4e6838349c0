use crate::core::{CredentialProvider, Credentials};
use crate::utils::error::{DispatchError, Result};
use std::env;

pub const ACCESS_TOKEN_ENV: &str = "WHATSAPP_ACCESS_TOKEN";

/// 設定檔中直接給定的 token
#[derive(Debug, Clone)]
pub struct StaticCredentials {
    access_token: Option<String>,
    sender_id: String,
}

impl StaticCredentials {
    pub fn new(access_token: Option<String>, sender_id: impl Into<String>) -> Self {
        Self {
            access_token,
            sender_id: sender_id.into(),
        }
    }
}

impl CredentialProvider for StaticCredentials {
    fn credentials(&self) -> Result<Credentials> {
        match self.access_token.as_deref().map(str::trim) {
            Some(token) if !token.is_empty() => Ok(Credentials {
                access_token: token.to_string(),
                sender_id: self.sender_id.clone(),
            }),
            _ => Err(DispatchError::MissingConfigError {
                field: "whatsapp.access_token".to_string(),
            }),
        }
    }
}

/// 每次發送時才從環境變數讀取 token
#[derive(Debug, Clone)]
pub struct EnvCredentials {
    var_name: String,
    sender_id: String,
}

impl EnvCredentials {
    pub fn new(sender_id: impl Into<String>) -> Self {
        Self::with_var(ACCESS_TOKEN_ENV, sender_id)
    }

    pub fn with_var(var_name: impl Into<String>, sender_id: impl Into<String>) -> Self {
        Self {
            var_name: var_name.into(),
            sender_id: sender_id.into(),
        }
    }
}

impl CredentialProvider for EnvCredentials {
    fn credentials(&self) -> Result<Credentials> {
        let token = env::var(&self.var_name).unwrap_or_default();
        if token.trim().is_empty() {
            tracing::error!("❌ {} is missing or empty", self.var_name);
            return Err(DispatchError::MissingConfigError {
                field: self.var_name.clone(),
            });
        }
        Ok(Credentials {
            access_token: token.trim().to_string(),
            sender_id: self.sender_id.clone(),
        })
    }
}

#[derive(Debug, Clone)]
pub enum ConfiguredCredentials {
    Static(StaticCredentials),
    Env(EnvCredentials),
}

impl CredentialProvider for ConfiguredCredentials {
    fn credentials(&self) -> Result<Credentials> {
        match self {
            Self::Static(inner) => inner.credentials(),
            Self::Env(inner) => inner.credentials(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_static_credentials() {
        let creds = StaticCredentials::new(Some(" abc ".to_string()), "829")
            .credentials()
            .unwrap();
        assert_eq!(creds.access_token, "abc");
        assert_eq!(creds.sender_id, "829");

        assert!(StaticCredentials::new(None, "829").credentials().is_err());
        assert!(StaticCredentials::new(Some("  ".to_string()), "829")
            .credentials()
            .is_err());
    }

    #[test]
    fn test_env_credentials_read_at_call_time() {
        let var = "BULK_DISPATCH_TEST_TOKEN_CALL_TIME";
        let provider = EnvCredentials::with_var(var, "829");

        std::env::remove_var(var);
        let err = provider.credentials().unwrap_err();
        assert!(err.to_string().contains(var));

        std::env::set_var(var, "late-token");
        assert_eq!(provider.credentials().unwrap().access_token, "late-token");

        std::env::remove_var(var);
    }
}
