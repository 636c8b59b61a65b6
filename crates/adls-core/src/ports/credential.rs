//! Credential port

use crate::error::BackendError;
use async_trait::async_trait;

/// Source of bearer tokens for the Data Lake REST API.
///
/// Only backends look at credentials; the repository passes them through.
#[async_trait]
pub trait TokenCredential: Send + Sync {
    async fn bearer_token(&self) -> Result<String, BackendError>;
}

/// A pre-issued token, e.g. from `az account get-access-token`
#[derive(Clone)]
pub struct StaticTokenCredential {
    token: String,
}

impl StaticTokenCredential {
    pub fn new(token: impl Into<String>) -> Self {
        Self {
            token: token.into(),
        }
    }
}

impl std::fmt::Debug for StaticTokenCredential {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StaticTokenCredential")
            .field("token", &"<redacted>")
            .finish()
    }
}

#[async_trait]
impl TokenCredential for StaticTokenCredential {
    async fn bearer_token(&self) -> Result<String, BackendError> {
        if self.token.is_empty() {
            return Err(BackendError::Authentication("empty bearer token".to_string()));
        }
        Ok(self.token.clone())
    }
}
