use crate::ApiKeyCredential;
use async_trait::async_trait;
use cloudauth_core::{Context, ProvideCredential, Result};

/// StaticCredentialProvider provides a fixed api key and secret.
#[derive(Debug, Clone)]
pub struct StaticCredentialProvider {
    api_key: String,
    secret_key: String,
}

impl StaticCredentialProvider {
    /// Create a new StaticCredentialProvider.
    pub fn new(api_key: &str, secret_key: &str) -> Self {
        Self {
            api_key: api_key.to_string(),
            secret_key: secret_key.to_string(),
        }
    }
}

#[async_trait]
impl ProvideCredential for StaticCredentialProvider {
    type Credential = ApiKeyCredential;

    async fn provide_credential(&self, _: &Context) -> Result<Option<Self::Credential>> {
        Ok(Some(ApiKeyCredential::new(&self.api_key, &self.secret_key)))
    }
}
