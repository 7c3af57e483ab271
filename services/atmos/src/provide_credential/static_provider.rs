use crate::Credential;
use async_trait::async_trait;
use cloudauth_core::{Context, ProvideCredential, Result};

/// StaticCredentialProvider provides a fixed uid and secret key.
///
/// Use this when credentials are handed in directly at client construction.
#[derive(Debug, Clone)]
pub struct StaticCredentialProvider {
    uid: String,
    secret_key: String,
}

impl StaticCredentialProvider {
    /// Create a new StaticCredentialProvider.
    pub fn new(uid: &str, secret_key: &str) -> Self {
        Self {
            uid: uid.to_string(),
            secret_key: secret_key.to_string(),
        }
    }
}

#[async_trait]
impl ProvideCredential for StaticCredentialProvider {
    type Credential = Credential;

    async fn provide_credential(&self, _: &Context) -> Result<Option<Self::Credential>> {
        Ok(Some(Credential::new(&self.uid, &self.secret_key)))
    }
}
