use crate::{constants::*, ApiKeyCredential};
use async_trait::async_trait;
use cloudauth_core::{Context, ProvideCredential, Result};

/// EnvCredentialProvider loads api key credentials from environment
/// variables.
///
/// This provider looks for the following environment variables:
/// - `CLOUDSTACK_API_KEY`: the public api key
/// - `CLOUDSTACK_SECRET_KEY`: the shared secret
#[derive(Debug, Default)]
pub struct EnvCredentialProvider;

impl EnvCredentialProvider {
    /// Create a new EnvCredentialProvider.
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl ProvideCredential for EnvCredentialProvider {
    type Credential = ApiKeyCredential;

    async fn provide_credential(&self, ctx: &Context) -> Result<Option<Self::Credential>> {
        let envs = ctx.env_vars();

        match (envs.get(CLOUDSTACK_API_KEY), envs.get(CLOUDSTACK_SECRET_KEY)) {
            (Some(api_key), Some(secret_key)) => {
                Ok(Some(ApiKeyCredential::new(api_key, secret_key)))
            }
            _ => Ok(None),
        }
    }
}
