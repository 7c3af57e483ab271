use crate::{constants::*, Credential};
use async_trait::async_trait;
use cloudauth_core::{Context, ProvideCredential, Result};

/// EnvCredentialProvider loads credentials from environment variables.
///
/// This provider looks for the following environment variables:
/// - `ATMOS_UID`: the full token uid
/// - `ATMOS_SECRET_KEY`: the base64 encoded shared secret
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
    type Credential = Credential;

    async fn provide_credential(&self, ctx: &Context) -> Result<Option<Self::Credential>> {
        let envs = ctx.env_vars();

        match (envs.get(ATMOS_UID), envs.get(ATMOS_SECRET_KEY)) {
            (Some(uid), Some(secret_key)) => Ok(Some(Credential::new(uid, secret_key))),
            _ => Ok(None),
        }
    }
}
