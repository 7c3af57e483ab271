use crate::{Config, Credential, EnvCredentialProvider};
use async_trait::async_trait;
use cloudauth_core::{Context, ProvideCredential, Result};

/// DefaultCredentialProvider tries the environment first, then the static
/// config handed in at construction.
#[derive(Debug, Default)]
pub struct DefaultCredentialProvider {
    config: Config,
}

impl DefaultCredentialProvider {
    /// Create a new DefaultCredentialProvider.
    pub fn new(config: Config) -> Self {
        Self { config }
    }
}

#[async_trait]
impl ProvideCredential for DefaultCredentialProvider {
    type Credential = Credential;

    async fn provide_credential(&self, ctx: &Context) -> Result<Option<Self::Credential>> {
        if let Some(cred) = EnvCredentialProvider::new().provide_credential(ctx).await? {
            log::debug!("credential loaded from environment");
            return Ok(Some(cred));
        }

        match (&self.config.uid, &self.config.secret_key) {
            (Some(uid), Some(secret_key)) => Ok(Some(Credential::new(uid, secret_key))),
            _ => Ok(None),
        }
    }
}
