use crate::{BackoffPolicy, Context, ProvideCredential, Result, SessionCache, SignRequest,
            SigningCredential};
use std::sync::Arc;

/// Signer is the filter that turns an outgoing request into its signed form.
///
/// It resolves a credential through the [`SessionCache`] (one shared login
/// under concurrent load) and hands it to the scheme-specific
/// [`SignRequest`] builder. Stateless across calls apart from the injected
/// collaborators; cloning shares the cache.
#[derive(Clone, Debug)]
pub struct Signer<C: SigningCredential> {
    ctx: Context,
    cache: SessionCache<C>,
    builder: Arc<dyn SignRequest<Credential = C>>,
}

impl<C: SigningCredential> Signer<C> {
    /// Create a new signer.
    pub fn new(
        ctx: Context,
        loader: impl ProvideCredential<Credential = C>,
        builder: impl SignRequest<Credential = C>,
    ) -> Self {
        Self {
            ctx,
            cache: SessionCache::new(loader),
            builder: Arc::new(builder),
        }
    }

    /// Replace the backoff policy applied to transient login failures.
    pub fn with_login_backoff(mut self, backoff: BackoffPolicy) -> Self {
        self.cache = self.cache.with_backoff(backoff);
        self
    }

    /// Sign the request.
    ///
    /// Re-applying to an already signed request replaces the previous
    /// signature entirely.
    pub async fn sign(&self, parts: &mut http::request::Parts) -> Result<()> {
        let credential = self.cache.get(&self.ctx).await?;
        self.builder
            .sign_request(&self.ctx, parts, credential.as_ref())
            .await
    }

    /// Drop the cached credential so the next sign re-acquires.
    ///
    /// The retry loop calls this when a response reports an invalid session.
    pub fn invalidate(&self) {
        self.cache.invalidate()
    }

    /// The context this signer operates in.
    pub fn context(&self) -> &Context {
        &self.ctx
    }

    /// The session cache backing this signer.
    pub fn cache(&self) -> &SessionCache<C> {
        &self.cache
    }
}
