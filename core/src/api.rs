use crate::{Context, Result};
use std::fmt::Debug;

/// SigningCredential is the material a signer needs: a static key pair or a
/// time-limited session token.
pub trait SigningCredential: Clone + Debug + Send + Sync + Unpin + 'static {
    /// Check if the credential is still usable.
    ///
    /// Expiring credentials return `false` once past their time-to-live
    /// (minus a skew buffer); the session cache replaces them instead of
    /// mutating them.
    fn is_valid(&self) -> bool;
}

/// ProvideCredential acquires a credential from the environment, static
/// configuration, or a login exchange against a provider endpoint.
///
/// Token-based providers issue their login call through
/// [`Context::http_send`]; the session cache coalesces and caches the
/// results.
#[async_trait::async_trait]
pub trait ProvideCredential: Debug + Send + Sync + 'static {
    /// Credential returned by this provider.
    type Credential: SigningCredential;

    /// Acquire a credential.
    ///
    /// Returns `Ok(None)` when this source has nothing to offer, which lets
    /// the request go out unsigned. Errors with kind
    /// [`crate::ErrorKind::Authorization`] are terminal and become sticky in
    /// the session cache; [`crate::ErrorKind::TransientTransport`] errors are
    /// retried.
    async fn provide_credential(&self, ctx: &Context) -> Result<Option<Self::Credential>>;
}

/// SignRequest mutates an outgoing request into its signed form.
///
/// Implementations inject identity and timestamp, canonicalize, sign, and
/// place the signature where the scheme mandates. Re-applying to an already
/// signed request fully supersedes the previous identity, timestamp and
/// signature; it never appends a second one.
#[async_trait::async_trait]
pub trait SignRequest: Debug + Send + Sync + 'static {
    /// Credential used by this signer.
    type Credential: SigningCredential;

    /// Sign the request in place.
    async fn sign_request(
        &self,
        ctx: &Context,
        parts: &mut http::request::Parts,
        credential: Option<&Self::Credential>,
    ) -> Result<()>;
}
