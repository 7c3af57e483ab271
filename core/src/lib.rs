//! Core components for signing API requests and retrying them under failure.
//!
//! This crate provides the provider-independent half of the cloudauth
//! ecosystem: canonical string construction, keyed-hash signing, session
//! caching with single-flight login, and the retry state machine that
//! decides what a failed attempt means.
//!
//! ## Overview
//!
//! The crate is built around a few key pieces:
//!
//! - **Context**: a container holding the HTTP sender, environment access
//!   and the clock, all constructor injected and replaceable in tests
//! - **Traits**: [`ProvideCredential`] for acquiring credentials or session
//!   tokens and [`SignRequest`] for scheme-specific request signing
//! - **Signer**: resolves a credential through the [`SessionCache`] and
//!   applies the signature
//! - **Invoker**: drives sign → dispatch → [`RetryPolicy::decide`] until a
//!   call completes or fails terminally
//!
//! The canonical string layouts in [`canonical`] are wire contracts: the
//! provider re-derives the same bytes and compares signatures.
//!
//! ## Example
//!
//! ```no_run
//! use async_trait::async_trait;
//! use cloudauth_core::{Context, ProvideCredential, Result, SignRequest, Signer, SigningCredential};
//!
//! #[derive(Clone, Debug)]
//! struct ApiToken {
//!     value: String,
//! }
//!
//! impl SigningCredential for ApiToken {
//!     fn is_valid(&self) -> bool {
//!         !self.value.is_empty()
//!     }
//! }
//!
//! #[derive(Debug)]
//! struct StaticToken;
//!
//! #[async_trait]
//! impl ProvideCredential for StaticToken {
//!     type Credential = ApiToken;
//!
//!     async fn provide_credential(&self, _: &Context) -> Result<Option<Self::Credential>> {
//!         Ok(Some(ApiToken {
//!             value: "my-token".to_string(),
//!         }))
//!     }
//! }
//!
//! #[derive(Debug)]
//! struct TokenHeader;
//!
//! #[async_trait]
//! impl SignRequest for TokenHeader {
//!     type Credential = ApiToken;
//!
//!     async fn sign_request(
//!         &self,
//!         _ctx: &Context,
//!         parts: &mut http::request::Parts,
//!         credential: Option<&Self::Credential>,
//!     ) -> Result<()> {
//!         if let Some(token) = credential {
//!             parts.headers.insert("x-api-token", token.value.parse()?);
//!         }
//!         Ok(())
//!     }
//! }
//!
//! # async fn example() -> Result<()> {
//! let ctx = Context::new();
//! let signer = Signer::new(ctx, StaticToken, TokenHeader);
//!
//! let (mut parts, _) = http::Request::get("https://api.example.com/zones")
//!     .body(())
//!     .expect("request must be valid")
//!     .into_parts();
//! signer.sign(&mut parts).await?;
//! # Ok(())
//! # }
//! ```

// Make sure all our public APIs have docs.
#![warn(missing_docs)]

pub mod canonical;
pub mod hash;
pub mod time;
pub mod utils;

mod context;
pub use context::{
    Clock, Context, Env, FixedClock, HttpSend, NoopEnv, NoopHttpSend, OsEnv, StaticEnv,
    SystemClock,
};

mod error;
pub use error::{Error, ErrorKind, Result};

mod api;
pub use api::{ProvideCredential, SignRequest, SigningCredential};

mod request;
pub use request::SigningRequest;

mod session;
pub use session::SessionCache;

mod signer;
pub use signer::Signer;

mod backoff;
pub use backoff::BackoffPolicy;

mod retry;
pub use retry::{Command, ExtractEndpoint, RetryDecision, RetryPolicy};

mod invoke;
pub use invoke::Invoker;
