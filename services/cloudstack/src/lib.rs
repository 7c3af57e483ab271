//! Signers for CloudStack-style control planes: query-placed HMAC signatures
//! under an api key, or a cached login session attached as a token.

mod config;
pub use config::Config;

mod credential;
pub use credential::{ApiKeyCredential, Session};

mod provide_credential;
pub use provide_credential::{
    DefaultCredentialProvider, EnvCredentialProvider, StaticCredentialProvider,
};

mod sign_request;
pub use sign_request::{RequestSigner, SessionRequestSigner};

mod session;
pub use session::PasswordLoginProvider;

pub mod lifecycle;

mod constants;
