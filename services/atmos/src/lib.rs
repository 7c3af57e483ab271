//! Signer for Atmos-style object storage: header-placed HMAC signatures over
//! `x-emc-*` headers, plus redirect handling for storage endpoints that
//! declare the right host in the error body.

mod config;
pub use config::Config;

mod credential;
pub use credential::Credential;

mod provide_credential;
pub use provide_credential::{
    DefaultCredentialProvider, EnvCredentialProvider, StaticCredentialProvider,
};

mod sign_request;
pub use sign_request::RequestSigner;

mod redirect;
pub use redirect::{retry_policy, XmlErrorEndpoint};

mod constants;
