//! Query-placed HMAC signing and session-token attachment.

use async_trait::async_trait;
use http::header;
use log::debug;

use super::constants::*;
use super::credential::{ApiKeyCredential, Session};
use cloudauth_core::canonical::{QueryScheme, SigningAlgorithm};
use cloudauth_core::{Context, Error, Result, SignRequest, SigningRequest};

/// RequestSigner that implements the control-plane query signature.
///
/// Parameter names are lowercased and sorted into the canonical string,
/// values keep their case but are percent-encoded with the fixed table. The
/// HMAC-SHA1 signature over the raw secret bytes is appended as the
/// `signature` parameter; the request keeps its original parameter casing on
/// the wire.
#[derive(Debug)]
pub struct RequestSigner {
    scheme: QueryScheme,
}

impl Default for RequestSigner {
    fn default() -> Self {
        Self::new()
    }
}

impl RequestSigner {
    /// Create a new signer.
    pub fn new() -> Self {
        Self {
            scheme: QueryScheme {
                identity_param: APIKEY_PARAM,
                signature_param: SIGNATURE_PARAM,
                algorithm: SigningAlgorithm::HmacSha1,
            },
        }
    }
}

/// Build the string to sign for a request carrying the given identity.
///
/// The existing identity and signature parameters are replaced first, so
/// re-signing a retried request supersedes the previous pass.
fn string_to_sign(req: &mut SigningRequest, api_key: &str, scheme: &QueryScheme) -> String {
    req.query_remove(scheme.identity_param);
    req.query_remove(scheme.signature_param);
    req.query_push(scheme.identity_param, api_key);

    // The control plane compares command tokens case-insensitively and signs
    // the lowercased form; the wire keeps the caller's casing.
    let original = req.query.clone();
    for (k, v) in req.query.iter_mut() {
        if k.eq_ignore_ascii_case(COMMAND_PARAM) {
            *v = v.to_ascii_lowercase();
        }
    }
    let string_to_sign = scheme.canonical_string(req);
    req.query = original;

    string_to_sign
}

#[async_trait]
impl SignRequest for RequestSigner {
    type Credential = ApiKeyCredential;

    async fn sign_request(
        &self,
        _: &Context,
        parts: &mut http::request::Parts,
        credential: Option<&Self::Credential>,
    ) -> Result<()> {
        let cred =
            credential.ok_or_else(|| Error::signing("no credential available for signing"))?;

        let mut req = SigningRequest::build(parts)?;

        let string_to_sign = string_to_sign(&mut req, &cred.api_key, &self.scheme);
        debug!("string to sign: {}", &string_to_sign);

        let signature = self
            .scheme
            .algorithm
            .sign(cred.secret_key.as_bytes(), string_to_sign.as_bytes());

        req.query_push(self.scheme.signature_param, signature);
        req.query_encode();
        req.apply(parts)
    }
}

/// SessionRequestSigner attaches a cached login session instead of an HMAC:
/// the session key as a query parameter plus the session cookie.
#[derive(Debug, Default)]
pub struct SessionRequestSigner;

impl SessionRequestSigner {
    /// Create a new signer.
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl SignRequest for SessionRequestSigner {
    type Credential = Session;

    async fn sign_request(
        &self,
        _: &Context,
        parts: &mut http::request::Parts,
        credential: Option<&Self::Credential>,
    ) -> Result<()> {
        let session =
            credential.ok_or_else(|| Error::signing("no session available for signing"))?;

        let mut req = SigningRequest::build(parts)?;

        req.query_remove(SESSIONKEY_PARAM);
        req.query_push(SESSIONKEY_PARAM, session.session_key.clone());
        if let Some(id) = &session.jsessionid {
            req.headers
                .insert(header::COOKIE, format!("JSESSIONID={id}").parse()?);
        }

        req.query_encode();
        req.apply(parts)
    }
}
