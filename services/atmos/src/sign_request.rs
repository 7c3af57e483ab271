//! Atmos-style request signing.

use async_trait::async_trait;
use http::header::{HeaderName, CONTENT_TYPE, DATE, RANGE};
use http::HeaderValue;
use log::debug;

use super::constants::*;
use super::credential::Credential;
use cloudauth_core::canonical::{HeaderScheme, SigningAlgorithm};
use cloudauth_core::hash::base64_decode;
use cloudauth_core::time::format_http_date;
use cloudauth_core::{Context, Error, Result, SignRequest, SigningRequest};

/// RequestSigner that implements the Atmos header signature.
///
/// The canonical string covers the method, content-type and range, the date,
/// every `x-emc-*` header sorted by name, and the lowercased path. The
/// signature is HMAC-SHA1 under the base64 decoded shared secret, placed in
/// `x-emc-signature`.
#[derive(Debug)]
pub struct RequestSigner {
    scheme: HeaderScheme,
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
            scheme: HeaderScheme {
                simple_headers: vec![CONTENT_TYPE, RANGE],
                date_header: DATE,
                identity_header: HeaderName::from_static(X_EMC_UID),
                signature_header: HeaderName::from_static(X_EMC_SIGNATURE),
                header_prefix: X_EMC_PREFIX,
                algorithm: SigningAlgorithm::HmacSha1,
            },
        }
    }
}

#[async_trait]
impl SignRequest for RequestSigner {
    type Credential = Credential;

    async fn sign_request(
        &self,
        ctx: &Context,
        parts: &mut http::request::Parts,
        credential: Option<&Self::Credential>,
    ) -> Result<()> {
        let cred =
            credential.ok_or_else(|| Error::signing("no credential available for signing"))?;
        let key = base64_decode(&cred.secret_key)
            .map_err(|err| Error::signing("secret key is not valid base64").with_source(err))?;

        let mut req = SigningRequest::build(parts)?;

        // Identity and date overwrite whatever a previous signing pass left
        // behind, so re-signing a retried request is a full replacement.
        req.headers
            .insert(&self.scheme.identity_header, cred.uid.parse()?);
        req.headers
            .insert(DATE, format_http_date(ctx.now()).parse()?);

        let string_to_sign = self.scheme.canonical_string(&req)?;
        debug!("string to sign: {}", &string_to_sign);

        let signature = self.scheme.algorithm.sign(&key, string_to_sign.as_bytes());
        req.headers.insert(&self.scheme.signature_header, {
            let mut value: HeaderValue = signature.parse()?;
            value.set_sensitive(true);

            value
        });

        req.query_encode();
        req.apply(parts)
    }
}

#[cfg(test)]
mod tests {
    use std::str::FromStr;

    use chrono::Utc;
    use http::Uri;
    use pretty_assertions::assert_eq;

    use super::super::provide_credential::{DefaultCredentialProvider, StaticCredentialProvider};
    use super::*;
    use cloudauth_core::{ErrorKind, FixedClock, Signer};

    const KEY: &str = "LJLuryj6zs8ste6Y3jTGQp71xq0=";

    fn fixed_ctx() -> Context {
        let time = chrono::DateTime::parse_from_rfc2822("Thu, 05 Jun 2008 16:38:19 GMT")
            .unwrap()
            .with_timezone(&Utc);
        Context::new().with_clock(FixedClock(time))
    }

    #[tokio::test]
    async fn test_sign() -> Result<()> {
        let _ = env_logger::builder().is_test(true).try_init();

        let signer = Signer::new(
            fixed_ctx(),
            StaticCredentialProvider::new("uid1", KEY),
            RequestSigner::new(),
        );

        let req = http::Request::get(Uri::from_str("http://accesspoint.example.com/")?)
            .header("x-emc-listable-meta", "apple=bear,sushi=king")
            .body(())?;

        let (mut parts, _) = req.into_parts();
        signer.sign(&mut parts).await?;

        assert_eq!(parts.headers.get(X_EMC_UID).unwrap(), "uid1");
        assert_eq!(
            parts.headers.get(DATE).unwrap(),
            "Thu, 05 Jun 2008 16:38:19 GMT"
        );
        assert_eq!(
            parts.headers.get(X_EMC_SIGNATURE).unwrap(),
            "W3xzIVz/3ig9COtleo94r+hEmgs="
        );

        Ok(())
    }

    #[tokio::test]
    async fn test_sign_with_simple_headers_and_mixed_case_path() -> Result<()> {
        let signer = Signer::new(
            fixed_ctx(),
            StaticCredentialProvider::new("6039ac182f194e15b9261d73ce044939/user1", KEY),
            RequestSigner::new(),
        );

        let req = http::Request::post(Uri::from_str("http://accesspoint.example.com/REST/Objects")?)
            .header(CONTENT_TYPE, "application/octet-stream")
            .header(RANGE, "bytes=0-1023")
            .header("x-emc-groupacl", "other=NONE")
            // Runs of spaces collapse to one in the canonical string.
            .header("x-emc-meta", "part1=buy  one")
            .body(())?;

        let (mut parts, _) = req.into_parts();
        signer.sign(&mut parts).await?;

        assert_eq!(
            parts.headers.get(X_EMC_SIGNATURE).unwrap(),
            "JUsLLb1y5/ppud2zQXTVnAVYCPk="
        );

        Ok(())
    }

    #[tokio::test]
    async fn test_resign_replaces_signature() -> Result<()> {
        let signer = Signer::new(
            fixed_ctx(),
            StaticCredentialProvider::new("uid1", KEY),
            RequestSigner::new(),
        );

        let req = http::Request::get(Uri::from_str("http://accesspoint.example.com/")?)
            .header("x-emc-listable-meta", "apple=bear,sushi=king")
            .body(())?;
        let (mut parts, _) = req.into_parts();

        signer.sign(&mut parts).await?;
        signer.sign(&mut parts).await?;

        // Exactly one signature header, identical to a single signing pass.
        assert_eq!(parts.headers.get_all(X_EMC_SIGNATURE).iter().count(), 1);
        assert_eq!(
            parts.headers.get(X_EMC_SIGNATURE).unwrap(),
            "W3xzIVz/3ig9COtleo94r+hEmgs="
        );

        Ok(())
    }

    #[tokio::test]
    async fn test_sign_without_credential_fails() -> Result<()> {
        let signer = Signer::new(
            fixed_ctx(),
            DefaultCredentialProvider::new(crate::Config::new()),
            RequestSigner::new(),
        );

        let req = http::Request::get(Uri::from_str("http://accesspoint.example.com/")?).body(())?;
        let (mut parts, _) = req.into_parts();

        let err = signer.sign(&mut parts).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Signing);

        Ok(())
    }

    #[tokio::test]
    async fn test_sign_with_invalid_key_fails() -> Result<()> {
        let signer = Signer::new(
            fixed_ctx(),
            StaticCredentialProvider::new("uid1", "not base64!"),
            RequestSigner::new(),
        );

        let req = http::Request::get(Uri::from_str("http://accesspoint.example.com/")?).body(())?;
        let (mut parts, _) = req.into_parts();

        let err = signer.sign(&mut parts).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Signing);

        Ok(())
    }
}
