use crate::{Command, Result, RetryDecision, RetryPolicy, Signer, SigningCredential};
use bytes::Bytes;

/// Invoker drives one logical call through sign, dispatch and retry until it
/// completes or a terminal failure is reached.
///
/// Callers see either a successful response or exactly one typed error;
/// intermediate attempts are visible only through the log.
#[derive(Clone, Debug)]
pub struct Invoker<C: SigningCredential> {
    signer: Signer<C>,
    policy: RetryPolicy,
}

impl<C: SigningCredential> Invoker<C> {
    /// Create a new invoker.
    pub fn new(signer: Signer<C>, policy: RetryPolicy) -> Self {
        Self { signer, policy }
    }

    /// The signer used for each attempt.
    pub fn signer(&self) -> &Signer<C> {
        &self.signer
    }

    /// Execute the request, retrying per policy.
    ///
    /// Each attempt is signed fresh, so a retry after session invalidation
    /// goes out with a new token and a re-signed request replaces its old
    /// signature. Signing failures propagate immediately: they indicate a
    /// configuration defect no retry can repair.
    pub async fn execute(&self, request: http::Request<Bytes>) -> Result<http::Response<Bytes>> {
        let mut command = Command::new(request);

        loop {
            let (mut parts, body) = command.next_attempt().into_parts();
            self.signer.sign(&mut parts).await?;

            let outcome = self
                .signer
                .context()
                .http_send(http::Request::from_parts(parts, body))
                .await;

            match self.policy.decide(&mut command, &outcome) {
                RetryDecision::Complete => return outcome,
                RetryDecision::RetrySameEndpoint => {
                    let delay = self.policy.backoff().delay_before(command.attempts());
                    log::debug!(
                        "attempt {} failed, retrying in {delay:?}",
                        command.attempts()
                    );
                    tokio::time::sleep(delay).await;
                }
                RetryDecision::RetryNewEndpoint(authority) => {
                    log::debug!("retrying against alternate endpoint {authority}");
                    command.redirect_to(authority)?;
                }
                RetryDecision::RetryAfterInvalidate => {
                    log::debug!("session rejected, invalidating and re-signing");
                    self.signer.invalidate();
                }
                RetryDecision::GiveUp => return Err(command.take_failure()),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        BackoffPolicy, Context, Error, ErrorKind, ExtractEndpoint, HttpSend, ProvideCredential,
        SignRequest,
    };
    use http::uri::Authority;
    use std::collections::VecDeque;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::{Arc, Mutex};
    use std::time::Duration;

    #[derive(Clone, Debug)]
    struct Token {
        value: String,
    }

    impl SigningCredential for Token {
        fn is_valid(&self) -> bool {
            !self.value.is_empty()
        }
    }

    #[derive(Debug)]
    struct SeqProvider {
        logins: Arc<AtomicUsize>,
    }

    #[async_trait::async_trait]
    impl ProvideCredential for SeqProvider {
        type Credential = Token;

        async fn provide_credential(&self, _: &Context) -> Result<Option<Token>> {
            let n = self.logins.fetch_add(1, Ordering::SeqCst) + 1;
            Ok(Some(Token {
                value: format!("token-{n}"),
            }))
        }
    }

    #[derive(Debug)]
    struct TokenHeader;

    #[async_trait::async_trait]
    impl SignRequest for TokenHeader {
        type Credential = Token;

        async fn sign_request(
            &self,
            _: &Context,
            parts: &mut http::request::Parts,
            credential: Option<&Self::Credential>,
        ) -> Result<()> {
            let token = credential.ok_or_else(|| Error::signing("no token available"))?;
            parts.headers.insert("x-session-token", token.value.parse()?);
            Ok(())
        }
    }

    /// Replays a scripted list of outcomes and records each outgoing request.
    #[derive(Debug)]
    struct ScriptedHttp {
        script: Mutex<VecDeque<Result<http::Response<Bytes>>>>,
        seen: Mutex<Vec<(String, String)>>,
    }

    impl ScriptedHttp {
        fn new(script: Vec<Result<http::Response<Bytes>>>) -> Arc<Self> {
            Arc::new(Self {
                script: Mutex::new(script.into()),
                seen: Mutex::new(Vec::new()),
            })
        }

        fn seen(&self) -> Vec<(String, String)> {
            self.seen.lock().unwrap().clone()
        }
    }

    #[async_trait::async_trait]
    impl HttpSend for Arc<ScriptedHttp> {
        async fn http_send(&self, req: http::Request<Bytes>) -> Result<http::Response<Bytes>> {
            let token = req
                .headers()
                .get("x-session-token")
                .and_then(|v| v.to_str().ok())
                .unwrap_or_default()
                .to_string();
            self.seen
                .lock()
                .unwrap()
                .push((req.uri().to_string(), token));
            self.script
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or_else(|| Err(Error::unexpected("script exhausted")))
        }
    }

    fn response(status: u16) -> Result<http::Response<Bytes>> {
        Ok(http::Response::builder()
            .status(status)
            .body(Bytes::new())
            .unwrap())
    }

    fn invoker(http: Arc<ScriptedHttp>, policy: RetryPolicy) -> (Invoker<Token>, Arc<AtomicUsize>) {
        let logins = Arc::new(AtomicUsize::new(0));
        let ctx = Context::new().with_http_send(http);
        let signer = Signer::new(
            ctx,
            SeqProvider {
                logins: logins.clone(),
            },
            TokenHeader,
        );
        (Invoker::new(signer, policy), logins)
    }

    fn fast_policy(max_retries: u32) -> RetryPolicy {
        RetryPolicy::new(BackoffPolicy::new(max_retries, Duration::from_millis(1)))
    }

    #[tokio::test]
    async fn test_success_passes_through() {
        let http = ScriptedHttp::new(vec![response(200)]);
        let (invoker, logins) = invoker(http.clone(), fast_policy(2));

        let req = http::Request::get("http://api.example.com/")
            .body(Bytes::new())
            .unwrap();
        let resp = invoker.execute(req).await.unwrap();

        assert_eq!(resp.status(), 200);
        assert_eq!(http.seen().len(), 1);
        assert_eq!(logins.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_unauthorized_resends_with_fresh_session() {
        let http = ScriptedHttp::new(vec![response(401), response(200)]);
        let (invoker, logins) = invoker(http.clone(), fast_policy(2));

        let req = http::Request::get("http://api.example.com/")
            .body(Bytes::new())
            .unwrap();
        let resp = invoker.execute(req).await.unwrap();

        assert_eq!(resp.status(), 200);
        let seen = http.seen();
        assert_eq!(seen.len(), 2);
        // The resend is signed with a newly acquired session.
        assert_eq!(seen[0].1, "token-1");
        assert_eq!(seen[1].1, "token-2");
        assert_eq!(logins.load(Ordering::SeqCst), 2);
    }

    #[derive(Debug)]
    struct BodyAuthority;

    impl ExtractEndpoint for BodyAuthority {
        fn alternate_endpoint(&self, response: &http::Response<Bytes>) -> Option<Authority> {
            std::str::from_utf8(response.body())
                .ok()
                .and_then(|s| s.trim().parse().ok())
        }
    }

    #[tokio::test]
    async fn test_redirect_rewrites_endpoint() {
        let http = ScriptedHttp::new(vec![
            Ok(http::Response::builder()
                .status(301)
                .body(Bytes::from_static(b"storage-west.example.com"))
                .unwrap()),
            response(200),
        ]);
        let policy = fast_policy(2).with_endpoint_extractor(BodyAuthority);
        let (invoker, _) = invoker(http.clone(), policy);

        let req = http::Request::get("http://storage.example.com/bucket/key?uploads")
            .body(Bytes::new())
            .unwrap();
        invoker.execute(req).await.unwrap();

        let seen = http.seen();
        assert_eq!(seen[0].0, "http://storage.example.com/bucket/key?uploads");
        assert_eq!(
            seen[1].0,
            "http://storage-west.example.com/bucket/key?uploads"
        );
    }

    #[tokio::test]
    async fn test_persistent_server_errors_exhaust() {
        let http = ScriptedHttp::new(vec![response(503), response(503), response(503)]);
        let (invoker, _) = invoker(http.clone(), fast_policy(2));

        let req = http::Request::get("http://api.example.com/")
            .body(Bytes::new())
            .unwrap();
        let err = invoker.execute(req).await.unwrap_err();

        assert_eq!(err.kind(), ErrorKind::TransientTransport);
        assert_eq!(http.seen().len(), 3);
    }

    #[tokio::test]
    async fn test_client_error_is_not_retried() {
        let http = ScriptedHttp::new(vec![response(404)]);
        let (invoker, _) = invoker(http.clone(), fast_policy(2));

        let req = http::Request::get("http://api.example.com/missing")
            .body(Bytes::new())
            .unwrap();
        let err = invoker.execute(req).await.unwrap_err();

        assert_eq!(err.kind(), ErrorKind::RequestRejected);
        assert_eq!(http.seen().len(), 1);
    }
}
