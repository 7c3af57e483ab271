//! Login exchange against the control plane.

use async_trait::async_trait;
use bytes::Bytes;
use http::{header, StatusCode};
use log::debug;
use serde::Deserialize;
use std::fmt::{Debug, Formatter};
use std::time::Duration;

use super::constants::STATUS_AUTH_FAILED;
use super::credential::Session;
use cloudauth_core::canonical::query_escape;
use cloudauth_core::{utils::Redact, Context, Error, ProvideCredential, Result};

#[derive(Debug, Deserialize)]
struct LoginResponse {
    loginresponse: LoginPayload,
}

#[derive(Debug, Deserialize)]
struct LoginPayload {
    sessionkey: String,
    #[serde(default)]
    timeout: Option<i64>,
}

/// PasswordLoginProvider exchanges a username and password for a session.
///
/// The exchange goes through [`Context::http_send`]; the session cache is
/// responsible for coalescing concurrent logins and for making a rejected
/// login sticky. Failures are classified for it here: an authorization
/// rejection is terminal, a server error is transient, a body that cannot be
/// parsed is a protocol error.
#[derive(Clone)]
pub struct PasswordLoginProvider {
    endpoint: String,
    username: String,
    password: String,
    domain: Option<String>,
    default_ttl: Duration,
}

impl PasswordLoginProvider {
    /// Create a new provider logging in at the given api endpoint, like
    /// `http://localhost:8080/client/api`.
    pub fn new(endpoint: &str, username: &str, password: &str) -> Self {
        Self {
            endpoint: endpoint.trim_end_matches('/').to_string(),
            username: username.to_string(),
            password: password.to_string(),
            domain: None,
            default_ttl: Duration::from_secs(1800),
        }
    }

    /// Set the account domain sent along with the login.
    pub fn with_domain(mut self, domain: &str) -> Self {
        self.domain = Some(domain.to_string());
        self
    }

    /// Session lifetime assumed when the provider does not declare one.
    pub fn with_default_ttl(mut self, ttl: Duration) -> Self {
        self.default_ttl = ttl;
        self
    }

    /// Tear down a session obtained from this provider.
    pub async fn logout(&self, ctx: &Context, session: &Session) -> Result<()> {
        let uri = format!(
            "{}?command=logout&sessionkey={}&response=json",
            self.endpoint,
            query_escape(&session.session_key)
        );
        let req = http::Request::get(uri.as_str()).body(Bytes::new())?;

        let resp = ctx.http_send(req).await?;
        if resp.status().is_success() {
            Ok(())
        } else {
            Err(Error::unexpected(format!(
                "logout failed with status {}",
                resp.status()
            )))
        }
    }
}

impl Debug for PasswordLoginProvider {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PasswordLoginProvider")
            .field("endpoint", &self.endpoint)
            .field("username", &self.username)
            .field("password", &Redact::from(&self.password))
            .field("domain", &self.domain)
            .finish()
    }
}

#[async_trait]
impl ProvideCredential for PasswordLoginProvider {
    type Credential = Session;

    async fn provide_credential(&self, ctx: &Context) -> Result<Option<Self::Credential>> {
        let mut uri = format!(
            "{}?command=login&username={}&password={}",
            self.endpoint,
            query_escape(&self.username),
            query_escape(&self.password)
        );
        if let Some(domain) = &self.domain {
            uri.push_str("&domain=");
            uri.push_str(&query_escape(domain));
        }
        uri.push_str("&response=json");

        let req = http::Request::get(uri.as_str()).body(Bytes::new())?;
        let resp = ctx.http_send(req).await?;

        let status = resp.status();
        if status == StatusCode::UNAUTHORIZED || status.as_u16() == STATUS_AUTH_FAILED {
            return Err(Error::authorization(format!(
                "login rejected with status {status}"
            )));
        }
        if status.is_server_error() {
            return Err(Error::transient_transport(format!(
                "login failed with status {status}"
            )));
        }
        if !status.is_success() {
            return Err(Error::unexpected(format!(
                "login failed with status {status}"
            )));
        }

        let jsessionid = resp.headers().get_all(header::SET_COOKIE).iter().find_map(
            |value| -> Option<String> {
                let cookie = value.to_str().ok()?.split(';').next()?.trim();
                cookie.strip_prefix("JSESSIONID=").map(|s| s.to_string())
            },
        );

        let parsed: LoginResponse = serde_json::from_slice(resp.body())
            .map_err(|err| Error::protocol("malformed login response").with_source(err))?;

        // Bound the provider-declared lifetime to something sane.
        let ttl = parsed
            .loginresponse
            .timeout
            .unwrap_or(self.default_ttl.as_secs() as i64)
            .clamp(0, 31_536_000);
        debug!("session acquired, valid for {ttl}s");

        Ok(Some(Session {
            session_key: parsed.loginresponse.sessionkey,
            jsessionid,
            expires_at: Some(ctx.now() + chrono::TimeDelta::try_seconds(ttl).expect("in bounds")),
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::SessionRequestSigner;
    use cloudauth_core::{
        BackoffPolicy, ErrorKind, HttpSend, Invoker, RetryPolicy, SessionCache, Signer,
    };
    use std::collections::VecDeque;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::{Arc, Mutex};

    /// Routes login calls and api calls to separate scripted queues.
    #[derive(Debug)]
    struct ControlPlane {
        logins: Mutex<VecDeque<Result<http::Response<Bytes>>>>,
        api: Mutex<VecDeque<Result<http::Response<Bytes>>>>,
        login_count: AtomicUsize,
        seen_api: Mutex<Vec<String>>,
    }

    impl ControlPlane {
        fn new(
            logins: Vec<Result<http::Response<Bytes>>>,
            api: Vec<Result<http::Response<Bytes>>>,
        ) -> ControlPlaneHandle {
            ControlPlaneHandle(Arc::new(Self {
                logins: Mutex::new(logins.into()),
                api: Mutex::new(api.into()),
                login_count: AtomicUsize::new(0),
                seen_api: Mutex::new(Vec::new()),
            }))
        }
    }

    /// Local newtype so `HttpSend` (foreign trait) can be implemented for the
    /// shared handle without violating the orphan rule (`Arc` is foreign too).
    #[derive(Debug, Clone)]
    struct ControlPlaneHandle(Arc<ControlPlane>);

    impl std::ops::Deref for ControlPlaneHandle {
        type Target = ControlPlane;

        fn deref(&self) -> &ControlPlane {
            &self.0
        }
    }

    #[async_trait]
    impl HttpSend for ControlPlaneHandle {
        async fn http_send(&self, req: http::Request<Bytes>) -> Result<http::Response<Bytes>> {
            let uri = req.uri().to_string();
            if uri.contains("command=login") {
                self.login_count.fetch_add(1, Ordering::SeqCst);
                self.logins
                    .lock()
                    .unwrap()
                    .pop_front()
                    .unwrap_or_else(|| Err(Error::unexpected("login script exhausted")))
            } else {
                self.seen_api.lock().unwrap().push(uri);
                self.api
                    .lock()
                    .unwrap()
                    .pop_front()
                    .unwrap_or_else(|| Err(Error::unexpected("api script exhausted")))
            }
        }
    }

    fn login_ok(sessionkey: &str) -> Result<http::Response<Bytes>> {
        Ok(http::Response::builder()
            .status(200)
            .header(header::SET_COOKIE, "JSESSIONID=node0abc; Path=/client")
            .body(Bytes::from(format!(
                "{{\"loginresponse\":{{\"sessionkey\":\"{sessionkey}\",\"timeout\":1800}}}}"
            )))
            .unwrap())
    }

    fn status(code: u16) -> Result<http::Response<Bytes>> {
        Ok(http::Response::builder()
            .status(code)
            .body(Bytes::new())
            .unwrap())
    }

    fn provider() -> PasswordLoginProvider {
        PasswordLoginProvider::new("http://localhost:8080/client/api", "jclouds", "password")
    }

    #[tokio::test]
    async fn test_login_parses_session() -> Result<()> {
        let http = ControlPlane::new(vec![login_ok("sk-1")], vec![]);
        let ctx = Context::new().with_http_send(http);

        let session = provider()
            .provide_credential(&ctx)
            .await?
            .expect("session must be acquired");
        assert_eq!(session.session_key, "sk-1");
        assert_eq!(session.jsessionid.as_deref(), Some("node0abc"));
        assert!(session.expires_at.is_some());

        Ok(())
    }

    #[tokio::test]
    async fn test_login_rejection_is_terminal() {
        let http = ControlPlane::new(vec![status(531)], vec![]);
        let ctx = Context::new().with_http_send(http);

        let err = provider().provide_credential(&ctx).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Authorization);
    }

    #[tokio::test]
    async fn test_login_server_error_is_transient() {
        let http = ControlPlane::new(vec![status(503)], vec![]);
        let ctx = Context::new().with_http_send(http);

        let err = provider().provide_credential(&ctx).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::TransientTransport);
    }

    #[tokio::test]
    async fn test_login_garbage_body_is_protocol_error() {
        let http = ControlPlane::new(
            vec![Ok(http::Response::builder()
                .status(200)
                .body(Bytes::from_static(b"<html>not json</html>"))
                .unwrap())],
            vec![],
        );
        let ctx = Context::new().with_http_send(http);

        let err = provider().provide_credential(&ctx).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Protocol);
    }

    #[tokio::test]
    async fn test_unauthorized_api_call_relogs_in() -> Result<()> {
        let _ = env_logger::builder().is_test(true).try_init();

        let http = ControlPlane::new(
            vec![login_ok("sk-1"), login_ok("sk-2")],
            vec![status(401), status(200)],
        );
        let ctx = Context::new().with_http_send(http.clone());
        let signer = Signer::new(ctx, provider(), SessionRequestSigner::new());
        let invoker = Invoker::new(
            signer,
            RetryPolicy::new(BackoffPolicy::new(2, std::time::Duration::from_millis(1))),
        );

        let req = http::Request::get("http://localhost:8080/client/api?command=listZones")
            .body(Bytes::new())?;
        let resp = invoker.execute(req).await?;
        assert_eq!(resp.status(), 200);

        let seen = http.seen_api.lock().unwrap().clone();
        assert_eq!(seen.len(), 2);
        // The resend carries a freshly acquired session.
        assert!(seen[0].contains("sessionkey=sk-1"));
        assert!(seen[1].contains("sessionkey=sk-2"));
        assert_eq!(http.login_count.load(Ordering::SeqCst), 2);

        Ok(())
    }

    #[tokio::test]
    async fn test_rejected_login_fails_fast_for_later_calls() {
        let http = ControlPlane::new(vec![status(531)], vec![]);
        let ctx = Context::new().with_http_send(http.clone());
        let signer = Signer::new(ctx, provider(), SessionRequestSigner::new());
        let invoker = Invoker::new(
            signer,
            RetryPolicy::new(BackoffPolicy::new(2, std::time::Duration::from_millis(1))),
        );

        let req = http::Request::get("http://localhost:8080/client/api?command=listZones")
            .body(Bytes::new())
            .unwrap();
        let err = invoker.execute(req).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Authorization);

        // The denial is sticky: no second login attempt goes out.
        let req = http::Request::get("http://localhost:8080/client/api?command=listZones")
            .body(Bytes::new())
            .unwrap();
        let err = invoker.execute(req).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Authorization);
        assert_eq!(http.login_count.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_logout_consumes_the_cached_session() -> Result<()> {
        let http = ControlPlane::new(vec![login_ok("sk-1")], vec![status(200)]);
        let ctx = Context::new().with_http_send(http.clone());

        let cache = SessionCache::new(provider());
        let session = cache.get(&ctx).await?.expect("session must be acquired");

        let taken = cache.take().expect("session must be cached");
        provider().logout(&ctx, &taken).await?;
        assert_eq!(session.session_key, taken.session_key);

        let seen = http.seen_api.lock().unwrap().clone();
        assert_eq!(seen.len(), 1);
        assert!(seen[0].contains("command=logout"));
        assert!(seen[0].contains("sessionkey=sk-1"));

        Ok(())
    }
}
