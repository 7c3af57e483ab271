use std::fmt;
use thiserror::Error;

/// The error type for signing and retry operations.
#[derive(Error, Debug)]
#[error("{message}")]
pub struct Error {
    kind: ErrorKind,
    message: String,
    #[source]
    source: Option<anyhow::Error>,
}

/// The kind of error that occurred.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Request cannot be signed: missing credentials, unusable key material,
    /// or a date header that the caller was required to set.
    Signing,

    /// A request value that cannot be represented (bad URI, bad header).
    RequestInvalid,

    /// Timeout, connection reset, or a persistent server error after the
    /// retry budget is exhausted.
    TransientTransport,

    /// Terminal authorization failure; never retried further.
    Authorization,

    /// Redirect loop or redirect counter exhausted.
    RedirectExhausted,

    /// Malformed response while extracting a redirect target or a session
    /// token.
    Protocol,

    /// Non-retryable client error surfaced to the caller.
    RequestRejected,

    /// Unclassified errors (transport internals, I/O).
    Unexpected,
}

impl Error {
    /// Create a new error with the given kind and message.
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            source: None,
        }
    }

    /// Add a source error.
    pub fn with_source(mut self, source: impl Into<anyhow::Error>) -> Self {
        self.source = Some(source.into());
        self
    }

    /// Get the error kind.
    pub fn kind(&self) -> ErrorKind {
        self.kind
    }

    /// Check if this failure may succeed on a plain resend.
    pub fn is_transient(&self) -> bool {
        matches!(
            self.kind,
            ErrorKind::TransientTransport | ErrorKind::Unexpected
        )
    }
}

// Convenience constructors
impl Error {
    /// Create a signing error.
    pub fn signing(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Signing, message)
    }

    /// Create a request invalid error.
    pub fn request_invalid(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::RequestInvalid, message)
    }

    /// Create a transient transport error.
    pub fn transient_transport(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::TransientTransport, message)
    }

    /// Create an authorization error.
    pub fn authorization(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Authorization, message)
    }

    /// Create a redirect exhausted error.
    pub fn redirect_exhausted(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::RedirectExhausted, message)
    }

    /// Create a protocol error.
    pub fn protocol(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Protocol, message)
    }

    /// Create a request rejected error.
    pub fn request_rejected(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::RequestRejected, message)
    }

    /// Create an unexpected error.
    pub fn unexpected(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Unexpected, message)
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ErrorKind::Signing => write!(f, "signing failed"),
            ErrorKind::RequestInvalid => write!(f, "invalid request"),
            ErrorKind::TransientTransport => write!(f, "transient transport failure"),
            ErrorKind::Authorization => write!(f, "authorization failed"),
            ErrorKind::RedirectExhausted => write!(f, "redirects exhausted"),
            ErrorKind::Protocol => write!(f, "protocol error"),
            ErrorKind::RequestRejected => write!(f, "request rejected"),
            ErrorKind::Unexpected => write!(f, "unexpected error"),
        }
    }
}

/// Convenience type alias for Results.
pub type Result<T> = std::result::Result<T, Error>;

// Common From implementations
impl From<std::fmt::Error> for Error {
    fn from(err: std::fmt::Error) -> Self {
        Self::unexpected(err.to_string()).with_source(anyhow::Error::from(err))
    }
}

impl From<http::Error> for Error {
    fn from(err: http::Error) -> Self {
        Self::request_invalid(err.to_string()).with_source(anyhow::Error::from(err))
    }
}

impl From<http::header::InvalidHeaderValue> for Error {
    fn from(err: http::header::InvalidHeaderValue) -> Self {
        Self::request_invalid(err.to_string()).with_source(anyhow::Error::from(err))
    }
}

impl From<http::uri::InvalidUri> for Error {
    fn from(err: http::uri::InvalidUri) -> Self {
        Self::request_invalid(err.to_string()).with_source(anyhow::Error::from(err))
    }
}

impl From<http::uri::InvalidUriParts> for Error {
    fn from(err: http::uri::InvalidUriParts) -> Self {
        Self::request_invalid(err.to_string()).with_source(anyhow::Error::from(err))
    }
}

impl From<http::header::ToStrError> for Error {
    fn from(err: http::header::ToStrError) -> Self {
        Self::request_invalid(err.to_string()).with_source(anyhow::Error::from(err))
    }
}
