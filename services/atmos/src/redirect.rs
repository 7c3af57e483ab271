//! Redirect handling for storage endpoints.
//!
//! Some storage frontends answer 301/307 without a `Location` header and
//! declare the right accesspoint in the XML error body instead. This module
//! parses that body into an alternate endpoint for the retry policy.

use bytes::Bytes;
use http::uri::Authority;
use serde::Deserialize;

use cloudauth_core::{BackoffPolicy, ExtractEndpoint, RetryPolicy};

#[derive(Debug, Deserialize)]
struct ErrorBody {
    #[serde(rename = "Endpoint")]
    endpoint: Option<String>,
}

/// XmlErrorEndpoint extracts the alternate endpoint from an XML error body:
///
/// ```text
/// <Error>
///   <Code>PermanentRedirect</Code>
///   <Endpoint>storage-west.example.com</Endpoint>
/// </Error>
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct XmlErrorEndpoint;

impl ExtractEndpoint for XmlErrorEndpoint {
    fn alternate_endpoint(&self, response: &http::Response<Bytes>) -> Option<Authority> {
        let text = std::str::from_utf8(response.body()).ok()?;
        let body: ErrorBody = quick_xml::de::from_str(text).ok()?;
        body.endpoint?.parse().ok()
    }
}

/// Retry policy for object-storage calls: default backoff bounds plus the
/// XML error-body redirect parser.
pub fn retry_policy() -> RetryPolicy {
    RetryPolicy::new(BackoffPolicy::default()).with_endpoint_extractor(XmlErrorEndpoint)
}
