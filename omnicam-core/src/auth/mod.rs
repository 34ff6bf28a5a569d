//! Client-mode authentication.
//!
//! Devices joined to an access point ("client mode") protect their web API
//! with HTTP Digest Authentication. [`DigestAuth`] holds the credentials and
//! the most recently observed server challenge; the transport layer feeds it
//! challenges from `401` responses and asks it for `Authorization` headers
//! on the retry (see [`crate::transport::AuthTransport`]).

mod digest;

pub use digest::{DigestAuth, DEFAULT_QOP};

pub(crate) use digest::parse_www_authenticate;
