//! HTTP Digest Authentication primitives.
//!
//! The device firmware speaks the subset of RFC 7616 common to Theta-family
//! cameras: MD5 only, `qop="auth"`, and a constant nonce count with a fresh
//! client nonce per request. MD5 is required for interoperability with the
//! firmware; it is not a recommendation.

use md5::{Digest, Md5};
use rand::RngCore;

/// Quality of protection assumed when the challenge omits `qop`.
pub const DEFAULT_QOP: &str = "auth";

/// The firmware validates a constant nonce count; replay protection comes
/// from the per-request client nonce instead.
const NONCE_COUNT: &str = "00000001";

/// Serial-number usernames look like `THETA` + two model letters + digits.
const SERIAL_USERNAME_PREFIX: &str = "THETA";
const SERIAL_PREFIX_LEN: usize = 7;

/// Digest credentials plus the most recently observed server challenge.
///
/// One instance serves one client context; the challenge fields are only
/// mutated through [`DigestAuth::set_challenge`].
#[derive(Debug, Clone)]
pub struct DigestAuth {
    username: String,
    password: String,
    realm: Option<String>,
    nonce: Option<String>,
    qop: String,
}

impl DigestAuth {
    /// Creates credentials for client-mode access.
    ///
    /// When `password` is omitted and the username is a device serial
    /// number, the factory-default password is the serial digits after the
    /// 7-character model prefix. Any other username without a password gets
    /// an empty one.
    pub fn new(username: impl Into<String>, password: Option<String>) -> Self {
        let username = username.into();
        let password = password.unwrap_or_else(|| default_password(&username));
        Self {
            username,
            password,
            realm: None,
            nonce: None,
            qop: DEFAULT_QOP.to_string(),
        }
    }

    pub fn username(&self) -> &str {
        &self.username
    }

    /// Records the values of the latest `WWW-Authenticate` challenge.
    pub fn set_challenge(
        &mut self,
        realm: Option<String>,
        nonce: Option<String>,
        qop: Option<String>,
    ) {
        self.realm = realm;
        self.nonce = nonce;
        self.qop = qop.unwrap_or_else(|| DEFAULT_QOP.to_string());
    }

    pub(crate) fn update_challenge(&mut self, challenge: DigestChallenge) {
        self.set_challenge(challenge.realm, challenge.nonce, challenge.qop);
    }

    /// Builds the `Authorization` header value for one request, drawing a
    /// fresh client nonce from the system CSPRNG.
    pub fn authorization_header(&self, uri: &str, method: &str) -> String {
        self.header_with_cnonce(uri, method, &random_cnonce())
    }

    /// Header construction with an explicit client nonce. The field order
    /// and quoting are what the firmware expects; do not reorder.
    fn header_with_cnonce(&self, uri: &str, method: &str, cnonce: &str) -> String {
        let realm = self.realm.as_deref().unwrap_or("");
        let nonce = self.nonce.as_deref().unwrap_or("");

        let ha1 = hex_md5(&[&self.username, realm, &self.password]);
        let ha2 = hex_md5(&[method, uri]);
        let response = hex_md5(&[&ha1, nonce, NONCE_COUNT, cnonce, &self.qop, &ha2]);

        format!(
            "Digest username=\"{}\", realm=\"{}\", uri=\"{}\", nonce=\"{}\", nc={}, qop=\"{}\", cnonce=\"{}\", response=\"{}\"",
            self.username, realm, uri, nonce, NONCE_COUNT, self.qop, cnonce, response
        )
    }
}

/// Factory-default password for serial-number usernames.
fn default_password(username: &str) -> String {
    if !username.starts_with(SERIAL_USERNAME_PREFIX) {
        return String::new();
    }
    match username.get(SERIAL_PREFIX_LEN..) {
        Some(suffix) if !suffix.is_empty() => suffix.to_string(),
        _ => String::new(),
    }
}

/// Challenge parameters parsed out of a `WWW-Authenticate` header.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub(crate) struct DigestChallenge {
    pub(crate) realm: Option<String>,
    pub(crate) nonce: Option<String>,
    pub(crate) qop: Option<String>,
}

/// Returns `None` unless the header advertises the Digest scheme.
pub(crate) fn parse_www_authenticate(header: &str) -> Option<DigestChallenge> {
    let (scheme, params) = header.trim().split_once(char::is_whitespace)?;
    if !scheme.eq_ignore_ascii_case("Digest") {
        return None;
    }
    Some(DigestChallenge {
        realm: quoted_param(params, "realm"),
        nonce: quoted_param(params, "nonce"),
        qop: quoted_param(params, "qop"),
    })
}

fn quoted_param(params: &str, name: &str) -> Option<String> {
    let needle = format!("{name}=\"");
    let start = params.find(&needle)? + needle.len();
    let end = params[start..].find('"')? + start;
    Some(params[start..end].to_string())
}

/// 32 hex chars from 16 CSPRNG bytes, matching the UUID-shaped client
/// nonces the firmware was validated against.
fn random_cnonce() -> String {
    let mut bytes = [0u8; 16];
    rand::thread_rng().fill_bytes(&mut bytes);
    hex::encode(bytes)
}

/// MD5 over `parts` joined with `:`, as lowercase hex.
fn hex_md5(parts: &[&str]) -> String {
    let mut hasher = Md5::new();
    for (i, part) in parts.iter().enumerate() {
        if i > 0 {
            hasher.update(b":");
        }
        hasher.update(part.as_bytes());
    }
    hex::encode(hasher.finalize())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_password_from_serial_username() {
        let auth = DigestAuth::new("THETAYL00105377", None);
        assert_eq!(auth.password, "00105377");
    }

    #[test]
    fn test_default_password_requires_suffix() {
        // Exactly the prefix length: nothing left to derive from.
        let auth = DigestAuth::new("THETAYL", None);
        assert_eq!(auth.password, "");
    }

    #[test]
    fn test_default_password_non_serial_username() {
        let auth = DigestAuth::new("operator", None);
        assert_eq!(auth.password, "");
    }

    #[test]
    fn test_explicit_password_wins() {
        let auth = DigestAuth::new("THETAYL00105377", Some("secret".to_string()));
        assert_eq!(auth.password, "secret");
    }

    #[test]
    fn test_hex_md5_empty_vector() {
        // MD5("") = d41d8cd98f00b204e9800998ecf8427e
        assert_eq!(hex_md5(&[""]), "d41d8cd98f00b204e9800998ecf8427e");
    }

    #[test]
    fn test_hex_md5_known_vector() {
        // MD5("abc") = 900150983cd24fb0d6963f7d28e17f72
        assert_eq!(hex_md5(&["abc"]), "900150983cd24fb0d6963f7d28e17f72");
    }

    #[test]
    fn test_hex_md5_joins_with_colon() {
        assert_eq!(hex_md5(&["a", "b"]), hex_md5(&["a:b"]));
    }

    #[test]
    fn test_rfc2617_known_response() {
        // The worked example from RFC 2617 §3.5.
        let mut auth = DigestAuth::new("Mufasa", Some("Circle Of Life".to_string()));
        auth.set_challenge(
            Some("testrealm@host.com".to_string()),
            Some("dcd98b7102dd2f0e8b11d0f600bfb0c093".to_string()),
            Some("auth".to_string()),
        );
        let header = auth.header_with_cnonce("/dir/index.html", "GET", "0a4f113b");
        assert!(
            header.contains("response=\"6629fae49393a05397450978507c4ef1\""),
            "unexpected digest response in {header}"
        );
    }

    #[test]
    fn test_header_field_order() {
        let mut auth = DigestAuth::new("THETAYL00105377", None);
        auth.set_challenge(
            Some("THETA".to_string()),
            Some("abcdef".to_string()),
            None,
        );
        let header = auth.authorization_header("/osc/commands/execute", "POST");

        assert!(header.starts_with("Digest username=\"THETAYL00105377\""));
        let fields = [
            "username=", "realm=", "uri=", "nonce=", "nc=", "qop=", "cnonce=", "response=",
        ];
        let mut last = 0;
        for field in fields {
            let pos = header[last..]
                .find(field)
                .unwrap_or_else(|| panic!("missing {field} after byte {last} in {header}"));
            last += pos + field.len();
        }
        assert!(header.contains("nc=00000001"));
        assert!(header.contains("qop=\"auth\""));
    }

    #[test]
    fn test_response_deterministic_for_fixed_cnonce() {
        let mut auth = DigestAuth::new("THETAYL00105377", None);
        auth.set_challenge(Some("THETA".to_string()), Some("abcdef".to_string()), None);

        let first = auth.header_with_cnonce("/osc/state", "POST", "00112233445566778899aabbccddeeff");
        let second = auth.header_with_cnonce("/osc/state", "POST", "00112233445566778899aabbccddeeff");
        assert_eq!(first, second);

        // The response digest is exactly the documented MD5 chain.
        let ha1 = hex_md5(&["THETAYL00105377", "THETA", "00105377"]);
        let ha2 = hex_md5(&["POST", "/osc/state"]);
        let expected = hex_md5(&[
            &ha1,
            "abcdef",
            "00000001",
            "00112233445566778899aabbccddeeff",
            "auth",
            &ha2,
        ]);
        assert!(first.contains(&format!("response=\"{expected}\"")));
    }

    #[test]
    fn test_fresh_cnonce_per_header() {
        let mut auth = DigestAuth::new("THETAYL00105377", None);
        auth.set_challenge(Some("THETA".to_string()), Some("abcdef".to_string()), None);

        let first = auth.authorization_header("/osc/commands/execute", "POST");
        let second = auth.authorization_header("/osc/commands/execute", "POST");
        assert_ne!(first, second, "client nonce must differ between requests");
    }

    #[test]
    fn test_parse_www_authenticate_full() {
        let challenge = parse_www_authenticate(
            "Digest realm=\"THETA\", nonce=\"f31ae4b0\", qop=\"auth\"",
        )
        .expect("challenge should parse");
        assert_eq!(challenge.realm.as_deref(), Some("THETA"));
        assert_eq!(challenge.nonce.as_deref(), Some("f31ae4b0"));
        assert_eq!(challenge.qop.as_deref(), Some("auth"));
    }

    #[test]
    fn test_parse_www_authenticate_case_insensitive_scheme() {
        let challenge = parse_www_authenticate("digest realm=\"r\", nonce=\"n\"");
        assert!(challenge.is_some());
    }

    #[test]
    fn test_parse_www_authenticate_missing_qop() {
        let challenge = parse_www_authenticate("Digest realm=\"r\", nonce=\"n\"")
            .expect("challenge should parse");
        assert_eq!(challenge.qop, None);

        let mut auth = DigestAuth::new("u", Some("p".to_string()));
        auth.update_challenge(challenge);
        assert_eq!(auth.qop, DEFAULT_QOP);
    }

    #[test]
    fn test_parse_www_authenticate_rejects_other_schemes() {
        assert!(parse_www_authenticate("Basic realm=\"THETA\"").is_none());
        assert!(parse_www_authenticate("Bearer token").is_none());
    }
}
