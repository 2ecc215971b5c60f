//! A URL tokenizer returning host/port/query/… from a request-target
//! string. Treated as opaque past these fields — a forward proxy re-emitting
//! a request it received needs the pieces of the original request-target
//! to build the new request line and `Host` header for the upstream
//! connection, and nothing more.

use url::Url;

/// The parsed form of an HTTP/1.x request-target.
///
/// Origin-form (`/path?query`, the common case for requests arriving at a
/// reverse-facing listener) is handled directly without invoking the `url`
/// crate, since it is not a full URL. Absolute-form (`http://host/path`,
/// seen when a client talks to a forward proxy) and the authority-form used
/// by `CONNECT` are parsed with `url::Url`.
#[derive(Debug, Clone)]
pub enum RequestTarget {
    Origin { path: String, query: Option<String> },
    Absolute(Url),
    Authority { host: String, port: u16 },
}

impl RequestTarget {
    /// Tokenizes a request-target per RFC 7230 §5.3, dispatching on its
    /// leading character / method context.
    pub fn parse(raw: &str, is_connect: bool) -> Option<RequestTarget> {
        if is_connect {
            return RequestTarget::parse_authority(raw);
        }
        if raw.starts_with('/') {
            return Some(RequestTarget::parse_origin(raw));
        }
        Url::parse(raw).ok().map(RequestTarget::Absolute)
    }

    fn parse_origin(raw: &str) -> RequestTarget {
        match raw.find('?') {
            Some(idx) => RequestTarget::Origin {
                path: raw[..idx].to_string(),
                query: Some(raw[idx + 1..].to_string()),
            },
            None => RequestTarget::Origin {
                path: raw.to_string(),
                query: None,
            },
        }
    }

    fn parse_authority(raw: &str) -> Option<RequestTarget> {
        let mut parts = raw.rsplitn(2, ':');
        let port = parts.next()?.parse().ok()?;
        let host = parts.next()?.to_string();
        Some(RequestTarget::Authority { host, port })
    }

    /// The host this request-target names, if any (absent for origin-form
    /// targets, which rely on a separate `Host` header).
    pub fn host(&self) -> Option<&str> {
        match *self {
            RequestTarget::Origin { .. } => None,
            RequestTarget::Absolute(ref url) => url.host_str(),
            RequestTarget::Authority { ref host, .. } => Some(host),
        }
    }

    pub fn port(&self) -> Option<u16> {
        match *self {
            RequestTarget::Origin { .. } => None,
            RequestTarget::Absolute(ref url) => url.port(),
            RequestTarget::Authority { port, .. } => Some(port),
        }
    }

    pub fn query(&self) -> Option<&str> {
        match *self {
            RequestTarget::Origin { ref query, .. } => query.as_deref(),
            RequestTarget::Absolute(ref url) => url.query(),
            RequestTarget::Authority { .. } => None,
        }
    }

    /// The request-target as it should be re-serialized onto the wire.
    pub fn as_str(&self) -> String {
        match *self {
            RequestTarget::Origin { ref path, ref query } => match query {
                Some(q) => format!("{}?{}", path, q),
                None => path.clone(),
            },
            RequestTarget::Absolute(ref url) => url.as_str().to_string(),
            RequestTarget::Authority { ref host, port } => {
                format!("{}:{}", host, port)
            }
        }
    }
}

#[cfg(test)]
mod test {
    use super::RequestTarget;

    #[test]
    fn parses_origin_form_without_query() {
        let t = RequestTarget::parse("/foo/bar", false).unwrap();
        assert_eq!(t.query(), None);
        assert_eq!(t.as_str(), "/foo/bar");
    }

    #[test]
    fn parses_origin_form_with_query() {
        let t = RequestTarget::parse("/foo?a=1&b=2", false).unwrap();
        assert_eq!(t.query(), Some("a=1&b=2"));
        assert_eq!(t.as_str(), "/foo?a=1&b=2");
    }

    #[test]
    fn parses_absolute_form() {
        let t = RequestTarget::parse("http://example.com:8080/x", false)
            .unwrap();
        assert_eq!(t.host(), Some("example.com"));
        assert_eq!(t.port(), Some(8080));
    }

    #[test]
    fn parses_connect_authority_form() {
        let t = RequestTarget::parse("example.com:443", true).unwrap();
        assert_eq!(t.host(), Some("example.com"));
        assert_eq!(t.port(), Some(443));
    }

    #[test]
    fn rejects_malformed_authority() {
        assert!(RequestTarget::parse("example.com", true).is_none());
        assert!(RequestTarget::parse("example.com:notaport", true).is_none());
    }
}
