use std::fmt::{self, Display};

/// Represents a version of the HTTP spec.
///
/// HTTP/0.9 and HTTP/2 are not supported; most requests that appear to be
/// HTTP/0.9 are malformed HTTP/1.0 requests, and HTTP/2 is a distinct wire
/// format handled by a different engine entirely.
#[derive(Copy, Clone, Debug, Eq, Hash, PartialEq)]
pub enum Version {
    /// HTTP/1.0
    Http10,
    /// HTTP/1.1
    Http11,
}

impl Version {
    /// Parses the version token of a start line (e.g. `HTTP/1.1`).
    ///
    /// The `HTTP/` prefix is matched case-insensitively; the remainder must
    /// be exactly `1.0` or `1.1`.
    pub fn parse(token: &str) -> Option<Version> {
        let prefix = match token.as_bytes().get(..5) {
            Some(p) => p,
            None => return None,
        };
        if !prefix.eq_ignore_ascii_case(b"http/") {
            return None;
        }
        match &token[5..] {
            "1.0" => Some(Version::Http10),
            "1.1" => Some(Version::Http11),
            _ => None,
        }
    }
}

impl Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(match *self {
            Version::Http10 => "HTTP/1.0",
            Version::Http11 => "HTTP/1.1",
        })
    }
}

#[cfg(test)]
mod test {
    use super::Version;

    #[test]
    fn parses_known_versions() {
        assert_eq!(Version::parse("HTTP/1.1"), Some(Version::Http11));
        assert_eq!(Version::parse("http/1.0"), Some(Version::Http10));
        assert_eq!(Version::parse("HtTp/1.1"), Some(Version::Http11));
    }

    #[test]
    fn rejects_everything_else() {
        assert_eq!(Version::parse("HTTP/2"), None);
        assert_eq!(Version::parse("HTTP/0.9"), None);
        assert_eq!(Version::parse("FTP/1.1"), None);
        assert_eq!(Version::parse("HTTP/1.10"), None);
    }

    #[test]
    fn displays_canonical_form() {
        assert_eq!(Version::Http11.to_string(), "HTTP/1.1");
        assert_eq!(Version::Http10.to_string(), "HTTP/1.0");
    }
}
