//! Body-length discipline and persistence: deciding whether a message has a
//! body, how its length is framed, and whether the connection survives to
//! serve another message afterward.

use headers::HeaderList;
use method::Method;
use version::Version;

/// How the body of the in-progress message is framed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransferCoding {
    Identity,
    Chunked,
}

/// The outcome of inspecting headers for one message: whether it has a
/// body, and if so, how its length is determined.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Framing {
    pub has_body: bool,
    pub transfer_coding: TransferCoding,
    /// `Some(n)` for a known fixed length, `None` otherwise (chunked or
    /// EOF-delimited).
    pub remaining: Option<u64>,
    pub eof_completes: bool,
}

/// Error raised by `compute` for contract violations that the caller must
/// turn into `Error::ClientPostWithoutLength`.
pub struct AmbiguousRequestBody;

impl Framing {
    /// Decides body presence and length discipline for one message.
    /// `is_request` distinguishes client-role (reading a request) from
    /// server-role (reading a response) framing rules; `method`/`status`
    /// supply the role-specific body-presence check.
    pub fn compute(
        headers: &HeaderList,
        is_request: bool,
        method: Option<Method>,
        status: Option<u16>,
    ) -> Result<Framing, AmbiguousRequestBody> {
        let mut has_body = if is_request {
            matches!(method, Some(Method::Post) | Some(Method::Put))
        } else {
            let code = status.unwrap_or(200);
            !(code / 100 == 1 || code == 204 || code == 205 || code == 304)
        };

        let mut transfer_coding = TransferCoding::Identity;
        let mut remaining = None;
        let mut eof_completes = false;

        if has_body {
            if let Some(te) = headers.get_str("Transfer-Encoding") {
                if te.trim().eq_ignore_ascii_case("chunked") {
                    transfer_coding = TransferCoding::Chunked;
                } else {
                    warn!("ignoring unsupported Transfer-Encoding: {:?}", te);
                }
            }
            if transfer_coding == TransferCoding::Identity {
                if let Some(cl) = headers.get_str("Content-Length") {
                    match cl.trim().parse::<u64>() {
                        Ok(0) => has_body = false,
                        Ok(n) => remaining = Some(n),
                        Err(_) => {
                            warn!("unparseable Content-Length: {:?}", cl);
                            if is_request {
                                return Err(AmbiguousRequestBody);
                            }
                            eof_completes = true;
                        }
                    }
                } else {
                    if is_request {
                        return Err(AmbiguousRequestBody);
                    }
                    eof_completes = true;
                }
            }
        }

        Ok(Framing { has_body, transfer_coding, remaining, eof_completes })
    }
}

/// Decides whether the connection survives to serve another message once
/// the current one completes.
///
/// `Connection: close` clears persistence; any other value, or its
/// absence, preserves whatever the version/framing already decided.
pub fn is_persistent(
    headers: &HeaderList,
    version: Version,
    eof_completes: bool,
    previous_version: Option<Version>,
) -> bool {
    let mut persistent = !eof_completes && version == Version::Http11;

    if let Some(prev) = previous_version {
        if prev != version {
            persistent = false;
        }
    }

    if let Some(conn) = headers.get_str("Connection") {
        if conn.trim().eq_ignore_ascii_case("close") {
            persistent = false;
        }
    }

    persistent
}

#[cfg(test)]
mod test {
    use super::*;
    use headers::HeaderList;

    #[test]
    fn request_get_has_no_body_regardless_of_headers() {
        let mut h = HeaderList::new();
        h.push("Content-Length", b"5");
        let f = Framing::compute(&h, true, Some(Method::Get), None).unwrap();
        assert!(!f.has_body);
    }

    #[test]
    fn request_post_without_length_or_chunked_is_ambiguous() {
        let h = HeaderList::new();
        assert!(Framing::compute(&h, true, Some(Method::Post), None).is_err());
    }

    #[test]
    fn request_post_with_content_length() {
        let mut h = HeaderList::new();
        h.push("Content-Length", b"10");
        let f = Framing::compute(&h, true, Some(Method::Post), None).unwrap();
        assert!(f.has_body);
        assert_eq!(f.remaining, Some(10));
        assert_eq!(f.transfer_coding, TransferCoding::Identity);
    }

    #[test]
    fn response_204_has_no_body() {
        let h = HeaderList::new();
        let f = Framing::compute(&h, false, None, Some(204)).unwrap();
        assert!(!f.has_body);
    }

    #[test]
    fn response_without_length_is_eof_delimited() {
        let h = HeaderList::new();
        let f = Framing::compute(&h, false, None, Some(200)).unwrap();
        assert!(f.has_body);
        assert!(f.eof_completes);
        assert_eq!(f.remaining, None);
    }

    #[test]
    fn response_chunked_overrides_content_length_check() {
        let mut h = HeaderList::new();
        h.push("Transfer-Encoding", b"chunked");
        let f = Framing::compute(&h, false, None, Some(200)).unwrap();
        assert_eq!(f.transfer_coding, TransferCoding::Chunked);
        assert_eq!(f.remaining, None);
    }

    #[test]
    fn persistence_requires_http11_and_non_eof_framing() {
        let h = HeaderList::new();
        assert!(is_persistent(&h, Version::Http11, false, None));
        assert!(!is_persistent(&h, Version::Http10, false, None));
        assert!(!is_persistent(&h, Version::Http11, true, None));
    }

    #[test]
    fn connection_close_clears_persistence() {
        let mut h = HeaderList::new();
        h.push("Connection", b"close");
        assert!(!is_persistent(&h, Version::Http11, false, None));
    }

    #[test]
    fn connection_keep_alive_does_not_clear_persistence() {
        let mut h = HeaderList::new();
        h.push("Connection", b"keep-alive");
        assert!(is_persistent(&h, Version::Http11, false, None));
    }

    #[test]
    fn version_change_mid_connection_clears_persistence() {
        let h = HeaderList::new();
        assert!(!is_persistent(
            &h, Version::Http11, false, Some(Version::Http10)));
    }
}
