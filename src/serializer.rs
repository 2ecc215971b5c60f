//! The write path: composing a start line followed by serialized headers.
//!
//! Outbound chunked re-framing and length validation are the embedder's
//! responsibility — `write_buf` (in `connection.rs`) appends body bytes
//! verbatim, so the embedder must have written a correct
//! `Content-Length`/`Transfer-Encoding` header beforehand.

use std::io::Write;

use message::{Request, Response};
use netbuf::Buf;
use version::Version;

/// Emits `METHOD REQUEST-TARGET VERSION\r\n` then the request's headers.
///
/// Used by a `Client`-role connection (we are the client of an upstream).
pub fn write_request(out: &mut Buf, req: &Request) {
    write!(out, "{} {} {}\r\n",
        req.method(), req.url().as_str(), req.version()).unwrap();
    req.headers().write_to(out).unwrap();
    out.write_all(b"\r\n").unwrap();
}

/// Emits `VERSION CODE REASON\r\n` then the response's headers.
///
/// Used by a `Server`-role connection.
pub fn write_response(out: &mut Buf, resp: &Response) {
    write!(out, "{} {} {}\r\n",
        resp.version(), resp.status(), resp.reason()).unwrap();
    resp.headers().write_to(out).unwrap();
    out.write_all(b"\r\n").unwrap();
}

/// Composes a minimal error response for `Connection::send_error`.
pub fn write_error_response(
    out: &mut Buf,
    version: Version,
    code: u16,
    reason: &str,
    persistent: bool,
) {
    let body = format!("{} {}\n", code, reason);
    write!(out, "{} {} {}\r\n", version, code, reason).unwrap();
    write!(out, "Content-Length: {}\r\n", body.len()).unwrap();
    write!(out, "Content-Type: text/plain\r\n").unwrap();
    write!(out, "Connection: {}\r\n", if persistent { "keep-alive" } else { "close" })
        .unwrap();
    out.write_all(b"\r\n").unwrap();
    out.write_all(body.as_bytes()).unwrap();
}

#[cfg(test)]
mod test {
    use super::*;
    use headers::HeaderList;
    use method::Method;
    use target::RequestTarget;

    #[test]
    fn writes_minimal_request() {
        let mut headers = HeaderList::new();
        headers.push("Host", b"example.com");
        let req = Request::new(
            Method::Get, Version::Http11,
            RequestTarget::parse("/", false).unwrap(), headers);
        let mut out = Buf::new();
        write_request(&mut out, &req);
        assert_eq!(&out[..],
            b"GET / HTTP/1.1\r\nHost: example.com\r\n\r\n");
    }

    #[test]
    fn writes_minimal_response() {
        let headers = HeaderList::new();
        let resp = Response::new(
            Version::Http10, 200, "OK".to_string(), headers);
        let mut out = Buf::new();
        write_response(&mut out, &resp);
        assert_eq!(&out[..], b"HTTP/1.0 200 OK\r\n\r\n");
    }

    #[test]
    fn writes_error_page_with_close_when_not_persistent() {
        let mut out = Buf::new();
        write_error_response(&mut out, Version::Http11, 400, "Bad Request",
            false);
        let text = String::from_utf8(out[..].to_vec()).unwrap();
        assert!(text.starts_with("HTTP/1.1 400 Bad Request\r\n"));
        assert!(text.contains("Connection: close\r\n"));
    }
}
