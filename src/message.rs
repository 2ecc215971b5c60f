//! Owned request/response messages.
//!
//! Unlike a borrowed view over the parser's own buffers, these own their
//! data outright, since they hand off to the embedder at
//! `on_client_request`/`on_server_response` and must outlive that call.

use headers::HeaderList;
use method::Method;
use target::RequestTarget;
use version::Version;

/// A parsed request, owned by the embedder once delivered via
/// `Handler::on_client_request`.
#[derive(Debug, Clone)]
pub struct Request {
    method: Method,
    version: Version,
    url: RequestTarget,
    headers: HeaderList,
}

impl Request {
    pub fn new(
        method: Method,
        version: Version,
        url: RequestTarget,
        headers: HeaderList,
    ) -> Request {
        Request { method, version, url, headers }
    }

    pub fn method(&self) -> Method { self.method }
    pub fn version(&self) -> Version { self.version }
    pub fn url(&self) -> &RequestTarget { &self.url }
    pub fn headers(&self) -> &HeaderList { &self.headers }
}

/// A parsed response, owned by the embedder once delivered via
/// `Handler::on_server_response`.
#[derive(Debug, Clone)]
pub struct Response {
    version: Version,
    status: u16,
    reason: String,
    headers: HeaderList,
}

impl Response {
    pub fn new(
        version: Version,
        status: u16,
        reason: String,
        headers: HeaderList,
    ) -> Response {
        Response { version, status, reason, headers }
    }

    pub fn version(&self) -> Version { self.version }
    pub fn status(&self) -> u16 { self.status }
    pub fn reason(&self) -> &str { &self.reason }
    pub fn headers(&self) -> &HeaderList { &self.headers }
}
