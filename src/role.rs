//! The direction a `Connection` faces.

/// Which side of the HTTP/1.x exchange a `Connection` parses/emits.
///
/// A forward proxy runs one `Connection` per socket in each role: a
/// `Server`-role connection faces the downstream client (reads requests,
/// writes responses); a `Client`-role connection faces the upstream server
/// (writes requests, reads responses). Both share one `Connection` type —
/// only this field distinguishes them at runtime.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    /// Acts as the client-facing endpoint: the peer is an HTTP client, and
    /// this connection receives requests and emits responses.
    Server,
    /// Acts as the server-facing endpoint: the peer is an HTTP server, and
    /// this connection emits requests and receives responses.
    Client,
}
