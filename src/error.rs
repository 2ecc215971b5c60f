//! The error taxonomy a `Connection` can surface to its handler.
//!
//! One enum covers both roles, since a single `Connection` type serves
//! both; built with `quick_error!` rather than hand-rolled `Display`/`Error`
//! impls.

quick_error! {
    /// Delivered via `Handler::on_error`. Terminal for the connection:
    /// after one of these fires, no further callback is issued and the
    /// connection's phase is `Mangled`.
    #[derive(Debug)]
    pub enum Error {
        /// Outbound transport never established.
        ConnectFailed {
            description("outbound connection failed")
        }
        /// EOF or timeout while awaiting a new message on a kept-alive
        /// connection.
        IdleConnTimedOut {
            description("idle connection timed out waiting for reuse")
        }
        /// EOF mid-start-line or mid-headers.
        IncompleteHeaders {
            description("connection closed before headers completed")
        }
        /// Start line malformed, unknown method, unknown version, bad URL,
        /// or the header parser rejected the block.
        HeaderParseFailed {
            description("could not parse start line or headers")
        }
        /// An inbound request declared a body but gave neither
        /// Content-Length nor chunked framing.
        ClientPostWithoutLength {
            description("request body present with no Content-Length or \
                         chunked Transfer-Encoding")
        }
        /// Unreadable hex chunk length.
        ChunkParseFailed {
            description("could not parse chunk-size line")
        }
        /// EOF before a fixed-length or chunked body completed, and the
        /// message was not EOF-delimited.
        IncompleteBody {
            description("connection closed before the message body completed")
        }
        /// Any write-side transport failure.
        WriteFailed {
            description("write to transport failed")
        }
    }
}

/// Maps an error kind to the status code/reason used by `send_error`.
impl Error {
    pub fn status(&self) -> (u16, &'static str) {
        match *self {
            Error::ConnectFailed => (502, "Bad Gateway"),
            Error::IdleConnTimedOut => (408, "Request Timeout"),
            Error::IncompleteHeaders => (400, "Bad Request"),
            Error::HeaderParseFailed => (400, "Bad Request"),
            Error::ClientPostWithoutLength => (411, "Length Required"),
            Error::ChunkParseFailed => (400, "Bad Request"),
            Error::IncompleteBody => (400, "Bad Request"),
            Error::WriteFailed => (500, "Internal Server Error"),
        }
    }
}

#[cfg(test)]
mod test {
    use super::Error;

    #[test]
    fn status_mapping_is_exhaustive_for_sample_kinds() {
        assert_eq!(Error::ClientPostWithoutLength.status().0, 411);
        assert_eq!(Error::IdleConnTimedOut.status().0, 408);
        assert_eq!(Error::WriteFailed.status().0, 500);
    }
}
