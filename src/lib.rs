//! A single-connection HTTP/1.x protocol engine: a sans-IO state machine
//! that parses request or response messages incrementally off a
//! caller-supplied transport and streams bodies out via callbacks, without
//! buffering them whole. See [`connection::Connection`].

extern crate httparse;
extern crate netbuf;
extern crate url;
#[macro_use] extern crate quick_error;
#[macro_use] extern crate matches;
#[macro_use] extern crate log;

/// Maximum number of headers `httparse` will parse out of one message's
/// header block.
pub const MAX_HEADERS_NUM: usize = 256;

pub mod role;
pub mod version;
pub mod method;
pub mod target;
pub mod headers;
pub mod message;
pub mod chunked;
pub mod framing;
pub mod serializer;
pub mod error;
pub mod config;
pub mod transport;
pub mod connection;
mod tokenize;

pub use connection::{Connection, Handler, Io, Phase};
pub use config::Config;
pub use error::Error;
pub use message::{Request, Response};
pub use method::Method;
pub use role::Role;
pub use target::RequestTarget;
pub use transport::Transport;
pub use version::Version;
