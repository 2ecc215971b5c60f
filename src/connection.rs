//! The connection state machine: a role-parameterized, transport-edge-driven
//! parser for a single HTTP/1.x connection, with write-side backpressure
//! bookkeeping (`Io::write_buf`) folded directly into the same type rather
//! than delegated to a separate reactor.

use std::mem::replace;
use std::sync::Arc;

use error::Error;
use framing::{self, Framing, TransferCoding};
use chunked::{ChunkedState, ChunkedStep};
use config::Config;
use headers::{self, HeaderList, HeaderParseResult};
use message::{Request, Response};
use method::Method;
use role::Role;
use serializer;
use tokenize::split_n;
use transport::Transport;
use target::RequestTarget;
use version::Version;

const MAX_FIRSTLINE_SIZE: usize = 8 * 1024;
const MAX_HEADERS_SIZE: usize = 64 * 1024;

/// Where a `Connection` is within one request/response cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// Awaiting the outbound socket connect to complete (client-role only).
    Connecting,
    /// Between messages; a readable edge here starts parsing the next one.
    Idle,
    /// Accumulating the start line.
    ReadFirstline,
    /// Accumulating the header block.
    ReadHeaders,
    /// Streaming the body, by whichever discipline `framing` selected.
    ReadBody,
    /// A fatal error occurred; no further parsing happens and the
    /// connection is headed for close.
    Mangled,
}

/// What one parsing step made of the data currently buffered.
enum Progress {
    /// Keep looping; there may be more to do without new input.
    Continue,
    /// Nothing more can happen until more bytes arrive (or the connection
    /// has reached a terminal phase).
    NeedMoreData,
}

/// The parsed start line, staged until its header block also completes.
enum Pending {
    None,
    Request { method: Method, version: Version, url: RequestTarget },
    Response { version: Version, status: u16, reason: String },
}

/// The callback vtable an embedder implements to drive one `Connection`.
///
/// Every method is handed `&mut Io<T>`, the subset of connection state that
/// is safe to mutate reentrantly from inside a callback (the transport, the
/// write-backpressure and persistence flags) — never the `Connection`
/// itself, which is mid-dispatch while a callback runs.
///
/// Default bodies are no-ops; an embedder only overrides the methods that
/// matter for the role(s) it drives (a server-role embedder never sees
/// `on_server_response`, and vice versa).
#[allow(unused_variables)]
pub trait Handler<T: Transport> {
    /// The outbound socket connect completed (client-role only).
    fn on_connect(&mut self, io: &mut Io<T>) {}

    /// A fatal error occurred; the connection is `Mangled` by the time this
    /// fires. Always implemented — there is no sensible default.
    fn on_error(&mut self, io: &mut Io<T>, err: Error);

    /// A request's start line and headers have been parsed (server-role).
    fn on_client_request(&mut self, io: &mut Io<T>, request: Request) {}

    /// A response's start line and headers have been parsed (client-role).
    fn on_server_response(&mut self, io: &mut Io<T>, response: Response) {}

    /// `buf` holds the next slice of body bytes; valid only for this call.
    fn on_read_body(&mut self, io: &mut Io<T>, buf: &[u8]) {}

    /// The in-progress message (headers-only or headers-plus-body) is
    /// fully read.
    fn on_message_complete(&mut self, io: &mut Io<T>) {}

    /// The outbound buffer drained back under the low watermark after
    /// having been choked; safe to resume calling `write_buf`.
    fn on_write_more(&mut self, io: &mut Io<T>) {}

    /// The outbound buffer emptied out entirely.
    fn on_flush(&mut self, io: &mut Io<T>) {}
}

/// The handler-facing half of a `Connection`'s state: the transport plus
/// the write-backpressure and persistence bookkeeping. Exists as a
/// separate type so a `Handler` callback can mutate it while the
/// `Connection` that dispatched the callback is still on the stack above
/// (disjoint field borrows; see `Connection`'s private `fire_*` helpers).
pub struct Io<T: Transport> {
    transport: T,
    role: Role,
    config: Arc<Config>,
    choked: bool,
    read_paused: bool,
    persistent: bool,
    outbound_has_body: bool,
    last_error_version: Version,
}

impl<T: Transport> Io<T> {
    /// Serializes `req` onto the outbound buffer (client-role).
    pub fn write_request(&mut self, req: &Request) {
        serializer::write_request(self.transport.output(), req);
    }

    /// Serializes `resp` onto the outbound buffer (server-role).
    pub fn write_response(&mut self, resp: &Response) {
        serializer::write_response(self.transport.output(), resp);
    }

    /// Appends `data` (body bytes) to the outbound buffer. Returns `false`
    /// once the buffer has crossed `max_write_backlog` — the embedder
    /// should stop calling this until `on_write_more` fires.
    pub fn write_buf(&mut self, data: &[u8]) -> bool {
        use std::io::Write;
        let _ = self.transport.output().write_all(data);
        if self.transport.output().len() > self.config.max_write_backlog {
            self.choked = true;
            self.transport.set_write_watermark(self.config.max_write_backlog / 2);
        }
        !self.choked
    }

    /// Whether the message currently being composed is expected to carry a
    /// body (defaults to `true`; see `set_current_message_bodyless`).
    pub fn current_message_has_body(&self) -> bool {
        self.outbound_has_body
    }

    /// Forces `current_message_has_body` false for the response being
    /// composed (server-role only) — e.g. a `HEAD` reply, where the status
    /// line and headers describe a body that must not actually be written.
    pub fn set_current_message_bodyless(&mut self) {
        self.outbound_has_body = false;
    }

    /// Whether this connection will be reused for another message once the
    /// current one completes.
    pub fn is_persistent(&self) -> bool {
        self.persistent
    }

    /// Stops delivering parsed bytes to the handler until `start_reading`.
    /// Safe to call from inside a callback: the driving loop re-checks
    /// this flag on every iteration, including the one currently
    /// suspended while this callback runs.
    pub fn stop_reading(&mut self) {
        if !self.read_paused {
            self.read_paused = true;
            self.transport.disable_read();
        }
    }

    /// Resumes delivering parsed bytes. If bytes are already buffered and
    /// this is called from within a callback, the enclosing drive loop
    /// picks them up as soon as the callback returns — no recursive
    /// redrive needed. If called outside of any callback, use
    /// `Connection::start_reading` instead, which also redrives directly.
    pub fn start_reading(&mut self) {
        if self.read_paused {
            self.read_paused = false;
            self.transport.enable_read();
        }
    }

    /// Writes a minimal `code reason` error page and marks the connection
    /// non-persistent if `close_after` is set. A no-op for a client-role
    /// connection (there's no downstream client to answer).
    pub fn send_error(&mut self, code: u16, reason: &str, close_after: bool) {
        if close_after {
            self.persistent = false;
        }
        let version = self.last_error_version;
        serializer::write_error_response(
            self.transport.output(), version, code, reason, self.persistent);
    }
}

/// A single-connection HTTP/1.x protocol engine.
///
/// Parameterized over the transport `T` it reads/writes and the `Handler`
/// `H` it reports to. One value drives exactly one socket, for exactly as
/// long as that socket is kept alive and reused across pipelined messages.
pub struct Connection<T: Transport, H: Handler<T>> {
    phase: Phase,
    driving: bool,
    io: Io<T>,
    handler: H,

    headers: HeaderList,
    pending: Pending,
    scratch: Vec<u8>,

    version: Option<Version>,
    transfer_coding: TransferCoding,
    has_body: bool,
    remaining: Option<u64>,
    chunk_state: Option<ChunkedState>,
}

impl<T: Transport, H: Handler<T>> Connection<T, H> {
    /// Builds a new connection in the given `role`. A client-role
    /// connection starts `Connecting` (awaiting `on_connect`); a
    /// server-role connection starts `Idle` (the socket is already
    /// established by the time an embedder accepts it).
    pub fn new(role: Role, config: Arc<Config>, transport: T, handler: H) -> Connection<T, H> {
        let phase = match role {
            Role::Client => Phase::Connecting,
            Role::Server => Phase::Idle,
        };
        Connection {
            phase,
            driving: false,
            io: Io {
                transport,
                role,
                config,
                choked: false,
                read_paused: false,
                persistent: true,
                outbound_has_body: true,
                last_error_version: Version::Http11,
            },
            handler,
            headers: HeaderList::new(),
            pending: Pending::None,
            scratch: Vec::new(),
            version: None,
            transfer_coding: TransferCoding::Identity,
            has_body: false,
            remaining: None,
            chunk_state: None,
        }
    }

    pub fn phase(&self) -> Phase { self.phase }

    pub fn is_persistent(&self) -> bool { self.io.persistent }

    pub fn current_message_has_body(&self) -> bool { self.io.current_message_has_body() }

    pub fn set_current_message_bodyless(&mut self) { self.io.set_current_message_bodyless() }

    pub fn write_request(&mut self, req: &Request) { self.io.write_request(req) }

    pub fn write_response(&mut self, resp: &Response) { self.io.write_response(resp) }

    pub fn write_buf(&mut self, data: &[u8]) -> bool { self.io.write_buf(data) }

    pub fn send_error(&mut self, code: u16, reason: &str, close_after: bool) {
        self.io.send_error(code, reason, close_after)
    }

    pub fn stop_reading(&mut self) { self.io.stop_reading() }

    /// Resumes reading, redriving the parser immediately if bytes are
    /// already buffered. Unlike `Io::start_reading`, safe to call only
    /// from outside an active callback (e.g. from the embedder's own event
    /// loop, independent of any `Connection` edge) — calling it from
    /// inside a callback still works, since the reentrancy guard makes the
    /// inner `drive()` a no-op and the outer one (already running) picks
    /// up the cleared flag on its own next iteration.
    pub fn start_reading(&mut self) {
        self.io.start_reading();
        self.drive();
    }

    /// The outbound socket connect completed (client-role only).
    pub fn connected(&mut self) {
        if self.phase == Phase::Connecting {
            self.phase = Phase::Idle;
            self.fire(|h, io| h.on_connect(io));
            self.drive();
        }
    }

    /// The transport reports readable bytes; consumes as many complete
    /// messages as are currently buffered.
    pub fn readable(&mut self) {
        self.drive();
    }

    /// The transport reports room to write more, or that its buffer
    /// drained. Unchokes and/or flushes as appropriate.
    pub fn writable(&mut self) {
        let len = self.io.transport.output().len();
        if self.io.choked && len <= self.io.config.max_write_backlog / 2 {
            self.io.choked = false;
            self.fire(|h, io| h.on_write_more(io));
        }
        if len == 0 {
            self.fire(|h, io| h.on_flush(io));
        }
    }

    /// The outbound connect attempt failed (client-role only, while
    /// `Connecting`).
    pub fn connect_failed(&mut self) {
        self.fail(Error::ConnectFailed);
    }

    /// Any write-side transport failure; always fatal regardless of phase.
    pub fn write_failed(&mut self) {
        self.fail(Error::WriteFailed);
    }

    /// The transport's read side hit EOF or a read error. Unlike a connect
    /// or write failure, what this means depends entirely on where the
    /// connection currently is in a message: an EOF while idle between
    /// messages is just a kept-alive peer going away, while the same EOF
    /// mid-body of an EOF-delimited message is that message's normal
    /// terminator rather than a failure. The embedder reports the bare
    /// transport condition; this picks the right outcome for it.
    pub fn read_closed(&mut self) {
        match self.phase {
            Phase::Idle => self.fail(Error::IdleConnTimedOut),
            Phase::ReadFirstline | Phase::ReadHeaders => {
                self.fail(Error::IncompleteHeaders)
            }
            Phase::ReadBody => {
                let eof_delimited = self.transfer_coding == TransferCoding::Identity
                    && self.remaining.is_none();
                if eof_delimited {
                    self.end_of_message();
                } else {
                    self.fail(Error::IncompleteBody);
                }
            }
            Phase::Connecting | Phase::Mangled => {
                debug_assert!(false, "read_closed on a connection with no message in flight");
            }
        }
    }

    // -- internal driving loop -------------------------------------------

    fn drive(&mut self) {
        if self.driving {
            return;
        }
        self.driving = true;
        loop {
            if self.io.read_paused {
                break;
            }
            let progress = match self.phase {
                Phase::Connecting | Phase::Mangled => break,
                Phase::Idle => {
                    if self.io.transport.input().len() == 0 {
                        break;
                    }
                    self.phase = Phase::ReadFirstline;
                    Progress::Continue
                }
                Phase::ReadFirstline => self.try_read_firstline(),
                Phase::ReadHeaders => self.try_read_headers(),
                Phase::ReadBody => self.try_read_body(),
            };
            if let Progress::NeedMoreData = progress {
                break;
            }
        }
        self.driving = false;
    }

    /// Runs `body(handler, io)` with disjoint mutable borrows of `self`'s
    /// fields, the way every `on_*` dispatch in this module needs to.
    fn fire<F: FnOnce(&mut H, &mut Io<T>)>(&mut self, body: F) {
        let Connection { ref mut io, ref mut handler, .. } = *self;
        body(handler, io);
    }

    fn fail(&mut self, err: Error) {
        if self.phase == Phase::Mangled {
            return;
        }
        self.phase = Phase::Mangled;
        self.io.persistent = false;
        self.io.transport.disable_read();
        self.io.transport.disable_write();
        self.fire(|h, io| h.on_error(io, err));
    }

    fn end_of_message(&mut self) -> Progress {
        self.fire(|h, io| h.on_message_complete(io));
        if self.io.persistent {
            self.phase = Phase::Idle;
            Progress::Continue
        } else {
            self.phase = Phase::Mangled;
            self.io.transport.disable_read();
            self.io.transport.disable_write();
            Progress::NeedMoreData
        }
    }

    // -- start line --------------------------------------------------------

    fn try_read_firstline(&mut self) -> Progress {
        let pos = find_crlf(self.io.transport.input());
        match pos {
            None => {
                if self.io.transport.input().len() > MAX_FIRSTLINE_SIZE {
                    self.fail(Error::HeaderParseFailed);
                }
                Progress::NeedMoreData
            }
            Some(idx) => {
                let line = {
                    let buf = self.io.transport.input();
                    let line = String::from_utf8_lossy(&buf[..idx]).into_owned();
                    buf.consume(idx + 2);
                    line
                };
                match self.io.role {
                    Role::Server => self.parse_request_line(&line),
                    Role::Client => self.parse_response_line(&line),
                }
            }
        }
    }

    fn parse_request_line(&mut self, line: &str) -> Progress {
        let tokens: Vec<&str> = line.split(' ').collect();
        if tokens.len() != 3 || tokens.iter().any(|t| t.is_empty()) {
            self.fail(Error::HeaderParseFailed);
            return Progress::NeedMoreData;
        }
        let method = match Method::parse(tokens[0]) {
            Some(m) => m,
            None => { self.fail(Error::HeaderParseFailed); return Progress::NeedMoreData; }
        };
        let version = match Version::parse(tokens[2]) {
            Some(v) => v,
            None => { self.fail(Error::HeaderParseFailed); return Progress::NeedMoreData; }
        };
        let url = match RequestTarget::parse(tokens[1], method == Method::Connect) {
            Some(u) => u,
            None => { self.fail(Error::HeaderParseFailed); return Progress::NeedMoreData; }
        };
        self.pending = Pending::Request { method, version, url };
        self.phase = Phase::ReadHeaders;
        Progress::Continue
    }

    fn parse_response_line(&mut self, line: &str) -> Progress {
        let tokens = split_n(line, ' ', 3);
        if tokens.len() != 3 {
            self.fail(Error::HeaderParseFailed);
            return Progress::NeedMoreData;
        }
        let version = match Version::parse(tokens[0]) {
            Some(v) => v,
            None => { self.fail(Error::HeaderParseFailed); return Progress::NeedMoreData; }
        };
        let status = match tokens[1].parse::<u16>() {
            Ok(s) if tokens[1].len() == 3 && s >= 100 => s,
            _ => { self.fail(Error::HeaderParseFailed); return Progress::NeedMoreData; }
        };
        self.pending = Pending::Response { version, status, reason: tokens[2].to_string() };
        self.phase = Phase::ReadHeaders;
        Progress::Continue
    }

    // -- headers -------------------------------------------------------

    fn try_read_headers(&mut self) -> Progress {
        let input_len = self.io.transport.input().len();
        let result = {
            let buf = self.io.transport.input();
            headers::parse(&mut self.headers, &buf[..])
        };
        match result {
            HeaderParseResult::Malformed => {
                self.fail(Error::HeaderParseFailed);
                Progress::NeedMoreData
            }
            HeaderParseResult::Incomplete => {
                if input_len > MAX_HEADERS_SIZE {
                    self.fail(Error::HeaderParseFailed);
                }
                Progress::NeedMoreData
            }
            HeaderParseResult::Complete(n) => {
                self.io.transport.input().consume(n);
                self.on_headers_complete()
            }
        }
    }

    fn on_headers_complete(&mut self) -> Progress {
        match replace(&mut self.pending, Pending::None) {
            Pending::Request { method, version, url } => {
                self.build_request(method, version, url)
            }
            Pending::Response { version, status, reason } => {
                self.build_response(version, status, reason)
            }
            Pending::None => unreachable!("headers completed with no pending start line"),
        }
    }

    fn build_request(&mut self, method: Method, version: Version, url: RequestTarget) -> Progress {
        let framing = match Framing::compute(&self.headers, true, Some(method), None) {
            Ok(f) => f,
            Err(_) => {
                self.fail(Error::ClientPostWithoutLength);
                return Progress::NeedMoreData;
            }
        };
        self.apply_framing(version, &framing);
        self.io.last_error_version = version;
        let headers = replace(&mut self.headers, HeaderList::new());
        let request = Request::new(method, version, url, headers);
        self.fire(|h, io| h.on_client_request(io, request));
        self.after_start_line()
    }

    fn build_response(&mut self, version: Version, status: u16, reason: String) -> Progress {
        let framing = match Framing::compute(&self.headers, false, None, Some(status)) {
            Ok(f) => f,
            Err(_) => unreachable!("response framing never returns AmbiguousRequestBody"),
        };
        self.apply_framing(version, &framing);
        let headers = replace(&mut self.headers, HeaderList::new());
        let response = Response::new(version, status, reason, headers);
        self.fire(|h, io| h.on_server_response(io, response));
        self.after_start_line()
    }

    fn apply_framing(&mut self, version: Version, framing: &Framing) {
        let persistent = framing::is_persistent(
            &self.headers, version, framing.eof_completes, self.version);
        self.version = Some(version);
        self.transfer_coding = framing.transfer_coding;
        self.has_body = framing.has_body;
        self.remaining = framing.remaining;
        self.io.persistent = persistent;
    }

    fn after_start_line(&mut self) -> Progress {
        if self.has_body {
            self.phase = Phase::ReadBody;
            if self.transfer_coding == TransferCoding::Chunked {
                self.chunk_state = Some(ChunkedState::new());
            }
            Progress::Continue
        } else {
            self.end_of_message()
        }
    }

    // -- body ------------------------------------------------------------

    fn try_read_body(&mut self) -> Progress {
        match self.transfer_coding {
            TransferCoding::Chunked => self.stream_chunked(),
            TransferCoding::Identity => match self.remaining {
                Some(remaining) => self.stream_fixed(remaining),
                None => self.stream_eof(),
            }
        }
    }

    fn stream_fixed(&mut self, remaining: u64) -> Progress {
        let available = self.io.transport.input().len() as u64;
        if available == 0 {
            return Progress::NeedMoreData;
        }
        let n = available.min(remaining) as usize;
        self.deliver_body(n);
        let left = remaining - n as u64;
        self.remaining = Some(left);
        if left == 0 {
            self.end_of_message()
        } else {
            Progress::NeedMoreData
        }
    }

    fn stream_eof(&mut self) -> Progress {
        let available = self.io.transport.input().len();
        if available == 0 {
            return Progress::NeedMoreData;
        }
        self.deliver_body(available);
        Progress::NeedMoreData
    }

    fn stream_chunked(&mut self) -> Progress {
        loop {
            let (consumed, step) = {
                let buf = self.io.transport.input();
                self.chunk_state.as_mut().unwrap().feed(&buf[..])
            };
            if consumed > 0 {
                self.io.transport.input().consume(consumed);
            }
            match step {
                ChunkedStep::ParseFailed => {
                    self.fail(Error::ChunkParseFailed);
                    return Progress::NeedMoreData;
                }
                ChunkedStep::NeedMoreData => {
                    if consumed == 0 {
                        return Progress::NeedMoreData;
                    }
                }
                ChunkedStep::TrailerIgnored => {
                    warn!("ignoring a chunked trailer header line");
                }
                ChunkedStep::MessageComplete => {
                    self.chunk_state = None;
                    return self.end_of_message();
                }
                ChunkedStep::BodyAvailable(0) => return Progress::NeedMoreData,
                ChunkedStep::BodyAvailable(n) => {
                    let n = n as usize;
                    self.deliver_body(n);
                    self.chunk_state.as_mut().unwrap().consume_body(n as u64);
                }
            }
        }
    }

    /// Copies `n` bytes from the front of the transport's input into the
    /// scratch buffer and hands them to the handler, decoupling the
    /// delivered slice from the transport's own buffer (which a later
    /// `consume` may reshuffle).
    fn deliver_body(&mut self, n: usize) {
        self.scratch.clear();
        {
            let input = self.io.transport.input();
            self.scratch.extend_from_slice(&input[..n]);
            input.consume(n);
        }
        let Connection { ref mut io, ref mut handler, ref scratch, .. } = *self;
        handler.on_read_body(io, &scratch[..]);
    }
}

fn find_crlf(buf: &[u8]) -> Option<usize> {
    buf.windows(2).position(|w| w == b"\r\n")
}
