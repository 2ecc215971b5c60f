//! A line-buffered transport exposing read buffer, write buffer,
//! watermarks, and enable/disable per direction. TCP/DNS socket machinery
//! itself lives entirely on the embedder's side of this trait; the engine
//! never touches the wire.

use netbuf::Buf;

/// The transport handle a `Connection` owns.
///
/// An embedder implements this over a real socket (bytes read from the
/// wire are appended to `input()`, bytes in `output()` are the embedder's
/// job to flush to the wire); the engine never touches the wire itself.
pub trait Transport {
    /// Bytes already read from the peer and not yet consumed by the
    /// connection's parser.
    fn input(&mut self) -> &mut Buf;

    /// Bytes queued to be written to the peer; the engine only appends, the
    /// embedder drains it opportunistically and reports drainage via
    /// `writable`/`on_flush`.
    fn output(&mut self) -> &mut Buf;

    /// Stop delivering `readable` edges until `enable_read` is called again.
    fn disable_read(&mut self);
    fn enable_read(&mut self);

    /// Stop delivering `writable` edges until `enable_write` is called
    /// again (used when the connection has entered `Mangled` and no more
    /// writes will ever be produced).
    fn disable_write(&mut self);
    fn enable_write(&mut self);

    /// Sets the write low-watermark: once `output()`'s length drops to or
    /// below this value, the embedder's transport should consider write
    /// pressure relieved. The engine uses this purely as a signal to the
    /// embedder's own I/O loop; it does not read the watermark back.
    fn set_write_watermark(&mut self, low: usize);
}
