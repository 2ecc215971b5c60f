//! An ordered, case-insensitive header container, plus the header-block
//! parser (wrapping `httparse`) and dumper that fill and drain it.

use std::io::Write;

use httparse;

use MAX_HEADERS_NUM;

/// A single ordered, case-insensitive, multi-value header list.
///
/// Attached to a `Request` or `Response` once their headers are complete;
/// ownership transfers with the message.
#[derive(Debug, Clone, Default)]
pub struct HeaderList {
    items: Vec<(String, Vec<u8>)>,
}

impl HeaderList {
    pub fn new() -> HeaderList {
        HeaderList { items: Vec::new() }
    }

    pub fn push(&mut self, name: &str, value: &[u8]) {
        self.items.push((name.to_string(), value.to_vec()));
    }

    /// Returns the first value for `name`, matched case-insensitively.
    pub fn get(&self, name: &str) -> Option<&[u8]> {
        self.items.iter()
            .find(|&&(ref n, _)| n.eq_ignore_ascii_case(name))
            .map(|&(_, ref v)| &v[..])
    }

    /// Returns the first value for `name` decoded as UTF-8, if present and
    /// valid.
    pub fn get_str(&self, name: &str) -> Option<&str> {
        self.get(name).and_then(|v| ::std::str::from_utf8(v).ok())
    }

    /// Returns every value associated with `name`, in message order.
    pub fn get_all<'a>(&'a self, name: &'a str)
        -> impl Iterator<Item=&'a [u8]> + 'a
    {
        self.items.iter()
            .filter(move |&&(ref n, _)| n.eq_ignore_ascii_case(name))
            .map(|&(_, ref v)| &v[..])
    }

    pub fn iter(&self) -> impl Iterator<Item=(&str, &[u8])> {
        self.items.iter().map(|&(ref n, ref v)| (n.as_str(), &v[..]))
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn clear(&mut self) {
        self.items.clear();
    }

    /// Writes the whole header block (without the trailing blank line) to
    /// `out`, one `Name: value\r\n` per entry, in message order.
    pub fn write_to<W: Write>(&self, out: &mut W) -> ::std::io::Result<()> {
        for &(ref name, ref value) in &self.items {
            out.write_all(name.as_bytes())?;
            out.write_all(b": ")?;
            out.write_all(value)?;
            out.write_all(b"\r\n")?;
        }
        Ok(())
    }
}

/// Outcome of feeding more bytes to the header parser.
pub enum HeaderParseResult {
    /// The header block is malformed; the connection must error out.
    Malformed,
    /// Not enough bytes buffered yet; call again once more data arrives.
    Incomplete,
    /// The header block (and the blank line terminating it) is complete;
    /// carries how many bytes of `input` the headers block plus its
    /// terminating CRLFCRLF occupied.
    Complete(usize),
}

/// Parses as many complete headers as are available in `input` into
/// `headers`.
///
/// `input` must start at the first header line (the start line has already
/// been consumed by the caller).
pub fn parse(headers: &mut HeaderList, input: &[u8]) -> HeaderParseResult {
    let mut raw = [httparse::EMPTY_HEADER; MAX_HEADERS_NUM];
    match httparse::parse_headers(input, &mut raw) {
        Ok(httparse::Status::Complete((consumed, parsed))) => {
            headers.clear();
            for header in parsed {
                headers.push(header.name, header.value);
            }
            HeaderParseResult::Complete(consumed)
        }
        Ok(httparse::Status::Partial) => HeaderParseResult::Incomplete,
        Err(_) => HeaderParseResult::Malformed,
    }
}
