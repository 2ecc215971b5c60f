use std::fmt::{self, Display};

/// The closed set of request methods this engine recognizes.
///
/// Any other token on a request start line is a parse failure: this is a
/// proxy's protocol engine, not a generic HTTP toolkit, and the embedder is
/// not expected to forward methods it cannot frame a body for.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum Method {
    Get,
    Head,
    Post,
    Put,
    Connect,
}

impl Method {
    /// Case-insensitive match against the known method set.
    pub fn parse(token: &str) -> Option<Method> {
        if token.eq_ignore_ascii_case("GET") {
            Some(Method::Get)
        } else if token.eq_ignore_ascii_case("HEAD") {
            Some(Method::Head)
        } else if token.eq_ignore_ascii_case("POST") {
            Some(Method::Post)
        } else if token.eq_ignore_ascii_case("PUT") {
            Some(Method::Put)
        } else if token.eq_ignore_ascii_case("CONNECT") {
            Some(Method::Connect)
        } else {
            None
        }
    }

    pub fn as_str(&self) -> &'static str {
        match *self {
            Method::Get => "GET",
            Method::Head => "HEAD",
            Method::Post => "POST",
            Method::Put => "PUT",
            Method::Connect => "CONNECT",
        }
    }
}

impl Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod test {
    use super::Method;

    #[test]
    fn parses_case_insensitively() {
        assert_eq!(Method::parse("get"), Some(Method::Get));
        assert_eq!(Method::parse("PoSt"), Some(Method::Post));
        assert_eq!(Method::parse("CONNECT"), Some(Method::Connect));
    }

    #[test]
    fn rejects_unknown_methods() {
        assert_eq!(Method::parse("DELETE"), None);
        assert_eq!(Method::parse("PATCH"), None);
        assert_eq!(Method::parse(""), None);
    }
}
