/// A token that is not of the form `key="value"`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodeError(pub String);

impl std::fmt::Display for DecodeError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "malformed attribute token: {}", self.0)
    }
}

impl std::error::Error for DecodeError {}

/// One protocol message: a lower-cased type tag plus ordered attributes.
///
/// The empty message (blank tag) is the no-op that malformed input decodes to.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Message {
    kind: String,
    attrs: Vec<(String, String)>,
}

impl Message {
    pub fn new(kind: &str) -> Self {
        Self {
            kind: kind.to_lowercase(),
            attrs: Vec::new(),
        }
    }
    /// Builder-style attribute setter. Re-setting a key replaces its value in place.
    pub fn with<V>(mut self, key: &str, value: V) -> Self
    where
        V: ToString,
    {
        self.set(key, value);
        self
    }
    pub fn set<V>(&mut self, key: &str, value: V)
    where
        V: ToString,
    {
        let value = value.to_string();
        match self.attrs.iter_mut().find(|(k, _)| k == key) {
            Some((_, v)) => *v = value,
            None => self.attrs.push((key.to_string(), value)),
        }
    }
    pub fn kind(&self) -> &str {
        &self.kind
    }
    pub fn get(&self, key: &str) -> Option<&str> {
        self.attrs
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }
    pub fn attrs(&self) -> &[(String, String)] {
        &self.attrs
    }
    pub fn is_empty(&self) -> bool {
        self.kind.is_empty()
    }
}

impl Message {
    /// Strict parse. Any malformed attribute token fails the whole message.
    pub fn parse(frame: &str) -> Result<Self, DecodeError> {
        let body = frame.trim();
        let body = body.strip_prefix('<').unwrap_or(body);
        let body = body.strip_suffix('>').unwrap_or(body);
        let body = body.strip_suffix('/').unwrap_or(body);
        let mut tokens = body.split(' ');
        let mut message = Self::new(tokens.next().unwrap_or_default());
        for token in tokens.filter(|t| !t.is_empty()) {
            match token.split('=').collect::<Vec<_>>().as_slice() {
                [key, value] if !key.is_empty() => {
                    let value = value.strip_prefix('"').unwrap_or(value);
                    let value = value.strip_suffix('"').unwrap_or(value);
                    let value = unescape(value).ok_or_else(|| DecodeError(token.to_string()))?;
                    message.set(key, value);
                }
                _ => return Err(DecodeError(token.to_string())),
            }
        }
        Ok(message)
    }
    /// Lenient decode used at the wire boundary: malformed input becomes a no-op.
    pub fn decode(frame: &str) -> Self {
        Self::parse(frame)
            .inspect_err(|e| log::debug!("[codec] dropping frame {:?}: {}", frame, e))
            .unwrap_or_default()
    }
    /// Renders `<TYPE k="v" .../>` with the tag upper-cased.
    pub fn encode(&self) -> String {
        let attrs = self
            .attrs
            .iter()
            .map(|(k, v)| format!(" {}=\"{}\"", k, escape(v)))
            .collect::<String>();
        format!("<{}{}/>", self.kind.to_uppercase(), attrs)
    }
}

/// Percent-escapes every byte that could split a token or end the tag.
fn escape(value: &str) -> String {
    value
        .bytes()
        .map(|b| match b {
            b'a'..=b'z' | b'A'..=b'Z' | b'0'..=b'9' => (b as char).to_string(),
            b',' | b'.' | b'-' | b'_' | b'~' | b':' | b';' => (b as char).to_string(),
            _ => format!("%{:02X}", b),
        })
        .collect()
}

/// Inverse of [`escape`]. `None` on a truncated escape or non-UTF-8 result.
fn unescape(value: &str) -> Option<String> {
    let mut bytes = Vec::with_capacity(value.len());
    let mut rest = value.as_bytes();
    while let Some((&b, tail)) = rest.split_first() {
        match b {
            b'%' => {
                let hex = tail.get(..2).filter(|h| h.iter().all(u8::is_ascii_hexdigit))?;
                bytes.push(u8::from_str_radix(std::str::from_utf8(hex).ok()?, 16).ok()?);
                rest = &tail[2..];
            }
            _ => {
                bytes.push(b);
                rest = tail;
            }
        }
    }
    String::from_utf8(bytes).ok()
}

impl std::fmt::Display for Message {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "{}", self.encode())
    }
}
