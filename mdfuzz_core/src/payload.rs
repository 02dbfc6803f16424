use std::fmt;

/// The type of value a registry entry expects to be decoded from the input.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PayloadKind {
    Text,
    Integer,
    Float,
    Bytes,
}

impl PayloadKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            PayloadKind::Text => "text",
            PayloadKind::Integer => "integer",
            PayloadKind::Float => "float",
            PayloadKind::Bytes => "bytes",
        }
    }
}

impl fmt::Display for PayloadKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

/// A strongly-typed value decoded from a fuzz input, handed to the renderer
/// as its only argument.
#[derive(Debug, Clone, PartialEq)]
pub enum Payload {
    Text(String),
    Integer(i64),
    Float(f64),
    Bytes(Vec<u8>),
}

impl Payload {
    pub fn kind(&self) -> PayloadKind {
        match self {
            Payload::Text(_) => PayloadKind::Text,
            Payload::Integer(_) => PayloadKind::Integer,
            Payload::Float(_) => PayloadKind::Float,
            Payload::Bytes(_) => PayloadKind::Bytes,
        }
    }
}
