use std::fmt;

/// What went wrong, coarse enough for callers to branch on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// A basket line or record could not be turned into a non-empty set of authors.
    /// Loaders skip the basket and keep going.
    MalformedBasket,
    /// Reading or writing a basket source or sink failed.
    Io,
    /// The bibliographic XML stream is not well formed.
    Xml,
    /// A mining parameter is out of range.
    InvalidConfig,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ErrorKind::MalformedBasket => "malformed basket",
            ErrorKind::Io => "io error",
            ErrorKind::Xml => "xml error",
            ErrorKind::InvalidConfig => "invalid config",
        };
        f.write_str(name)
    }
}

#[derive(Debug)]
pub struct Error {
    kind: ErrorKind,
    message: String,
}

impl Error {
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    pub fn malformed_basket(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::MalformedBasket, message)
    }

    pub fn invalid_config(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::InvalidConfig, message)
    }

    pub fn kind(&self) -> ErrorKind {
        self.kind
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.kind, self.message)
    }
}

impl std::error::Error for Error {}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Self::new(ErrorKind::Io, err.to_string())
    }
}

impl From<quick_xml::Error> for Error {
    fn from(err: quick_xml::Error) -> Self {
        match err {
            quick_xml::Error::Io(io) => Self::new(ErrorKind::Io, io.to_string()),
            other => Self::new(ErrorKind::Xml, other.to_string()),
        }
    }
}
