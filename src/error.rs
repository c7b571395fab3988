/// Broad failure category, used to pick the process exit code and to let
/// callers distinguish structural failures from I/O problems.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// A source name with no matching adapter.
    UnknownSourceFormat,
    /// A requested field is absent from a table (or has the wrong type).
    SchemaMismatch,
    /// Invalid configuration or arguments.
    InvalidInput,
    /// A record or timestamp could not be parsed.
    Parse,
    /// Filesystem failures.
    Io,
}

impl ErrorKind {
    fn exit_code(self) -> u8 {
        match self {
            ErrorKind::UnknownSourceFormat | ErrorKind::SchemaMismatch | ErrorKind::InvalidInput => 2,
            ErrorKind::Parse => 3,
            ErrorKind::Io => 4,
        }
    }
}

#[derive(Clone)]
pub struct AppError {
    kind: ErrorKind,
    message: String,
}

impl AppError {
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    pub fn unknown_source(name: &str) -> Self {
        Self::new(
            ErrorKind::UnknownSourceFormat,
            format!("Unknown file source format: '{name}' (expected one of rp5, fluxnet, mos, ampac)"),
        )
    }

    pub fn missing_field(field: &str, table: &str) -> Self {
        Self::new(
            ErrorKind::SchemaMismatch,
            format!("Field `{field}` not found in {table} table"),
        )
    }

    pub fn schema(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::SchemaMismatch, message)
    }

    pub fn invalid(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::InvalidInput, message)
    }

    pub fn parse(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Parse, message)
    }

    pub fn io(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Io, message)
    }

    pub fn kind(&self) -> ErrorKind {
        self.kind
    }

    pub fn exit_code(&self) -> u8 {
        self.kind.exit_code()
    }
}

impl std::fmt::Display for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::fmt::Debug for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppError")
            .field("kind", &self.kind)
            .field("message", &self.message)
            .finish()
    }
}

impl std::error::Error for AppError {}
