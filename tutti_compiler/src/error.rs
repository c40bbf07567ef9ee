use thiserror::Error;
use tutti_schema::Instance;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompileErrorKind {
    Parse,
    IO,
    Resolution,
    Unsupported,
}

impl CompileErrorKind {
    pub(crate) fn from_code(code: &'static str) -> Self {
        match code {
            // Parse
            "E1001" | "E1002" | "E1003" | "E1004" | "E1005" => Self::Parse,

            // IO
            "E2001" => Self::IO,

            // Resolution (internal invariant, never recoverable)
            "E3001" | "E3002" | "E3003" => Self::Resolution,

            // Unsupported
            "E4001" | "E4002" => Self::Unsupported,

            _ => Self::Parse,
        }
    }
}

#[derive(Debug, Error, Clone)]
#[error("{code}: {message} (line {line})")]
pub struct CompileError {
    pub code: &'static str,
    pub kind: CompileErrorKind,
    pub message: String,
    pub line: usize,

    pub file: Option<String>,
    pub column: Option<usize>,
    pub instance: Option<Instance>,
    pub context: Option<String>,
}

impl CompileError {
    pub(crate) fn new(code: &'static str, message: impl Into<String>, line: usize) -> Self {
        Self {
            code,
            kind: CompileErrorKind::from_code(code),
            message: message.into(),
            line,

            file: None,
            column: None,
            instance: None,
            context: None,
        }
    }

    pub fn with_file(mut self, file: impl Into<String>) -> Self {
        self.file = Some(file.into());
        self
    }

    pub fn with_column(mut self, column: usize) -> Self {
        self.column = Some(column);
        self
    }

    pub fn with_instance(mut self, instance: Instance) -> Self {
        self.instance = Some(instance);
        self
    }

    pub fn with_context(mut self, context: impl Into<String>) -> Self {
        self.context = Some(context.into());
        self
    }
}
