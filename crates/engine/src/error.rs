use std::fmt;

#[derive(Debug)]
pub enum MergeError {
    /// TOML parse / deserialization error.
    ConfigParse(String),
    /// Config validation error (no judges, empty file path, etc.).
    ConfigValidation(String),
    /// Required column (or any of its aliases) absent from a CSV header.
    MissingColumn { role: String, column: String },
    /// CSV record-level read error.
    Csv { role: String, message: String },
    /// IO error (surfaced by callers that read files).
    Io(String),
}

impl fmt::Display for MergeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ConfigParse(msg) => write!(f, "config parse error: {msg}"),
            Self::ConfigValidation(msg) => write!(f, "config validation error: {msg}"),
            Self::MissingColumn { role, column } => {
                write!(f, "{role}: missing column '{column}'")
            }
            Self::Csv { role, message } => write!(f, "{role}: CSV error: {message}"),
            Self::Io(msg) => write!(f, "IO error: {msg}"),
        }
    }
}

impl std::error::Error for MergeError {}
