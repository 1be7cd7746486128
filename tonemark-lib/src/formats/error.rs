use std::fmt::{Display, Formatter};

/// Error type for annotation file IO.
#[derive(Debug)]
pub enum FormatError {
    Io(std::io::Error),
    Parse(String),
    MissingTier(String),
}

impl Display for FormatError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io(err) => write!(f, "io error: {}", err),
            Self::Parse(err) => write!(f, "parse error: {}", err),
            Self::MissingTier(tier) => write!(f, "no point tier named \"{}\"", tier),
        }
    }
}

impl std::error::Error for FormatError {}

impl From<std::io::Error> for FormatError {
    fn from(value: std::io::Error) -> Self {
        Self::Io(value)
    }
}
