use thiserror::Error;

/// Everything that can go wrong while reading a single line.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProtocolError {
    #[error("empty frame")]
    Empty,

    #[error("{verb}: missing argument")]
    MissingArgument { verb: &'static str },

    #[error("{verb}: `{value}` is not a valid number")]
    InvalidNumber { verb: &'static str, value: String },

    #[error("{verb}: `{value}` is not a valid id")]
    InvalidId { verb: &'static str, value: String },

    #[error("reserved word {word} cannot start a payload")]
    ReservedWord { word: String },

    #[error("unrecognized frame `{0}`")]
    Unrecognized(String),

    #[error("frame starting with `{word}` is not valid UTF-8")]
    InvalidEncoding { word: String },

    #[error("malformed snapshot: {0}")]
    MalformedSnapshot(String),
}

impl ProtocolError {
    /// Built from the lossy decoding of a line that was not UTF-8.
    pub fn invalid_encoding(lossy: &str) -> Self {
        let (word, _) = crate::protocol::token::split_head(lossy);
        ProtocolError::InvalidEncoding {
            word: word.to_string(),
        }
    }

    /// The word reported back in `INVALID_CMD`.
    pub fn word(&self) -> &str {
        match self {
            ProtocolError::Empty => "",
            ProtocolError::MissingArgument { verb }
            | ProtocolError::InvalidNumber { verb, .. }
            | ProtocolError::InvalidId { verb, .. } => verb,
            ProtocolError::ReservedWord { word } => word,
            ProtocolError::Unrecognized(word) => word,
            ProtocolError::InvalidEncoding { word } => word,
            ProtocolError::MalformedSnapshot(_) => crate::protocol::verb::ID,
        }
    }
}
