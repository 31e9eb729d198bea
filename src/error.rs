use thiserror::Error as ThisError;

#[derive(ThisError, Debug, PartialEq, Eq)]
pub enum Error {
  #[error("should receive more data to restore the entire message")]
  Truncated,

  #[error("invalid UTF-8 sequence in string: {message}")]
  InvalidUtf8 { message: String },
  #[error("illegal length or element count: {length}")]
  IllegalLength { length: i64 },
  #[error("null appeared in a non-nullable string")]
  UnexpectedNull,
  #[error("illegal API key: {value}")]
  IllegalApiKey { value: i16 },
  #[error("too large payload: {length:?}, max={maximum:?}")]
  PayloadTooLarge { length: usize, maximum: usize },

  #[error("encoded size differs from the declared length: declared={declared}, actual={actual}")]
  SizeMismatch { declared: usize, actual: usize },
  #[error("{remaining} bytes left unread after the message body")]
  TrailingBytes { remaining: usize },

  #[error("underlying I/O layer error: {message}")]
  Io { kind: std::io::ErrorKind, message: String },
}

impl From<std::io::Error> for Error {
  fn from(err: std::io::Error) -> Error {
    if err.kind() == std::io::ErrorKind::UnexpectedEof {
      Error::Truncated
    } else {
      Error::Io { kind: err.kind(), message: err.to_string() }
    }
  }
}

impl From<std::string::FromUtf8Error> for Error {
  fn from(err: std::string::FromUtf8Error) -> Error {
    Error::InvalidUtf8 { message: err.utf8_error().to_string() }
  }
}
