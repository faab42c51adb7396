//! Key codec error types

use thiserror::Error;

/// Errors produced when decoding a counter key
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum KeyError {
    /// Fewer than the minimum four segments
    #[error("invalid format")]
    InvalidFormat,

    /// Leading segment is not a recognized interval tag
    #[error("invalid interval {0:?}")]
    InvalidInterval(String),

    /// Date segment does not match the interval's date format
    #[error("invalid date {0:?}")]
    InvalidDate(String),

    /// Trailing segments do not pair up into key/value attributes
    #[error("key/value attributes not even")]
    UnevenAttributes,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        assert_eq!(KeyError::InvalidFormat.to_string(), "invalid format");
        assert_eq!(
            KeyError::InvalidInterval("foo".to_string()).to_string(),
            "invalid interval \"foo\""
        );
        assert_eq!(
            KeyError::InvalidDate("2017".to_string()).to_string(),
            "invalid date \"2017\""
        );
        assert_eq!(
            KeyError::UnevenAttributes.to_string(),
            "key/value attributes not even"
        );
    }
}
