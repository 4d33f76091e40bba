use thiserror::Error;

/// Errors that can occur while decoding bytes off the wire
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SerdeErr {
    /// The reader ran out of bytes before the value was complete
    #[error("Unexpected end of buffer: needed {needed} more byte(s), {remaining} remaining")]
    UnexpectedEnd { needed: usize, remaining: usize },

    /// A boolean was encoded with a byte other than 0 or 1
    #[error("Invalid boolean byte {byte}, expected 0 or 1")]
    InvalidBool { byte: u8 },

    /// A string payload was not valid UTF-8
    #[error("String payload is not valid UTF-8")]
    InvalidUtf8,

    /// A variable-length integer did not fit in the target width
    #[error("Variable-length integer overflowed {bits} bits")]
    LengthOverflow { bits: u8 },

    /// An enum discriminant was not recognized
    #[error("Invalid {type_name} discriminant {value}")]
    InvalidDiscriminant { type_name: &'static str, value: u8 },
}
