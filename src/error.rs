//! Error types for the ledsign library.

use thiserror::Error;

/// The main error type for ledsign operations.
#[derive(Debug, Error)]
pub enum Error {
    /// Serial port error.
    #[error("serial port error: {0}")]
    Serial(#[from] tokio_serial::Error),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Connection is not established, or was closed.
    #[error("not connected")]
    NotConnected,

    /// The sign answered with something other than the expected reply.
    #[error("sign replied {received:?}, expected {expected:?}")]
    Nack { expected: String, received: String },

    /// The sign did not reply at all within the settle period.
    #[error("no response from sign")]
    NoResponse,

    /// A sign address outside the range the protocol can express.
    #[error("invalid sign address: {0}")]
    InvalidAddress(u8),

    /// An identifier outside its alphabet.
    #[error("invalid {kind} identifier: {value:?}")]
    InvalidIdentifier { kind: &'static str, value: char },

    /// A message character that has no single-byte wire encoding.
    #[error("character {0:?} cannot be sent to the sign")]
    UnencodableChar(char),

    /// Schedule date parse error.
    #[error("date error: {0}")]
    Date(#[from] DateError),

    /// Graphic encoding error.
    #[error("graphic error: {0}")]
    Graphic(#[from] GraphicError),

    /// Update of a schedule that does not exist and cannot be created.
    #[error("unknown schedule {0:?}: a new schedule needs pages and must be active")]
    UnknownSchedule(char),

    /// Operation not available on this sign variant.
    #[error("{0} is not supported by this sign variant")]
    Unsupported(&'static str),

    /// Persisted state could not be encoded or decoded.
    #[error("state persistence error: {0}")]
    Persist(#[from] serde_json::Error),
}

/// Schedule date parse errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DateError {
    /// A date string containing something other than ASCII digits.
    #[error("date {0:?} contains non-digit characters")]
    NotNumeric(String),

    /// A date string longer than `YYMMDDHHMM`.
    #[error("date {0:?} is longer than 10 digits")]
    TooLong(String),
}

/// Graphic grid errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GraphicError {
    /// A row ends part-way through an 8-column block.
    #[error("row {row} has {len} columns, block {block} needs {needed}")]
    ShortRow {
        row: usize,
        len: usize,
        block: usize,
        needed: usize,
    },

    /// The grid exceeds the sign's graphic size.
    #[error("graphic is {rows}x{columns}, maximum is 8x32")]
    TooLarge { rows: usize, columns: usize },
}

/// Result type alias for ledsign operations.
pub type Result<T> = std::result::Result<T, Error>;
