use std::io;
use thiserror::Error;

/// Errors produced while reading or validating a network schema document.
///
/// All schema inconsistencies are fatal: an undeclared type, a missing
/// `topic`, or a missing `range`/`precision` abort the whole generation run
/// instead of degrading into an undefined layout.
#[derive(Debug, Error)]
pub enum SchemaError {
    #[error("Not a valid .json schema file: {path}")]
    InvalidExtension { path: String },
    #[error("Failed to open '{path}'. \nError: {source}")]
    OpenFile {
        path: String,
        #[source]
        source: io::Error,
    },
    #[error("Failed while reading '{path}'. \nError: {source}")]
    Read {
        path: String,
        #[source]
        source: io::Error,
    },
    #[error("Invalid schema document: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Signal '{signal}' of message '{message}' references undeclared type '{type_name}'")]
    UnknownType {
        message: String,
        signal: String,
        type_name: String,
    },
    #[error("Message '{message}' declares neither a topic nor a fixed_id")]
    MissingTopic { message: String },
    #[error("Message '{message}' declares a topic but no priority")]
    MissingPriority { message: String },
    #[error("Signal '{signal}' of message '{message}' needs a range and a precision, or a forced type")]
    MissingRange { message: String, signal: String },
    #[error("Signal '{signal}' of message '{message}' has a non-positive precision")]
    InvalidPrecision { message: String, signal: String },
    #[error("Message '{message}' has invalid endianness '{value}' (expected \"little\" or \"big\")")]
    InvalidEndianness { message: String, value: String },
    #[error("Message '{name}' is defined more than once")]
    DuplicateMessage { name: String },
    #[error("Fixed id {id} of message '{name}' is already taken by another message")]
    DuplicateFixedId { name: String, id: u32 },
}

/// Errors produced while resolving a signal's bit layout.
#[derive(Debug, Error)]
pub enum LayoutError {
    #[error("Signals of message '{message}' span {bits} bits, exceeding the 64 bit payload limit")]
    PayloadOverflow { message: String, bits: u32 },
    #[error("Signal '{signal}' of message '{message}' has an empty range")]
    ZeroWidth { message: String, signal: String },
    #[error("Signal '{signal}' forces unknown primitive type '{type_name}'")]
    UnknownPrimitive { signal: String, type_name: String },
}

/// Errors produced while allocating frame IDs.
///
/// All are unrecoverable capacity or configuration errors: the run is
/// deterministic over static input, so nothing is retried.
#[derive(Debug, Error)]
pub enum AllocError {
    #[error("Priority {priority} of message '{message}' out of range (0-{max})")]
    PriorityOutOfRange {
        message: String,
        priority: u8,
        max: u8,
    },
    #[error("Message '{message}' went through allocation without a priority")]
    MissingPriority { message: String },
    #[error("No more topics ({count} > {limit})")]
    TopicOverflow { count: usize, limit: usize },
    #[error("No more ids for message '{message}' (> {limit} per priority)")]
    BucketOverflow { message: String, limit: u32 },
}

/// Umbrella error for a full generation run.
#[derive(Debug, Error)]
pub enum GenerateError {
    #[error(transparent)]
    Schema(#[from] SchemaError),
    #[error(transparent)]
    Layout(#[from] LayoutError),
    #[error(transparent)]
    Alloc(#[from] AllocError),
}
