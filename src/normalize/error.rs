use thiserror::Error;

use crate::model::{FieldKind, ProtocolId};

/// Batch-level failure. Nothing is returned when this fires.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum NormalizeError {
    #[error("Protocol `{0}` is not supported (expected one of: aave, compound)")]
    UnsupportedProtocol(String),
}

/// Why a single raw asset could not be decoded (a malformed tuple).
///
/// The asset is skipped and the rest of the batch carries on.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DecodeError {
    #[error("Malformed tuple: {layout} needs at least {expected} fields, got {actual}")]
    TooShort {
        layout: &'static str,
        expected: usize,
        actual: usize,
    },

    #[error("Malformed tuple: field `{field}` should be {expected}, got {actual}")]
    WrongKind {
        field: &'static str,
        expected: FieldKind,
        actual: FieldKind,
    },

    #[error("Malformed record: required field `{field}` is missing")]
    MissingField { field: &'static str },

    #[error("Malformed record: {protocol} expects a {expected} layout, got {actual}")]
    LayoutMismatch {
        protocol: ProtocolId,
        expected: &'static str,
        actual: &'static str,
    },

    #[error("Field `{field}` is out of range: {reason}")]
    OutOfRange { field: &'static str, reason: String },
}
