use shared::{RecordKind, ValidationError};

/// Root causes raised by the domain services.
///
/// Services wrap these in an operation-level message with `anyhow::Context`;
/// callers recover them with `anyhow::Error::downcast_ref::<DataError>()`.
#[derive(Debug, thiserror::Error, PartialEq)]
pub enum DataError {
    #[error("{kind} with id {id} not found")]
    NotFound { kind: RecordKind, id: String },
    #[error("Validation failed: {}", summarize(.0))]
    Invalid(Vec<ValidationError>),
}

impl DataError {
    pub fn not_found(kind: RecordKind, id: &str) -> Self {
        DataError::NotFound {
            kind,
            id: id.to_string(),
        }
    }
}

fn summarize(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(|e| e.message.as_str())
        .collect::<Vec<_>>()
        .join("; ")
}

/// Find the [`DataError`] behind a service error, if there is one
pub fn data_error(err: &anyhow::Error) -> Option<&DataError> {
    err.chain().find_map(|cause| cause.downcast_ref::<DataError>())
}
