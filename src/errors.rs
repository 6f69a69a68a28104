use thiserror::Error;

/// Top-level application error.
/// All variants carry a human-readable message for display/logging.
#[derive(Debug, Error)]
pub enum AppError {
    // ── Lookup errors ────────────────────────────────────────────────────────
    #[error("Session '{id}' not found")]
    SessionNotFound { id: String },

    #[error("Subject '{id}' not found")]
    SubjectNotFound { id: String },

    #[error("Note '{id}' not found")]
    NoteNotFound { id: String },

    // ── Validation errors ────────────────────────────────────────────────────
    #[error("Field '{field_name}' exceeds max length of {max_length} (actual: {actual_length})")]
    FieldTooLong { field_name: String, max_length: usize, actual_length: usize },

    // ── Configuration errors ─────────────────────────────────────────────────
    #[error("Invalid value '{value}' for {key}")]
    InvalidConfig { key: String, value: String },
}

impl AppError {
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            AppError::SessionNotFound { .. }
                | AppError::SubjectNotFound { .. }
                | AppError::NoteNotFound { .. }
        )
    }

    pub fn is_validation(&self) -> bool {
        matches!(self, AppError::FieldTooLong { .. })
    }
}
