/// Domain errors shared by every crate.
#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    /// Input failed validation before reaching any store.
    #[error("Validation failed: {0}")]
    Validation(String),
}
