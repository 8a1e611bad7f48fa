use marginalia_core::mute_token::MuteTokenError;

/// Errors surfaced by [`NotificationService`](crate::NotificationService).
///
/// Delivery failures are not errors here; they are recorded in the
/// [`FanOutReport`](crate::FanOutReport) instead.
#[derive(Debug, thiserror::Error)]
pub enum NotifyError {
    /// A mute link failed verification.
    #[error(transparent)]
    Token(#[from] MuteTokenError),

    /// A verified mute link names an email with no matching user.
    #[error("No user with email {0}")]
    UnknownRecipient(String),

    /// The backing store failed.
    #[error("Store error: {0}")]
    Store(#[from] sqlx::Error),
}
