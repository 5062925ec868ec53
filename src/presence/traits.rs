use crate::playback::DisplayActivity;

#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    #[error("Invalid client ID '{0}'")]
    InvalidClientId(String),

    #[error("Presence client is not connected")]
    NotConnected,

    #[error("Presence client not available: {0}")]
    Unavailable(String),

    #[error("Handshake timed out")]
    HandshakeTimeout,

    #[error("Presence client disconnected: {0}")]
    Disconnected(String),

    #[error("Failed to update activity: {0}")]
    Publish(String),
}

/// A connection to a presence service (Discord, etc.)
///
/// Implementations are driven from request threads, one call at a time.
pub trait PresenceSession: Send {
    /// Returns the name of this presence service (for logging)
    fn name(&self) -> &'static str;

    /// Open a session for the given client identifier
    fn connect(&mut self, client_id: &str) -> Result<(), SessionError>;

    /// Close the current session, if any
    fn disconnect(&mut self) -> Result<(), SessionError>;

    /// Replace the displayed activity
    fn publish(&mut self, activity: &DisplayActivity) -> Result<(), SessionError>;
}
