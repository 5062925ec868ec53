//! Owns the presence session and publishes activities to it

use std::sync::{Mutex, MutexGuard, PoisonError};

use super::traits::{PresenceSession, SessionError};
use crate::playback::DisplayActivity;

/// Publish attempts per activity: the initial one plus a single retry after reconnecting
pub const MAX_PUBLISH_ATTEMPTS: usize = 2;

#[derive(Debug, thiserror::Error)]
pub enum PublishError {
    #[error("Failed to set activity; retries exhausted after {attempts} attempts: {source}")]
    RetriesExhausted {
        attempts: usize,
        #[source]
        source: SessionError,
    },

    #[error("Failed to reconnect prior to retrying setting activity: {0}")]
    Reconnect(#[source] SessionError),
}

/// Serializes every operation on a single presence session.
///
/// Requests arrive on many threads; the lock is held across the whole
/// publish/disconnect/reconnect sequence so a retry from one request can never
/// interleave with a publish from another.
pub struct SessionPublisher<S> {
    client_id: String,
    session: Mutex<S>,
}

impl<S: PresenceSession> SessionPublisher<S> {
    pub fn new(client_id: impl Into<String>, session: S) -> Self {
        Self {
            client_id: client_id.into(),
            session: Mutex::new(session),
        }
    }

    pub fn client_id(&self) -> &str {
        &self.client_id
    }

    /// Open the initial session
    pub fn connect(&self) -> Result<(), SessionError> {
        let mut session = self.lock();
        tracing::info!("Connecting to {} with client ID {}", session.name(), self.client_id);
        session.connect(&self.client_id)
    }

    /// Publish an activity, reconnecting once if the first attempt fails
    pub fn publish(&self, activity: &DisplayActivity) -> Result<(), PublishError> {
        let mut session = self.lock();
        let mut attempt = 1;

        loop {
            let error = match session.publish(activity) {
                Ok(()) => {
                    tracing::debug!(
                        "Published activity to {} (attempt {}): {:?}",
                        session.name(),
                        attempt,
                        activity
                    );
                    return Ok(());
                }
                Err(e) => e,
            };

            tracing::warn!("Failed to set activity on attempt {}: {}", attempt, error);

            if attempt >= MAX_PUBLISH_ATTEMPTS {
                return Err(PublishError::RetriesExhausted {
                    attempts: attempt,
                    source: error,
                });
            }

            if let Err(e) = session.disconnect() {
                tracing::warn!("Failed to disconnect prior to retry setting activity: {}", e);
            }

            session
                .connect(&self.client_id)
                .map_err(PublishError::Reconnect)?;

            tracing::info!("Reconnected to {}; retrying activity", session.name());
            attempt += 1;
        }
    }

    /// Close the session, logging rather than returning any failure
    pub fn shutdown(&self) {
        let mut session = self.lock();
        match session.disconnect() {
            Ok(()) => tracing::info!("{} session closed", session.name()),
            Err(e) => tracing::warn!("Failed to close {} session: {}", session.name(), e),
        }
    }

    fn lock(&self) -> MutexGuard<'_, S> {
        // Poisoning is ignored; a broken session is repaired by the next retry
        self.session.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
