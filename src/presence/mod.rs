mod publisher;
mod traits;

#[cfg(test)]
pub(crate) mod testing;

pub use publisher::{PublishError, SessionPublisher, MAX_PUBLISH_ATTEMPTS};
pub use traits::{PresenceSession, SessionError};
