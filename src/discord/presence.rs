//! Discord Rich Presence session using discord-sdk

use std::time::{Duration, SystemTime};

use discord_sdk::{
    activity::ActivityBuilder,
    wheel::{UserState, Wheel},
    Discord, Subscriptions,
};
use tokio::runtime::Handle;

use crate::playback::DisplayActivity;
use crate::presence::{PresenceSession, SessionError};

/// Timeout for waiting for Discord handshake
const HANDSHAKE_TIMEOUT: Duration = Duration::from_secs(10);

/// Live connection to the local Discord client
struct Connection {
    discord: Discord,
    // Keeps the event spokes alive for as long as the connection
    _wheel: Wheel,
}

/// Presence session backed by the Discord desktop client's IPC socket.
///
/// discord-sdk is async; calls are driven to completion on the given runtime
/// from the (non-async) request threads.
pub struct DiscordPresence {
    runtime: Handle,
    connection: Option<Connection>,
}

impl DiscordPresence {
    pub fn new(runtime: Handle) -> Self {
        Self {
            runtime,
            connection: None,
        }
    }

    async fn open(app_id: i64) -> Result<Connection, SessionError> {
        let (wheel, handler) = Wheel::new(Box::new(|err| {
            tracing::warn!("Discord error: {:?}", err);
        }));

        let mut user_spoke = wheel.user();

        let discord = Discord::new(app_id, Subscriptions::ACTIVITY, Box::new(handler))
            .map_err(|e| SessionError::Unavailable(e.to_string()))?;

        tracing::info!("Discord connecting...");

        let handshake = tokio::time::timeout(HANDSHAKE_TIMEOUT, async {
            if user_spoke.0.changed().await.is_err() {
                Err(SessionError::Disconnected(
                    "Discord connection closed".to_string(),
                ))
            } else {
                match &*user_spoke.0.borrow() {
                    UserState::Connected(user) => Ok(user.clone()),
                    UserState::Disconnected(err) => {
                        Err(SessionError::Disconnected(format!("{:?}", err)))
                    }
                }
            }
        })
        .await
        .unwrap_or(Err(SessionError::HandshakeTimeout));

        match handshake {
            Ok(user) => {
                tracing::info!("Discord Rich Presence connected as {}", user.username);
                Ok(Connection {
                    discord,
                    _wheel: wheel,
                })
            }
            Err(e) => {
                discord.disconnect().await;
                Err(e)
            }
        }
    }
}

impl PresenceSession for DiscordPresence {
    fn name(&self) -> &'static str {
        "Discord"
    }

    fn connect(&mut self, client_id: &str) -> Result<(), SessionError> {
        let app_id = parse_application_id(client_id)?;

        if let Some(previous) = self.connection.take() {
            self.runtime.block_on(previous.discord.disconnect());
        }

        let connection = self.runtime.block_on(Self::open(app_id))?;
        self.connection = Some(connection);
        Ok(())
    }

    fn disconnect(&mut self) -> Result<(), SessionError> {
        let connection = self.connection.take().ok_or(SessionError::NotConnected)?;
        self.runtime.block_on(connection.discord.disconnect());
        tracing::info!("Discord Rich Presence disconnected");
        Ok(())
    }

    fn publish(&mut self, activity: &DisplayActivity) -> Result<(), SessionError> {
        let connection = self.connection.as_ref().ok_or(SessionError::NotConnected)?;

        self.runtime
            .block_on(connection.discord.update_activity(build_activity(activity)))
            .map(|_| ())
            .map_err(|e| SessionError::Publish(e.to_string()))
    }
}

/// Discord application IDs are snowflakes; anything else can never connect
fn parse_application_id(client_id: &str) -> Result<i64, SessionError> {
    client_id
        .trim()
        .parse::<i64>()
        .ok()
        .filter(|id| *id > 0)
        .ok_or_else(|| SessionError::InvalidClientId(client_id.to_string()))
}

fn build_activity(activity: &DisplayActivity) -> ActivityBuilder {
    let mut builder = ActivityBuilder::new()
        .start_timestamp(SystemTime::from(activity.start))
        .end_timestamp(SystemTime::from(activity.end));

    // Discord rejects empty text fields, so unset ones are left out
    if !activity.state.is_empty() {
        builder = builder.state(activity.state.clone());
    }
    if !activity.details.is_empty() {
        builder = builder.details(activity.details.clone());
    }

    builder
}
