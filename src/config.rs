use clap::Parser;

use crate::webhook::DEFAULT_LISTEN_ADDR;

/// Mirror "now playing" webhooks into Discord Rich Presence
#[derive(Debug, Clone, Parser)]
#[command(version, about)]
pub struct Cli {
    /// Discord application ID to publish presence under
    pub client_id: String,

    /// Address the webhook listener binds to
    #[arg(long, default_value = DEFAULT_LISTEN_ADDR)]
    pub listen: String,
}
