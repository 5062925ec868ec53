use std::process::ExitCode;
use std::sync::Arc;

use clap::{error::ErrorKind, Parser};
use playback_presence::{
    config::Cli, discord::DiscordPresence, logging, presence::SessionPublisher,
    webhook::WebhookServer,
};

fn main() -> ExitCode {
    let _guard = logging::init_logging();

    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) if matches!(e.kind(), ErrorKind::DisplayHelp | ErrorKind::DisplayVersion) => {
            e.exit()
        }
        Err(e) => {
            tracing::error!("A Discord application ID must be provided\n{}", e);
            return ExitCode::FAILURE;
        }
    };

    tracing::info!("Using client ID: {}", cli.client_id);

    let runtime = match tokio::runtime::Runtime::new() {
        Ok(runtime) => runtime,
        Err(e) => {
            tracing::error!("Failed to start async runtime: {}", e);
            return ExitCode::FAILURE;
        }
    };

    let session = DiscordPresence::new(runtime.handle().clone());
    let publisher = Arc::new(SessionPublisher::new(cli.client_id, session));

    if let Err(e) = publisher.connect() {
        tracing::error!("Unable to log in: {}", e);
        return ExitCode::FAILURE;
    }

    let server = match WebhookServer::bind(&cli.listen) {
        Ok(server) => server,
        Err(e) => {
            tracing::error!("Failed to run HTTP server to intercept webhook calls: {}", e);
            publisher.shutdown();
            return ExitCode::FAILURE;
        }
    };

    let shutdown = server.shutdown_handle();
    runtime.spawn(async move {
        match tokio::signal::ctrl_c().await {
            Ok(()) => {
                tracing::info!("Shutting down");
                shutdown.shutdown();
            }
            Err(e) => tracing::warn!("Failed to listen for ctrl+c: {}", e),
        }
    });

    server.run(Arc::clone(&publisher));

    publisher.shutdown();
    ExitCode::SUCCESS
}
