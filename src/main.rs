use std::sync::Arc;

use slack_mcp_server::config::ServerConfig;
use slack_mcp_server::credentials::{CredentialChain, CredentialProvider};
use slack_mcp_server::handlers::{self, Dispatcher};
use slack_mcp_server::server::{shutdown_channel, McpServer, ShutdownTrigger};
use slack_mcp_server::slack::SlackClient;

fn fatal(message: impl std::fmt::Display) -> ! {
    eprintln!("slack-mcp-server: {message}");
    std::process::exit(1);
}

/// Logs go to stderr; stdout carries protocol frames only.
fn init_logging() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "warn".into()),
        )
        .with_writer(std::io::stderr)
        .with_ansi(false)
        .init();
}

async fn wait_for_signal() {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{signal, SignalKind};

        match signal(SignalKind::terminate()) {
            Ok(mut term) => {
                tokio::select! {
                    res = tokio::signal::ctrl_c() => {
                        if let Err(e) = res {
                            tracing::warn!(error = %e, "cannot listen for ctrl-c");
                            term.recv().await;
                        }
                    }
                    _ = term.recv() => {}
                }
            }
            Err(e) => {
                tracing::warn!(error = %e, "cannot listen for SIGTERM");
                if tokio::signal::ctrl_c().await.is_err() {
                    std::future::pending::<()>().await;
                }
            }
        }
    }

    #[cfg(not(unix))]
    {
        if tokio::signal::ctrl_c().await.is_err() {
            std::future::pending::<()>().await;
        }
    }
}

fn spawn_signal_listener(trigger: ShutdownTrigger) {
    tokio::spawn(async move {
        wait_for_signal().await;
        tracing::info!("signal received");
        trigger.trigger();
    });
}

#[tokio::main(flavor = "current_thread")]
async fn main() {
    init_logging();

    let config = match ServerConfig::from_env() {
        Ok(c) => c,
        Err(e) => fatal(format_args!("configuration error: {e}")),
    };

    let credentials =
        CredentialChain::standard(config.token_file.as_deref(), config.token_user.as_deref());
    let Some(token) = credentials.credential() else {
        fatal(format_args!(
            "Slack token must be set (set SLACK_TOKEN or write it to {})",
            credentials.source()
        ));
    };

    let slack = match SlackClient::new(token, &config) {
        Ok(c) => Arc::new(c),
        Err(e) => fatal(format_args!("cannot build Slack client: {e}")),
    };

    let registry = match handlers::default_registry(slack.clone(), slack) {
        Ok(r) => r,
        Err(e) => fatal(format_args!("cannot register tools: {e}")),
    };

    let (trigger, shutdown) = shutdown_channel();
    spawn_signal_listener(trigger);

    tracing::info!(api_url = %config.api_url, tools = registry.len(), "serving MCP over stdio");
    let server = McpServer::new(Dispatcher::new(registry), shutdown);
    if let Err(e) = server.run().await {
        fatal(format_args!("fatal error: {e}"));
    }

    // The blocking stdin reader cannot be cancelled; exit rather than wait
    // for it when shutdown came from a signal.
    std::process::exit(0);
}
