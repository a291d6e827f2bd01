use std::sync::Arc;
use std::time::Duration;

use tokio::net::TcpListener;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use hooklog_api_server::WebhookConfig;
use hooklog_github::{GithubClient, GithubService};
use hooklog_hooks::IssuesProcessor;
use hooklog_stream::Stream;

use crate::config::{Cli, ServerConfig};
use crate::error::ServerError;

pub async fn run(cli: Cli) -> Result<(), ServerError> {
    tracing::info!("hooklog-server starting");

    // --- Load config ---
    let config = match &cli.config {
        Some(path) => {
            let config = ServerConfig::load(path)?;
            tracing::info!(config = %path, "loaded config");
            config
        }
        None => ServerConfig::default(),
    };

    // --- CancellationToken for graceful shutdown ---
    let token = CancellationToken::new();
    let stream = Arc::new(Stream::new());

    let compactor = config
        .stream
        .compact_interval()
        .map(|period| spawn_compactor(stream.clone(), period, token.clone()));

    // --- Issues processor ---
    let client = GithubClient::new(
        config.github.api_endpoint.clone(),
        cli.github_token,
        config.github.client_timeout(),
    )?;
    let service = Arc::new(GithubService::new(client));
    let issues = &config.hooks.issues;
    let processor = Arc::new(IssuesProcessor::new(service, issues.projects.clone()));
    stream.subscribe(&issues.topic, processor, issues.workers);
    tracing::info!(
        topic = %issues.topic,
        workers = issues.workers,
        projects = issues.projects.len(),
        "subscribed issues processor"
    );

    // --- API server ---
    let listener = TcpListener::bind(&config.addr)
        .await
        .map_err(|source| ServerError::Bind { addr: config.addr.clone(), source })?;
    let webhook = WebhookConfig {
        secret: cli.github_secret,
        issues_topic: issues.topic.clone(),
    };
    let mut api_handle: JoinHandle<std::io::Result<()>> = tokio::spawn(hooklog_api_server::serve(
        listener,
        stream.clone(),
        webhook,
        token.clone(),
    ));

    tracing::info!("server ready");

    // --- Wait for a signal or a server failure ---
    let mut result = Ok(());
    tokio::select! {
        signal = shutdown_signal() => {
            if let Err(e) = signal {
                tracing::error!(error = %e, "signal handler failed");
                result = Err(e);
            }
            tracing::info!("shutting down...");
        }
        joined = &mut api_handle => {
            result = match joined {
                Ok(Ok(())) => Ok(()),
                Ok(Err(e)) => Err(ServerError::Serve(e)),
                Err(e) => Err(ServerError::Serve(std::io::Error::other(e))),
            };
            tracing::error!("api server stopped unexpectedly");
        }
    }

    // Signal all tasks to stop cooperatively
    token.cancel();

    if !api_handle.is_finished() {
        match tokio::time::timeout(config.exit_timeout(), &mut api_handle).await {
            Ok(Ok(Err(e))) => tracing::error!(error = %e, "api server error"),
            Ok(_) => {}
            Err(_) => {
                tracing::warn!(timeout = ?config.exit_timeout(), "api server did not stop in time");
                api_handle.abort();
            }
        }
    }

    if let Some(compactor) = compactor {
        let _ = compactor.await;
    }

    // Drain every worker loop
    stream.stop().await;

    tracing::info!("shutdown complete");
    result
}

fn spawn_compactor(stream: Arc<Stream>, period: Duration, token: CancellationToken) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval_at(tokio::time::Instant::now() + period, period);
        ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
        loop {
            tokio::select! {
                _ = token.cancelled() => break,
                _ = ticker.tick() => {
                    stream.compact();
                }
            }
        }
    })
}

async fn shutdown_signal() -> Result<(), ServerError> {
    #[cfg(unix)]
    {
        let mut terminate = tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())?;
        tokio::select! {
            res = tokio::signal::ctrl_c() => res?,
            _ = terminate.recv() => {}
        }
        Ok(())
    }

    #[cfg(not(unix))]
    {
        tokio::signal::ctrl_c().await?;
        Ok(())
    }
}
