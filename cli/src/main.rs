//! Embrace CLI - line-oriented driver for a single companion session.
//!
//! # Protocol
//!
//! ```text
//! stdin:  one message per line
//! stdout: one compact JSON ReplyComposition per line
//! ```
//!
//! Logs never go to stdout. Ctrl-C while a reply is being generated abandons
//! the remote call and answers from the offline bank; Ctrl-C while idle exits.
//!
//! # Flags
//!
//! - `--offline` ignore all configured credentials
//! - `--resources <path>` load resources from `path` instead of the config
//! - `--no-journal` do not record turns

use anyhow::{Context, Result, bail};
use std::{
    env,
    fs::{self, OpenOptions},
    future::Future,
    io,
    path::PathBuf,
    sync::{Arc, Mutex},
};
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

use embrace_engine::embrace_providers::gemini::GeminiService;
use embrace_engine::embrace_providers::http_client;
use embrace_engine::{EmbraceConfig, StartupOptions, companion_from_config};

fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new("info"))
        .unwrap_or_else(|_| EnvFilter::new("warn"));

    let (log_file, init_warnings) = open_embrace_log_file();

    if let Some((log_path, file)) = log_file {
        tracing_subscriber::registry()
            .with(fmt::layer().with_ansi(false).with_writer(Mutex::new(file)))
            .with(env_filter)
            .init();

        tracing::info!(path = %log_path.display(), "Logging initialized");
        for warning in init_warnings {
            tracing::warn!("{warning}");
        }
        return;
    }

    // stdout carries replies, so the last resort is stderr.
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(env_filter)
        .init();
    for warning in init_warnings {
        tracing::warn!("{warning}");
    }
}

fn open_embrace_log_file() -> (Option<(PathBuf, std::fs::File)>, Vec<String>) {
    let candidates = embrace_log_file_candidates();
    let mut warnings = Vec::new();

    for candidate in candidates {
        if let Some(parent) = candidate.parent()
            && let Err(e) = fs::create_dir_all(parent)
        {
            warnings.push(format!(
                "Failed to create log dir {}: {e}",
                parent.display()
            ));
            continue;
        }

        match OpenOptions::new()
            .create(true)
            .append(true)
            .open(&candidate)
        {
            Ok(file) => return (Some((candidate, file)), warnings),
            Err(e) => {
                warnings.push(format!(
                    "Failed to open log file {}: {e}",
                    candidate.display()
                ));
            }
        }
    }

    (None, warnings)
}

fn embrace_log_file_candidates() -> Vec<PathBuf> {
    let mut candidates = Vec::new();

    // Primary: ~/.embrace/logs/embrace.log
    if let Some(config_path) = EmbraceConfig::path()
        && let Some(config_dir) = config_path.parent()
    {
        candidates.push(config_dir.join("logs").join("embrace.log"));
    }

    // Fallback: ./.embrace/logs/embrace.log
    candidates.push(PathBuf::from(".embrace").join("logs").join("embrace.log"));

    candidates
}

fn parse_args(args: impl IntoIterator<Item = String>) -> Result<StartupOptions> {
    let mut options = StartupOptions::default();
    let mut args = args.into_iter();
    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--offline" => options.offline = true,
            "--no-journal" => options.no_journal = true,
            "--resources" => {
                let path = args.next().context("--resources requires a path")?;
                options.resources = Some(PathBuf::from(path));
            }
            other => bail!("unknown argument: {other}"),
        }
    }
    Ok(options)
}

/// Resolves when `signal` fires. A failed handler registration never
/// resolves, so it cannot be mistaken for an interrupt.
async fn interrupt(signal: impl Future<Output = io::Result<()>>) {
    if let Err(e) = signal.await {
        tracing::warn!("Ctrl-C handler unavailable: {e}");
        std::future::pending::<()>().await;
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing();

    let options = parse_args(env::args().skip(1))?;
    let config = match EmbraceConfig::load() {
        Ok(config) => config.unwrap_or_default(),
        Err(e) => {
            eprintln!("Ignoring config: {e}");
            EmbraceConfig::default()
        }
    };

    let service = GeminiService::with_client(
        http_client().clone(),
        config.base_url(),
        config.model(),
    );
    let companion = companion_from_config(&config, Arc::new(service), &options);
    let mut session = companion.session();
    tracing::info!(session = %session.id(), "Embrace ready");

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut stdout = tokio::io::stdout();

    loop {
        let line = tokio::select! {
            line = lines.next_line() => line.context("Failed to read stdin")?,
            () = interrupt(tokio::signal::ctrl_c()) => None,
        };
        let Some(line) = line else { break };

        let reply = session
            .process_turn_until(&line, interrupt(tokio::signal::ctrl_c()))
            .await;

        let mut encoded = serde_json::to_vec(&reply).context("Failed to encode reply")?;
        encoded.push(b'\n');
        stdout
            .write_all(&encoded)
            .await
            .context("Failed to write reply")?;
        stdout.flush().await.context("Failed to flush stdout")?;
    }

    tracing::info!(session = %session.id(), "Embrace shutting down");
    Ok(())
}
