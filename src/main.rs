//! CLI entry point for dockhand.

mod cli;

use clap::Parser;
use dockhand::access::AccessGate;
use dockhand::bot::Bot;
use dockhand::build_info;
use dockhand::channel::TelegramChannel;
use dockhand::config::{load_config_with_diagnostics, LoadedConfig};
use dockhand::dispatch::CommandDispatcher;
use dockhand::error::RuntimeError;
use dockhand::runtime::EngineClient;
use dockhand::telemetry;
use std::sync::Arc;
use tracing::{error, info, warn};

#[tokio::main]
async fn main() {
    // A missing .env is normal; real env vars always win over it.
    if let Err(e) = dotenvy::dotenv() {
        if !e.not_found() {
            eprintln!("warning: failed to read .env: {e}");
        }
    }

    let args = cli::Args::parse();

    if let Err(e) = telemetry::init(args.log_level.as_deref()) {
        eprintln!("warning: {e}");
    }

    let loaded = match load_config_with_diagnostics(args.config.as_deref()) {
        Ok(loaded) => loaded,
        Err(e) => {
            error!(error = %e, "failed to load configuration");
            std::process::exit(1);
        }
    };
    for note in &loaded.diagnostics.deprecations {
        warn!("{note}");
    }
    if loaded.config.allow_list.is_empty() {
        warn!("allow-list is empty; every command will be refused");
    }

    let (engine, detect_error) = match EngineClient::detect(&loaded.config.runtime).await {
        Ok(engine) => (engine, None),
        Err(e) => (EngineClient::undetected(&loaded.config.runtime), Some(e)),
    };

    if args.check {
        println!("{}", check_summary(&loaded, &engine, detect_error.as_ref()));
        return;
    }

    info!(
        version = build_info::VERSION,
        commit = build_info::GIT_COMMIT,
        built_unix = build_info::built_unix(),
        config = %loaded.source,
        allowed_users = loaded.config.allow_list.len(),
        engine = %engine.summary(),
        "starting dockhand"
    );
    if let Some(e) = &detect_error {
        warn!(error = %e, "container engine not detected; commands will fail until it is available");
    }

    let channel = match TelegramChannel::new(&loaded.config.telegram) {
        Ok(channel) => channel,
        Err(e) => {
            error!(error = %e, "failed to build the Telegram HTTP client");
            std::process::exit(1);
        }
    };
    match channel.get_me().await {
        Ok(username) => info!(bot = %username, "connected to Telegram"),
        Err(e) => warn!(error = %e, "getMe failed; continuing and retrying on poll"),
    }

    let dispatch_deadline = engine.dispatch_deadline();
    let dispatcher = CommandDispatcher::new(
        AccessGate::new(loaded.config.allow_list.clone()),
        Arc::new(engine),
    )
    .with_call_timeout(dispatch_deadline);

    let bot = Bot::new(Arc::new(channel), Arc::new(dispatcher));
    bot.run(async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!(error = %e, "failed to listen for ctrl-c");
            std::future::pending::<()>().await;
        }
    })
    .await;
}

/// Human-readable `--check` report. Never includes the bot token.
fn check_summary(
    loaded: &LoadedConfig,
    engine: &EngineClient,
    detect_error: Option<&RuntimeError>,
) -> String {
    let config = &loaded.config;
    let engine_line = match detect_error {
        Some(e) => format!("unavailable ({e})"),
        None => engine.summary(),
    };
    let mut lines = vec![
        build_info::describe(),
        String::new(),
        format!("config: {}", loaded.source),
        format!("telegram api: {}", config.telegram.api_base_url),
        format!("poll timeout: {}s", config.telegram.poll_timeout_secs),
        "token: set".to_string(),
        format!("allowed users: {}", config.allow_list.len()),
        format!("engine: {engine_line}"),
    ];
    if config.allow_list.is_empty() {
        lines.push("warning: allow-list is empty; every command will be refused".to_string());
    }
    for note in &loaded.diagnostics.deprecations {
        lines.push(format!("warning: {note}"));
    }
    lines.join("\n")
}
