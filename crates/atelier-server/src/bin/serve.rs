//! Host entry point
//!
//! Loads configuration, wires the platform services, drives every package
//! in the plugin directory to active, and serves the HTTP surface.
//!
//! Exit codes: 0 normal shutdown, 1 fatal startup (invalid configuration,
//! bind failure), 2 plugin directory unreadable.

use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use anyhow::Context;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use atelier_server::routes;
use atelier_server::{AppState, ServerConfig};

#[tokio::main]
async fn main() -> ExitCode {
	tracing_subscriber::fmt()
		.with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
		.init();

	let config_path = parse_config_arg();
	let config = match ServerConfig::load(config_path.as_deref()) {
		Ok(config) => config,
		Err(e) => {
			error!(error = %e, "invalid configuration");
			return ExitCode::from(1);
		}
	};

	let state = AppState::new(config);

	// The plugin directory must at least be creatable and listable.
	if let Err(e) = std::fs::create_dir_all(&state.config.plugin.directory)
		.and_then(|_| std::fs::read_dir(&state.config.plugin.directory).map(drop))
	{
		error!(
			directory = %state.config.plugin.directory.display(),
			error = %e,
			"plugin directory unreadable"
		);
		return ExitCode::from(2);
	}

	match state.lifecycle.discover_and_load_all().await {
		Ok(statuses) => info!(plugins = statuses.len(), "plugin scan complete"),
		Err(e) => {
			error!(error = %e, "plugin directory scan failed");
			return ExitCode::from(2);
		}
	}

	if state.config.plugin.hot_reload.enabled {
		let interval = state.config.hot_reload_interval();
		Arc::clone(&state.lifecycle).spawn_hot_reload(interval);
		info!(interval_ms = interval.as_millis() as u64, "hot reload enabled");
	}

	if let Err(e) = serve(state).await {
		error!(error = %e, "server failed");
		return ExitCode::from(1);
	}
	ExitCode::SUCCESS
}

async fn serve(state: AppState) -> anyhow::Result<()> {
	let port = state.config.server.port;
	let router = routes::router(state);
	let listener = tokio::net::TcpListener::bind(("0.0.0.0", port))
		.await
		.with_context(|| format!("binding port {port}"))?;
	info!(port, "listening");
	axum::serve(listener, router).await.context("serving")?;
	Ok(())
}

/// `--config <path>` or `--config=<path>`; no other flags are recognized.
fn parse_config_arg() -> Option<PathBuf> {
	let mut args = std::env::args().skip(1);
	while let Some(arg) = args.next() {
		if arg == "--config" {
			return args.next().map(PathBuf::from);
		}
		if let Some(value) = arg.strip_prefix("--config=") {
			return Some(PathBuf::from(value));
		}
	}
	None
}
