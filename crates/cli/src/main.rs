//! Emote registry diagnostics.
//!
//! Loads every enabled provider's global emotes, optionally attaches channels,
//! then prints counts, lookups, and autocomplete candidates.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use emote_config::EmoteConfig;
use emote_registry::{ChannelEmotes, ChannelId, Emote, EmoteRegistry, FetchHandle, ReqwestClient};
use tracing::{debug, info, warn};

/// Command line arguments.
#[derive(Parser, Debug)]
#[command(name = "emote")]
#[command(about = "Load third-party chat emotes and inspect the registry")]
struct Args {
	/// Config file (defaults to the platform config directory)
	#[arg(short, long, value_name = "PATH")]
	config: Option<PathBuf>,

	/// Channel to attach; may be repeated
	#[arg(short = 'C', long = "channel", value_name = "LOGIN")]
	channels: Vec<String>,

	/// Autocomplete prefix to list
	#[arg(short, long)]
	prefix: Option<String>,

	/// Verbose logging
	#[arg(short, long)]
	verbose: bool,

	/// Emote names to resolve
	names: Vec<String>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
	let args = Args::parse();

	setup_tracing(args.verbose);

	let config = match &args.config {
		Some(path) => EmoteConfig::load(path),
		None => EmoteConfig::load_default(),
	}
	.context("failed to load emote config")?;

	let http = Arc::new(ReqwestClient::new(config.request_timeout(), &config.user_agent).context("failed to build HTTP client")?);
	let registry = config.build_registry(http)?;

	info!(providers = registry.providers().count(), "loading global emotes");
	settle(registry.load_global()).await;
	print_global(&registry);

	let mut channels = Vec::with_capacity(args.channels.len());
	for login in &args.channels {
		let (channel, loading) = registry.load_for_channel(ChannelId::new(login));
		settle(loading).await;
		print_channel(&channel);
		channels.push(channel);
	}

	for name in &args.names {
		match channels.first() {
			Some(channel) => print_lookup(name, channel.lookup(name)),
			None => print_lookup(name, registry.lookup(name)),
		}
	}

	if let Some(prefix) = &args.prefix {
		let names = match channels.first() {
			Some(channel) => channel.names_with_prefix(prefix),
			None => registry.names_with_prefix(prefix),
		};
		println!("{} names starting with {prefix:?}", names.len());
		for name in names {
			println!("  {name}");
		}
	}

	Ok(())
}

/// Awaits fetches; failures are already recorded on their sets.
async fn settle(handles: Vec<FetchHandle>) {
	for handle in handles {
		let provider = handle.provider();
		match handle.await {
			Ok(outcome) => debug!(provider = provider.as_str(), ?outcome, "emote load finished"),
			Err(err) => warn!(provider = provider.as_str(), error = %err, "emote load failed"),
		}
	}
}

fn print_global(registry: &EmoteRegistry) {
	println!("global: {} emotes", registry.global_count());
	for fetcher in registry.providers() {
		let set = fetcher.global();
		match set.last_error() {
			Some(err) => println!("  {:<14} {:>6}  (last load failed: {err})", fetcher.provider().display_name(), set.len()),
			None => println!("  {:<14} {:>6}", fetcher.provider().display_name(), set.len()),
		}
	}
}

fn print_channel(channel: &ChannelEmotes) {
	println!("#{}: {} channel emotes", channel.channel(), channel.channel_count());
	for set in emote_registry::Provider::ALL.iter().filter_map(|p| channel.set(*p)) {
		if let Some(err) = set.last_error() {
			println!("  {:<14} (last load failed: {err})", set.provider().display_name());
		}
	}
}

fn print_lookup(name: &str, emote: Option<Arc<Emote>>) {
	let Some(emote) = emote else {
		println!("{name}: not an emote");
		return;
	};
	println!(
		"{name}: {} {} emote {} -> {}",
		emote.provider.display_name(),
		emote.scope.as_str(),
		emote.id,
		emote.images.for_scale(1.0)
	);
}

fn setup_tracing(verbose: bool) {
	use std::fs::OpenOptions;

	use tracing_subscriber::EnvFilter;
	use tracing_subscriber::prelude::*;

	let filter = || {
		EnvFilter::try_from_default_env().unwrap_or_else(|_| {
			if verbose {
				EnvFilter::new("emote=debug,warn")
			} else {
				EnvFilter::new("emote=info,warn")
			}
		})
	};

	if let Some(log_dir) = std::env::var("EMOTE_LOG_DIR").ok().map(PathBuf::from)
		&& std::fs::create_dir_all(&log_dir).is_ok()
	{
		let log_path = log_dir.join(format!("emote.{}.log", std::process::id()));

		if let Ok(file) = OpenOptions::new().create(true).append(true).open(&log_path) {
			let file_layer = tracing_subscriber::fmt::layer()
				.with_writer(file)
				.with_ansi(false)
				.with_target(true);

			tracing_subscriber::registry().with(filter()).with(file_layer).init();

			tracing::info!(path = ?log_path, "emote tracing initialized");
			return;
		}
	}

	tracing_subscriber::fmt()
		.with_env_filter(filter())
		.with_writer(std::io::stderr)
		.init();
}
