//! Subscriber setup for the binary. The library itself only emits `tracing` events.

use std::{fs::File, io, sync::Mutex};

use tracing_subscriber::{EnvFilter, fmt, prelude::*};

use crate::config::{ENV_PREFIX, LogSettings};

/// Directives compiled in from `.cargo/log_directives`, if that file existed at build time.
const BUILD_DIRECTIVES: Option<&str> = option_env!("LOG_DIRECTIVES");

/// Install the global subscriber.
///
/// With a trace file, events go there as JSON lines (one object per event); otherwise
/// they are printed for humans on stderr.
pub fn init(settings: &LogSettings) -> io::Result<()> {
	let filter = EnvFilter::new(directives(std::env::var("RUST_LOG").ok().as_deref(), settings));
	let trace_file = std::env::var(format!("{ENV_PREFIX}_TRACE_FILE")).ok().or_else(|| settings.trace_file.clone());

	let (json_layer, stderr_layer) = match trace_file {
		Some(path) => {
			let file = File::create(&path)?;
			(Some(fmt::layer().json().with_ansi(false).with_writer(Mutex::new(file))), None)
		}
		None => (None, Some(fmt::layer().compact().with_writer(io::stderr))),
	};

	tracing_subscriber::registry().with(filter).with(json_layer).with(stderr_layer).try_init().map_err(io::Error::other)
}

/// First non-empty of: `RUST_LOG`, configured directives, build-time directives, `info`.
fn directives(rust_log: Option<&str>, settings: &LogSettings) -> String {
	[rust_log, settings.directives.as_deref(), BUILD_DIRECTIVES]
		.into_iter()
		.flatten()
		.map(str::trim)
		.find(|d| !d.is_empty())
		.unwrap_or("info")
		.to_string()
}
