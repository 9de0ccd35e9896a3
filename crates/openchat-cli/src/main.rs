//! Openchat terminal client
//!
//! Usage: `openchat [--relay URL] [--name NAME] [--locale en|ja]`
//!
//! Each stdin line is sent as a chat message. `/leave` disconnects and
//! `/join` reconnects under the same name. `/quit`, end of input or Ctrl-C
//! leaves the relay and exits.

use std::io::Write;

use clap::Parser;
use openchat_cli::{Args, CliError, LineRenderer, forward, shutdown};
use openchat_client::{Runtime, SystemEnv, transport::WebSocketDriver};
use openchat_core::Session;
use tokio::io::{AsyncBufReadExt, BufReader, Lines, Stdin};
use tracing::info;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), CliError> {
    let args = Args::parse();

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&args.log_level));
    tracing_subscriber::registry().with(fmt::layer().with_writer(std::io::stderr)).with(filter).init();

    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    let name = match &args.name {
        Some(name) => Session::validate_display_name(name)?.to_string(),
        None => match prompt_name(&mut lines).await? {
            Some(name) => name,
            None => return Ok(()),
        },
    };

    let config = args.runtime_config();
    info!(relay = %config.relay_url, locale = %config.connection.locale, "starting");

    let observer = LineRenderer::new(std::io::stdout());
    let (runtime, handle) = Runtime::new(WebSocketDriver::new(), SystemEnv::new(), observer, config);
    let task = tokio::spawn(runtime.run());

    let mut stdout = std::io::stdout();
    let outcome = tokio::select! {
        result = forward(&handle, &mut lines, &name, &mut stdout) => result,
        _ = tokio::signal::ctrl_c() => Ok(()),
    };

    shutdown(handle, task).await;
    outcome
}

/// Ask for a display name until a valid one is entered. `None` on end of
/// input.
async fn prompt_name(lines: &mut Lines<BufReader<Stdin>>) -> Result<Option<String>, CliError> {
    let mut stdout = std::io::stdout();
    loop {
        write!(stdout, "display name: ")?;
        stdout.flush()?;

        let Some(line) = lines.next_line().await? else {
            return Ok(None);
        };
        match Session::validate_display_name(&line) {
            Ok(name) => return Ok(Some(name.to_string())),
            Err(e) => writeln!(stdout, "!! {e}")?,
        }
    }
}
