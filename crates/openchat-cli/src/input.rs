//! Stdin line handling.
//!
//! Lines starting with `/` are commands; everything else is chat text.

use std::io::Write;

use openchat_client::ClientHandle;
use tokio::{
    io::{AsyncBufRead, Lines},
    task::JoinHandle,
};
use tracing::warn;

use crate::CliError;

/// What one line of input asks for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Input {
    /// Chat text, sent as typed.
    Text(String),
    /// Reconnect under the current name (`/join`).
    Join,
    /// Leave the relay and keep the client running (`/leave`).
    Leave,
    /// Leave and exit (`/quit`, `/q`).
    Quit,
    /// Unrecognized command, without the leading `/`.
    Unknown(String),
}

impl Input {
    /// Interpret one input line.
    pub fn parse(line: &str) -> Self {
        let Some(cmd) = line.trim().strip_prefix('/') else {
            return Self::Text(line.to_string());
        };

        match cmd.split_whitespace().next().unwrap_or("") {
            "join" => Self::Join,
            "leave" => Self::Leave,
            "quit" | "q" => Self::Quit,
            other => Self::Unknown(other.to_string()),
        }
    }
}

/// Join as `name`, then turn `lines` into commands until input ends or asks
/// to quit.
///
/// Returns early on a read or write error. The caller still owns shutdown.
pub async fn forward<R, W>(
    handle: &ClientHandle,
    lines: &mut Lines<R>,
    name: &str,
    out: &mut W,
) -> Result<(), CliError>
where
    R: AsyncBufRead + Unpin,
    W: Write,
{
    handle.join_as(name)?;

    while let Some(line) = lines.next_line().await? {
        match Input::parse(&line) {
            Input::Text(text) => handle.send_text(text)?,
            Input::Join => handle.join_as(name)?,
            Input::Leave => handle.leave()?,
            Input::Quit => break,
            Input::Unknown(cmd) => {
                writeln!(out, "!! unknown command /{cmd} (try /join, /leave or /quit)")?;
                out.flush()?;
            },
        }
    }
    Ok(())
}

/// Release the last handle and wait for the runtime to leave the relay.
pub async fn shutdown(handle: ClientHandle, runtime: JoinHandle<()>) {
    drop(handle);
    if let Err(e) = runtime.await {
        warn!(error = %e, "runtime task failed");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_commands() {
        assert_eq!(Input::parse("/join"), Input::Join);
        assert_eq!(Input::parse("  /leave  "), Input::Leave);
        assert_eq!(Input::parse("/quit"), Input::Quit);
        assert_eq!(Input::parse("/q"), Input::Quit);
        assert_eq!(Input::parse("/dance now"), Input::Unknown("dance".into()));
        assert_eq!(Input::parse("/"), Input::Unknown(String::new()));
    }

    #[test]
    fn text_is_kept_verbatim() {
        assert_eq!(Input::parse(" hello /quit "), Input::Text(" hello /quit ".into()));
        assert_eq!(Input::parse(""), Input::Text(String::new()));
    }
}
