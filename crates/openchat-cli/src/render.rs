//! Line-oriented rendering of client state.
//!
//! The runtime always hands over the full history; [`LineRenderer`] prints
//! only the suffix it has not printed yet, which is valid because history is
//! append-only.

use std::io::Write;

use openchat_client::Observer;
use openchat_core::{ConnectionError, ConnectionState, Message, Session};
use tracing::warn;

/// [`Observer`] that writes one line per change to `W`.
pub struct LineRenderer<W> {
    out: W,
    session: Option<Session>,
    rendered: usize,
}

impl<W: Write + Send> LineRenderer<W> {
    /// Renderer writing to `out`.
    pub fn new(out: W) -> Self {
        Self { out, session: None, rendered: 0 }
    }

    /// Consume the renderer and return its writer.
    pub fn into_inner(self) -> W {
        self.out
    }

    fn line(&self, message: &Message) -> String {
        if message.is_system {
            return format!("[{}] * {}", message.sent_at, message.text);
        }

        let own = self.session.as_ref().is_some_and(|s| s.is_own(message));
        let marker = if own { " (you)" } else { "" };
        format!("[{}] {}{}: {}", message.sent_at, message.author, marker, message.text)
    }

    fn emit(&mut self, line: &str) {
        if let Err(e) = writeln!(self.out, "{line}").and_then(|()| self.out.flush()) {
            warn!(error = %e, "failed to write to terminal");
        }
    }
}

impl<W: Write + Send> Observer for LineRenderer<W> {
    fn on_state_change(&mut self, state: ConnectionState) {
        self.emit(&format!("-- {state} --"));
    }

    fn on_messages_change(&mut self, messages: &[Message]) {
        let fresh: Vec<String> = messages.iter().skip(self.rendered).map(|m| self.line(m)).collect();
        self.rendered = messages.len();
        for line in fresh {
            self.emit(&line);
        }
    }

    fn on_presence_change(&mut self, count: u64) {
        self.emit(&format!("-- {count} online --"));
    }

    fn on_session(&mut self, session: &Session) {
        self.session = Some(session.clone());
    }

    fn on_command_rejected(&mut self, error: &ConnectionError) {
        self.emit(&format!("!! {error}"));
    }
}

#[cfg(test)]
mod tests {
    use openchat_core::SessionError;

    use super::*;

    fn render(f: impl FnOnce(&mut LineRenderer<Vec<u8>>)) -> String {
        let mut renderer = LineRenderer::new(Vec::new());
        f(&mut renderer);
        String::from_utf8(renderer.into_inner()).unwrap()
    }

    #[test]
    fn renders_only_new_messages() {
        let joined = Message::system("s-1".into(), "System", "alice joined the chat", "09:00");
        let hi = Message::user("m-1".into(), "alice", "hi", "09:01");
        let hey = Message::user("m-2".into(), "bob", "hey", "09:02");

        let out = render(|r| {
            r.on_session(&Session::new("user_1_abc", "alice").unwrap());
            r.on_state_change(ConnectionState::Connected);
            r.on_messages_change(&[joined.clone()]);
            r.on_messages_change(&[joined.clone(), hi.clone()]);
            r.on_presence_change(2);
            r.on_messages_change(&[joined, hi, hey]);
        });

        insta::assert_snapshot!(out, @r"
        -- connected --
        [09:00] * alice joined the chat
        [09:01] alice (you): hi
        -- 2 online --
        [09:02] bob: hey
        ");
    }

    #[test]
    fn system_notice_is_never_own() {
        let notice = Message::system("s-1".into(), "alice", "local", "09:00");
        let out = render(|r| {
            r.on_session(&Session::new("user_1_abc", "alice").unwrap());
            r.on_messages_change(&[notice]);
        });
        assert_eq!(out, "[09:00] * local\n");
    }

    #[test]
    fn rejections_are_printed() {
        let out = render(|r| r.on_command_rejected(&SessionError::EmptyDisplayName.into()));
        assert_eq!(out, "!! display name must not be empty\n");
    }
}
