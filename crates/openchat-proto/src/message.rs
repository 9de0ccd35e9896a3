//! Chat message literal.

use std::fmt;

use serde::{
    Deserialize, Deserializer, Serialize,
    de::{self, Visitor},
};

/// Identity of a chat message.
///
/// Two messages with the same id are the same logical event. Ids produced by
/// this client are `"<unix millis>-<random hex>"`. Other clients on the relay
/// send JSON numbers (millisecond timestamps, sometimes fractional), so
/// decoding accepts both and keeps the textual form.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct MessageId(String);

impl MessageId {
    /// Build an id from a creation timestamp and a random component.
    pub fn generate(unix_millis: i64, random: u64) -> Self {
        Self(format!("{unix_millis}-{random:016x}"))
    }

    /// Textual form of the id.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for MessageId {
    fn from(value: &str) -> Self {
        Self(value.to_owned())
    }
}

impl From<String> for MessageId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl fmt::Display for MessageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl<'de> Deserialize<'de> for MessageId {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        struct IdVisitor;

        impl Visitor<'_> for IdVisitor {
            type Value = MessageId;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a string or numeric message id")
            }

            fn visit_str<E: de::Error>(self, v: &str) -> Result<MessageId, E> {
                Ok(MessageId(v.to_owned()))
            }

            fn visit_string<E: de::Error>(self, v: String) -> Result<MessageId, E> {
                Ok(MessageId(v))
            }

            fn visit_u64<E: de::Error>(self, v: u64) -> Result<MessageId, E> {
                Ok(MessageId(v.to_string()))
            }

            fn visit_i64<E: de::Error>(self, v: i64) -> Result<MessageId, E> {
                Ok(MessageId(v.to_string()))
            }

            fn visit_f64<E: de::Error>(self, v: f64) -> Result<MessageId, E> {
                Ok(MessageId(v.to_string()))
            }
        }

        deserializer.deserialize_any(IdVisitor)
    }
}

/// A chat message as carried in `message` frames.
///
/// Wire shape: `{ id, user, text, time, isSystem }`. Only `id` is required on
/// input; the other fields default to empty / `false`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    /// Unique, stable identity.
    pub id: MessageId,

    /// Display name of the author, or the localized system name for notices.
    #[serde(rename = "user", default)]
    pub author: String,

    /// Message body.
    #[serde(default)]
    pub text: String,

    /// Display-formatted send time (`HH:MM`).
    #[serde(rename = "time", default)]
    pub sent_at: String,

    /// System notice (join/leave/local mode) rather than user-authored text.
    #[serde(rename = "isSystem", default)]
    pub is_system: bool,
}

impl Message {
    /// User-authored message.
    pub fn user(
        id: MessageId,
        author: impl Into<String>,
        text: impl Into<String>,
        sent_at: impl Into<String>,
    ) -> Self {
        Self { id, author: author.into(), text: text.into(), sent_at: sent_at.into(), is_system: false }
    }

    /// System notice.
    pub fn system(
        id: MessageId,
        author: impl Into<String>,
        text: impl Into<String>,
        sent_at: impl Into<String>,
    ) -> Self {
        Self { id, author: author.into(), text: text.into(), sent_at: sent_at.into(), is_system: true }
    }
}
