//! Participant identity.

use openchat_proto::Message;

use crate::{env::Environment, error::SessionError};

/// Longest accepted display name, in characters.
pub const MAX_DISPLAY_NAME_CHARS: usize = 20;

/// Length of the random suffix of generated participant ids.
const PARTICIPANT_SUFFIX_LEN: usize = 9;

const BASE36: &[u8; 36] = b"0123456789abcdefghijklmnopqrstuvwxyz";

/// Identity of this participant for one process lifetime.
///
/// # Invariants
///
/// - Immutability: neither field changes after construction.
/// - `display_name` is trimmed, non-empty and at most
///   [`MAX_DISPLAY_NAME_CHARS`] characters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    participant_id: String,
    display_name: String,
}

impl Session {
    /// Create a session from a generated participant id and a user-supplied
    /// display name.
    ///
    /// # Errors
    ///
    /// - `SessionError::EmptyDisplayName` if the name is blank
    /// - `SessionError::DisplayNameTooLong` if the trimmed name exceeds
    ///   [`MAX_DISPLAY_NAME_CHARS`]
    pub fn new(participant_id: impl Into<String>, display_name: &str) -> Result<Self, SessionError> {
        let display_name = Self::validate_display_name(display_name)?.to_string();
        Ok(Self { participant_id: participant_id.into(), display_name })
    }

    /// Trim and validate a display name without creating a session.
    ///
    /// Presentation layers use this to reject input before dispatching a join.
    pub fn validate_display_name(name: &str) -> Result<&str, SessionError> {
        let trimmed = name.trim();
        if trimmed.is_empty() {
            return Err(SessionError::EmptyDisplayName);
        }

        let len = trimmed.chars().count();
        if len > MAX_DISPLAY_NAME_CHARS {
            return Err(SessionError::DisplayNameTooLong { len, max: MAX_DISPLAY_NAME_CHARS });
        }

        Ok(trimmed)
    }

    /// Generate a participant id: `user_<unix millis>_<9 base36 chars>`.
    pub fn generate_participant_id<E: Environment>(env: &E) -> String {
        let millis = env.wall_clock().timestamp_millis();
        let mut random = env.random_u64();

        let mut suffix = String::with_capacity(PARTICIPANT_SUFFIX_LEN);
        for _ in 0..PARTICIPANT_SUFFIX_LEN {
            suffix.push(char::from(BASE36[(random % 36) as usize]));
            random /= 36;
        }

        format!("user_{millis}_{suffix}")
    }

    /// Participant id, stable for the process lifetime.
    pub fn participant_id(&self) -> &str {
        &self.participant_id
    }

    /// Display name chosen at join.
    pub fn display_name(&self) -> &str {
        &self.display_name
    }

    /// True for user-authored messages carrying this session's display name.
    ///
    /// The relay carries no sender identity beyond the display name, so two
    /// participants sharing a name see each other's messages as their own.
    pub fn is_own(&self, message: &Message) -> bool {
        !message.is_system && message.author == self.display_name
    }
}
