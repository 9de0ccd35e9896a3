//! System notice catalog.

use std::{fmt, str::FromStr};

use thiserror::Error;

/// Language of system notices.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Locale {
    /// English notices.
    #[default]
    English,
    /// Japanese notices.
    Japanese,
}

impl Locale {
    /// Author name shown on system notices.
    pub fn system_author(self) -> &'static str {
        match self {
            Self::English => "System",
            Self::Japanese => "システム",
        }
    }

    /// Notice announcing that `name` joined.
    pub fn joined(self, name: &str) -> String {
        match self {
            Self::English => format!("{name} joined the chat"),
            Self::Japanese => format!("{name}さんが参加しました"),
        }
    }

    /// Notice announcing that `name` left.
    pub fn left(self, name: &str) -> String {
        match self {
            Self::English => format!("{name} left the chat"),
            Self::Japanese => format!("{name}さんが退出しました"),
        }
    }

    /// Notice explaining that messages stay on this device.
    pub fn local_only(self) -> &'static str {
        match self {
            Self::English => "Running in local mode (messages stay on this device)",
            Self::Japanese => "ローカルモードで動作中（この端末のみ）",
        }
    }

    /// Short language tag.
    pub fn tag(self) -> &'static str {
        match self {
            Self::English => "en",
            Self::Japanese => "ja",
        }
    }
}

impl fmt::Display for Locale {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

/// Unrecognized locale tag.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("unknown locale {0:?} (expected \"en\" or \"ja\")")]
pub struct UnknownLocale(pub String);

impl FromStr for Locale {
    type Err = UnknownLocale;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "en" | "english" => Ok(Self::English),
            "ja" | "japanese" => Ok(Self::Japanese),
            _ => Err(UnknownLocale(s.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_tags() {
        assert_eq!("ja".parse::<Locale>(), Ok(Locale::Japanese));
        assert_eq!("EN".parse::<Locale>(), Ok(Locale::English));
        assert!("fr".parse::<Locale>().is_err());
        assert_eq!(
            "fr".parse::<Locale>().unwrap_err().to_string(),
            r#"unknown locale "fr" (expected "en" or "ja")"#
        );
    }

    #[test]
    fn notices_embed_name() {
        assert_eq!(Locale::Japanese.joined("太郎"), "太郎さんが参加しました");
        assert!(Locale::English.left("bob").starts_with("bob"));
    }
}
