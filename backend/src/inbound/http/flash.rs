//! One-time notices carried across a redirect in the session cookie.

use serde::{Deserialize, Serialize};

/// Session key holding pending notices.
pub(crate) const FLASH_KEY: &str = "flash";

/// Notice category, rendered as a success or error banner.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlashKind {
    /// Green banner.
    Success,
    /// Red banner.
    Error,
}

/// Notices waiting for the next rendered page.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Flash {
    /// Success notices in the order they were raised.
    #[serde(default)]
    pub success: Vec<String>,
    /// Error notices in the order they were raised.
    #[serde(default)]
    pub error: Vec<String>,
}

impl Flash {
    /// Queue `message` under `kind`.
    pub fn push(&mut self, kind: FlashKind, message: impl Into<String>) {
        match kind {
            FlashKind::Success => self.success.push(message.into()),
            FlashKind::Error => self.error.push(message.into()),
        }
    }

    /// Whether nothing is queued.
    pub fn is_empty(&self) -> bool {
        self.success.is_empty() && self.error.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    fn messages_are_grouped_by_kind() {
        let mut flash = Flash::default();
        assert!(flash.is_empty());
        flash.push(FlashKind::Success, "saved");
        flash.push(FlashKind::Error, "nope");
        flash.push(FlashKind::Success, "again");
        assert_eq!(flash.success, vec!["saved", "again"]);
        assert_eq!(flash.error, vec!["nope"]);
        assert!(!flash.is_empty());
    }

    #[rstest]
    fn missing_kinds_deserialise_as_empty() {
        let flash: Flash = serde_json::from_str(r#"{"error":["x"]}"#).expect("decode");
        assert!(flash.success.is_empty());
        assert_eq!(flash.error, vec!["x"]);
    }
}
