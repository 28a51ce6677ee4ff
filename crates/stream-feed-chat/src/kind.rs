//! Message kinds and their ordering rules.

use std::fmt;

/// What a [`crate::Message`] represents in an exchange.
///
/// Cached kinds form a fixed narrative: `CachedSelect` → `CachedBegin` →
/// `CachedWarn*` → `CachedFatal` | `CachedSuccess`. A `GeneratedResponse` always answers a
/// user transcription or a control handoff.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MessageKind {
    /// Canned response played when a manoeuvre is selected.
    CachedSelect,
    /// Canned response played once the user has taken control.
    CachedBegin,
    /// Canned warning; may repeat.
    CachedWarn,
    /// Canned response ending the manoeuvre in failure.
    CachedFatal,
    /// Canned response ending the manoeuvre in success.
    CachedSuccess,
    /// Free-form text streamed from the completion endpoint.
    GeneratedResponse,
    /// What the user said.
    UserTranscription,
    /// The user asserted control.
    UserAssertsControl,
    /// The user relinquished control.
    UserRelinquishesControl,
}

impl MessageKind {
    pub fn is_cached(self) -> bool {
        matches!(
            self,
            MessageKind::CachedSelect
                | MessageKind::CachedBegin
                | MessageKind::CachedWarn
                | MessageKind::CachedFatal
                | MessageKind::CachedSuccess
        )
    }

    pub fn is_user(self) -> bool {
        matches!(
            self,
            MessageKind::UserTranscription
                | MessageKind::UserAssertsControl
                | MessageKind::UserRelinquishesControl
        )
    }

    pub fn is_generated(self) -> bool {
        self == MessageKind::GeneratedResponse
    }

    pub fn is_control_handoff(self) -> bool {
        matches!(
            self,
            MessageKind::UserAssertsControl | MessageKind::UserRelinquishesControl
        )
    }

    /// Whether a message of this kind may directly follow `previous` in an exchange.
    ///
    /// `previous == None` means this would be the first message.
    pub fn may_follow(self, previous: Option<MessageKind>) -> bool {
        use MessageKind::*;
        match self {
            CachedSelect | UserTranscription | UserAssertsControl | UserRelinquishesControl => {
                true
            }
            CachedBegin => matches!(previous, Some(CachedSelect | UserAssertsControl)),
            CachedWarn | CachedFatal | CachedSuccess => {
                matches!(previous, Some(CachedBegin | CachedWarn))
            }
            GeneratedResponse => previous.is_some_and(MessageKind::is_user),
        }
    }

    /// Stable name, suitable for logs.
    pub fn as_str(self) -> &'static str {
        match self {
            MessageKind::CachedSelect => "CachedSelect",
            MessageKind::CachedBegin => "CachedBegin",
            MessageKind::CachedWarn => "CachedWarn",
            MessageKind::CachedFatal => "CachedFatal",
            MessageKind::CachedSuccess => "CachedSuccess",
            MessageKind::GeneratedResponse => "GeneratedResponse",
            MessageKind::UserTranscription => "UserTranscription",
            MessageKind::UserAssertsControl => "UserAssertsControl",
            MessageKind::UserRelinquishesControl => "UserRelinquishesControl",
        }
    }
}

impl fmt::Display for MessageKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
