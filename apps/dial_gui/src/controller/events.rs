//! Backend→UI events and error modeling for the dial shell.

use shared::domain::{Item, ItemId};

pub enum UiEvent {
    Info(String),
    SceneReadyChanged { ready: bool },
    SelectionChanged { selection: Vec<ItemId> },
    RotationSynced { item_id: ItemId, rotation: f64 },
    ItemsChanged { items: Vec<Item> },
    InteractionStarted,
    InteractionEnded,
    Error(UiError),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UiErrorCategory {
    Host,
    Session,
    Startup,
    Unknown,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UiErrorContext {
    BackendStartup,
    ReadSelection,
    SyncRotation,
    PushRotation,
    Commit,
    General,
}

#[derive(Debug, Clone)]
pub struct UiError {
    category: UiErrorCategory,
    context: UiErrorContext,
    message: String,
}

impl UiError {
    pub fn from_message(context: UiErrorContext, message: impl Into<String>) -> Self {
        let message = message.into();
        let message_lower = message.to_ascii_lowercase();
        let category = if context == UiErrorContext::BackendStartup
            || message_lower.contains("runtime")
            || message_lower.contains("startup")
        {
            UiErrorCategory::Startup
        } else if message_lower.contains("interaction") || message_lower.contains("session") {
            UiErrorCategory::Session
        } else if message_lower.contains("detached")
            || message_lower.contains("no scene host")
            || message_lower.contains("not ready")
            || message_lower.contains("not part of the scene")
        {
            UiErrorCategory::Host
        } else {
            UiErrorCategory::Unknown
        };

        Self {
            category,
            context,
            message,
        }
    }

    pub fn category(&self) -> UiErrorCategory {
        self.category
    }

    pub fn context(&self) -> UiErrorContext {
        self.context
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

pub fn err_label(category: UiErrorCategory) -> &'static str {
    match category {
        UiErrorCategory::Host => "Host",
        UiErrorCategory::Session => "Session",
        UiErrorCategory::Startup => "Startup",
        UiErrorCategory::Unknown => "Unexpected",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classifies_detached_host_failures_as_host_errors() {
        let err = UiError::from_message(
            UiErrorContext::ReadSelection,
            "Detached: no scene host attached for player_selection",
        );
        assert_eq!(err.category(), UiErrorCategory::Host);
    }

    #[test]
    fn classifies_session_exclusivity_failures_as_session_errors() {
        let err = UiError::from_message(
            UiErrorContext::PushRotation,
            "another interaction session is already live",
        );
        assert_eq!(err.category(), UiErrorCategory::Session);
    }

    #[test]
    fn startup_context_always_wins_classification() {
        let err = UiError::from_message(UiErrorContext::BackendStartup, "session gone sideways");
        assert_eq!(err.category(), UiErrorCategory::Startup);
    }
}
