use serde::{Deserialize, Serialize};

/// Host notifications the runtime reacts to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HostEvent {
    /// The active chat, character or group changed.
    #[serde(rename = "chat_id_changed")]
    ChatChanged,
    MessageReceived,
    MessageSent,
    MessageDeleted,
    /// A message was regenerated or swiped in place.
    MessageSwiped,
    GenerationEnded,
    AppReady,
}

/// Which reconciliation path an event calls for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TriggerClass {
    /// Index correspondence can no longer be trusted; debounced full pass.
    Structural,
    /// The log only grew; deferred incremental pass.
    Append,
}

impl HostEvent {
    pub const ALL: [HostEvent; 7] = [
        HostEvent::ChatChanged,
        HostEvent::MessageReceived,
        HostEvent::MessageSent,
        HostEvent::MessageDeleted,
        HostEvent::MessageSwiped,
        HostEvent::GenerationEnded,
        HostEvent::AppReady,
    ];

    pub fn trigger_class(self) -> TriggerClass {
        match self {
            HostEvent::MessageReceived | HostEvent::MessageSent | HostEvent::GenerationEnded => {
                TriggerClass::Append
            }
            HostEvent::ChatChanged
            | HostEvent::MessageDeleted
            | HostEvent::MessageSwiped
            | HostEvent::AppReady => TriggerClass::Structural,
        }
    }

    /// Whether the cached host context must be dropped.
    pub fn changes_scope(self) -> bool {
        matches!(self, HostEvent::ChatChanged | HostEvent::AppReady)
    }
}
