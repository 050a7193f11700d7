//! Which entity the engine is acting for, and what N is for it.

use crate::models::{EffectiveSettings, EntityId, Mode, RootSettings};

/// The active character as the host describes it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ActiveCharacter {
    pub name: Option<String>,
    pub avatar: Option<String>,
}

/// Snapshot of the host's chat context, minus the log itself.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HostContext {
    pub group_id: Option<String>,
    pub character: Option<ActiveCharacter>,
}

impl HostContext {
    pub fn for_group(group_id: impl Into<String>) -> Self {
        Self {
            group_id: Some(group_id.into()),
            character: None,
        }
    }

    pub fn for_character(avatar: impl Into<String>) -> Self {
        Self {
            group_id: None,
            character: Some(ActiveCharacter {
                name: None,
                avatar: Some(avatar.into()),
            }),
        }
    }

    /// A group wins over a character; a character without an avatar has no id.
    pub fn entity_id(&self) -> Option<EntityId> {
        if let Some(group_id) = self.group_id.as_deref().filter(|id| !id.is_empty()) {
            return Some(EntityId::group(group_id));
        }
        let character = self.character.as_ref()?;
        match character.avatar.as_deref().filter(|a| !a.is_empty()) {
            Some(avatar) => Some(EntityId::character(avatar)),
            None => {
                tracing::warn!(
                    name = character.name.as_deref().unwrap_or("unknown"),
                    "Active character has no avatar file, scope unresolvable"
                );
                None
            }
        }
    }
}

/// Anything that can describe the current chat context.
pub trait ContextSource {
    fn context(&self) -> Option<HostContext>;
}

/// Caches the host context until the next scope change.
#[derive(Debug, Default)]
pub struct ScopeResolver {
    cached: Option<HostContext>,
}

impl ScopeResolver {
    pub fn new() -> Self {
        Self::default()
    }

    /// Drop the cached context. Call on every scope-change notification.
    pub fn invalidate(&mut self) {
        self.cached = None;
    }

    pub fn context(&mut self, source: &dyn ContextSource) -> Option<&HostContext> {
        if self.cached.is_none() {
            self.cached = source.context();
        }
        self.cached.as_ref()
    }

    /// `None` means no reconciliation is possible, not "global".
    pub fn current_entity_id(&mut self, source: &dyn ContextSource) -> Option<EntityId> {
        self.context(source).and_then(HostContext::entity_id)
    }
}

/// The `{hideLastN, userConfigured}` that applies to `entity_id` under the current mode.
///
/// Global mode ignores the entity; chat mode needs one and defaults a missing record.
pub fn effective_settings(
    settings: &RootSettings,
    entity_id: Option<&EntityId>,
) -> Option<EffectiveSettings> {
    match settings.mode {
        Mode::Global => Some(EffectiveSettings::from(&settings.global_hide_settings)),
        Mode::Chat => {
            let entity_id = entity_id?;
            Some(
                settings
                    .settings_by_entity
                    .get(entity_id)
                    .map(EffectiveSettings::from)
                    .unwrap_or_default(),
            )
        }
    }
}
