pub mod legacy;
pub mod message;
pub mod settings;

pub use legacy::{CharacterData, CharacterRecord, GroupRecord, LegacySettings};
pub use message::{hidden_count, Message};
pub use settings::{
    EffectiveSettings, EntityId, EntitySettings, GlobalHideSettings, Mode, RootSettings,
};
