//! Records the host keeps for characters and groups, and the per-entity settings
//! shape that older releases stored directly on them.
//!
//! Only the migration runner reads these types; the settings store never sees them.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::settings::{clamp_to_count, EntitySettings};
use crate::constants::legacy;
use crate::error::VeilError;

/// A character card as the host lists it.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CharacterRecord {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub avatar: Option<String>,
    #[serde(default)]
    pub data: Option<CharacterData>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CharacterData {
    #[serde(default)]
    pub extensions: Option<Map<String, Value>>,
}

/// A group chat as the host lists it.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GroupRecord {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub data: Option<Map<String, Value>>,
}

impl CharacterRecord {
    /// Raw legacy settings value, if the card carries one.
    pub fn legacy_settings(&self) -> Option<&Value> {
        self.data
            .as_ref()?
            .extensions
            .as_ref()?
            .get(legacy::CHARACTER_KEY)
    }
}

impl GroupRecord {
    pub fn legacy_settings(&self) -> Option<&Value> {
        self.data.as_ref()?.get(legacy::GROUP_KEY)
    }
}

/// Structurally validated legacy settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LegacySettings {
    pub hide_last_n: Option<usize>,
    pub user_configured: bool,
    pub last_processed_length: Option<usize>,
}

impl LegacySettings {
    /// Validate a raw legacy value.
    ///
    /// `Ok(None)` means the value is not a usable legacy record: not an object, or none of
    /// `hideLastN` (number), `lastProcessedLength` (number), `userConfigured === true`.
    /// A present number that is not a whole count is an error.
    pub fn from_value(value: &Value) -> Result<Option<Self>, VeilError> {
        let Some(object) = value.as_object() else {
            return Ok(None);
        };

        let hide_last_n = count_field(object, "hideLastN")?;
        let last_processed_length = count_field(object, "lastProcessedLength")?;
        let user_configured = object.get("userConfigured") == Some(&Value::Bool(true));

        if hide_last_n.is_none() && last_processed_length.is_none() && !user_configured {
            return Ok(None);
        }

        Ok(Some(Self {
            hide_last_n,
            user_configured,
            last_processed_length,
        }))
    }

    /// Copy into the store's schema, defaulting missing fields.
    pub fn into_entity_settings(self) -> EntitySettings {
        EntitySettings {
            hide_last_n: self.hide_last_n.unwrap_or(0),
            user_configured: self.user_configured,
            last_processed_length: self.last_processed_length.unwrap_or(0),
        }
    }
}

fn count_field(object: &Map<String, Value>, field: &'static str) -> Result<Option<usize>, VeilError> {
    let Some(number) = object.get(field).and_then(Value::as_f64) else {
        return Ok(None);
    };
    if number.fract() != 0.0 {
        return Err(VeilError::InvalidLegacyField {
            field,
            value: number.to_string(),
        });
    }
    Ok(Some(clamp_to_count(number)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_full_legacy_record() {
        let legacy = LegacySettings::from_value(&json!({
            "hideLastN": 5,
            "lastProcessedLength": 40,
            "userConfigured": true
        }))
        .unwrap()
        .unwrap();
        assert_eq!(
            legacy.into_entity_settings(),
            EntitySettings {
                hide_last_n: 5,
                user_configured: true,
                last_processed_length: 40
            }
        );
    }

    #[test]
    fn test_partial_record_defaults_missing_fields() {
        let legacy = LegacySettings::from_value(&json!({"hideLastN": 2}))
            .unwrap()
            .unwrap();
        let settings = legacy.into_entity_settings();
        assert_eq!(settings.hide_last_n, 2);
        assert_eq!(settings.last_processed_length, 0);
        assert!(!settings.user_configured);
    }

    #[test]
    fn test_unusable_values() {
        assert!(LegacySettings::from_value(&json!("hideLastN")).unwrap().is_none());
        assert!(LegacySettings::from_value(&json!({})).unwrap().is_none());
        assert!(LegacySettings::from_value(&json!({"userConfigured": false}))
            .unwrap()
            .is_none());
        assert!(LegacySettings::from_value(&json!({"hideLastN": "3"}))
            .unwrap()
            .is_none());
    }

    #[test]
    fn test_fractional_count_is_error() {
        let result = LegacySettings::from_value(&json!({"hideLastN": 2.5}));
        assert!(matches!(
            result,
            Err(VeilError::InvalidLegacyField { field: "hideLastN", .. })
        ));
    }

    #[test]
    fn test_record_accessors() {
        let character: CharacterRecord = serde_json::from_value(json!({
            "name": "Seraphina",
            "avatar": "seraphina.png",
            "data": {"extensions": {"hideHelperSettings": {"hideLastN": 4}}}
        }))
        .unwrap();
        assert_eq!(character.legacy_settings(), Some(&json!({"hideLastN": 4})));

        let group: GroupRecord = serde_json::from_value(json!({
            "id": "g1",
            "data": {"hideHelperSettings": {"userConfigured": true}}
        }))
        .unwrap();
        assert!(group.legacy_settings().is_some());

        let bare = CharacterRecord::default();
        assert!(bare.legacy_settings().is_none());
    }
}
