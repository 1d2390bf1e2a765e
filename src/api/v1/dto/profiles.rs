/*
 * Responsibility
 * - Profiles の request/response DTO
 * - validation (形式チェック) 用の validate()
 */
use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use uuid::Uuid;

use crate::repos::{NewProfile, ProfilePatch, ProfileRecord};

const NAME_MAX_LEN: usize = 150;
const AVATAR_MAX_LEN: usize = 256;

#[derive(Debug, Deserialize)]
pub struct CreateProfileRequest {
    pub id: Uuid,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub native_language: Option<String>,
    pub avatar: Option<String>,
    pub settings: Option<Value>,
}

impl CreateProfileRequest {
    pub fn validate(&self) -> Result<(), &'static str> {
        validate_name(self.first_name.as_deref(), "first_name must be <= 150 chars")?;
        validate_name(self.last_name.as_deref(), "last_name must be <= 150 chars")?;
        validate_language(self.native_language.as_deref())?;
        validate_avatar(self.avatar.as_deref())?;
        validate_settings(self.settings.as_ref())?;
        Ok(())
    }

    pub fn into_new_profile(self) -> NewProfile {
        NewProfile {
            id: self.id,
            first_name: self.first_name,
            last_name: self.last_name,
            native_language: self.native_language,
            avatar: self.avatar,
            settings: self.settings.unwrap_or_else(|| Value::Object(Default::default())),
        }
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct UpdateProfileRequest {
    // Tri-state:
    // - None: field missing (do not update)
    // - Some(None): null (set NULL)
    // - Some(Some(v)): set value
    #[serde(default, deserialize_with = "nullable")]
    pub first_name: Option<Option<String>>,
    #[serde(default, deserialize_with = "nullable")]
    pub last_name: Option<Option<String>>,
    #[serde(default, deserialize_with = "nullable")]
    pub native_language: Option<Option<String>>,
    #[serde(default, deserialize_with = "nullable")]
    pub avatar: Option<Option<String>>,
    pub settings: Option<Value>,
}

// Plain `Option<Option<T>>` collapses `null` into `None`; keep it as `Some(None)`.
fn nullable<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

fn set_value(field: &Option<Option<String>>) -> Option<&str> {
    field.as_ref().and_then(|v| v.as_deref())
}

impl UpdateProfileRequest {
    pub fn validate(&self) -> Result<(), &'static str> {
        validate_name(set_value(&self.first_name), "first_name must be <= 150 chars")?;
        validate_name(set_value(&self.last_name), "last_name must be <= 150 chars")?;
        validate_language(set_value(&self.native_language))?;
        validate_avatar(set_value(&self.avatar))?;
        validate_settings(self.settings.as_ref())?;
        Ok(())
    }

    pub fn into_patch(self) -> ProfilePatch {
        ProfilePatch {
            first_name: self.first_name,
            last_name: self.last_name,
            native_language: self.native_language,
            avatar: self.avatar,
            settings: self.settings,
        }
    }
}

fn validate_name(value: Option<&str>, err: &'static str) -> Result<(), &'static str> {
    match value {
        Some(v) if v.chars().count() > NAME_MAX_LEN => Err(err),
        _ => Ok(()),
    }
}

// Language tag, e.g. "en", "pt-BR", "zh-Hant-TW".
fn validate_language(value: Option<&str>) -> Result<(), &'static str> {
    let Some(tag) = value else {
        return Ok(());
    };

    let well_formed = (2..=16).contains(&tag.len())
        && tag.chars().all(|c| c.is_ascii_alphanumeric() || c == '-')
        && !tag.starts_with('-')
        && !tag.ends_with('-');

    if well_formed {
        Ok(())
    } else {
        Err("native_language must be a language tag like 'en' or 'pt-BR'")
    }
}

fn validate_avatar(value: Option<&str>) -> Result<(), &'static str> {
    match value {
        Some(v) if v.trim().is_empty() => Err("avatar cannot be empty"),
        Some(v) if v.len() > AVATAR_MAX_LEN => Err("avatar must be <= 256 chars"),
        _ => Ok(()),
    }
}

fn validate_settings(value: Option<&Value>) -> Result<(), &'static str> {
    match value {
        Some(v) if !v.is_object() => Err("settings must be a JSON object"),
        _ => Ok(()),
    }
}

#[derive(Debug, Serialize)]
pub struct ProfileResponse {
    pub id: Uuid,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub native_language: Option<String>,
    pub avatar: Option<String>,
    pub settings: Value,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<ProfileRecord> for ProfileResponse {
    fn from(row: ProfileRecord) -> Self {
        Self {
            id: row.id,
            first_name: row.first_name,
            last_name: row.last_name,
            native_language: row.native_language,
            avatar: row.avatar,
            settings: row.settings,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}
