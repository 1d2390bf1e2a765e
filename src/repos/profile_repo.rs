/*
 * Responsibility
 * - profiles テーブル向け SQLx 操作
 * - ProfileStore trait の Postgres 実装
 * - DB エラーは RepoError に変換して返す
 */
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde_json::Value;
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

use crate::repos::error::RepoError;

#[derive(Debug, Clone, PartialEq, FromRow)]
pub struct ProfileRecord {
    pub id: Uuid,
    #[sqlx(rename = "firstName")]
    pub first_name: Option<String>,
    #[sqlx(rename = "lastName")]
    pub last_name: Option<String>,
    #[sqlx(rename = "nativeLanguage")]
    pub native_language: Option<String>,
    pub avatar: Option<String>,
    pub settings: Value,
    #[sqlx(rename = "createdAt")]
    pub created_at: DateTime<Utc>,
    #[sqlx(rename = "updatedAt")]
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewProfile {
    pub id: Uuid,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub native_language: Option<String>,
    pub avatar: Option<String>,
    pub settings: Value,
}

/// Partial update.
///
/// Nullable columns are tri-state:
/// - None: do not update
/// - Some(None): set NULL
/// - Some(Some(v)): set v
#[derive(Debug, Clone, Default)]
pub struct ProfilePatch {
    pub first_name: Option<Option<String>>,
    pub last_name: Option<Option<String>>,
    pub native_language: Option<Option<String>>,
    pub avatar: Option<Option<String>>,
    pub settings: Option<Value>,
}

/// Profile persistence used by the HTTP handlers.
///
/// Implementations must be cheap to share (`Arc<dyn ProfileStore>` in AppState).
#[async_trait]
pub trait ProfileStore: Send + Sync + 'static {
    // Returns `RepoError::NotFound` when no profile has this id.
    async fn get(&self, id: Uuid) -> Result<ProfileRecord, RepoError>;

    // Returns `RepoError::Conflict` when the id is already taken.
    async fn create(&self, profile: NewProfile) -> Result<ProfileRecord, RepoError>;

    async fn update(&self, id: Uuid, patch: ProfilePatch) -> Result<ProfileRecord, RepoError>;
}

const COLUMNS: &str = r#""id", "firstName", "lastName", "nativeLanguage", "avatar", "settings", "createdAt", "updatedAt""#;

#[derive(Clone, Debug)]
pub struct PgProfileStore {
    db: PgPool,
}

impl PgProfileStore {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }
}

#[async_trait]
impl ProfileStore for PgProfileStore {
    async fn get(&self, id: Uuid) -> Result<ProfileRecord, RepoError> {
        let row = sqlx::query_as::<_, ProfileRecord>(&format!(
            r#"
            SELECT {COLUMNS}
            FROM profiles
            WHERE "id" = $1
            "#
        ))
        .bind(id)
        .fetch_optional(&self.db)
        .await?;

        row.ok_or(RepoError::NotFound)
    }

    async fn create(&self, profile: NewProfile) -> Result<ProfileRecord, RepoError> {
        let row = sqlx::query_as::<_, ProfileRecord>(&format!(
            r#"
            INSERT INTO profiles ("id", "firstName", "lastName", "nativeLanguage", "avatar", "settings")
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING {COLUMNS}
            "#
        ))
        .bind(profile.id)
        .bind(profile.first_name)
        .bind(profile.last_name)
        .bind(profile.native_language)
        .bind(profile.avatar)
        .bind(profile.settings)
        .fetch_one(&self.db)
        .await
        .map_err(RepoError::from_sqlx)?;

        Ok(row)
    }

    async fn update(&self, id: Uuid, patch: ProfilePatch) -> Result<ProfileRecord, RepoError> {
        // Each nullable column gets a (flag, value) pair: flag = false keeps the current value.
        let row = sqlx::query_as::<_, ProfileRecord>(&format!(
            r#"
            UPDATE profiles
            SET
                "firstName" = CASE WHEN $2 THEN $3 ELSE "firstName" END,
                "lastName" = CASE WHEN $4 THEN $5 ELSE "lastName" END,
                "nativeLanguage" = CASE WHEN $6 THEN $7 ELSE "nativeLanguage" END,
                "avatar" = CASE WHEN $8 THEN $9 ELSE "avatar" END,
                "settings" = COALESCE($10, "settings"),
                "updatedAt" = now()
            WHERE "id" = $1
            RETURNING {COLUMNS}
            "#
        ))
        .bind(id)
        .bind(patch.first_name.is_some())
        .bind(patch.first_name.flatten())
        .bind(patch.last_name.is_some())
        .bind(patch.last_name.flatten())
        .bind(patch.native_language.is_some())
        .bind(patch.native_language.flatten())
        .bind(patch.avatar.is_some())
        .bind(patch.avatar.flatten())
        .bind(patch.settings)
        .fetch_optional(&self.db)
        .await
        .map_err(RepoError::from_sqlx)?;

        row.ok_or(RepoError::NotFound)
    }
}
