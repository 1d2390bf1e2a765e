/*
 * Responsibility
 * - 永続化層の公開インターフェース
 */
pub mod error;
#[cfg(test)]
pub mod memory;
pub mod profile_repo;

pub use profile_repo::{NewProfile, PgProfileStore, ProfilePatch, ProfileRecord, ProfileStore};
