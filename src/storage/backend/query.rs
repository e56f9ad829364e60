//! Query operations for SeaOrmStorage
//!
//! This module contains all read-only database operations.

use sea_orm::{ColumnTrait, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder};
use tracing::warn;

use super::SeaOrmStorage;
use super::converters::{model_to_record, model_to_registered_mod};
use crate::errors::Result;
use crate::storage::{RegisteredMod, TelemetryRecord, UsageEntry};

use migration::entities::{game_mod, telemetry};

impl SeaOrmStorage {
    /// 数据库连通性检查
    pub async fn ping(&self) -> Result<()> {
        self.db.ping().await.map_err(Into::into)
    }

    pub async fn list_mods(&self) -> Result<Vec<RegisteredMod>> {
        let models = game_mod::Entity::find()
            .order_by_asc(game_mod::Column::Id)
            .all(&self.db)
            .await?;
        Ok(models.into_iter().map(model_to_registered_mod).collect())
    }

    pub async fn find_mod(&self, mod_id: &str) -> Result<Option<RegisteredMod>> {
        let model = game_mod::Entity::find()
            .filter(game_mod::Column::ModId.eq(mod_id))
            .one(&self.db)
            .await?;
        Ok(model.map(model_to_registered_mod))
    }

    /// All usage records joined to their mods, ordered by mod then key.
    pub async fn load_usage(&self) -> Result<Vec<UsageEntry>> {
        let rows = telemetry::Entity::find()
            .find_also_related(game_mod::Entity)
            .order_by_asc(telemetry::Column::ModId)
            .order_by_asc(telemetry::Column::GameVersion)
            .order_by_asc(telemetry::Column::ModVersion)
            .order_by_asc(telemetry::Column::Loader)
            .all(&self.db)
            .await?;

        let mut entries = Vec::with_capacity(rows.len());
        for (record, owner) in rows {
            match owner {
                Some(owner) => entries.push(UsageEntry {
                    record: model_to_record(record, &owner.mod_id),
                    mod_name: owner.mod_name,
                }),
                // 外键保证不会发生
                None => warn!("Telemetry row without owning mod (mod pk {})", record.mod_id),
            }
        }
        Ok(entries)
    }

    /// Usage records belonging to one mod, highest count first.
    pub async fn load_mod_usage(&self, owner: &RegisteredMod) -> Result<Vec<TelemetryRecord>> {
        let models = telemetry::Entity::find()
            .filter(telemetry::Column::ModId.eq(owner.id))
            .order_by_desc(telemetry::Column::Count)
            .all(&self.db)
            .await?;
        Ok(models
            .into_iter()
            .map(|model| model_to_record(model, &owner.mod_id))
            .collect())
    }

    pub async fn count_mods(&self) -> Result<u64> {
        game_mod::Entity::find()
            .count(&self.db)
            .await
            .map_err(Into::into)
    }

    pub async fn count_records(&self) -> Result<u64> {
        telemetry::Entity::find()
            .count(&self.db)
            .await
            .map_err(Into::into)
    }
}
