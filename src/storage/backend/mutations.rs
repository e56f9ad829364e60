//! Mutation operations for SeaOrmStorage
//!
//! Each write transaction starts with its write statement, so the store
//! takes the write lock up front instead of upgrading a read. Lock
//! contention is retried through `retry::with_retry`; returning early drops
//! the `DatabaseTransaction`, which rolls it back.

use chrono::NaiveDate;
use sea_orm::{
    ActiveModelTrait, ActiveValue::Set, ColumnTrait, DbErr, EntityTrait, ExprTrait, QueryFilter,
    SqlErr, TransactionTrait,
    sea_query::{Expr, OnConflict},
};
use tracing::{debug, info};

use super::SeaOrmStorage;
use super::converters::{model_to_record, model_to_registered_mod};
use super::retry;
use crate::errors::{Result, TelemetryError};
use crate::storage::{RegisteredMod, TelemetryRecord, UsageKey};

use migration::entities::{game_mod, telemetry};

pub const MOD_ALREADY_EXISTS: &str = "Mod already exists";
pub const MOD_DOES_NOT_EXIST: &str = "Mod does not exist";

/// 唯一约束冲突转换为 Conflict，其余为数据库错误
fn map_insert_error(err: DbErr) -> TelemetryError {
    match err.sql_err() {
        Some(SqlErr::UniqueConstraintViolation(detail)) => {
            debug!("Unique constraint violation on mod insert: {}", detail);
            TelemetryError::conflict(MOD_ALREADY_EXISTS)
        }
        _ => TelemetryError::database_operation(format!("Insert mod failed: {}", err)),
    }
}

/// 外键冲突说明 mod 在解析之后被删除
fn map_usage_error(err: DbErr) -> TelemetryError {
    match err.sql_err() {
        Some(SqlErr::ForeignKeyConstraintViolation(detail)) => {
            debug!("Mod vanished before usage upsert: {}", detail);
            TelemetryError::not_found(MOD_DOES_NOT_EXIST)
        }
        _ => TelemetryError::database_operation(format!("Upsert telemetry failed: {}", err)),
    }
}

fn increment_on_conflict(today: NaiveDate) -> OnConflict {
    OnConflict::columns([
        telemetry::Column::ModId,
        telemetry::Column::GameVersion,
        telemetry::Column::ModVersion,
        telemetry::Column::Loader,
    ])
    // 限定表名，PostgreSQL 中 count 与 EXCLUDED.count 否则有歧义
    .value(
        telemetry::Column::Count,
        Expr::col((telemetry::Entity, telemetry::Column::Count)).add(1),
    )
    .value(telemetry::Column::LastUsed, Expr::value(today))
    .to_owned()
}

impl SeaOrmStorage {
    /// Insert a new mod. The `mods.mod_id` unique index is the existence
    /// check, so concurrent registrations of one id yield exactly one row
    /// and `Conflict` for the rest.
    pub async fn insert_mod(&self, mod_id: &str, mod_name: &str) -> Result<RegisteredMod> {
        let db = &self.db;

        let model = retry::with_retry(&format!("insert_mod({})", mod_id), self.retry_config, || async {
            let txn = db.begin().await?;
            let model = game_mod::ActiveModel {
                mod_id: Set(mod_id.to_string()),
                mod_name: Set(mod_name.to_string()),
                ..Default::default()
            }
            .insert(&txn)
            .await?;
            txn.commit().await?;
            Ok::<_, DbErr>(model)
        })
        .await
        .map_err(map_insert_error)?;

        info!("Mod registered: {} ({})", model.mod_id, model.mod_name);
        Ok(model_to_registered_mod(model))
    }

    /// Record one usage ping.
    ///
    /// Inserts the composite key with `count = 1`, or increments `count` and
    /// refreshes `last_used` when the key already exists. The upsert is a
    /// single statement, so concurrent pings for the same key never lose an
    /// increment; the row is read back inside the same transaction.
    pub async fn record_usage(&self, key: &UsageKey, today: NaiveDate) -> Result<TelemetryRecord> {
        let owner = self
            .find_mod(&key.mod_id)
            .await?
            .ok_or_else(|| TelemetryError::not_found(MOD_DOES_NOT_EXIST))?;

        let db = &self.db;
        let owner_id = owner.id;

        let model = retry::with_retry(&format!("record_usage({})", key.mod_id), self.retry_config, || async {
            let txn = db.begin().await?;

            telemetry::Entity::insert(telemetry::ActiveModel {
                mod_id: Set(owner_id),
                game_version: Set(key.game_version.clone()),
                mod_version: Set(key.mod_version.clone()),
                loader: Set(key.loader.clone()),
                count: Set(1),
                last_used: Set(today),
            })
            .on_conflict(increment_on_conflict(today))
            .exec_without_returning(&txn)
            .await?;

            let model = telemetry::Entity::find_by_id((
                owner_id,
                key.game_version.clone(),
                key.mod_version.clone(),
                key.loader.clone(),
            ))
            .one(&txn)
            .await?
            .ok_or_else(|| DbErr::RecordNotFound("telemetry row missing after upsert".to_string()))?;

            txn.commit().await?;
            Ok::<_, DbErr>(model)
        })
        .await
        .map_err(map_usage_error)?;

        debug!(
            "Usage recorded: mod={} game={} version={} loader={} count={}",
            key.mod_id, model.game_version, model.mod_version, model.loader, model.count
        );
        Ok(model_to_record(model, &owner.mod_id))
    }

    /// Delete a mod; its telemetry rows go with it through the cascading
    /// foreign key. Returns whether a mod was removed.
    pub async fn delete_mod(&self, mod_id: &str) -> Result<bool> {
        let result = game_mod::Entity::delete_many()
            .filter(game_mod::Column::ModId.eq(mod_id))
            .exec(&self.db)
            .await
            .map_err(|e| TelemetryError::database_operation(format!("Delete mod failed: {}", e)))?;

        if result.rows_affected > 0 {
            info!("Mod deleted: {}", mod_id);
        }
        Ok(result.rows_affected > 0)
    }
}
