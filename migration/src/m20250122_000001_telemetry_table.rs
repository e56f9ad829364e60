//! telemetry 表迁移
//!
//! 每个 (mod, game_version, mod_version, loader) 组合一行，`count` 为累计上报次数。
//! 删除 mod 时级联删除其 telemetry 行。

use sea_orm_migration::prelude::*;

use super::m20250115_000001_mods_table::Mods;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Telemetry::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Telemetry::ModId).integer().not_null())
                    .col(
                        ColumnDef::new(Telemetry::GameVersion)
                            .string_len(10)
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Telemetry::ModVersion)
                            .string_len(10)
                            .not_null(),
                    )
                    .col(ColumnDef::new(Telemetry::Loader).string_len(25).not_null())
                    .col(
                        ColumnDef::new(Telemetry::Count)
                            .big_integer()
                            .not_null()
                            .default(1),
                    )
                    .col(ColumnDef::new(Telemetry::LastUsed).date().not_null())
                    .primary_key(
                        Index::create()
                            .name("pk_telemetry")
                            .col(Telemetry::ModId)
                            .col(Telemetry::GameVersion)
                            .col(Telemetry::ModVersion)
                            .col(Telemetry::Loader),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_telemetry_mod")
                            .from(Telemetry::Table, Telemetry::ModId)
                            .to(Mods::Table, Mods::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // 按游戏版本聚合
        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_telemetry_game_version")
                    .table(Telemetry::Table)
                    .col(Telemetry::GameVersion)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_index(Index::drop().name("idx_telemetry_game_version").to_owned())
            .await?;

        manager
            .drop_table(Table::drop().table(Telemetry::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum Telemetry {
    #[sea_orm(iden = "telemetry")]
    Table,
    ModId,
    GameVersion,
    ModVersion,
    Loader,
    Count,
    LastUsed,
}
