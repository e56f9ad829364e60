//! mods 表迁移
//!
//! 已注册的 mod 目录：外部分配的 `mod_id`（唯一）与显示名称。

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Mods::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Mods::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(Mods::ModId)
                            .string_len(50)
                            .not_null()
                            .unique_key(),
                    )
                    .col(ColumnDef::new(Mods::ModName).string_len(100).not_null())
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Mods::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
pub(crate) enum Mods {
    #[sea_orm(iden = "mods")]
    Table,
    Id,
    ModId,
    ModName,
}
