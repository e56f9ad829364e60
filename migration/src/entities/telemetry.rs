//! 聚合计数的使用记录实体
//!
//! 主键为 (mod_id, game_version, mod_version, loader)。

use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq)]
#[sea_orm(table_name = "telemetry")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub mod_id: i32,
    #[sea_orm(primary_key, auto_increment = false)]
    pub game_version: String,
    #[sea_orm(primary_key, auto_increment = false)]
    pub mod_version: String,
    #[sea_orm(primary_key, auto_increment = false)]
    pub loader: String,
    pub count: i64,
    pub last_used: Date,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::game_mod::Entity",
        from = "Column::ModId",
        to = "super::game_mod::Column::Id",
        on_update = "Cascade",
        on_delete = "Cascade"
    )]
    GameMod,
}

impl Related<super::game_mod::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::GameMod.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
