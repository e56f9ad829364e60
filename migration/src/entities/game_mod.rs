//! 已注册 mod 实体

use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq)]
#[sea_orm(table_name = "mods")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    #[sea_orm(unique)]
    pub mod_id: String,
    pub mod_name: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::telemetry::Entity")]
    Telemetry,
}

impl Related<super::telemetry::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Telemetry.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
