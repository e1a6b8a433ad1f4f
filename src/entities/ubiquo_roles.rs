use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "ubiquo_roles")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    #[sea_orm(unique)]
    pub name: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::ubiquo_user_roles::Entity")]
    UbiquoUserRoles,
}

impl Related<super::ubiquo_user_roles::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::UbiquoUserRoles.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
