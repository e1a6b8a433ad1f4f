use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "ubiquo_user_roles")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub ubiquo_user_id: i32,
    #[sea_orm(primary_key, auto_increment = false)]
    pub ubiquo_role_id: i32,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::ubiquo_users::Entity",
        from = "Column::UbiquoUserId",
        to = "super::ubiquo_users::Column::Id",
        on_update = "NoAction",
        on_delete = "Cascade"
    )]
    UbiquoUsers,
    #[sea_orm(
        belongs_to = "super::ubiquo_roles::Entity",
        from = "Column::UbiquoRoleId",
        to = "super::ubiquo_roles::Column::Id",
        on_update = "NoAction",
        on_delete = "Cascade"
    )]
    UbiquoRoles,
}

impl Related<super::ubiquo_users::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::UbiquoUsers.def()
    }
}

impl Related<super::ubiquo_roles::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::UbiquoRoles.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
