use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "ubiquo_users")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,

    /// Unique ignoring case (enforced by `idx_ubiquo_users_login_lower`)
    pub login: String,

    /// Unique ignoring case (enforced by `idx_ubiquo_users_email_lower`)
    pub email: String,

    pub name: String,

    pub surname: String,

    /// Hex Argon2id digest of `--{salt}--{password}--`
    pub crypted_password: Option<String>,

    pub salt: Option<String>,

    pub remember_token: Option<String>,

    pub remember_token_expires_at: Option<DateTimeUtc>,

    pub is_admin: bool,

    pub is_active: bool,

    pub is_superadmin: bool,

    pub locale: Option<String>,

    pub photo_file_name: Option<String>,

    pub created_at: String,

    pub updated_at: String,
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

impl Related<super::ubiquo_roles::Entity> for Entity {
    fn to() -> RelationDef {
        super::ubiquo_user_roles::Relation::UbiquoRoles.def()
    }

    fn via() -> Option<RelationDef> {
        Some(super::ubiquo_user_roles::Relation::UbiquoUsers.def().rev())
    }
}

impl ActiveModelBehavior for ActiveModel {}
