use sea_orm::entity::prelude::*;

/// Generic `context`/`key` setting row. `setting_type` names the concrete
/// setting kind that owns the serialized `value`.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "ubiquo_settings")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,

    pub context: String,

    pub key: String,

    /// JSON-serialized value; `None` when the setting is nil
    pub value: Option<String>,

    pub setting_type: String,

    pub allow_nil: bool,

    pub created_at: String,

    pub updated_at: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
