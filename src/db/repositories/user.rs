use anyhow::{Context, Result};
use sea_orm::sea_query::{Expr, Func};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, DatabaseConnection, DatabaseTransaction, DbErr,
    EntityTrait, NotSet, PaginatorTrait, QueryFilter, QueryOrder, Set, SqlErr, TransactionTrait,
};
use std::collections::HashMap;

use crate::entities::{prelude::*, ubiquo_roles, ubiquo_user_roles, ubiquo_users};
use crate::models::user::UbiquoUser;

/// Filters for listing users. Unset fields do not restrict the result.
#[derive(Debug, Clone, Default)]
pub struct UserFilter {
    /// Substring matched against name, surname and login
    pub text: Option<String>,
    pub admin: Option<bool>,
    pub active: Option<bool>,
}

/// Field whose unique index rejected a write.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UniqueField {
    Login,
    Email,
}

impl UniqueField {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Login => "login",
            Self::Email => "email",
        }
    }
}

/// Maps a storage error to the unique user column it violated, if any.
#[must_use]
pub fn unique_violation(err: &anyhow::Error) -> Option<UniqueField> {
    let db_err = err.downcast_ref::<DbErr>()?;
    match db_err.sql_err()? {
        SqlErr::UniqueConstraintViolation(message) if message.contains("login") => {
            Some(UniqueField::Login)
        }
        SqlErr::UniqueConstraintViolation(message) if message.contains("email") => {
            Some(UniqueField::Email)
        }
        _ => None,
    }
}

pub struct UserRepository {
    conn: DatabaseConnection,
}

impl UserRepository {
    #[must_use]
    pub const fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }

    pub async fn count(&self) -> Result<u64> {
        UbiquoUsers::find()
            .count(&self.conn)
            .await
            .context("Failed to count users")
    }

    pub async fn get_by_id(&self, id: i32) -> Result<Option<UbiquoUser>> {
        let user = UbiquoUsers::find_by_id(id)
            .one(&self.conn)
            .await
            .context("Failed to query user by ID")?;

        self.with_roles(user).await
    }

    /// Exact, case-sensitive lookup by login
    pub async fn get_by_login(&self, login: &str) -> Result<Option<UbiquoUser>> {
        let user = UbiquoUsers::find()
            .filter(ubiquo_users::Column::Login.eq(login))
            .one(&self.conn)
            .await
            .context("Failed to query user by login")?;

        self.with_roles(user).await
    }

    pub async fn get_by_remember_token(&self, token: &str) -> Result<Option<UbiquoUser>> {
        let user = UbiquoUsers::find()
            .filter(ubiquo_users::Column::RememberToken.eq(token))
            .one(&self.conn)
            .await
            .context("Failed to query user by remember token")?;

        self.with_roles(user).await
    }

    /// Case-insensitive check used before saving; `exclude_id` skips the
    /// record being updated.
    pub async fn is_taken(
        &self,
        field: UniqueField,
        value: &str,
        exclude_id: Option<i32>,
    ) -> Result<bool> {
        let column = match field {
            UniqueField::Login => ubiquo_users::Column::Login,
            UniqueField::Email => ubiquo_users::Column::Email,
        };

        let mut query = UbiquoUsers::find()
            .filter(Expr::expr(Func::lower(Expr::col(column))).eq(Func::lower(Expr::val(value))));

        if let Some(id) = exclude_id {
            query = query.filter(ubiquo_users::Column::Id.ne(id));
        }

        let count = query
            .count(&self.conn)
            .await
            .with_context(|| format!("Failed to check {} uniqueness", field.as_str()))?;

        Ok(count > 0)
    }

    pub async fn list(&self, filter: &UserFilter) -> Result<Vec<UbiquoUser>> {
        let mut query = UbiquoUsers::find().order_by_asc(ubiquo_users::Column::Id);

        if let Some(text) = filter.text.as_deref().filter(|t| !t.is_empty()) {
            query = query.filter(
                Condition::any()
                    .add(ubiquo_users::Column::Name.contains(text))
                    .add(ubiquo_users::Column::Surname.contains(text))
                    .add(ubiquo_users::Column::Login.contains(text)),
            );
        }

        if let Some(admin) = filter.admin {
            query = query.filter(ubiquo_users::Column::IsAdmin.eq(admin));
        }

        if let Some(active) = filter.active {
            query = query.filter(ubiquo_users::Column::IsActive.eq(active));
        }

        let models = query
            .all(&self.conn)
            .await
            .context("Failed to list users")?;

        let ids: Vec<i32> = models.iter().map(|m| m.id).collect();
        let mut roles_by_user: HashMap<i32, Vec<i32>> = HashMap::new();
        if !ids.is_empty() {
            let links = UbiquoUserRoles::find()
                .filter(ubiquo_user_roles::Column::UbiquoUserId.is_in(ids))
                .order_by_asc(ubiquo_user_roles::Column::UbiquoRoleId)
                .all(&self.conn)
                .await
                .context("Failed to load user roles")?;

            for link in links {
                roles_by_user
                    .entry(link.ubiquo_user_id)
                    .or_default()
                    .push(link.ubiquo_role_id);
            }
        }

        Ok(models
            .into_iter()
            .map(|m| {
                let role_ids = roles_by_user.remove(&m.id).unwrap_or_default();
                UbiquoUser::from_model(m, role_ids)
            })
            .collect())
    }

    /// Inserts or updates `user` together with its role links and returns
    /// the stored record. Credentials must already have been digested.
    pub async fn save(&self, user: &UbiquoUser) -> Result<UbiquoUser> {
        let now = chrono::Utc::now().to_rfc3339();
        let txn = self
            .conn
            .begin()
            .await
            .context("Failed to start user transaction")?;

        let mut active = ubiquo_users::ActiveModel {
            id: user.id.map_or(NotSet, Set),
            login: Set(user.login.clone()),
            email: Set(user.email.clone()),
            name: Set(user.name.clone()),
            surname: Set(user.surname.clone()),
            crypted_password: Set(user.crypted_password.clone()),
            salt: Set(user.salt.clone()),
            remember_token: Set(user.remember_token.clone()),
            remember_token_expires_at: Set(user.remember_token_expires_at),
            is_admin: Set(user.is_admin),
            is_active: Set(user.is_active),
            is_superadmin: Set(user.is_superadmin),
            locale: Set(user.locale.clone()),
            photo_file_name: Set(user.photo_file_name.clone()),
            created_at: NotSet,
            updated_at: Set(now.clone()),
        };

        let model = if user.is_new_record() {
            active.created_at = Set(now);
            active.insert(&txn).await?
        } else {
            active.update(&txn).await?
        };

        replace_roles(&txn, model.id, &user.role_ids).await?;
        txn.commit()
            .await
            .context("Failed to commit user transaction")?;

        let mut role_ids = user.role_ids.clone();
        role_ids.sort_unstable();
        role_ids.dedup();
        Ok(UbiquoUser::from_model(model, role_ids))
    }

    pub async fn ensure_role(&self, name: &str) -> Result<i32> {
        let existing = UbiquoRoles::find()
            .filter(ubiquo_roles::Column::Name.eq(name))
            .one(&self.conn)
            .await
            .context("Failed to query role by name")?;

        if let Some(role) = existing {
            return Ok(role.id);
        }

        let role = ubiquo_roles::ActiveModel {
            name: Set(name.to_string()),
            ..Default::default()
        }
        .insert(&self.conn)
        .await
        .context("Failed to create role")?;

        Ok(role.id)
    }

    pub async fn list_roles(&self) -> Result<Vec<ubiquo_roles::Model>> {
        UbiquoRoles::find()
            .order_by_asc(ubiquo_roles::Column::Id)
            .all(&self.conn)
            .await
            .context("Failed to list roles")
    }

    async fn role_ids(&self, user_id: i32) -> Result<Vec<i32>> {
        let links = UbiquoUserRoles::find()
            .filter(ubiquo_user_roles::Column::UbiquoUserId.eq(user_id))
            .order_by_asc(ubiquo_user_roles::Column::UbiquoRoleId)
            .all(&self.conn)
            .await
            .context("Failed to load user roles")?;

        Ok(links.into_iter().map(|l| l.ubiquo_role_id).collect())
    }

    async fn with_roles(&self, user: Option<ubiquo_users::Model>) -> Result<Option<UbiquoUser>> {
        let Some(model) = user else {
            return Ok(None);
        };
        let role_ids = self.role_ids(model.id).await?;
        Ok(Some(UbiquoUser::from_model(model, role_ids)))
    }
}

async fn replace_roles(txn: &DatabaseTransaction, user_id: i32, role_ids: &[i32]) -> Result<()> {
    UbiquoUserRoles::delete_many()
        .filter(ubiquo_user_roles::Column::UbiquoUserId.eq(user_id))
        .exec(txn)
        .await
        .context("Failed to clear user roles")?;

    let mut role_ids = role_ids.to_vec();
    role_ids.sort_unstable();
    role_ids.dedup();
    if role_ids.is_empty() {
        return Ok(());
    }

    let links = role_ids.into_iter().map(|role_id| ubiquo_user_roles::ActiveModel {
        ubiquo_user_id: Set(user_id),
        ubiquo_role_id: Set(role_id),
    });
    UbiquoUserRoles::insert_many(links)
        .exec(txn)
        .await
        .context("Failed to link user roles")?;

    Ok(())
}
