pub use super::ubiquo_roles::Entity as UbiquoRoles;
pub use super::ubiquo_settings::Entity as UbiquoSettings;
pub use super::ubiquo_user_roles::Entity as UbiquoUserRoles;
pub use super::ubiquo_users::Entity as UbiquoUsers;
