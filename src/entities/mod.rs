pub mod prelude;

pub mod ubiquo_roles;
pub mod ubiquo_settings;
pub mod ubiquo_user_roles;
pub mod ubiquo_users;
