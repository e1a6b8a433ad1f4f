mod init;
mod setting;
mod users;

pub use init::cmd_init;
pub use setting::{cmd_setting_get, cmd_setting_list, cmd_setting_set};
pub use users::{cmd_authenticate, cmd_create_admin, cmd_list_users, cmd_reset_password};
