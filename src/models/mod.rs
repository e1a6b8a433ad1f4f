pub mod setting;
pub mod user;
pub mod validation;

pub use setting::IntegerSetting;
pub use user::UbiquoUser;
pub use validation::{FieldError, ValidationErrors};
