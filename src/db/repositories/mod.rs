pub mod setting;
pub mod user;
