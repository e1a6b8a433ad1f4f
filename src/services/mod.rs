pub mod crypto;
pub use crypto::PasswordDigest;

pub mod auth_service;
pub mod auth_service_impl;
pub use auth_service::{AuthError, AuthService, FirstAdminOutcome};
pub use auth_service_impl::SeaOrmAuthService;

pub mod settings_service;
pub mod settings_service_impl;
pub use settings_service::{SettingError, SettingsService};
pub use settings_service_impl::SeaOrmSettingsService;
