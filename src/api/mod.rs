// API endpoints
pub mod auth;
pub mod health;
pub mod helpers;
pub mod users;

pub use auth::{AuthApi, BearerAuth};
pub use health::HealthApi;
pub use users::ManageUsersApi;
