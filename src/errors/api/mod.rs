pub mod auth;
pub mod users;

pub use auth::AuthError;
pub use users::ManageUsersError;
