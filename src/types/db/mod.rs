// Database entities - SeaORM models
pub mod role;
pub mod session_token;
pub mod user;
pub mod user_role;
