// Stores - database access layer
pub mod credential_store;
pub mod role_store;
pub mod user_store;

pub use credential_store::CredentialStore;
pub use role_store::RoleStore;
pub use user_store::UserStore;
