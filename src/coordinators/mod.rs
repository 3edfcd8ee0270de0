// Coordinators - multi-store workflows behind the API surface
pub mod manage_users;

pub use manage_users::ManageUsersCoordinator;
