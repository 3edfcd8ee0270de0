// Internal types - not exposed over the API
pub mod actor;
pub mod auth;
pub mod draft;
pub mod role_name;
