// Services layer - Pure logic with no database access
pub mod crypto;
pub mod draft_registry;
pub mod policy;
pub mod token_service;
pub mod user_form;

pub use draft_registry::DraftRegistry;
pub use token_service::TokenService;
