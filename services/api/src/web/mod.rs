pub mod auth;
pub mod grocery;
pub mod middleware;
pub mod pantry;
pub mod recipes;
pub mod rest;
pub mod state;

// Re-export what the binary needs to assemble the router.
pub use middleware::require_auth;
pub use rest::ApiDoc;
pub use state::AppState;
