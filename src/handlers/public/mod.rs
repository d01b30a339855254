// handlers/public/mod.rs - Public handlers (no session required)
//
// Login, logout, whoami, the client route guard, directory search and the
// visitor contact form.

pub mod auth;
pub mod directory;
pub mod health;

pub use auth::{login_post, logout_post, route_get, session_get};
pub use directory::{lawyer_get, lawyers_get, request_post};
pub use health::health_get;
