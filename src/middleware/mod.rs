pub mod auth;
pub mod response;
pub mod route_guard;

pub use auth::{session_middleware, AdminSession, Authorized, CurrentSession, LawyerSession, SessionUser};
pub use response::{ApiResponse, ApiResult};
pub use route_guard::route_guard_middleware;
