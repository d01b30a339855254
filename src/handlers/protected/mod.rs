// handlers/protected/mod.rs - Protected handlers (session required)
//
// Role checks happen in the extractors (`AdminSession`, `LawyerSession`,
// `Authorized`); ownership checks happen in the services.

pub mod admin;
pub mod requests;

pub use requests::{own_requests_get, request_patch};
