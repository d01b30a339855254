// handlers/mod.rs - handler tiers
//
// Public (no session) -> Protected (session + role extractors) -> Pages (view
// models behind the edge route guard)

pub mod pages;
pub mod protected;
pub mod public;
