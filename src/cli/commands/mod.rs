pub mod admin;
pub mod lawyers;
pub mod migrate;
