pub mod error;
pub mod manifest;
