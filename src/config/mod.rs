pub mod chapter;
pub mod engine;
pub mod project;
