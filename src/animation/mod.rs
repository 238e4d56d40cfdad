pub mod ease;
pub mod kinetic;
