pub mod connectivity;
pub mod generator;
pub(crate) mod layout;
pub(crate) mod outline;
pub mod piece;
