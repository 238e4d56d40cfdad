pub mod decode;
pub mod image;
pub mod material;
pub mod text;
