// Statistics tables and their CSV loaders.

pub mod loader;
pub mod normalize;
pub mod tables;
