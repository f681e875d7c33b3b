pub mod archive;
pub mod backends;
