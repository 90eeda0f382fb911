pub mod file;
pub mod mock;
pub mod system;
