pub mod block;
pub mod file;
