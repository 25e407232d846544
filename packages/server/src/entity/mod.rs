pub mod block;
pub mod uploaded_file;
