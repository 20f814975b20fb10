pub mod error;
pub mod library;
pub mod parser;
pub mod preprocess;
pub mod reorder;
pub mod session;
