pub mod daily;
pub mod error;
pub mod merger;
pub mod parser;
pub mod rolling;
