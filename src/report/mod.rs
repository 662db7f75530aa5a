pub mod console;
pub mod document;
pub mod error;
pub mod parser;
pub mod report_model;
