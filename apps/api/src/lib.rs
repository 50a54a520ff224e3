//! Heuristic CV parser: turns extracted résumé text into a structured record,
//! with the HTTP API and CLI that front it.

pub mod config;
pub mod errors;
pub mod extraction;
pub mod models;
pub mod parser;
pub mod routes;
pub mod state;

pub use errors::{AppError, ParserError};
pub use models::cv::CvRecord;
pub use parser::CvParser;
