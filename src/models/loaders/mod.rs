pub mod json_loader;

pub use json_loader::{load_lecture_json, parse_lecture_json};
