//! File I/O for scenes.
//!
//! Scenes are stored as JSON snapshots: settings plus the list of
//! type-discriminated element records.

pub mod json;

pub use json::{from_json_str, read_scene, to_json_string, write_scene};
