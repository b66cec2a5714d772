//! JSON serialization for the files the client writes.
//!
//! Output is stable so session and settings files diff cleanly:
//! 2-space indentation, trailing newline, UTF-8 without BOM.

mod json;

pub use json::*;
