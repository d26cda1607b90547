//! # Booru Tag Extractor
//!
//! Pulls categorized tags, the main image and a title out of booru post pages and keeps an eye
//! on the health of the sites it scrapes.
//!
//! The heavy lifting lives in the workspace crates; this one only exposes the HTTP boundary
//! served by `btx serve`.
pub mod server;

pub use server::{router, serve, AppState};
