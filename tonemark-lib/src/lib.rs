//! # Tonemark Library
//!
//! This library provides the core logic for the Tonemark annotation tool:
//! playback-position estimation, the lagged annotation cursor, key-chord
//! capture, ToDI gesture encoding, annotation timelines, and the JSON and
//! TextGrid persistence adapters.

pub mod formats;
pub mod gesture;
pub mod playback;
pub mod session;
pub mod timeline;
pub mod timing;
pub mod todi;
