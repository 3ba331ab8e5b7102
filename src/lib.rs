//! Subhunt - Subtitle Locator and Downloader
//!
//! Subhunt finds subtitles for video files. It parses release names into
//! structured information, queries subtitle services concurrently, merges
//! their candidate streams, and keeps the best-ranked candidate per file
//! and language before downloading it next to the video.

pub mod cli;
pub mod config;
pub mod error;
pub mod guess;
pub mod rank;
pub mod service;
pub mod target;
pub mod unify;
pub mod workflow;
