#![warn(missing_docs)]

//! <div class="warning">
//!
//! Note: API is unstable, and may change in `0.x` versions.
//!
//! </div>
//!
//! # As a library
//!
//! As a library, usually you prefer to use [`api`] to query the Derpibooru
//! search API and [`fetcher`] to download and verify the images it returns.
//!
//! See [`fetcher::Fetcher#example`] for example.
//!
//! # As a binary
//!
//! In addition to the above, you also need [`cli`] to build the command line.
//!
//! See `main.rs` to know how to assemble these modules as a binary.

pub mod api;
pub mod cli;
pub mod fetcher;

pub mod config;
pub mod download;
pub mod hash;
pub mod logging;
pub mod tool;
