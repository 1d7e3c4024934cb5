//! # groupfeed
//!
//! Turns captured group-feed GraphQL responses into a flat, deduplicated
//! set of posts and comments and writes it as CSV.
//!
//! ## Architecture
//!
//! ```text
//! CaptureReader → ScrapeSession → Normalizer → Store → CsvExporter
//! ```
//!
//! - [`capture`]: Reads intercepted request/response pairs (HAR or capture log)
//! - [`normalizer`]: Extracts canonical records from shifting JSON layouts
//! - [`store`]: Admits each post and comment once per id
//! - [`export`]: Flattens records to 16-column CSV rows
//!
//! ## Quick Start
//!
//! ```bash
//! # Export everything found in a devtools HAR file
//! groupfeed export session.har -o posts_comments.csv
//!
//! # Keep progress between runs
//! groupfeed export part1.har --resume scrape.db
//! groupfeed export part2.har --resume scrape.db
//!
//! # See what a single response body yields
//! groupfeed parse --kind comments response.json
//! ```

/// Scrape session and error types.
///
/// [`ScrapeSession`](app::ScrapeSession) owns the store for one run and
/// enforces the post cap.
pub mod app;

/// Capture file readers.
///
/// - [`CaptureReader`](capture::CaptureReader): Async trait for capture sources
/// - [`FileCaptureReader`](capture::FileCaptureReader): HAR and capture-log files
/// - [`ParallelLoader`](capture::ParallelLoader): Concurrent ingestion with a semaphore
pub mod capture;

/// Command-line interface using clap.
///
/// - `export <captures>...` - Write posts and comments to CSV
/// - `inspect <captures>...` - Print parsed records
/// - `parse --kind <kind> <body>` - Normalize one raw body
pub mod cli;

/// Configuration loaded from `~/.config/groupfeed/config.toml`.
pub mod config;

/// Core domain models.
///
/// - [`Post`](domain::Post) and [`Comment`](domain::Comment) with derived contact fields
/// - [`PostStub`](domain::PostStub): page-derived posts
pub mod domain;

/// CSV export of flattened records.
pub mod export;

/// Response parsing.
///
/// Converts feed and focused-comment payloads, single documents or
/// newline-delimited streams, into [`Post`](domain::Post) and
/// [`Comment`](domain::Comment) records.
pub mod normalizer;

/// Record stores.
///
/// - [`Store`](store::Store): Trait defining admission and listing
/// - [`MemoryStore`](store::MemoryStore): Per-session in-memory store
/// - [`SqliteStore`](store::SqliteStore): Resumable SQLite store
pub mod store;
