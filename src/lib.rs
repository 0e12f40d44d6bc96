//! Consult Recorder - medical consultation recording client
//!
//! This crate records consultation audio from the microphone, pairs it with
//! patient metadata, and talks to the consultation backend for accounts,
//! patient records and PDF summaries.
//!
//! # Architecture
//!
//! The crate follows hexagonal (ports & adapters) architecture:
//!
//! - **Domain**: Value objects, entities, the session state enum, and errors
//! - **Application**: The recording session controller, use cases, and port traits
//! - **Infrastructure**: Adapters (cpal microphone, tokio clock, filesystem, HTTP backend)
//! - **CLI**: Command-line interface, argument parsing, and output formatting

pub mod application;
pub mod cli;
pub mod domain;
pub mod infrastructure;
