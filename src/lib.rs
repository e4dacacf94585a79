//! Core library for the `fireload` CLI.
//!
//! This crate provides the building blocks used by the binary: CLI argument
//! types, configuration loading, the request template and transport, and the
//! fixed-count run engine with its progress reporter. The primary user-facing
//! interface is the `fireload` command-line application; library APIs may
//! evolve as the CLI grows.
pub mod args;
pub mod config;
pub mod engine;
pub mod error;
pub mod http;
pub mod shutdown;
