//! `scout` crate (library surface).
//!
//! The primary entrypoint for end users is the `scout` binary (CLI + MCP stdio + HTTP).
//! This library module exists so embedders can reach the search types and the
//! reqwest-backed providers without depending on internal crate layout.

pub use scout_core as core;
pub use scout_local as local;
