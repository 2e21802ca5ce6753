//! Workspace-level test package for specvs.
//!
//! This crate exists only to host the BDD scenarios in `tests/cucumber.rs`
//! (driven by `features/*.feature`) and the cross-crate tests in
//! `tests/integration/`.
//!
//! The functionality lives in the member crates:
//! - `specvs-types`: products, reports and the registry file schema
//! - `specvs-normalize`: value resolution, normalizers and display formatters
//! - `specvs-domain`: the I/O-free comparison engine
//! - `specvs-config`: registry loading and the built-in scooter registry
//! - `specvs-app`: use cases and Markdown rendering
//! - `specvs` (specvs-cli): command-line interface
