//! Cross-crate integration tests: registry file → engine → rendered output.

mod builtin_registry;
mod properties;
