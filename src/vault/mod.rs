//! Vault logical storage access.

pub mod client;
pub mod mounts;

pub use client::VaultStore;
pub use mounts::{rewrite_path, ResolvedPath};
