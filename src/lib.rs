//! # Larder
//!
//! A multi-tenant copy-on-write engine for shared collections, recipes and
//! ingredients, usable both as a standalone server and as a library.
//!
//! ## Library Usage
//!
//! ```toml
//! [dependencies]
//! larder = { version = "0.1", default-features = false }
//! ```
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use larder::config::EngineConfig;
//! use larder::cow::CowEngine;
//! use larder::store::{SqliteStore, Store};
//!
//! let store = SqliteStore::new("./data/larder.db").unwrap();
//! store.initialize().unwrap();
//!
//! let engine = CowEngine::new(Arc::new(store), EngineConfig::default());
//! let outcome = engine.cascade_copy_with_context(1, 10, 20).unwrap();
//! ```
//!
//! ## Feature Flags
//!
//! - `cli` (default): Builds the `larder` binary. Disable with `default-features = false`.

pub mod config;
pub mod cow;
pub mod error;
pub mod server;
pub mod store;
pub mod types;
