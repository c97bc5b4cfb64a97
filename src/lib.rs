//! # Boxrepo
//!
//! A multi-tenant media organizer. Users own repos, repos hold boxes, boxes
//! hold uploaded media. Every operation is checked against the caller's
//! per-repo role, and the caller's account tier caps how many repos and
//! boxes they may create.
//!
//! Usable both as a standalone binary and as a library.
//!
//! ## Library Usage
//!
//! ```toml
//! [dependencies]
//! boxrepo = { version = "0.0.1", default-features = false }
//! ```
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use std::path::PathBuf;
//! use boxrepo::blob::FsBlobStore;
//! use boxrepo::server::{AppState, create_router};
//! use boxrepo::store::SqliteStore;
//!
//! let store = SqliteStore::new("./data/boxrepo.db").unwrap();
//! store.initialize().unwrap();
//!
//! let state = Arc::new(AppState::new(
//!     Arc::new(store),
//!     Arc::new(FsBlobStore::new(&PathBuf::from("./data/media"))),
//! ));
//! let router = create_router(state);
//! // Serve with axum...
//! ```
//!
//! ## Feature Flags
//!
//! - `cli` (default): Builds the `boxrepo` binary. Disable with `default-features = false`.

pub mod auth;
pub mod blob;
pub mod config;
pub mod error;
pub mod policy;
pub mod quota;
pub mod server;
pub mod service;
pub mod store;
pub mod types;
