//! # HashNexus
//!
//! A wallet-authenticated HashName registry, usable both as a standalone
//! binary and as a library.
//!
//! Wallets prove control of an address by signing a single-use challenge;
//! the proven address can then claim a HashName handle and approve or
//! reject attachment requests that link content seeds to it.
//!
//! ## Library Usage
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use std::path::PathBuf;
//! use hashnexus::config::DEFAULT_STORE_TIMEOUT;
//! use hashnexus::server::{AppState, create_router};
//! use hashnexus::store::{SqliteStore, Store};
//!
//! let store = SqliteStore::new(&PathBuf::from("./data/hashnexus.db")).unwrap();
//! store.initialize().unwrap();
//!
//! let state = Arc::new(AppState::new(Arc::new(store), DEFAULT_STORE_TIMEOUT));
//! let router = create_router(state);
//! // Serve with axum...
//! ```

pub mod auth;
pub mod config;
pub mod error;
pub mod registry;
pub mod server;
pub mod store;
pub mod types;
