//! # Replaydeck
//!
//! A game-replay upload server, usable both as a standalone binary and as
//! a library.
//!
//! Tenants own games, games own replays; replay bytes live on disk while
//! their metadata lives in SQLite, and the coordinator keeps the two
//! consistent across uploads and deletes.
//!
//! ## Library Usage
//!
//! ```toml
//! [dependencies]
//! replaydeck = { version = "0.1", default-features = false }
//! ```
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use std::path::PathBuf;
//! use replaydeck::auth::AuthService;
//! use replaydeck::blob::FsBlobStore;
//! use replaydeck::coordinator::ReplayCoordinator;
//! use replaydeck::server::{AppState, create_router};
//! use replaydeck::store::{MetadataStore, SqliteStore};
//!
//! let store: Arc<dyn MetadataStore> =
//!     Arc::new(SqliteStore::new("./data/replaydeck.db").unwrap());
//! store.initialize().unwrap();
//!
//! let blobs = Arc::new(FsBlobStore::new(&PathBuf::from("./data")));
//! let state = Arc::new(AppState {
//!     auth: AuthService::new(store.clone(), b"secret"),
//!     coordinator: ReplayCoordinator::new(store, blobs),
//!     default_tenant: None,
//! });
//! let router = create_router(state);
//! // Serve with axum...
//! ```
//!
//! ## Feature Flags
//!
//! - `cli` (default): Includes the binary's CLI. Disable with
//!   `default-features = false`.

pub mod auth;
pub mod blob;
pub mod config;
pub mod coordinator;
pub mod error;
pub mod server;
pub mod store;
pub mod types;
