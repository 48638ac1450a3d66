//! # Rosterd
//!
//! A shift-scheduling server, usable both as a standalone binary and as a
//! library.
//!
//! Teams of people are assigned daily shift codes on a grid. Access is
//! governed by two independent axes: a per-page view/edit capability
//! (schedule, settings, permissions, people) and a per-team read/write
//! access level. Both must pass for any team-scoped operation.
//!
//! ## Library Usage
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use rosterd::auth::SessionSigner;
//! use rosterd::config::AppConfig;
//! use rosterd::server::{AppState, create_router};
//! use rosterd::store::{SqliteStore, Store};
//!
//! let config = AppConfig::load("rosterd.toml").unwrap();
//! let store = SqliteStore::new(&config.database_path).unwrap();
//! store.initialize().unwrap();
//!
//! let state = Arc::new(AppState {
//!     store: Arc::new(store),
//!     signer: SessionSigner::new(&config.secret_key, config.session_max_age),
//!     config,
//! });
//! let router = create_router(state);
//! // Serve with axum...
//! ```

pub mod auth;
pub mod config;
pub mod error;
pub mod grid;
pub mod permissions;
pub mod seed;
pub mod server;
pub mod store;
pub mod types;
