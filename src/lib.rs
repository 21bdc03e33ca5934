//! # quake-gateway
//!
//! Keeps a local cache of seismic events in sync with an upstream feed and
//! serves filtered views of that cache over HTTP.
//!
//! A single background task refreshes the cache on a fixed cadence; request
//! handlers only ever read it. The two sides share nothing in memory: the
//! cache file, replaced atomically, is the only coordination point.
//!
//! ## Architecture
//!
//! ```text
//! Upstream feed (FDSN GeoJSON)
//!     │
//!     ├── SyncScheduler (sync/)      fetch → validate → atomic replace
//!     │
//!     ├── EventCache (cache/)        single file, last good snapshot
//!     │
//!     ├── QueryService (service/)    filter + project, read-only
//!     │
//!     └── REST Handlers (api/)
//!             │
//!          Clients (HTTP)
//! ```

pub mod api;
pub mod app_state;
pub mod cache;
pub mod config;
pub mod domain;
pub mod error;
pub mod service;
pub mod sync;
