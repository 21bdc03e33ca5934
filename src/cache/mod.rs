//! On-disk cache of the upstream event snapshot.
//!
//! See [`EventCache`] for the write/read contract.

pub mod event_cache;

pub use event_cache::EventCache;
