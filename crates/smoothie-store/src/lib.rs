//! # smoothie-store
//!
//! Durable local storage for the Smoothie client, backed by SQLite.
//!
//! The crate exposes a small key-value port ([`KeyValueStore`]) with a
//! SQLite implementation and an in-memory one, and builds the two
//! client-side stores on top of it: the [`LocalFallbackStore`] holding
//! recipes that have not reached the remote service yet, and the
//! [`FavoritesStore`].

pub mod database;
pub mod favorites;
pub mod kv;
pub mod local;
pub mod migrations;

mod error;

pub use database::Database;
pub use error::{Result, StoreError};
pub use favorites::FavoritesStore;
pub use kv::{KeyValueStore, MemoryKv, SqliteKv};
pub use local::LocalFallbackStore;
