//! Geomark-DB: database schema, migrations, and query operations.
//!
//! This crate provides database functionality for geomark using SQLite
//! with rusqlite and r2d2 connection pooling.
//!
//! # Modules
//!
//! - `migrations` - Database schema migrations
//! - `pool` - Connection pool management
//! - `models` - Rust models matching the database schema
//! - `queries` - Database query operations
//!
//! # Example
//!
//! ```no_run
//! use geomark_db::pool::{init_pool, get_conn};
//! use geomark_db::queries::markers;
//!
//! let pool = init_pool("/var/lib/geomark/geomark.db").unwrap();
//! let conn = get_conn(&pool).unwrap();
//!
//! let all = markers::list_markers(&conn).unwrap();
//! println!("{} markers", all.len());
//! ```

pub mod migrations;
pub mod models;
pub mod pool;
pub mod queries;
