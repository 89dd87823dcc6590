//! Shared test harness for integration tests.
//!
//! Provides [`TestHarness`] which creates a temp data directory, a
//! file-backed pool, the upload store, and a full [`AppContext`]. The
//! [`with_server`] constructor starts Axum on a random port for HTTP-level
//! testing.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use geomark::config::Config;
use geomark::server::{create_router, AppContext};
use geomark::uploads::UploadStore;
use geomark_db::pool::{get_conn, init_pool, DbPool, PooledConnection};

/// Test harness wrapping a fully-constructed [`AppContext`] backed by a
/// temp-directory database and upload store.
pub struct TestHarness {
    pub ctx: AppContext,
    pub db: DbPool,
    data_dir: tempfile::TempDir,
}

impl TestHarness {
    /// Create a new harness with default configuration and a temp data dir.
    pub fn new() -> Self {
        let data_dir = tempfile::tempdir().expect("failed to create temp dir");
        let db_path = data_dir.path().join("geomark.db");
        let db = init_pool(db_path.to_str().unwrap()).expect("failed to init pool");

        let uploads = UploadStore::new(data_dir.path().join("uploads"));
        uploads.ensure_dir().expect("failed to create uploads dir");

        let ctx = AppContext {
            db: db.clone(),
            config: Arc::new(Config::default()),
            uploads: Arc::new(uploads),
        };

        Self { ctx, db, data_dir }
    }

    /// Start an Axum server on a random port and return the harness together
    /// with the bound socket address.
    pub async fn with_server() -> (Self, SocketAddr) {
        let harness = Self::new();
        let app = create_router(harness.ctx.clone(), None);

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("failed to bind test listener");
        let addr = listener.local_addr().unwrap();

        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        (harness, addr)
    }

    /// Check out a database connection.
    #[allow(dead_code)]
    pub fn conn(&self) -> PooledConnection {
        get_conn(&self.db).expect("failed to get connection")
    }

    /// Path to the harness upload directory.
    #[allow(dead_code)]
    pub fn uploads_dir(&self) -> PathBuf {
        self.data_dir.path().join("uploads")
    }
}
