//! Server infrastructure: database pool and migrations.

mod db;

pub use db::{create_pool, run_migrations};
