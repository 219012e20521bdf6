//! FastX portal: access-key gated lookup proxy with an audit log.
//!
//! # Architecture
//!
//! - **Web Framework**: Axum (async HTTP server)
//! - **Database**: PostgreSQL with sqlx, behind the `KeyStore`/`LogStore` traits
//! - **Authentication**: Bearer access keys, constant-time compared
//! - **Upstream**: reqwest, one attempt per lookup
//! - **Client**: `client::ClientMirror`, a local cache of keys and logs

pub mod client;
pub mod config;
pub mod db;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;
pub mod state;
pub mod store;
