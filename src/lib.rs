//! Record keeping for a driving school: students, drives, training progress.
//!
//! The same domain model is rendered by two stores: [`db::Database`] backs
//! the HTTP API served to the web client, [`local::LocalStore`] backs the
//! offline tablet client with plain JSON blobs on disk.

pub mod api;
pub mod db;
pub mod local;
pub mod models;
pub mod stats;
pub mod taxonomy;
