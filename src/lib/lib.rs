//! A small movie catalog served over HTTP: JSON CRUD endpoints, a query
//! pipeline for listing, a few server-rendered pages, and interchangeable
//! JSON-file, SQLite or in-memory persistence.

pub mod adapters;
pub mod config;
pub mod core;
pub mod query;
pub mod storage;
pub mod views;
