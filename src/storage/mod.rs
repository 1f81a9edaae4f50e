//! Access to the backing document store

pub mod database;

pub use database::DocumentDb;
