//! Back-office data engine
//!
//! Shared core behind every list/report screen of the back office: client-side
//! filtering, sorting and summary cards over record collections, validated
//! create/edit forms, and a lossy key/value persistence layer.
#![forbid(unsafe_code)]
#![deny(rust_2018_idioms)]
#![allow(elided_lifetimes_in_paths)]
#![warn(clippy::all, clippy::perf, clippy::dbg_macro)]

pub mod commands;
pub mod common;
pub mod config;
pub mod errors;
pub mod form;
pub mod format;
pub mod models;
pub mod persistence;
pub mod services;
pub mod store;
pub mod validation;
pub mod view;

pub use errors::ServiceError;
pub use models::{FieldValue, Record};
pub use store::{CollectionStore, Workspace};
pub use view::{DerivedView, TableView};
