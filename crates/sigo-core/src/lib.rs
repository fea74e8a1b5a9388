//! Core types, rules and the status engine for the SIGO personnel register.
//!
//! This crate has no database or terminal dependencies.
//! Storage backends implement [`store::RecordStore`]; callers drive every
//! mutation through [`registry::Registry`].

// Store impls use native `async fn` in traits.
#![allow(async_fn_in_trait)]

pub mod absence;
pub mod audit;
pub mod date;
pub mod error;
pub mod memory;
pub mod person;
pub mod registry;
pub mod restriction;
pub mod rules;
pub mod status;
pub mod store;

pub use error::{Error, FieldErrors, Result};
pub use registry::Registry;
