//! Library crate for rbac-dashboard.
//!
//! This crate exposes the building blocks of the dashboard:
//! - Records and partial updates (`model`) and the domain error (`error`)
//! - The in-memory entity store (`store`) and the async service façade (`service`)
//! - List derivation: search and filters (`search`), permission categories
//!   (`permissions`), and dashboard aggregates (`stats`)
//! - Application state, key handling and the event loop (`app`)
//! - UI rendering and widgets (`ui`)
//!
//! It is used by the `rbac-dashboard` binary and by tests.
#![doc = include_str!("../README.md")]
#![deny(rustdoc::broken_intra_doc_links)]

pub mod app;
pub mod error;
pub mod model;
pub mod permissions;
pub mod search;
pub mod service;
pub mod stats;
pub mod store;
pub mod ui;

/// Domain error and result types shared across the crate.
pub use error::{RbacError, Result};
