//! Modules layer - Infrastructure components for external integrations
//!
//! Contains the content store backing file uploads.

pub mod storage;
