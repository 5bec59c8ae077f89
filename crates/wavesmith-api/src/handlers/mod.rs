//! HTTP handlers

pub mod transform;
