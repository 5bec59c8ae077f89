//! Request helpers shared by the transform handlers

pub mod upload;
