//! # UI Module
//!
//! This module contains all UI components for the pitch tracker.

pub mod cent_meter;
pub mod history_graph;
pub mod main_display;
