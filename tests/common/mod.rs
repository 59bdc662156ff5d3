//! Common test utilities for gridmap.
//!
//! This module provides shared utilities for the end-to-end tests.

// Not every test binary uses every helper
#![allow(dead_code)]

pub mod assertions;
pub mod image_utils;
pub mod test_data;
