//! Foundation module - Core utilities and types
//!
//! This module provides fundamental utilities used throughout the scripting core:
//! - Math types shared with the native engine
//! - Frame timing
//! - Host-side logging initialisation

pub mod math;
pub mod time;
pub mod logging;
