//! Core timeline engine: day model, geometry, motion, crossing detection,
//! selection sync, event file parsing and settings.

pub mod config;
pub mod crossing;
pub mod days;
pub mod error;
pub mod motion;
pub mod parser;
pub mod position;
pub mod selection;
pub mod timeline;
pub mod window;
