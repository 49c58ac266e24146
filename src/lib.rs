// Library exports for nrgatlas

pub mod error;
pub mod table;
pub mod formula;
pub mod features;
pub mod stats;

// Scene construction and rendering
pub mod scale;
pub mod palette;
pub mod scene;
pub mod svg;
pub mod charts;
pub mod report;

pub mod config;
pub mod profile;
pub mod pipeline;

pub use error::{AtlasError, AtlasResult};
