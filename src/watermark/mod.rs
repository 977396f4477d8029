mod compositor;
pub mod config;
pub mod error;
pub mod fonts;
pub mod layout;
pub mod types;

pub use compositor::{Composed, CompositionReport, MapStatus, compose, render};
pub use config::*;
pub use error::*;
pub use fonts::*;
pub use layout::*;
pub use types::*;
