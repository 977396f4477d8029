pub mod disabled;
pub mod static_map;
