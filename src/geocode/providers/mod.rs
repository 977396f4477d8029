pub mod nominatim;
pub mod offline;
