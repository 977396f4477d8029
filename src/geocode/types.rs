use serde::{Deserialize, Serialize};

use super::GeocodeError;

pub const DEFAULT_COUNTRY: &str = "Indonesia";

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub latitude: f64,
    pub longitude: f64,
}

impl Coordinates {
    pub fn new(latitude: f64, longitude: f64) -> Result<Self, GeocodeError> {
        if !latitude.is_finite() || !(-90.0..=90.0).contains(&latitude) {
            return Err(GeocodeError::InvalidCoordinate(format!(
                "latitude {} is outside -90..90",
                latitude
            )));
        }
        if !longitude.is_finite() || !(-180.0..=180.0).contains(&longitude) {
            return Err(GeocodeError::InvalidCoordinate(format!(
                "longitude {} is outside -180..180",
                longitude
            )));
        }
        Ok(Self {
            latitude,
            longitude,
        })
    }

    /// Parse user-entered decimal degrees.
    pub fn parse(latitude: &str, longitude: &str) -> Result<Self, GeocodeError> {
        let lat = latitude.trim().parse::<f64>().map_err(|_| {
            GeocodeError::InvalidCoordinate(format!("latitude '{}' is not a number", latitude.trim()))
        })?;
        let lon = longitude.trim().parse::<f64>().map_err(|_| {
            GeocodeError::InvalidCoordinate(format!(
                "longitude '{}' is not a number",
                longitude.trim()
            ))
        })?;
        Self::new(lat, lon)
    }

    pub fn label(&self) -> String {
        format!("Koordinat: {:.6}, {:.6}", self.latitude, self.longitude)
    }
}

/// Address parts as returned by Nominatim's `addressdetails=1`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Address {
    pub road: Option<String>,
    pub village: Option<String>,
    pub suburb: Option<String>,
    pub subdistrict: Option<String>,
    pub county: Option<String>,
    pub city: Option<String>,
    pub town: Option<String>,
    pub state: Option<String>,
    pub postcode: Option<String>,
    pub country: Option<String>,
}

fn present(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}

/// Render an address in the Indonesian layout used on the band.
pub fn format_address_lines(address: &Address, coordinates: Coordinates) -> Vec<String> {
    let mut lines = Vec::new();

    if let Some(road) = present(&address.road) {
        lines.push(format!("Jl. {}", road));
    }
    if let Some(kelurahan) = present(&address.village).or(present(&address.suburb)) {
        lines.push(format!("Kel. {}", kelurahan));
    }
    if let Some(kecamatan) = present(&address.subdistrict).or(present(&address.county)) {
        lines.push(format!("Kec. {}", kecamatan));
    }
    if let Some(city) = present(&address.city).or(present(&address.town)) {
        lines.push(format!("Kota {}", city));
    }
    if let Some(state) = present(&address.state) {
        lines.push(format!("Prov. {}", state));
    }
    if let Some(postcode) = present(&address.postcode) {
        lines.push(format!("Kode Pos: {}", postcode));
    }
    lines.push(present(&address.country).unwrap_or(DEFAULT_COUNTRY).to_string());
    lines.push(coordinates.label());

    lines
}

pub fn coordinate_lines(coordinates: Coordinates) -> Vec<String> {
    vec![coordinates.label()]
}

/// Result of an address lookup. Always carries something printable.
#[derive(Debug, Clone, Serialize)]
pub struct LocationLookup {
    pub lines: Vec<String>,
    /// Set when the geocoder failed and `lines` is the coordinate fallback
    pub error: Option<String>,
}

impl LocationLookup {
    pub fn text(&self) -> String {
        self.lines.join("\n")
    }

    pub fn is_fallback(&self) -> bool {
        self.error.is_some()
    }
}
