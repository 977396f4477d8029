use image::DynamicImage;

/// Everything needed to stamp one photo.
#[derive(Debug, Clone)]
pub struct WatermarkRequest {
    pub base_image: DynamicImage,
    /// First line is the title, the rest are body lines
    pub location_lines: Vec<String>,
    pub date_time_text: String,
    pub temperature_text: String,
    pub map_image: Option<DynamicImage>,
}

impl WatermarkRequest {
    pub fn new(base_image: DynamicImage) -> Self {
        Self {
            base_image,
            location_lines: Vec::new(),
            date_time_text: String::new(),
            temperature_text: String::new(),
            map_image: None,
        }
    }

    pub fn with_location_lines<I, S>(mut self, lines: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.location_lines = lines.into_iter().map(Into::into).collect();
        self
    }

    /// Split free-form address text into lines, dropping blank ones.
    pub fn with_location_text(self, text: &str) -> Self {
        self.with_location_lines(split_location_text(text))
    }

    pub fn with_date_time(mut self, text: impl Into<String>) -> Self {
        self.date_time_text = text.into();
        self
    }

    pub fn with_temperature(mut self, text: impl Into<String>) -> Self {
        self.temperature_text = text.into();
        self
    }

    pub fn with_map(mut self, map: Option<DynamicImage>) -> Self {
        self.map_image = map;
        self
    }

    /// True when the band would carry no text and no map.
    pub fn has_content(&self) -> bool {
        !self.location_lines.is_empty()
            || !self.date_time_text.is_empty()
            || !self.temperature_text.is_empty()
            || self.map_image.is_some()
    }
}

pub fn split_location_text(text: &str) -> Vec<String> {
    text.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(str::to_string)
        .collect()
}
