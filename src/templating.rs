use axum::{
    extract::State,
    http::StatusCode,
    response::{Html, IntoResponse},
};
use tracing::{debug, error};

use crate::Config;
use crate::api::{ERROR_HEADER, STATUS_HEADER, WARNINGS_HEADER};

const INDEX_TEMPLATE: &str = include_str!("../templates/index.html.liquid");

pub struct TemplateEngine {
    index: liquid::Template,
    app_name: String,
    map_enabled: bool,
    address_rows: usize,
}

impl TemplateEngine {
    /// Parse the embedded page once; rendering reuses the parsed template.
    pub fn new(config: &Config) -> Result<Self, String> {
        let parser = liquid::ParserBuilder::with_stdlib()
            .build()
            .map_err(|e| format!("Failed to create parser: {}", e))?;

        let index = parser
            .parse(INDEX_TEMPLATE)
            .map_err(|e| format!("Failed to parse template: {}", e))?;

        Ok(Self {
            index,
            app_name: config.app.name.clone(),
            map_enabled: config.map.enabled,
            address_rows: config.watermark.max_location_lines.clamp(3, 10),
        })
    }

    fn globals(&self) -> liquid::Object {
        let app_name = self.app_name.clone();
        let map_enabled = self.map_enabled;
        let address_rows = self.address_rows as i64;
        liquid::object!({
            "app_name": app_name,
            "version": env!("CARGO_PKG_VERSION"),
            "map_enabled": map_enabled,
            "address_rows": address_rows,
            "status_header": STATUS_HEADER,
            "error_header": ERROR_HEADER,
            "warnings_header": WARNINGS_HEADER,
        })
    }

    pub fn render_index(&self) -> Result<String, String> {
        debug!("Rendering index page");
        self.index
            .render(&self.globals())
            .map_err(|e| format!("Failed to render template: {}", e))
    }
}

pub async fn index_handler(State(app_state): State<crate::AppState>) -> impl IntoResponse {
    match app_state.template_engine.render_index() {
        Ok(html) => Ok(Html(html)),
        Err(e) => {
            error!("Template rendering error: {}", e);
            Err(StatusCode::INTERNAL_SERVER_ERROR)
        }
    }
}
