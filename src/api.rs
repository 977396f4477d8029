use axum::{
    body::Bytes,
    extract::{Multipart, State},
    http::{HeaderMap, HeaderName, HeaderValue, StatusCode, header},
    response::{IntoResponse, Json, Response},
};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::geocode::GeocodeError;
use crate::stamp::{StampError, StampForm, StampOutcome};

pub const STATUS_HEADER: &str = "x-geostamp-status";
pub const ERROR_HEADER: &str = "x-geostamp-error";
pub const WARNINGS_HEADER: &str = "x-geostamp-warnings";

#[derive(Debug, Deserialize)]
pub struct AddressRequest {
    pub latitude: String,
    pub longitude: String,
}

#[derive(Debug, Serialize)]
pub struct AddressResponse {
    /// Ready to paste into the address box
    pub address: String,
    pub lines: Vec<String>,
    /// True when only the coordinates could be shown
    pub fallback: bool,
    pub error: Option<String>,
}

#[derive(Debug, Serialize)]
struct ErrorResponse {
    error: String,
}

fn error_status(error: &StampError) -> StatusCode {
    match error {
        StampError::MissingPhoto
        | StampError::InvalidPhoto(_)
        | StampError::InvalidTemperature(_)
        | StampError::InvalidDate(_)
        | StampError::InvalidTime(_)
        | StampError::Geocode(GeocodeError::InvalidCoordinate(_)) => StatusCode::BAD_REQUEST,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

fn error_response(error: StampError) -> Response {
    let status = error_status(&error);
    if status.is_server_error() {
        tracing::error!("Request failed: {}", error);
    } else {
        warn!("Rejected request: {}", error);
    }
    (
        status,
        Json(ErrorResponse {
            error: error.to_string(),
        }),
    )
        .into_response()
}

pub async fn address_handler(
    State(app_state): State<crate::AppState>,
    Json(payload): Json<AddressRequest>,
) -> Response {
    match app_state
        .service
        .fetch_address(&payload.latitude, &payload.longitude)
        .await
    {
        Ok(lookup) => Json(AddressResponse {
            address: lookup.text(),
            fallback: lookup.is_fallback(),
            lines: lookup.lines,
            error: lookup.error,
        })
        .into_response(),
        Err(e) => error_response(e),
    }
}

/// Header values must be visible ASCII; anything else becomes `?`.
fn header_text(text: &str) -> HeaderValue {
    let cleaned: String = text
        .chars()
        .map(|c| if c == ' ' || c.is_ascii_graphic() { c } else { '?' })
        .collect();
    HeaderValue::from_str(&cleaned).unwrap_or_else(|_| HeaderValue::from_static("?"))
}

fn is_checked(value: &str) -> bool {
    matches!(
        value.trim().to_ascii_lowercase().as_str(),
        "on" | "true" | "1" | "yes"
    )
}

async fn read_form(mut multipart: Multipart) -> Result<(Option<Bytes>, StampForm), Response> {
    let mut photo = None;
    let mut form = StampForm::default();

    loop {
        let field = match multipart.next_field().await {
            Ok(Some(field)) => field,
            Ok(None) => break,
            Err(e) => return Err(e.into_response()),
        };
        let name = field.name().unwrap_or_default().to_string();

        if name == "photo" {
            photo = Some(field.bytes().await.map_err(IntoResponse::into_response)?);
            continue;
        }

        let value = field.text().await.map_err(IntoResponse::into_response)?;
        match name.as_str() {
            "latitude" => form.latitude = Some(value),
            "longitude" => form.longitude = Some(value),
            "address" => form.address = Some(value),
            "date" => form.date = Some(value),
            "time" => form.time = Some(value),
            "temp_c" => form.temp_c = Some(value),
            "temp_f" => form.temp_f = Some(value),
            "show_map" => form.show_map = is_checked(&value),
            other => warn!("Ignoring unknown form field '{}'", other),
        }
    }

    Ok((photo, form))
}

fn outcome_headers(outcome: &StampOutcome) -> HeaderMap {
    let mut headers = HeaderMap::new();
    headers.insert(header::CONTENT_TYPE, HeaderValue::from_static("image/jpeg"));
    headers.insert(
        header::CONTENT_DISPOSITION,
        HeaderValue::from_static("attachment; filename=\"watermarked.jpg\""),
    );
    headers.insert(
        HeaderName::from_static(STATUS_HEADER),
        HeaderValue::from_static(if outcome.watermarked {
            "watermarked"
        } else {
            "original"
        }),
    );
    if let Some(error) = &outcome.error {
        headers.insert(HeaderName::from_static(ERROR_HEADER), header_text(error));
    }
    if !outcome.warnings.is_empty() {
        headers.insert(
            HeaderName::from_static(WARNINGS_HEADER),
            header_text(&outcome.warnings.join("; ")),
        );
    }
    headers
}

pub async fn watermark_handler(
    State(app_state): State<crate::AppState>,
    multipart: Multipart,
) -> Response {
    let (photo, form) = match read_form(multipart).await {
        Ok(parsed) => parsed,
        Err(response) => return response,
    };
    let Some(photo) = photo else {
        return error_response(StampError::MissingPhoto);
    };

    info!("Stamping upload of {} bytes", photo.len());
    match app_state.service.stamp(&photo, form).await {
        Ok(outcome) => {
            let headers = outcome_headers(&outcome);
            (StatusCode::OK, headers, outcome.jpeg).into_response()
        }
        Err(e) => error_response(e),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_header_text_replaces_non_ascii() {
        assert_eq!(header_text("30°C ok").to_str().unwrap(), "30?C ok");
        assert_eq!(header_text("line\nbreak").to_str().unwrap(), "line?break");
    }

    #[test]
    fn test_is_checked() {
        assert!(is_checked("on"));
        assert!(is_checked(" TRUE "));
        assert!(!is_checked("off"));
        assert!(!is_checked(""));
    }

    #[test]
    fn test_error_status() {
        assert_eq!(error_status(&StampError::MissingPhoto), StatusCode::BAD_REQUEST);
        assert_eq!(
            error_status(&StampError::Geocode(GeocodeError::InvalidCoordinate(
                "x".to_string()
            ))),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            error_status(&StampError::Geocode(GeocodeError::Disabled)),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_outcome_headers() {
        let outcome = StampOutcome {
            jpeg: Vec::new(),
            watermarked: false,
            error: Some("Image has no pixels (0x0)".to_string()),
            warnings: vec!["a".to_string(), "b".to_string()],
            location_lines: Vec::new(),
        };
        let headers = outcome_headers(&outcome);
        assert_eq!(headers[STATUS_HEADER], "original");
        assert_eq!(headers[WARNINGS_HEADER], "a; b");
        assert!(headers.contains_key(ERROR_HEADER));
    }
}
