mod common;

use axum::{Json, Router, routing::get};
use image::GenericImageView;
use serde_json::json;
use std::sync::Arc;
use std::time::Duration;

use common::{service_with, solid_png, spawn_stub_server};
use geostamp::geocode::providers::nominatim::NominatimGeocoder;
use geostamp::map::providers::disabled::DisabledMapProvider;
use geostamp::stamp::StampForm;

fn coordinates_form() -> StampForm {
    StampForm {
        latitude: Some("-6.1101".to_string()),
        longitude: Some("106.1633".to_string()),
        date: Some("2024-01-01".to_string()),
        time: Some("08:30".to_string()),
        ..Default::default()
    }
}

#[tokio::test]
async fn test_slow_geocoder_falls_back_to_coordinates() {
    let base_url = spawn_stub_server(Router::new().route(
        "/reverse",
        get(|| async {
            tokio::time::sleep(Duration::from_secs(5)).await;
            Json(json!({ "address": { "road": "Too Late" } }))
        }),
    ))
    .await;
    let geocoder =
        NominatimGeocoder::new(&base_url, "geostamp-tests", Duration::from_millis(200)).unwrap();
    let service = service_with(Arc::new(geocoder), Arc::new(DisabledMapProvider));

    let outcome = service
        .stamp(&solid_png(800, 600, [100, 100, 100]), coordinates_form())
        .await
        .unwrap();

    assert!(outcome.watermarked);
    assert_eq!(
        outcome.location_lines,
        vec!["Koordinat: -6.110100, 106.163300"]
    );
    assert!(
        outcome
            .warnings
            .iter()
            .any(|w| w.starts_with("Address lookup failed")),
        "{:?}",
        outcome.warnings
    );

    let decoded = image::load_from_memory(&outcome.jpeg).unwrap();
    assert_eq!(decoded.dimensions(), (800, 600));
}

#[tokio::test]
async fn test_geocoded_address_is_drawn() {
    let base_url = spawn_stub_server(Router::new().route(
        "/reverse",
        get(|| async {
            Json(json!({
                "address": {
                    "road": "Merdeka",
                    "village": "Cipete",
                    "city": "Serang",
                    "state": "Banten",
                    "postcode": "42111",
                    "country": "Indonesia"
                }
            }))
        }),
    ))
    .await;
    let geocoder =
        NominatimGeocoder::new(&base_url, "geostamp-tests", Duration::from_secs(5)).unwrap();
    let service = service_with(Arc::new(geocoder), Arc::new(DisabledMapProvider));

    let outcome = service
        .stamp(&solid_png(800, 600, [100, 100, 100]), coordinates_form())
        .await
        .unwrap();

    assert!(outcome.watermarked);
    assert!(outcome.warnings.is_empty(), "{:?}", outcome.warnings);
    assert_eq!(outcome.location_lines[0], "Jl. Merdeka");
    assert_eq!(
        outcome.location_lines.last().unwrap(),
        "Koordinat: -6.110100, 106.163300"
    );
}

#[tokio::test]
async fn test_typed_address_skips_geocoder() {
    // Nothing listens here; a lookup would fail and leave a warning
    let geocoder =
        NominatimGeocoder::new("http://127.0.0.1:9", "geostamp-tests", Duration::from_secs(1))
            .unwrap();
    let service = service_with(Arc::new(geocoder), Arc::new(DisabledMapProvider));

    let form = StampForm {
        address: Some("Kantor Desa\nJl. Raya 5".to_string()),
        ..coordinates_form()
    };
    let outcome = service
        .stamp(&solid_png(400, 300, [0, 0, 0]), form)
        .await
        .unwrap();

    assert!(outcome.warnings.is_empty(), "{:?}", outcome.warnings);
    assert_eq!(outcome.location_lines, vec!["Kantor Desa", "Jl. Raya 5"]);
}
