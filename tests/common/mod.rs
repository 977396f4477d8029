#![allow(dead_code)]

use axum::Router;
use image::{DynamicImage, ImageFormat, Rgb, RgbImage};
use std::io::Cursor;
use std::sync::Arc;

use geostamp::Config;
use geostamp::geocode::DynGeocoder;
use geostamp::map::DynMapProvider;
use geostamp::stamp::StampService;
use geostamp::watermark::FontSet;

/// Serve `router` on an ephemeral local port and return its base URL.
pub async fn spawn_stub_server(router: Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });
    format!("http://{}", addr)
}

pub fn encode(image: RgbImage, format: ImageFormat) -> Vec<u8> {
    let mut bytes = Vec::new();
    DynamicImage::ImageRgb8(image)
        .write_to(&mut Cursor::new(&mut bytes), format)
        .unwrap();
    bytes
}

pub fn solid_png(width: u32, height: u32, color: [u8; 3]) -> Vec<u8> {
    encode(RgbImage::from_pixel(width, height, Rgb(color)), ImageFormat::Png)
}

/// A service wired to the given collaborators and the built-in fonts.
pub fn service_with(geocoder: DynGeocoder, maps: DynMapProvider) -> StampService {
    StampService::with_parts(
        &Config::default(),
        Arc::new(FontSet::builtin().unwrap()),
        geocoder,
        maps,
    )
}

pub fn assert_close(actual: u8, expected: u8, tolerance: u8, what: &str) {
    assert!(
        actual.abs_diff(expected) <= tolerance,
        "{}: expected {} +/- {}, got {}",
        what,
        expected,
        tolerance,
        actual
    );
}
