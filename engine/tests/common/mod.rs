// Shared fixtures for the integration tests: a fast stand-in classifier,
// image encoders and a hand-rolled multipart body builder.
#![allow(dead_code)]

use std::io::Cursor;

use axum::{body::Body, http::Request, Router};
use candle_core::{Device, Tensor};
use image::{DynamicImage, GrayImage, ImageFormat, Luma, Rgb, RgbImage};
use xray_engine::{create_app, AppState, Classifier};

pub const BOUNDARY: &str = "XRAY-ENGINE-TEST-BOUNDARY";
pub const MAX_UPLOAD_BYTES: usize = 8 * 1024 * 1024;

/// Uses the mean of the normalized input as the logit: dark images come out
/// `Normal`, bright images `Pneumonia`.
pub struct MeanIntensity {
    device: Device,
}

impl MeanIntensity {
    pub fn new() -> Self {
        Self { device: Device::Cpu }
    }
}

impl Classifier for MeanIntensity {
    fn name(&self) -> &str {
        "mean-intensity"
    }

    fn device(&self) -> &Device {
        &self.device
    }

    fn forward(&self, input: &Tensor) -> candle_core::Result<Tensor> {
        input.mean_all()?.reshape((1, 1))
    }
}

pub fn test_app() -> Router {
    create_app(AppState::new(MeanIntensity::new()), MAX_UPLOAD_BYTES)
}

pub fn solid_png(width: u32, height: u32, value: u8) -> Vec<u8> {
    let image = RgbImage::from_pixel(width, height, Rgb([value, value, value]));
    encode(DynamicImage::ImageRgb8(image), ImageFormat::Png)
}

pub fn grayscale_png(width: u32, height: u32, value: u8) -> Vec<u8> {
    let image = GrayImage::from_pixel(width, height, Luma([value]));
    encode(DynamicImage::ImageLuma8(image), ImageFormat::Png)
}

pub fn solid_jpeg(width: u32, height: u32, value: u8) -> Vec<u8> {
    let image = RgbImage::from_pixel(width, height, Rgb([value, value, value]));
    encode(DynamicImage::ImageRgb8(image), ImageFormat::Jpeg)
}

fn encode(image: DynamicImage, format: ImageFormat) -> Vec<u8> {
    let mut bytes = Vec::new();
    image
        .write_to(&mut Cursor::new(&mut bytes), format)
        .expect("encode fixture image");
    bytes
}

/// Builds a multipart/form-data body from `(field name, file name, content)` parts.
pub fn multipart_body(parts: &[(&str, &str, &[u8])]) -> Vec<u8> {
    let mut body = Vec::new();
    for (name, filename, content) in parts {
        body.extend_from_slice(format!("--{BOUNDARY}\r\n").as_bytes());
        body.extend_from_slice(
            format!("Content-Disposition: form-data; name=\"{name}\"; filename=\"{filename}\"\r\n")
                .as_bytes(),
        );
        body.extend_from_slice(b"Content-Type: application/octet-stream\r\n\r\n");
        body.extend_from_slice(content);
        body.extend_from_slice(b"\r\n");
    }
    body.extend_from_slice(format!("--{BOUNDARY}--\r\n").as_bytes());
    body
}

pub fn predict_request(uri: &str, parts: &[(&str, &str, &[u8])]) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header(
            "content-type",
            format!("multipart/form-data; boundary={BOUNDARY}"),
        )
        .body(Body::from(multipart_body(parts)))
        .expect("build request")
}

pub fn upload(bytes: &[u8]) -> Request<Body> {
    predict_request("/api/predict/", &[("file", "xray.png", bytes)])
}
