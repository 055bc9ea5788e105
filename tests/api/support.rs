// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1

//! Shared helpers for router tests: a deterministic stub encoder, image
//! fixtures and request builders.
#![allow(dead_code)]

use anyhow::Result;
use axum::{
    body::Body,
    http::{header, Method, Request, Response},
    Router,
};
use clip_embedding_service::{
    api::{create_app, AppState},
    clip::{ClipEncoder, ComputeDevice, EMBEDDING_DIMENSIONS},
    embeddings::ClipEmbedder,
};
use image::{DynamicImage, ImageFormat, Rgb, RgbImage};
use ndarray::Array4;
use std::io::Cursor;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

pub const BOUNDARY: &str = "----clip-test-boundary";

/// Texts longer than this fail like an over-long prompt would
pub const STUB_MAX_TEXT_CHARS: usize = 300;

/// Encoder returning fixed, unnormalized vectors derived from its input
#[derive(Default)]
pub struct StubEncoder {
    image_calls: AtomicUsize,
    text_calls: AtomicUsize,
}

impl StubEncoder {
    pub fn image_calls(&self) -> usize {
        self.image_calls.load(Ordering::SeqCst)
    }

    pub fn text_calls(&self) -> usize {
        self.text_calls.load(Ordering::SeqCst)
    }
}

impl ClipEncoder for StubEncoder {
    fn encode_image(&self, pixels: Array4<f32>) -> Result<Vec<f32>> {
        self.image_calls.fetch_add(1, Ordering::SeqCst);
        let mean = pixels.mean().unwrap_or(0.0);
        Ok((0..EMBEDDING_DIMENSIONS)
            .map(|i| 3.0 + (i % 7) as f32 + mean)
            .collect())
    }

    fn encode_text(&self, text: &str) -> Result<Vec<f32>> {
        self.text_calls.fetch_add(1, Ordering::SeqCst);
        if text.chars().count() > STUB_MAX_TEXT_CHARS {
            anyhow::bail!("Input is too long for context length 77");
        }
        let seed = text.bytes().map(|b| b as f32).sum::<f32>();
        Ok((0..EMBEDDING_DIMENSIONS)
            .map(|i| 1.0 + ((i as f32 + seed) % 11.0))
            .collect())
    }

    fn device(&self) -> ComputeDevice {
        ComputeDevice::Cpu
    }

    fn dimension(&self) -> usize {
        EMBEDDING_DIMENSIONS
    }
}

/// Router with a loaded (stub) model, plus a handle to inspect calls
pub fn ready_app() -> (Router, Arc<StubEncoder>) {
    ready_app_with_limit(clip_embedding_service::config::DEFAULT_MAX_BODY_BYTES)
}

pub fn ready_app_with_limit(max_body_bytes: usize) -> (Router, Arc<StubEncoder>) {
    let stub = Arc::new(StubEncoder::default());
    let state = AppState::new(ClipEmbedder::new(stub.clone())).with_max_body_bytes(max_body_bytes);
    (create_app(Arc::new(state)), stub)
}

/// Router in the Uninitialized state
pub fn unready_app() -> Router {
    create_app(Arc::new(AppState::uninitialized()))
}

pub fn gradient_image(width: u32, height: u32) -> DynamicImage {
    DynamicImage::ImageRgb8(RgbImage::from_fn(width, height, |x, y| {
        Rgb([(x * 7 % 256) as u8, (y * 3 % 256) as u8, ((x + y) % 256) as u8])
    }))
}

pub fn encode(image: &DynamicImage, format: ImageFormat) -> Vec<u8> {
    let mut bytes = Vec::new();
    image
        .write_to(&mut Cursor::new(&mut bytes), format)
        .expect("encode test image");
    bytes
}

pub fn png_bytes(width: u32, height: u32) -> Vec<u8> {
    encode(&gradient_image(width, height), ImageFormat::Png)
}

/// Hand-built `multipart/form-data` body with a single part
pub fn multipart_request(
    field: &str,
    filename: &str,
    content_type: &str,
    data: &[u8],
) -> Request<Body> {
    let mut body = Vec::new();
    body.extend_from_slice(format!("--{}\r\n", BOUNDARY).as_bytes());
    body.extend_from_slice(
        format!(
            "Content-Disposition: form-data; name=\"{}\"; filename=\"{}\"\r\n",
            field, filename
        )
        .as_bytes(),
    );
    body.extend_from_slice(format!("Content-Type: {}\r\n\r\n", content_type).as_bytes());
    body.extend_from_slice(data);
    body.extend_from_slice(format!("\r\n--{}--\r\n", BOUNDARY).as_bytes());

    Request::builder()
        .method(Method::POST)
        .uri("/embed/image")
        .header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={}", BOUNDARY),
        )
        .body(Body::from(body))
        .unwrap()
}

pub fn json_request(uri: &str, json: serde_json::Value) -> Request<Body> {
    Request::builder()
        .method(Method::POST)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(json.to_string()))
        .unwrap()
}

pub fn empty_request(method: Method, uri: &str) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .body(Body::empty())
        .unwrap()
}

/// Percent-encode a value for use in a query string
pub fn query_escape(value: &str) -> String {
    value
        .bytes()
        .map(|b| match b {
            b'A'..=b'Z' | b'a'..=b'z' | b'0'..=b'9' | b'-' | b'_' | b'.' | b'~' => {
                (b as char).to_string()
            }
            _ => format!("%{:02X}", b),
        })
        .collect()
}

pub async fn body_json(response: Response<Body>) -> serde_json::Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap_or_else(|e| {
        panic!(
            "Response is not JSON ({}): {}",
            e,
            String::from_utf8_lossy(&bytes)
        )
    })
}

/// Embedding vector from a success body
pub fn embeddings(json: &serde_json::Value) -> Vec<f64> {
    json["embeddings"]
        .as_array()
        .expect("embeddings array")
        .iter()
        .map(|v| v.as_f64().expect("number"))
        .collect()
}

pub fn norm(vector: &[f64]) -> f64 {
    vector.iter().map(|x| x * x).sum::<f64>().sqrt()
}

/// Success body invariants shared by every embedding endpoint
pub fn assert_embedding_body(json: &serde_json::Value) {
    let vector = embeddings(json);
    assert_eq!(vector.len(), 512);
    assert_eq!(json["dimensions"], 512);
    assert_eq!(json["model"], "ViT-B/32");
    assert!(
        (norm(&vector) - 1.0).abs() < 1e-4,
        "Embedding not unit length: {}",
        norm(&vector)
    );
}
