// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Image input handling for the embedding endpoints

pub mod image_utils;

pub use image_utils::{
    decode_base64_image, decode_image_bytes, is_image_content_type, ImageError, ImageInfo,
};
