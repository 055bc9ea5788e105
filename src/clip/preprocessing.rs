// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Image preprocessing for the CLIP ViT-B/32 visual encoder

use image::imageops::FilterType;
use image::{DynamicImage, GenericImageView};
use ndarray::Array4;

/// Input resolution of the ViT-B/32 visual encoder
pub const CLIP_INPUT_SIZE: u32 = 224;

/// CLIP normalization mean values (RGB)
pub const MEAN: [f32; 3] = [0.481_454_66, 0.457_827_5, 0.408_210_73];

/// CLIP normalization std values (RGB)
pub const STD: [f32; 3] = [0.268_629_54, 0.261_302_58, 0.275_777_11];

/// The transform that turns a decoded image into a model-ready tensor.
///
/// Steps:
/// 1. Center crop the largest square of the source image
/// 2. Resize that square to `input_size` x `input_size` (bicubic)
/// 3. Convert to RGB and scale to [0, 1]
/// 4. Normalize with CLIP mean/std: (pixel/255 - mean) / std
/// 5. Lay out as NCHW `[1, 3, H, W]`
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ClipPreprocessor {
    input_size: u32,
}

impl Default for ClipPreprocessor {
    fn default() -> Self {
        Self {
            input_size: CLIP_INPUT_SIZE,
        }
    }
}

impl ClipPreprocessor {
    pub fn new(input_size: u32) -> Self {
        Self { input_size }
    }

    pub fn input_size(&self) -> u32 {
        self.input_size
    }

    /// Preprocess an image into a `[1, 3, input_size, input_size]` tensor
    pub fn apply(&self, image: &DynamicImage) -> Array4<f32> {
        let cropped = resize_and_center_crop(image, self.input_size);
        let rgb = cropped.to_rgb8();

        let size = self.input_size as usize;
        let mut tensor = Array4::zeros((1, 3, size, size));

        for (x, y, pixel) in rgb.enumerate_pixels() {
            for c in 0..3 {
                let value = pixel[c] as f32 / 255.0;
                tensor[[0, c, y as usize, x as usize]] = (value - MEAN[c]) / STD[c];
            }
        }

        tensor
    }
}

/// Crop the center square then resize it to `target` x `target`.
///
/// Frames the same region as a shortest-side resize followed by a center
/// crop. Only the cropped square is resampled.
pub fn resize_and_center_crop(image: &DynamicImage, target: u32) -> DynamicImage {
    let (width, height) = image.dimensions();

    // Degenerate images become a black square
    if width == 0 || height == 0 {
        return DynamicImage::new_rgb8(target, target);
    }

    let (x, y, side) = center_square(width, height);
    let square = image.crop_imm(x, y, side, side);

    if side == target {
        square
    } else {
        square.resize_exact(target, target, FilterType::CatmullRom)
    }
}

/// Largest centered square in source coordinates: `(x, y, side)`
fn center_square(width: u32, height: u32) -> (u32, u32, u32) {
    let side = width.min(height);
    ((width - side) / 2, (height - side) / 2, side)
}
