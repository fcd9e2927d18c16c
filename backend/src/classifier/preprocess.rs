use image::imageops::FilterType;

use super::ClassifierError;
use crate::config::{ImageConfig, ResizeMethod};

/// `height × width × [r, g, b]`, already rescaled.
pub type ImageTensor = Vec<Vec<[f32; 3]>>;

/// Decodes, resizes and rescales an uploaded image into model input.
pub fn preprocess(bytes: &[u8], config: &ImageConfig) -> Result<ImageTensor, ClassifierError> {
    let [height, width] = config.size;
    let decoded = image::load_from_memory(bytes)
        .map_err(|e| ClassifierError::InvalidImage(e.to_string()))?;

    let filter = match config.resize_method {
        ResizeMethod::Nearest => FilterType::Nearest,
        ResizeMethod::Bilinear => FilterType::Triangle,
    };
    let rgb = decoded.resize_exact(width, height, filter).to_rgb8();

    let scale = config.rescale;
    let tensor = rgb
        .rows()
        .map(|row| {
            row.map(|pixel| {
                let [r, g, b] = pixel.0;
                [r as f32 * scale, g as f32 * scale, b as f32 * scale]
            })
            .collect()
        })
        .collect();
    Ok(tensor)
}
