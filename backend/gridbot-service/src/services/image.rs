/// Image conversion for NFT artwork
///
/// Resizes an uploaded image to exact target dimensions (scale to cover, then
/// centre crop) and re-encodes it as AVIF. Decoding and encoding are CPU bound
/// and run on the blocking pool.
use image::codecs::avif::AvifEncoder;
use image::imageops::FilterType;
use image::{ColorType, GenericImageView, ImageEncoder};
use serde::Deserialize;

pub const MAX_DIMENSION: u32 = 4096;

pub const AVIF_CONTENT_TYPE: &str = "image/avif";
pub const AVIF_EXTENSION: &str = "avif";

/// Encoder speed 1 (slowest) ..= 10 (fastest)
const AVIF_SPEED: u8 = 8;
const AVIF_QUALITY: u8 = 80;

#[derive(Debug, thiserror::Error)]
pub enum ImageError {
    #[error("Invalid dimensions: {width}x{height} (each side must be 1..={MAX_DIMENSION})")]
    InvalidDimensions { width: u32, height: u32 },

    #[error("Could not decode image: {0}")]
    Decode(#[source] image::ImageError),

    #[error("Could not encode image: {0}")]
    Encode(#[source] image::ImageError),

    #[error("Image worker failed: {0}")]
    Worker(String),
}

/// Target size requested by the client
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct Dimensions {
    pub width: u32,
    pub height: u32,
}

impl Dimensions {
    pub fn validate(&self) -> Result<(), ImageError> {
        let in_range = |side: u32| (1..=MAX_DIMENSION).contains(&side);
        if in_range(self.width) && in_range(self.height) {
            Ok(())
        } else {
            Err(ImageError::InvalidDimensions {
                width: self.width,
                height: self.height,
            })
        }
    }
}

#[derive(Debug, Clone)]
pub struct ConvertedImage {
    pub bytes: Vec<u8>,
    pub width: u32,
    pub height: u32,
    pub content_type: &'static str,
    pub extension: &'static str,
}

/// Resize `input` to `dims` and encode as AVIF (blocking)
pub fn convert_to_avif(input: &[u8], dims: Dimensions) -> Result<ConvertedImage, ImageError> {
    dims.validate()?;

    let img = image::load_from_memory(input).map_err(ImageError::Decode)?;
    let resized = img.resize_to_fill(dims.width, dims.height, FilterType::Lanczos3);
    let (width, height) = resized.dimensions();
    let rgba = resized.to_rgba8();

    let mut bytes = Vec::new();
    AvifEncoder::new_with_speed_quality(&mut bytes, AVIF_SPEED, AVIF_QUALITY)
        .write_image(rgba.as_raw(), width, height, ColorType::Rgba8)
        .map_err(ImageError::Encode)?;

    Ok(ConvertedImage {
        bytes,
        width,
        height,
        content_type: AVIF_CONTENT_TYPE,
        extension: AVIF_EXTENSION,
    })
}

/// Run [`convert_to_avif`] on the blocking pool
///
/// A panic inside the codec surfaces as [`ImageError::Worker`] instead of
/// taking the process down.
pub async fn convert(input: Vec<u8>, dims: Dimensions) -> Result<ConvertedImage, ImageError> {
    dims.validate()?;

    tokio::task::spawn_blocking(move || convert_to_avif(&input, dims))
        .await
        .map_err(|e| ImageError::Worker(e.to_string()))?
}
