use image::{DynamicImage, ImageEncoder, codecs::jpeg::JpegEncoder};
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::{debug, warn};

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct OutputConfig {
    pub jpeg_quality: u8,
    /// Copy the upload's ICC profile into the stamped JPEG
    pub preserve_icc_profile: bool,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            jpeg_quality: 95,
            preserve_icc_profile: true,
        }
    }
}

/// Extract the ICC profile from JPEG bytes.
///
/// Large profiles are split over several APP2 `ICC_PROFILE` segments, each
/// tagged with a 1-based sequence number and the total count. The chunks are
/// joined in sequence order; an incomplete or inconsistent set yields `None`.
pub fn extract_icc_profile(buffer: &[u8]) -> Option<Vec<u8>> {
    if !buffer.starts_with(&[0xFF, 0xD8]) {
        return None;
    }

    let mut chunks: Vec<Option<&[u8]>> = Vec::new();
    let mut pos = 2;
    while pos + 4 <= buffer.len() {
        if buffer[pos] != 0xFF {
            pos += 1;
            continue;
        }

        let marker = buffer[pos + 1];
        // Start of scan: no more metadata segments follow
        if marker == 0xDA {
            break;
        }

        let segment_length = u16::from_be_bytes([buffer[pos + 2], buffer[pos + 3]]) as usize;
        let segment_end = pos + 2 + segment_length;
        if segment_length < 2 || segment_end > buffer.len() {
            break;
        }

        if marker == 0xE2 {
            let segment_data = &buffer[pos + 4..segment_end];
            // Identifier, then sequence number and chunk count
            if segment_data.len() > 14 && segment_data.starts_with(b"ICC_PROFILE\0") {
                let sequence = segment_data[12] as usize;
                let count = segment_data[13] as usize;
                if chunks.is_empty() {
                    chunks.resize(count, None);
                }
                if sequence == 0 || count != chunks.len() || sequence > count {
                    warn!(
                        "Inconsistent ICC profile chunk {} of {}, dropping profile",
                        sequence, count
                    );
                    return None;
                }
                chunks[sequence - 1] = Some(&segment_data[14..]);
            }
        }

        pos = segment_end;
    }

    if chunks.is_empty() {
        return None;
    }
    let mut profile = Vec::new();
    for (index, chunk) in chunks.iter().enumerate() {
        match chunk {
            Some(data) => profile.extend_from_slice(data),
            None => {
                warn!(
                    "ICC profile chunk {} of {} missing, dropping profile",
                    index + 1,
                    chunks.len()
                );
                return None;
            }
        }
    }

    debug!(
        "Found ICC profile in JPEG: {} bytes in {} chunks",
        profile.len(),
        chunks.len()
    );
    Some(profile)
}

/// Encode as baseline JPEG, flattening any alpha channel.
pub fn encode_jpeg(
    image: &DynamicImage,
    quality: u8,
    icc_profile: Option<&[u8]>,
) -> Result<Vec<u8>, image::ImageError> {
    let rgb_image = image.to_rgb8();
    let mut output = Vec::new();
    let mut encoder = JpegEncoder::new_with_quality(&mut output, quality.clamp(1, 100));

    if let Some(profile_data) = icc_profile {
        if let Err(e) = encoder.set_icc_profile(profile_data.to_vec()) {
            debug!(
                "Failed to set ICC profile on JPEG encoder ({}), writing without it",
                e
            );
        }
    }

    encoder.write_image(
        &rgb_image,
        rgb_image.width(),
        rgb_image.height(),
        image::ExtendedColorType::Rgb8,
    )?;

    Ok(output)
}

pub fn save_jpeg(path: &Path, jpeg: &[u8]) -> std::io::Result<()> {
    std::fs::write(path, jpeg)?;
    debug!("Wrote {} bytes to {:?}", jpeg.len(), path);
    Ok(())
}
