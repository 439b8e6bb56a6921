//! Thumbnail generation.
//!
//! Without real frame extraction the worker renders a deterministic
//! placeholder image seeded from the video id, so the same video always
//! gets the same thumbnail. Thumbnail failures never fail the job; the
//! record falls back to [`PLACEHOLDER_KEY`].

use std::io::Cursor;

use image::{ImageOutputFormat, Rgb, RgbImage};
use vflow_models::VideoId;

use crate::error::{WorkerError, WorkerResult};

/// Key of the shared fallback thumbnail.
pub const PLACEHOLDER_KEY: &str = "thumbnails/placeholder.png";

const WIDTH: u32 = 320;
const HEIGHT: u32 = 180;

fn seed_from_id(video_id: &VideoId) -> u64 {
    // FNV-1a, stable across runs unlike the stdlib hasher.
    let mut hash: u64 = 0xcbf29ce484222325;
    for byte in video_id.as_str().bytes() {
        hash ^= byte as u64;
        hash = hash.wrapping_mul(0x100000001b3);
    }
    hash
}

/// Render a PNG thumbnail for the given video id.
pub fn render_png(video_id: &VideoId) -> WorkerResult<Vec<u8>> {
    let seed = seed_from_id(video_id);
    let base = [
        (seed & 0xff) as u8,
        ((seed >> 8) & 0xff) as u8,
        ((seed >> 16) & 0xff) as u8,
    ];

    let img = RgbImage::from_fn(WIDTH, HEIGHT, |x, y| {
        let fx = x as f32 / WIDTH as f32;
        let fy = y as f32 / HEIGHT as f32;
        Rgb([
            (base[0] as f32 * (1.0 - fx) + 255.0 * fx * 0.5) as u8,
            (base[1] as f32 * (1.0 - fy) + 255.0 * fy * 0.5) as u8,
            base[2].saturating_add((fx * fy * 64.0) as u8),
        ])
    });

    let mut buf = Cursor::new(Vec::new());
    image::DynamicImage::ImageRgb8(img)
        .write_to(&mut buf, ImageOutputFormat::Png)
        .map_err(|e| WorkerError::processing(format!("thumbnail encode failed: {e}")))?;
    Ok(buf.into_inner())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn render_is_deterministic_per_id() {
        let id = VideoId::from_string("abc-123".to_string());
        let a = render_png(&id).unwrap();
        let b = render_png(&id).unwrap();
        assert_eq!(a, b);
        assert!(!a.is_empty());
    }

    #[test]
    fn different_ids_differ() {
        let a = render_png(&VideoId::from_string("one".to_string())).unwrap();
        let b = render_png(&VideoId::from_string("two".to_string())).unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn output_is_png() {
        let bytes = render_png(&VideoId::new()).unwrap();
        assert_eq!(&bytes[..8], &[0x89, b'P', b'N', b'G', 0x0d, 0x0a, 0x1a, 0x0a]);
    }
}
