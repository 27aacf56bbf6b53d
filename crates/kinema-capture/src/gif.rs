//! Animated GIF and still-image encoding via the `image` crate.

use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::Path;

use image::codecs::gif::{GifDecoder, GifEncoder, Repeat};
use image::{AnimationDecoder, Delay, Frame as GifFrame, RgbaImage};
use kinema_render::Frame;

use crate::error::ExportError;

/// GIF encoding parameters.
#[derive(Debug, Clone, Copy)]
pub struct GifSettings {
    /// Playback frame rate.
    pub fps: u32,
    /// Quantization speed (1 = best palette, 30 = fastest/smallest).
    pub speed: i32,
}

impl Default for GifSettings {
    fn default() -> Self {
        Self { fps: 25, speed: 10 }
    }
}

/// Quantize a float frame to 8-bit RGBA.
pub fn frame_to_rgba(frame: &Frame) -> Result<RgbaImage, ExportError> {
    let data: Vec<u8> = frame
        .color()
        .iter()
        .map(|&v| (v * 255.0).clamp(0.0, 255.0) as u8)
        .collect();
    RgbaImage::from_raw(frame.width(), frame.height(), data).ok_or(ExportError::BadFrame)
}

/// Encode an ordered frame sequence into an animated GIF on disk.
pub fn encode_gif<P: AsRef<Path>>(
    path: P,
    frames: &[Frame],
    settings: &GifSettings,
) -> Result<(), ExportError> {
    if frames.is_empty() {
        return Err(ExportError::EmptySequence);
    }

    let file = File::create(path)?;
    let mut encoder = GifEncoder::new_with_speed(BufWriter::new(file), settings.speed);
    encoder.set_repeat(Repeat::Infinite)?;

    let delay = Delay::from_numer_denom_ms(1000, settings.fps);
    for frame in frames {
        let image = frame_to_rgba(frame)?;
        encoder.encode_frame(GifFrame::from_parts(image, 0, 0, delay))?;
    }
    Ok(())
}

/// Re-encode a GIF in place at the fastest quantization speed, trading
/// palette quality for file size.
pub fn optimize_gif<P: AsRef<Path>>(path: P) -> Result<(), ExportError> {
    let input = File::open(&path)?;
    let decoder = GifDecoder::new(BufReader::new(input))?;
    let frames = decoder.into_frames().collect_frames()?;

    let output = File::create(&path)?;
    let mut encoder = GifEncoder::new_with_speed(BufWriter::new(output), 30);
    encoder.set_repeat(Repeat::Infinite)?;
    for frame in frames {
        encoder.encode_frame(frame)?;
    }
    Ok(())
}

/// Write one frame as a PNG.
pub fn save_png<P: AsRef<Path>>(path: P, frame: &Frame) -> Result<(), ExportError> {
    let image = frame_to_rgba(frame)?;
    image.save(path)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use kinema_render::{MountedCamera, RenderScene};

    fn checker_frames(n: usize) -> Vec<Frame> {
        // Render trivially different frames by moving the ground camera.
        let mut frames = Vec::new();
        let mut scene = RenderScene::new();
        scene.set_ambient_light([1.0, 1.0, 1.0]);
        scene.add_ground(0.0);
        for i in 0..n {
            let camera = MountedCamera::new(16, 16, 1.0, 0.01, 100.0).with_local_pose(
                kinema_ir::Pose::from_euler(
                    [0.0, 0.0, 1.0 + i as f64],
                    0.0,
                    0.5,
                    0.0,
                ),
            );
            frames.push(camera.capture(&scene));
        }
        frames
    }

    #[test]
    fn test_frame_quantization() {
        let frames = checker_frames(1);
        let image = frame_to_rgba(&frames[0]).unwrap();
        assert_eq!(image.dimensions(), (16, 16));
    }

    #[test]
    fn test_gif_round_trip_keeps_frame_count() {
        let dir = std::env::temp_dir().join("kinema-capture-test");
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("loop.gif");

        let frames = checker_frames(5);
        encode_gif(&path, &frames, &GifSettings::default()).unwrap();

        let decoder = GifDecoder::new(BufReader::new(File::open(&path).unwrap())).unwrap();
        let decoded = decoder.into_frames().collect_frames().unwrap();
        assert_eq!(decoded.len(), 5);

        optimize_gif(&path).unwrap();
        let decoder = GifDecoder::new(BufReader::new(File::open(&path).unwrap())).unwrap();
        assert_eq!(decoder.into_frames().collect_frames().unwrap().len(), 5);
    }

    #[test]
    fn test_empty_sequence_is_rejected() {
        let path = std::env::temp_dir().join("kinema-capture-empty.gif");
        let err = encode_gif(&path, &[], &GifSettings::default()).unwrap_err();
        assert!(matches!(err, ExportError::EmptySequence));
    }
}
