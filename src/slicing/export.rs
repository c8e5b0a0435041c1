use anyhow::{Context, Result};
use image::codecs::jpeg::JpegEncoder;
use image::{DynamicImage, ImageFormat};
use serde::Serialize;
use std::fs::{self, File};
use std::io::{BufWriter, Seek, Write};
use std::path::{Path, PathBuf};

use super::planner::{SlicePlan, SliceRect};
use crate::cli::OutputFormat;
use crate::utils::sanitize_filename;

/// Base name used when none (or only whitespace) is given
pub const DEFAULT_BASE_NAME: &str = "E-IMG slices";

/// JPEG quality used when none is given
pub const DEFAULT_JPEG_QUALITY: u8 = 95;

/// A slice together with the file it will be written to
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PlannedSlice {
    /// 1-based position in the plan
    pub index: usize,
    pub rect: SliceRect,
    pub path: PathBuf,
}

/// Trim and sanitize a user-supplied base name, falling back to the default
pub fn normalize_base_name(name: &str) -> String {
    let sanitized = sanitize_filename(name);
    if sanitized.is_empty() {
        DEFAULT_BASE_NAME.to_string()
    } else {
        sanitized
    }
}

/// File name for one slice: `{base}_{index}_{offset}.{ext}`
///
/// `offset` is the slice's pixel offset along the slicing axis, so names stay
/// unique and sort back into image order.
pub fn slice_filename(base_name: &str, index: usize, offset: u32, format: OutputFormat) -> String {
    format!("{}_{}_{}.{}", base_name, index, offset, format.extension())
}

/// Pair every rectangle of `plan` with its output path inside `output_dir`
pub fn planned_outputs(
    plan: &SlicePlan,
    output_dir: &Path,
    base_name: &str,
    format: OutputFormat,
) -> Vec<PlannedSlice> {
    let base_name = normalize_base_name(base_name);

    plan.iter()
        .enumerate()
        .map(|(i, rect)| {
            let index = i + 1;
            let filename =
                slice_filename(&base_name, index, rect.offset_along(plan.axis), format);
            PlannedSlice {
                index,
                rect: *rect,
                path: output_dir.join(filename),
            }
        })
        .collect()
}

/// Output paths that already exist on disk
pub fn find_conflicts(outputs: &[PlannedSlice]) -> Vec<PathBuf> {
    outputs
        .iter()
        .filter(|slice| slice.path.exists())
        .map(|slice| slice.path.clone())
        .collect()
}

/// Copy one rectangle out of the decoded image
pub fn crop_slice(image: &DynamicImage, rect: &SliceRect) -> DynamicImage {
    image.crop_imm(rect.x, rect.y, rect.width, rect.height)
}

/// Encode and write a slice. JPEG output is flattened to RGB first.
///
/// A file that was created but could not be fully written is removed again.
pub fn save_slice(
    image: &DynamicImage,
    path: &Path,
    format: OutputFormat,
    jpeg_quality: u8,
) -> Result<()> {
    let file = File::create(path)
        .with_context(|| format!("Failed to create file: {}", path.display()))?;
    let mut writer = BufWriter::new(file);

    let written = encode_slice(image, &mut writer, format, jpeg_quality)
        .and_then(|()| writer.flush().context("Failed to flush file"));

    if let Err(e) = written {
        drop(writer);
        let _ = fs::remove_file(path);
        return Err(e.context(format!("Failed to save slice: {}", path.display())));
    }

    Ok(())
}

fn encode_slice<W: Write + Seek>(
    image: &DynamicImage,
    writer: &mut W,
    format: OutputFormat,
    jpeg_quality: u8,
) -> Result<()> {
    match format {
        OutputFormat::Jpg => {
            let encoder = JpegEncoder::new_with_quality(writer, jpeg_quality);
            image
                .to_rgb8()
                .write_with_encoder(encoder)
                .context("Failed to encode JPEG")
        }
        OutputFormat::Png => image
            .write_to(writer, ImageFormat::Png)
            .context("Failed to encode PNG"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::slicing::planner::{plan_slices, SliceAxis, SliceMode};
    use image::{GenericImageView, Rgb, RgbImage};

    #[test]
    fn test_slice_filename() {
        assert_eq!(
            slice_filename("E-IMG slices", 1, 0, OutputFormat::Jpg),
            "E-IMG slices_1_0.jpg"
        );
        assert_eq!(
            slice_filename("poster", 4, 90, OutputFormat::Png),
            "poster_4_90.png"
        );
    }

    #[test]
    fn test_normalize_base_name() {
        assert_eq!(normalize_base_name("  "), DEFAULT_BASE_NAME);
        assert_eq!(normalize_base_name(" banner "), "banner");
        assert_eq!(normalize_base_name("a/b:c"), "a_b_c");
    }

    #[test]
    fn test_planned_outputs_use_axis_offsets() {
        let plan = plan_slices(100, 50, SliceAxis::Vertical, SliceMode::BySize(30)).unwrap();
        let outputs = planned_outputs(&plan, Path::new("out"), "img", OutputFormat::Png);

        let names: Vec<_> = outputs
            .iter()
            .map(|slice| slice.path.file_name().unwrap().to_string_lossy().to_string())
            .collect();
        assert_eq!(
            names,
            vec!["img_1_0.png", "img_2_30.png", "img_3_60.png", "img_4_90.png"]
        );
        assert!(outputs.iter().all(|slice| slice.path.starts_with("out")));
        assert_eq!(outputs[3].rect.width, 10);
    }

    #[test]
    fn test_crop_slice() {
        let mut img = RgbImage::from_pixel(10, 6, Rgb([0, 0, 0]));
        img.put_pixel(4, 5, Rgb([255, 0, 0]));
        let image = DynamicImage::ImageRgb8(img);

        let rect = SliceRect {
            x: 4,
            y: 3,
            width: 2,
            height: 3,
        };
        let slice = crop_slice(&image, &rect);

        assert_eq!(slice.dimensions(), (2, 3));
        assert_eq!(slice.to_rgb8().get_pixel(0, 2), &Rgb([255, 0, 0]));
    }

    #[test]
    fn test_save_slice_writes_png() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("slice.png");
        let image = DynamicImage::ImageRgb8(RgbImage::from_pixel(3, 2, Rgb([1, 2, 3])));

        save_slice(&image, &path, OutputFormat::Png, DEFAULT_JPEG_QUALITY).unwrap();
        let written = image::open(&path).unwrap();
        assert_eq!(written.dimensions(), (3, 2));
    }

    #[test]
    fn test_failed_encode_leaves_no_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("too_wide.jpg");

        // JPEG cannot store a width above 65535
        let image = DynamicImage::new_rgb8(70_000, 1);
        let result = save_slice(&image, &path, OutputFormat::Jpg, DEFAULT_JPEG_QUALITY);

        assert!(result.is_err());
        assert!(!path.exists());
    }
}
