//! Slice planning
//!
//! Turns image dimensions plus slicing parameters into an ordered list of
//! pixel rectangles that tile the image along one axis. This is pure
//! arithmetic: no decoding and no I/O happen here.
//!
//! Remainder handling:
//! - By size: every slice is `size` pixels long except the last one, which
//!   keeps whatever is left (`length % size`). Nothing is redistributed.
//! - By count: lengths differ by at most one pixel, and the longer slices come
//!   first (`length % count` slices get the extra pixel).

use serde::Serialize;
use strum_macros::{Display, EnumString};

use super::error::{SliceError, SliceResult};

/// Direction of the cuts
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Display, EnumString)]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
#[serde(rename_all = "lowercase")]
pub enum SliceAxis {
    /// Cuts run parallel to the width, producing stacked rows
    Horizontal,
    /// Cuts run parallel to the height, producing side-by-side columns
    Vertical,
}

impl SliceAxis {
    /// Image length along this axis (the dimension that gets divided)
    pub fn length_of(self, width: u32, height: u32) -> u32 {
        match self {
            SliceAxis::Horizontal => height,
            SliceAxis::Vertical => width,
        }
    }

    /// Image extent perpendicular to this axis (kept whole in every slice)
    pub fn extent_of(self, width: u32, height: u32) -> u32 {
        match self {
            SliceAxis::Horizontal => width,
            SliceAxis::Vertical => height,
        }
    }
}

/// How the slicing parameter is interpreted
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Display, EnumString)]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
#[serde(rename_all = "lowercase")]
pub enum SliceModeKind {
    /// Fixed pixel length per slice
    Size,
    /// Fixed number of slices
    Count,
}

/// Slicing mode together with its numeric parameter
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(tag = "mode", content = "value", rename_all = "lowercase")]
pub enum SliceMode {
    /// Target pixel length per slice
    #[serde(rename = "size")]
    BySize(u32),
    /// Target number of slices
    #[serde(rename = "count")]
    ByCount(u32),
}

impl SliceMode {
    pub fn new(kind: SliceModeKind, value: u32) -> Self {
        match kind {
            SliceModeKind::Size => SliceMode::BySize(value),
            SliceModeKind::Count => SliceMode::ByCount(value),
        }
    }

    pub fn kind(&self) -> SliceModeKind {
        match self {
            SliceMode::BySize(_) => SliceModeKind::Size,
            SliceMode::ByCount(_) => SliceModeKind::Count,
        }
    }

    pub fn value(&self) -> u32 {
        match *self {
            SliceMode::BySize(value) | SliceMode::ByCount(value) => value,
        }
    }
}

/// One slice, in source image pixel coordinates
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct SliceRect {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

impl SliceRect {
    /// Start of the rectangle along the slicing axis
    pub fn offset_along(&self, axis: SliceAxis) -> u32 {
        match axis {
            SliceAxis::Horizontal => self.y,
            SliceAxis::Vertical => self.x,
        }
    }

    /// Length of the rectangle along the slicing axis
    pub fn length_along(&self, axis: SliceAxis) -> u32 {
        match axis {
            SliceAxis::Horizontal => self.height,
            SliceAxis::Vertical => self.width,
        }
    }

    pub fn right(&self) -> u32 {
        self.x + self.width
    }

    pub fn bottom(&self) -> u32 {
        self.y + self.height
    }
}

/// Ordered slices covering the whole image, first slice at the image origin
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SlicePlan {
    pub image_width: u32,
    pub image_height: u32,
    pub axis: SliceAxis,
    pub mode: SliceMode,
    slices: Vec<SliceRect>,
}

impl SlicePlan {
    pub fn slices(&self) -> &[SliceRect] {
        &self.slices
    }

    pub fn len(&self) -> usize {
        self.slices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slices.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, SliceRect> {
        self.slices.iter()
    }

    /// Image length along the slicing axis
    pub fn axis_length(&self) -> u32 {
        self.axis.length_of(self.image_width, self.image_height)
    }

    /// Slice lengths along the slicing axis, in order
    pub fn lengths(&self) -> Vec<u32> {
        self.slices
            .iter()
            .map(|rect| rect.length_along(self.axis))
            .collect()
    }

    /// Slice offsets along the slicing axis, in order
    pub fn offsets(&self) -> Vec<u32> {
        self.slices
            .iter()
            .map(|rect| rect.offset_along(self.axis))
            .collect()
    }

    /// True when a by-size plan ends with a slice shorter than the requested size
    pub fn has_short_tail(&self) -> bool {
        match self.mode {
            SliceMode::BySize(size) => self
                .slices
                .last()
                .is_some_and(|last| last.length_along(self.axis) < size),
            SliceMode::ByCount(_) => false,
        }
    }
}

impl<'a> IntoIterator for &'a SlicePlan {
    type Item = &'a SliceRect;
    type IntoIter = std::slice::Iter<'a, SliceRect>;

    fn into_iter(self) -> Self::IntoIter {
        self.slices.iter()
    }
}

/// Compute the slice rectangles for an image of `width` x `height` pixels.
pub fn plan_slices(
    width: u32,
    height: u32,
    axis: SliceAxis,
    mode: SliceMode,
) -> SliceResult<SlicePlan> {
    if width == 0 || height == 0 {
        return Err(SliceError::InvalidParameter(format!(
            "image dimensions must be greater than 0, got {}x{}",
            width, height
        )));
    }

    let length = axis.length_of(width, height);
    let lengths = match mode {
        SliceMode::BySize(size) => lengths_by_size(length, size)?,
        SliceMode::ByCount(count) => lengths_by_count(length, count)?,
    };

    let mut slices = Vec::with_capacity(lengths.len());
    let mut offset = 0u32;
    for slice_length in lengths {
        let rect = match axis {
            SliceAxis::Horizontal => SliceRect {
                x: 0,
                y: offset,
                width,
                height: slice_length,
            },
            SliceAxis::Vertical => SliceRect {
                x: offset,
                y: 0,
                width: slice_length,
                height,
            },
        };
        slices.push(rect);
        offset += slice_length;
    }
    debug_assert_eq!(offset, length);

    Ok(SlicePlan {
        image_width: width,
        image_height: height,
        axis,
        mode,
        slices,
    })
}

/// Full `size` slices followed by one short slice for the remainder, if any.
fn lengths_by_size(length: u32, size: u32) -> SliceResult<Vec<u32>> {
    if size == 0 {
        return Err(SliceError::InvalidParameter(
            "slice size must be greater than 0".to_string(),
        ));
    }

    let full = (length / size) as usize;
    let remainder = length % size;

    let mut lengths = vec![size; full];
    if remainder > 0 {
        lengths.push(remainder);
    }
    Ok(lengths)
}

/// Balanced partition; the first `length % count` slices are one pixel longer.
fn lengths_by_count(length: u32, count: u32) -> SliceResult<Vec<u32>> {
    if count == 0 {
        return Err(SliceError::InvalidParameter(
            "slice count must be greater than 0".to_string(),
        ));
    }
    if count > length {
        return Err(SliceError::NotPartitionable { length, count });
    }

    let base = length / count;
    let remainder = length % count;

    Ok((0..count)
        .map(|i| if i < remainder { base + 1 } else { base })
        .collect())
}

/// Parse a user-entered slicing parameter.
///
/// Accepts positive whole numbers (`"30"`, `" 30 "`, `"30.0"`). Zero, negative,
/// fractional and non-numeric input is rejected with `InvalidParameter`.
pub fn parse_slice_value(text: &str) -> SliceResult<u32> {
    let trimmed = text.trim();

    if let Ok(value) = trimmed.parse::<u32>() {
        if value == 0 {
            return Err(SliceError::InvalidParameter(
                "slice value must be greater than 0".to_string(),
            ));
        }
        return Ok(value);
    }

    match trimmed.parse::<f64>() {
        Ok(value) if !value.is_finite() => Err(SliceError::InvalidParameter(format!(
            "slice value must be a finite number, got '{}'",
            trimmed
        ))),
        Ok(value) if value <= 0.0 => Err(SliceError::InvalidParameter(format!(
            "slice value must be greater than 0, got '{}'",
            trimmed
        ))),
        Ok(value) if value.fract() != 0.0 => Err(SliceError::InvalidParameter(format!(
            "slice value must be a whole number, got '{}'",
            trimmed
        ))),
        Ok(value) if value > u32::MAX as f64 => Err(SliceError::InvalidParameter(format!(
            "slice value is too large: '{}'",
            trimmed
        ))),
        Ok(value) => Ok(value as u32),
        Err(_) => Err(SliceError::InvalidParameter(format!(
            "'{}' is not a number",
            trimmed
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_by_size_vertical_with_remainder() {
        let plan = plan_slices(100, 50, SliceAxis::Vertical, SliceMode::BySize(30)).unwrap();

        assert_eq!(plan.lengths(), vec![30, 30, 30, 10]);
        assert_eq!(plan.offsets(), vec![0, 30, 60, 90]);
        assert!(plan.iter().all(|rect| rect.height == 50 && rect.y == 0));
        assert!(plan.has_short_tail());
    }

    #[test]
    fn test_by_count_horizontal_larger_first() {
        let plan = plan_slices(100, 50, SliceAxis::Horizontal, SliceMode::ByCount(3)).unwrap();

        assert_eq!(plan.lengths(), vec![17, 17, 16]);
        assert_eq!(plan.offsets(), vec![0, 17, 34]);
        assert!(plan.iter().all(|rect| rect.width == 100 && rect.x == 0));
        assert_eq!(plan.lengths().iter().sum::<u32>(), 50);
        assert!(!plan.has_short_tail());
    }

    #[test]
    fn test_single_count_is_full_image() {
        let plan = plan_slices(640, 480, SliceAxis::Vertical, SliceMode::ByCount(1)).unwrap();
        assert_eq!(
            plan.slices(),
            &[SliceRect {
                x: 0,
                y: 0,
                width: 640,
                height: 480
            }]
        );
    }

    #[test]
    fn test_size_equal_to_length_is_full_image() {
        let plan = plan_slices(640, 480, SliceAxis::Horizontal, SliceMode::BySize(480)).unwrap();
        assert_eq!(plan.len(), 1);
        assert_eq!(plan.slices()[0].height, 480);
        assert!(!plan.has_short_tail());
    }

    #[test]
    fn test_size_larger_than_length() {
        let plan = plan_slices(20, 10, SliceAxis::Vertical, SliceMode::BySize(500)).unwrap();
        assert_eq!(plan.lengths(), vec![20]);
        // A single slice is the whole image, even if shorter than requested
        assert!(plan.has_short_tail());
    }

    #[test]
    fn test_even_division_by_size() {
        let plan = plan_slices(90, 10, SliceAxis::Vertical, SliceMode::BySize(30)).unwrap();
        assert_eq!(plan.lengths(), vec![30, 30, 30]);
        assert!(!plan.has_short_tail());
    }

    #[test]
    fn test_count_equal_to_length() {
        let plan = plan_slices(4, 7, SliceAxis::Vertical, SliceMode::ByCount(4)).unwrap();
        assert_eq!(plan.lengths(), vec![1, 1, 1, 1]);
    }

    #[test]
    fn test_count_greater_than_length() {
        let err = plan_slices(4, 7, SliceAxis::Vertical, SliceMode::ByCount(5)).unwrap_err();
        assert_eq!(
            err,
            SliceError::NotPartitionable {
                length: 4,
                count: 5
            }
        );
    }

    #[test]
    fn test_zero_parameters_rejected() {
        assert!(matches!(
            plan_slices(10, 10, SliceAxis::Vertical, SliceMode::BySize(0)),
            Err(SliceError::InvalidParameter(_))
        ));
        assert!(matches!(
            plan_slices(10, 10, SliceAxis::Vertical, SliceMode::ByCount(0)),
            Err(SliceError::InvalidParameter(_))
        ));
        assert!(matches!(
            plan_slices(0, 10, SliceAxis::Vertical, SliceMode::BySize(3)),
            Err(SliceError::InvalidParameter(_))
        ));
        assert!(matches!(
            plan_slices(10, 0, SliceAxis::Horizontal, SliceMode::ByCount(1)),
            Err(SliceError::InvalidParameter(_))
        ));
    }

    #[test]
    fn test_parse_slice_value() {
        assert_eq!(parse_slice_value("30"), Ok(30));
        assert_eq!(parse_slice_value(" 7 "), Ok(7));
        assert_eq!(parse_slice_value("12.0"), Ok(12));

        for bad in ["0", "-3", "2.5", "abc", "", "NaN", "inf", "1e20"] {
            assert!(
                matches!(parse_slice_value(bad), Err(SliceError::InvalidParameter(_))),
                "expected '{}' to be rejected",
                bad
            );
        }
    }

    #[test]
    fn test_axis_and_mode_from_str() {
        assert_eq!("horizontal".parse::<SliceAxis>(), Ok(SliceAxis::Horizontal));
        assert_eq!("Vertical".parse::<SliceAxis>(), Ok(SliceAxis::Vertical));
        assert_eq!("count".parse::<SliceModeKind>(), Ok(SliceModeKind::Count));
        assert!("diagonal".parse::<SliceAxis>().is_err());

        assert_eq!(SliceAxis::Vertical.to_string(), "vertical");
        assert_eq!(SliceMode::new(SliceModeKind::Size, 8), SliceMode::BySize(8));
        assert_eq!(SliceMode::ByCount(3).kind(), SliceModeKind::Count);
        assert_eq!(SliceMode::ByCount(3).value(), 3);
    }

    #[test]
    fn test_mode_serializes_with_tag() {
        let json = serde_json::to_string(&SliceMode::BySize(30)).unwrap();
        assert_eq!(json, r#"{"mode":"size","value":30}"#);
    }
}
