use image::{DynamicImage, GenericImageView};
use serde::Serialize;
use std::fmt;
use std::path::Path;

use super::planner::{SliceMode, SlicePlan};

/// A run of consecutive slices sharing the same size
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SizeGroup {
    pub count: usize,
    pub width: u32,
    pub height: u32,
}

/// Remark attached to a preview when slices are not all the same size
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum PreviewNote {
    /// By-size plan whose last slice is shorter than the requested size
    ShortTail { length: u32 },
    /// By-count plan where the first `larger` slices got one extra pixel
    Distributed { larger: usize },
}

/// Human-oriented summary of a plan, shown before anything is exported
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PlanPreview {
    pub total: usize,
    pub groups: Vec<SizeGroup>,
    pub note: Option<PreviewNote>,
}

impl PlanPreview {
    pub fn from_plan(plan: &SlicePlan) -> Self {
        let mut groups: Vec<SizeGroup> = Vec::new();
        for rect in plan {
            match groups.last_mut() {
                Some(group) if group.width == rect.width && group.height == rect.height => {
                    group.count += 1;
                }
                _ => groups.push(SizeGroup {
                    count: 1,
                    width: rect.width,
                    height: rect.height,
                }),
            }
        }

        let note = match plan.mode {
            SliceMode::BySize(_) if plan.has_short_tail() && plan.len() > 1 => plan
                .slices()
                .last()
                .map(|last| PreviewNote::ShortTail {
                    length: last.length_along(plan.axis),
                }),
            SliceMode::ByCount(_) if groups.len() > 1 => Some(PreviewNote::Distributed {
                larger: groups[0].count,
            }),
            _ => None,
        };

        Self {
            total: plan.len(),
            groups,
            note,
        }
    }
}

impl fmt::Display for PlanPreview {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Will produce {} slice(s)", self.total)?;

        if let [only] = self.groups.as_slice() {
            write!(f, "  Each slice: {}x{} px", only.width, only.height)?;
        } else {
            for (i, group) in self.groups.iter().enumerate() {
                let label = if i == 0 { "First" } else { "Next" };
                write!(
                    f,
                    "  {} {}: {}x{} px",
                    label, group.count, group.width, group.height
                )?;
                if i + 1 < self.groups.len() {
                    writeln!(f)?;
                }
            }
        }

        match self.note {
            Some(PreviewNote::ShortTail { length }) => write!(
                f,
                "\n  Last slice is only {} px long and will be exported as-is",
                length
            ),
            Some(PreviewNote::Distributed { larger }) => write!(
                f,
                "\n  Remainder spread over the first {} slice(s), one extra pixel each",
                larger
            ),
            None => Ok(()),
        }
    }
}

/// Facts about the source image shown before the slice preview
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ImageInfo {
    pub file_name: String,
    pub width: u32,
    pub height: u32,
    pub color: String,
    /// Size on disk, when the file could be inspected
    pub file_size: Option<u64>,
}

impl ImageInfo {
    pub fn new(path: &Path, image: &DynamicImage) -> Self {
        let (width, height) = image.dimensions();
        Self {
            file_name: path
                .file_name()
                .map(|name| name.to_string_lossy().to_string())
                .unwrap_or_else(|| path.display().to_string()),
            width,
            height,
            color: format!("{:?}", image.color()),
            file_size: std::fs::metadata(path).ok().map(|meta| meta.len()),
        }
    }
}

impl fmt::Display for ImageInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}: {}x{} px, {}",
            self.file_name, self.width, self.height, self.color
        )?;
        if let Some(bytes) = self.file_size {
            write!(f, ", {:.2} KB", bytes as f64 / 1024.0)?;
        }
        Ok(())
    }
}
