use clap::{Parser, ValueEnum};
use std::path::{Path, PathBuf};
use strum_macros::EnumString;

use crate::slicing::{
    parse_slice_value, SliceAxis, SliceMode, SliceModeKind, SliceResult, DEFAULT_BASE_NAME,
    DEFAULT_JPEG_QUALITY,
};

#[derive(Debug, Clone, Copy, ValueEnum, PartialEq, Eq)]
pub enum Direction {
    /// Stacked rows: cuts run across the image, parallel to its width
    #[value(name = "horizontal", alias = "h")]
    Horizontal,
    /// Side-by-side columns: cuts run down the image, parallel to its height
    #[value(name = "vertical", alias = "v")]
    Vertical,
}

impl From<Direction> for SliceAxis {
    fn from(direction: Direction) -> Self {
        match direction {
            Direction::Horizontal => SliceAxis::Horizontal,
            Direction::Vertical => SliceAxis::Vertical,
        }
    }
}

impl From<SliceAxis> for Direction {
    fn from(axis: SliceAxis) -> Self {
        match axis {
            SliceAxis::Horizontal => Direction::Horizontal,
            SliceAxis::Vertical => Direction::Vertical,
        }
    }
}

#[derive(Debug, Clone, Copy, ValueEnum, PartialEq, Eq)]
pub enum ModeArg {
    /// --value is the length of each slice in pixels
    #[value(name = "size")]
    Size,
    /// --value is the number of slices
    #[value(name = "count")]
    Count,
}

impl From<ModeArg> for SliceModeKind {
    fn from(mode: ModeArg) -> Self {
        match mode {
            ModeArg::Size => SliceModeKind::Size,
            ModeArg::Count => SliceModeKind::Count,
        }
    }
}

impl From<SliceModeKind> for ModeArg {
    fn from(kind: SliceModeKind) -> Self {
        match kind {
            SliceModeKind::Size => ModeArg::Size,
            SliceModeKind::Count => ModeArg::Count,
        }
    }
}

#[derive(Debug, Clone, Copy, ValueEnum, PartialEq, Eq, EnumString)]
#[strum(ascii_case_insensitive)]
pub enum OutputFormat {
    /// JPEG files (alpha is dropped)
    #[value(name = "jpg", alias = "jpeg")]
    #[strum(serialize = "jpg", serialize = "jpeg")]
    Jpg,
    /// PNG files (lossless, keeps alpha)
    #[value(name = "png")]
    #[strum(serialize = "png")]
    Png,
}

impl OutputFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            OutputFormat::Jpg => "jpg",
            OutputFormat::Png => "png",
        }
    }
}

#[derive(Parser, Debug)]
#[command(
    name = "eimg-slices",
    version,
    about = "Slice an image into rows or columns and export each slice",
    long_about = "
E-IMG Slices - Image Slicer

Cuts one image into horizontal rows or vertical columns, either by a fixed slice
length in pixels or by a number of slices, and writes every slice as its own file.

Slicing rules:
• By size: every slice is VALUE pixels long; the last one keeps the remainder
• By count: VALUE slices whose lengths differ by at most 1 pixel, longer ones first

Output files are named {name}_{index}_{offset}.{format}, where offset is the
slice's pixel position along the slicing direction.

Example Usage:
  # Columns 300 px wide
  eimg-slices -i poster.png -o out --direction vertical --mode size --value 300

  # Three equal rows as PNG
  eimg-slices -i banner.jpg -o out -d horizontal -m count -n 3 --format png

  # Show what would be produced without writing anything
  eimg-slices -i banner.jpg -o out -m count -n 4 --dry-run --report

  # Stream progress as JSON lines (for GUI front ends)
  eimg-slices -i banner.jpg -o out -m size -n 200 --json-progress"
)]
pub struct Args {
    /// Image file to slice
    #[arg(short = 'i', long = "input", value_name = "FILE")]
    pub input: PathBuf,

    /// Output directory (default: configured directory, else the image's directory)
    #[arg(short = 'o', long = "output", value_name = "DIR")]
    pub output_dir: Option<PathBuf>,

    /// Slicing direction [default: vertical]
    #[arg(short = 'd', long = "direction")]
    pub direction: Option<Direction>,

    /// Slicing mode [default: size]
    #[arg(short = 'm', long = "mode")]
    pub mode: Option<ModeArg>,

    /// Slice length in pixels (size mode) or number of slices (count mode)
    #[arg(short = 'n', long = "value", value_name = "N", allow_hyphen_values = true)]
    pub value: Option<String>,

    /// Base name for output files [default: "E-IMG slices"]
    #[arg(long = "name", value_name = "NAME")]
    pub name: Option<String>,

    /// Output format [default: jpg]
    #[arg(short = 'f', long = "format")]
    pub format: Option<OutputFormat>,

    /// JPEG quality (1-100) [default: 95]
    #[arg(
        short = 'q',
        long = "quality",
        value_name = "QUALITY",
        value_parser = clap::value_parser!(u8).range(1..=100)
    )]
    pub quality: Option<u8>,

    /// Overwrite output files that already exist
    #[arg(long = "force")]
    pub force: bool,

    /// Simulate the export: check conflicts and list files without writing anything
    #[arg(long = "dry-run")]
    pub dry_run: bool,

    /// Print the slice preview and exit
    #[arg(long = "preview")]
    pub preview: bool,

    /// Print a table of all slices at the end
    #[arg(long = "report")]
    pub report: bool,

    /// Number of parallel export jobs (0 = auto-detect CPU cores)
    #[arg(short = 'j', long = "jobs", value_name = "N")]
    pub jobs: Option<usize>,

    /// Enable verbose output
    #[arg(short = 'v', long = "verbose")]
    pub verbose: bool,

    /// Emit progress as JSON lines on stdout instead of human-readable output
    #[arg(long = "json-progress")]
    pub json_progress: bool,

    /// Preferences file (default: <config dir>/E-IMG Slices/config.json)
    #[arg(long = "config", value_name = "FILE")]
    pub config_file: Option<PathBuf>,

    /// Ignore the preferences file
    #[arg(long = "no-config", conflicts_with = "config_file")]
    pub no_config: bool,

    /// Store the effective settings in the preferences file after a successful run
    #[arg(long = "save-config")]
    pub save_config: bool,
}

impl Args {
    pub fn axis(&self) -> SliceAxis {
        self.direction.unwrap_or(Direction::Vertical).into()
    }

    pub fn mode_kind(&self) -> SliceModeKind {
        self.mode.unwrap_or(ModeArg::Size).into()
    }

    /// Parse the slicing value; zero, negative or fractional input is rejected
    pub fn slice_value(&self) -> SliceResult<u32> {
        match &self.value {
            Some(value) => parse_slice_value(value),
            None => Err(crate::slicing::SliceError::InvalidParameter(
                "no slicing value given (use --value)".to_string(),
            )),
        }
    }

    pub fn slice_mode(&self) -> SliceResult<SliceMode> {
        Ok(SliceMode::new(self.mode_kind(), self.slice_value()?))
    }

    pub fn base_name(&self) -> String {
        self.name
            .clone()
            .unwrap_or_else(|| DEFAULT_BASE_NAME.to_string())
    }

    pub fn output_format(&self) -> OutputFormat {
        self.format.unwrap_or(OutputFormat::Jpg)
    }

    pub fn jpeg_quality(&self) -> u8 {
        self.quality.unwrap_or(DEFAULT_JPEG_QUALITY)
    }

    pub fn parallel_jobs(&self) -> usize {
        match self.jobs.unwrap_or(0) {
            0 => num_cpus::get(),
            jobs => jobs,
        }
    }

    /// Output directory, falling back to the directory holding the input image
    pub fn resolved_output_dir(&self) -> PathBuf {
        match &self.output_dir {
            Some(dir) => dir.clone(),
            None => self
                .input
                .parent()
                .filter(|parent| !parent.as_os_str().is_empty())
                .map(Path::to_path_buf)
                .unwrap_or_else(|| PathBuf::from(".")),
        }
    }
}


// Default implementation for tests
#[cfg(test)]
impl Default for Args {
    fn default() -> Self {
        Self {
            input: PathBuf::from("image.png"),
            output_dir: None,
            direction: None,
            mode: None,
            value: None,
            name: None,
            format: None,
            quality: None,
            force: false,
            dry_run: false,
            preview: false,
            report: false,
            jobs: None,
            verbose: false,
            json_progress: false,
            config_file: None,
            no_config: false,
            save_config: false,
        }
    }
}
