use anyhow::Result;
use console::style;
use indicatif::{ProgressBar, ProgressStyle};
use std::path::Path;
use std::time::Duration;

use crate::cli::Args;

/// Image extensions the bundled decoders can read
pub const SUPPORTED_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "webp", "tif", "tiff"];

/// Create a styled progress bar
pub fn create_progress_bar(total: u64) -> ProgressBar {
    let pb = ProgressBar::new(total);
    pb.set_style(
        ProgressStyle::with_template(
            "{spinner:.blue} [{elapsed_precise}] [{wide_bar:.cyan/blue}] {pos}/{len} {msg} ({eta})",
        )
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("#>-"),
    );
    pb
}

/// Format duration in a human-readable way
pub fn format_duration(duration: Duration) -> String {
    let total_secs = duration.as_secs();
    let millis = duration.subsec_millis();

    if total_secs >= 60 {
        let mins = total_secs / 60;
        let secs = total_secs % 60;
        format!("{}m {}s", mins, secs)
    } else if total_secs > 0 {
        format!("{}.{:03}s", total_secs, millis)
    } else {
        format!("{}ms", duration.as_millis())
    }
}

/// Validate command line arguments
pub fn validate_inputs(args: &Args) -> Result<()> {
    if !args.input.exists() {
        return Err(anyhow::anyhow!(
            "Input image does not exist: {}",
            args.input.display()
        ));
    }
    if !args.input.is_file() {
        return Err(anyhow::anyhow!(
            "Input path is not a file: {}",
            args.input.display()
        ));
    }
    if !has_valid_extension(&args.input, SUPPORTED_EXTENSIONS) {
        return Err(anyhow::anyhow!(
            "Unsupported image type: {} (supported: {})",
            args.input.display(),
            SUPPORTED_EXTENSIONS.join(", ")
        ));
    }

    // Reject bad slicing values before the image is decoded
    args.slice_mode()?;

    if let Some(jobs) = args.jobs {
        if jobs > 32 {
            return Err(anyhow::anyhow!(
                "Job count too high (max 32), got: {}",
                jobs
            ));
        }
    }

    if let Some(dir) = &args.output_dir {
        if dir.exists() && !dir.is_dir() {
            return Err(anyhow::anyhow!(
                "Output path exists and is not a directory: {}",
                dir.display()
            ));
        }
    }

    Ok(())
}

/// Get file extension in lowercase
pub fn get_file_extension(path: &Path) -> Option<String> {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.to_lowercase())
}

/// Check if a file has one of the specified extensions
pub fn has_valid_extension(path: &Path, extensions: &[&str]) -> bool {
    get_file_extension(path).is_some_and(|ext| extensions.contains(&ext.as_str()))
}

/// Generate a safe file name by replacing characters that are not allowed in paths
pub fn sanitize_filename(filename: &str) -> String {
    filename
        .chars()
        .map(|c| match c {
            '/' | '\\' | ':' | '*' | '?' | '"' | '<' | '>' | '|' => '_',
            c if c.is_control() => '_',
            c => c,
        })
        .collect::<String>()
        .trim()
        .to_string()
}

/// Print verbose information if verbose mode is enabled
pub fn verbose_println(verbose: bool, message: &str) {
    if verbose {
        println!("{} {}", style("[VERBOSE]").dim(), message);
    }
}

/// Print warning message
pub fn warn_println(message: &str) {
    println!("{} {}", style("[WARNING]").yellow().bold(), message);
}

/// Print error message
pub fn error_println(message: &str) {
    eprintln!("{} {}", style("[ERROR]").red().bold(), message);
}
