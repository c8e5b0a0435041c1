pub mod error;
pub mod export;
pub mod planner;
pub mod preview;
pub mod report;

use anyhow::{Context, Result};
use image::{DynamicImage, GenericImageView};
use rayon::prelude::*;
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::{Duration, Instant};

use crate::cli::OutputFormat;
use crate::utils::verbose_println;

pub use error::{SliceError, SliceResult};
pub use export::{PlannedSlice, DEFAULT_BASE_NAME, DEFAULT_JPEG_QUALITY};
pub use planner::{
    parse_slice_value, plan_slices, SliceAxis, SliceMode, SliceModeKind, SlicePlan, SliceRect,
};
pub use preview::{ImageInfo, PlanPreview, PreviewNote, SizeGroup};

#[derive(Debug, Clone)]
pub struct SlicingConfig {
    pub axis: SliceAxis,
    pub mode: SliceMode,
    pub base_name: String,
    pub output_format: OutputFormat,
    pub jpeg_quality: u8,
    pub force: bool,
    pub dry_run: bool,
    pub verbose: bool,
    pub parallel_jobs: usize,
}

impl Default for SlicingConfig {
    fn default() -> Self {
        Self {
            axis: SliceAxis::Vertical,
            mode: SliceMode::BySize(100),
            base_name: DEFAULT_BASE_NAME.to_string(),
            output_format: OutputFormat::Jpg,
            jpeg_quality: DEFAULT_JPEG_QUALITY,
            force: false,
            dry_run: false,
            verbose: false,
            parallel_jobs: 0,
        }
    }
}

/// Outcome of one export run
#[derive(Debug)]
pub struct SlicingResult {
    pub outputs: Vec<PlannedSlice>,
    pub duration: Duration,
    pub dry_run: bool,
}

/// Loads an image, plans its slices and writes them out
pub struct SlicingEngine {
    config: SlicingConfig,
    pool: rayon::ThreadPool,
}

impl SlicingEngine {
    pub fn new(config: SlicingConfig) -> Result<Self> {
        let threads = if config.parallel_jobs == 0 {
            num_cpus::get()
        } else {
            config.parallel_jobs
        };

        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(threads)
            .build()
            .context("Failed to initialize thread pool")?;

        Ok(Self { config, pool })
    }

    pub fn config(&self) -> &SlicingConfig {
        &self.config
    }

    /// Decode the source image
    pub fn load_image(&self, path: &Path) -> Result<DynamicImage> {
        verbose_println(
            self.config.verbose,
            &format!("Loading image: {}", path.display()),
        );

        let image = image::open(path)
            .with_context(|| format!("Failed to open image: {}", path.display()))?;

        let (width, height) = image.dimensions();
        verbose_println(
            self.config.verbose,
            &format!("Image size: {}x{} ({:?})", width, height, image.color()),
        );
        Ok(image)
    }

    /// Plan slices for image dimensions using the configured axis and mode
    pub fn plan_dimensions(&self, width: u32, height: u32) -> SliceResult<SlicePlan> {
        plan_slices(width, height, self.config.axis, self.config.mode)
    }

    pub fn plan(&self, image: &DynamicImage) -> Result<SlicePlan> {
        let (width, height) = image.dimensions();
        let plan = self.plan_dimensions(width, height)?;

        verbose_println(
            self.config.verbose,
            &format!(
                "Planned {} {} slice(s) ({:?})",
                plan.len(),
                plan.axis,
                plan.mode
            ),
        );
        Ok(plan)
    }

    /// Output files for a plan, without touching the disk
    pub fn output_paths(&self, plan: &SlicePlan, output_dir: &Path) -> Vec<PlannedSlice> {
        export::planned_outputs(
            plan,
            output_dir,
            &self.config.base_name,
            self.config.output_format,
        )
    }

    /// Crop and write every slice of `plan`.
    ///
    /// Refuses to start if any target file exists, unless `force` is set.
    /// If any slice fails, the slices already written by this call are removed.
    /// `progress` receives (completed, total, slice) after each slice.
    pub fn export<F>(
        &self,
        image: &DynamicImage,
        plan: &SlicePlan,
        output_dir: &Path,
        progress: F,
    ) -> Result<SlicingResult>
    where
        F: Fn(usize, usize, &PlannedSlice) + Send + Sync,
    {
        let start = Instant::now();

        let (width, height) = image.dimensions();
        if (width, height) != (plan.image_width, plan.image_height) {
            return Err(anyhow::anyhow!(
                "Plan was computed for a {}x{} image but the image is {}x{}",
                plan.image_width,
                plan.image_height,
                width,
                height
            ));
        }

        let outputs = self.output_paths(plan, output_dir);

        let conflicts = export::find_conflicts(&outputs);
        if !conflicts.is_empty() {
            if self.config.force {
                verbose_println(
                    self.config.verbose,
                    &format!("Overwriting {} existing file(s)", conflicts.len()),
                );
            } else {
                return Err(anyhow::anyhow!(
                    "{} output file(s) already exist in {} (e.g. {}). Use --force to overwrite",
                    conflicts.len(),
                    output_dir.display(),
                    conflicts[0].display()
                ));
            }
        }

        let total = outputs.len();

        if self.config.dry_run {
            verbose_println(
                self.config.verbose,
                "Dry run mode: no files will be written",
            );
            for (i, slice) in outputs.iter().enumerate() {
                progress(i + 1, total, slice);
            }
            return Ok(SlicingResult {
                outputs,
                duration: start.elapsed(),
                dry_run: true,
            });
        }

        std::fs::create_dir_all(output_dir).with_context(|| {
            format!("Failed to create output directory: {}", output_dir.display())
        })?;

        let completed = AtomicUsize::new(0);
        let written = Mutex::new(Vec::with_capacity(total));
        let format = self.config.output_format;
        let quality = self.config.jpeg_quality;

        let exported = self.pool.install(|| {
            outputs.par_iter().try_for_each(|slice| -> Result<()> {
                let cropped = export::crop_slice(image, &slice.rect);
                export::save_slice(&cropped, &slice.path, format, quality)?;
                written
                    .lock()
                    .map_err(|_| anyhow::anyhow!("Slice bookkeeping lock poisoned"))?
                    .push(slice.path.clone());

                let done = completed.fetch_add(1, Ordering::Relaxed) + 1;
                progress(done, total, slice);
                Ok(())
            })
        });

        if let Err(e) = exported {
            // Leave no partial output behind
            let written = written.into_inner().unwrap_or_else(|poisoned| poisoned.into_inner());
            for path in &written {
                let _ = std::fs::remove_file(path);
            }
            verbose_println(
                self.config.verbose,
                &format!("Removed {} slice(s) written before the failure", written.len()),
            );
            return Err(e);
        }

        Ok(SlicingResult {
            outputs,
            duration: start.elapsed(),
            dry_run: false,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_engine_plans_with_config() {
        let engine = SlicingEngine::new(SlicingConfig {
            axis: SliceAxis::Horizontal,
            mode: SliceMode::ByCount(3),
            parallel_jobs: 1,
            ..Default::default()
        })
        .unwrap();

        let plan = engine.plan_dimensions(100, 50).unwrap();
        assert_eq!(plan.lengths(), vec![17, 17, 16]);
    }

    #[test]
    fn test_engine_rejects_mismatched_plan() {
        let engine = SlicingEngine::new(SlicingConfig {
            parallel_jobs: 1,
            dry_run: true,
            ..Default::default()
        })
        .unwrap();

        let image = DynamicImage::new_rgb8(10, 10);
        let plan = engine.plan_dimensions(20, 10).unwrap();
        let result = engine.export(&image, &plan, Path::new("unused"), |_, _, _| {});
        assert!(result.is_err());
    }
}
