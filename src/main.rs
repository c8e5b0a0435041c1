use anyhow::Result;
use clap::Parser;
use console::style;
use std::path::Path;
use std::time::Instant;

use eimg_slices::cli::Args;
use eimg_slices::config_file::Preferences;
use eimg_slices::json_output::JsonMessage;
use eimg_slices::slicing::report::SliceReport;
use eimg_slices::slicing::{
    ImageInfo, PlanPreview, PreviewNote, SlicingConfig, SlicingEngine, SlicingResult,
};
use eimg_slices::utils::{
    create_progress_bar, error_println, format_duration, validate_inputs, verbose_println,
    warn_println,
};

fn main() {
    let mut args = Args::parse();

    if let Err(e) = run(&mut args) {
        if args.json_progress {
            JsonMessage::error(format!("{:#}", e));
        } else {
            error_println(&format!("{:#}", e));
        }
        std::process::exit(1);
    }
}

/// Load preferences from disk and fold them under the command-line arguments
fn apply_preferences(args: &mut Args, quiet: bool) {
    let Some(path) = args.config_path() else {
        return;
    };

    let (preferences, error) = Preferences::load_or_default(&path);
    if let Some(e) = error {
        if !quiet {
            warn_println(&format!("{:#} (using defaults)", e));
        }
    }

    for warning in args.merge_preferences(preferences) {
        if !quiet {
            warn_println(&warning);
        }
    }

    verbose_println(
        args.verbose && !quiet,
        &format!("Preferences: {}", path.display()),
    );
}

fn print_preview(preview: &PlanPreview) {
    println!("{}", style("Slice preview:").bold());

    let text = preview.to_string();
    let lines: Vec<&str> = text.lines().collect();
    let last = lines.len().saturating_sub(1);

    for (i, line) in lines.iter().enumerate() {
        // The note, when present, is always the last line
        match (i == last, preview.note) {
            (true, Some(PreviewNote::ShortTail { .. })) => println!("{}", style(line).yellow()),
            (true, Some(PreviewNote::Distributed { .. })) => println!("{}", style(line).cyan()),
            _ => println!("{}", line),
        }
    }
    println!();
}

fn print_summary(result: &SlicingResult, output_dir: &Path) {
    let header = if result.dry_run {
        style("Dry Run Results Summary:").bold().cyan()
    } else {
        style("Results Summary:").bold().green()
    };
    println!("{}", header);

    let label = if result.dry_run {
        "Would be written"
    } else {
        "Slices written"
    };
    println!("  {}: {}", label, style(result.outputs.len()).bold().green());

    let location_label = if result.dry_run {
        "Would be saved to"
    } else {
        "Saved to"
    };
    println!("  {}: {}", location_label, output_dir.display());
    println!(
        "  Export time: {}",
        style(format_duration(result.duration)).bold()
    );

    if result.dry_run {
        println!();
        println!("{}", style("Dry Run Mode:").bold().yellow());
        println!("  • No files were created during this simulation");
        println!("  • Remove --dry-run to actually write the slices");
    }
}

fn run(args: &mut Args) -> Result<()> {
    let start_time = Instant::now();
    let json = args.json_progress;

    if !json {
        println!("{}", style("E-IMG Slices - Image Slicer").bold().blue());
        println!();
    }

    apply_preferences(args, json);
    validate_inputs(args)?;

    let config = SlicingConfig {
        axis: args.axis(),
        mode: args.slice_mode()?,
        base_name: args.base_name(),
        output_format: args.output_format(),
        jpeg_quality: args.jpeg_quality(),
        force: args.force,
        dry_run: args.dry_run,
        verbose: args.verbose && !json,
        parallel_jobs: args.parallel_jobs(),
    };
    let output_dir = args.resolved_output_dir();

    if config.verbose {
        println!("{}", style("Configuration:").bold());
        println!("  Input: {}", args.input.display());
        println!("  Output directory: {}", output_dir.display());
        println!("  Direction: {}", config.axis);
        println!(
            "  Mode: {} ({})",
            config.mode.kind(),
            config.mode.value()
        );
        println!("  Base name: {:?}", config.base_name);
        println!("  Output format: {}", config.output_format.extension());
        println!("  JPEG quality: {}", config.jpeg_quality);
        println!("  Parallel jobs: {}", config.parallel_jobs);
        if config.dry_run {
            println!("  Dry run mode: enabled (simulation only - no files will be created)");
        }
        println!();
    }

    let engine = SlicingEngine::new(config)?;
    let image = engine.load_image(&args.input)?;
    let plan = engine.plan(&image)?;
    let preview = PlanPreview::from_plan(&plan);

    if json {
        JsonMessage::plan(&plan, &preview);
    } else {
        println!(
            "{} {}",
            style("Image:").bold(),
            ImageInfo::new(&args.input, &image)
        );
        println!();
        print_preview(&preview);
    }

    if args.preview {
        if args.report && !json {
            SliceReport::new(&engine.output_paths(&plan, &output_dir)).print();
        }
        return Ok(());
    }

    let progress_bar = (!json).then(|| {
        let pb = create_progress_bar(plan.len() as u64);
        pb.set_message("Slicing");
        pb
    });

    let result = engine.export(&image, &plan, &output_dir, |done, total, slice| {
        if json {
            if !engine.config().dry_run {
                JsonMessage::slice_saved(slice.index, &slice.path, slice.rect);
            }
            JsonMessage::progress(done, total, format!("Slicing... {}/{}", done, total));
        } else if let Some(pb) = &progress_bar {
            pb.inc(1);
            if let Some(name) = slice.path.file_name() {
                pb.set_message(name.to_string_lossy().to_string());
            }
        }
    });

    let result = match result {
        Ok(result) => result,
        Err(e) => {
            if let Some(pb) = &progress_bar {
                pb.abandon_with_message("Slicing failed");
            }
            return Err(e);
        }
    };

    if let Some(pb) = &progress_bar {
        pb.finish_with_message("✓ Slicing complete!");
        println!();
    }

    if json {
        JsonMessage::summary(
            result.outputs.len(),
            &output_dir,
            result.dry_run,
            start_time.elapsed().as_secs_f64(),
        );
    } else {
        print_summary(&result, &output_dir);
        if args.report {
            SliceReport::new(&result.outputs).print();
        }
    }

    if args.save_config && !result.dry_run {
        if let Some(path) = args.config_path() {
            Preferences::from_args(args).save(&path)?;
            verbose_println(
                args.verbose && !json,
                &format!("Saved preferences to {}", path.display()),
            );
        }
    }

    Ok(())
}
