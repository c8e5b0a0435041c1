// Library exports for reuse by GUI front ends and other applications
pub mod cli;
pub mod config_file;
pub mod json_output;
pub mod slicing;
pub mod utils;

// Re-export commonly used types
pub use cli::{Direction, ModeArg, OutputFormat};
pub use json_output::JsonMessage;
pub use slicing::{
    plan_slices, PlanPreview, SliceAxis, SliceError, SliceMode, SlicePlan, SliceRect,
    SlicingConfig, SlicingEngine, SlicingResult,
};
