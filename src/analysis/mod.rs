pub mod pipeline;
pub mod file_filter;
pub mod review_engine;
pub mod comment;

pub use pipeline::{ReviewOutcome, ReviewPipeline};
pub use file_filter::FileFilter;
pub use review_engine::ReviewEngine;
pub use comment::render_comment;
