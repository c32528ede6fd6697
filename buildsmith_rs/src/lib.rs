pub mod combinator;
pub mod config;
pub mod item;
pub mod key;
pub mod picker;
pub mod pipeline;
pub mod progress;

pub use config::SearchConfig;
pub use item::{ItemDescriptor, ItemPool};
pub use picker::{BuildSelection, PickError, Picker};
pub use pipeline::{BuildPipeline, PipelineSummary};
