use std::path::PathBuf;

use clap::{Parser, Subcommand};

use buildsmith_rs::SearchConfig;

#[derive(Parser, Debug)]
#[command(
    name = "buildsmith",
    about = "League of Legends build-space exploration toolkit"
)]
pub struct Cli {
    /// Optional log file; log output is mirrored there as well as stdout
    #[arg(long = "log-file", global = true, value_name = "FILE")]
    pub log_file: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Refresh the local Data Dragon cache
    Fetch(FetchArgs),
    /// Enumerate every build of a given size from a champion's item pool
    Explore(ExploreArgs),
    /// Draw never-before-seen random builds, racing worker threads
    Pick(PickArgs),
}

#[derive(Parser, Debug)]
pub struct FetchArgs {
    /// Directory holding the cached game data
    #[arg(long = "data-dir", default_value = "data", value_hint = clap::ValueHint::DirPath)]
    pub data_dir: PathBuf,
}

#[derive(Parser, Debug)]
pub struct ExploreArgs {
    /// Directory holding the cached game data
    #[arg(long = "data-dir", default_value = "data", value_hint = clap::ValueHint::DirPath)]
    pub data_dir: PathBuf,

    /// Champion whose item pool to explore
    #[arg(long)]
    pub champion: String,

    /// Champion level used for the stat block
    #[arg(long, default_value_t = 18)]
    pub level: u32,

    /// Map id used to filter the item pool (11 = Summoner's Rift)
    #[arg(long, default_value = "11")]
    pub map: String,

    /// Items per build
    #[arg(long = "build-size", default_value_t = 6)]
    pub build_size: usize,

    /// Number of worker threads (omit to use all logical cores)
    #[arg(long = "workers")]
    pub workers: Option<usize>,

    /// Batch size for combination streaming
    #[arg(long = "batch-size", default_value_t = 10_000)]
    pub batch_size: usize,

    /// Optional resume offset for combination enumeration
    #[arg(long = "resume-from", alias = "resume-offset", default_value_t = 0)]
    pub resume_from: u64,

    /// Optional cap on combinations to enumerate this run
    #[arg(long = "max-combos", alias = "limit")]
    pub max_combos: Option<usize>,

    #[arg(long, default_value_t = false)]
    pub quiet: bool,
}

impl ExploreArgs {
    pub fn to_config(&self) -> SearchConfig {
        SearchConfig {
            build_size: self.build_size,
            n_workers: self.workers.unwrap_or_else(default_workers),
            batch_size: self.batch_size,
            resume_offset: self.resume_from,
            max_combos: self.max_combos,
            quiet: self.quiet,
            ..SearchConfig::default()
        }
    }
}

#[derive(Parser, Debug)]
pub struct PickArgs {
    /// Directory holding the cached game data
    #[arg(long = "data-dir", default_value = "data", value_hint = clap::ValueHint::DirPath)]
    pub data_dir: PathBuf,

    /// Champion whose item pool to draw from
    #[arg(long)]
    pub champion: String,

    /// Map id used to filter the item pool (11 = Summoner's Rift)
    #[arg(long, default_value = "11")]
    pub map: String,

    /// Items per build
    #[arg(long = "build-size", default_value_t = 6)]
    pub build_size: usize,

    /// How many unique builds to draw
    #[arg(long, default_value_t = 1)]
    pub count: usize,

    /// Number of worker threads racing per draw (omit to use all logical cores)
    #[arg(long = "workers")]
    pub workers: Option<usize>,

    /// Give up on a draw after this many attempts across all workers
    #[arg(long = "max-attempts")]
    pub max_attempts: Option<u64>,

    #[arg(long, default_value_t = false)]
    pub quiet: bool,
}

impl PickArgs {
    pub fn worker_count(&self) -> usize {
        self.workers.unwrap_or_else(default_workers)
    }
}

fn default_workers() -> usize {
    std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(1)
}
