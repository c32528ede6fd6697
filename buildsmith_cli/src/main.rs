mod cli;

use std::fmt::Write as _;
use std::fs::OpenOptions;
use std::path::PathBuf;
use std::sync::Mutex;
use std::time::Duration;

use anyhow::{Result, anyhow};
use clap::Parser;
use tracing::info;
use tracing_appender::non_blocking;
use tracing_subscriber::{EnvFilter, prelude::*};

use buildsmith_data::stats::stat_fields;
use buildsmith_data::{
    Champion, DragonCache, champion_pool, find_champion, load_champions, load_items,
    stats_at_level,
};
use buildsmith_rs::progress::ThroughputReporter;
use buildsmith_rs::{BuildPipeline, ItemDescriptor, ItemPool, Picker, PipelineSummary};

use cli::{Cli, Commands, ExploreArgs, FetchArgs, PickArgs};

fn init_tracing(log_file: Option<PathBuf>) -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    let stdout_layer = tracing_subscriber::fmt::layer().with_writer(std::io::stdout);

    if let Some(path) = log_file {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .map_err(|err| anyhow!("failed to create log directory {parent:?}: {err}"))?;
        }
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .map_err(|err| anyhow!("failed to open log file {path:?}: {err}"))?;
        let (non_blocking_writer, guard) = non_blocking(file);
        // Leak the guard so the non-blocking writer stays alive for the
        // duration of the process without additional plumbing.
        let _guard = Box::leak(Box::new(guard));
        let file_layer = tracing_subscriber::fmt::layer().with_writer(non_blocking_writer);
        tracing_subscriber::registry()
            .with(filter)
            .with(stdout_layer)
            .with(file_layer)
            .try_init()
            .map_err(|err| anyhow!("failed to initialize tracing: {err}"))
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(stdout_layer)
            .try_init()
            .map_err(|err| anyhow!("failed to initialize tracing: {err}"))
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.log_file.clone())?;

    match cli.command {
        Commands::Fetch(args) => run_fetch(args),
        Commands::Explore(args) => run_explore(args),
        Commands::Pick(args) => run_pick(args),
    }
}

fn run_fetch(args: FetchArgs) -> Result<()> {
    let cache = DragonCache::new(args.data_dir)?;
    let version = cache.fetch_update()?;
    info!(version = %version, "Fetch complete");
    Ok(())
}

fn pinned_version(cache: &DragonCache) -> Result<String> {
    cache.local_version()?.ok_or_else(|| {
        anyhow!(
            "no game data cached under {}; run `buildsmith fetch` first",
            cache.data_dir().display()
        )
    })
}

fn load_champion_and_pool(
    cache: &DragonCache,
    champion_name: &str,
    map: &str,
) -> Result<(Champion, Vec<ItemDescriptor>)> {
    let version = pinned_version(cache)?;
    let items = load_items(cache, &version)?;
    let champions = load_champions(cache, &version)?;
    let champion = find_champion(&champions, champion_name)
        .ok_or_else(|| anyhow!("champion '{champion_name}' not found"))?
        .clone();
    let pool = champion_pool(&items, map, &champion.name);
    info!(
        champion = %champion.name,
        map = %map,
        pool = pool.len(),
        "Item pool prepared"
    );
    Ok((champion, pool))
}

fn log_champion_block(champion: &Champion, level: u32) -> Result<()> {
    let leveled = stats_at_level(&champion.stats, level)?;
    let mut buffer = String::new();
    let _ = writeln!(buffer, "\n{}, {} (level {level})", champion.name, champion.title);
    for field in stat_fields() {
        let _ = writeln!(buffer, "  {:<16} {:>8.2}", field.label, (field.get)(&leveled));
    }
    info!("{}", buffer);
    Ok(())
}

/// Cheapest and priciest builds seen during an exhaustive run. Updates
/// compare two integers; names are only cloned when an extreme changes.
#[derive(Default)]
struct BuildExtremes {
    cheapest: Option<(u64, Vec<String>)>,
    priciest: Option<(u64, Vec<String>)>,
}

impl BuildExtremes {
    fn observe(&mut self, gold: u64, build: &[&ItemDescriptor]) {
        let names = || build.iter().map(|item| item.name.clone()).collect::<Vec<_>>();
        if self.cheapest.as_ref().is_none_or(|(best, _)| gold < *best) {
            self.cheapest = Some((gold, names()));
        }
        if self.priciest.as_ref().is_none_or(|(best, _)| gold > *best) {
            self.priciest = Some((gold, names()));
        }
    }
}

fn log_extremes(extremes: &BuildExtremes, summary: &PipelineSummary) {
    let mut buffer = String::new();
    let _ = writeln!(
        buffer,
        "\nEnumerated {} builds ({} evaluation failures)",
        summary.processed, summary.eval_errors
    );
    if let Some((gold, names)) = &extremes.cheapest {
        let _ = writeln!(buffer, "  Cheapest ({gold} gold): {}", names.join(", "));
    }
    if let Some((gold, names)) = &extremes.priciest {
        let _ = writeln!(buffer, "  Priciest ({gold} gold): {}", names.join(", "));
    }
    info!("{}", buffer);
}

fn run_explore(args: ExploreArgs) -> Result<()> {
    let cache = DragonCache::new(&args.data_dir)?;
    let (champion, pool) = load_champion_and_pool(&cache, &args.champion, &args.map)?;
    log_champion_block(&champion, args.level)?;

    let config = args.to_config();
    let pipeline = BuildPipeline::new(config, ItemPool::new(pool));
    let extremes = Mutex::new(BuildExtremes::default());
    let summary = pipeline.run_with(|build| {
        let gold: u64 = build.iter().map(|item| u64::from(item.gold_total)).sum();
        extremes
            .lock()
            .expect("extremes lock poisoned")
            .observe(gold, build);
        Ok(())
    })?;

    let extremes = extremes.into_inner().expect("extremes lock poisoned");
    log_extremes(&extremes, &summary);
    Ok(())
}

fn run_pick(args: PickArgs) -> Result<()> {
    let cache = DragonCache::new(&args.data_dir)?;
    let (_, pool) = load_champion_and_pool(&cache, &args.champion, &args.map)?;

    let picker = Picker::new(pool, args.build_size);
    let workers = args.worker_count();
    let reporter = (!args.quiet).then(|| {
        ThroughputReporter::spawn(
            "sampler",
            picker.attempt_counter(),
            Duration::from_millis(500),
        )
    });

    for round in 1..=args.count {
        let selection = picker
            .pick_unique_with_budget(workers, args.max_attempts)
            .map_err(|err| anyhow!(err).context(format!("draw {round} of {}", args.count)))?;
        let gold: u64 = selection
            .items
            .iter()
            .map(|item| u64::from(item.gold_total))
            .sum();
        let mut buffer = String::new();
        let _ = writeln!(
            buffer,
            "\nBuild {round}/{} ({gold} total gold)",
            args.count
        );
        for item in &selection.items {
            let _ = writeln!(buffer, "  {} ({}g)", item.name, item.gold_total);
        }
        info!("{}", buffer);
    }

    if let Some(reporter) = reporter {
        reporter.stop();
    }
    info!(
        picks = args.count,
        attempts = picker.attempts(),
        malformed_skips = picker.malformed_skips(),
        "Unique sampling complete"
    );
    Ok(())
}
