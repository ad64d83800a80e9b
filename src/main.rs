use anyhow::Context;
use clap::Parser;
use tracing::error;
use tracing_subscriber::EnvFilter;

use voxel_hsi::config::{CliArgs, GeneratorConfig};
use voxel_hsi::pipeline::{GenerationResult, Generator};

fn main() -> anyhow::Result<()> {
    let args = CliArgs::parse();
    init_tracing(args.verbose);

    let config = GeneratorConfig::from(args);
    if let Some(threads) = config.threads {
        rayon::ThreadPoolBuilder::new()
            .num_threads(threads)
            .build_global()
            .with_context(|| format!("cannot start {threads} worker threads"))?;
    }

    let result = Generator::run(&config)
        .inspect_err(|e| error!(error = %e, "Generation failed"))
        .with_context(|| format!("no raster written for {}", config.output.display()))?;
    report(&config, &result);
    Ok(())
}

/// `RUST_LOG` wins over `--verbose` when set.
fn init_tracing(verbose: bool) {
    let level = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("voxel_hsi={level}")));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();
}

fn report(config: &GeneratorConfig, result: &GenerationResult) {
    println!(
        "{} bands, {} lines x {} samples ({} columns traced, {} chunks read) in {:.2}s",
        result.bands,
        result.width,
        result.depth,
        result.build.columns,
        result.cache.loaded,
        result.duration.as_secs_f64()
    );
    for path in [config.bsq_path(), config.hdr_path()] {
        println!("  wrote {}", path.display());
    }
}
