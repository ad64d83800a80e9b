use std::fs::File;
use std::io::BufWriter;
use std::time::{Duration, Instant};

use tracing::info;

use crate::config::GeneratorConfig;
use crate::error::Result;
use crate::ingestion;
use crate::raster::{self, EnviHeader};
use crate::scene::{CacheStats, ChunkCache};
use crate::spectral::{self, BuildStats};

/// Summary of a completed generator run.
#[derive(Debug)]
pub struct GenerationResult {
    pub bands: usize,
    /// Output x extent (header `lines`).
    pub width: usize,
    /// Output z extent (header `samples`).
    pub depth: usize,
    pub build: BuildStats,
    pub cache: CacheStats,
    pub duration: Duration,
}

/// Generator orchestrator -- drives the four stages from scene to raster.
pub struct Generator;

impl Generator {
    /// Run the full generation pipeline.
    pub fn run(config: &GeneratorConfig) -> Result<GenerationResult> {
        let start = Instant::now();
        let params = &config.sampling;
        params.validate()?;

        info!(
            scene = %config.scene.display(),
            output = %config.output.display(),
            bands = params.bands,
            "Starting generator"
        );

        info!("Stage 1/4: Ingestion");
        let ingested = ingestion::ingest(config)?;

        // Both outputs are created before tracing so a bad path fails fast.
        let bsq_path = config.bsq_path();
        let hdr_path = config.hdr_path();
        let mut bsq = BufWriter::new(File::create(&bsq_path)?);
        let mut hdr = File::create(&hdr_path)?;

        info!("Stage 2/4: Column tracing");
        let trace_start = Instant::now();
        let cache = ChunkCache::new(&ingested.world);
        let build = spectral::build_cube(&ingested.region, params, &cache, &ingested.catalog)?;
        let cache_stats = cache.stats();
        info!(
            columns = build.stats.columns,
            chunks_loaded = cache_stats.loaded,
            chunks_absent = cache_stats.absent,
            elapsed = ?trace_start.elapsed(),
            "Column tracing complete"
        );

        info!(factor = params.merge_factor, "Stage 3/4: Merge");
        let cube = spectral::merge_cube(build.cube, params.merge_factor);

        info!(path = %bsq_path.display(), "Stage 4/4: Writing raster");
        raster::write_bsq(&mut bsq, &cube)?;
        let header = EnviHeader::for_cube(&cube, params);
        raster::write_header(&mut hdr, &header)?;

        let duration = start.elapsed();
        let (bands, width, depth) = cube.shape();
        info!(bands, lines = width, samples = depth, elapsed = ?duration, "Generation complete");

        Ok(GenerationResult {
            bands,
            width,
            depth,
            build: build.stats,
            cache: cache_stats,
            duration,
        })
    }
}
