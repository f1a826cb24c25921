use anyhow::Context;
use clap::Parser;
use metrics_exporter_prometheus::PrometheusBuilder;
use series_events_common::{
    init_tracer,
    metrics::{component_info_metric, describe_pipeline_metrics},
};
use series_to_events::{
    parameters::{DetectorSettings, ExtractorSettings},
    processing::Pipeline,
    sink::{CsvSink, ResultSink},
    source::ManifestSource,
};
use std::{net::SocketAddr, path::PathBuf};
use tracing::{info, level_filters::LevelFilter};

// cargo run --bin series-to-events -- --manifest data/manifest.json --output-path results --lag 10 --threshold 3 --influence 0.5 --min-separation 5

#[derive(Debug, Parser)]
#[clap(author, version, about)]
struct Cli {
    /// JSON file listing the entities to analyse and where their series are stored
    #[clap(long, env)]
    manifest: PathBuf,

    /// Directory into which summary.csv and events.csv are written
    #[clap(long, env)]
    output_path: PathBuf,

    /// If set, the raw series and detection traces of each entity are written to this directory
    #[clap(long, env)]
    save_path: Option<PathBuf>,

    /// If set, a Prometheus metrics endpoint is served at this address.
    /// It is only up while the batch runs, so it suits batches long enough to be scraped
    #[clap(long, env)]
    observability_address: Option<SocketAddr>,

    #[clap(flatten)]
    detector: DetectorSettings,

    #[clap(flatten)]
    extractor: ExtractorSettings,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Cli::parse();

    let _tracer = init_tracer!(LevelFilter::INFO);

    if let Some(address) = args.observability_address {
        PrometheusBuilder::new()
            .with_http_listener(address)
            .install()
            .context("prometheus metrics exporter should be setup")?;
    }
    describe_pipeline_metrics();
    component_info_metric("series-to-events");

    let detection = args.detector.to_config()?;
    let extraction = args.extractor.to_config()?;
    info!("Detection: {detection:?}, extraction: {extraction:?}");

    let source = ManifestSource::load(&args.manifest)
        .with_context(|| format!("cannot load manifest {}", args.manifest.display()))?;
    let pipeline = Pipeline::new(detection, extraction).with_save_path(args.save_path);

    let report = tokio::task::spawn_blocking(move || pipeline.process_batch(&source)).await?;

    let mut sink = CsvSink::create(&args.output_path)?;
    sink.write_summaries(&report.summaries)?;
    sink.write_events(&report.events)?;
    sink.finish()?;

    info!(
        "Analysed {} entities ({} events), skipped {}, failed {}. Results in {}",
        report.num_processed(),
        report.events.len(),
        report.num_skipped(),
        report.num_failed(),
        args.output_path.display()
    );
    Ok(())
}
