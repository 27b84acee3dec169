// Command-line entry point for archmap.

use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

use archmap::application::AnalyzeUsecase;
use archmap::domain::dendrogram::Linkage;
use archmap::infrastructure::concurrency::init_thread_pool;
use archmap::infrastructure::config::{AnalysisConfig, OutputFormat};
use archmap::infrastructure::{JsonExporter, JsonModelLoader};
use archmap::ports::dot_exporter::DotExporter;
use archmap::ports::ReportExporter;

#[derive(Parser, Debug)]
#[command(
    author,
    version,
    about = "Class coupling analysis and module identification",
    long_about = None
)]
struct Cli {
    /// Extracted model (JSON)
    #[arg(short, long)]
    model: PathBuf,

    /// Analysis settings (TOML)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Output file path
    #[arg(short, long, default_value = "archmap-report.json")]
    output: PathBuf,

    /// Output format (json, dot)
    #[arg(short, long, default_value = "json")]
    format: OutputFormat,

    /// Cluster linkage (single, complete, average)
    #[arg(short, long)]
    linkage: Option<Linkage>,

    /// Minimum average coupling inside a module, in [0, 1]
    #[arg(long)]
    cohesion_threshold: Option<f64>,

    /// Drop calls into code outside the project
    #[arg(long)]
    no_external: bool,

    /// Hide coupling edges lighter than this in DOT output
    #[arg(long, default_value_t = 0.0)]
    min_weight: f64,

    /// Worker threads (default: half the cores)
    #[arg(short, long)]
    threads: Option<usize>,
}

impl Cli {
    fn analysis_config(&self) -> Result<AnalysisConfig> {
        let mut config = match &self.config {
            Some(path) => AnalysisConfig::load(path)?,
            None => AnalysisConfig::default(),
        };
        if let Some(linkage) = self.linkage {
            config.linkage = linkage;
        }
        if let Some(threshold) = self.cohesion_threshold {
            config.cohesion_threshold = threshold;
        }
        if self.no_external {
            config.include_external = false;
        }
        if self.threads.is_some() {
            config.threads = self.threads;
        }
        config.validate()?;
        Ok(config)
    }
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config = cli.analysis_config()?;
    init_thread_pool(config.threads)?;

    let loader = JsonModelLoader::new(&cli.model);
    let dot = DotExporter::with_min_weight(cli.min_weight);
    let exporter: &dyn ReportExporter = match cli.format {
        OutputFormat::Json => &JsonExporter,
        OutputFormat::Dot => &dot,
    };

    let usecase = AnalyzeUsecase {
        source: &loader,
        exporter,
    };
    let report = usecase.run(&config, &cli.output)?;

    info!(
        classes = report.classes.len(),
        modules = report.partition.as_ref().map_or(0, |p| p.len()),
        output = %cli.output.display(),
        format = %cli.format,
        "analysis completed"
    );
    Ok(())
}
