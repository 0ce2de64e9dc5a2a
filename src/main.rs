use clap::Parser;
use posematch::capture::{FrameSource, ImageDirSource};
use posematch::common::Label;
use posematch::pose::ReplayModelLoader;
use posematch::render::TracingRenderer;
use posematch::{App, AppError, Configuration};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::Level;

/// Match poses against a pretrained classifier before the clock runs out.
#[derive(Parser, Debug)]
#[command(version, about)]
struct Args {
    /// TOML configuration file
    #[arg(long)]
    config: Option<PathBuf>,

    /// Model location; model.json and metadata.json are read from it
    #[arg(long)]
    model_url: Option<String>,

    /// Directory of images played back as camera frames
    #[arg(long, default_value = "frames")]
    frames: PathBuf,

    /// Labels to pick, in order
    #[arg(long = "select")]
    picks: Vec<String>,
}

fn init_logging(level: Level) {
    tracing_subscriber::fmt().with_max_level(level).init();
}

#[tokio::main]
async fn main() -> Result<(), AppError> {
    let args = Args::parse();
    let configuration = Configuration::load(args.config.as_deref())?;
    init_logging(configuration.tracing_level());

    let renderer = Arc::new(TracingRenderer::new(configuration.min_part_confidence));
    let frames = args.frames.clone();
    let app = App::new(configuration, Arc::new(ReplayModelLoader::new()), renderer)
        .with_frame_source(move |configuration: &Configuration| -> Box<dyn FrameSource> {
            Box::new(ImageDirSource::new(
                frames.clone(),
                configuration.frame_size,
                configuration.flip,
            ))
        })
        .with_picks(args.picks.into_iter().map(Label::from).collect());

    let results = match app.run(args.model_url.as_deref().unwrap_or_default()).await {
        Ok(results) => results,
        Err(e) if e.is_setup_failure() => {
            eprintln!("{e}");
            std::process::exit(2);
        }
        Err(e) => return Err(e),
    };
    println!("Score: {}", results.score_text());
    for capture in results.captures() {
        println!("  {}", capture.label);
    }
    Ok(())
}
