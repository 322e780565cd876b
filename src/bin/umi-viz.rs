use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use tracing_subscriber::EnvFilter;
use umi_viz::{
    DumpSink, DumpSinkOpts, LogSink, RenderSettings, RenderSink, StreamOutcome, VisConfig,
};

#[derive(Parser, Debug)]
#[command(
    name = "umi-viz",
    version,
    about = "Stream one episode of a UMI dataset to a viewer or to disk"
)]
struct Cli {
    /// UMI project folder containing `dataset.zarr`, or the Zarr store itself.
    path: PathBuf,

    /// Episode to visualize (1-based).
    #[arg(long, default_value_t = 1, allow_negative_numbers = true)]
    episode: i64,

    /// JSON file overriding render settings (focal length, colors, radii).
    #[arg(long)]
    settings: Option<PathBuf>,

    /// Write `frame_<index>.png` files and `frames.jsonl` into this directory.
    #[arg(long)]
    dump_dir: Option<PathBuf>,

    /// With `--dump-dir`, skip the PNG files.
    #[arg(long, requires = "dump_dir")]
    no_images: bool,

    /// Report every frame as a log event instead of opening the viewer.
    #[arg(long, conflicts_with = "dump_dir")]
    log_frames: bool,

    /// Save the viewer recording to an `.rrd` file instead of spawning the viewer.
    #[cfg(feature = "rerun")]
    #[arg(long, conflicts_with_all = ["dump_dir", "log_frames"])]
    save: Option<PathBuf>,
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn make_sink(cli: &Cli) -> Box<dyn RenderSink> {
    if let Some(dir) = &cli.dump_dir {
        return Box::new(DumpSink::new(DumpSinkOpts {
            out_dir: dir.clone(),
            write_images: !cli.no_images,
        }));
    }
    if cli.log_frames {
        return Box::new(LogSink::new());
    }
    viewer_sink(cli)
}

#[cfg(feature = "rerun")]
fn viewer_sink(cli: &Cli) -> Box<dyn RenderSink> {
    let target = match &cli.save {
        Some(path) => umi_viz::RerunTarget::Save(path.clone()),
        None => umi_viz::RerunTarget::Spawn,
    };
    Box::new(umi_viz::RerunSink::new(target))
}

#[cfg(not(feature = "rerun"))]
fn viewer_sink(_cli: &Cli) -> Box<dyn RenderSink> {
    tracing::warn!("built without the `rerun` feature; reporting frames as log events");
    Box::new(LogSink::new())
}

fn run(cli: &Cli) -> anyhow::Result<u8> {
    let settings = match &cli.settings {
        Some(path) => RenderSettings::from_path(path)?,
        None => RenderSettings::default(),
    };
    let config = VisConfig::from_one_based(&cli.path, cli.episode, settings)?;

    let mut sink = make_sink(cli);
    let report = umi_viz::run_visualizer(&config, sink.as_mut())?;

    if let StreamOutcome::Aborted { error, .. } = &report.stream.outcome {
        eprintln!("aborted: {error}");
    }
    Ok(report.exit_code())
}

fn main() -> ExitCode {
    init_tracing();
    let cli = Cli::parse();
    match run(&cli) {
        Ok(code) => ExitCode::from(code),
        Err(err) => {
            eprintln!("error: {err:#}");
            ExitCode::from(umi_viz::EXIT_ERROR)
        }
    }
}
