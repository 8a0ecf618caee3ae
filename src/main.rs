use std::io::Read;
use std::path::{Path, PathBuf};

use clap::Parser;
use tracing_subscriber::EnvFilter;

use gocam::{Error, LayoutConfig, NodeHeights};

#[derive(Parser)]
#[command(
    name = "gocam",
    about = "Group a GO-CAM model into activities and lay them out for rendering"
)]
struct Cli {
    /// Minerva model JSON (reads from stdin if not provided)
    file: Option<PathBuf>,

    /// JSON object of measured activity heights, keyed by activity id
    #[arg(long)]
    heights: Option<PathBuf>,

    /// TOML file overriding layout settings
    #[arg(long, short = 'c')]
    config: Option<PathBuf>,

    /// Print the built graph model instead of the layout
    #[arg(long)]
    model: bool,

    /// Pretty-print the JSON output
    #[arg(long, short = 'p')]
    pretty: bool,
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    match run(&cli) {
        Ok(output) => println!("{output}"),
        Err(e) => {
            eprintln!("ERROR: {e}");
            std::process::exit(1);
        }
    }
}

fn run(cli: &Cli) -> gocam::Result<String> {
    let input = match &cli.file {
        Some(path) => read_file(path)?,
        None => {
            let mut buf = String::new();
            std::io::stdin()
                .read_to_string(&mut buf)
                .map_err(|source| Error::Io {
                    path: "stdin".to_string(),
                    source,
                })?;
            buf
        }
    };

    if cli.model {
        let model = gocam::build_model(&input)?;
        return gocam::to_json(&model, cli.pretty);
    }

    let config = match &cli.config {
        Some(path) => LayoutConfig::from_file(path)?,
        None => LayoutConfig::default(),
    };
    let heights: NodeHeights = match &cli.heights {
        Some(path) => serde_json::from_str(&read_file(path)?).map_err(Error::InvalidHeights)?,
        None => NodeHeights::new(),
    };
    let flow = gocam::layout_model(&input, &heights, &config)?;
    gocam::to_json(&flow, cli.pretty)
}

fn read_file(path: &Path) -> gocam::Result<String> {
    std::fs::read_to_string(path).map_err(|source| Error::Io {
        path: path.display().to_string(),
        source,
    })
}
