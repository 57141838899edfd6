//! bttc CLI - Triangular subdivision of sampled grids

use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};

use anyhow::Context;
use bttc_cli::{commands, load_grid, InputFormat, Layout, OutputFormat, ToolConfig, Window};
use clap::{Args, Parser, Subcommand};
use tracing_subscriber::EnvFilter;

/// bttc - B-tree triangular coding of square grids
#[derive(Parser)]
#[command(name = "bttc")]
#[command(about = "Approximate a square grid with adaptively refined triangles", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Write the accepted faces, six corner coordinates per face
    Faces {
        #[command(flatten)]
        common: CommonArgs,

        /// Output encoding
        #[arg(long, value_enum)]
        format: Option<OutputFormat>,

        /// Face table orientation
        #[arg(long, value_enum)]
        layout: Option<Layout>,
    },

    /// Write an indexed triangle mesh with shared corners merged
    Mesh {
        #[command(flatten)]
        common: CommonArgs,
    },

    /// Print subdivision statistics as JSON
    Stats {
        #[command(flatten)]
        common: CommonArgs,
    },
}

#[derive(Args)]
struct CommonArgs {
    /// Grid file (.json array of rows, or .csv)
    #[arg(short, long)]
    input: PathBuf,

    /// Grid file encoding (default: from extension)
    #[arg(long, value_enum)]
    input_format: Option<InputFormat>,

    /// Maximum allowed deviation from each face's plane
    #[arg(short, long)]
    threshold: Option<f64>,

    /// TOML config file (replaces BTTC_* environment variables)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Subdivide only the window X,Y,SIZE
    #[arg(long)]
    window: Option<Window>,

    /// Coordinate and index base, 0 or 1
    #[arg(long)]
    index_base: Option<u32>,

    /// Output file (default: stdout)
    #[arg(short, long)]
    output: Option<PathBuf>,
}

impl CommonArgs {
    fn config(&self) -> anyhow::Result<ToolConfig> {
        let mut config = ToolConfig::resolve(self.config.as_deref())?;
        if let Some(threshold) = self.threshold {
            config.subdivide.threshold = threshold;
        }
        if let Some(index_base) = self.index_base {
            config.output.index_base = index_base;
        }
        Ok(config)
    }
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Faces {
            common,
            format,
            layout,
        } => {
            let mut config = common.config()?;
            if let Some(format) = format {
                config.output.format = format;
            }
            if let Some(layout) = layout {
                config.output.layout = layout;
            }
            run(&common, config, commands::faces)
        }
        Commands::Mesh { common } => {
            let config = common.config()?;
            run(&common, config, commands::mesh)
        }
        Commands::Stats { common } => {
            let config = common.config()?;
            run(&common, config, commands::stats)
        }
    }
}

type Command = fn(
    &bttc::GridBuf,
    Option<Window>,
    &ToolConfig,
    &mut BufWriter<Box<dyn Write>>,
) -> anyhow::Result<()>;

fn run(common: &CommonArgs, config: ToolConfig, command: Command) -> anyhow::Result<()> {
    config.validate()?;
    let grid = load_grid(&common.input, common.input_format, common.window)?;

    let mut writer = BufWriter::new(open_output(common.output.as_deref())?);
    command(&grid, common.window, &config, &mut writer)?;
    writer.flush().context("failed to flush output")?;
    Ok(())
}

fn open_output(path: Option<&Path>) -> anyhow::Result<Box<dyn Write>> {
    match path {
        Some(path) => {
            let file = File::create(path)
                .with_context(|| format!("failed to create {}", path.display()))?;
            Ok(Box::new(file))
        }
        None => Ok(Box::new(io::stdout().lock())),
    }
}
