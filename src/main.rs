// src/main.rs
use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use tracing::{debug, info};

use kryon_core::Direction;
use kryon_layout::{LayoutTree, PrintOptions};

mod description;

use description::NodeDescription;

#[derive(Debug, Clone, Copy, ValueEnum)]
enum TextDirection {
    Ltr,
    Rtl,
}

impl From<TextDirection> for Direction {
    fn from(direction: TextDirection) -> Self {
        match direction {
            TextDirection::Ltr => Direction::Ltr,
            TextDirection::Rtl => Direction::Rtl,
        }
    }
}

#[derive(Parser)]
#[command(author, version, about = "Lay out a JSON node tree and dump the result", long_about = None)]
struct Args {
    /// Path to the JSON tree description
    #[arg(value_name = "FILE")]
    file: PathBuf,

    /// Available width; unconstrained when omitted
    #[arg(long)]
    width: Option<f64>,

    /// Available height; unconstrained when omitted
    #[arg(long)]
    height: Option<f64>,

    /// Writing direction of the root
    #[arg(long, value_enum, default_value = "ltr")]
    direction: TextDirection,

    /// Include non-default style properties in the dump
    #[arg(long)]
    style: bool,

    /// Dump only the root node
    #[arg(long)]
    no_children: bool,

    /// Save output to file instead of stdout
    #[arg(long)]
    output: Option<PathBuf>,

    /// Enable debug logging
    #[arg(short, long)]
    debug: bool,
}

fn main() -> Result<()> {
    let args = Args::parse();

    // Initialize logging
    let level = if args.debug { tracing::Level::DEBUG } else { tracing::Level::INFO };
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env().add_directive(level.into()))
        .with_target(false)
        .compact()
        .with_writer(std::io::stderr)
        .init();

    let source = fs::read_to_string(&args.file)
        .with_context(|| format!("Failed to read tree description: {}", args.file.display()))?;
    let description: NodeDescription = serde_json::from_str(&source)
        .with_context(|| format!("Failed to parse tree description: {}", args.file.display()))?;

    let mut tree = LayoutTree::new();
    let root = description.build(&mut tree).context("Failed to build node tree")?;
    info!("Loaded {} nodes from {}", tree.node_count(), args.file.display());

    let width = args.width.unwrap_or(f64::NAN);
    let height = args.height.unwrap_or(f64::NAN);
    tree.compute_layout(root, width, height, args.direction.into())
        .context("Layout failed")?;

    let mut options = PrintOptions::LAYOUT;
    if args.style {
        options |= PrintOptions::STYLE;
    }
    if !args.no_children {
        options |= PrintOptions::CHILDREN;
    }
    if args.debug {
        tree.log_tree(root, options | PrintOptions::STYLE)?;
    }

    let mut output_text = tree.print_tree(root, options)?;
    output_text.push('\n');

    if let Some(output_file) = args.output {
        fs::write(&output_file, output_text)
            .with_context(|| format!("Failed to write to file: {}", output_file.display()))?;
        debug!("Output written to: {}", output_file.display());
    } else {
        print!("{}", output_text);
    }

    Ok(())
}
