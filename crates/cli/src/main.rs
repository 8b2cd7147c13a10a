//! CLI tool for exporting presentation snapshots and outlines.

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use deck_core::{
    EditAction, EditorConfig, InstructionalLevel, Layout, OutlineTopic, Presentation, Slide,
    Snapshot, SubtopicPolicy,
};
use deck_pptx::{LocalFileResolver, PptxWriter};
use serde::Deserialize;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Format {
    Pptx,
    Json,
}

/// Export saved presentations or outlines to PPTX or JSON snapshots.
#[derive(Parser, Debug)]
#[command(name = "deck-export")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Input JSON file(s): a saved snapshot or a `{ "topics": [...] }` outline
    #[arg(required = true)]
    input: Vec<PathBuf>,

    /// Output format
    #[arg(short, long, value_enum, default_value = "pptx")]
    format: Format,

    /// Output directory (default: same as input file)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Layout for slides projected from an outline
    #[arg(short, long)]
    layout: Option<String>,

    /// How outline subtopics become slides: merge or separate
    #[arg(short, long)]
    subtopics: Option<String>,

    /// Editor configuration file (JSON)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Print the JSON snapshot to stdout instead of writing files
    #[arg(short, long)]
    print: bool,

    /// Verbose output
    #[arg(short, long)]
    verbose: bool,
}

/// Outline document accepted as input.
#[derive(Debug, Deserialize)]
struct OutlineDocument {
    topics: Vec<OutlineTopic>,
    #[serde(default, alias = "instructionalLevel")]
    instructional_level: InstructionalLevel,
}

fn main() -> Result<()> {
    let args = Args::parse();

    if args.verbose {
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("debug")).init();
    } else {
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();
    }

    let config = load_config(&args)?;

    for input_path in &args.input {
        if args.verbose {
            eprintln!("Processing: {}", input_path.display());
        }

        if let Err(e) = process_file(input_path, &args, &config) {
            eprintln!("Error processing {}: {:#}", input_path.display(), e);
        }
    }

    Ok(())
}

/// Build the editor configuration from `--config` and the flag overrides.
fn load_config(args: &Args) -> Result<EditorConfig> {
    let mut config = match &args.config {
        Some(path) => EditorConfig::from_file(path)
            .with_context(|| format!("Failed to load config {}", path.display()))?,
        None => EditorConfig::default(),
    };

    if let Some(id) = &args.layout {
        let layout = Layout::lookup(id)
            .ok_or_else(|| anyhow::anyhow!("Invalid --layout '{}'", id))?;
        config = config.with_default_layout(layout);
    }
    if let Some(name) = &args.subtopics {
        let policy = SubtopicPolicy::from_name(name)
            .ok_or_else(|| anyhow::anyhow!("Invalid --subtopics '{}': expected merge or separate", name))?;
        config = config.with_subtopic_policy(policy);
    }

    log::debug!("Using config: {:?}", config);
    Ok(config)
}

/// Turn input JSON into an ordered slide list.
fn load_slides(json: &str, config: &EditorConfig) -> Result<Vec<Slide>> {
    let value: serde_json::Value = serde_json::from_str(json).context("Input is not valid JSON")?;

    if value.get("slides").is_some() {
        log::debug!("Reading input as snapshot");
        let snapshot = Snapshot::from_json(json)?;
        return Ok(snapshot.slides);
    }

    if value.get("topics").is_some() {
        log::debug!("Reading input as outline");
        let document: OutlineDocument = serde_json::from_value(value)?;
        let presentation = Presentation::new(config.clone())
            .reduce(EditAction::SetOutline {
                topics: document.topics,
            })?
            .reduce(EditAction::ProjectOutline {
                level: document.instructional_level,
            })?;
        return Ok(presentation.into_slides());
    }

    anyhow::bail!("Expected a snapshot with \"slides\" or an outline with \"topics\"")
}

fn process_file(input_path: &Path, args: &Args, config: &EditorConfig) -> Result<()> {
    let json = std::fs::read_to_string(input_path)
        .with_context(|| format!("Failed to open {}", input_path.display()))?;
    let slides = load_slides(&json, config)?;

    if args.verbose {
        eprintln!("  Found {} slides", slides.len());
    }

    let snapshot = Snapshot::new(slides);

    if args.print {
        println!("{}", snapshot.to_json()?);
        return Ok(());
    }

    let file_name = output_file_name(input_path, args.format, &snapshot);
    let output_path = get_output_path(input_path, args.output.as_ref(), &file_name)?;

    match args.format {
        Format::Pptx => write_pptx(input_path, &output_path, &snapshot.slides)?,
        Format::Json => write_output(&output_path, &snapshot.to_json()?)?,
    }

    if args.verbose {
        eprintln!("Written to: {}", output_path.display());
    }

    Ok(())
}

fn write_pptx(input_path: &Path, output_path: &Path, slides: &[Slide]) -> Result<()> {
    let base_dir = input_path
        .parent()
        .map(Path::to_path_buf)
        .unwrap_or_else(|| PathBuf::from("."));
    let title = slides
        .iter()
        .find_map(|s| s.content().title.clone())
        .unwrap_or_else(|| "Presentation".to_string());

    let writer = PptxWriter::new()
        .with_title(title)
        .with_resolver(LocalFileResolver::new(base_dir));

    let file = File::create(output_path)
        .with_context(|| format!("Failed to create {}", output_path.display()))?;
    let mut sink = writer.write(slides, BufWriter::new(file))?;
    sink.flush()
        .with_context(|| format!("Failed to write to {}", output_path.display()))?;
    Ok(())
}

/// Output file name, derived from the input's stem.
fn output_file_name(input_path: &Path, format: Format, snapshot: &Snapshot) -> String {
    let stem = input_path
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("presentation");
    match format {
        Format::Pptx => format!("{}.pptx", stem),
        Format::Json => snapshot.file_name_with_prefix(stem),
    }
}

/// Determine the output path for a processed file.
fn get_output_path(input_path: &Path, output_dir: Option<&PathBuf>, file_name: &str) -> Result<PathBuf> {
    let output_path = match output_dir {
        Some(dir) => {
            std::fs::create_dir_all(dir)
                .with_context(|| format!("Failed to create output directory: {}", dir.display()))?;
            dir.join(file_name)
        }
        None => match input_path.parent() {
            Some(parent) => parent.join(file_name),
            None => PathBuf::from(file_name),
        },
    };

    Ok(output_path)
}

/// Write output to a file.
fn write_output(path: &Path, content: &str) -> Result<()> {
    let mut file =
        File::create(path).with_context(|| format!("Failed to create {}", path.display()))?;

    file.write_all(content.as_bytes())
        .with_context(|| format!("Failed to write to {}", path.display()))?;

    Ok(())
}
