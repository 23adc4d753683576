//! notepdf CLI - add note-taking margins to PDF pages

use std::fs;
use std::path::{Path, PathBuf};

use clap::{Args, Parser, Subcommand, ValueEnum};
use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};
use rayon::prelude::*;
use serde::Deserialize;

use notepdf::{
    export_document_with_options, generate_preview, inspect_document, is_pdf, resolve,
    AssembleOptions, Color, FillSpec, MarginConfig, PatternFill, PatternKind, SideSet, Size,
    PREVIEW_PAGE_LIMIT,
};

type CliResult<T> = Result<T, Box<dyn std::error::Error>>;

#[derive(Parser)]
#[command(name = "notepdf")]
#[command(author = "notepdf contributors")]
#[command(version)]
#[command(about = "Add note-taking margins to PDF pages", long_about = None)]
struct Cli {
    /// Input PDF file
    #[arg(value_name = "FILE")]
    input: Option<PathBuf>,

    /// Output PDF file
    #[arg(value_name = "OUTPUT")]
    output: Option<PathBuf>,

    #[command(flatten)]
    margin: MarginArgs,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Add margins to every page of one or more PDFs
    Export {
        /// Input PDF files
        #[arg(value_name = "FILES", required = true)]
        files: Vec<PathBuf>,

        /// Output directory (next to each input if not specified)
        #[arg(short, long, value_name = "DIR")]
        output: Option<PathBuf>,

        /// Leave out pages that cannot be transplanted instead of failing
        #[arg(long)]
        skip_bad_pages: bool,

        /// Write uncompressed streams
        #[arg(long)]
        no_compress: bool,

        #[command(flatten)]
        margin: MarginArgs,
    },

    /// Write original and transformed previews of the first pages
    Preview {
        /// Input PDF file
        #[arg(value_name = "FILE")]
        input: PathBuf,

        /// Output directory (current directory if not specified)
        #[arg(short, long, value_name = "DIR")]
        output: Option<PathBuf>,

        #[command(flatten)]
        margin: MarginArgs,
    },

    /// Show page sizes and rotations
    Info {
        /// Input PDF file
        #[arg(value_name = "FILE")]
        input: PathBuf,

        /// Output JSON
        #[arg(long)]
        json: bool,

        /// Also show the canvas each page would get
        #[arg(long)]
        placements: bool,

        #[command(flatten)]
        margin: MarginArgs,
    },

    /// Show version information
    Version,
}

#[derive(Args, Clone)]
struct MarginArgs {
    /// Sides to extend, comma separated (left,right,top,bottom)
    #[arg(long, env = "NOTEPDF_SIDES", default_value = "right")]
    sides: String,

    /// Margin width in percent of the page dimension
    #[arg(short, long, env = "NOTEPDF_WIDTH", default_value = "25")]
    width: f32,

    /// Width for left/right margins, overrides --width
    #[arg(long, value_name = "PERCENT")]
    horizontal_width: Option<f32>,

    /// Width for top/bottom margins, overrides --width
    #[arg(long, value_name = "PERCENT")]
    vertical_width: Option<f32>,

    /// Margin fill
    #[arg(long, value_enum, env = "NOTEPDF_FILL", default_value = "solid")]
    fill: FillKind,

    /// Fill colour as #rrggbb
    #[arg(long)]
    color: Option<String>,

    /// Pattern spacing in points
    #[arg(long, default_value = "14.4")]
    spacing: f32,

    /// Pattern stroke width in points
    #[arg(long, default_value = "0.5")]
    line_width: f32,

    /// JSON file with {"margin": ..., "fill": ...}, overrides the flags above
    #[arg(long, env = "NOTEPDF_CONFIG", value_name = "FILE")]
    config: Option<PathBuf>,
}

#[derive(Copy, Clone, PartialEq, Eq, ValueEnum)]
enum FillKind {
    /// Flat colour
    Solid,
    /// Ruled lines
    Lines,
    /// Square grid
    Grid,
    /// Dot grid
    Dots,
}

#[derive(Deserialize)]
struct ConfigFile {
    margin: MarginConfig,
    #[serde(default)]
    fill: FillSpec,
}

impl MarginArgs {
    fn resolve(&self) -> CliResult<(MarginConfig, FillSpec)> {
        if let Some(path) = &self.config {
            let text = fs::read_to_string(path)?;
            let config: ConfigFile = serde_json::from_str(&text)
                .map_err(|e| format!("Invalid config {}: {}", path.display(), e))?;
            return Ok((config.margin, config.fill));
        }

        let sides: SideSet = self.sides.parse()?;
        let margin = match (self.horizontal_width, self.vertical_width) {
            (None, None) => MarginConfig::new(sides, self.width),
            (h, v) => MarginConfig::per_axis(
                sides,
                h.unwrap_or(self.width),
                v.unwrap_or(self.width),
            ),
        };

        let color = self.color.as_deref().map(str::parse::<Color>).transpose()?;
        let fill = match self.fill {
            FillKind::Solid => FillSpec::solid(color.unwrap_or(Color::WHITE)),
            kind => {
                let kind = match kind {
                    FillKind::Lines => PatternKind::Lines,
                    FillKind::Grid => PatternKind::Grid,
                    _ => PatternKind::Dots,
                };
                FillSpec::Pattern(
                    PatternFill::new(kind, self.spacing, color.unwrap_or(Color::RULE_GRAY))
                        .with_line_width(self.line_width),
                )
            }
        };

        Ok((margin, fill))
    }
}

fn main() {
    env_logger::init();

    let cli = Cli::parse();

    let result = match cli.command {
        Some(Commands::Export {
            files,
            output,
            skip_bad_pages,
            no_compress,
            margin,
        }) => {
            let mut options = AssembleOptions::new().with_compression(!no_compress);
            if skip_bad_pages {
                options = options.skip_bad_pages();
            }
            cmd_export(&files, output.as_deref(), &margin, &options)
        }
        Some(Commands::Preview {
            input,
            output,
            margin,
        }) => cmd_preview(&input, output.as_deref(), &margin),
        Some(Commands::Info {
            input,
            json,
            placements,
            margin,
        }) => cmd_info(&input, json, placements, &margin),
        Some(Commands::Version) => {
            cmd_version();
            Ok(())
        }
        None => {
            // Default behavior: export a single file
            if let Some(input) = cli.input {
                cmd_export_single(&input, cli.output.as_deref(), &cli.margin)
            } else {
                println!("{}", "Usage: notepdf <FILE> [OUTPUT]".yellow());
                println!("       notepdf --help for more information");
                Ok(())
            }
        }
    };

    if let Err(e) = result {
        eprintln!("{}: {}", "Error".red().bold(), e);
        std::process::exit(1);
    }
}

fn default_output(input: &Path, dir: Option<&Path>, suffix: &str) -> PathBuf {
    let stem = input.file_stem().unwrap_or_default().to_string_lossy();
    let name = format!("{}_{}.pdf", stem, suffix);
    match dir {
        Some(dir) => dir.join(name),
        None => input.with_file_name(name),
    }
}

fn export_one(
    input: &Path,
    output: &Path,
    margin: &MarginConfig,
    fill: &FillSpec,
    options: &AssembleOptions,
) -> notepdf::Result<notepdf::Assembly> {
    let data = fs::read(input)?;
    let assembly = export_document_with_options(&data, margin, fill, options)?;
    fs::write(output, &assembly.bytes)?;
    Ok(assembly)
}

fn cmd_export_single(input: &Path, output: Option<&Path>, args: &MarginArgs) -> CliResult<()> {
    let (margin, fill) = args.resolve()?;
    let output = output
        .map(Path::to_path_buf)
        .unwrap_or_else(|| default_output(input, None, "notes"));

    let pb = ProgressBar::new(0);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{bar:40.cyan/blue}] page {pos}/{len}")?
            .progress_chars("#>-"),
    );
    let bar = pb.clone();
    let options = AssembleOptions::default().with_progress(move |done, total| {
        bar.set_length(total as u64);
        bar.set_position(done as u64);
    });

    let assembly = export_one(input, &output, &margin, &fill, &options);
    pb.finish_and_clear();
    let assembly = assembly?;
    println!(
        "{} {} ({} pages)",
        "Saved to".green(),
        output.display(),
        assembly.pages_written
    );
    Ok(())
}

fn cmd_export(
    files: &[PathBuf],
    output: Option<&Path>,
    args: &MarginArgs,
    options: &AssembleOptions,
) -> CliResult<()> {
    let (margin, fill) = args.resolve()?;
    margin.validate()?;
    fill.validate()?;

    if let Some(dir) = output {
        fs::create_dir_all(dir)?;
    }

    let (files, rejected) = split_pdfs(files);
    for input in &rejected {
        println!("  {} {}: not a PDF", "-".yellow(), input.display());
    }

    let pb = ProgressBar::new(files.len() as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{bar:40.cyan/blue}] {pos}/{len} {msg}")?
            .progress_chars("#>-"),
    );
    pb.set_message("Exporting...");

    let results: Vec<_> = files
        .par_iter()
        .map(|input| {
            let target = default_output(input, output, "notes");
            let result = export_one(input, &target, &margin, &fill, options);
            pb.inc(1);
            (input, target, result)
        })
        .collect();

    pb.finish_with_message("Done!");

    let mut failed = 0;
    for (input, target, result) in &results {
        match result {
            Ok(assembly) => {
                println!(
                    "  {} {} -> {} ({} pages)",
                    "✓".green(),
                    input.display(),
                    target.display(),
                    assembly.pages_written
                );
                for (page, reason) in &assembly.skipped {
                    println!("    {} page {} skipped: {}", "!".yellow(), page + 1, reason);
                }
            }
            Err(e) => {
                failed += 1;
                println!("  {} {}: {}", "✗".red(), input.display(), e);
            }
        }
    }

    if failed > 0 || !rejected.is_empty() {
        return Err(format!(
            "{} of {} files failed",
            failed + rejected.len(),
            results.len() + rejected.len()
        )
        .into());
    }
    Ok(())
}

/// Separate inputs with a PDF header from everything else.
fn split_pdfs(files: &[PathBuf]) -> (Vec<&PathBuf>, Vec<&PathBuf>) {
    files.iter().partition(|path| is_pdf(path))
}

fn cmd_preview(input: &Path, output: Option<&Path>, args: &MarginArgs) -> CliResult<()> {
    let (margin, fill) = args.resolve()?;
    let data = fs::read(input)?;
    let preview = generate_preview(&data, &margin, &fill)?;

    let dir = output.unwrap_or_else(|| Path::new("."));
    fs::create_dir_all(dir)?;
    let original = default_output(input, Some(dir), "original_preview");
    let transformed = default_output(input, Some(dir), "preview");
    fs::write(&original, &preview.original)?;
    fs::write(&transformed, &preview.transformed)?;

    println!("\n{}", "Preview files:".green().bold());
    println!("  {} {}", "├─".dimmed(), original.display());
    println!("  {} {}", "└─".dimmed(), transformed.display());
    println!(
        "{}: {} of {}",
        "Pages".bold(),
        preview.total_page_count.min(PREVIEW_PAGE_LIMIT),
        preview.total_page_count
    );
    Ok(())
}

fn cmd_info(input: &Path, json: bool, placements: bool, args: &MarginArgs) -> CliResult<()> {
    let data = fs::read(input)?;
    let info = inspect_document(&data)?;

    let margin = if placements {
        let (margin, _) = args.resolve()?;
        margin.validate()?;
        Some(margin)
    } else {
        None
    };

    if json {
        let mut value = serde_json::to_value(&info)?;
        if let Some(margin) = &margin {
            let resolved: Vec<_> = info
                .pages
                .iter()
                .map(|p| resolve(Size::new(p.width, p.height), p.rotation, margin))
                .collect();
            value["placements"] = serde_json::to_value(resolved)?;
        }
        println!("{}", serde_json::to_string_pretty(&value)?);
        return Ok(());
    }

    println!("{}", "Document Information".cyan().bold());
    println!("{}", "─".repeat(40).dimmed());
    println!("{}: {}", "File".bold(), input.display());
    println!("{}: PDF {}", "Format".bold(), info.version);
    println!("{}: {}", "Pages".bold(), info.page_count);

    println!();
    println!("{}", "Pages".cyan().bold());
    println!("{}", "─".repeat(40).dimmed());
    for page in &info.pages {
        let mut line = format!(
            "{:>4}  {:>8.2} x {:<8.2} {}",
            page.index + 1,
            page.width,
            page.height,
            page.rotation
        );
        if let Some(margin) = &margin {
            let placement = resolve(Size::new(page.width, page.height), page.rotation, margin);
            line.push_str(&format!(
                "  -> {:.2} x {:.2}",
                placement.canvas.width, placement.canvas.height
            ));
        }
        println!("{}", line);
    }

    Ok(())
}

fn cmd_version() {
    println!("{} {}", "notepdf".cyan().bold(), env!("CARGO_PKG_VERSION"));
    println!("Note-taking margins for PDF documents");
    println!();
    println!("License: MIT");
}
