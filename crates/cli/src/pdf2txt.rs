//! pdf2txt - extract text from PDF files.
//!
//! Each document is split into page ranges that are extracted concurrently
//! and joined back in page order.

use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result, bail};
use clap::{ArgAction, Parser, ValueEnum};
use serde::Serialize;
use tracing::error;
use tracing_subscriber::EnvFilter;

use quire_core::api::{
    ConversionResult, ExtractOptions, PdfConverter, PdfRangeExtractor, Pipeline, PipelineConfig,
    StreamInfo,
};
use quire_core::image::PlaceholderDescriber;
use quire_core::layout::LAParams;

/// Output type for the extracted content.
#[derive(Debug, Clone, Copy, ValueEnum, Default, PartialEq, Eq)]
enum OutputType {
    /// Plain text (default)
    #[default]
    Text,
    /// One JSON object per input file
    Json,
}

/// Extract text from PDF files.
#[derive(Parser, Debug)]
#[command(name = "pdf2txt")]
#[command(author, version, about, long_about = None)]
#[command(disable_version_flag = true)]
struct Args {
    /// One or more paths to PDF files
    #[arg(required = true)]
    files: Vec<PathBuf>,

    /// Use debug logging level
    #[arg(short = 'd', long, action = ArgAction::SetTrue)]
    debug: bool,

    /// Disable caching of fonts
    #[arg(short = 'C', long = "disable-caching", action = ArgAction::SetTrue)]
    disable_caching: bool,

    /// The password to use for decrypting PDF file
    #[arg(short = 'P', long, default_value = "")]
    password: String,

    /// The number of degrees to rotate the PDF before processing
    #[arg(short = 'R', long, default_value = "0")]
    rotation: i64,

    // === Pipeline options ===
    /// Pages handled by one unit of work
    #[arg(long, env = "MAX_PAGES_PER_THREAD", default_value = "10")]
    max_pages_per_thread: usize,

    /// Worker threads (defaults to the available parallelism)
    #[arg(long, env = "MAX_CONCURRENT_THREADS")]
    max_concurrent_threads: Option<usize>,

    /// Seconds a unit may run before its pages are dropped
    #[arg(long, env = "UNIT_TIMEOUT_SECS", default_value = "150")]
    unit_timeout_secs: u64,

    /// Log unit failures with their full error chain
    #[arg(long, env = "FULL_LOGGING", action = ArgAction::SetTrue)]
    full_logging: bool,

    // === Layout analysis options ===
    /// Disable layout analysis
    #[arg(short = 'n', long = "no-laparams", action = ArgAction::SetTrue)]
    no_laparams: bool,

    /// Consider vertical text during layout analysis
    #[arg(short = 'V', long = "detect-vertical", action = ArgAction::SetTrue)]
    detect_vertical: bool,

    /// Line overlap ratio (relative to character height)
    #[arg(long = "line-overlap", default_value = "0.5")]
    line_overlap: f64,

    /// Character margin (relative to character width)
    #[arg(short = 'M', long = "char-margin", default_value = "2.0")]
    char_margin: f64,

    /// Word margin (relative to character width)
    #[arg(short = 'W', long = "word-margin", default_value = "0.1")]
    word_margin: f64,

    /// Line margin (relative to line height)
    #[arg(short = 'L', long = "line-margin", default_value = "0.5")]
    line_margin: f64,

    /// Boxes flow direction (-1.0 to 1.0, or "disabled")
    #[arg(short = 'F', long = "boxes-flow", default_value = "0.5", value_parser = parse_boxes_flow)]
    boxes_flow: BoxesFlow,

    /// Perform layout analysis on text in figures
    #[arg(short = 'A', long = "all-texts", action = ArgAction::SetTrue)]
    all_texts: bool,

    // === Output options ===
    /// Write a "Page N" header before each page
    #[arg(long = "show-pageno", action = ArgAction::SetTrue)]
    show_pageno: bool,

    /// Insert a placeholder line for each image
    #[arg(long = "describe-images", action = ArgAction::SetTrue)]
    describe_images: bool,

    /// Path to file where output is written, or "-" for stdout
    #[arg(short = 'o', long, default_value = "-")]
    outfile: String,

    /// Type of output to generate
    #[arg(short = 't', long = "output-type", value_enum, default_value = "text")]
    output_type: OutputType,
}

/// Parsed `--boxes-flow`; `None` disables box grouping.
#[derive(Debug, Clone, Copy, PartialEq)]
struct BoxesFlow(Option<f64>);

#[derive(Debug, Serialize)]
struct JsonOutput<'a> {
    file: String,
    title: Option<&'a str>,
    text: &'a str,
    partial: bool,
    /// Dropped page ranges as zero-based `[start, end)` pairs.
    incomplete_ranges: Vec<(usize, usize)>,
}

/// Parse boxes_flow value - either a float or "disabled".
fn parse_boxes_flow(s: &str) -> std::result::Result<BoxesFlow, String> {
    let s = s.trim().to_lowercase();
    if s == "disabled" {
        return Ok(BoxesFlow(None));
    }
    let v = s
        .parse::<f64>()
        .map_err(|_| format!("invalid float value: {s}"))?;
    if (-1.0..=1.0).contains(&v) {
        Ok(BoxesFlow(Some(v)))
    } else {
        Err(format!("boxes_flow must be between -1.0 and 1.0, got {v}"))
    }
}

fn build_laparams(args: &Args) -> Result<Option<LAParams>> {
    if args.no_laparams {
        return Ok(None);
    }
    let laparams = LAParams {
        line_overlap: args.line_overlap,
        char_margin: args.char_margin,
        line_margin: args.line_margin,
        word_margin: args.word_margin,
        boxes_flow: args.boxes_flow.0,
        detect_vertical: args.detect_vertical,
        all_texts: args.all_texts,
    };
    laparams.validate()?;
    Ok(Some(laparams))
}

fn build_converter(args: &Args) -> Result<PdfConverter> {
    let options = ExtractOptions {
        password: args.password.clone(),
        caching: !args.disable_caching,
        laparams: build_laparams(args)?,
        rotation: args.rotation,
        show_pageno: args.show_pageno,
        ..ExtractOptions::default()
    };
    let mut config = PipelineConfig {
        max_pages_per_thread: args.max_pages_per_thread,
        unit_timeout: Duration::from_secs(args.unit_timeout_secs),
        full_logging: args.full_logging,
        ..PipelineConfig::default()
    };
    if let Some(threads) = args.max_concurrent_threads {
        config.max_concurrent_threads = threads;
    }
    let mut extractor = PdfRangeExtractor::new(options);
    if args.describe_images {
        extractor = extractor.with_describer(Arc::new(PlaceholderDescriber));
    }
    let pipeline = Pipeline::new(config, extractor).context("cannot start extraction pool")?;
    Ok(PdfConverter::new(pipeline))
}

fn write_result<W: Write>(
    writer: &mut W,
    path: &PathBuf,
    result: &ConversionResult,
    output_type: OutputType,
) -> Result<()> {
    match output_type {
        OutputType::Text => writer.write_all(result.text.as_bytes())?,
        OutputType::Json => {
            let out = JsonOutput {
                file: path.display().to_string(),
                title: result.title.as_deref(),
                text: &result.text,
                partial: result.is_partial(),
                incomplete_ranges: result
                    .incomplete_ranges
                    .iter()
                    .map(|r| (r.start, r.end))
                    .collect(),
            };
            serde_json::to_writer(&mut *writer, &out)?;
            writer.write_all(b"\n")?;
        }
    }
    Ok(())
}

fn init_logging(debug: bool) {
    let default = if debug { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

fn main() -> Result<()> {
    let args = Args::parse();
    init_logging(args.debug);

    let converter = build_converter(&args)?;

    let mut output: Box<dyn Write> = if args.outfile == "-" {
        Box::new(BufWriter::new(io::stdout()))
    } else {
        let file = File::create(&args.outfile)
            .with_context(|| format!("failed to create output file {}", args.outfile))?;
        Box::new(BufWriter::new(file))
    };

    let mut failures = 0;
    for path in &args.files {
        let info = StreamInfo::from_path(path);
        if !converter.accepts(&info) {
            tracing::warn!(path = %path.display(), "file does not have a .pdf extension");
        }
        let result = File::open(path)
            .with_context(|| format!("cannot open {}", path.display()))
            .and_then(|file| {
                converter
                    .convert(file, &info)
                    .with_context(|| format!("cannot convert {}", path.display()))
            });
        match result {
            Ok(result) => write_result(&mut output, path, &result, args.output_type)?,
            Err(err) => {
                error!("{err:#}");
                failures += 1;
            }
        }
    }

    output.flush()?;
    converter.shutdown();

    if failures > 0 {
        bail!("{failures} of {} file(s) failed", args.files.len());
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_boxes_flow() {
        assert_eq!(parse_boxes_flow("disabled"), Ok(BoxesFlow(None)));
        assert_eq!(parse_boxes_flow(" -0.5 "), Ok(BoxesFlow(Some(-0.5))));
        assert!(parse_boxes_flow("2").is_err());
        assert!(parse_boxes_flow("abc").is_err());
    }

    #[test]
    fn test_args_from_command_line() {
        let args = Args::try_parse_from([
            "pdf2txt",
            "--max-pages-per-thread",
            "4",
            "--boxes-flow",
            "disabled",
            "-t",
            "json",
            "a.pdf",
        ])
        .unwrap();
        assert_eq!(args.max_pages_per_thread, 4);
        assert_eq!(args.boxes_flow, BoxesFlow(None));
        assert_eq!(args.output_type, OutputType::Json);
        assert_eq!(build_laparams(&args).unwrap().unwrap().boxes_flow, None);
    }

    #[test]
    fn test_command_definition() {
        use clap::CommandFactory;
        Args::command().debug_assert();
    }

    #[test]
    fn test_short_v_is_detect_vertical() {
        let args = Args::try_parse_from(["pdf2txt", "-V", "a.pdf"]).unwrap();
        assert!(args.detect_vertical);
        assert!(build_laparams(&args).unwrap().unwrap().detect_vertical);
    }

    #[test]
    fn test_no_laparams() {
        let args = Args::try_parse_from(["pdf2txt", "-n", "a.pdf"]).unwrap();
        assert!(build_laparams(&args).unwrap().is_none());
    }
}
