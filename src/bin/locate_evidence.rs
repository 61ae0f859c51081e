//! Locate and render answer evidence in a PDF
//!
//! Writes one `page_<n>.png` per page containing the search sentence, plus an
//! `evidence.json` manifest.
//!
//! Usage:
//!   cargo run --release --bin locate_evidence -- <file.pdf> --sentence "<text>" --answer "<text>"
//!   cargo run --release --bin locate_evidence -- <file.pdf> --context context.txt --span span.json
//!
//! Options:
//!   --output-dir <dir>   Output directory (default: evidence_output)
//!   --config <file>      JSON configuration file
//!   --skip-failed        Skip pages that fail instead of aborting
//!   --verbose, -v        Print per-page details

use pdf_evidence::evidence::snippet::{AnswerSpan, EvidenceQuery, DEFAULT_WINDOW};
use pdf_evidence::{EvidenceConfig, EvidenceLocator, FailurePolicy};
use std::fs;
use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Instant;

struct CliArgs {
    pdf_path: Option<PathBuf>,
    sentence: Option<String>,
    answer: Option<String>,
    context_path: Option<PathBuf>,
    span_path: Option<PathBuf>,
    config_path: Option<PathBuf>,
    output_dir: PathBuf,
    skip_failed: bool,
    verbose: bool,
}

impl CliArgs {
    fn from_args() -> Self {
        let args: Vec<String> = std::env::args().collect();
        let mut cli = Self {
            pdf_path: None,
            sentence: None,
            answer: None,
            context_path: None,
            span_path: None,
            config_path: None,
            output_dir: PathBuf::from("evidence_output"),
            skip_failed: false,
            verbose: false,
        };

        let mut i = 1;
        while i < args.len() {
            let value = args.get(i + 1).cloned();
            match args[i].as_str() {
                "--sentence" => {
                    cli.sentence = value;
                    i += 1;
                },
                "--answer" => {
                    cli.answer = value;
                    i += 1;
                },
                "--context" => {
                    cli.context_path = value.map(PathBuf::from);
                    i += 1;
                },
                "--span" => {
                    cli.span_path = value.map(PathBuf::from);
                    i += 1;
                },
                "--config" => {
                    cli.config_path = value.map(PathBuf::from);
                    i += 1;
                },
                "--output-dir" => {
                    if let Some(dir) = value {
                        cli.output_dir = PathBuf::from(dir);
                    }
                    i += 1;
                },
                "--skip-failed" => cli.skip_failed = true,
                "--verbose" | "-v" => cli.verbose = true,
                other if cli.pdf_path.is_none() && !other.starts_with("--") => {
                    cli.pdf_path = Some(PathBuf::from(other));
                },
                other => eprintln!("Ignoring unknown argument: {}", other),
            }
            i += 1;
        }

        cli
    }

    /// Search sentence and answer, given directly or derived from a QA answer span.
    fn query(&self) -> Result<Option<EvidenceQuery>, Box<dyn std::error::Error>> {
        if let (Some(context_path), Some(span_path)) = (&self.context_path, &self.span_path) {
            let context = fs::read_to_string(context_path)?;
            let span: AnswerSpan = serde_json::from_str(&fs::read_to_string(span_path)?)?;
            return Ok(EvidenceQuery::from_span(&context, &span, DEFAULT_WINDOW));
        }

        match (&self.sentence, &self.answer) {
            (Some(sentence), answer) => Ok(Some(EvidenceQuery {
                search_sentence: sentence.clone(),
                answer: answer.clone().unwrap_or_default(),
            })),
            (None, _) => Err("either --sentence or --context with --span is required".into()),
        }
    }
}

fn print_usage() {
    eprintln!("Usage: locate_evidence <file.pdf> --sentence <text> [--answer <text>]");
    eprintln!("       locate_evidence <file.pdf> --context <context.txt> --span <span.json>");
    eprintln!("Options: --output-dir <dir> --config <file.json> --skip-failed --verbose");
}

fn run(cli: &CliArgs) -> Result<(), Box<dyn std::error::Error>> {
    let pdf_path = cli.pdf_path.as_ref().ok_or("missing PDF path")?;

    let mut config = match &cli.config_path {
        Some(path) => EvidenceConfig::from_json_file(path)?,
        None => EvidenceConfig::default(),
    };
    if cli.skip_failed {
        config = config.with_failure_policy(FailurePolicy::SkipPage);
    }

    let Some(query) = cli.query()? else {
        println!("Answer is empty, nothing to locate");
        return Ok(());
    };

    println!("PDF Evidence Locator");
    println!("====================");
    println!("Document: {}", pdf_path.display());
    println!("Search sentence: {:?}", query.search_sentence);
    println!("Answer: {:?}", query.answer);
    println!();

    let start = Instant::now();
    let locator = EvidenceLocator::new(config)?;
    let result = locator.locate_file(pdf_path, &query.search_sentence, &query.answer)?;

    if cli.verbose {
        for entry in &result.entries {
            println!(
                "  page {}: {}x{} px, highlight: {}",
                entry.page_number,
                entry.image.width(),
                entry.image.height(),
                if entry.highlight.is_some() { "yes" } else { "no" }
            );
        }
    }
    for skipped in &result.skipped {
        eprintln!("  page {} skipped: {}", skipped.page_number, skipped.reason);
    }

    let manifest = result.save(&cli.output_dir)?;
    println!(
        "Found evidence on {} page(s) in {:.2}s",
        result.len(),
        start.elapsed().as_secs_f64()
    );
    println!("Manifest: {}", manifest.display());
    Ok(())
}

fn main() -> ExitCode {
    env_logger::init();

    let cli = CliArgs::from_args();
    if cli.pdf_path.is_none() {
        print_usage();
        return ExitCode::FAILURE;
    }

    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        },
    }
}
