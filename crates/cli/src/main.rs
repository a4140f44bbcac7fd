// SeqRecon CLI - config-driven multi-judge ranking reconciliation

mod exit_codes;

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::{Parser, Subcommand};

use exit_codes::{EXIT_EMPTY_JOIN, EXIT_IO, EXIT_NO_OVERLAP, EXIT_PARSE, EXIT_SUCCESS, EXIT_USAGE};
use seqrecon_engine::agreement;
use seqrecon_engine::ingest::{load_aux_rows, load_ranking_rows};
use seqrecon_engine::join::top_missing;
use seqrecon_engine::{run, MergeConfig, MergeError, MergeInput};

#[derive(Parser)]
#[command(name = "seqrecon")]
#[command(about = "Reconcile multi-judge peptide rankings")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a merge from a TOML config file
    #[command(after_help = "\
Examples:
  seqrecon run merge.toml
  seqrecon run merge.toml --json
  seqrecon run merge.toml --output report.json")]
    Run {
        /// Path to the merge TOML config file
        config: PathBuf,

        /// Output JSON to stdout instead of human summary
        #[arg(long)]
        json: bool,

        /// Write JSON output to file
        #[arg(long)]
        output: Option<PathBuf>,
    },

    /// Validate a merge config without running
    Validate {
        /// Path to the merge TOML config file
        config: PathBuf,
    },

    /// Compare two independent rankings over their shared sequences
    #[command(after_help = "\
Examples:
  seqrecon compare rankings_noah.csv rankings_isaak.csv
  seqrecon compare a.csv b.csv --json")]
    Compare {
        /// First ranking CSV
        a: PathBuf,

        /// Second ranking CSV
        b: PathBuf,

        /// Output the shared ratings and correlations as JSON
        #[arg(long)]
        json: bool,
    },
}

#[derive(Debug)]
struct CliError {
    code: u8,
    message: String,
    hint: Option<String>,
}

impl CliError {
    fn io(msg: impl Into<String>) -> Self {
        Self { code: EXIT_IO, message: msg.into(), hint: None }
    }

    fn parse(msg: impl Into<String>) -> Self {
        Self { code: EXIT_PARSE, message: msg.into(), hint: None }
    }
}

impl From<MergeError> for CliError {
    fn from(err: MergeError) -> Self {
        let code = match err {
            MergeError::Io(_) => EXIT_IO,
            _ => EXIT_PARSE,
        };
        Self { code, message: err.to_string(), hint: None }
    }
}

fn main() -> ExitCode {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) => {
            // Help and version exit 0; real usage errors exit 2.
            let code = if e.use_stderr() { EXIT_USAGE } else { EXIT_SUCCESS };
            let _ = e.print();
            return ExitCode::from(code);
        }
    };

    let result = match cli.command {
        Commands::Run { config, json, output } => cmd_run(config, json, output),
        Commands::Validate { config } => cmd_validate(config),
        Commands::Compare { a, b, json } => cmd_compare(a, b, json),
    };

    match result {
        Ok(()) => ExitCode::from(EXIT_SUCCESS),
        Err(CliError { code, message, hint }) => {
            if !message.is_empty() {
                eprintln!("error: {message}");
            }
            if let Some(hint) = hint {
                eprintln!("hint:  {hint}");
            }
            ExitCode::from(code)
        }
    }
}

fn read_file(path: &Path) -> Result<String, CliError> {
    std::fs::read_to_string(path)
        .map_err(|e| CliError::io(format!("cannot read {}: {e}", path.display())))
}

/// Judge name for a bare CSV path: file stem, as the original exports name
/// their ranking runs.
fn judge_name(path: &Path) -> String {
    path.file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

fn load_input(config: &MergeConfig, base_dir: &Path) -> Result<MergeInput, CliError> {
    let mut rankings = Vec::new();
    for (judge, judge_config) in &config.judges {
        let csv_data = read_file(&base_dir.join(&judge_config.file))?;
        rankings.extend(load_ranking_rows(judge, &csv_data)?);
    }

    let aux = match &config.aux {
        Some(aux_config) => load_aux_rows(&read_file(&base_dir.join(&aux_config.file))?)?,
        None => Vec::new(),
    };

    Ok(MergeInput { rankings, aux })
}

fn cmd_run(
    config_path: PathBuf,
    json_output: bool,
    output_file: Option<PathBuf>,
) -> Result<(), CliError> {
    let config_str = read_file(&config_path)?;
    let config = MergeConfig::from_toml(&config_str)?;

    // File paths in the config are relative to the config file itself.
    let base_dir = config_path.parent().unwrap_or_else(|| Path::new("."));
    let input = load_input(&config, base_dir)?;
    let has_aux = config.aux.is_some();

    let result = run(&input);

    let json_str = serde_json::to_string_pretty(&result)
        .map_err(|e| CliError::io(format!("JSON serialization error: {e}")))?;

    if let Some(path) = &output_file {
        std::fs::write(path, &json_str)
            .map_err(|e| CliError::io(format!("cannot write output: {e}")))?;
        eprintln!("wrote {}", path.display());
    }

    if json_output {
        println!("{json_str}");
    }

    // Human summary to stderr
    eprintln!(
        "merge '{}': {} sequences in {} canonical groups, {} judge(s)",
        config.name,
        result.mapping.len(),
        result.mapping.canonicals().len(),
        result.per_judge.len(),
    );
    let diag = &result.combined_join.diagnostics;
    if has_aux {
        eprintln!(
            "join: {} rows, {} numeric, {} matched, {} baseline, {} missing",
            diag.rows_seen,
            diag.numeric_rows,
            diag.matched_rows,
            result.combined_join.baseline.len(),
            diag.missing_total,
        );
    }

    if diag.missing_total > 0 {
        eprintln!("missing ratings for {} rows (examples):", diag.missing_total);
        for example in &diag.missing_examples {
            eprintln!("  raw='{}' canonical='{}'", example.raw, example.canonical);
        }
        eprintln!("top missing canonicals:");
        for (canonical, count) in top_missing(diag, 10) {
            eprintln!("  {canonical} -> {count}");
        }
    }

    if has_aux && result.combined_join.points.is_empty() {
        return Err(CliError {
            code: EXIT_EMPTY_JOIN,
            message: format!(
                "no data points after join (rows: {}, numeric: {}, matched: {})",
                diag.rows_seen, diag.numeric_rows, diag.matched_rows,
            ),
            hint: Some("check that the aux file and the rankings name the same sequences".into()),
        });
    }

    Ok(())
}

fn cmd_validate(config_path: PathBuf) -> Result<(), CliError> {
    let config_str = read_file(&config_path)?;
    match MergeConfig::from_toml(&config_str) {
        Ok(config) => {
            eprintln!(
                "valid: merge '{}' with {} judge(s){}",
                config.name,
                config.judges.len(),
                if config.aux.is_some() { ", aux dataset" } else { "" },
            );
            Ok(())
        }
        Err(e) => Err(CliError::parse(e.to_string())),
    }
}

/// Canonical-average map for one standalone ranking file: its own
/// resolver pass, its own invalid set.
fn standalone_ratings(path: &Path) -> Result<seqrecon_engine::RatingMap, CliError> {
    let judge = judge_name(path);
    let rows = load_ranking_rows(&judge, &read_file(path)?)?;
    let result = run(&MergeInput { rankings: rows, aux: Vec::new() });
    Ok(result.combined)
}

fn cmd_compare(a: PathBuf, b: PathBuf, json_output: bool) -> Result<(), CliError> {
    let ratings_a = standalone_ratings(&a)?;
    let ratings_b = standalone_ratings(&b)?;

    let agreement = agreement::compare(&ratings_a, &ratings_b).ok_or(CliError {
        code: EXIT_NO_OVERLAP,
        message: "no shared sequences after canonicalization".into(),
        hint: None,
    })?;

    if json_output {
        let json_str = serde_json::to_string_pretty(&agreement)
            .map_err(|e| CliError::io(format!("JSON serialization error: {e}")))?;
        println!("{json_str}");
    }

    eprintln!(
        "shared sequences: {} | pearson={:.4} | spearman={:.4}",
        agreement.shared.len(),
        agreement.pearson,
        agreement.spearman,
    );

    Ok(())
}
