mod config;
mod error;
mod input;
mod output;
mod sink;

use clap::Parser;
use fieldrank_core::{RankingConfig, RankingEngine, RankingMethod, SortDirection, ZeroValueHandling};
use std::path::{Path, PathBuf};
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

use crate::config::{FieldrankConfig, DEFAULT_BATCH_SIZE};
use crate::error::{CliError, Result};
use crate::input::{FieldMapping, FileSource, RecordSource};
use crate::sink::{write_in_batches, JsonLinesSink, RecordUpdate, WriteReport};

pub fn bail(msg: impl std::fmt::Display) -> ! {
    eprintln!("Error: {msg}");
    std::process::exit(1);
}

/// Exit status when some rank updates could not be written.
const EXIT_PARTIAL_WRITE: i32 = 2;

#[derive(Parser)]
#[command(name = "fieldrank", version, about = "Rank records by a numeric field, optionally per group")]
struct Cli {
    /// Show debug logging on stderr (RUST_LOG overrides)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(clap::Subcommand)]
enum Commands {
    /// Rank records and optionally write the ranks back
    Rank(RankArgs),
    /// List the fields found in the input and whether they hold numbers
    Fields(FieldsArgs),
    /// Create a default config file at ~/.config/fieldrank/config.toml
    Init {
        /// Where to create it instead of the default location
        #[arg(long)]
        config: Option<PathBuf>,
    },
}

#[derive(Parser)]
struct RankArgs {
    /// Records file (JSON array, {"records": [...]}, or JSON Lines). Reads stdin if omitted.
    #[arg(long)]
    input: Option<PathBuf>,

    /// Field holding the values to rank
    #[arg(long)]
    source_field: Option<String>,

    /// Field that receives the rank
    #[arg(long)]
    target_field: Option<String>,

    /// Rank separately within each distinct value of this field
    #[arg(long)]
    group_field: Option<String>,

    /// "asc" (smallest is rank 1) or "desc" (largest is rank 1). Default: desc.
    #[arg(long)]
    direction: Option<SortDirection>,

    /// "standard" (1,2,2,4) or "dense" (1,2,2,3). Default: standard.
    #[arg(long)]
    method: Option<RankingMethod>,

    /// "skipZero" leaves zeros unranked, "includeZero" ranks them. Default: skipZero.
    #[arg(long)]
    zero: Option<ZeroValueHandling>,

    /// Write rank updates as JSON Lines to this file. Without it, ranks are only printed.
    #[arg(long)]
    output: Option<PathBuf>,

    /// Rank updates per write batch. Default: 100.
    #[arg(long)]
    batch_size: Option<usize>,

    /// Output JSON instead of table
    #[arg(long)]
    json: bool,

    /// Path to config file (default: ~/.config/fieldrank/config.toml)
    #[arg(long)]
    config: Option<PathBuf>,
}

#[derive(Parser)]
struct FieldsArgs {
    /// Records file. Reads stdin if omitted.
    #[arg(long)]
    input: Option<PathBuf>,

    /// Output JSON instead of table
    #[arg(long)]
    json: bool,
}

fn init_logging(verbose: bool) {
    let default_filter = if verbose {
        "fieldrank=debug,fieldrank_core=debug,warn"
    } else {
        "warn"
    };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter)))
        .with_writer(std::io::stderr)
        .init();
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let result = match cli.command {
        Commands::Rank(args) => run_rank(args),
        Commands::Fields(args) => run_fields(args),
        Commands::Init { config } => run_init(config),
    };

    if let Err(e) = result {
        bail(e);
    }
}

fn run_init(path: Option<PathBuf>) -> Result<()> {
    let path = match path {
        Some(path) => path,
        None => config::config_path()?,
    };
    config::create_default_config(&path)?;
    println!("Created config at {}", path.display());
    println!("Edit it to set your default fields and ranking options.");
    Ok(())
}

fn run_fields(args: FieldsArgs) -> Result<()> {
    let records = FileSource { path: args.input }.fetch_all()?;
    let summaries = input::summarize_fields(&records);
    if args.json {
        println!("{}", output::render_fields_json(&summaries)?);
    } else {
        output::print_fields_table(&summaries, records.len());
    }
    Ok(())
}

/// Fully resolved settings for a rank run: CLI flags over config file over defaults.
#[derive(Debug, Clone, PartialEq)]
struct RankSettings {
    mapping: FieldMapping,
    target_field: String,
    ranking: RankingConfig,
    batch_size: usize,
}

fn resolve_settings(args: &RankArgs, cfg: FieldrankConfig, config_path: &Path) -> Result<RankSettings> {
    let missing = |role| CliError::MissingField {
        role,
        config_path: config_path.to_path_buf(),
    };

    let source_field = args.source_field.clone().or(cfg.source_field).ok_or_else(|| missing("source"))?;
    let target_field = args.target_field.clone().or(cfg.target_field).ok_or_else(|| missing("target"))?;
    if source_field == target_field {
        return Err(CliError::SameSourceAndTarget(source_field));
    }
    let group_field = args.group_field.clone().or(cfg.group_field).filter(|g| !g.is_empty());

    let batch_size = args.batch_size.or(cfg.batch_size).unwrap_or(DEFAULT_BATCH_SIZE);
    if batch_size == 0 {
        return Err(CliError::InvalidBatchSize);
    }

    let ranking = RankingConfig {
        sort_direction: args.direction.or(cfg.sort_direction).unwrap_or_default(),
        ranking_method: args.method.or(cfg.ranking_method).unwrap_or_default(),
        zero_value_handling: args.zero.or(cfg.zero_value_handling).unwrap_or_default(),
        grouping_enabled: group_field.is_some(),
    };

    Ok(RankSettings {
        mapping: FieldMapping {
            source_field,
            group_field,
        },
        target_field,
        ranking,
        batch_size,
    })
}

fn run_rank(args: RankArgs) -> Result<()> {
    // Load config file, merge with CLI args (CLI wins)
    let config_path = match args.config.clone() {
        Some(path) => path,
        None => config::config_path()?,
    };
    let cfg = config::load_config(&config_path)?;
    let settings = resolve_settings(&args, cfg, &config_path)?;

    debug!(
        source = %settings.mapping.source_field,
        target = %settings.target_field,
        group = ?settings.mapping.group_field,
        "resolved fields"
    );

    let table_records = FileSource { path: args.input.clone() }.fetch_all()?;
    let records = input::to_input_records(&table_records, &settings.mapping);

    let outcome = RankingEngine::new(settings.ranking).rank(&records);

    if outcome.is_empty() {
        eprintln!(
            "Warning: no valid data. None of the {} records has a rankable value in \"{}\".",
            records.len(),
            settings.mapping.source_field,
        );
        return Ok(());
    }

    let write_report = match &args.output {
        Some(path) => {
            let updates: Vec<RecordUpdate> = outcome
                .results
                .iter()
                .map(|r| RecordUpdate::from_rank(r, &settings.target_field))
                .collect();
            let mut sink = JsonLinesSink::create(path)?;
            let report = write_in_batches(&mut sink, &updates, settings.batch_size)?;
            info!(
                path = %path.display(),
                succeeded = report.succeeded,
                failed = report.failed,
                batches = report.batches,
                "rank updates written"
            );
            Some(report)
        }
        None => None,
    };

    if args.json {
        println!("{}", output::render_json(&outcome, &records, &settings.ranking, write_report.as_ref())?);
    } else {
        output::print_table(&outcome, &records, &settings.ranking, write_report.as_ref());
    }

    if let Some(WriteReport { failed, .. }) = write_report {
        if failed > 0 {
            eprintln!("Warning: {failed} rank updates could not be written.");
            std::process::exit(EXIT_PARTIAL_WRITE);
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(extra: &[&str]) -> RankArgs {
        let mut argv = vec!["fieldrank", "rank"];
        argv.extend_from_slice(extra);
        match Cli::parse_from(argv).command {
            Commands::Rank(args) => args,
            _ => unreachable!(),
        }
    }

    fn path() -> PathBuf {
        PathBuf::from("/tmp/fieldrank-test.toml")
    }

    #[test]
    fn test_cli_flags_parse_wire_names() {
        let a = args(&["--direction", "asc", "--method", "dense", "--zero", "include-zero"]);
        assert_eq!(a.direction, Some(SortDirection::Asc));
        assert_eq!(a.method, Some(RankingMethod::Dense));
        assert_eq!(a.zero, Some(ZeroValueHandling::IncludeZero));
    }

    #[test]
    fn test_cli_rejects_unknown_method() {
        let argv = ["fieldrank", "rank", "--method", "fractional"];
        assert!(Cli::try_parse_from(argv).is_err());
    }

    #[test]
    fn test_missing_source_field() {
        let err = resolve_settings(&args(&["--target-field", "Rank"]), FieldrankConfig::default(), &path()).unwrap_err();
        assert!(matches!(err, CliError::MissingField { role: "source", .. }));
    }

    #[test]
    fn test_missing_target_field() {
        let err = resolve_settings(&args(&["--source-field", "Score"]), FieldrankConfig::default(), &path()).unwrap_err();
        assert!(matches!(err, CliError::MissingField { role: "target", .. }));
    }

    #[test]
    fn test_source_equals_target_rejected() {
        let err = resolve_settings(
            &args(&["--source-field", "Score", "--target-field", "Score"]),
            FieldrankConfig::default(),
            &path(),
        )
        .unwrap_err();
        assert!(matches!(err, CliError::SameSourceAndTarget(_)));
    }

    #[test]
    fn test_defaults_without_config() {
        let settings = resolve_settings(
            &args(&["--source-field", "Score", "--target-field", "Rank"]),
            FieldrankConfig::default(),
            &path(),
        )
        .unwrap();
        assert_eq!(settings.ranking, RankingConfig::default());
        assert_eq!(settings.batch_size, DEFAULT_BATCH_SIZE);
        assert_eq!(settings.mapping.group_field, None);
    }

    #[test]
    fn test_cli_overrides_config() {
        let cfg = FieldrankConfig {
            source_field: Some("Points".into()),
            target_field: Some("Rank".into()),
            group_field: Some("Team".into()),
            sort_direction: Some(SortDirection::Asc),
            ranking_method: Some(RankingMethod::Dense),
            zero_value_handling: None,
            batch_size: Some(10),
        };
        let settings = resolve_settings(&args(&["--source-field", "Score", "--direction", "desc"]), cfg, &path()).unwrap();
        assert_eq!(settings.mapping.source_field, "Score");
        assert_eq!(settings.target_field, "Rank");
        assert_eq!(settings.mapping.group_field.as_deref(), Some("Team"));
        assert!(settings.ranking.grouping_enabled);
        assert_eq!(settings.ranking.sort_direction, SortDirection::Desc);
        assert_eq!(settings.ranking.ranking_method, RankingMethod::Dense);
        assert_eq!(settings.ranking.zero_value_handling, ZeroValueHandling::SkipZero);
        assert_eq!(settings.batch_size, 10);
    }

    #[test]
    fn test_zero_batch_size_rejected() {
        let err = resolve_settings(
            &args(&["--source-field", "S", "--target-field", "T", "--batch-size", "0"]),
            FieldrankConfig::default(),
            &path(),
        )
        .unwrap_err();
        assert!(matches!(err, CliError::InvalidBatchSize));
    }

    #[test]
    fn test_end_to_end_file_ranking() {
        let dir = tempfile::tempdir().unwrap();
        let input_path = dir.path().join("records.json");
        let output_path = dir.path().join("ranks.jsonl");
        std::fs::write(
            &input_path,
            r#"[
                {"id": "a", "fields": {"Score": 10, "Team": "red"}},
                {"id": "b", "fields": {"Score": 10, "Team": "red"}},
                {"id": "c", "fields": {"Score": 5, "Team": "red"}},
                {"id": "d", "fields": {"Score": 0, "Team": "blue"}},
                {"id": "e", "fields": {"Score": 7, "Team": "blue"}}
            ]"#,
        )
        .unwrap();

        let config_path = dir.path().join("config.toml");
        let a = args(&[
            "--input",
            input_path.to_str().unwrap(),
            "--output",
            output_path.to_str().unwrap(),
            "--source-field",
            "Score",
            "--target-field",
            "Rank",
            "--group-field",
            "Team",
            "--config",
            config_path.to_str().unwrap(),
        ]);
        run_rank(a).unwrap();

        let written: Vec<serde_json::Value> = std::fs::read_to_string(&output_path)
            .unwrap()
            .lines()
            .map(|l| serde_json::from_str(l).unwrap())
            .collect();
        let ranks: Vec<(String, u64)> = written
            .iter()
            .map(|v| (v["id"].as_str().unwrap().to_string(), v["fields"]["Rank"].as_u64().unwrap()))
            .collect();
        assert_eq!(
            ranks,
            vec![("a".into(), 1), ("b".into(), 1), ("c".into(), 3), ("e".into(), 1)]
        );
    }
}
