use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::{Args, Parser, Subcommand};

use u_match::config::EngineConfig;
use u_match::engine::{InputPaths, MatchingEngine};
use u_match::export::ExportOutcome;
use u_match::generator::CohortGenerator;
use u_match::ingest::KeywordClassifier;

/// Top-level CLI parser for the `u-match` binary.
#[derive(Debug, Parser)]
#[command(name = "u-match", version, about = "Student-mentor panel matching")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Only log warnings and errors
    #[arg(short, long, global = true)]
    quiet: bool,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Match students to mentor panels and export the result
    Match(MatchArgs),
    /// Write a synthetic cohort as CSV tables
    Generate(GenerateArgs),
}

#[derive(Debug, Args)]
struct MatchArgs {
    /// Students table
    #[arg(long, value_parser = existing_file)]
    students_input_path: PathBuf,

    /// Type1 mentors table
    #[arg(long, value_parser = existing_file)]
    mentors_type1_path: PathBuf,

    /// Type2 mentors table
    #[arg(long, value_parser = existing_file)]
    mentors_type2_path: Option<PathBuf>,

    /// Type1 mentors per panel
    #[arg(long, allow_negative_numbers = true)]
    type1_n: Option<i64>,

    /// Type2 mentors per panel
    #[arg(long, allow_negative_numbers = true, requires = "mentors_type2_path")]
    type2_n: Option<i64>,

    /// Result table
    #[arg(long, default_value = "./DATASETS/matches.csv")]
    export_path: PathBuf,

    /// Search deadline in seconds
    #[arg(long)]
    timeout_seconds: Option<u64>,

    /// JSON engine configuration
    #[arg(long, value_parser = existing_file)]
    config: Option<PathBuf>,

    /// JSON keyword table for classifying blank subjects
    #[arg(long, value_parser = existing_file)]
    classifier_keywords: Option<PathBuf>,

    /// Fail instead of ignoring n_type2 without a type2 table
    #[arg(long)]
    strict_type2: bool,
}

#[derive(Debug, Args)]
struct GenerateArgs {
    /// Output directory
    #[arg(long)]
    out_dir: PathBuf,

    /// Number of students
    #[arg(long, default_value_t = 50)]
    students: usize,

    /// Number of type1 mentors
    #[arg(long, default_value_t = 30)]
    mentors: usize,

    /// Number of type2 mentors
    #[arg(long, default_value_t = 0)]
    type2_mentors: usize,

    /// RNG seed
    #[arg(long, default_value_t = 42)]
    seed: u64,
}

fn existing_file(value: &str) -> Result<PathBuf, String> {
    let path = PathBuf::from(value);
    if path.is_file() {
        Ok(path)
    } else {
        Err(format!("file not found: {value}"))
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.quiet);

    let result = match cli.command {
        Commands::Match(args) => run_match(args, cli.quiet),
        Commands::Generate(args) => run_generate(&args),
    };
    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(error) => {
            eprintln!("u-match error: {error}");
            ExitCode::FAILURE
        }
    }
}

fn init_tracing(quiet: bool) {
    let level = if quiet { "warn" } else { "info" };
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(level));
    if let Err(error) = tracing_subscriber::fmt().with_env_filter(filter).try_init() {
        eprintln!("failed to initialize tracing subscriber: {error}");
    }
}

/// Config file values, then command-line overrides.
fn engine_config(args: &MatchArgs, quiet: bool) -> u_match::Result<EngineConfig> {
    let mut config = match &args.config {
        Some(path) => EngineConfig::from_json_file(path)?,
        None => EngineConfig::new(),
    };
    if let Some(n) = args.type1_n {
        config = config.with_n_type1(n);
    }
    if let Some(n) = args.type2_n {
        config = config.with_n_type2(n);
    }
    if let Some(seconds) = args.timeout_seconds {
        config = config.with_timeout_seconds(seconds);
    }
    if args.strict_type2 {
        config = config.with_strict_type2(true);
    }
    if quiet {
        config = config.with_verbose(false);
    }
    Ok(config)
}

fn run_match(args: MatchArgs, quiet: bool) -> u_match::Result<()> {
    let config = engine_config(&args, quiet)?;
    let classifier = args
        .classifier_keywords
        .as_deref()
        .map(KeywordClassifier::from_json_file)
        .transpose()?;

    let engine = MatchingEngine::from_files(
        InputPaths {
            students: &args.students_input_path,
            mentors_type1: &args.mentors_type1_path,
            mentors_type2: args.mentors_type2_path.as_deref(),
        },
        config,
        classifier.as_ref().map(|c| c as &dyn u_match::ingest::SubjectClassifier),
    )?;

    let outcome = engine.solve_default()?;
    let kpi = engine.kpi(&outcome.matches);
    tracing::info!(
        status = %outcome.status,
        matched = kpi.matched_students,
        total = kpi.total_students,
        match_rate = kpi.match_rate,
        "solve finished"
    );

    report_export(&engine.export(&outcome.matches, &args.export_path)?, &args.export_path);
    Ok(())
}

fn report_export(outcome: &ExportOutcome, requested: &Path) {
    match outcome {
        ExportOutcome::Written { path, rows } => {
            println!("wrote {rows} matches to {}", path.display());
        }
        ExportOutcome::NothingToExport => {
            println!("no matches found; nothing written to {}", requested.display());
        }
    }
}

fn run_generate(args: &GenerateArgs) -> u_match::Result<()> {
    let files = CohortGenerator::new(args.seed)
        .with_students(args.students)
        .with_mentors(args.mentors)
        .with_type2_mentors(args.type2_mentors)
        .generate()
        .write_csv(&args.out_dir)?;
    println!(
        "wrote {}, {}, {}",
        files.students.display(),
        files.mentors_type1.display(),
        files.mentors_type2.display()
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_command_tree_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_match_args_and_overrides() {
        let dir = tempfile::tempdir().unwrap();
        let students = dir.path().join("s.csv");
        let mentors = dir.path().join("m.csv");
        std::fs::write(&students, "").unwrap();
        std::fs::write(&mentors, "").unwrap();

        let students = students.to_string_lossy().into_owned();
        let mentors = mentors.to_string_lossy().into_owned();

        let cli = Cli::try_parse_from([
            "u-match",
            "match",
            "--students-input-path",
            students.as_str(),
            "--mentors-type1-path",
            mentors.as_str(),
            "--type1-n",
            "2",
            "--timeout-seconds",
            "5",
        ])
        .unwrap();

        let Commands::Match(args) = cli.command else {
            panic!("expected match subcommand");
        };
        assert_eq!(args.export_path, PathBuf::from("./DATASETS/matches.csv"));
        let config = engine_config(&args, true).unwrap();
        assert_eq!(config.n_type1, 2);
        assert_eq!(config.timeout_seconds, 5);
        assert!(!config.verbose);
    }

    #[test]
    fn test_type2_n_requires_type2_table() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("s.csv");
        std::fs::write(&file, "").unwrap();
        let file = file.to_string_lossy().into_owned();

        let result = Cli::try_parse_from([
            "u-match",
            "match",
            "--students-input-path",
            file.as_str(),
            "--mentors-type1-path",
            file.as_str(),
            "--type2-n",
            "1",
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn test_missing_input_file_is_rejected() {
        let result = Cli::try_parse_from([
            "u-match",
            "match",
            "--students-input-path",
            "/nonexistent/students.csv",
            "--mentors-type1-path",
            "/nonexistent/mentors.csv",
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn test_generate_defaults() {
        let cli = Cli::try_parse_from(["u-match", "generate", "--out-dir", "data"]).unwrap();
        let Commands::Generate(args) = cli.command else {
            panic!("expected generate subcommand");
        };
        assert_eq!(args.students, 50);
        assert_eq!(args.mentors, 30);
        assert_eq!(args.type2_mentors, 0);
        assert_eq!(args.seed, 42);
    }
}
