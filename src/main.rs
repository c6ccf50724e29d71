//! dscompare - Compare datasets, their variables, and directories of datasets

use std::fs::File;
use std::io::{IsTerminal, Write};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use termcolor::{ColorChoice, NoColor, StandardStream, WriteColor};

use dscompare::config::{
    CompareOptions, OutputFormat, ReadOptions, Settings, Tolerance, DEFAULT_ABS_TOL,
    DEFAULT_REL_TOL,
};
use dscompare::diff::{compare_tables, SchemaDiff};
use dscompare::library::LibraryComparator;
use dscompare::output::OutputFactory;
use dscompare::parser::ParserFactory;

#[derive(Debug, Clone, Copy, ValueEnum)]
enum CliOutputFormat {
    Json,
    Terminal,
}

impl From<CliOutputFormat> for OutputFormat {
    fn from(f: CliOutputFormat) -> Self {
        match f {
            CliOutputFormat::Json => OutputFormat::Json,
            CliOutputFormat::Terminal => OutputFormat::Terminal,
        }
    }
}

/// Compare tabular datasets (CSV, Excel, Parquet, JSON) the way PROC COMPARE does
#[derive(Parser, Debug)]
#[command(name = "dscompare")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Output format
    #[arg(short, long, value_enum, default_value = "json", global = true)]
    format: CliOutputFormat,

    /// Decimal places when printing floats in terminal output
    #[arg(long, default_value_t = 6, global = true)]
    precision: usize,

    /// Seed recorded in the run settings for host tooling; comparison itself is deterministic
    #[arg(long, default_value_t = 42, global = true)]
    seed: u64,

    /// For Excel files: which sheet to read
    #[arg(long, global = true)]
    sheet: Option<String>,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Compare the variables (columns) of two datasets
    Compvars {
        base: PathBuf,
        comp: PathBuf,
        /// Write the report to a file instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Compare every dataset two directories have in common
    Complibs {
        base_dir: PathBuf,
        comp_dir: PathBuf,
        /// Column(s) to sort and match observations by (comma-separated)
        #[arg(long, value_delimiter = ',')]
        sortvars: Vec<String>,
        /// Write the report to a file instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Compare the observations of two datasets
    Compare {
        base: PathBuf,
        comp: PathBuf,
        /// Column(s) to match observations by (comma-separated)
        #[arg(long, value_delimiter = ',')]
        by: Vec<String>,
        /// Absolute tolerance for numeric comparisons
        #[arg(long, default_value_t = DEFAULT_ABS_TOL)]
        abs_tol: f64,
        /// Relative tolerance for numeric comparisons
        #[arg(long, default_value_t = DEFAULT_REL_TOL)]
        rel_tol: f64,
        /// Write the report to a file instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let level = if cli.verbose {
        log::LevelFilter::Debug
    } else {
        log::LevelFilter::Info
    };
    env_logger::Builder::new()
        .filter_level(level)
        .parse_default_env()
        .init();

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            ExitCode::from(1)
        }
    }
}

fn run(cli: Cli) -> Result<()> {
    let settings = Settings::configure(cli.seed, cli.precision);
    log::debug!(
        "Settings: seed={}, float precision={}",
        settings.seed,
        settings.float_precision
    );
    let formatter = OutputFactory::create(cli.format.into(), settings);
    let read_options = match cli.sheet {
        Some(sheet) => ReadOptions::default().with_sheet_name(sheet),
        None => ReadOptions::default(),
    };

    match cli.command {
        Command::Compvars { base, comp, output } => {
            let factory = ParserFactory::new();
            let (base_table, _) = factory.read(&base, &read_options)?;
            let (comp_table, _) = factory.read(&comp, &read_options)?;

            let sets = SchemaDiff::compare_columns(&base_table, &comp_table);
            let mut writer = open_writer(output.as_deref())?;
            formatter.render_columns(&sets, writer.as_mut())?;
            writer.flush()?;
        }
        Command::Complibs {
            base_dir,
            comp_dir,
            sortvars,
            output,
        } => {
            let report = LibraryComparator::new(CompareOptions::new())
                .with_sort_columns(sortvars)
                .with_read_options(read_options)
                .compare(&base_dir, &comp_dir)?;

            let mut writer = open_writer(output.as_deref())?;
            formatter.render_library(&report, writer.as_mut())?;
            writer.flush()?;
        }
        Command::Compare {
            base,
            comp,
            by,
            abs_tol,
            rel_tol,
            output,
        } => {
            let factory = ParserFactory::new();
            let (base_table, _) = factory.read(&base, &read_options)?;
            let (comp_table, _) = factory.read(&comp, &read_options)?;

            let options = CompareOptions::new()
                .with_by(by)
                .with_tolerance(Tolerance { abs_tol, rel_tol });
            let report = compare_tables(&base_table, &comp_table, &options);
            if report.has_changes() {
                log::info!(
                    "{} difference(s) between {} and {}",
                    report.difference_count,
                    base.display(),
                    comp.display()
                );
            } else {
                log::info!("{} and {} match", base.display(), comp.display());
            }

            let mut writer = open_writer(output.as_deref())?;
            formatter.render_comparison(&report, writer.as_mut())?;
            writer.flush()?;
        }
    }

    Ok(())
}

/// Stdout with colors when it is a terminal, or an uncolored file
fn open_writer(output: Option<&Path>) -> Result<Box<dyn WriteColor>> {
    match output {
        Some(path) => {
            let file = File::create(path)
                .with_context(|| format!("Failed to create output file: {}", path.display()))?;
            Ok(Box::new(NoColor::new(file)))
        }
        None => {
            let choice = if std::io::stdout().is_terminal() {
                ColorChoice::Auto
            } else {
                ColorChoice::Never
            };
            Ok(Box::new(StandardStream::stdout(choice)))
        }
    }
}
