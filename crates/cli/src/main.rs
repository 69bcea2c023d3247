use std::path::PathBuf;

use anyhow::Result;
use clap::{ArgAction, Parser, Subcommand};
use riskycomb::commands::{classify_command, list_functions_command, scan_command, ScanOptions};
use riskycomb::{init_logging, ConfigOverrides};

/// Finds risky argument combinations in logged numpy, pandas and matplotlib calls.
///
/// This CLI is a thin wrapper around `riskycomb-core` (exposed in code as
/// `riskycomb_core`); all decision logic lives in the library.
#[derive(Parser, Debug)]
#[command(
    name = "riskycomb",
    version,
    about = "Risky argument combination finder",
    long_about = None
)]
struct Cli {
    /// Log more (`-v` enables debug output).
    #[arg(short, long, global = true, action = ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Command,
}

#[derive(clap::Args, Debug, Clone)]
struct EvalArgs {
    /// Analyzer config file (JSON, or YAML with a .yaml/.yml extension).
    #[arg(long)]
    config: Option<PathBuf>,

    /// Python interpreter used to evaluate calls.
    #[arg(long)]
    python: Option<PathBuf>,

    /// Per-call time budget in seconds.
    #[arg(long)]
    timeout: Option<u64>,

    /// Directory evaluations run in, for calls that read relative paths.
    #[arg(long)]
    working_dir: Option<PathBuf>,
}

impl EvalArgs {
    fn overrides(&self, no_timestamp: bool) -> ConfigOverrides {
        ConfigOverrides {
            config: self.config.clone(),
            python: self.python.clone(),
            timeout_secs: self.timeout,
            working_dir: self.working_dir.clone(),
            no_timestamp,
        }
    }
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Evaluate every call in a log file and report risky combinations.
    ///
    /// The target function is read from the file name
    /// (`<module>.<function>-<anything>`) unless given explicitly.
    Scan {
        /// Input log, one call per line.
        input: PathBuf,

        /// Directory the output logs are written to.
        #[arg(long, default_value = ".")]
        output_dir: PathBuf,

        /// Module of the target function (e.g. `numpy`).
        #[arg(long)]
        module: Option<String>,

        /// Name of the target function (e.g. `zeros`).
        #[arg(long)]
        function: Option<String>,

        /// Do not suffix output file names with a run timestamp.
        #[arg(long, default_value_t = false)]
        no_timestamp: bool,

        #[command(flatten)]
        eval: EvalArgs,

        /// Print the run summary as JSON.
        #[arg(long, default_value_t = false)]
        json: bool,
    },

    /// Classify one call without evaluating it first.
    Classify {
        /// Module the call targets (e.g. `pandas`).
        #[arg(long)]
        module: String,

        /// The call, e.g. `read_csv("data.csv", sep=";", delimiter=";")`.
        call: String,

        /// Never start Python; rules that need the library are skipped.
        #[arg(long, default_value_t = false)]
        offline: bool,

        #[command(flatten)]
        eval: EvalArgs,

        #[arg(long, default_value_t = false)]
        json: bool,
    },

    /// List the functions that have a rule set.
    Functions {
        #[arg(long, default_value_t = false)]
        json: bool,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match cli.command {
        Command::Scan { input, output_dir, module, function, no_timestamp, eval, json } => {
            scan_command(&ScanOptions {
                input,
                output_dir,
                module,
                function,
                overrides: eval.overrides(no_timestamp),
                json,
            })?
        }
        Command::Classify { module, call, offline, eval, json } => {
            classify_command(&module, &call, offline, &eval.overrides(false), json)?
        }
        Command::Functions { json } => list_functions_command(json)?,
    }

    Ok(())
}
