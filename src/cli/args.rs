use crate::constants::{exit_codes, verbosity};
use clap::{error::ErrorKind, CommandFactory, Parser};
use log::LevelFilter;
use std::path::PathBuf;

const HELP_TEMPLATE: &str = r#"{about-section}
{usage-heading} {usage}

{all-args}
{after-help}
"#;

/// CLI arguments for servgen.
#[derive(Parser, Debug, Clone)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Configuration source to compile.
    #[arg(value_name = "CONFIG")]
    pub config: PathBuf,

    /// Dialect template that renders the configuration.
    #[arg(short, long, value_name = "TEMPLATE")]
    pub template: PathBuf,

    /// Conditions to enable (comma-separated or repeated).
    #[arg(short = 'D', long = "define", value_name = "NAME", value_delimiter = ',')]
    pub conditions: Vec<String>,

    /// Placeholder value for `@@KEY@@`; integers are substituted as numbers.
    #[arg(short = 's', long = "set", value_name = "KEY=VALUE")]
    pub placeholders: Vec<String>,

    /// JSON or YAML file with placeholder values. `--set` entries win.
    #[arg(short = 'p', long = "placeholders", value_name = "FILE")]
    pub placeholders_file: Option<PathBuf>,

    /// Output file; stdout when absent or `-`.
    #[arg(short, long, value_name = "OUTPUT")]
    pub output: Option<PathBuf>,

    /// Increase logging verbosity (`-v`, `-vv`, `-vvv`).
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,
}

/// Parse command line arguments with custom handling for missing required inputs.
pub fn get_args() -> Args {
    Args::try_parse().unwrap_or_else(|e| {
        if e.kind() == ErrorKind::MissingRequiredArgument {
            let mut command = Args::command().help_template(HELP_TEMPLATE);
            if let Err(print_err) = command.print_help() {
                eprintln!("Failed to display help information: {print_err}");
            } else {
                println!();
            }
            std::process::exit(exit_codes::FAILURE);
        } else {
            e.exit();
        }
    })
}

/// Map `-v` counts to the appropriate log level.
pub fn get_log_level_from_verbose(verbose_count: u8) -> LevelFilter {
    match verbose_count {
        verbosity::OFF => LevelFilter::Error,
        verbosity::INFO => LevelFilter::Info,
        verbosity::DEBUG => LevelFilter::Debug,
        verbosity::TRACE.. => LevelFilter::Trace,
    }
}
