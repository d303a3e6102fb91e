// FILE: src/cli/mod.rs

mod config;
mod handlers;

use crate::analysis::AnalyzerOptions;
use crate::error::{Result, ScanError};
use clap::{Arg, ArgAction, ArgMatches, Command, ValueEnum};
use serde::{Deserialize, Serialize};
use std::time::Instant;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    Text,
    Json,
}

pub struct EnhancedCli {
    config: config::ConfigFile,
    options: AnalyzerOptions,
    start_time: Instant,
}

impl EnhancedCli {
    pub fn new() -> Self {
        Self {
            config: config::ConfigFile::default(),
            options: AnalyzerOptions::default(),
            start_time: Instant::now(),
        }
    }

    pub fn run(&mut self) -> Result<()> {
        self.start_time = Instant::now();
        let matches = self.build_cli().get_matches();

        self.setup_logging(matches.get_count("verbose"))?;

        if let Some(config_path) = matches.get_one::<String>("config") {
            self.config = config::load(config_path)?;
        }
        self.options = self.config.analyzer_options();

        let result = match matches.subcommand() {
            Some(("vars", sub_matches)) => handlers::handle_vars_command(self, sub_matches),
            Some(("report", sub_matches)) => handlers::handle_report_command(self, sub_matches),
            Some(("check", sub_matches)) => handlers::handle_check_command(self, sub_matches),
            _ => {
                println!("No subcommand specified. Use --help for usage information.");
                Ok(())
            }
        };

        log::debug!("Finished in {:.2}ms", self.start_time.elapsed().as_secs_f64() * 1000.0);
        result
    }

    pub fn options(&self) -> &AnalyzerOptions {
        &self.options
    }

    /// `--format` on the command line wins over the config file
    pub fn output_format(&self, matches: &ArgMatches) -> OutputFormat {
        matches
            .get_one::<OutputFormat>("format")
            .copied()
            .or(self.config.format)
            .unwrap_or(OutputFormat::Text)
    }

    fn build_cli(&self) -> Command {
        Command::new(crate::NAME)
            .version(crate::VERSION)
            .about(crate::DESCRIPTION)
            .arg(
                Arg::new("config")
                    .short('c')
                    .long("config")
                    .value_name("FILE")
                    .help("Configuration file path (.json or .toml)")
                    .global(true)
                    .action(ArgAction::Set),
            )
            .arg(
                Arg::new("verbose")
                    .short('v')
                    .long("verbose")
                    .help("Increase verbosity (can be used multiple times)")
                    .global(true)
                    .action(ArgAction::Count),
            )
            .subcommand(
                Command::new("vars")
                    .about("Print the free variables of one expression")
                    .arg(Arg::new("expression").help("Expression, with or without { } delimiters").required(true).index(1))
                    .arg(Arg::new("format").short('f').long("format").value_parser(clap::value_parser!(OutputFormat)).help("Output format")),
            )
            .subcommand(
                Command::new("report")
                    .about("Report required, provided and missing variables of a template")
                    .arg(Arg::new("template").help("Template JSON file").required(true).index(1))
                    .arg(Arg::new("format").short('f').long("format").value_parser(clap::value_parser!(OutputFormat)).help("Output format"))
                    .arg(Arg::new("output").short('o').long("output").value_name("FILE").help("Write the report to a file"))
                    .arg(Arg::new("watch").short('w').long("watch").help("Watch the template and report again on change").action(ArgAction::SetTrue)),
            )
            .subcommand(
                Command::new("check")
                    .about("Find expressions that fail to parse and fields that cannot be referenced")
                    .arg(Arg::new("input").help("Template file or directory").required(true).index(1))
                    .arg(Arg::new("recursive").short('r').long("recursive").help("Check all .json templates in directory recursively").action(ArgAction::SetTrue)),
            )
    }

    fn setup_logging(&self, verbose_count: u8) -> Result<()> {
        let log_level = match verbose_count {
            0 => log::LevelFilter::Warn,
            1 => log::LevelFilter::Info,
            2 => log::LevelFilter::Debug,
            _ => log::LevelFilter::Trace,
        };
        env_logger::Builder::new()
            .filter_level(log_level)
            .parse_default_env()
            .format_timestamp_secs()
            .try_init()
            .map_err(|e| ScanError::config(format!("Failed to initialise logging: {}", e)))
    }
}

impl Default for EnhancedCli {
    fn default() -> Self {
        Self::new()
    }
}

/// Value of an argument clap has already marked as required
fn required_arg<'a>(matches: &'a ArgMatches, name: &str) -> Result<&'a String> {
    matches
        .get_one::<String>(name)
        .ok_or_else(|| ScanError::config(format!("Missing required argument '{}'", name)))
}
