// FILE: src/cli/handlers.rs
use crate::{
    analysis::{analyze_expression, AnalyzerOptions},
    cli::{required_arg, EnhancedCli, OutputFormat},
    template::{
        analyze_template, FieldLinter, JsonReportWriter, ReportSink, Template, TextReportWriter,
        VariableReport,
    },
    Result, ScanError,
};

use notify::{Event, RecommendedWatcher, RecursiveMode, Watcher};
use std::fs::File;
use std::io::{self, Write};
use std::path::Path;
use std::sync::mpsc::channel;
use std::time::Instant;

// --- VARS ---
pub fn handle_vars_command(cli: &EnhancedCli, matches: &clap::ArgMatches) -> Result<()> {
    let expression = required_arg(matches, "expression")?;
    let variables: Vec<String> = analyze_expression(expression, cli.options())?
        .into_iter()
        .collect();

    match cli.output_format(matches) {
        OutputFormat::Json => {
            let json = serde_json::to_string(&variables).map_err(|e| ScanError::InvalidFormat {
                message: format!("JSON serialization error: {}", e),
            })?;
            println!("{}", json);
        }
        OutputFormat::Text => {
            for name in &variables {
                println!("{}", name);
            }
        }
    }

    Ok(())
}

// --- REPORT ---
pub fn handle_report_command(cli: &EnhancedCli, matches: &clap::ArgMatches) -> Result<()> {
    let template_path = required_arg(matches, "template")?;
    let output_path = matches.get_one::<String>("output").map(String::as_str);
    let format = cli.output_format(matches);

    if matches.get_flag("watch") {
        watch_and_report(template_path, output_path, format, cli.options())
    } else {
        report_single_file(template_path, output_path, format, cli.options()).map(|_| ())
    }
}

fn report_single_file(
    template_path: &str,
    output_path: Option<&str>,
    format: OutputFormat,
    options: &AnalyzerOptions,
) -> Result<VariableReport> {
    let template = Template::load(template_path)?;
    let report = analyze_template(&template, options);

    match output_path {
        Some(path) => {
            write_report(File::create(path)?, format, &report)?;
            println!("✅ Report saved to {}", path);
        }
        None => write_report(io::stdout().lock(), format, &report)?,
    }

    Ok(report)
}

fn write_report<W: Write>(out: W, format: OutputFormat, report: &VariableReport) -> Result<()> {
    match format {
        OutputFormat::Text => TextReportWriter::new(out).write_report(report),
        OutputFormat::Json => JsonReportWriter::new(out).write_report(report),
    }
}

fn watch_and_report(
    template_path: &str,
    output_path: Option<&str>,
    format: OutputFormat,
    options: &AnalyzerOptions,
) -> Result<()> {
    println!("👀 Watching {} for changes...", template_path);

    let (tx, rx) = channel();
    let mut watcher = RecommendedWatcher::new(
        move |res: notify::Result<Event>| {
            if let Ok(event) = res {
                if let Err(e) = tx.send(event) {
                    eprintln!("Watch error: {}", e);
                }
            }
        },
        notify::Config::default(),
    )
    .map_err(|e| {
        ScanError::Io(io::Error::new(
            io::ErrorKind::Other,
            format!("Failed to create file watcher: {}", e),
        ))
    })?;

    watcher
        .watch(Path::new(template_path), RecursiveMode::NonRecursive)
        .map_err(|e| {
            ScanError::Io(io::Error::new(
                io::ErrorKind::Other,
                format!("Failed to watch file: {}", e),
            ))
        })?;

    if let Err(e) = report_single_file(template_path, output_path, format, options) {
        eprintln!("❌ Initial report failed: {}", e);
    }

    loop {
        match rx.recv() {
            Ok(event) => {
                if !(event.kind.is_modify() || event.kind.is_create()) {
                    continue;
                }
                println!("🔄 Template changed, scanning again...");
                let started = Instant::now();
                match report_single_file(template_path, output_path, format, options) {
                    Ok(report) => println!(
                        "✅ {} required, {} missing ({}ms)",
                        report.required.len(),
                        report.missing.len(),
                        started.elapsed().as_millis()
                    ),
                    Err(e) => eprintln!("❌ Report failed: {}", e),
                }
            }
            Err(e) => {
                eprintln!("Watch error: {}", e);
                break;
            }
        }
    }

    Ok(())
}

// --- CHECK ---
pub fn handle_check_command(cli: &EnhancedCli, matches: &clap::ArgMatches) -> Result<()> {
    let input_path = required_arg(matches, "input")?;
    let recursive = matches.get_flag("recursive");
    let linter = FieldLinter::new();

    if recursive && Path::new(input_path).is_dir() {
        check_directory_recursive(input_path, cli.options(), &linter)
    } else {
        check_single_file(input_path, cli.options(), &linter)
    }
}

fn check_single_file(input_path: &str, options: &AnalyzerOptions, linter: &FieldLinter) -> Result<()> {
    println!("🔍 Checking {}", input_path);

    let template = match Template::load(input_path) {
        Ok(template) => template,
        Err(e) => {
            println!("❌ {} - {}", input_path, e);
            return Err(e);
        }
    };

    let report = analyze_template(&template, options);
    for warning in linter.lint(&template.flatten(), options) {
        println!("⚠️  {} - {}", input_path, warning);
    }

    if report.diagnostics.is_empty() {
        println!(
            "✅ {} - {} expressions parsed",
            input_path, report.stats.expression_count
        );
        return Ok(());
    }

    for diagnostic in &report.diagnostics {
        println!(
            "❌ {} - {}: {}",
            input_path, diagnostic.schema_name, diagnostic.error
        );
    }

    Err(ScanError::template(
        input_path,
        format!(
            "{} of {} expressions failed to parse",
            report.stats.failed_expressions, report.stats.expression_count
        ),
    ))
}

fn check_directory_recursive(
    dir_path: &str,
    options: &AnalyzerOptions,
    linter: &FieldLinter,
) -> Result<()> {
    let mut total_files = 0;
    let mut error_files = 0;

    for entry in walkdir::WalkDir::new(dir_path) {
        let entry = entry.map_err(|e| {
            ScanError::Io(io::Error::new(
                io::ErrorKind::Other,
                format!("Directory traversal error: {}", e),
            ))
        })?;
        if entry.file_type().is_file() {
            if let Some(ext) = entry.path().extension() {
                if ext == "json" {
                    total_files += 1;
                    let path = entry.path().to_string_lossy();
                    if check_single_file(&path, options, linter).is_err() {
                        error_files += 1;
                    }
                }
            }
        }
    }

    println!("\n📊 Check Summary:");
    println!("   Total templates: {}", total_files);
    println!("   Templates with errors: {}", error_files);
    if total_files > 0 {
        println!(
            "   Success rate: {:.1}%",
            (total_files - error_files) as f64 / total_files as f64 * 100.0
        );
    }

    if error_files > 0 {
        Err(ScanError::template(
            dir_path,
            format!("{} templates have errors", error_files),
        ))
    } else {
        Ok(())
    }
}
