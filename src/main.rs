//! CCA report CLI
//!
//! Entry point for the `cca` command-line tool.

use cca_gate::config::REPO_CONFIG_PATH;
use cca_gate::logging::{self, LogFormat};
use cca_gate::report::ReportArtifact;
use cca_gate::runner::{RunnerConfig, TestRunner};
use cca_gate::{render_markdown, EffectiveConfig, ExitCode, Pipeline, PipelineError, ReportRequest};
use clap::{Parser, Subcommand, ValueEnum};
use serde_json::{json, Map, Value};
use std::fs;
use std::path::{Path, PathBuf};
use std::process;

#[derive(Parser)]
#[command(name = "cca")]
#[command(about = "Run a module's tests with coverage and gate on the result", version)]
struct Cli {
    /// Debug-level logging (overridden by CCA_LOG)
    #[arg(long, short = 'v', global = true)]
    verbose: bool,

    /// Log line format
    #[arg(long, value_enum, default_value_t = LogFormat::Text, global = true)]
    log_format: LogFormat,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run tests with coverage, write the report and apply the gate
    Report {
        /// Repository root; the test tool runs here
        #[arg(long, default_value = ".")]
        repo: PathBuf,

        /// Module to report per-file coverage for
        #[arg(long)]
        module: Option<String>,

        /// JSON report path (default: reports/test_report.json)
        #[arg(long)]
        report_out: Option<PathBuf>,

        /// Also write a Markdown summary here
        #[arg(long)]
        report_md: Option<PathBuf>,

        /// Minimum overall coverage, e.g. "95%"
        #[arg(long)]
        fail_on_coverage: Option<String>,

        /// Fail when any test failed or errored
        #[arg(long)]
        fail_on_tests: bool,

        /// Path to repo config file (default: <repo>/.cca/report.toml)
        #[arg(long, short = 'c')]
        config: Option<PathBuf>,
    },

    /// Print the effective configuration with provenance
    Config {
        #[arg(long, default_value = ".")]
        repo: PathBuf,

        /// Path to repo config file (default: <repo>/.cca/report.toml)
        #[arg(long, short = 'c')]
        config: Option<PathBuf>,
    },

    /// Re-render a persisted report
    Render {
        /// Path to a test_report.json
        report: PathBuf,

        #[arg(long, value_enum, default_value_t = RenderFormat::Markdown)]
        format: RenderFormat,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum RenderFormat {
    Markdown,
    Json,
}

fn main() {
    let cli = Cli::parse();
    logging::init_tracing(cli.verbose, cli.log_format);

    let code = match cli.command {
        Commands::Report {
            repo,
            module,
            report_out,
            report_md,
            fail_on_coverage,
            fail_on_tests,
            config,
        } => {
            let overrides = cli_overrides(report_out, report_md, fail_on_coverage, fail_on_tests);
            run_report(&repo, module, config, overrides)
        }
        Commands::Config { repo, config } => run_config(&repo, config),
        Commands::Render { report, format } => run_render(&report, format),
    };

    process::exit(code.as_i32());
}

fn run_report(repo: &Path, module: Option<String>, config_path: Option<PathBuf>, overrides: Value) -> ExitCode {
    let effective = match load_config(repo, config_path, Some(overrides)) {
        Ok(c) => c,
        Err(e) => return fail(&e),
    };
    let settings = match effective.settings() {
        Ok(s) => s,
        Err(e) => return fail(&PipelineError::from(e)),
    };

    let runner = TestRunner::new(RunnerConfig::from(&settings.runner));
    let request = ReportRequest::from_settings(repo, module, &settings);

    match Pipeline::new(&runner).run(&request) {
        Ok(output) => {
            if output.outcome.ok {
                println!("{}", output.outcome.details);
            } else {
                eprintln!("{}", output.outcome.details);
            }
            output.exit_code()
        }
        Err(e) => fail(&e),
    }
}

fn run_config(repo: &Path, config_path: Option<PathBuf>) -> ExitCode {
    let effective = match load_config(repo, config_path, None) {
        Ok(c) => c,
        Err(e) => return fail(&e),
    };

    match effective.to_json() {
        Ok(json) => {
            println!("{}", json);
            ExitCode::Success
        }
        Err(e) => {
            eprintln!("error: failed to serialize config: {}", e);
            ExitCode::Validation
        }
    }
}

fn run_render(path: &Path, format: RenderFormat) -> ExitCode {
    let artifact = match fs::read_to_string(path)
        .map_err(|e| e.to_string())
        .and_then(|s| ReportArtifact::from_json(&s).map_err(|e| e.to_string()))
    {
        Ok(a) => a,
        Err(e) => {
            eprintln!("error: cannot read {}: {}", path.display(), e);
            return ExitCode::Validation;
        }
    };

    match format {
        RenderFormat::Markdown => print!("{}", render_markdown(&artifact)),
        RenderFormat::Json => match artifact.to_json() {
            Ok(json) => print!("{}", json),
            Err(e) => {
                eprintln!("error: failed to serialize report: {}", e);
                return ExitCode::ReportWrite;
            }
        },
    }
    ExitCode::Success
}

fn load_config(repo: &Path, config_path: Option<PathBuf>, overrides: Option<Value>) -> Result<EffectiveConfig, PipelineError> {
    let path = config_path.unwrap_or_else(|| repo.join(REPO_CONFIG_PATH));
    Ok(EffectiveConfig::build(Some(&path), overrides)?)
}

/// Only flags the user actually passed become a config layer.
fn cli_overrides(
    report_out: Option<PathBuf>,
    report_md: Option<PathBuf>,
    fail_on_coverage: Option<String>,
    fail_on_tests: bool,
) -> Value {
    let mut report = Map::new();
    if let Some(out) = report_out {
        report.insert("out".to_string(), json!(out.to_string_lossy()));
    }
    if let Some(md) = report_md {
        report.insert("md".to_string(), json!(md.to_string_lossy()));
    }

    let mut gate = Map::new();
    if let Some(target) = fail_on_coverage {
        gate.insert("fail_on_coverage".to_string(), json!(target));
    }
    if fail_on_tests {
        gate.insert("fail_on_tests".to_string(), json!(true));
    }

    json!({ "report": report, "gate": gate })
}

fn fail(error: &PipelineError) -> ExitCode {
    eprintln!("error: {}", error);
    error.exit_code()
}
