//! enverify - configuration template verification
//!
//! Resolves a JSON configuration template against an environment and reports
//! what is missing before an application ever starts:
//! - `resolve`: print the resolved (redacted) configuration
//! - `check`: print only missing values, for CI gating
//! - `keys`: list the environment variables a template references

use clap::{Args, Parser, Subcommand};
use ev_common::{format_error_human, Error, OutputFormat, Result, StructuredError};
use ev_config::{load_template, strict_verify, verify, Resolution, Template, TransformRegistry};
use ev_core::exit_codes::ExitCode;
use ev_core::logging::{init_logging, LogConfig, LogFormat, LogLevel};
use ev_core::output::{render_check, render_keys, render_resolution};
use ev_core::sources::{build_env, EnvOptions};
use std::io::IsTerminal;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Verify configuration templates against the environment
#[derive(Parser)]
#[command(name = "enverify")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    #[command(flatten)]
    global: GlobalOpts,
}

/// Global options available to all commands
#[derive(Args, Debug)]
struct GlobalOpts {
    /// Output format
    #[arg(long, short = 'f', global = true, default_value = "json")]
    format: OutputFormat,

    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Decrease verbosity (errors only)
    #[arg(short, long, global = true)]
    quiet: bool,

    /// Disable colored output
    #[arg(long, global = true)]
    no_color: bool,

    /// Log format on stderr (human, jsonl)
    #[arg(long, global = true, env = "EV_LOG_FORMAT")]
    log_format: Option<LogFormat>,
}

#[derive(Subcommand)]
enum Commands {
    /// Resolve a template and print the redacted configuration
    Resolve(ResolveArgs),

    /// Report missing environment values without printing the configuration
    Check(CheckArgs),

    /// List the environment variables a template references
    Keys(KeysArgs),
}

/// Environment selection shared by `resolve` and `check`.
#[derive(Args, Debug)]
struct EnvArgs {
    /// Load variables from a dotenv file (repeatable, later files win)
    #[arg(long = "env-file", value_name = "FILE")]
    env_files: Vec<PathBuf>,

    /// Set a variable, overriding every other source (repeatable)
    #[arg(long = "set", value_name = "KEY=VALUE")]
    assignments: Vec<String>,

    /// Ignore the process environment
    #[arg(long)]
    no_process_env: bool,
}

impl EnvArgs {
    fn options(&self) -> EnvOptions {
        EnvOptions {
            include_process_env: !self.no_process_env,
            env_files: self.env_files.clone(),
            assignments: self.assignments.clone(),
        }
    }
}

#[derive(Args, Debug)]
struct ResolveArgs {
    /// Path to a JSON template
    template: PathBuf,

    #[command(flatten)]
    env: EnvArgs,

    /// Fail with an error instead of reporting missing values
    #[arg(long)]
    strict: bool,
}

#[derive(Args, Debug)]
struct CheckArgs {
    /// Path to a JSON template
    template: PathBuf,

    #[command(flatten)]
    env: EnvArgs,
}

#[derive(Args, Debug)]
struct KeysArgs {
    /// Path to a JSON template
    template: PathBuf,
}

fn main() {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(err) => {
            let _ = err.print();
            let code = if err.use_stderr() {
                ExitCode::ArgsError
            } else {
                // --help and --version
                ExitCode::Clean
            };
            std::process::exit(code.as_i32());
        }
    };

    let log_config = LogConfig::from_env(
        LogLevel::from_verbosity(cli.global.verbose, cli.global.quiet),
        cli.global.log_format,
    )
    .with_ansi(use_color(&cli.global));
    init_logging(&log_config);

    let result = match &cli.command {
        Commands::Resolve(args) => run_resolve(&cli.global, args),
        Commands::Check(args) => run_check(&cli.global, args),
        Commands::Keys(args) => run_keys(&cli.global, args),
    };

    let exit_code = match result {
        Ok(code) => code,
        Err(err) => output_error(&cli.global, &err),
    };
    debug!(exit_code = %exit_code, "done");
    std::process::exit(exit_code.as_i32());
}

fn run_resolve(global: &GlobalOpts, args: &ResolveArgs) -> Result<ExitCode> {
    let template = read_template(&args.template)?;
    let env = build_env(&args.env.options())?;

    let resolution = if args.strict {
        let config = strict_verify(&template, &env)?;
        Resolution {
            config: config.into_inner(),
            missing_values: Vec::new(),
        }
    } else {
        verify(&template, &env)?
    };

    info!(
        template = %args.template.display(),
        missing = resolution.missing_values.len(),
        "resolved template"
    );
    print_output(render_resolution(global.format, &args.template, &resolution)?);
    Ok(ExitCode::for_completeness(resolution.is_complete()))
}

fn run_check(global: &GlobalOpts, args: &CheckArgs) -> Result<ExitCode> {
    let template = read_template(&args.template)?;
    let env = build_env(&args.env.options())?;
    let resolution = verify(&template, &env)?;

    print_output(render_check(global.format, &args.template, &resolution.missing_values)?);
    Ok(ExitCode::for_completeness(resolution.is_complete()))
}

fn run_keys(global: &GlobalOpts, args: &KeysArgs) -> Result<ExitCode> {
    let template = read_template(&args.template)?;
    print_output(render_keys(global.format, &args.template, &template.env_keys())?);
    Ok(ExitCode::Clean)
}

fn read_template(path: &Path) -> Result<Template> {
    load_template(path, &TransformRegistry::builtin())
}

fn print_output(rendered: Option<String>) {
    if let Some(text) = rendered {
        println!("{text}");
    }
}

fn use_color(global: &GlobalOpts) -> bool {
    !global.no_color && std::env::var_os("NO_COLOR").is_none() && std::io::stderr().is_terminal()
}

fn output_error(global: &GlobalOpts, error: &Error) -> ExitCode {
    let exit_code = ExitCode::from(error);

    match global.format {
        OutputFormat::Json => {
            eprintln!("{}", StructuredError::from(error).to_json_pretty());
        }
        OutputFormat::Summary => {
            eprintln!("[error {}] {}", error.code(), error);
        }
        OutputFormat::Exitcode => {}
        OutputFormat::Md => {
            eprintln!("{}", format_error_human(error, use_color(global)));
        }
    }

    exit_code
}
