//! tinsh CLI entry point.
//!
//! Usage:
//!   tinsh -c <command>         # Execute command and exit
//!   tinsh script.sh            # Run a script
//!   tinsh < script.sh          # Run a script from stdin
//!
//! Exits with the final return code (0 or 1), or 1 when evaluation aborts.

use std::env;
use std::io::Read;
use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{bail, Context, Result};
use tinsh_kernel::interpreter::ReturnCode;
use tinsh_kernel::{Kernel, KernelConfig};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

fn main() -> ExitCode {
    // Initialize tracing (respects RUST_LOG env var)
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(EnvFilter::from_default_env())
        .init();

    match run() {
        Ok(code) => code,
        Err(e) => {
            eprintln!("Error: {e:?}");
            ExitCode::FAILURE
        }
    }
}

/// Where the script comes from.
#[derive(Debug, PartialEq)]
enum Input {
    Command(String),
    Script(PathBuf),
    Stdin,
}

#[derive(Debug, PartialEq)]
struct Options {
    input: Input,
    config: Option<PathBuf>,
    json: bool,
}

fn run() -> Result<ExitCode> {
    let args: Vec<String> = env::args().skip(1).collect();
    let Some(options) = parse_args(&args)? else {
        print_help();
        return Ok(ExitCode::SUCCESS);
    };

    let config = match &options.config {
        Some(path) => KernelConfig::load_from(path)?,
        None => KernelConfig::named("tinsh"),
    };
    tracing::debug!(name = %config.name, "starting kernel");

    let source = read_source(&options.input)?;
    let kernel = Kernel::new(config);

    let rt = tokio::runtime::Runtime::new().context("Failed to start runtime")?;
    let result = rt.block_on(kernel.execute_bash(&source));
    let code = rt.block_on(kernel.return_code());

    match result {
        Ok(out) => {
            print!("{out}");
            Ok(match code {
                ReturnCode::Success => ExitCode::SUCCESS,
                ReturnCode::Failure => ExitCode::FAILURE,
            })
        }
        Err(report) => {
            if options.json {
                eprintln!("{}", report.to_json());
            } else {
                eprint!("{}", report.error);
            }
            Ok(ExitCode::FAILURE)
        }
    }
}

/// Returns `None` when help was requested.
fn parse_args(args: &[String]) -> Result<Option<Options>> {
    let mut input = None;
    let mut config = None;
    let mut json = false;

    let mut iter = args.iter();
    while let Some(arg) = iter.next() {
        match arg.as_str() {
            "-h" | "--help" => return Ok(None),
            "-c" => {
                let cmd = iter.next().context("-c requires a command argument")?;
                input = Some(Input::Command(cmd.clone()));
            }
            "--config" => {
                let path = iter.next().context("--config requires a path")?;
                config = Some(PathBuf::from(path));
            }
            "--json" => json = true,
            arg if arg.starts_with("--config=") => {
                config = Some(PathBuf::from(&arg["--config=".len()..]));
            }
            path if !path.starts_with('-') && input.is_none() => {
                input = Some(Input::Script(PathBuf::from(path)));
            }
            unknown => bail!("Unknown option: {unknown} (run 'tinsh --help' for usage)"),
        }
    }

    Ok(Some(Options {
        input: input.unwrap_or(Input::Stdin),
        config,
        json,
    }))
}

fn read_source(input: &Input) -> Result<String> {
    let source = match input {
        Input::Command(cmd) => return Ok(cmd.clone()),
        Input::Script(path) => std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read script: {}", path.display()))?,
        Input::Stdin => {
            let mut buf = String::new();
            std::io::stdin()
                .read_to_string(&mut buf)
                .context("Failed to read script from stdin")?;
            buf
        }
    };

    // Skip shebang if present
    Ok(match source.strip_prefix("#!") {
        Some(rest) => rest.split_once('\n').map(|(_, body)| body).unwrap_or("").to_string(),
        None => source,
    })
}

fn print_help() {
    println!(
        r#"tinsh v{}

Usage:
  tinsh -c <command>           Execute command and exit
  tinsh <script>               Run a script file
  tinsh                        Run a script read from stdin

Options:
  -c <command>                 Execute command string and exit
  --config <path>              Load kernel config (TOML: name, env, aliases, builtins)
  --json                       Print error reports as JSON
  -h, --help                   Show this help

Logging goes to stderr and is controlled by RUST_LOG.
"#,
        env!("CARGO_PKG_VERSION")
    );
}
