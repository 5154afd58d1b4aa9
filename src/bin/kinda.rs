//! `kinda`: thin CLI front end over `kinda_lang_core`.
//!
//! This binary is the external-collaborator contract made concrete for a
//! single-crate deliverable: `run`, `transform`, `examples`, `syntax`, the
//! documented exit codes, and the `KINDA_*` environment variables. It does
//! not attempt to reimplement the wider `kinda` CLI ecosystem (shell
//! scripts, agent/workflow tooling, MCP profile manager, packaging), which
//! remains genuinely out of scope.

use clap::{Parser, Subcommand};
use kinda_lang_core::config::KindaConfig;
use kinda_lang_core::personality::Mood;
use kinda_lang_core::registry::Registry;
use kinda_lang_core::{transform, Severity};
use std::io::Write;
use std::path::PathBuf;
use std::process::ExitCode;

#[derive(Parser)]
#[command(name = "kinda")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Fuzzy, probabilistic constructs layered on a host language")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Transform a `.knda` file and execute the result.
    Run {
        file: PathBuf,
        #[arg(long, value_name = "MOOD")]
        mood: Option<String>,
        #[arg(long = "chaos-level", value_name = "N")]
        chaos_level: Option<u8>,
        #[arg(long, value_name = "S")]
        seed: Option<u64>,
    },
    /// Transform a `.knda` file, writing host-language source.
    Transform {
        file: PathBuf,
        #[arg(short, long, value_name = "OUT")]
        output: Option<PathBuf>,
    },
    /// Print the bundled construct-grammar cheat sheet.
    Examples,
    /// Print the bundled construct syntax reference.
    Syntax,
}

/// Invocation-error exit code: bad arguments, unreadable file.
const EXIT_INVOCATION_ERROR: u8 = 2;
/// Transform-error exit code: `E_*` diagnostics were recorded.
const EXIT_TRANSFORM_ERROR: u8 = 1;
const EXIT_SUCCESS: u8 = 0;

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .init();

    let cli = Cli::parse();
    let code = match cli.command {
        Commands::Run { file, mood, chaos_level, seed } => run_cmd(&file, mood, chaos_level, seed),
        Commands::Transform { file, output } => transform_cmd(&file, output.as_deref()),
        Commands::Examples => {
            print!("{}", examples_text());
            EXIT_SUCCESS
        }
        Commands::Syntax => {
            print!("{}", syntax_text());
            EXIT_SUCCESS
        }
    };
    ExitCode::from(code)
}

fn parse_mood(raw: &str) -> Result<Mood, u8> {
    raw.parse::<Mood>().map_err(|_| {
        eprintln!("kinda: invalid --mood `{raw}`");
        EXIT_INVOCATION_ERROR
    })
}

fn resolve_config(mood: Option<String>, chaos_level: Option<u8>, seed: Option<u64>) -> Result<KindaConfig, u8> {
    let mood = match mood {
        Some(raw) => Some(parse_mood(&raw)?),
        None => None,
    };
    KindaConfig::resolve(mood, chaos_level, seed).map_err(|err| {
        eprintln!("kinda: {err}");
        EXIT_INVOCATION_ERROR
    })
}

fn read_source(file: &std::path::Path) -> Result<String, u8> {
    std::fs::read_to_string(file).map_err(|err| {
        eprintln!("kinda: failed to read {}: {err}", file.display());
        EXIT_INVOCATION_ERROR
    })
}

fn report_diagnostics(diagnostics: &[kinda_lang_core::Diagnostic]) {
    for d in diagnostics {
        let label = match d.severity {
            Severity::Error => "error",
            Severity::Warning => "warning",
        };
        eprintln!("{label}[{}]: {}:{}: {}", d.code, d.line, d.column, d.message);
    }
}

fn transform_cmd(file: &std::path::Path, output: Option<&std::path::Path>) -> u8 {
    let source = match read_source(file) {
        Ok(s) => s,
        Err(code) => return code,
    };
    let result = transform(&source);
    report_diagnostics(&result.diagnostics);

    match output {
        Some(path) => {
            if let Err(err) = std::fs::write(path, &result.code) {
                eprintln!("kinda: failed to write {}: {err}", path.display());
                return EXIT_INVOCATION_ERROR;
            }
        }
        None => {
            let stdout = std::io::stdout();
            let mut handle = stdout.lock();
            let _ = writeln!(handle, "{}", result.code);
        }
    }

    if result.exit_status == 0 { EXIT_SUCCESS } else { EXIT_TRANSFORM_ERROR }
}

fn run_cmd(file: &std::path::Path, mood: Option<String>, chaos_level: Option<u8>, seed: Option<u64>) -> u8 {
    let config = match resolve_config(mood, chaos_level, seed) {
        Ok(c) => c,
        Err(code) => return code,
    };
    if let Err(err) = kinda_lang_core::Personality::configure(config.mood, config.chaos_level, config.seed) {
        eprintln!("kinda: {err}");
        return EXIT_INVOCATION_ERROR;
    }
    tracing::debug!(mood = %config.mood, chaos_level = config.chaos_level, seed = ?config.seed, "running with personality");

    let source = match read_source(file) {
        Ok(s) => s,
        Err(code) => return code,
    };
    let result = transform(&source);
    report_diagnostics(&result.diagnostics);
    if result.exit_status != 0 {
        return EXIT_TRANSFORM_ERROR;
    }

    // This crate's host-language target is Python source; it does not
    // embed a Python interpreter. `run` stays inside the "transform and
    // execute" contract by shelling out to `python3` when available,
    // rather than pretending to own a host-language runtime.
    match which_python3() {
        Some(python) => {
            let status = std::process::Command::new(python)
                .arg("-c")
                .arg(&result.code)
                .env("KINDA_MOOD", config.mood.name())
                .env("KINDA_CHAOS_LEVEL", config.chaos_level.to_string())
                .status();
            match status {
                Ok(status) if status.success() => EXIT_SUCCESS,
                Ok(_) => EXIT_TRANSFORM_ERROR,
                Err(err) => {
                    eprintln!("kinda: failed to launch python3: {err}");
                    EXIT_INVOCATION_ERROR
                }
            }
        }
        None => {
            eprintln!("kinda: no python3 interpreter found on PATH; printing transformed source instead");
            println!("{}", result.code);
            EXIT_SUCCESS
        }
    }
}

fn which_python3() -> Option<&'static str> {
    for candidate in ["python3", "python"] {
        if std::process::Command::new(candidate)
            .arg("--version")
            .output()
            .map(|out| out.status.success())
            .unwrap_or(false)
        {
            return Some(candidate);
        }
    }
    None
}

/// Generates the `examples` text from the live Construct Registry, so it
/// can never drift from what the transformer actually recognizes.
fn examples_text() -> String {
    let mut out = String::from("kinda-lang construct examples\n==============================\n\n");
    for name in Registry::global().all_names() {
        out.push_str(&format!("  ~{name}\n"));
    }
    out.push_str("\nRun `kinda syntax` for the full pattern reference.\n");
    out
}

fn syntax_text() -> String {
    let mut out = String::from("kinda-lang construct syntax\n===========================\n\n");
    for descriptor in Registry::global().iter_in_priority_order() {
        out.push_str(&format!(
            "  {:<18} kind={:?} pattern=/{}/\n",
            descriptor.name,
            descriptor.kind,
            descriptor.pattern.as_str()
        ));
    }
    out.push_str("\nInline rewrites: ~kinda int/float/bool, A ~ish B, EXPR ~welp FALLBACK\n");
    out
}
