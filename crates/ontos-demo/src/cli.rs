#![forbid(unsafe_code)]

//! Command-line argument parsing for the walkthrough.
//!
//! Parses args by hand. Environment variables with the `ONTOS_DEMO_*`
//! prefix override the defaults; explicit flags override both.

use std::env;
use std::fmt;
use std::path::PathBuf;
use std::process;

use crate::app::AppConfig;
use crate::controller::PHASE_COUNT;

pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Where `--og-card` writes when no path is given.
pub const DEFAULT_OG_CARD: &str = "og-card.svg";

const HELP_TEXT: &str = "\
Ontos × SentimenTrader — Compiled Reasoning for 3,100 Indicators

USAGE:
    ontos-demo [OPTIONS]

OPTIONS:
    --phase=N            Start on phase N, 1-indexed (default: 1)
    --auto               Start with auto-advance on (15 s per phase)
    --no-mouse           Disable mouse capture (no clicks or swipes)
    --exit-after-ms=N    Quit after N milliseconds
    --og-card[=PATH]     Write the 1200x630 preview card as SVG and exit
                         (default path: og-card.svg)
    --help, -h           Show this help message
    --version, -V        Show version

PHASES:
    1  The Problem          One question, six systems, three weeks
    2  The .onto Engine     The compiled specification, collapsible
    3  Live Tick            Two market ticks through the engine
    4  Deterministic AI     RAG guesswork against a compiled agent

KEYBINDINGS:
    ← → / ↑ ↓       Previous / next phase
    1-4             Jump to a phase
    a               Toggle auto-advance
    Home            Restart from phase 1
    PgUp / PgDn     Scroll
    Enter / Space   Phase action (push a tick, ask the agent)
    f               Fold or unfold all sections (phase 2)
    r               Replay (phase 3) / retry a failed view
    c               Copy the last agent answer (phase 4)
    q / Ctrl+C      Quit

ENVIRONMENT VARIABLES:
    ONTOS_DEMO_PHASE           Override --phase
    ONTOS_DEMO_AUTO            Start with auto-advance on (1|true)
    ONTOS_DEMO_EXIT_AFTER_MS   Override --exit-after-ms
    ONTOS_DEMO_LOG             Write tracing output to this file
    ONTOS_DEMO_CLIPBOARD       'off' disables OSC 52 clipboard writes
    RUST_LOG                   Log filter (default: info)";

/// Parsed command-line options.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Opts {
    /// Starting phase (1-indexed).
    pub start_phase: usize,
    /// Auto-advance on at startup.
    pub auto: bool,
    /// Whether mouse events are enabled.
    pub mouse: bool,
    /// Auto-exit after this many milliseconds (0 = disabled).
    pub exit_after_ms: u64,
    /// Write the preview card here and exit instead of running.
    pub og_card: Option<PathBuf>,
    /// OSC 52 clipboard writes enabled.
    pub clipboard: bool,
    /// Tracing log file.
    pub log_file: Option<PathBuf>,
}

impl Default for Opts {
    fn default() -> Self {
        Self {
            start_phase: 1,
            auto: false,
            mouse: true,
            exit_after_ms: 0,
            og_card: None,
            clipboard: true,
            log_file: None,
        }
    }
}

/// What the command line asked for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Parsed {
    Run(Opts),
    Help,
    Version,
}

/// A command line that cannot be honored.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CliError {
    InvalidValue { flag: &'static str, value: String },
    UnknownArgument(String),
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidValue { flag, value } => write!(f, "Invalid {flag} value: {value}"),
            Self::UnknownArgument(arg) => write!(f, "Unknown argument: {arg}"),
        }
    }
}

impl std::error::Error for CliError {}

fn phase_number(flag: &'static str, value: &str) -> Result<usize, CliError> {
    match value.parse::<usize>() {
        Ok(n) if (1..=PHASE_COUNT).contains(&n) => Ok(n),
        _ => Err(CliError::InvalidValue {
            flag,
            value: value.to_owned(),
        }),
    }
}

fn truthy(value: &str) -> bool {
    matches!(value.to_ascii_lowercase().as_str(), "1" | "true" | "yes" | "on")
}

impl Opts {
    /// Parse the process arguments and environment, printing help/version
    /// or an error and exiting where appropriate.
    pub fn parse() -> Self {
        let args: Vec<String> = env::args().skip(1).collect();
        match Self::parse_from(&args, |key| env::var(key).ok()) {
            Ok(Parsed::Run(opts)) => opts,
            Ok(Parsed::Help) => {
                println!("{HELP_TEXT}");
                process::exit(0);
            }
            Ok(Parsed::Version) => {
                println!("ontos-demo {VERSION}");
                process::exit(0);
            }
            Err(err) => {
                eprintln!("{err}");
                if matches!(err, CliError::UnknownArgument(_)) {
                    eprintln!("Run with --help for usage information.");
                }
                process::exit(1);
            }
        }
    }

    /// Parse `args` (without the program name) against an environment.
    ///
    /// Malformed environment values are ignored; malformed flags are errors.
    pub fn parse_from(
        args: &[String],
        env: impl Fn(&str) -> Option<String>,
    ) -> Result<Parsed, CliError> {
        let mut opts = Self::default();

        // Environment first, flags override.
        if let Some(val) = env("ONTOS_DEMO_PHASE")
            && let Ok(n) = phase_number("ONTOS_DEMO_PHASE", &val)
        {
            opts.start_phase = n;
        }
        if let Some(val) = env("ONTOS_DEMO_AUTO") {
            opts.auto = truthy(&val);
        }
        if let Some(val) = env("ONTOS_DEMO_EXIT_AFTER_MS")
            && let Ok(n) = val.parse()
        {
            opts.exit_after_ms = n;
        }
        if let Some(val) = env("ONTOS_DEMO_LOG")
            && !val.is_empty()
        {
            opts.log_file = Some(PathBuf::from(val));
        }
        if let Some(val) = env("ONTOS_DEMO_CLIPBOARD") {
            opts.clipboard = !val.eq_ignore_ascii_case("off");
        }

        for arg in args {
            match arg.as_str() {
                "--help" | "-h" => return Ok(Parsed::Help),
                "--version" | "-V" => return Ok(Parsed::Version),
                "--auto" => opts.auto = true,
                "--no-mouse" => opts.mouse = false,
                "--og-card" => opts.og_card = Some(PathBuf::from(DEFAULT_OG_CARD)),
                other => {
                    if let Some(val) = other.strip_prefix("--phase=") {
                        opts.start_phase = phase_number("--phase", val)?;
                    } else if let Some(val) = other.strip_prefix("--exit-after-ms=") {
                        opts.exit_after_ms = val.parse().map_err(|_| CliError::InvalidValue {
                            flag: "--exit-after-ms",
                            value: val.to_owned(),
                        })?;
                    } else if let Some(val) = other.strip_prefix("--og-card=") {
                        if val.is_empty() {
                            return Err(CliError::InvalidValue {
                                flag: "--og-card",
                                value: String::new(),
                            });
                        }
                        opts.og_card = Some(PathBuf::from(val));
                    } else {
                        return Err(CliError::UnknownArgument(other.to_owned()));
                    }
                }
            }
        }

        Ok(Parsed::Run(opts))
    }

    /// Startup options for the app model.
    pub fn app_config(&self) -> AppConfig {
        AppConfig {
            start_phase: self.start_phase.saturating_sub(1),
            auto_advance: self.auto,
            seed: None,
        }
    }
}
