#![forbid(unsafe_code)]

//! Ontos walkthrough binary entry point.

use std::time::Duration;

use ontos_demo::app::App;
use ontos_demo::{cli, logging, og_card};
use ontos_runtime::{Clipboard, Program, ProgramConfig};

fn main() {
    let opts = cli::Opts::parse();

    if let Some(path) = &opts.og_card {
        if let Err(e) = og_card::write(path) {
            eprintln!("Failed to write {}: {e}", path.display());
            std::process::exit(1);
        }
        println!("Wrote {}", path.display());
        return;
    }

    if let Err(e) = logging::init(opts.log_file.as_deref()) {
        eprintln!("Failed to initialize logging: {e}");
        std::process::exit(1);
    }

    let config = ProgramConfig {
        mouse: opts.mouse,
        exit_after: (opts.exit_after_ms > 0).then(|| Duration::from_millis(opts.exit_after_ms)),
        clipboard: if opts.clipboard {
            Clipboard::osc52()
        } else {
            Clipboard::unavailable()
        },
        ..ProgramConfig::default()
    };
    let program = Program::new(App::new(opts.app_config()), config);
    if let Err(e) = program.run() {
        eprintln!("Runtime error: {e}");
        std::process::exit(1);
    }
}
