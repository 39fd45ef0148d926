//! Mochi Screen Headless Runner
//!
//! Feeds a recorded byte stream through the screen engine and prints the
//! resulting screen as text or a JSON snapshot. Replies the engine would
//! send back to the child are discarded.

use std::io::{self, Read};
use std::process::ExitCode;

use mochi_screen::app::Config;
use mochi_screen::Terminal;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

fn main() -> ExitCode {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
        .init();

    let args: Vec<String> = std::env::args().collect();

    let mut config = Config::default();
    let mut input_file: Option<String> = None;
    let mut output_format = OutputFormat::Text;
    let mut show_history = false;

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "-c" | "--cols" => {
                i += 1;
                if i < args.len() {
                    config.cols = args[i].parse().unwrap_or(80);
                }
            },
            "-r" | "--rows" => {
                i += 1;
                if i < args.len() {
                    config.rows = args[i].parse().unwrap_or(24);
                }
            },
            "--history" => {
                i += 1;
                if i < args.len() {
                    config.history_size = args[i].parse().unwrap_or(1000);
                }
            },
            "-f" | "--file" => {
                i += 1;
                if i < args.len() {
                    input_file = Some(args[i].clone());
                }
            },
            "-j" | "--json" => output_format = OutputFormat::Json,
            "-t" | "--text" => output_format = OutputFormat::Text,
            "-s" | "--scrollback" => show_history = true,
            "-h" | "--help" => {
                print_help();
                return ExitCode::SUCCESS;
            },
            arg => {
                if input_file.is_none() && !arg.starts_with('-') {
                    input_file = Some(arg.to_string());
                } else {
                    tracing::warn!("ignoring argument {}", arg);
                }
            },
        }
        i += 1;
    }

    let mut terminal = match Terminal::with_config(&config) {
        Ok(terminal) => terminal,
        Err(e) => {
            eprintln!("Error: {}", e);
            return ExitCode::FAILURE;
        },
    };

    let input_data = match &input_file {
        Some(path) => match std::fs::read(path) {
            Ok(data) => data,
            Err(e) => {
                eprintln!("Error reading file '{}': {}", path, e);
                return ExitCode::FAILURE;
            },
        },
        None => {
            let mut data = Vec::new();
            if let Err(e) = io::stdin().read_to_end(&mut data) {
                eprintln!("Error reading stdin: {}", e);
                return ExitCode::FAILURE;
            }
            data
        },
    };

    terminal.feed(&input_data);
    let replies = terminal.take_output();
    if !replies.is_empty() {
        tracing::debug!("discarding {} reply bytes", replies.len());
    }

    let snapshot = terminal.snapshot();
    match output_format {
        OutputFormat::Text => {
            println!("Terminal State ({}x{}):", snapshot.cols, snapshot.rows);
            println!("Cursor: ({}, {})", snapshot.cursor.row, snapshot.cursor.col);
            if !snapshot.title.is_empty() {
                println!("Title: {}", snapshot.title);
            }
            if show_history {
                println!("--- history ({} lines)", snapshot.history_lines);
                for line in terminal.screen().history().iter() {
                    println!("{}", line.text());
                }
            }
            println!("---");
            print!("{}", snapshot.to_text());
            println!("---");
        },
        OutputFormat::Json => match snapshot.to_json() {
            Ok(json) => println!("{}", json),
            Err(e) => {
                eprintln!("Error serializing snapshot: {}", e);
                return ExitCode::FAILURE;
            },
        },
    }

    ExitCode::SUCCESS
}

#[derive(Clone, Copy)]
enum OutputFormat {
    Text,
    Json,
}

fn print_help() {
    println!("Mochi Screen Headless Runner");
    println!();
    println!("Usage: mochi-screen-headless [OPTIONS] [INPUT_FILE]");
    println!();
    println!("Options:");
    println!("  -c, --cols <N>       Set terminal width (default: 80)");
    println!("  -r, --rows <N>       Set terminal height (default: 24)");
    println!("      --history <N>    Set history capacity (default: 1000)");
    println!("  -f, --file <PATH>    Read input from file");
    println!("  -j, --json           Output snapshot as JSON");
    println!("  -t, --text           Output snapshot as text (default)");
    println!("  -s, --scrollback     Also print history lines (text output)");
    println!("  -h, --help           Show this help message");
    println!();
    println!("If no input file is specified, reads from stdin.");
    println!("Set RUST_LOG=debug to trace ignored sequences.");
}
