use anyhow::Result;
use colored::Colorize;
use rustyline::highlight::Highlighter;
use rustyline::Editor;
use rustyline_derive::{Completer, Helper, Hinter, Validator};
use std::borrow::Cow;
use std::collections::HashMap;
use std::env;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tickloop::prelude::*;
use tickloop::{ENGINE_NAME, VERSION as LIB_VERSION};
use tracing::info;

const SHELL_VERSION: &str = env!("CARGO_PKG_VERSION");

/// A custom helper struct for rustyline that enables syntax highlighting.
#[derive(Completer, Helper, Hinter, Validator)]
struct CommandHighlighter;

impl Highlighter for CommandHighlighter {
    fn highlight<'l>(&self, line: &'l str, _pos: usize) -> Cow<'l, str> {
        if let Some((command, rest)) = line.split_once(' ') {
            let colored_command = command.yellow().bold();
            let colored_rest = rest.yellow();
            Cow::Owned(format!("{} {}", colored_command, colored_rest))
        } else {
            Cow::Owned(line.yellow().bold().to_string())
        }
    }
    fn highlight_char(&self, _line: &str, _pos: usize, _forced: bool) -> bool {
        true
    }
}

fn print_banner() {
    if env::var("QUIET_MODE").is_ok() {
        return;
    }
    println!("{}", format!("{} interactive shell", ENGINE_NAME).cyan().bold());
    println!(
        "          Shell   v{:<8} Library   v{:<8}",
        SHELL_VERSION, LIB_VERSION
    );
    println!("{}", "Type 'help' for commands or 'exit' to quit.".dimmed());
}

/// Spawns a task that prints engine events. Tick events are gated behind the
/// shared flag so the stream can be muted without losing stop/fault reports.
fn spawn_event_printer(engine: &TickerEngine, is_watching_ticks: Arc<AtomicBool>) {
    let mut events = engine.subscribe();
    tokio::spawn(async move {
        while let Ok(event) = events.recv().await {
            match event {
                TickerEvent::Tick { id, seq, timestamp } => {
                    if is_watching_ticks.load(Ordering::Relaxed) {
                        println!(
                            "\n<-- [TICK] {:?} #{} at {}",
                            id,
                            seq,
                            timestamp.format("%H:%M:%S%.3f")
                        );
                    }
                }
                TickerEvent::Stopped { id, reason } => {
                    println!("\n<-- [STOPPED] {:?}: {}", id, reason);
                }
                TickerEvent::Faulted { id, message } => {
                    println!("\n<-- [FAULT] {:?}: {}", id, message);
                }
                TickerEvent::Restarted { id, restarts } => {
                    println!("\n<-- [RESTART] {:?} (restart #{})", id, restarts);
                }
                TickerEvent::Started { .. } => {}
            }
        }
    });
}

#[tokio::main]
async fn main() -> Result<()> {
    print_banner();

    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::WARN)
        .with_target(false)
        .init();

    let config = match EngineConfig::load() {
        Ok(config) => config,
        Err(err) => {
            eprintln!("Failed to load tickloop.toml ({err}); using defaults.");
            EngineConfig::default()
        }
    };
    let engine = TickerEngine::new(config);

    // Create the shared flag for the tick stream.
    let is_watching_ticks = Arc::new(AtomicBool::new(false));
    spawn_event_printer(&engine, is_watching_ticks.clone());

    // The shell's state management variables.
    let mut active_tickers: HashMap<usize, (TickerId, Option<CancelHandle>)> = HashMap::new();
    let mut next_handle: usize = 0;

    // Start any tickers declared in the configuration file.
    for spec in engine.preconfigured().to_vec() {
        let label = spec.label.clone();
        let (stop, cancel) = StopCondition::manual();
        let handle = engine.spawn_ticker(spec, stop, |_now| Ok(())).await;
        active_tickers.insert(next_handle, (handle.id(), Some(cancel)));
        println!("--> Started preconfigured ticker '{label}' with handle: #{next_handle}");
        next_handle += 1;
    }

    info!("{} is ready.", ENGINE_NAME);

    let mut rl = Editor::new()?;
    let helper = CommandHighlighter;
    rl.set_helper(Some(helper));

    println!(
        "{} is running. Type 'help' for commands or 'exit' to quit.",
        ENGINE_NAME.cyan()
    );

    loop {
        let prompt = format!("{}", ">> ".cyan().bold());
        let readline = rl.readline(&prompt);
        match readline {
            Ok(line) => {
                rl.add_history_entry(line.as_str())?;
                let args = line.trim().split_whitespace().collect::<Vec<_>>();

                if let Some(command) = args.first() {
                    match *command {
                        "start" => {
                            if let Some(seconds_str) = args.get(1) {
                                if let Ok(seconds) = seconds_str.parse::<u64>() {
                                    let (stop, cancel) = StopCondition::manual();
                                    let ticker = engine
                                        .spawn_ticker(
                                            TickerSpec::new(
                                                format!("shell-{next_handle}"),
                                                Duration::from_secs(seconds),
                                            ),
                                            stop,
                                            |_now| Ok(()),
                                        )
                                        .await;
                                    active_tickers
                                        .insert(next_handle, (ticker.id(), Some(cancel)));
                                    println!(
                                        "--> Started {seconds}-second ticker with handle: #{next_handle}"
                                    );
                                    next_handle += 1;
                                } else {
                                    println!(
                                        "Error: '{}' is not a valid number of seconds.",
                                        seconds_str
                                    );
                                }
                            } else {
                                println!("Usage: start <SECONDS>");
                            }
                        }
                        "timeout" => {
                            match (
                                args.get(1).and_then(|s| s.parse::<u64>().ok()),
                                args.get(2).and_then(|s| s.parse::<u64>().ok()),
                            ) {
                                (Some(seconds), Some(limit)) => {
                                    let ticker = engine
                                        .spawn_ticker(
                                            TickerSpec::new(
                                                format!("shell-{next_handle}"),
                                                Duration::from_secs(seconds),
                                            ),
                                            StopCondition::timeout(Duration::from_secs(limit)),
                                            |_now| Ok(()),
                                        )
                                        .await;
                                    active_tickers.insert(next_handle, (ticker.id(), None));
                                    println!(
                                        "--> Started {seconds}-second ticker stopping after {limit}s, handle: #{next_handle}"
                                    );
                                    next_handle += 1;
                                }
                                _ => println!("Usage: timeout <SECONDS> <LIMIT_SECONDS>"),
                            }
                        }
                        "cancel" => {
                            if let Some(handle_no) =
                                args.get(1).and_then(|s| s.parse::<usize>().ok())
                            {
                                if let Some((id, cancel)) = active_tickers.remove(&handle_no) {
                                    match cancel {
                                        Some(cancel) => cancel.cancel(),
                                        None => {
                                            engine.stop_ticker(id).await;
                                        }
                                    }
                                    println!("--> Cancelled ticker #{handle_no}.");
                                } else {
                                    println!(
                                        "Error: invalid handle #{handle_no}. Use 'list' to see active tickers."
                                    );
                                }
                            } else {
                                println!("Usage: cancel <HANDLE>");
                            }
                        }
                        "list" => {
                            println!("Tickers started from this shell:");
                            for (handle_no, (id, _)) in &active_tickers {
                                let state = if engine.is_running(*id).await {
                                    "running"
                                } else {
                                    "stopped"
                                };
                                println!("  Handle #{}: {:?} ({})", handle_no, id, state);
                            }
                        }
                        "watch" => match args.get(1) {
                            Some(&"on") => {
                                is_watching_ticks.store(true, Ordering::Relaxed);
                                println!("--> Started streaming tick events.");
                            }
                            Some(&"off") => {
                                is_watching_ticks.store(false, Ordering::Relaxed);
                                println!("--> Stopped streaming tick events.");
                            }
                            _ => println!("Usage: watch on|off"),
                        },
                        "help" => {
                            println!("Available commands:");
                            println!("  start <S>        - Starts an S-second ticker with a manual cancel handle.");
                            println!("  timeout <S> <L>  - Starts an S-second ticker that stops after L seconds.");
                            println!("  list             - Shows tickers started from this shell.");
                            println!("  cancel <H>       - Cancels a ticker by its handle.");
                            println!("  watch on|off     - Streams or mutes tick events.");
                            println!("  exit             - Quits the shell.");
                        }
                        "exit" => break,
                        "" => {}
                        _ => println!("Unknown command: '{}'. Type 'help'.", line),
                    }
                }
            }
            Err(_) => {
                println!("Exiting tickshell...");
                break;
            }
        }
    }

    engine.shutdown();
    Ok(())
}
