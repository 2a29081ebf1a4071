use anyhow::{Context, Result};
use clap::Parser;
use std::collections::HashSet;
use std::str::FromStr;
use strum::IntoEnumIterator;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::runtime::Runtime;

use finwise_scribe::ui::chat::EventId;
use finwise_scribe::ui::console::{HELP_TEXT, format_event, format_status};
use finwise_scribe::{Cli, ScribeApp, Timeframe, run_app};

/// What the driver should do after a line of input.
enum Flow {
    Continue,
    Quit,
}

fn main() -> Result<()> {
    // A. Init Logging
    std::panic::set_hook(Box::new(|panic_info| {
        eprintln!("Application panicked: {:?}", panic_info);
    }));
    env_logger::Builder::from_default_env()
        .filter_level(log::LevelFilter::Info)
        .init();

    // B. Parse Args
    let args = Cli::parse();
    #[cfg(debug_assertions)]
    log::info!("Parsed arguments: {:?}", args);

    // C. Run the dashboard loop
    let rt = Runtime::new().context("Failed to create Tokio runtime")?;
    rt.block_on(run(args))
}

async fn run(args: Cli) -> Result<()> {
    let mut app = run_app(&args)?;
    println!("{}", HELP_TEXT);

    let mut printed = Printed::default();
    printed.flush(&app);
    app.start();

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        tokio::select! {
            line = lines.next_line() => {
                let Some(line) = line.context("Failed to read stdin")? else {
                    break;
                };
                if let Flow::Quit = handle_line(&mut app, &line) {
                    break;
                }
                printed.flush(&app);
            }
            Some(()) = app.next_event() => {
                app.update();
                printed.flush(&app);
            }
        }
    }

    log::info!("Shutting down");
    Ok(())
}

fn handle_line(app: &mut ScribeApp, line: &str) -> Flow {
    let line = line.trim();
    let (command, arg) = match line.split_once(char::is_whitespace) {
        Some((command, arg)) => (command, arg.trim()),
        None => (line, ""),
    };

    match command {
        "/quit" | "/exit" => return Flow::Quit,
        "/help" => println!("{}", HELP_TEXT),
        "/symbol" => {
            if !app.set_symbol(arg) {
                println!("Already showing {}", app.view().view().symbol);
            }
        }
        "/timeframe" => match Timeframe::from_str(arg) {
            Ok(timeframe) => {
                app.set_timeframe(timeframe);
            }
            Err(_) => {
                let valid: Vec<String> = Timeframe::iter().map(|tf| tf.to_string()).collect();
                println!("Unknown timeframe '{}'. Use one of: {}", arg, valid.join(", "));
            }
        },
        "/session" => {
            if !app.select_session(arg) {
                println!("Session {} is already open", app.view().view().session_id);
            }
        }
        "/forecast" => {
            if let Err(e) = app.request_forecast() {
                println!("{}", e);
            }
        }
        _ if line.is_empty() => {}
        _ => {
            if let Err(e) = app.send_message(line) {
                println!("{}", e);
            }
        }
    }
    Flow::Continue
}

/// Tracks what has already been printed so only changes hit the terminal.
#[derive(Default)]
struct Printed {
    session_id: String,
    seen: HashSet<EventId>,
    status: String,
}

impl Printed {
    fn flush(&mut self, app: &ScribeApp) {
        let view = app.view().view();
        if view.session_id != self.session_id {
            println!("== session {} ==", view.session_id);
            self.session_id = view.session_id.clone();
            self.seen.clear();
        }

        for event in app.chat().events() {
            if self.seen.insert(event.id.clone()) {
                println!("{}", format_event(event));
            }
        }

        let status = format_status(&app.snapshot());
        if status != self.status {
            println!("{}", status);
            self.status = status;
        }
    }
}
