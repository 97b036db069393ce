// SPDX-FileCopyrightText: 2026 SEGOC Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `segoc chat` and `segoc reset` command implementations.
//!
//! The chat is a readline REPL over one [`ConversationEngine`]. Menu entries
//! are picked by number; anything else is sent as typed text. Bot replies
//! appear after the configured typing delay.

use std::time::Duration;

use colored::Colorize;
use rustyline::DefaultEditor;
use rustyline::error::ReadlineError;
use segoc_agent::{ConversationEngine, EngineSettings, InputMode, ReplyAction, TurnOutcome};
use segoc_bus::EventBus;
use segoc_config::SegocConfig;
use segoc_core::{Author, DeliveryState, SegocError, TranscriptMessage, keys};
use segoc_dashboard::NotificationFeed;
use tracing::{debug, warn};

const HELP: &str = "Elegí una opción con su número o escribí tu respuesta.\n\
                    Comandos: /historial, /volver, /reset, /salir";

/// One line read by the REPL.
#[derive(Debug, PartialEq, Eq)]
enum ShellInput {
    Empty,
    Quit,
    Help,
    Reset,
    History,
    CloseText,
    Choose(usize),
    Text(String),
}

fn parse_input(line: &str, mode: InputMode) -> ShellInput {
    let line = line.trim();
    match line {
        "" => ShellInput::Empty,
        "/salir" | "/quit" | "/exit" => ShellInput::Quit,
        "/ayuda" | "/help" => ShellInput::Help,
        "/reset" => ShellInput::Reset,
        "/historial" => ShellInput::History,
        "/volver" => ShellInput::CloseText,
        _ => match (mode, line.parse::<usize>()) {
            (InputMode::Options, Ok(n)) if n >= 1 => ShellInput::Choose(n - 1),
            _ => ShellInput::Text(line.to_string()),
        },
    }
}

/// Runs the `segoc chat` interactive REPL.
pub async fn run_chat(config: &SegocConfig) -> Result<(), SegocError> {
    let (store, sink) = crate::open_storage(config).await?;
    let bus = EventBus::default();
    let mut feed = NotificationFeed::subscribe(&bus, config.dashboard.notification_limit);
    let mut engine =
        ConversationEngine::open(store, sink, bus, EngineSettings::from(config)).await;
    let typing = Duration::from_millis(config.pacing.typing_delay_ms);
    let bot_name = config.agent.name.as_str();

    let mut rl = DefaultEditor::new()
        .map_err(|e| SegocError::Internal(format!("failed to initialize readline: {e}")))?;

    println!("{}", format!("{bot_name} · reporte diario de obra").bold().green());
    println!("{}\n", HELP.dimmed());

    let mut shown = 0;
    for message in engine.transcript() {
        print_message(bot_name, message);
        shown += 1;
    }
    print_menu(&engine);

    loop {
        engine.pump_receipts().await;
        let prompt = match engine.input_mode() {
            InputMode::FreeText { placeholder } => format!("{} > ", placeholder.dimmed()),
            InputMode::Options => format!("{}> ", "segoc".green()),
        };

        let line = match rl.readline(&prompt) {
            Ok(line) => line,
            Err(ReadlineError::Interrupted | ReadlineError::Eof) => break,
            Err(e) => {
                eprintln!("{}: {e}", "error".red());
                break;
            }
        };
        let input = parse_input(&line, engine.input_mode());
        if input != ShellInput::Empty {
            let _ = rl.add_history_entry(line.as_str());
        }

        let outcome = match input {
            ShellInput::Empty => continue,
            ShellInput::Quit => break,
            ShellInput::Help => {
                println!("{}", HELP.dimmed());
                continue;
            }
            ShellInput::History => {
                engine.pump_receipts().await;
                for message in engine.transcript() {
                    print_message(bot_name, message);
                }
                continue;
            }
            ShellInput::Reset => {
                engine.reset().await;
                shown = 0;
                Ok(TurnOutcome::Advanced(engine.step()))
            }
            _ if engine.step().is_terminal() => {
                println!("{}", "La sesión terminó. Escribí /reset para un nuevo reporte.".yellow());
                continue;
            }
            ShellInput::CloseText => engine.close_free_text().await,
            ShellInput::Choose(index) => engine.choose(index).await,
            ShellInput::Text(text) => engine.send_text(&text).await,
        };

        match outcome {
            Ok(outcome) => {
                debug!(?outcome, step = %engine.step(), "turn applied");
                if engine.transcript().len() > shown {
                    typing_pause(bot_name, typing).await;
                }
                for message in engine.transcript().iter().skip(shown) {
                    if message.author == Author::Bot {
                        print_message(bot_name, message);
                    }
                }
                shown = engine.transcript().len();
                if feed.poll() > 0 {
                    if let Some(notification) = feed.latest().next() {
                        println!(
                            "{} {}",
                            format!("[{}]", notification.title).magenta(),
                            notification.message
                        );
                    }
                }
                print_menu(&engine);
            }
            Err(e) => eprintln!("{}", e.to_string().red()),
        }
    }

    Ok(())
}

/// Runs `segoc reset`: clears the stored session keys.
pub async fn run_reset(config: &SegocConfig) -> Result<(), SegocError> {
    let (store, _) = crate::open_storage(config).await?;
    for key in keys::SESSION_KEYS {
        store.remove(key).await?;
    }
    println!("{}", "Sesión reiniciada. Los reportes completados se conservan.".green());
    Ok(())
}

async fn typing_pause(bot_name: &str, delay: Duration) {
    if delay.is_zero() {
        return;
    }
    println!("{}", format!("{bot_name} está escribiendo...").dimmed().italic());
    tokio::time::sleep(delay).await;
}

fn print_message(bot_name: &str, message: &TranscriptMessage) {
    let time = message.sent_at.format("%H:%M");
    match message.author {
        Author::Bot => println!("{} {} {}", time.to_string().dimmed(), format!("{bot_name}:").cyan().bold(), message.text),
        Author::User => println!(
            "{} {} {} {}",
            time.to_string().dimmed(),
            "vos:".bold(),
            message.text,
            receipt_mark(message.delivery)
        ),
    }
}

fn receipt_mark(state: DeliveryState) -> colored::ColoredString {
    match state {
        DeliveryState::Sending => "○".dimmed(),
        DeliveryState::Sent => "✓".dimmed(),
        DeliveryState::Delivered => "✓✓".dimmed(),
        DeliveryState::Read => "✓✓".blue(),
    }
}

fn print_menu(engine: &ConversationEngine) {
    if engine.awaiting_text().is_some() {
        println!("{}", "Escribí tu respuesta o /volver para ver las opciones.".dimmed());
        return;
    }
    let menu = engine.menu();
    if menu.is_empty() {
        if engine.step().is_terminal() {
            println!("{}", "Escribí /reset para un nuevo reporte.".dimmed());
        } else {
            warn!(step = %engine.step(), "step has no options");
        }
        return;
    }
    for (i, option) in menu.iter().enumerate() {
        let label = match option.action {
            ReplyAction::Cancel => option.label.red().to_string(),
            ReplyAction::Back(_) => option.label.yellow().to_string(),
            ReplyAction::FreeText { .. } => format!("{}...", option.label).italic().to_string(),
            ReplyAction::Select => option.label.clone(),
        };
        println!("  {} {label}", format!("{}.", i + 1).bold());
    }
}
