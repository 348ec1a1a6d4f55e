//! Interactive chat session.
//!
//! The terminal plays the part of the widget's page:
//! - the email prompt is shown until an identity is accepted
//! - each input line is a message send
//! - Ctrl-C or SIGTERM is "navigating away" (before-unload)
//! - end of input or SIGHUP (terminal closed) is "page hidden for teardown"
//! - an idle signal closes the session from under the user

use anyhow::{Context, Result};
use colored::Colorize;
use dialoguer::Input;
use std::io::BufRead;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tracing::debug;

use twin_core::activity::ActivityKind;
use twin_core::client::{ChatClient, HttpBeacon};
use twin_core::idle::MonitorState;
use twin_core::session::validate_identity;
use twin_core::{ChatWidget, Trigger};

use crate::config::Config;
use crate::error::TwinResult;
use crate::render;

/// Grace period for the close beacon before the process exits.
const CLOSE_GRACE: Duration = Duration::from_secs(3);

/// Why the chat loop stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Exit {
    Interrupted,
    InputClosed,
    Idle,
}

impl Exit {
    fn trigger(self) -> Option<Trigger> {
        match self {
            Exit::Interrupted => Some(Trigger::BeforeUnload),
            Exit::InputClosed => Some(Trigger::PageHide),
            // The idle hook already sent the close signal.
            Exit::Idle => None,
        }
    }
}

/// Process signals that end the session.
///
/// Installing these replaces the default "terminate immediately" handling,
/// so they are only set up once a session is about to exist.
struct Shutdown {
    #[cfg(unix)]
    interrupt: tokio::signal::unix::Signal,
    #[cfg(unix)]
    terminate: tokio::signal::unix::Signal,
    #[cfg(unix)]
    hangup: tokio::signal::unix::Signal,
}

impl Shutdown {
    #[cfg(unix)]
    fn install() -> Result<Self> {
        use tokio::signal::unix::{SignalKind, signal};

        Ok(Self {
            interrupt: signal(SignalKind::interrupt()).context("Failed to handle SIGINT")?,
            terminate: signal(SignalKind::terminate()).context("Failed to handle SIGTERM")?,
            hangup: signal(SignalKind::hangup()).context("Failed to handle SIGHUP")?,
        })
    }

    #[cfg(not(unix))]
    fn install() -> Result<Self> {
        Ok(Self {})
    }

    /// Wait for the next signal. Cancel-safe.
    #[cfg(unix)]
    async fn recv(&mut self) -> Exit {
        tokio::select! {
            Some(()) = self.interrupt.recv() => Exit::Interrupted,
            Some(()) = self.terminate.recv() => Exit::Interrupted,
            Some(()) = self.hangup.recv() => Exit::InputClosed,
            else => std::future::pending().await,
        }
    }

    #[cfg(not(unix))]
    async fn recv(&mut self) -> Exit {
        match tokio::signal::ctrl_c().await {
            Ok(()) => Exit::Interrupted,
            Err(_) => std::future::pending().await,
        }
    }
}

/// What woke the chat loop.
enum Event {
    Line(String),
    Exit(Exit),
    IdleCheck,
}

pub async fn execute(email: Option<String>, config: &Config) -> Result<()> {
    let client = ChatClient::with_timeout(config.base_url(), config.request_timeout())
        .context("Failed to create chat client")?;
    let beacon = Arc::new(HttpBeacon::new().context("Failed to create close beacon")?);
    let widget = ChatWidget::mount(&config.widget_config(), Arc::new(client), beacon.clone());

    println!("{}", "AI Assistance Chat".cyan().bold());
    println!("{}", "─".repeat(50));
    println!();

    // Identity phase: nothing is armed yet, so an interrupt just exits.
    let identity = read_identity(email.or_else(|| config.chat.email.clone())).await?;

    let mut shutdown = Shutdown::install()?;
    let exit = tokio::select! {
        submitted = widget.submit_identity(&identity) => {
            if let Err(e) = submitted {
                if !e.is_transport() {
                    return Err(e.into());
                }
                debug!(error = %e, "first exchange failed");
            }
            let shown = render_new(&widget, 0)?;
            chat_loop(&widget, config, &mut shutdown, shown).await?
        }
        exit = shutdown.recv() => exit,
    };

    match exit {
        Exit::Idle => println!("{}", "Session closed after inactivity.".yellow()),
        Exit::Interrupted | Exit::InputClosed => println!("{}", "Goodbye.".dimmed()),
    }

    widget.teardown(exit.trigger());
    beacon.flush(CLOSE_GRACE).await;
    Ok(())
}

/// Prompt until an email with a valid shape is entered.
async fn read_identity(mut preset: Option<String>) -> Result<String> {
    loop {
        let identity = match preset.take() {
            Some(e) => e,
            None => prompt_email().await?,
        };

        match validate_identity(&identity) {
            Ok(()) => return Ok(identity),
            Err(e) => println!("{}", e.to_string().red()),
        }
    }
}

async fn chat_loop(
    widget: &ChatWidget,
    config: &Config,
    shutdown: &mut Shutdown,
    mut shown: usize,
) -> Result<Exit> {
    let mut input = spawn_input();
    let mut idle_check = tokio::time::interval(config.idle_check_interval());

    loop {
        print_prompt();
        let event = tokio::select! {
            line = input.recv() => match line {
                Some(line) => Event::Line(line.context("Failed to read input")?),
                None => Event::Exit(Exit::InputClosed),
            },
            exit = shutdown.recv() => Event::Exit(exit),
            _ = idle_check.tick() => Event::IdleCheck,
        };

        match event {
            Event::Line(text) => {
                widget.record_activity(ActivityKind::InputEdit);

                tokio::select! {
                    sent = widget.send_message(&text) => {
                        if let Err(e) = sent {
                            debug!(error = %e, "send failed");
                        }
                    }
                    exit = shutdown.recv() => return Ok(exit),
                }
                shown = render_new(widget, shown)?;
            }
            Event::Exit(exit) => return Ok(exit),
            Event::IdleCheck => {
                if widget.idle_state() == MonitorState::Signaled {
                    return Ok(Exit::Idle);
                }
            }
        }
    }
}

/// Read stdin lines on a detached thread.
///
/// A blocked read cannot be cancelled, so it must not hold up runtime
/// shutdown the way a runtime blocking task would.
fn spawn_input() -> mpsc::UnboundedReceiver<std::io::Result<String>> {
    let (tx, rx) = mpsc::unbounded_channel();
    let spawned = std::thread::Builder::new()
        .name("twin-stdin".into())
        .spawn(move || {
            for line in std::io::stdin().lock().lines() {
                let failed = line.is_err();
                if tx.send(line).is_err() || failed {
                    break;
                }
            }
        });
    if let Err(e) = spawned {
        // Dropping the sender reads as end of input.
        debug!(error = %e, "stdin reader unavailable");
    }
    rx
}

/// Print log entries from index `shown` on. Returns the new count.
fn render_new(widget: &ChatWidget, shown: usize) -> TwinResult<usize> {
    let messages = widget.messages()?;
    for message in messages.iter().skip(shown) {
        render::print_message(message);
    }
    Ok(messages.len())
}

fn print_prompt() {
    use std::io::Write;
    print!("{} ", "›".cyan());
    let _ = std::io::stdout().flush();
}

async fn prompt_email() -> Result<String> {
    tokio::task::spawn_blocking(|| {
        Input::<String>::new()
            .with_prompt("Enter your email to start")
            .allow_empty(true)
            .interact_text()
    })
    .await
    .context("Email prompt task failed")?
    .context("Failed to read email")
}
