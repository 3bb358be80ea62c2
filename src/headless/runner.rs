//! Headless mode runner - stdin commands in, NDJSON events out

use std::io::BufRead;
use std::path::PathBuf;
use std::sync::Arc;

use parking_lot::Mutex;
use tokio::sync::mpsc;
use tokio::time::Instant;

use vista_core::prelude::*;
use vista_core::LoadingSession;
use vista_loader::config::load_settings;
use vista_loader::{
    FileSessionStorage, LoaderController, MemorySessionStorage, NavigationObserver,
    SessionStorage, Subscription,
};

use super::command::Command;
use super::HeadlessEvent;

/// Startup options for the headless driver
#[derive(Debug, Clone, Default)]
pub struct HeadlessOptions {
    /// Directory containing `.vista-grande/config.toml`
    pub config_dir: PathBuf,
    /// Keep the session in memory instead of the session file
    pub memory_session: bool,
    /// Skip the one-time splash
    pub no_splash: bool,
}

/// Run in headless mode until `quit` or end of input
pub async fn run_headless(options: HeadlessOptions) -> Result<()> {
    info!("═══════════════════════════════════════════════════════");
    info!("Vista Grande loader starting in HEADLESS mode");
    info!("Config dir: {}", options.config_dir.display());
    info!("═══════════════════════════════════════════════════════");

    let settings = load_settings(&options.config_dir);
    let storage: Arc<dyn SessionStorage> = if options.memory_session {
        Arc::new(MemorySessionStorage::new())
    } else {
        let storage = FileSessionStorage::default_location();
        info!("Session file: {}", storage.path().display());
        Arc::new(storage)
    };

    let controller = LoaderController::open(storage, &settings);
    HeadlessEvent::started(controller.session()).emit();

    let _subscription = emit_store_changes(&controller);
    let observer = NavigationObserver::new(controller.clone());

    if !options.no_splash {
        controller.show_initial_splash();
    }

    let (cmd_tx, cmd_rx) = mpsc::channel(32);
    std::thread::spawn(move || {
        spawn_stdin_reader_blocking(cmd_tx);
    });

    let result = headless_event_loop(&controller, &observer, cmd_rx).await;

    observer.teardown();
    info!("Vista Grande headless mode exiting");
    result
}

/// Forward every store write to stdout, with per-overlay diffs.
fn emit_store_changes(controller: &LoaderController) -> Subscription {
    let previous = Arc::new(Mutex::new(controller.session()));
    let observed = controller.clone();
    controller
        .store()
        .subscribe(move |session: &LoadingSession| {
            let before = std::mem::replace(&mut *previous.lock(), *session);
            for event in HeadlessEvent::overlay_changes(&before, session) {
                event.emit();
            }
            HeadlessEvent::state_changed(*session, observed.transition_phase()).emit();
        })
}

/// Main headless event loop
async fn headless_event_loop(
    controller: &LoaderController,
    observer: &NavigationObserver,
    mut cmd_rx: mpsc::Receiver<Command>,
) -> Result<()> {
    while let Some(command) = cmd_rx.recv().await {
        match command {
            Command::Navigate(route) => {
                let outcome = observer.on_route_change(&route);
                HeadlessEvent::navigation(route.change_key(), outcome).emit();
            }
            Command::Show(duration) => {
                let shown = match duration {
                    Some(duration) => controller.show_loader(duration),
                    None => controller.show_default_loader(),
                };
                if !shown {
                    info!("show ignored: transition guard held");
                }
            }
            Command::Hide => controller.hide_loader(),
            Command::ShowFullScreen(Some(duration)) => {
                controller.show_full_screen_loader(duration);
            }
            Command::ShowFullScreen(None) => controller.show_default_full_screen_loader(),
            Command::HideFullScreen => controller.hide_full_screen_loader(),
            Command::Operation { latency, fail } => {
                spawn_operation(controller.clone(), latency, fail);
            }
            Command::Wait(duration) => tokio::time::sleep(duration).await,
            Command::State => {
                HeadlessEvent::state_changed(controller.session(), controller.transition_phase())
                    .emit();
            }
            Command::Quit => {
                info!("Quit requested");
                return Ok(());
            }
        }
    }

    info!("Command channel closed");
    Ok(())
}

/// Run a simulated operation under the loader without blocking the loop
fn spawn_operation(controller: LoaderController, latency: std::time::Duration, fail: bool) {
    tokio::spawn(async move {
        let started = Instant::now();
        let result = controller
            .run_with_loader(async move {
                tokio::time::sleep(latency).await;
                if fail {
                    Err(format!("operation failed after {}ms", latency.as_millis()))
                } else {
                    Ok(())
                }
            })
            .await;

        let elapsed_ms = started.elapsed().as_millis() as u64;
        if let Err(e) = &result {
            warn!("Wrapped operation failed: {}", e);
        }
        HeadlessEvent::operation_finished(elapsed_ms, result.err()).emit();
    });
}

/// Blocking stdin reader (runs in a separate thread)
fn spawn_stdin_reader_blocking(cmd_tx: mpsc::Sender<Command>) {
    let stdin = std::io::stdin();
    if let Err(e) = read_commands(stdin.lock(), &cmd_tx) {
        warn!("Stdin reader stopped: {}", e);
    }
    info!("Stdin reader exiting");
}

/// Forward parsed commands until `quit`, end of input, or a closed channel.
/// Unparseable lines are reported and skipped.
fn read_commands<R: BufRead>(reader: R, cmd_tx: &mpsc::Sender<Command>) -> Result<()> {
    for line in reader.lines() {
        let line = line.context("Failed to read stdin")?;
        match Command::parse(&line) {
            Ok(Some(command)) => {
                let quit = command == Command::Quit;
                cmd_tx
                    .blocking_send(command)
                    .map_err(|_| Error::ChannelClosed)?;
                if quit {
                    return Ok(());
                }
            }
            Ok(None) => {}
            Err(e) => {
                warn!("Bad stdin command: {}", e);
                HeadlessEvent::error(e.to_string(), !e.is_recoverable()).emit();
            }
        }
    }
    Ok(())
}
