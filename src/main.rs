//! SereneFocus - a calm menubar Pomodoro timer.
//!
//! The tray app runs the countdown, an optional ambient soundscape and the
//! task list; the command line covers task entry, stats and settings.

use std::io;
use std::sync::mpsc::{self, Receiver, Sender};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::{Duration, Instant};

use chrono::Utc;
use clap::Parser;
use muda::MenuEvent;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;
use tray_icon::{TrayIcon, TrayIconBuilder};
use winit::application::ApplicationHandler;
use winit::event::WindowEvent;
use winit::event_loop::{ActiveEventLoop, ControlFlow, EventLoop};
use winit::window::WindowId;

mod app;
mod audio;
mod cli;
mod config;
mod event;
mod menu;
mod models;
mod monetization;
mod notifications;
mod persistence;
mod soundscape;
mod stats;
mod streak;
mod tasks;
mod theme;
mod ticker;
mod timer;
mod tray;

use app::App;
use audio::{AudioPlayer, RodioAmbient};
use cli::Cli;
use config::Config;
use event::EventResult;
use menu::MenuItems;
use models::{Completion, Soundscape, TimerMode};
use soundscape::SoundscapeController;
use theme::Theme;
use ticker::Ticker;
use timer::TimerMessage;

/// How long the event loop sleeps between polls.
const POLL_INTERVAL: Duration = Duration::from_millis(50);

fn lock(app: &Mutex<App>) -> MutexGuard<'_, App> {
    app.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Application handler for the winit event loop.
struct SereneFocus {
    app: Arc<Mutex<App>>,
    tray: TrayIcon,
    menu_items: Option<MenuItems>,
    timer_rx: Receiver<TimerMessage>,
    _timer: Ticker,
    audio: Option<AudioPlayer>,
    soundscape: Option<SoundscapeController<RodioAmbient>>,
    /// Last (running, soundscape, volume) handed to the soundscape.
    ambient_key: Option<(bool, Soundscape, u32)>,
    /// Last (theme, mode, dark mode) the tray icon was drawn for.
    icon_key: Option<(Theme, TimerMode, bool)>,
    ad: Option<Ticker>,
    reward_tx: Sender<()>,
    reward_rx: Receiver<()>,
}

impl SereneFocus {
    fn new(app: Arc<Mutex<App>>, tray: TrayIcon, config: &Config) -> Self {
        let (timer_tx, timer_rx) = mpsc::channel();
        let timer = timer::start_timer_loop(Arc::clone(&app), timer_tx);

        // Audio is created on the main thread to avoid Send issues
        let audio = AudioPlayer::new()
            .map_err(|e| warn!(error = %e, "audio output unavailable"))
            .ok();
        let soundscape = audio
            .as_ref()
            .map(|a| SoundscapeController::new(a.ambient_channel(&config.soundscape_dir())));

        let (reward_tx, reward_rx) = mpsc::channel();

        Self {
            app,
            tray,
            menu_items: None,
            timer_rx,
            _timer: timer,
            audio,
            soundscape,
            ambient_key: None,
            icon_key: None,
            ad: None,
            reward_tx,
            reward_rx,
        }
    }

    fn rebuild_menu(&mut self) {
        let built = {
            let mut app = lock(&self.app);
            app.reload_if_changed();
            menu::build_menu(&app, Utc::now(), self.ad.is_some())
        };
        match built {
            Ok((built_menu, items)) => {
                self.tray.set_menu(Some(Box::new(built_menu)));
                self.menu_items = Some(items);
            }
            Err(e) => warn!(error = %e, "failed to rebuild menu"),
        }
    }

    /// Pushes app state to the tray title, live menu items, icon and soundscape.
    fn refresh(&mut self) {
        let app = lock(&self.app);
        let title = timer::format_tray_title(&app.state, &app.settings);
        if let Some(ref items) = self.menu_items {
            menu::update_menu_items(items, &app);
        }
        let ambient = (
            app.state.is_running(),
            app.settings.soundscape,
            app.settings.soundscape_volume,
        );
        let volume = app.settings.ambient_volume();
        let icon = (
            app.settings.theme,
            app.state.mode(),
            app.settings.dark_mode,
        );
        drop(app); // Release lock before touching the tray and audio

        self.tray.set_title(Some(&title));

        if self.ambient_key != Some(ambient) {
            self.ambient_key = Some(ambient);
            if let Some(ref mut soundscape) = self.soundscape {
                let (running, selected, _) = ambient;
                soundscape.sync(running, selected, volume);
            }
        }

        if self.icon_key != Some(icon) {
            self.icon_key = Some(icon);
            let (theme, mode, dark_mode) = icon;
            match tray::themed_icon(theme, mode, dark_mode) {
                Ok(image) => {
                    if let Err(e) = self.tray.set_icon(Some(image)) {
                        warn!(error = %e, "failed to set tray icon");
                    }
                }
                Err(e) => warn!(error = %e, "failed to draw tray icon"),
            }
        }
    }

    fn handle_completion(&self, completion: Completion) {
        let app = lock(&self.app);

        // Play sound if enabled
        if app.settings.sound_enabled {
            if let Some(ref audio) = self.audio {
                audio.play_chime();
            }
        }

        // Show notification if enabled
        if app.settings.notifications_enabled {
            notifications::notify_completion(completion, app.today_stats().sessions_completed);
        }
    }

    fn process_timer_messages(&mut self) {
        let mut changed = false;
        while let Ok(msg) = self.timer_rx.try_recv() {
            match msg {
                TimerMessage::StateChanged => changed = true,
                TimerMessage::Completed(completion) => self.handle_completion(completion),
            }
        }
        if changed {
            self.refresh();
        }
    }

    /// Rebuilds the menu when the CLI has written to the store.
    fn process_store_changes(&mut self) {
        let reloaded = lock(&self.app).reload_if_changed();
        if reloaded {
            self.rebuild_menu();
            self.refresh();
        }
    }

    fn process_rewards(&mut self) {
        if self.reward_rx.try_recv().is_err() {
            return;
        }
        self.ad = None;
        lock(&self.app).grant_theme_unlock(Utc::now());
        notifications::notify_theme_unlocked();
        self.rebuild_menu();
        self.refresh();
    }

    fn start_rewarded_ad(&mut self) {
        if self.ad.is_some() {
            return;
        }
        info!("playing rewarded ad (simulated)");
        let tx = self.reward_tx.clone();
        self.ad = Some(monetization::watch_rewarded_ad(move || {
            let _ = tx.send(());
        }));
    }

    fn process_menu_events(&mut self, event_loop: &ActiveEventLoop) {
        while let Ok(event) = MenuEvent::receiver().try_recv() {
            let result = {
                let mut app = lock(&self.app);
                event::handle_menu_event(&mut app, &event)
            };

            match result {
                EventResult::Quit => {
                    if let Some(ref mut soundscape) = self.soundscape {
                        soundscape.stop();
                    }
                    info!("quitting");
                    event_loop.exit();
                    return;
                }
                EventResult::StateChanged => self.refresh(),
                EventResult::MenuChanged => {
                    self.rebuild_menu();
                    self.refresh();
                }
                EventResult::WatchAd => {
                    self.start_rewarded_ad();
                    self.rebuild_menu();
                }
                EventResult::Continue => {}
            }
        }
    }
}

impl ApplicationHandler for SereneFocus {
    fn resumed(&mut self, _event_loop: &ActiveEventLoop) {
        // Nothing to do on resume for a tray-only app
    }

    fn window_event(
        &mut self,
        _event_loop: &ActiveEventLoop,
        _window_id: WindowId,
        _event: WindowEvent,
    ) {
        // No window events for a tray-only app
    }

    fn about_to_wait(&mut self, event_loop: &ActiveEventLoop) {
        event_loop.set_control_flow(ControlFlow::WaitUntil(Instant::now() + POLL_INTERVAL));

        self.process_timer_messages();
        self.process_store_changes();
        self.process_rewards();
        self.process_menu_events(event_loop);
    }
}

fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    // Logs go to stderr so CLI output stays clean
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(true)
        .with_level(true)
        .init();
}

fn run_tray(app: App, config: &Config) -> Result<(), Box<dyn std::error::Error>> {
    let app = Arc::new(Mutex::new(app));

    // Create event loop (required for tray on macOS)
    let event_loop = EventLoop::new()?;

    let (built_menu, menu_items, icon) = {
        let app = lock(&app);
        let (built_menu, items) = menu::build_menu(&app, Utc::now(), false)?;
        let icon = tray::themed_icon(
            app.settings.theme,
            app.state.mode(),
            app.settings.dark_mode,
        )?;
        (built_menu, items, icon)
    };

    let tray = TrayIconBuilder::new()
        .with_menu(Box::new(built_menu))
        .with_icon(icon)
        .with_title("🍅")
        .with_tooltip("SereneFocus - Pomodoro Timer")
        .build()?;

    let mut serene = SereneFocus::new(app, tray, config);
    serene.menu_items = Some(menu_items);
    serene.refresh();

    info!(data_dir = %config.data_dir.display(), "tray app started");
    event_loop.run_app(&mut serene)?;

    Ok(())
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    init_logging();

    let config = Config::from_env();
    let mut app = App::open(&config)?;

    match cli.command {
        Some(command) => {
            if let Err(e) = cli::run(&mut app, command, &mut io::stdout().lock()) {
                eprintln!("Error: {}", e);
                std::process::exit(1);
            }
            Ok(())
        }
        None => run_tray(app, &config),
    }
}
