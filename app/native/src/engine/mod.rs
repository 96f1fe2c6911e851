//! The running ZoneSnap service.
//!
//! [`ZoneSnap`] owns the shared components (zone registry, state tracker, snap
//! executor, overlay, hotkey dispatcher) and, once started, four background
//! loops:
//!
//! - `drag`: polls the drag state machine every 10 ms.
//! - `drift`: restores snapped windows that were moved by hand.
//! - `events`: handles keyboard and mouse events from the platform hook.
//! - `config-watcher`: reloads when the configuration file changes.
//!
//! Every loop catches panics per iteration and keeps going until
//! [`ZoneSnap::stop`] is called.

mod actions;
pub mod events;

use std::panic::{AssertUnwindSafe, catch_unwind};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread::{self, JoinHandle};
use std::time::Duration;

pub use actions::CYCLE_TOLERANCE;
pub use events::{EventHandle, InputEvent};
use parking_lot::{Mutex, RwLock};

use crate::config::{self, Settings, watch_config_file};
use crate::error::ZoneSnapError;
use crate::input::{InputState, MonitorKeys};
use crate::platform::Platform;
use crate::snap::drag::{KEY_SNAP_DEBOUNCE, POLL_INTERVAL};
use crate::snap::{
    DragCommand, DragHandle, DragMachine, DragParts, DragSettings, HotkeyDispatcher, HotkeyMap,
    OverlayController, SnapExecutor, TickOutcome,
};
use crate::tracker::{TrackerSettings, WindowStateTracker};
use crate::utils::thread::{panic_message, spawn_named_thread};
use crate::zones::{ZoneRegistry, ZoneSnapshot};

/// The zone-snapping service.
pub struct ZoneSnap {
    platform: Platform,
    settings: Arc<RwLock<Settings>>,
    config_path: Option<PathBuf>,
    registry: Arc<ZoneRegistry>,
    tracker: Arc<WindowStateTracker>,
    executor: Arc<SnapExecutor>,
    overlay: Arc<OverlayController>,
    hotkeys: Mutex<HotkeyDispatcher>,
    drag: Mutex<Option<DragHandle>>,
    events: Mutex<Option<EventHandle>>,
    running: Arc<AtomicBool>,
    threads: Mutex<Vec<JoinHandle<()>>>,
}

impl std::fmt::Debug for ZoneSnap {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ZoneSnap")
            .field("config_path", &self.config_path)
            .field("running", &self.is_running())
            .finish_non_exhaustive()
    }
}

impl ZoneSnap {
    /// Builds the service for already validated settings.
    ///
    /// # Errors
    ///
    /// Returns the native error if monitors cannot be detected.
    pub fn new(platform: Platform, settings: Settings) -> Result<Self, ZoneSnapError> {
        let monitors = platform.detect_monitors()?;
        let registry = Arc::new(ZoneRegistry::new(
            monitors,
            settings.layouts.clone(),
            &settings.initial_layout,
        ));
        let tracker = Arc::new(WindowStateTracker::new(
            Arc::clone(&platform.windows),
            TrackerSettings::from(&settings.hotkeys.state_tracking),
        ));
        let executor =
            Arc::new(SnapExecutor::new(Arc::clone(&platform.windows), Arc::clone(&tracker)));
        let overlay =
            Arc::new(OverlayController::new(Arc::clone(&platform.overlay), settings.overlay.clone()));
        let hotkeys = HotkeyDispatcher::new(HotkeyMap::from_config(&settings.hotkeys));

        tracing::debug!(
            layout = %settings.initial_layout,
            zones = registry.snapshot().zone_count(),
            hotkeys = hotkeys.map().len(),
            "engine created"
        );

        Ok(Self {
            platform,
            settings: Arc::new(RwLock::new(settings)),
            config_path: None,
            registry,
            tracker,
            executor,
            overlay,
            hotkeys: Mutex::new(hotkeys),
            drag: Mutex::new(None),
            events: Mutex::new(None),
            running: Arc::new(AtomicBool::new(false)),
            threads: Mutex::new(Vec::new()),
        })
    }

    /// Loads the configuration file (searched for when `path` is `None`) and
    /// builds the service. Reloads read the same file.
    ///
    /// # Errors
    ///
    /// Returns a configuration error if no valid file is found, or the native
    /// error if monitors cannot be detected.
    pub fn from_config_file(platform: Platform, path: Option<&Path>) -> Result<Self, ZoneSnapError> {
        let (settings, path) = config::load_settings(path)?;
        Ok(Self::new(platform, settings)?.with_config_path(path))
    }

    /// Sets the file read by [`ZoneSnap::reload`] and watched once started.
    #[must_use]
    pub fn with_config_path(mut self, path: PathBuf) -> Self {
        self.config_path = Some(path);
        self
    }

    /// Overrides the pause between ending a native drag and moving the window.
    #[must_use]
    pub fn with_snap_settle(mut self, settle: Duration) -> Self {
        self.executor = Arc::new(
            SnapExecutor::new(Arc::clone(&self.platform.windows), Arc::clone(&self.tracker))
                .with_settle(settle),
        );
        self
    }

    #[must_use]
    pub fn snapshot(&self) -> Arc<ZoneSnapshot> { self.registry.snapshot() }

    #[must_use]
    pub const fn registry(&self) -> &Arc<ZoneRegistry> { &self.registry }

    #[must_use]
    pub const fn tracker(&self) -> &Arc<WindowStateTracker> { &self.tracker }

    #[must_use]
    pub const fn overlay(&self) -> &Arc<OverlayController> { &self.overlay }

    #[must_use]
    pub const fn platform(&self) -> &Platform { &self.platform }

    #[must_use]
    pub fn config_path(&self) -> Option<&Path> { self.config_path.as_deref() }

    /// Returns a copy of the settings in effect.
    #[must_use]
    pub fn settings(&self) -> Settings { self.settings.read().clone() }

    #[must_use]
    pub fn is_running(&self) -> bool { self.running.load(Ordering::SeqCst) }

    /// Builds a drag state machine wired to this service.
    ///
    /// The machine's handle replaces the one scroll and secondary-click
    /// events are forwarded to, so embedders can drive the machine from
    /// their own loop instead of calling [`ZoneSnap::start`].
    pub fn new_drag_machine(&self) -> DragMachine {
        let (drag_settings, monitor_keys) = {
            let settings = self.settings.read();
            (
                DragSettings::from_config(&settings.hotkeys),
                MonitorKeys::compile(&settings.hotkeys.monitor_keys),
            )
        };

        let parts = DragParts {
            registry: Arc::clone(&self.registry),
            windows: Arc::clone(&self.platform.windows),
            input: InputState::new(Arc::clone(&self.platform.input), monitor_keys),
            executor: Arc::clone(&self.executor),
            overlay: Arc::clone(&self.overlay),
        };
        let (machine, handle) = DragMachine::new(parts, drag_settings);
        *self.drag.lock() = Some(handle);
        machine
    }

    /// Starts the background loops.
    ///
    /// # Errors
    ///
    /// Returns [`ZoneSnapError::AlreadyRunning`] if the service was started
    /// before and not stopped.
    pub fn start(self: &Arc<Self>) -> Result<(), ZoneSnapError> {
        if self.running.swap(true, Ordering::SeqCst) {
            return Err(ZoneSnapError::AlreadyRunning);
        }

        let mut threads = self.threads.lock();

        let machine = self.new_drag_machine();
        let running = Arc::clone(&self.running);
        threads.extend(spawn_named_thread("drag", move || run_drag_loop(machine, &running)));

        let tracker = Arc::clone(&self.tracker);
        let settings = Arc::clone(&self.settings);
        let running = Arc::clone(&self.running);
        threads.extend(spawn_named_thread("drift", move || {
            run_drift_loop(&tracker, &settings, &running);
        }));

        if let Some((handle, thread)) = events::spawn_listener(Arc::clone(self)) {
            *self.events.lock() = Some(handle);
            threads.push(thread);
        }

        if let Some(path) = self.config_path.clone() {
            let engine = Arc::downgrade(self);
            watch_config_file(path, Arc::clone(&self.running), move || {
                if let Some(engine) = engine.upgrade()
                    && let Err(err) = engine.reload()
                {
                    tracing::warn!(error = %err, "reload failed, keeping previous configuration");
                }
            });
        }

        tracing::info!(threads = threads.len(), "zonesnap started");
        Ok(())
    }

    /// Stops the background loops and waits for them to exit.
    pub fn stop(&self) {
        if !self.running.swap(false, Ordering::SeqCst) {
            return;
        }

        if let Some(events) = self.events.lock().take() {
            events.shutdown();
        }
        self.drag.lock().take();

        let threads = std::mem::take(&mut *self.threads.lock());
        for thread in threads {
            let name = thread.thread().name().unwrap_or("unnamed").to_string();
            if thread.join().is_err() {
                tracing::warn!(thread = %name, "background thread panicked");
            }
        }

        self.overlay.hide();
        tracing::info!("zonesnap stopped");
    }

    /// Delivers an input event: queued to the listener when running,
    /// handled inline otherwise.
    ///
    /// # Errors
    ///
    /// Returns [`ZoneSnapError::EventChannelClosed`] if the listener queue
    /// rejects the event.
    pub fn dispatch(&self, event: InputEvent) -> Result<(), ZoneSnapError> {
        let events = self.events.lock().clone();
        match events {
            Some(handle) => handle.send(event),
            None => {
                self.handle_event(event);
                Ok(())
            }
        }
    }

    /// Handles one input event on the calling thread.
    pub fn handle_event(&self, event: InputEvent) {
        match event {
            InputEvent::Key { key, pressed: true } => {
                let action = self.hotkeys.lock().key_down(key);
                if let Some(action) = action
                    && let Err(err) = self.execute_action(&action)
                {
                    tracing::warn!(action = %action, error = %err, "hotkey action failed");
                }
            }
            InputEvent::Key { key, pressed: false } => self.hotkeys.lock().key_up(key),
            InputEvent::Scroll { point, delta } => self.send_drag(DragCommand::Scroll { point, delta }),
            InputEvent::SecondaryClick { .. } => self.send_drag(DragCommand::SecondaryClick),
        }
    }

    fn send_drag(&self, command: DragCommand) {
        match self.drag.lock().as_ref() {
            Some(handle) => {
                if let Err(err) = handle.send(command) {
                    tracing::debug!(error = %err, "drag machine is gone");
                }
            }
            None => tracing::trace!("no drag machine, dropping event"),
        }
    }

    /// Reloads the configuration file, or re-applies the current settings
    /// when the service was built without one. On error nothing changes.
    ///
    /// # Errors
    ///
    /// Returns the configuration or native error that prevented the reload.
    pub fn reload(&self) -> Result<(), ZoneSnapError> {
        let settings = match &self.config_path {
            Some(path) => Settings::load(path)?,
            None => self.settings(),
        };
        self.reload_with(settings)
    }

    /// Applies new settings: re-detects monitors, re-resolves zones, resets
    /// per-monitor layout overrides and rebuilds hotkeys and drag settings.
    ///
    /// # Errors
    ///
    /// Returns the native error if monitors cannot be detected; nothing is
    /// changed in that case.
    pub fn reload_with(&self, settings: Settings) -> Result<(), ZoneSnapError> {
        let monitors = self.platform.detect_monitors()?;

        let snapshot =
            self.registry.reconfigure(monitors, settings.layouts.clone(), &settings.initial_layout);
        self.tracker.configure(TrackerSettings::from(&settings.hotkeys.state_tracking));
        self.overlay.set_style(settings.overlay.clone());
        self.overlay.refresh(&snapshot);
        self.hotkeys.lock().set_map(HotkeyMap::from_config(&settings.hotkeys));
        self.send_drag(DragCommand::Reconfigure {
            settings: DragSettings::from_config(&settings.hotkeys),
            monitor_keys: MonitorKeys::compile(&settings.hotkeys.monitor_keys),
        });

        tracing::info!(
            layout = %settings.initial_layout,
            layouts = settings.layouts.len(),
            zones = snapshot.zone_count(),
            "configuration reloaded"
        );
        *self.settings.write() = settings;
        Ok(())
    }

    /// Re-detects monitors and re-resolves zones, keeping layout selections
    /// of monitors that still exist.
    ///
    /// # Errors
    ///
    /// Returns the native error if monitors cannot be detected.
    pub fn redetect_monitors(&self) -> Result<Arc<ZoneSnapshot>, ZoneSnapError> {
        let monitors = self.platform.detect_monitors()?;
        let snapshot = self.registry.replace_monitors(monitors);
        self.overlay.refresh(&snapshot);
        tracing::info!(monitors = snapshot.monitors.len(), "monitors re-detected");
        Ok(snapshot)
    }
}

fn run_drag_loop(mut machine: DragMachine, running: &AtomicBool) {
    tracing::trace!("drag loop starting");

    while running.load(Ordering::SeqCst) {
        let pause = match catch_unwind(AssertUnwindSafe(|| machine.tick())) {
            Ok(TickOutcome::KeySnapped(_)) => KEY_SNAP_DEBOUNCE,
            Ok(_) => POLL_INTERVAL,
            Err(panic) => {
                tracing::error!(panic = %panic_message(&*panic), "drag tick panicked, continuing");
                POLL_INTERVAL
            }
        };
        thread::sleep(pause);
    }

    tracing::debug!("drag loop stopped");
}

fn run_drift_loop(tracker: &WindowStateTracker, settings: &RwLock<Settings>, running: &AtomicBool) {
    tracing::trace!("drift loop starting");

    while running.load(Ordering::SeqCst) {
        let result = catch_unwind(AssertUnwindSafe(|| {
            tracker.check_drift();
            tracker.prune_stale();
        }));
        if let Err(panic) = result {
            tracing::error!(panic = %panic_message(&*panic), "drift check panicked, continuing");
        }

        let interval = settings.read().hotkeys.state_tracking.monitoring_interval();
        thread::sleep(interval.max(Duration::from_millis(10)));
    }

    tracing::debug!("drift loop stopped");
}
