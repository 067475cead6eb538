use crate::progress::Progress;
use core::fmt::{Debug, Formatter};
use core::sync::atomic::{AtomicBool, Ordering};
use core::time::Duration;
use indicatif::{ProgressBar, ProgressDrawTarget, ProgressStyle};
use std::sync::{Arc, Mutex};
use std::time::Instant;
use tokio::task::JoinHandle;

type StatusCallback = Box<dyn Fn() -> (u64, u64, String) + Send + Sync>;

/// Refresh rate for progress updates (10 Hz).
const REFRESH_INTERVAL: Duration = Duration::from_millis(100);

const BAR_TEMPLATE: &str = "{prefix:>12.bold.cyan} [{bar:25}] {msg}";
const BAR_TEMPLATE_NO_COLOR: &str = "{prefix:>12} [{bar:25}] {msg}";
const SPINNER_TEMPLATE: &str = "{prefix:>12.bold.cyan} {spinner} {msg}";
const SPINNER_TEMPLATE_NO_COLOR: &str = "{prefix:>12} {spinner} {msg}";

/// Shared between the reporter and its refresh task.
struct Shared {
    visible_after: Instant,
    visible: AtomicBool,
    spinning: AtomicBool,
    phase_started: Mutex<Instant>,
    status: Mutex<StatusCallback>,
}

/// A progress indicator on stderr that stays hidden for short operations.
///
/// Nothing is drawn until the configured delay has passed, so quick local runs
/// print only their reports while slow downloads and polling show a live status.
#[derive(Clone)]
pub struct ProgressReporter {
    bar: ProgressBar,
    shared: Arc<Shared>,
    refresh_task: Arc<JoinHandle<()>>,
    use_colors: bool,
}

impl ProgressReporter {
    /// Create a new progress reporter that becomes visible after `delay`.
    ///
    /// Must be called from within a tokio runtime.
    #[must_use]
    pub fn new(delay: Duration, use_colors: bool) -> Self {
        let bar = ProgressBar::with_draw_target(None, ProgressDrawTarget::hidden());

        let shared = Arc::new(Shared {
            visible_after: Instant::now() + delay,
            visible: AtomicBool::new(false),
            spinning: AtomicBool::new(false),
            phase_started: Mutex::new(Instant::now()),
            status: Mutex::new(Box::new(|| (0, 0, String::new()))),
        });

        Self {
            refresh_task: Arc::new(tokio::spawn(refresh_task(bar.clone(), Arc::clone(&shared)))),
            bar,
            shared,
            use_colors,
        }
    }

    /// Run `f` with the indicator temporarily cleared.
    pub fn suspend<F: FnOnce() -> R, R>(&self, f: F) -> R {
        self.bar.suspend(f)
    }

    fn template(&self, colored: &'static str, plain: &'static str) -> &'static str {
        if self.use_colors { colored } else { plain }
    }
}

impl Progress for ProgressReporter {
    fn set_phase(&self, phase: &str) {
        self.bar.set_prefix(phase.to_string());
        *self.shared.phase_started.lock().expect("lock poisoned") = Instant::now();
    }

    fn set_determinate(&self, callback: Box<dyn Fn() -> (u64, u64, String) + Send + Sync + 'static>) {
        *self.shared.status.lock().expect("lock poisoned") = callback;
        self.shared.spinning.store(false, Ordering::Relaxed);
        self.bar.disable_steady_tick();
        self.bar.set_length(0);
        self.bar.set_position(0);
        self.bar.set_style(
            ProgressStyle::default_bar()
                .template(self.template(BAR_TEMPLATE, BAR_TEMPLATE_NO_COLOR))
                .expect("could not create progress bar style")
                .progress_chars("=> "),
        );
    }

    fn set_indeterminate(&self, callback: Box<dyn Fn() -> String + Send + Sync + 'static>) {
        *self.shared.status.lock().expect("lock poisoned") = Box::new(move || (0, 0, callback()));
        self.shared.spinning.store(true, Ordering::Relaxed);
        self.bar.enable_steady_tick(REFRESH_INTERVAL);
        self.bar.set_style(
            ProgressStyle::default_spinner()
                .template(self.template(SPINNER_TEMPLATE, SPINNER_TEMPLATE_NO_COLOR))
                .expect("could not create progress bar style")
                .tick_chars("-\\|/ "),
        );
    }

    fn done(&self) {
        self.refresh_task.abort();
        if self.shared.visible.load(Ordering::Relaxed) {
            self.bar.finish_and_clear();
        }
    }
}

impl Debug for ProgressReporter {
    fn fmt(&self, f: &mut Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("ProgressReporter")
            .field("bar", &self.bar)
            .field("visible", &self.shared.visible)
            .field("use_colors", &self.use_colors)
            .finish_non_exhaustive()
    }
}

/// Background task that reveals the bar once the delay passes and keeps its status current.
async fn refresh_task(bar: ProgressBar, shared: Arc<Shared>) {
    let mut interval = tokio::time::interval(REFRESH_INTERVAL);
    #[expect(clippy::infinite_loop, reason = "task runs until aborted")]
    loop {
        let _ = interval.tick().await;

        if !shared.visible.load(Ordering::Relaxed) {
            if Instant::now() < shared.visible_after {
                continue;
            }
            shared.visible.store(true, Ordering::Relaxed);
            bar.set_draw_target(ProgressDrawTarget::stderr_with_hz(10));
        }

        let (length, position, mut message) = {
            let status = shared.status.lock().expect("lock poisoned");
            status()
        };

        if shared.spinning.load(Ordering::Relaxed) {
            let elapsed = shared.phase_started.lock().expect("lock poisoned").elapsed().as_secs();
            message = format!("{elapsed}s: {message}");
        }

        if length > 0 {
            bar.set_length(length);
            bar.set_position(position);
        }
        bar.set_message(message);
    }
}
