use chimera::engine::progress::{Progress, ProgressCallback};
use indicatif::{ProgressBar, ProgressDrawTarget, ProgressStyle};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tracing::warn;

const SPINNER_TICK_MS: u64 = 100;

/// What is on screen right now: one bar per phase or task, replaced as the
/// engine moves on.
struct Display {
    bar: ProgressBar,
    hidden: bool,
    phase: Option<&'static str>,
    task: Option<String>,
    phases_done: usize,
}

impl Display {
    fn open_bar(&self, length: Option<u64>) -> ProgressBar {
        let target = if self.hidden {
            ProgressDrawTarget::hidden()
        } else {
            ProgressDrawTarget::stderr()
        };
        ProgressBar::with_draw_target(length, target)
    }

    fn start_phase(&mut self, name: &'static str) {
        self.bar.finish_and_clear();
        let bar = self.open_bar(None).with_style(spinner_style());
        bar.set_prefix(format!("[{}]", self.phases_done + 1));
        bar.set_message(name);
        if !self.hidden {
            bar.enable_steady_tick(Duration::from_millis(SPINNER_TICK_MS));
        }
        self.bar = bar;
        self.phase = Some(name);
        self.task = None;
    }

    fn finish_phase(&mut self) {
        if let Some(name) = self.phase.take() {
            self.phases_done += 1;
            self.bar.println(format!("✓ {}", name));
        }
        self.bar.finish_and_clear();
    }

    fn start_task(&mut self, label: String, total: u64) {
        self.bar.finish_and_clear();
        let bar = self.open_bar(Some(total)).with_style(bar_style());
        bar.set_prefix(self.phase.unwrap_or("").to_string());
        bar.set_message(label.clone());
        self.bar = bar;
        self.task = Some(label);
    }

    fn finish_task(&mut self) {
        let total = self.bar.length().unwrap_or(0);
        if let Some(label) = self.task.take() {
            self.bar
                .println(format!("  {}: {}/{}", label, self.bar.position(), total));
        }
        self.bar.set_position(total);
        self.bar.finish_and_clear();
    }
}

fn spinner_style() -> ProgressStyle {
    ProgressStyle::with_template("{prefix:.dim} {spinner:.green} {msg}")
        .unwrap_or_else(|_| ProgressStyle::default_spinner())
}

fn bar_style() -> ProgressStyle {
    ProgressStyle::with_template(
        "{prefix:.bold} {msg:<16} [{wide_bar:.cyan/blue}] {human_pos}/{human_len} ({per_sec})",
    )
    .unwrap_or_else(|_| ProgressStyle::default_bar())
    .progress_chars("=> ")
}

/// Renders engine [`Progress`] events on stderr with indicatif.
#[derive(Clone)]
pub struct CliProgressHandler {
    display: Arc<Mutex<Display>>,
}

impl CliProgressHandler {
    pub fn new() -> Self {
        Self::build(false)
    }

    fn build(hidden: bool) -> Self {
        let display = Display {
            bar: ProgressBar::hidden(),
            hidden,
            phase: None,
            task: None,
            phases_done: 0,
        };
        Self {
            display: Arc::new(Mutex::new(display)),
        }
    }

    pub fn get_callback(&self) -> ProgressCallback<'static> {
        let display = Arc::clone(&self.display);

        Box::new(move |progress: Progress| {
            let Ok(mut display) = display.lock() else {
                warn!("Progress display mutex was poisoned; dropping event.");
                return;
            };

            match progress {
                Progress::PhaseStart { name } => display.start_phase(name),
                Progress::PhaseFinish => display.finish_phase(),
                Progress::TaskStart { label, total } => display.start_task(label, total),
                Progress::TaskIncrement => display.bar.inc(1),
                Progress::TaskFinish => display.finish_task(),
                Progress::Message(msg) => display.bar.println(format!("  {}", msg)),
            }
        })
    }
}

impl Default for CliProgressHandler {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;

    fn hidden_handler() -> CliProgressHandler {
        CliProgressHandler::build(true)
    }

    #[test]
    fn phases_and_tasks_drive_the_bar() {
        let handler = hidden_handler();
        let callback = handler.get_callback();

        callback(Progress::PhaseStart {
            name: "Pairwise Distances",
        });
        {
            let display = handler.display.lock().unwrap();
            assert_eq!(display.bar.message(), "Pairwise Distances");
            assert_eq!(display.bar.prefix(), "[1]");
            assert_eq!(display.phase, Some("Pairwise Distances"));
        }

        callback(Progress::TaskStart {
            label: "2lueA / MG".to_string(),
            total: 40,
        });
        callback(Progress::TaskIncrement);
        callback(Progress::TaskIncrement);
        {
            let display = handler.display.lock().unwrap();
            assert_eq!(display.bar.length(), Some(40));
            assert_eq!(display.bar.position(), 2);
            assert_eq!(display.bar.message(), "2lueA / MG");
            assert_eq!(display.bar.prefix(), "Pairwise Distances");
        }

        callback(Progress::TaskFinish);
        {
            let display = handler.display.lock().unwrap();
            assert!(display.bar.is_finished());
            assert_eq!(display.bar.position(), 40);
            assert!(display.task.is_none());
        }

        callback(Progress::PhaseFinish);
        let display = handler.display.lock().unwrap();
        assert_eq!(display.phases_done, 1);
        assert!(display.phase.is_none());
    }

    #[test]
    fn second_phase_gets_the_next_number() {
        let handler = hidden_handler();
        let callback = handler.get_callback();
        for name in ["Pairwise Distances", "Overlap Integrals"] {
            callback(Progress::PhaseStart { name });
            callback(Progress::Message(format!("{} running", name)));
            callback(Progress::PhaseFinish);
        }
        callback(Progress::PhaseStart {
            name: "Writing Report",
        });

        let display = handler.display.lock().unwrap();
        assert_eq!(display.phases_done, 2);
        assert_eq!(display.bar.prefix(), "[3]");
    }

    #[test]
    fn events_from_worker_threads_are_counted() {
        let handler = hidden_handler();
        let callback = handler.get_callback();
        callback(Progress::TaskStart {
            label: "overlaps".to_string(),
            total: 8,
        });

        let shared = Arc::new(callback);
        let workers: Vec<_> = (0..4)
            .map(|_| {
                let callback = Arc::clone(&shared);
                thread::spawn(move || {
                    (*callback)(Progress::TaskIncrement);
                    (*callback)(Progress::TaskIncrement);
                })
            })
            .collect();
        for worker in workers {
            worker.join().unwrap();
        }

        let display = handler.display.lock().unwrap();
        assert_eq!(display.bar.position(), 8);
    }
}
