//! Terminal rendering of the pool's status lines.

use crate::downloader::PoolMonitor;
use crate::progress::StyleOptions;

use indicatif::{MultiProgress, ProgressBar, ProgressDrawTarget};
use std::collections::HashMap;
use std::time::Duration;

/// Keeps one overview line plus one line per running task on screen.
pub struct ProgressDisplay {
    multi: MultiProgress,
    main: ProgressBar,
    tasks: HashMap<u64, ProgressBar>,
    style_options: StyleOptions,
}

impl ProgressDisplay {
    pub fn new(style_options: StyleOptions) -> Self {
        let multi = match style_options.is_enabled() {
            true => MultiProgress::new(),
            false => MultiProgress::with_draw_target(ProgressDrawTarget::hidden()),
        };
        let main = multi.add(style_options.main().to_progress_bar());

        Self {
            multi,
            main,
            tasks: HashMap::new(),
            style_options,
        }
    }

    /// Samples every running task and redraws. Returns the task lines drawn.
    pub fn render(&mut self, monitor: &PoolMonitor, interval: Duration) -> Vec<String> {
        let active = monitor.active();
        let total = active.len();

        self.main.set_message(format!(
            "{} queued, {} running, {} done",
            monitor.queued(),
            total,
            monitor.completed()
        ));
        self.main.tick();

        let mut lines = Vec::with_capacity(total);
        for (i, progress) in active.iter().enumerate() {
            let line = format!("[{}/{}] {}", i + 1, total, progress.sample(interval));
            let bar = self.tasks.entry(progress.id()).or_insert_with(|| {
                self.multi
                    .add(self.style_options.child().to_progress_bar())
            });
            bar.set_message(line.clone());
            bar.tick();
            lines.push(line);
        }

        let clear = self.style_options.child().clear;
        self.tasks.retain(|id, bar| {
            let running = active.iter().any(|p| p.id() == *id);
            if !running {
                finish_bar(bar, clear);
            }
            running
        });

        lines
    }

    pub fn finish(self) {
        for bar in self.tasks.values() {
            finish_bar(bar, self.style_options.child().clear);
        }
        finish_bar(&self.main, self.style_options.main().clear);
    }
}

fn finish_bar(bar: &ProgressBar, clear: bool) {
    if clear {
        bar.finish_and_clear();
    } else {
        bar.finish();
    }
}
