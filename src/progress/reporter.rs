//! Periodic progress reporting.
//!
//! The reporter wakes every `interval`, samples the pool through its
//! [`PoolMonitor`], and redraws. It only reads task state.

use super::display::ProgressDisplay;
use super::StyleOptions;
use crate::downloader::PoolMonitor;

use std::time::Duration;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{debug, error};

const MIN_INTERVAL: Duration = Duration::from_millis(10);

/// Handle on a running progress reporter.
#[derive(Debug)]
pub struct ProgressReporter {
    stop: oneshot::Sender<()>,
    handle: JoinHandle<()>,
}

impl ProgressReporter {
    /// Spawns the reporting loop on the current runtime.
    pub fn start(monitor: PoolMonitor, interval: Duration, style_options: StyleOptions) -> Self {
        let (stop, mut stopped) = oneshot::channel();
        let interval = interval.max(MIN_INTERVAL);

        let handle = tokio::spawn(async move {
            let mut display = ProgressDisplay::new(style_options);
            let mut ticker = tokio::time::interval(interval);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

            loop {
                tokio::select! {
                    _ = &mut stopped => break,
                    _ = ticker.tick() => {
                        for line in display.render(&monitor, interval) {
                            debug!("{}", line);
                        }
                    }
                }
            }
            display.finish();
        });

        Self { stop, handle }
    }

    /// Stops reporting and clears the task lines.
    pub async fn stop(self) {
        let _ = self.stop.send(());
        if let Err(e) = self.handle.await {
            error!("Progress reporter failed: {}", e);
        }
    }
}
