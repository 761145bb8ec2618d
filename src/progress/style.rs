//! Progress line styling and configuration options.
//!
//! Progress is shown as status lines rather than bars: one overview line for
//! the pool and one line per running task, each refreshed by the progress
//! reporter.
//!
//! # Examples
//!
//! ```rust
//! use hubfetch::progress::{StyleOptions, ProgressBarOpts};
//!
//! let custom_style = StyleOptions::new(
//!     ProgressBarOpts::new(Some("{spinner:.blue} {msg:.bold}".to_string()), None, true, false),
//!     ProgressBarOpts::new(Some("  {spinner} {msg}".to_string()), Some("|/-\\ ".to_string()), true, true),
//! );
//! assert!(custom_style.is_enabled());
//! ```

use indicatif::{ProgressBar, ProgressStyle};
use tracing::warn;

/// Define the downloader style options.
///
/// By default, the overview line stays on the screen upon completion, but
/// the per-task lines are cleared once their task finishes.
#[derive(Debug, Clone)]
pub struct StyleOptions {
    /// Style options for the overview line.
    pub(crate) main: ProgressBarOpts,
    /// Style options for the per-task lines.
    pub(crate) child: ProgressBarOpts,
}

impl Default for StyleOptions {
    fn default() -> Self {
        Self {
            main: ProgressBarOpts {
                template: Some(ProgressBarOpts::TEMPLATE_OVERVIEW.into()),
                tick_chars: None,
                enabled: true,
                clear: false,
            },
            child: ProgressBarOpts {
                template: Some(ProgressBarOpts::TEMPLATE_TASK.into()),
                tick_chars: Some(ProgressBarOpts::TICKS_DOTS.into()),
                enabled: true,
                clear: true,
            },
        }
    }
}

impl StyleOptions {
    /// Create new [`StyleOptions`].
    pub fn new(main: ProgressBarOpts, child: ProgressBarOpts) -> Self {
        Self { main, child }
    }

    /// Return `false` if neither the overview nor the task lines are enabled.
    pub fn is_enabled(&self) -> bool {
        self.main.enabled || self.child.enabled
    }

    pub fn main(&self) -> &ProgressBarOpts {
        &self.main
    }

    pub fn child(&self) -> &ProgressBarOpts {
        &self.child
    }
}

/// Define the options for one status line.
#[derive(Debug, Clone)]
pub struct ProgressBarOpts {
    /// Line template, see [`indicatif::ProgressStyle::with_template`].
    template: Option<String>,
    /// Spinner frames; the last one is shown once finished.
    tick_chars: Option<String>,
    /// Enable or disable the line.
    pub(crate) enabled: bool,
    /// Clear the line once completed.
    pub(crate) clear: bool,
}

impl Default for ProgressBarOpts {
    fn default() -> Self {
        Self {
            template: None,
            tick_chars: None,
            enabled: true,
            clear: true,
        }
    }
}

impl ProgressBarOpts {
    /// `⠋ 3 queued, 2 running, 5 done`
    pub const TEMPLATE_OVERVIEW: &'static str = "{spinner:.blue} {msg:.bold}";
    /// `  ⠙ [1/2] Downloading S3A_SL_2_LST.zip of size 1.20 GiB: 42.0% (8.31 MiB/sec)`
    pub const TEMPLATE_TASK: &'static str = "  {spinner:.green} {msg}";
    pub const TICKS_DOTS: &'static str = "⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏✓";

    /// Create a new [`ProgressBarOpts`].
    pub fn new(
        template: Option<String>,
        tick_chars: Option<String>,
        enabled: bool,
        clear: bool,
    ) -> Self {
        Self {
            template,
            tick_chars,
            enabled,
            clear,
        }
    }

    /// Create a [`ProgressStyle`] based on the provided options.
    ///
    /// An invalid template falls back to the plain spinner style.
    pub fn to_progress_style(&self) -> ProgressStyle {
        let mut style = match self.template {
            Some(ref template) => ProgressStyle::with_template(template).unwrap_or_else(|e| {
                warn!("Invalid progress template {:?}: {}", template, e);
                ProgressStyle::default_spinner()
            }),
            None => ProgressStyle::default_spinner(),
        };
        if let Some(ref tick_chars) = self.tick_chars {
            style = style.tick_chars(tick_chars);
        }
        style
    }

    /// Create a spinner [`ProgressBar`], hidden when disabled.
    pub fn to_progress_bar(&self) -> ProgressBar {
        if !self.enabled {
            return ProgressBar::hidden();
        }
        ProgressBar::new_spinner().with_style(self.to_progress_style())
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Set to `true` to clear the line upon completion.
    pub fn set_clear(&mut self, clear: bool) {
        self.clear = clear;
    }

    /// Create a new [`ProgressBarOpts`] which hides the line.
    pub fn hidden() -> Self {
        Self {
            enabled: false,
            ..ProgressBarOpts::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hidden_options() {
        let style = StyleOptions::new(ProgressBarOpts::hidden(), ProgressBarOpts::hidden());
        assert!(!style.is_enabled());
        assert!(style.main().to_progress_bar().is_hidden());
    }

    #[test]
    fn test_overview_line_kept_on_completion() {
        let style = StyleOptions::default();
        assert!(!style.main().clear);
        assert!(style.child().clear);

        let mut child = style.child().clone();
        child.set_clear(false);
        let style = StyleOptions::new(style.main().clone(), child);
        assert!(!style.child().clear);
    }

    #[test]
    fn test_invalid_template_falls_back() {
        let opts = ProgressBarOpts::new(Some("{msg".into()), None, true, true);
        let bar = opts.to_progress_bar();
        bar.set_message("still renders");
        assert_eq!(bar.message(), "still renders");
    }
}
