use std::time::{Duration, Instant};
use console::style;
use indicatif::{MultiProgress, ProgressBar, ProgressStyle};
use crate::pipeline::ScanEvent;
use crate::utils::formatting::format_duration;

/// Drives indicatif bars from the events of one running scan.
pub struct ScanProgress {
    multi: MultiProgress,
    phase_bar: Option<ProgressBar>,
    status_bar: ProgressBar,
    items: usize,
    start_time: Instant,
}

impl ScanProgress {
    pub fn new() -> Self {
        let multi = MultiProgress::new();

        let status_bar = multi.add(ProgressBar::new_spinner());
        status_bar.set_style(spinner_style());
        status_bar.set_message("Preparing scan...");
        status_bar.enable_steady_tick(Duration::from_millis(120));

        Self {
            multi,
            phase_bar: None,
            status_bar,
            items: 0,
            start_time: Instant::now(),
        }
    }

    pub fn handle_event(&mut self, event: &ScanEvent) {
        match event {
            ScanEvent::ScanStarted { tool, items, phases } => {
                self.items = *items;
                let bar = self.multi.insert_before(&self.status_bar, ProgressBar::new(*phases as u64));
                bar.set_style(bar_style());
                bar.set_message(format!("{} ({} item{})", tool.display_name(), items, plural(*items)));
                self.phase_bar = Some(bar);
                self.update_status();
            }
            ScanEvent::PhaseStarted { name, .. } => {
                if let Some(bar) = &self.phase_bar {
                    bar.set_message(name.clone());
                }
                self.update_status();
            }
            ScanEvent::PhaseCompleted { .. } => {
                if let Some(bar) = &self.phase_bar {
                    bar.inc(1);
                }
            }
            ScanEvent::Progress { percent, .. } => {
                self.status_bar.set_message(format!(
                    "{} | {}%",
                    format_duration(self.start_time.elapsed().as_millis() as u64),
                    percent
                ));
            }
            ScanEvent::ScanCompleted { records, .. } => {
                if let Some(bar) = self.phase_bar.take() {
                    bar.finish_with_message("All phases complete");
                }
                self.status_bar.finish_with_message(format!(
                    "{} Scan complete: {} record{} in {}",
                    style("✓").green(),
                    records,
                    plural(*records),
                    format_duration(self.start_time.elapsed().as_millis() as u64),
                ));
            }
            ScanEvent::ScanCancelled { .. } => {
                if let Some(bar) = self.phase_bar.take() {
                    bar.abandon_with_message("Cancelled");
                }
                self.status_bar.finish_with_message(format!("{} Scan cancelled", style("✗").yellow()));
            }
        }
    }

    /// Stop the spinner if the scan ended without a terminal event.
    pub fn finish(&mut self) {
        if let Some(bar) = self.phase_bar.take() {
            bar.abandon();
        }
        if !self.status_bar.is_finished() {
            self.status_bar.finish_and_clear();
        }
    }

    fn update_status(&self) {
        self.status_bar.set_message(format!(
            "{} | {} item{}",
            format_duration(self.start_time.elapsed().as_millis() as u64),
            self.items,
            plural(self.items),
        ));
    }
}

impl Default for ScanProgress {
    fn default() -> Self {
        Self::new()
    }
}

fn spinner_style() -> ProgressStyle {
    ProgressStyle::default_spinner()
        .template("  {spinner:.cyan} {msg}")
        .unwrap_or_else(|_| ProgressStyle::default_spinner())
}

fn bar_style() -> ProgressStyle {
    ProgressStyle::default_bar()
        .template("  {bar:30.cyan/dark_gray} {pos}/{len} phases | {msg}")
        .map(|s| s.progress_chars("█▓░"))
        .unwrap_or_else(|_| ProgressStyle::default_bar())
}

fn plural(n: usize) -> &'static str {
    if n == 1 { "" } else { "s" }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ToolKind;

    #[test]
    fn test_events_drive_bars_to_completion() {
        let mut progress = ScanProgress::new();
        let tool = ToolKind::CallTracer;
        progress.handle_event(&ScanEvent::ScanStarted { tool, items: 2, phases: 3 });
        assert_eq!(progress.items, 2);
        for index in 0..3 {
            let name = format!("phase {}", index);
            progress.handle_event(&ScanEvent::PhaseStarted { tool, index, name: name.clone() });
            progress.handle_event(&ScanEvent::PhaseCompleted { tool, index, name });
        }
        assert_eq!(progress.phase_bar.as_ref().map(|b| b.position()), Some(3));
        progress.handle_event(&ScanEvent::ScanCompleted { tool, session_id: "s".into(), records: 2 });
        assert!(progress.phase_bar.is_none());
        assert!(progress.status_bar.is_finished());
    }
}
