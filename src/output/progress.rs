//! Terminal feedback while evaluations run

use crate::error::ResumeCartError;
use crate::llm::retry::{LogObserver, RetryObserver, RetryState};
use crate::processing::batch::{BatchObserver, BatchRow};
use colored::Colorize;
use indicatif::{MultiProgress, ProgressBar, ProgressDrawTarget, ProgressStyle};
use std::sync::Mutex;
use std::time::Duration;

/// Prints quota warnings, shows a spinner during backoff and a bar across a batch.
///
/// Both bars share one `MultiProgress`, so a backoff inside a batch draws below the batch bar.
pub struct ConsoleObserver {
    use_colors: bool,
    bars: MultiProgress,
    spinner: Mutex<Option<ProgressBar>>,
    batch_bar: Mutex<Option<ProgressBar>>,
}

impl ConsoleObserver {
    pub fn new(use_colors: bool) -> Self {
        Self::with_draw_target(use_colors, ProgressDrawTarget::stderr())
    }

    fn with_draw_target(use_colors: bool, target: ProgressDrawTarget) -> Self {
        Self {
            use_colors,
            bars: MultiProgress::with_draw_target(target),
            spinner: Mutex::new(None),
            batch_bar: Mutex::new(None),
        }
    }

    fn print(&self, message: String) {
        if self.bars.is_hidden() || self.bars.println(&message).is_err() {
            println!("{}", message);
        }
    }

    fn warn(&self, message: &str) {
        if self.use_colors {
            self.print(message.yellow().to_string());
        } else {
            self.print(message.to_string());
        }
    }

    fn start_spinner(&self, delay: Duration) {
        let spinner = self.bars.add(ProgressBar::new_spinner());
        if let Ok(style) = ProgressStyle::with_template("{spinner:.green} {msg} [{elapsed}]") {
            spinner.set_style(style.tick_chars("⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏"));
        }
        spinner.set_message(format!("⏳ Waiting for {} seconds...", delay.as_secs()));
        spinner.enable_steady_tick(Duration::from_millis(80));

        if let Ok(mut slot) = self.spinner.lock() {
            *slot = Some(spinner);
        }
    }

    fn stop_spinner(&self) {
        if let Some(spinner) = self.spinner.lock().ok().and_then(|mut slot| slot.take()) {
            spinner.finish_and_clear();
            self.bars.remove(&spinner);
        }
    }
}

impl RetryObserver for ConsoleObserver {
    fn on_transition(&self, state: &RetryState, max_attempts: u32) {
        LogObserver.on_transition(state, max_attempts);

        match state {
            RetryState::Attempting { attempt } if *attempt > 1 => {
                self.stop_spinner();
                self.print(format!("🔁 Retrying (attempt {}/{})", attempt, max_attempts));
            }
            RetryState::WaitingBackoff { attempt, delay } => {
                self.warn(&format!(
                    "⚠️  Quota limit reached (Attempt {}/{}). Retrying in {} seconds...",
                    attempt,
                    max_attempts,
                    delay.as_secs()
                ));
                self.start_spinner(*delay);
            }
            RetryState::FailedTerminal { attempt, error } => {
                self.stop_spinner();
                if matches!(error, ResumeCartError::QuotaExhausted { .. }) {
                    self.warn(&format!(
                        "⚠️  Quota limit reached (Attempt {}/{}).",
                        attempt, max_attempts
                    ));
                    let message = "❌ Failed after maximum retry attempts due to quota exhaustion.";
                    if self.use_colors {
                        self.print(message.red().to_string());
                    } else {
                        self.print(message.to_string());
                    }
                }
            }
            RetryState::Succeeded { .. } => self.stop_spinner(),
            _ => {}
        }
    }
}

impl BatchObserver for ConsoleObserver {
    fn on_document_started(&self, index: usize, total: usize, source_name: &str) {
        if let Ok(mut slot) = self.batch_bar.lock() {
            let bar = slot.get_or_insert_with(|| {
                let bar = self.bars.add(ProgressBar::new(total as u64));
                if let Ok(style) = ProgressStyle::with_template(
                    "{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} {msg}",
                ) {
                    bar.set_style(style.progress_chars("#>-"));
                }
                bar
            });
            bar.set_position(index as u64);
            bar.set_message(source_name.to_string());
        }
    }

    fn on_document_finished(&self, row: &BatchRow) {
        let finished = match self.batch_bar.lock() {
            Ok(slot) => match slot.as_ref() {
                Some(bar) => {
                    bar.inc(1);
                    bar.position() >= bar.length().unwrap_or(0)
                }
                None => false,
            },
            Err(_) => false,
        };

        if row.is_failed() {
            self.warn(&format!("⚠️  {}: {}", row.source_name, row.missing_keywords()));
        }

        if finished {
            if let Some(bar) = self.batch_bar.lock().ok().and_then(|mut slot| slot.take()) {
                bar.finish_and_clear();
                self.bars.remove(&bar);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::interpreter::InterpretedMatch;

    fn hidden() -> ConsoleObserver {
        ConsoleObserver::with_draw_target(false, ProgressDrawTarget::hidden())
    }

    fn has_spinner(observer: &ConsoleObserver) -> bool {
        observer.spinner.lock().unwrap().is_some()
    }

    fn has_batch_bar(observer: &ConsoleObserver) -> bool {
        observer.batch_bar.lock().unwrap().is_some()
    }

    #[test]
    fn test_backoff_inside_batch_keeps_batch_bar() {
        let observer = hidden();
        observer.on_document_started(0, 2, "a.pdf");
        observer.on_transition(
            &RetryState::WaitingBackoff {
                attempt: 1,
                delay: Duration::from_secs(5),
            },
            3,
        );
        assert!(has_spinner(&observer));
        assert!(has_batch_bar(&observer));

        observer.on_transition(&RetryState::Attempting { attempt: 2 }, 3);
        assert!(!has_spinner(&observer));
        assert!(has_batch_bar(&observer));
    }

    #[test]
    fn test_batch_bar_cleared_after_last_document() {
        let observer = hidden();
        observer.on_document_started(0, 2, "a.pdf");
        observer.on_document_finished(&BatchRow::evaluated("a.pdf", InterpretedMatch::default()));
        assert!(has_batch_bar(&observer));

        observer.on_document_started(1, 2, "b.pdf");
        observer.on_document_finished(&BatchRow::failed("b.pdf", "boom"));
        assert!(!has_batch_bar(&observer));
    }

    #[test]
    fn test_terminal_quota_stops_spinner() {
        let observer = hidden();
        observer.on_transition(
            &RetryState::WaitingBackoff {
                attempt: 2,
                delay: Duration::from_secs(1),
            },
            3,
        );
        observer.on_transition(
            &RetryState::FailedTerminal {
                attempt: 3,
                error: ResumeCartError::QuotaExhausted {
                    message: "exhausted".into(),
                    retry_delay: None,
                },
            },
            3,
        );
        assert!(!has_spinner(&observer));
    }
}
