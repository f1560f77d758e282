use std::{
    path::Path,
    sync::{
        Arc,
        atomic::{AtomicBool, Ordering},
    },
};

use indicatif::ProgressBar;
use tracing::info;

use crate::{
    errors::AppError,
    translators::{TranslationResult, Translator},
    workbooks::{self, SourceRow},
};

/// Set from the foreground, polled by the worker between rows.
#[derive(Debug, Clone, Default)]
pub struct CancellationFlag(Arc<AtomicBool>);

impl CancellationFlag {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::Release);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Acquire)
    }

    fn reset(&self) {
        self.0.store(false, Ordering::Release);
    }
}

/// Process-wide state shared between the foreground and the batch worker.
#[derive(Debug, Clone, Default)]
pub struct RunSession {
    cancel: CancellationFlag,
    running: Arc<AtomicBool>,
}

impl RunSession {
    pub fn new() -> Self {
        Self::default()
    }

    /// Starts a run: clears the cancellation flag and refuses a second
    /// concurrent run.
    pub fn begin(&self) -> Result<RunGuard, AppError> {
        self.running
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .map_err(|_| AppError::AlreadyRunning)?;
        self.cancel.reset();

        Ok(RunGuard {
            running: Arc::clone(&self.running),
            cancel: self.cancel.clone(),
        })
    }

    /// Returns false when there is no run to abort.
    pub fn request_abort(&self) -> bool {
        if !self.is_running() {
            return false;
        }
        self.cancel.cancel();
        true
    }

    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::Acquire)
    }

    pub fn cancel_flag(&self) -> CancellationFlag {
        self.cancel.clone()
    }
}

/// Marks the session as running until dropped.
#[derive(Debug)]
pub struct RunGuard {
    running: Arc<AtomicBool>,
    cancel: CancellationFlag,
}

impl RunGuard {
    pub fn cancel_flag(&self) -> &CancellationFlag {
        &self.cancel
    }
}

impl Drop for RunGuard {
    fn drop(&mut self) {
        self.running.store(false, Ordering::Release);
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputRow {
    pub product_code: String,
    pub result: TranslationResult,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BatchOutcome {
    Completed(Vec<OutputRow>),
    /// Rows translated before the abort are dropped.
    Cancelled,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchReport {
    pub outcome: BatchOutcome,
    /// 1-based sheet rows dropped for a missing code or description.
    pub skipped_rows: Vec<u32>,
}

impl BatchReport {
    pub fn failed_count(&self) -> usize {
        match &self.outcome {
            BatchOutcome::Completed(rows) => rows.iter().filter(|r| r.result.is_failed()).count(),
            BatchOutcome::Cancelled => 0,
        }
    }

    pub fn translated_count(&self) -> usize {
        match &self.outcome {
            BatchOutcome::Completed(rows) => rows.len() - self.failed_count(),
            BatchOutcome::Cancelled => 0,
        }
    }
}

pub async fn run_batch<T: Translator + ?Sized>(
    source: &Path,
    translator: &T,
    run: &RunGuard,
    pb: &ProgressBar,
) -> Result<BatchReport, AppError> {
    let table = workbooks::read_rows(source)?;
    info!(
        rows = table.rows.len(),
        skipped = table.skipped.len(),
        "loaded {}",
        source.display()
    );

    let outcome = translate_rows(table.rows, translator, run.cancel_flag(), pb).await;

    Ok(BatchReport {
        outcome,
        skipped_rows: table.skipped,
    })
}

/// Translates rows strictly in order, one request at a time. The flag is
/// only consulted between rows, so an in-flight request always finishes.
pub async fn translate_rows<T: Translator + ?Sized>(
    rows: Vec<SourceRow>,
    translator: &T,
    cancel: &CancellationFlag,
    pb: &ProgressBar,
) -> BatchOutcome {
    pb.set_length(rows.len() as u64);
    let mut output = Vec::with_capacity(rows.len());

    for row in rows {
        if cancel.is_cancelled() {
            info!(completed = output.len(), "batch cancelled");
            return BatchOutcome::Cancelled;
        }

        pb.set_message(row.product_code.clone());
        let result = translator.translate(&row.description).await;
        output.push(OutputRow {
            product_code: row.product_code,
            result,
        });
        pb.inc(1);
    }

    info!(rows = output.len(), "batch completed");
    BatchOutcome::Completed(output)
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::sync::Mutex;

    #[derive(Default)]
    struct RecordingTranslator {
        calls: Mutex<Vec<String>>,
        fail_on: Option<&'static str>,
        cancel_after: Option<(usize, CancellationFlag)>,
    }

    impl RecordingTranslator {
        fn calls(&self) -> Vec<String> {
            self.calls.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl Translator for RecordingTranslator {
        async fn translate(&self, description: &str) -> TranslationResult {
            let count = {
                let mut calls = self.calls.lock().unwrap();
                calls.push(description.to_string());
                calls.len()
            };

            if let Some((after, flag)) = &self.cancel_after {
                if count == *after {
                    flag.cancel();
                }
            }

            if self.fail_on == Some(description) {
                TranslationResult::Failed {
                    placeholder: "Error".to_string(),
                    reason: "boom".to_string(),
                }
            } else {
                TranslationResult::Translated(format!("tr:{}", description))
            }
        }
    }

    fn rows(items: &[(&str, &str)]) -> Vec<SourceRow> {
        items
            .iter()
            .map(|(code, description)| SourceRow {
                product_code: code.to_string(),
                description: description.to_string(),
            })
            .collect()
    }

    #[tokio::test]
    async fn translates_every_row_in_order() {
        let translator = RecordingTranslator::default();
        let outcome = translate_rows(
            rows(&[("C3", "third"), ("A1", "first"), ("B2", "second")]),
            &translator,
            &CancellationFlag::new(),
            &ProgressBar::hidden(),
        )
        .await;

        let BatchOutcome::Completed(output) = outcome else {
            panic!("expected completion");
        };
        let codes: Vec<_> = output.iter().map(|r| r.product_code.as_str()).collect();
        assert_eq!(codes, vec!["C3", "A1", "B2"]);
        assert_eq!(output[1].result.text(), "tr:first");
        assert_eq!(translator.calls(), vec!["third", "first", "second"]);
    }

    #[tokio::test]
    async fn cancelled_before_first_row_makes_no_calls() {
        let translator = RecordingTranslator::default();
        let cancel = CancellationFlag::new();
        cancel.cancel();

        let outcome = translate_rows(
            rows(&[("A1", "Red cotton shirt")]),
            &translator,
            &cancel,
            &ProgressBar::hidden(),
        )
        .await;

        assert_eq!(outcome, BatchOutcome::Cancelled);
        assert!(translator.calls().is_empty());
    }

    #[tokio::test]
    async fn cancel_mid_batch_discards_finished_rows() {
        let cancel = CancellationFlag::new();
        let translator = RecordingTranslator {
            cancel_after: Some((2, cancel.clone())),
            ..Default::default()
        };

        let outcome = translate_rows(
            rows(&[("A1", "a"), ("A2", "b"), ("A3", "c"), ("A4", "d")]),
            &translator,
            &cancel,
            &ProgressBar::hidden(),
        )
        .await;

        assert_eq!(outcome, BatchOutcome::Cancelled);
        assert_eq!(translator.calls(), vec!["a", "b"]);
    }

    #[tokio::test]
    async fn single_row_failure_does_not_abort() {
        let translator = RecordingTranslator {
            fail_on: Some("Broken"),
            ..Default::default()
        };

        let outcome = translate_rows(
            rows(&[("A1", "fine"), ("A2", "Broken"), ("A3", "also fine")]),
            &translator,
            &CancellationFlag::new(),
            &ProgressBar::hidden(),
        )
        .await;

        let BatchOutcome::Completed(output) = outcome else {
            panic!("expected completion");
        };
        assert_eq!(output.len(), 3);
        assert_eq!(output[1].product_code, "A2");
        assert_eq!(output[1].result.text(), "Error");
        assert!(output[1].result.is_failed());
        assert_eq!(output[2].result.text(), "tr:also fine");
    }

    #[tokio::test]
    async fn empty_input_completes_and_differs_from_cancelled() {
        let translator = RecordingTranslator::default();
        let outcome = translate_rows(
            Vec::new(),
            &translator,
            &CancellationFlag::new(),
            &ProgressBar::hidden(),
        )
        .await;

        assert_eq!(outcome, BatchOutcome::Completed(Vec::new()));
        assert_ne!(outcome, BatchOutcome::Cancelled);
    }

    #[tokio::test]
    async fn unreadable_source_fails_before_any_row() {
        let session = RunSession::new();
        let run = session.begin().unwrap();
        let translator = RecordingTranslator::default();

        let result = run_batch(
            Path::new("/definitely/not/here.xlsx"),
            &translator,
            &run,
            &ProgressBar::hidden(),
        )
        .await;

        assert!(matches!(result, Err(AppError::SourceRead { .. })));
        assert!(translator.calls().is_empty());
    }

    #[test]
    fn session_allows_one_run_at_a_time() {
        let session = RunSession::new();
        let run = session.begin().unwrap();
        assert!(session.is_running());
        assert!(matches!(session.begin(), Err(AppError::AlreadyRunning)));

        drop(run);
        assert!(!session.is_running());
        assert!(session.begin().is_ok());
    }

    #[test]
    fn begin_resets_the_flag() {
        let session = RunSession::new();
        let run = session.begin().unwrap();
        assert!(session.request_abort());
        assert!(run.cancel_flag().is_cancelled());
        drop(run);

        let run = session.begin().unwrap();
        assert!(!run.cancel_flag().is_cancelled());
        assert!(!session.cancel_flag().is_cancelled());
    }

    #[test]
    fn abort_without_run_is_ignored() {
        let session = RunSession::new();
        assert!(!session.request_abort());
        assert!(!session.cancel_flag().is_cancelled());
    }

    #[test]
    fn report_counts_failures() {
        let report = BatchReport {
            outcome: BatchOutcome::Completed(vec![
                OutputRow {
                    product_code: "A1".into(),
                    result: TranslationResult::Translated("x".into()),
                },
                OutputRow {
                    product_code: "A2".into(),
                    result: TranslationResult::Failed {
                        placeholder: "Error".into(),
                        reason: "boom".into(),
                    },
                },
            ]),
            skipped_rows: vec![4],
        };
        assert_eq!(report.translated_count(), 1);
        assert_eq!(report.failed_count(), 1);
    }
}
