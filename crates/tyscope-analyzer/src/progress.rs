//! Sub-task progress reporting

use std::fmt;
use std::time::{Duration, Instant};

/// Named phases of a whole-program analysis.
///
/// The first three are reached by front ends before the analyzer runs;
/// they report them through [`Analyzer::report_subtask`](crate::Analyzer::report_subtask).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SubTask {
    PreparationDone,
    NFilesParsed,
    ParsePackagesDone,
    CollectPackages,
    SortPackagesByDependencies,
    CollectDeclarations,
    CollectRuntimeFunctionPositions,
    FindTypeSources,
    CollectSelectors,
    CheckCollectedSelectors,
    FindImplementations,
    RegisterInterfaceMethodsForTypes,
    MakeStatistics,
    CollectSourceFiles,
}

impl SubTask {
    pub fn name(self) -> &'static str {
        match self {
            SubTask::PreparationDone => "preparation-done",
            SubTask::NFilesParsed => "n-files-parsed",
            SubTask::ParsePackagesDone => "parse-packages-done",
            SubTask::CollectPackages => "collect-packages",
            SubTask::SortPackagesByDependencies => "sort-packages-by-dependencies",
            SubTask::CollectDeclarations => "collect-declarations",
            SubTask::CollectRuntimeFunctionPositions => "collect-runtime-function-positions",
            SubTask::FindTypeSources => "find-type-sources",
            SubTask::CollectSelectors => "collect-selectors",
            SubTask::CheckCollectedSelectors => "check-collected-selectors",
            SubTask::FindImplementations => "find-implementations",
            SubTask::RegisterInterfaceMethodsForTypes => "register-interface-methods-for-types",
            SubTask::MakeStatistics => "make-statistics",
            SubTask::CollectSourceFiles => "collect-source-files",
        }
    }
}

impl fmt::Display for SubTask {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Callback invoked after each phase with its elapsed time and extra counts.
pub type SubTaskCallback = Box<dyn FnMut(SubTask, Duration, &[i32])>;

/// Times phases and forwards them to the callback.
pub struct ProgressReporter {
    callback: Option<SubTaskCallback>,
    last: Instant,
}

impl fmt::Debug for ProgressReporter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProgressReporter")
            .field("callback", &self.callback.is_some())
            .finish()
    }
}

impl Default for ProgressReporter {
    fn default() -> Self {
        Self::new()
    }
}

impl ProgressReporter {
    pub fn new() -> Self {
        ProgressReporter {
            callback: None,
            last: Instant::now(),
        }
    }

    pub fn set_callback(&mut self, callback: SubTaskCallback) {
        self.callback = Some(callback);
    }

    /// Restart the phase clock.
    pub fn restart(&mut self) {
        self.last = Instant::now();
    }

    /// Report a finished phase; the clock restarts for the next one.
    pub fn done(&mut self, task: SubTask, extras: &[i32]) {
        let now = Instant::now();
        let elapsed = now.duration_since(self.last);
        self.last = now;
        tracing::debug!(task = %task, elapsed_us = elapsed.as_micros() as u64, ?extras, "phase done");
        if let Some(callback) = self.callback.as_mut() {
            callback(task, elapsed, extras);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    #[test]
    fn test_done_invokes_callback() {
        let seen = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&seen);
        let mut reporter = ProgressReporter::new();
        reporter.done(SubTask::CollectPackages, &[1]);
        reporter.set_callback(Box::new(move |task, _, extras| {
            sink.borrow_mut().push((task, extras.to_vec()));
        }));
        reporter.done(SubTask::MakeStatistics, &[2, 3]);
        assert_eq!(*seen.borrow(), vec![(SubTask::MakeStatistics, vec![2, 3])]);
    }
}
