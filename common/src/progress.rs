use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ProgressKind {
    Progress,
    Complete,
    Error,
}

/// One unit of client visible status.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ProgressMessage {
    #[serde(rename = "type")]
    pub kind: ProgressKind,
    pub message: String,
    pub step: u32,
    pub total: u32,
}

impl ProgressMessage {
    pub fn is_terminal(&self) -> bool {
        self.kind != ProgressKind::Progress
    }
}

/// Receives a message before each unit of pipeline work.
///
/// Implementations only touch their own state, a pipeline never needs to
/// know which one it was handed.
pub trait ProgressReporter {
    fn report_progress(&mut self, message: &str);
}

/// Step counter for a single pipeline run.
///
/// Starts at zero so the first progress message is step 1.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StepCounter {
    step: u32,
    total: u32,
}

impl StepCounter {
    pub fn new(total: u32) -> Self {
        Self { step: 0, total }
    }

    pub fn step(&self) -> u32 {
        self.step
    }

    pub fn total(&self) -> u32 {
        self.total
    }

    /// Count one more unit of work and describe it.
    pub fn advance(&mut self, message: impl Into<String>) -> ProgressMessage {
        self.step += 1;
        self.message(ProgressKind::Progress, message)
    }

    /// Describe the end of the run without moving the counter.
    pub fn finish(&self, kind: ProgressKind, message: impl Into<String>) -> ProgressMessage {
        self.message(kind, message)
    }

    fn message(&self, kind: ProgressKind, message: impl Into<String>) -> ProgressMessage {
        ProgressMessage {
            kind,
            message: message.into(),
            step: self.step,
            total: self.total,
        }
    }
}

/// Reporter for callers that only want the final result. Progress goes to
/// the process log.
#[derive(Debug, Default)]
pub struct LoggingProgressReporter;

impl ProgressReporter for LoggingProgressReporter {
    fn report_progress(&mut self, message: &str) {
        tracing::info!("{}", message);
    }
}

#[cfg(any(test, feature = "test-utils"))]
pub mod testing {
    use super::*;

    /// Keeps every message with the counter value it was reported at.
    #[derive(Debug)]
    pub struct RecordingProgressReporter {
        pub counter: StepCounter,
        pub messages: Vec<ProgressMessage>,
    }

    impl RecordingProgressReporter {
        pub fn new(total: u32) -> Self {
            Self {
                counter: StepCounter::new(total),
                messages: Vec::new(),
            }
        }
    }

    impl ProgressReporter for RecordingProgressReporter {
        fn report_progress(&mut self, message: &str) {
            let message = self.counter.advance(message);
            self.messages.push(message);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_advance_is_step_one() {
        let mut counter = StepCounter::new(3);

        let first = counter.advance("generating inventory");
        let second = counter.advance("running playbook");

        assert_eq!((first.step, first.total), (1, 3));
        assert_eq!((second.step, second.total), (2, 3));
        assert_eq!(first.kind, ProgressKind::Progress);
    }

    #[test]
    fn finish_keeps_the_last_step() {
        let mut counter = StepCounter::new(5);
        counter.advance("one");
        counter.advance("two");

        let done = counter.finish(ProgressKind::Error, "failed");

        assert_eq!(done.step, 2);
        assert_eq!(done.total, 5);
        assert!(done.is_terminal());
        assert_eq!(counter.step(), 2);
    }

    #[test]
    fn serializes_with_type_tag() {
        let message = ProgressMessage {
            kind: ProgressKind::Complete,
            message: "done".into(),
            step: 4,
            total: 4,
        };

        assert_eq!(
            serde_json::to_string(&message).unwrap(),
            r#"{"type":"complete","message":"done","step":4,"total":4}"#
        );
    }
}
