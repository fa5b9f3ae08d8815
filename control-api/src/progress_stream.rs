use axum::response::sse::Event;
use common::progress::{ProgressKind, ProgressMessage, ProgressReporter, StepCounter};
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};
use tokio_stream::{wrappers::UnboundedReceiverStream, Stream, StreamExt as _};

/// Forwards every progress report of one pipeline run to an open event
/// stream.
///
/// Owns the step counter of the run. Once the pipeline returns, exactly one
/// of [`complete`](Self::complete) or [`fail`](Self::fail) ends the stream.
pub struct StreamingProgressReporter {
    sender: UnboundedSender<ProgressMessage>,
    counter: StepCounter,
}

impl StreamingProgressReporter {
    pub fn new(total: u32) -> (Self, UnboundedReceiver<ProgressMessage>) {
        let (sender, receiver) = mpsc::unbounded_channel();

        let reporter = Self {
            sender,
            counter: StepCounter::new(total),
        };

        (reporter, receiver)
    }

    pub fn complete(self, message: &str) {
        let message = self.counter.finish(ProgressKind::Complete, message);
        self.send(message);
    }

    pub fn fail(self, message: &str) {
        let message = self.counter.finish(ProgressKind::Error, message);
        self.send(message);
    }

    fn send(&self, message: ProgressMessage) {
        // The client went away, the run carries on without it
        if self.sender.send(message).is_err() {
            tracing::debug!("Progress stream closed, dropping event");
        }
    }
}

impl ProgressReporter for StreamingProgressReporter {
    fn report_progress(&mut self, message: &str) {
        tracing::info!("{}", message);

        let message = self.counter.advance(message);
        self.send(message);
    }
}

/// One `data: <json>` event per message.
pub fn into_event_stream(
    receiver: UnboundedReceiver<ProgressMessage>,
) -> impl Stream<Item = Result<Event, axum::Error>> {
    UnboundedReceiverStream::new(receiver).map(|message| Event::default().json_data(message))
}
