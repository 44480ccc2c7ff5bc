use std::sync::mpsc::{self, Receiver, Sender};

use crate::projection::{ProgressSink, ProgressUpdate};

/// Worker-side half of [`progress_channel`]: forwards updates instead of
/// touching caller state.
#[derive(Debug, Clone)]
pub struct ChannelSink {
    sender: Sender<ProgressUpdate>,
}

impl ProgressSink for ChannelSink {
    fn report(&mut self, update: ProgressUpdate) {
        // The inbox may already be gone if the caller stopped listening.
        let _ = self.sender.send(update);
    }
}

/// Caller-side half of [`progress_channel`]. Drain it from the thread that
/// owns the state progress should update.
#[derive(Debug)]
pub struct ProgressInbox {
    receiver: Receiver<ProgressUpdate>,
    latest: Option<ProgressUpdate>,
}

impl ProgressInbox {
    /// Applies every queued update in order without blocking.
    pub fn drain<F>(&mut self, mut apply: F) -> usize
    where
        F: FnMut(ProgressUpdate),
    {
        let mut applied = 0;
        while let Ok(update) = self.receiver.try_recv() {
            self.latest = Some(update);
            apply(update);
            applied += 1;
        }
        applied
    }

    /// The most recent update seen by [`drain`](Self::drain).
    pub fn latest(&self) -> Option<ProgressUpdate> {
        self.latest
    }

    /// Current status text, or an empty string before the first update.
    pub fn status(&self) -> String {
        self.latest.map(|u| u.to_string()).unwrap_or_default()
    }
}

/// Creates a sink for the worker and an inbox for the owning thread.
pub fn progress_channel() -> (ChannelSink, ProgressInbox) {
    let (sender, receiver) = mpsc::channel();
    (
        ChannelSink { sender },
        ProgressInbox {
            receiver,
            latest: None,
        },
    )
}

#[cfg(test)]
mod tests {
    use std::thread;

    use super::*;
    use crate::projection::Phase;

    #[test]
    fn updates_cross_threads_in_order() {
        let (mut sink, mut inbox) = progress_channel();
        let worker = thread::spawn(move || {
            for step in 0..3 {
                sink.report(ProgressUpdate::new(Phase::Calculating, step, 3));
            }
        });
        worker.join().unwrap();

        let mut seen = Vec::new();
        let applied = inbox.drain(|update| seen.push(update.current));
        assert_eq!(applied, 3);
        assert_eq!(seen, vec![0, 1, 2]);
        assert_eq!(inbox.status(), "calculating… [2/3]");
        assert_eq!(inbox.drain(|_| {}), 0);
    }
}
