use std::fmt;

/// Coarse pipeline phase reported through a [`ProgressSink`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    PreparingDates,
    Recurrences,
    Calculating,
    Done,
}

/// A status marker with a counter fraction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProgressUpdate {
    pub phase: Phase,
    pub current: usize,
    pub total: usize,
}

impl ProgressUpdate {
    pub fn new(phase: Phase, current: usize, total: usize) -> Self {
        Self {
            phase,
            current,
            total,
        }
    }
}

impl fmt::Display for ProgressUpdate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.phase {
            Phase::PreparingDates => f.write_str("preparing dates…"),
            Phase::Recurrences => write!(f, "recurrences… [{}/{}]", self.current, self.total),
            Phase::Calculating => write!(f, "calculating… [{}/{}]", self.current, self.total),
            Phase::Done => write!(f, "done [{}/{}]", self.current, self.total),
        }
    }
}

/// Receives progress from the engine.
///
/// The engine calls this from whichever thread runs the projection; sinks that
/// touch state owned by another thread must forward updates instead of
/// touching it directly (see [`crate::execution::progress_channel`]).
pub trait ProgressSink: Send {
    fn report(&mut self, update: ProgressUpdate);
}

impl<F> ProgressSink for F
where
    F: FnMut(ProgressUpdate) + Send,
{
    fn report(&mut self, update: ProgressUpdate) {
        self(update)
    }
}

/// Discards every update.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoProgress;

impl ProgressSink for NoProgress {
    fn report(&mut self, _update: ProgressUpdate) {}
}

/// Emits an update every `every` items, starting with the first.
pub(crate) struct Throttle {
    every: usize,
}

impl Throttle {
    pub(crate) fn new(every: usize) -> Self {
        Self {
            every: every.max(1),
        }
    }

    pub(crate) fn due(&self, index: usize) -> bool {
        index % self.every == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_strings_keep_phase_and_fraction() {
        assert_eq!(
            ProgressUpdate::new(Phase::PreparingDates, 0, 0).to_string(),
            "preparing dates…"
        );
        assert_eq!(
            ProgressUpdate::new(Phase::Recurrences, 1000, 2500).to_string(),
            "recurrences… [1000/2500]"
        );
        assert_eq!(
            ProgressUpdate::new(Phase::Done, 366, 366).to_string(),
            "done [366/366]"
        );
    }

    #[test]
    fn throttle_fires_on_multiples() {
        let throttle = Throttle::new(1000);
        assert!(throttle.due(0));
        assert!(!throttle.due(999));
        assert!(throttle.due(1000));
        assert!(Throttle::new(0).due(7));
    }

    #[test]
    fn closures_act_as_sinks() {
        let mut seen = Vec::new();
        {
            let mut sink = |update: ProgressUpdate| seen.push(update.to_string());
            sink.report(ProgressUpdate::new(Phase::Calculating, 1, 2));
        }
        assert_eq!(seen, vec!["calculating… [1/2]".to_string()]);
    }
}
