use crate::optimization::Statistics;
use crossbeam::channel::{bounded, Receiver, Sender, TrySendError};
use log::{info, warn};

/// Sink for statistics snapshots. Failures are logged by the engine and
/// never abort a run.
pub trait StatsReporter {
    fn open(&mut self) -> Result<(), String> {
        Ok(())
    }

    fn insert(&mut self, step: usize, stats: &Statistics) -> Result<(), String>;

    /// Own reporting cadence in steps; `None` follows the engine's
    /// `stats_frequency` and `Some(0)` turns the reporter off.
    fn frequency(&self) -> Option<usize> {
        None
    }

    fn close(&mut self) -> Result<(), String> {
        Ok(())
    }
}

/// Writes each snapshot as one `info` log line.
#[derive(Clone, Debug, Default)]
pub struct LogReporter {
    written: usize,
    frequency: Option<usize>,
}

impl LogReporter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_frequency(mut self, frequency: usize) -> Self {
        self.frequency = Some(frequency);
        self
    }

    pub fn written(&self) -> usize {
        self.written
    }
}

impl StatsReporter for LogReporter {
    fn insert(&mut self, step: usize, stats: &Statistics) -> Result<(), String> {
        info!("Step {:>5}: {}", step, stats);
        self.written += 1;
        Ok(())
    }

    fn frequency(&self) -> Option<usize> {
        self.frequency
    }
}

/// Snapshot as sent over a [`ChannelReporter`].
#[derive(Clone, Debug, PartialEq)]
pub struct StatsRecord {
    pub step: usize,
    pub statistics: Statistics,
}

/// Forwards snapshots to another thread over a bounded channel.
///
/// Sending never blocks the engine: when the channel is full the snapshot is
/// dropped with a warning.
#[derive(Debug)]
pub struct ChannelReporter {
    sender: Sender<StatsRecord>,
    dropped: usize,
    frequency: Option<usize>,
}

impl ChannelReporter {
    pub fn bounded(capacity: usize) -> (Self, Receiver<StatsRecord>) {
        let (sender, receiver) = bounded(capacity);
        let reporter = Self {
            sender,
            dropped: 0,
            frequency: None,
        };
        (reporter, receiver)
    }

    pub fn with_frequency(mut self, frequency: usize) -> Self {
        self.frequency = Some(frequency);
        self
    }

    pub fn dropped(&self) -> usize {
        self.dropped
    }
}

impl StatsReporter for ChannelReporter {
    fn insert(&mut self, step: usize, stats: &Statistics) -> Result<(), String> {
        let record = StatsRecord {
            step,
            statistics: stats.clone(),
        };
        match self.sender.try_send(record) {
            Ok(()) => Ok(()),
            Err(TrySendError::Full(_)) => {
                self.dropped += 1;
                warn!("Statistics channel full, dropping snapshot for step {}", step);
                Ok(())
            }
            Err(TrySendError::Disconnected(_)) => {
                Err("statistics receiver disconnected".to_string())
            }
        }
    }

    fn frequency(&self) -> Option<usize> {
        self.frequency
    }
}
