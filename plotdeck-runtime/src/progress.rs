use std::ops::{Deref, DerefMut};
use std::sync::mpsc::Sender;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProgressEvent {
    /// Tracking began; `None` means the total is not known.
    Started { total: Option<u64> },
    /// The coarse position changed.
    Position { count: u64, position: u64, steps: u64 },
    Reset,
}

pub trait ProgressListener: Send {
    fn on_progress(&self, event: ProgressEvent);
}

/// Forwards progress events over a channel, typically to the coordinator.
#[derive(Debug, Clone)]
pub struct ChannelProgress {
    sender: Sender<ProgressEvent>,
}

impl ChannelProgress {
    pub fn new(sender: Sender<ProgressEvent>) -> Self {
        Self { sender }
    }
}

impl ProgressListener for ChannelProgress {
    fn on_progress(&self, event: ProgressEvent) {
        let _ = self.sender.send(event);
    }
}

/// Turns a growing item count into coarse progress positions.
///
/// A listener only hears about a position change, never about every item.
/// With a total of zero nothing is reported at all.
pub struct Progresser {
    listener: Option<Box<dyn ProgressListener>>,
    steps: u64,
    total: Option<u64>,
    count: u64,
    position: u64,
    active: bool,
}

impl Default for Progresser {
    fn default() -> Self {
        Self::new(100)
    }
}

impl Progresser {
    pub fn new(steps: u64) -> Self {
        Self {
            listener: None,
            steps: steps.max(1),
            total: None,
            count: 0,
            position: 0,
            active: false,
        }
    }

    pub fn with_listener(mut self, listener: Box<dyn ProgressListener>) -> Self {
        self.listener = Some(listener);
        self
    }

    fn emit(&self, event: ProgressEvent) {
        if let Some(listener) = &self.listener {
            listener.on_progress(event);
        }
    }

    fn reporting(&self) -> bool {
        self.active && self.total != Some(0)
    }

    /// Zeroes the count against a known or unknown total.
    pub fn init(&mut self, total: Option<u64>) {
        self.total = total;
        self.count = 0;
        self.position = 0;
        self.active = true;
        if self.reporting() {
            self.emit(ProgressEvent::Started { total });
        }
    }

    pub fn increment(&mut self) {
        self.count += 1;
        if !self.reporting() {
            return;
        }
        let Some(total) = self.total else {
            return;
        };
        let position = (u128::from(self.count.min(total)) * u128::from(self.steps)
            / u128::from(total)) as u64;
        if position != self.position {
            self.position = position;
            self.emit(ProgressEvent::Position {
                count: self.count,
                position,
                steps: self.steps,
            });
        }
    }

    /// Back to idle. Only emits if tracking was active.
    pub fn reset(&mut self) {
        let was_reporting = self.reporting();
        self.total = None;
        self.count = 0;
        self.position = 0;
        self.active = false;
        if was_reporting {
            self.emit(ProgressEvent::Reset);
        }
    }

    pub fn count(&self) -> u64 {
        self.count
    }

    pub fn position(&self) -> u64 {
        self.position
    }

    pub fn total(&self) -> Option<u64> {
        self.total
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    /// Starts tracking; the returned guard resets on every exit path.
    pub fn track(&mut self, total: Option<u64>) -> ProgressGuard<'_> {
        self.init(total);
        ProgressGuard { progresser: self }
    }
}

impl std::fmt::Debug for Progresser {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Progresser")
            .field("steps", &self.steps)
            .field("total", &self.total)
            .field("count", &self.count)
            .field("position", &self.position)
            .field("active", &self.active)
            .finish()
    }
}

pub struct ProgressGuard<'a> {
    progresser: &'a mut Progresser,
}

impl Deref for ProgressGuard<'_> {
    type Target = Progresser;

    fn deref(&self) -> &Progresser {
        self.progresser
    }
}

impl DerefMut for ProgressGuard<'_> {
    fn deref_mut(&mut self) -> &mut Progresser {
        self.progresser
    }
}

impl Drop for ProgressGuard<'_> {
    fn drop(&mut self) {
        self.progresser.reset();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::mpsc;

    #[test]
    fn positions_only_on_change() {
        let (tx, rx) = mpsc::channel();
        let mut progresser = Progresser::new(4).with_listener(Box::new(ChannelProgress::new(tx)));
        progresser.init(Some(8));
        for _ in 0..8 {
            progresser.increment();
        }
        let events: Vec<ProgressEvent> = rx.try_iter().collect();
        let positions: Vec<u64> = events
            .iter()
            .filter_map(|event| match event {
                ProgressEvent::Position { position, .. } => Some(*position),
                _ => None,
            })
            .collect();
        assert_eq!(positions, vec![1, 2, 3, 4]);
    }

    #[test]
    fn zero_total_is_silent() {
        let (tx, rx) = mpsc::channel();
        let mut progresser = Progresser::new(10).with_listener(Box::new(ChannelProgress::new(tx)));
        progresser.init(Some(0));
        progresser.increment();
        progresser.reset();
        assert_eq!(rx.try_iter().count(), 0);
    }
}
