//! Frame-based spinners driven by scheduled tick events.
//!
//! Each spinner has a process-unique id. Ticks also carry a chain tag that
//! changes whenever the spinner is restarted, so a tick left over from an
//! earlier run is recognised as stale and dropped instead of starting a
//! second tick chain.

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

/// Fixed cadence for every spinner tick.
pub const TICK_INTERVAL: Duration = Duration::from_millis(100);

pub const MINI_DOT: &[&str] = &["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"];
pub const LINE: &[&str] = &["|", "/", "-", "\\"];

static NEXT_ID: AtomicU64 = AtomicU64::new(1);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SpinnerId(u64);

/// Payload of a tick event: which spinner, and which run of it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SpinnerTick {
    pub id: SpinnerId,
    pub tag: u64,
}

#[derive(Debug, Clone)]
pub struct Spinner {
    id: SpinnerId,
    tag: u64,
    frames: &'static [&'static str],
    frame: usize,
}

impl Spinner {
    pub fn new(frames: &'static [&'static str]) -> Self {
        Self {
            id: SpinnerId(NEXT_ID.fetch_add(1, Ordering::Relaxed)),
            tag: 0,
            frames,
            frame: 0,
        }
    }

    pub fn id(&self) -> SpinnerId {
        self.id
    }

    /// The tick that continues the current chain.
    pub fn tick(&self) -> SpinnerTick {
        SpinnerTick {
            id: self.id,
            tag: self.tag,
        }
    }

    /// Begin a new tick chain, invalidating any ticks still in flight.
    pub fn restart(&mut self) -> SpinnerTick {
        self.tag = self.tag.wrapping_add(1);
        self.frame = 0;
        self.tick()
    }

    /// Advance one frame if the tick belongs to the current chain.
    pub fn advance(&mut self, tick: SpinnerTick) -> bool {
        if tick.id != self.id || tick.tag != self.tag {
            return false;
        }
        self.frame = (self.frame + 1) % self.frames.len();
        true
    }

    pub fn view(&self) -> &'static str {
        self.frames[self.frame]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ids_are_unique() {
        let a = Spinner::new(MINI_DOT);
        let b = Spinner::new(LINE);
        assert_ne!(a.id(), b.id());
    }

    #[test]
    fn test_advance_cycles_frames() {
        let mut spinner = Spinner::new(LINE);
        let tick = spinner.tick();
        let seen: Vec<&str> = (0..5)
            .map(|_| {
                spinner.advance(tick);
                spinner.view()
            })
            .collect();
        assert_eq!(seen, vec!["/", "-", "\\", "|", "/"]);
    }

    #[test]
    fn test_foreign_tick_is_rejected() {
        let mut a = Spinner::new(MINI_DOT);
        let b = Spinner::new(MINI_DOT);
        assert!(!a.advance(b.tick()));
        assert_eq!(a.view(), MINI_DOT[0]);
    }

    #[test]
    fn test_restart_invalidates_old_chain() {
        let mut spinner = Spinner::new(MINI_DOT);
        let old = spinner.tick();
        let new = spinner.restart();
        assert!(!spinner.advance(old));
        assert!(spinner.advance(new));
        assert_eq!(spinner.view(), MINI_DOT[1]);
    }
}
