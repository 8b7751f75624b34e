//! `EventQueue` — the virtual clock and its pending-event queue.
//!
//! # Ordering
//!
//! Events are keyed by the instant they fire.  Each instant holds a FIFO
//! `VecDeque`, so events scheduled for the same instant come out in the order
//! they were scheduled.  Together with a seeded RNG this makes runs
//! bit-reproducible.
//!
//! # Time only moves on `pop`
//!
//! The clock jumps to an event's instant when that event is popped, and never
//! otherwise except through [`EventQueue::advance_to`], which refuses to skip
//! over pending events.
//!
//! # Performance note
//!
//! `BTreeMap` gives O(log W) insert and pop where W = number of distinct
//! instants currently enqueued.  With continuous sampled durations most
//! instants hold a single event.

use std::collections::{BTreeMap, VecDeque};

use bps_core::{SimClock, SimTime};

use crate::{ScheduleError, ScheduleResult};

/// A min-ordered timer queue driving a [`SimClock`].
pub struct EventQueue<E> {
    clock: SimClock,
    inner: BTreeMap<SimTime, VecDeque<E>>,
    /// Cached total event count for O(1) `len()`.
    total: usize,
}

impl<E> EventQueue<E> {
    pub fn new(clock: SimClock) -> Self {
        Self {
            clock,
            inner: BTreeMap::new(),
            total: 0,
        }
    }

    /// The current virtual time.
    #[inline]
    pub fn now(&self) -> SimTime {
        self.clock.now()
    }

    /// Read-only access to the clock (epoch and time unit).
    #[inline]
    pub fn clock(&self) -> &SimClock {
        &self.clock
    }

    /// Schedule `event` to fire `delay` units from now.
    ///
    /// Negative, NaN, or infinite delays are rejected with
    /// [`ScheduleError::InvalidDelay`]; the queue is left untouched.
    pub fn schedule(&mut self, delay: f64, event: E) -> ScheduleResult<SimTime> {
        let at = self
            .now()
            .after(delay)
            .map_err(|_| ScheduleError::InvalidDelay(delay))?;
        self.push(at, event);
        Ok(at)
    }

    /// Schedule `event` at absolute instant `at`, which must not be in the past.
    pub fn schedule_at(&mut self, at: SimTime, event: E) -> ScheduleResult<()> {
        let now = self.now();
        if at < now {
            return Err(ScheduleError::InPast { now, at });
        }
        self.push(at, event);
        Ok(())
    }

    /// Remove the earliest event and advance the clock to its instant.
    ///
    /// Returns `None` if the queue is empty; the clock does not move.
    pub fn pop(&mut self) -> Option<(SimTime, E)> {
        let mut entry = self.inner.first_entry()?;
        let at = *entry.key();
        let event = entry.get_mut().pop_front()?;
        if entry.get().is_empty() {
            entry.remove();
        }
        self.total -= 1;

        // `schedule_at` never admits an instant before `now`, so this cannot regress.
        let advanced = self.clock.advance_to(at);
        debug_assert!(advanced.is_ok(), "event queue held an event in the past");

        Some((at, event))
    }

    /// Move the clock forward to `t` without firing anything.
    ///
    /// Fails if an event is pending before `t` (it would be skipped) or if
    /// `t` is before `now`.
    pub fn advance_to(&mut self, t: SimTime) -> ScheduleResult<()> {
        if let Some(next) = self.next_time() {
            if next < t {
                return Err(ScheduleError::WouldSkip { next, to: t });
            }
        }
        self.clock.advance_to(t)?;
        Ok(())
    }

    /// The earliest instant with at least one queued event, or `None` if empty.
    pub fn next_time(&self) -> Option<SimTime> {
        self.inner.keys().next().copied()
    }

    /// Drop every pending event and rewind the clock to zero.
    pub fn clear(&mut self) {
        self.inner.clear();
        self.total = 0;
        self.clock.reset();
    }

    /// Total number of pending events across all instants.
    pub fn len(&self) -> usize {
        self.total
    }

    pub fn is_empty(&self) -> bool {
        self.total == 0
    }

    /// Number of distinct future instants that have at least one queued event.
    pub fn instant_count(&self) -> usize {
        self.inner.len()
    }

    fn push(&mut self, at: SimTime, event: E) {
        self.inner.entry(at).or_default().push_back(event);
        self.total += 1;
    }
}
