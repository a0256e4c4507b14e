//! Cooperative timer queue for a single-threaded controller.
//!
//! Nothing here sleeps. The owner asks for due tasks with [`Scheduler::pop_due`]
//! whenever its notion of "now" advances, and runs them one at a time on the
//! same thread that handles input.

use std::time::Duration;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct TimerHandle(u64);

#[derive(Clone, Debug)]
struct Entry<T> {
    handle: TimerHandle,
    due: Duration,
    period: Option<Duration>,
    task: T,
}

#[derive(Clone, Debug)]
pub struct Scheduler<T> {
    next_id: u64,
    entries: Vec<Entry<T>>,
}

impl<T: Clone> Scheduler<T> {
    pub fn new() -> Self {
        Self {
            next_id: 0,
            entries: Vec::new(),
        }
    }

    /// Run `task` once at `due`
    pub fn schedule_at(&mut self, due: Duration, task: T) -> TimerHandle {
        self.insert(due, None, task)
    }

    /// Run `task` at `first`, then every `period` until cancelled
    pub fn schedule_repeating(&mut self, first: Duration, period: Duration, task: T) -> TimerHandle {
        self.insert(first, Some(period), task)
    }

    fn insert(&mut self, due: Duration, period: Option<Duration>, task: T) -> TimerHandle {
        let handle = TimerHandle(self.next_id);
        self.next_id += 1;
        self.entries.push(Entry {
            handle,
            due,
            period: period.filter(|p| !p.is_zero()),
            task,
        });
        handle
    }

    /// Returns false if the timer already fired (one-shot) or was cancelled
    pub fn cancel(&mut self, handle: TimerHandle) -> bool {
        let before = self.entries.len();
        self.entries.retain(|e| e.handle != handle);
        self.entries.len() != before
    }

    pub fn is_scheduled(&self, handle: TimerHandle) -> bool {
        self.entries.iter().any(|e| e.handle == handle)
    }

    /// Earliest task due at or before `now`, with the time it was due.
    ///
    /// Ties go to the timer scheduled first. Repeating timers are re-armed one
    /// period after their due time.
    pub fn pop_due(&mut self, now: Duration) -> Option<(Duration, T)> {
        let index = self
            .entries
            .iter()
            .enumerate()
            .filter(|(_, e)| e.due <= now)
            .min_by_key(|(_, e)| (e.due, e.handle.0))
            .map(|(i, _)| i)?;

        let entry = &mut self.entries[index];
        let due = entry.due;
        let task = entry.task.clone();
        match entry.period {
            Some(period) => entry.due += period,
            None => {
                self.entries.remove(index);
            }
        }
        Some((due, task))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}

impl<T: Clone> Default for Scheduler<T> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ms(n: u64) -> Duration {
        Duration::from_millis(n)
    }

    #[test]
    fn test_one_shot_fires_once() {
        let mut scheduler = Scheduler::new();
        scheduler.schedule_at(ms(100), "reveal");

        assert_eq!(scheduler.pop_due(ms(99)), None);
        assert_eq!(scheduler.pop_due(ms(100)), Some((ms(100), "reveal")));
        assert_eq!(scheduler.pop_due(ms(1000)), None);
        assert!(scheduler.is_empty());
    }

    #[test]
    fn test_repeating_rearms() {
        let mut scheduler = Scheduler::new();
        scheduler.schedule_repeating(ms(100), ms(100), "tick");

        let mut fired = Vec::new();
        while let Some((due, _)) = scheduler.pop_due(ms(350)) {
            fired.push(due);
        }
        assert_eq!(fired, vec![ms(100), ms(200), ms(300)]);
        assert_eq!(scheduler.len(), 1);
    }

    #[test]
    fn test_order_by_due_then_creation() {
        let mut scheduler = Scheduler::new();
        scheduler.schedule_at(ms(200), 'b');
        scheduler.schedule_at(ms(100), 'a');
        scheduler.schedule_at(ms(200), 'c');

        let order: Vec<char> = std::iter::from_fn(|| scheduler.pop_due(ms(500)))
            .map(|(_, t)| t)
            .collect();
        assert_eq!(order, vec!['a', 'b', 'c']);
    }

    #[test]
    fn test_cancel() {
        let mut scheduler = Scheduler::new();
        let handle = scheduler.schedule_repeating(ms(100), ms(100), ());
        assert!(scheduler.is_scheduled(handle));
        assert!(scheduler.cancel(handle));
        assert!(!scheduler.cancel(handle));
        assert_eq!(scheduler.pop_due(ms(1000)), None);
    }
}
