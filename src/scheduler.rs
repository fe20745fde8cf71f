//! Periodic task scheduler
//!
//! Countdown, spawning and input polling each run on their own cadence,
//! independent of the display refresh. The scheduler is driven by whatever
//! clock the caller has (RAF timestamps in the browser, a fixed step
//! natively) and hands back the tasks that came due.

use crate::consts::MAX_CATCHUP_FIRINGS;

/// Cancellation handle returned by [`Scheduler::register`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TaskHandle(u32);

#[derive(Debug, Clone)]
struct Entry<T> {
    handle: TaskHandle,
    task: T,
    period_ms: f64,
    next_due_ms: f64,
}

/// Fixed-period task table
#[derive(Debug, Clone)]
pub struct Scheduler<T> {
    entries: Vec<Entry<T>>,
    next_handle: u32,
}

impl<T> Default for Scheduler<T> {
    fn default() -> Self {
        Self {
            entries: Vec::new(),
            next_handle: 1,
        }
    }
}

impl<T: Copy> Scheduler<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Schedule `task` every `period_ms`, first firing one period after `now_ms`
    pub fn register(&mut self, task: T, period_ms: f64, now_ms: f64) -> TaskHandle {
        let period_ms = if period_ms.is_finite() {
            period_ms.max(1.0)
        } else {
            1.0
        };
        let handle = TaskHandle(self.next_handle);
        self.next_handle += 1;
        self.entries.push(Entry {
            handle,
            task,
            period_ms,
            next_due_ms: now_ms + period_ms,
        });
        handle
    }

    /// Returns false if the handle was already cancelled
    pub fn cancel(&mut self, handle: TaskHandle) -> bool {
        let before = self.entries.len();
        self.entries.retain(|e| e.handle != handle);
        self.entries.len() != before
    }

    pub fn cancel_all(&mut self) {
        if !self.entries.is_empty() {
            log::debug!("Cancelling {} scheduled tasks", self.entries.len());
        }
        self.entries.clear();
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Collect every firing due at or before `now_ms`, oldest first
    ///
    /// A task that fell far behind (tab in background) fires at most
    /// `MAX_CATCHUP_FIRINGS` times and is then re-anchored to `now_ms`.
    pub fn advance(&mut self, now_ms: f64) -> Vec<T> {
        let mut fired: Vec<(f64, usize, T)> = Vec::new();

        for (order, entry) in self.entries.iter_mut().enumerate() {
            let mut count = 0;
            while entry.next_due_ms <= now_ms && count < MAX_CATCHUP_FIRINGS {
                fired.push((entry.next_due_ms, order, entry.task));
                entry.next_due_ms += entry.period_ms;
                count += 1;
            }
            if entry.next_due_ms <= now_ms {
                log::debug!("Scheduler re-anchored a task after {} catch-up firings", count);
                entry.next_due_ms = now_ms + entry.period_ms;
            }
        }

        fired.sort_by(|a, b| a.0.total_cmp(&b.0).then(a.1.cmp(&b.1)));
        fired.into_iter().map(|(_, _, task)| task).collect()
    }
}
