//! Virtual-time task scheduler.
//!
//! Every piece of deferred work (timer ticks, round transitions, microgame
//! timers and animation frames) is a [`ScheduledTask`] in one queue ordered
//! by due time, then by scheduling order. Tasks are tagged with the round
//! they belong to so a round's outstanding work can be cancelled in one
//! call when it is torn down.

use std::collections::BTreeMap;
use std::time::Duration;

use microrush_core::microgame::{RoundId, TimerTag};
use tracing::trace;

/// Cancellation token for a scheduled task.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TaskId(u64);

/// What a scheduled task does when it fires.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Task {
    /// One step of the round timer.
    Tick,
    /// Start the next round after win/fail feedback.
    NextRound,
    /// End the session after the last life was lost.
    GameOver,
    /// A microgame timer.
    MicrogameTimer(TimerTag),
    /// A microgame animation frame.
    MicrogameFrame,
}

/// A task waiting in the queue.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScheduledTask {
    /// Cancellation token.
    pub id: TaskId,
    /// Virtual time at which the task fires.
    pub due: Duration,
    /// Round the task belongs to.
    pub round: RoundId,
    /// The work to do.
    pub task: Task,
}

/// Single-threaded queue of pending tasks over a virtual clock.
#[derive(Debug, Default)]
pub struct Scheduler {
    now: Duration,
    next_id: u64,
    queue: BTreeMap<(Duration, TaskId), ScheduledTask>,
}

impl Scheduler {
    /// Creates an empty scheduler at time zero.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Current virtual time.
    #[must_use]
    pub fn now(&self) -> Duration {
        self.now
    }

    /// Number of pending tasks.
    #[must_use]
    pub fn pending(&self) -> usize {
        self.queue.len()
    }

    /// Whether `id` is still pending.
    #[must_use]
    pub fn is_pending(&self, id: TaskId) -> bool {
        self.queue.values().any(|t| t.id == id)
    }

    /// Whether any pending task for `round` matches `task`.
    #[must_use]
    pub fn has_pending(&self, round: RoundId, task: Task) -> bool {
        self.queue
            .values()
            .any(|t| t.round == round && t.task == task)
    }

    /// Schedules `task` to fire `delay` from now.
    pub fn schedule_in(&mut self, delay: Duration, round: RoundId, task: Task) -> TaskId {
        let id = TaskId(self.next_id);
        self.next_id += 1;
        let due = self.now.saturating_add(delay);
        trace!(?task, %round, due_ms = due.as_millis(), "scheduled task");
        self.queue.insert(
            (due, id),
            ScheduledTask {
                id,
                due,
                round,
                task,
            },
        );
        id
    }

    /// Cancels one task. Returns whether it was still pending.
    pub fn cancel(&mut self, id: TaskId) -> bool {
        let before = self.queue.len();
        self.queue.retain(|_, t| t.id != id);
        before != self.queue.len()
    }

    /// Cancels every pending task of `round`. Returns how many were removed.
    pub fn cancel_round(&mut self, round: RoundId) -> usize {
        let before = self.queue.len();
        self.queue.retain(|_, t| t.round != round);
        before - self.queue.len()
    }

    /// Cancels the pending tasks of `round` equal to `task`.
    pub fn cancel_matching(&mut self, round: RoundId, task: Task) -> usize {
        let before = self.queue.len();
        self.queue
            .retain(|_, t| !(t.round == round && t.task == task));
        before - self.queue.len()
    }

    /// Cancels everything.
    pub fn clear(&mut self) {
        self.queue.clear();
    }

    /// Removes and returns the earliest task due at or before `deadline`,
    /// moving the clock to its due time.
    pub fn pop_due(&mut self, deadline: Duration) -> Option<ScheduledTask> {
        let (&key, _) = self.queue.first_key_value()?;
        if key.0 > deadline {
            return None;
        }
        let task = self.queue.remove(&key)?;
        self.now = self.now.max(task.due);
        Some(task)
    }

    /// Moves the clock forward to `deadline` (never backwards).
    pub fn advance_to(&mut self, deadline: Duration) {
        self.now = self.now.max(deadline);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ms(value: u64) -> Duration {
        Duration::from_millis(value)
    }

    #[test]
    fn test_pop_due_returns_tasks_in_due_order() {
        let mut scheduler = Scheduler::new();
        scheduler.schedule_in(ms(30), RoundId(1), Task::NextRound);
        scheduler.schedule_in(ms(10), RoundId(1), Task::Tick);
        scheduler.schedule_in(ms(20), RoundId(1), Task::MicrogameFrame);

        let order: Vec<Task> = std::iter::from_fn(|| scheduler.pop_due(ms(100)))
            .map(|t| t.task)
            .collect();

        assert_eq!(order, vec![Task::Tick, Task::MicrogameFrame, Task::NextRound]);
    }

    #[test]
    fn test_ties_fire_in_scheduling_order() {
        let mut scheduler = Scheduler::new();
        scheduler.schedule_in(ms(16), RoundId(1), Task::MicrogameTimer(TimerTag(7)));
        scheduler.schedule_in(ms(16), RoundId(1), Task::Tick);

        assert_eq!(
            scheduler.pop_due(ms(16)).unwrap().task,
            Task::MicrogameTimer(TimerTag(7))
        );
        assert_eq!(scheduler.pop_due(ms(16)).unwrap().task, Task::Tick);
    }

    #[test]
    fn test_pop_due_moves_clock_to_task_time() {
        let mut scheduler = Scheduler::new();
        scheduler.schedule_in(ms(16), RoundId(1), Task::Tick);

        scheduler.pop_due(ms(100)).unwrap();

        assert_eq!(scheduler.now(), ms(16));
    }

    #[test]
    fn test_pop_due_leaves_future_tasks() {
        let mut scheduler = Scheduler::new();
        scheduler.schedule_in(ms(50), RoundId(1), Task::Tick);

        assert!(scheduler.pop_due(ms(49)).is_none());
        assert_eq!(scheduler.pending(), 1);
    }

    #[test]
    fn test_cancel_removes_single_task() {
        let mut scheduler = Scheduler::new();
        let tick = scheduler.schedule_in(ms(16), RoundId(1), Task::Tick);
        scheduler.schedule_in(ms(16), RoundId(1), Task::MicrogameFrame);

        assert!(scheduler.cancel(tick));
        assert!(!scheduler.cancel(tick));
        assert!(!scheduler.is_pending(tick));
        assert_eq!(scheduler.pending(), 1);
    }

    #[test]
    fn test_cancel_round_removes_only_that_round() {
        let mut scheduler = Scheduler::new();
        scheduler.schedule_in(ms(16), RoundId(1), Task::Tick);
        scheduler.schedule_in(ms(200), RoundId(1), Task::MicrogameTimer(TimerTag(1)));
        scheduler.schedule_in(ms(16), RoundId(2), Task::Tick);

        let removed = scheduler.cancel_round(RoundId(1));

        assert_eq!(removed, 2);
        assert_eq!(scheduler.pending(), 1);
        assert!(scheduler.has_pending(RoundId(2), Task::Tick));
    }

    #[test]
    fn test_cancel_matching_targets_one_timer_tag() {
        let mut scheduler = Scheduler::new();
        scheduler.schedule_in(ms(100), RoundId(1), Task::MicrogameTimer(TimerTag(1)));
        scheduler.schedule_in(ms(100), RoundId(1), Task::MicrogameTimer(TimerTag(2)));

        let removed = scheduler.cancel_matching(RoundId(1), Task::MicrogameTimer(TimerTag(1)));

        assert_eq!(removed, 1);
        assert!(scheduler.has_pending(RoundId(1), Task::MicrogameTimer(TimerTag(2))));
    }

    #[test]
    fn test_advance_to_never_moves_backwards() {
        let mut scheduler = Scheduler::new();
        scheduler.advance_to(ms(100));
        scheduler.advance_to(ms(50));

        assert_eq!(scheduler.now(), ms(100));
    }

    #[test]
    fn test_delays_are_relative_to_current_time() {
        let mut scheduler = Scheduler::new();
        scheduler.advance_to(ms(1000));

        scheduler.schedule_in(ms(16), RoundId(1), Task::Tick);

        assert_eq!(scheduler.pop_due(ms(1016)).unwrap().due, ms(1016));
    }
}
