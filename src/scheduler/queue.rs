/*!
 * Pending-Work Store
 * Priority-ordered collection of tasks waiting for the worker
 *
 * Callers hold the scheduler's queue lock for every operation.
 */

use super::entry::{ByEligibility, ByUrgency};
use super::task::Task;
use super::types::DelayPolicy;
use crate::core::id::TaskId;
use std::collections::BinaryHeap;
use std::time::Instant;

/// Result of asking the store for work
#[derive(Debug)]
pub(super) enum Poll {
    /// Task popped and ready to execute
    Ready(Task),
    /// Nothing can run before this instant
    Pending(Instant),
    /// Store is empty
    Empty,
}

#[derive(Debug)]
pub(super) struct PendingStore {
    policy: DelayPolicy,
    // Every task under HeadOfLine; only eligible tasks under EligibleFirst
    queue: BinaryHeap<ByUrgency>,
    // Not-yet-eligible tasks under EligibleFirst; unused under HeadOfLine
    delayed: BinaryHeap<ByEligibility>,
}

impl PendingStore {
    pub fn new(policy: DelayPolicy) -> Self {
        Self {
            policy,
            queue: BinaryHeap::new(),
            delayed: BinaryHeap::new(),
        }
    }

    pub fn push(&mut self, task: Task, now: Instant) {
        match self.policy {
            DelayPolicy::EligibleFirst if !task.is_eligible(now) => {
                self.delayed.push(ByEligibility(task))
            }
            _ => self.queue.push(ByUrgency(task)),
        }
    }

    /// Pop the next task to execute if one may run at `now`
    pub fn poll(&mut self, now: Instant) -> Poll {
        match self.policy {
            DelayPolicy::HeadOfLine => {
                let eligible_at = match self.queue.peek() {
                    Some(top) => top.0.eligible_at(),
                    None => return Poll::Empty,
                };
                if eligible_at <= now {
                    self.queue.pop().map_or(Poll::Empty, |entry| Poll::Ready(entry.0))
                } else {
                    Poll::Pending(eligible_at)
                }
            }
            DelayPolicy::EligibleFirst => {
                self.promote(now);
                if let Some(entry) = self.queue.pop() {
                    Poll::Ready(entry.0)
                } else if let Some(next) = self.delayed.peek() {
                    Poll::Pending(next.0.eligible_at())
                } else {
                    Poll::Empty
                }
            }
        }
    }

    /// Move delayed tasks whose time has come into the eligible queue
    fn promote(&mut self, now: Instant) {
        while self
            .delayed
            .peek()
            .is_some_and(|next| next.0.is_eligible(now))
        {
            if let Some(entry) = self.delayed.pop() {
                self.queue.push(ByUrgency(entry.0));
            }
        }
    }

    /// The task the worker would consider next, without removing it
    pub fn peek(&self) -> Option<&Task> {
        match self.policy {
            DelayPolicy::HeadOfLine => self.queue.peek().map(|e| &e.0),
            DelayPolicy::EligibleFirst => self
                .queue
                .peek()
                .map(|e| &e.0)
                .or_else(|| self.delayed.peek().map(|e| &e.0)),
        }
    }

    /// Remove a pending task by id - O(n) rebuild (unavoidable with BinaryHeap)
    pub fn remove(&mut self, id: TaskId) -> Option<Task> {
        take_where(&mut self.queue, |e| e.0.id() == id)
            .map(|e| e.0)
            .or_else(|| take_where(&mut self.delayed, |e| e.0.id() == id).map(|e| e.0))
    }

    /// Empty the store, most urgent first
    pub fn drain(&mut self) -> Vec<Task> {
        let mut tasks: Vec<Task> = self
            .queue
            .drain()
            .map(|e| e.0)
            .chain(self.delayed.drain().map(|e| e.0))
            .collect();
        tasks.sort_by(super::entry::compare_urgency);
        tasks
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.queue.len() + self.delayed.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.queue.is_empty() && self.delayed.is_empty()
    }
}

fn take_where<T: Ord>(heap: &mut BinaryHeap<T>, mut pred: impl FnMut(&T) -> bool) -> Option<T> {
    if !heap.iter().any(&mut pred) {
        return None;
    }

    let mut found = None;
    let rest: Vec<T> = std::mem::take(heap)
        .into_vec()
        .into_iter()
        .filter_map(|e| {
            if found.is_none() && pred(&e) {
                found = Some(e);
                None
            } else {
                Some(e)
            }
        })
        .collect();
    *heap = BinaryHeap::from(rest);
    found
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scheduler::task::test_support::task;
    use proptest::prelude::*;
    use std::time::Duration;

    fn ready_id(poll: Poll) -> u64 {
        match poll {
            Poll::Ready(task) => task.id().0,
            other => panic!("expected a ready task, got {:?}", other),
        }
    }

    #[test]
    fn test_empty_store() {
        let mut store = PendingStore::new(DelayPolicy::HeadOfLine);
        assert!(store.is_empty());
        assert!(matches!(store.poll(Instant::now()), Poll::Empty));
    }

    #[test]
    fn test_priority_order_with_ties() {
        let now = Instant::now();
        let mut store = PendingStore::new(DelayPolicy::HeadOfLine);
        for (id, priority) in [(0, 3), (1, 1), (2, 2), (3, 1)] {
            store.push(task(id, priority, now), now);
        }

        let order: Vec<u64> = (0..4).map(|_| ready_id(store.poll(now))).collect();
        assert_eq!(order, vec![1, 3, 2, 0]);
        assert!(store.is_empty());
    }

    #[test]
    fn test_head_of_line_blocks_behind_delayed_top() {
        let now = Instant::now();
        let later = now + Duration::from_millis(200);
        let mut store = PendingStore::new(DelayPolicy::HeadOfLine);
        store.push(task(0, 1, later), now);
        store.push(task(1, 5, now), now);

        match store.poll(now) {
            Poll::Pending(at) => assert_eq!(at, later),
            other => panic!("expected pending, got {:?}", other),
        }
        assert_eq!(store.len(), 2);

        assert_eq!(ready_id(store.poll(later)), 0);
        assert_eq!(ready_id(store.poll(later)), 1);
    }

    #[test]
    fn test_eligible_first_runs_ready_work_under_delayed_top() {
        let now = Instant::now();
        let later = now + Duration::from_millis(200);
        let mut store = PendingStore::new(DelayPolicy::EligibleFirst);
        store.push(task(0, 1, later), now);
        store.push(task(1, 5, now), now);

        assert_eq!(ready_id(store.poll(now)), 1);
        match store.poll(now) {
            Poll::Pending(at) => assert_eq!(at, later),
            other => panic!("expected pending, got {:?}", other),
        }
        assert_eq!(ready_id(store.poll(later)), 0);
        assert!(matches!(store.poll(later), Poll::Empty));
    }

    #[test]
    fn test_eligible_first_promotes_by_priority() {
        let now = Instant::now();
        let mut store = PendingStore::new(DelayPolicy::EligibleFirst);
        store.push(task(0, 9, now + Duration::from_millis(5)), now);
        store.push(task(1, 2, now + Duration::from_millis(10)), now);
        store.push(task(2, 4, now), now);

        let at = now + Duration::from_millis(10);
        let order: Vec<u64> = (0..3).map(|_| ready_id(store.poll(at))).collect();
        assert_eq!(order, vec![1, 2, 0]);
    }

    #[test]
    fn test_peek_does_not_pop() {
        let now = Instant::now();
        let mut store = PendingStore::new(DelayPolicy::EligibleFirst);
        store.push(task(7, 0, now + Duration::from_secs(1)), now);
        assert_eq!(store.peek().map(|t| t.id()), Some(TaskId(7)));
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_remove_from_either_structure() {
        let now = Instant::now();
        let mut store = PendingStore::new(DelayPolicy::EligibleFirst);
        store.push(task(0, 1, now), now);
        store.push(task(1, 1, now + Duration::from_secs(1)), now);
        store.push(task(2, 1, now), now);

        assert_eq!(store.remove(TaskId(1)).map(|t| t.id()), Some(TaskId(1)));
        assert_eq!(store.remove(TaskId(2)).map(|t| t.id()), Some(TaskId(2)));
        assert!(store.remove(TaskId(2)).is_none());
        assert!(store.remove(TaskId(99)).is_none());
        assert_eq!(store.len(), 1);
        assert_eq!(ready_id(store.poll(now)), 0);
    }

    #[test]
    fn test_drain_returns_everything() {
        let now = Instant::now();
        let mut store = PendingStore::new(DelayPolicy::EligibleFirst);
        store.push(task(0, 3, now), now);
        store.push(task(1, 1, now + Duration::from_secs(5)), now);
        store.push(task(2, 2, now), now);

        let ids: Vec<u64> = store.drain().iter().map(|t| t.id().0).collect();
        assert_eq!(ids, vec![1, 2, 0]);
        assert!(store.is_empty());
    }

    proptest! {
        #[test]
        fn prop_eligible_tasks_pop_in_urgency_order(
            priorities in prop::collection::vec(-50i32..50, 0..64),
            eligible_first in any::<bool>(),
        ) {
            let policy = if eligible_first { DelayPolicy::EligibleFirst } else { DelayPolicy::HeadOfLine };
            let now = Instant::now();
            let mut store = PendingStore::new(policy);
            for (id, priority) in priorities.iter().enumerate() {
                store.push(task(id as u64, *priority, now), now);
            }

            let mut popped = Vec::new();
            while let Poll::Ready(task) = store.poll(now) {
                popped.push((task.priority(), task.id().0));
            }

            prop_assert_eq!(popped.len(), priorities.len());
            let mut expected = popped.clone();
            expected.sort();
            prop_assert_eq!(popped, expected);
        }

        #[test]
        fn prop_eligible_first_never_pops_future_work(
            offsets in prop::collection::vec((0u64..100, -10i32..10), 1..32),
            probe in 0u64..100,
        ) {
            let base = Instant::now();
            let mut store = PendingStore::new(DelayPolicy::EligibleFirst);
            for (id, (offset, priority)) in offsets.iter().enumerate() {
                store.push(task(id as u64, *priority, base + Duration::from_millis(*offset)), base);
            }

            let now = base + Duration::from_millis(probe);
            let expected_ready = offsets.iter().filter(|(offset, _)| *offset <= probe).count();
            let mut ready = 0;
            while let Poll::Ready(task) = store.poll(now) {
                prop_assert!(task.is_eligible(now));
                ready += 1;
            }
            prop_assert_eq!(ready, expected_ready);
            prop_assert_eq!(store.len(), offsets.len() - expected_ready);
        }
    }
}
