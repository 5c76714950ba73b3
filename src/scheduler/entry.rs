/*!
 * Scheduler Entry Types
 * Heap wrappers that order pending tasks
 */

use super::task::Task;
use std::cmp::Ordering;

/// Urgency rule: `Less` means `a` runs before `b`
///
/// Lower priority value first, then earlier submission (lower id).
#[inline]
pub(crate) fn compare_urgency(a: &Task, b: &Task) -> Ordering {
    a.priority()
        .cmp(&b.priority())
        .then_with(|| a.id().cmp(&b.id()))
}

/// Max-heap entry whose top is the most urgent task
#[derive(Debug)]
pub(super) struct ByUrgency(pub Task);

impl PartialEq for ByUrgency {
    fn eq(&self, other: &Self) -> bool {
        self.0.id() == other.0.id()
    }
}

impl Eq for ByUrgency {}

impl Ord for ByUrgency {
    fn cmp(&self, other: &Self) -> Ordering {
        // BinaryHeap is a max-heap, so the most urgent task must compare greatest
        compare_urgency(&self.0, &other.0).reverse()
    }
}

impl PartialOrd for ByUrgency {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Max-heap entry whose top is the task that becomes eligible soonest
#[derive(Debug)]
pub(super) struct ByEligibility(pub Task);

impl PartialEq for ByEligibility {
    fn eq(&self, other: &Self) -> bool {
        self.0.id() == other.0.id()
    }
}

impl Eq for ByEligibility {}

impl Ord for ByEligibility {
    fn cmp(&self, other: &Self) -> Ordering {
        other
            .0
            .eligible_at()
            .cmp(&self.0.eligible_at())
            .then_with(|| compare_urgency(&self.0, &other.0).reverse())
    }
}

impl PartialOrd for ByEligibility {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scheduler::task::test_support::task;
    use std::collections::BinaryHeap;
    use std::time::{Duration, Instant};

    #[test]
    fn test_lower_priority_value_is_more_urgent() {
        let now = Instant::now();
        assert_eq!(compare_urgency(&task(5, 1, now), &task(0, 3, now)), Ordering::Less);
        assert_eq!(compare_urgency(&task(0, -2, now), &task(1, 0, now)), Ordering::Less);
    }

    #[test]
    fn test_ties_broken_by_id() {
        let now = Instant::now();
        assert_eq!(compare_urgency(&task(1, 4, now), &task(2, 4, now)), Ordering::Less);
        assert_eq!(compare_urgency(&task(2, 4, now), &task(2, 4, now)), Ordering::Equal);
    }

    #[test]
    fn test_urgency_heap_pops_in_order() {
        let now = Instant::now();
        let mut heap = BinaryHeap::new();
        for (id, priority) in [(0, 3), (1, 1), (2, 2), (3, 1)] {
            heap.push(ByUrgency(task(id, priority, now)));
        }
        let order: Vec<u64> = std::iter::from_fn(|| heap.pop().map(|e| e.0.id().0)).collect();
        assert_eq!(order, vec![1, 3, 2, 0]);
    }

    #[test]
    fn test_eligibility_heap_pops_soonest_first() {
        let now = Instant::now();
        let mut heap = BinaryHeap::new();
        heap.push(ByEligibility(task(0, 0, now + Duration::from_millis(30))));
        heap.push(ByEligibility(task(1, 9, now + Duration::from_millis(10))));
        heap.push(ByEligibility(task(2, 5, now + Duration::from_millis(20))));
        let order: Vec<u64> = std::iter::from_fn(|| heap.pop().map(|e| e.0.id().0)).collect();
        assert_eq!(order, vec![1, 2, 0]);
    }
}
