//! Split point (lowest common ancestor) search
//!
//! Both commits are explored breadth-first over all parents, recording the
//! distance of every reachable commit from each side. Commits reached from both
//! sides are candidate split points.
//!
//! Selection:
//! - if the target is reachable from the source, the target is the split point
//!   (and symmetrically for the source)
//! - otherwise the candidate with the smallest summed distance wins, ties broken
//!   by the distance from the source, then by the smallest id
//!
//! The traversal is iterative, so arbitrarily long histories do not grow the
//! call stack.

use crate::artifacts::objects::object_id::ObjectId;
use bitflags::bitflags;
use std::collections::{HashMap, VecDeque};
use std::fmt;

bitflags! {
    #[derive(Clone, Copy, PartialEq, Eq, Hash)]
    struct VisitState: u8 {
        const NONE = 0b00;
        const VISITED_FROM_SOURCE = 0b01;
        const VISITED_FROM_TARGET = 0b10;
        const VISITED_FROM_BOTH = Self::VISITED_FROM_SOURCE.bits() | Self::VISITED_FROM_TARGET.bits();
    }
}

impl fmt::Debug for VisitState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut flags = Vec::new();
        if self.contains(VisitState::VISITED_FROM_SOURCE) {
            flags.push("SOURCE");
        }
        if self.contains(VisitState::VISITED_FROM_TARGET) {
            flags.push("TARGET");
        }
        if flags.is_empty() {
            write!(f, "NONE")
        } else {
            write!(f, "{}", flags.join("|"))
        }
    }
}

/// Distances recorded for one commit during the search
#[derive(Debug, Clone, Copy)]
struct Visit {
    state: VisitState,
    from_source: usize,
    from_target: usize,
}

impl Default for Visit {
    fn default() -> Self {
        Visit {
            state: VisitState::NONE,
            from_source: usize::MAX,
            from_target: usize::MAX,
        }
    }
}

/// Finds the split point of two commits
///
/// The parents loader abstracts over where commits come from, so the search
/// runs the same against the object database and against in-memory graphs.
pub struct SplitPointFinder<ParentsLoaderFn>
where
    ParentsLoaderFn: Fn(&ObjectId) -> anyhow::Result<Vec<ObjectId>>,
{
    parents_loader: ParentsLoaderFn,
}

impl<ParentsLoaderFn> SplitPointFinder<ParentsLoaderFn>
where
    ParentsLoaderFn: Fn(&ObjectId) -> anyhow::Result<Vec<ObjectId>>,
{
    pub fn new(parents_loader: ParentsLoaderFn) -> Self {
        Self { parents_loader }
    }

    /// # Returns
    ///
    /// The split point, or `None` when the commits share no history
    pub fn find(&self, source: &ObjectId, target: &ObjectId) -> anyhow::Result<Option<ObjectId>> {
        if source == target {
            return Ok(Some(source.clone()));
        }

        let mut visits = HashMap::<ObjectId, Visit>::new();
        self.walk(source, VisitState::VISITED_FROM_SOURCE, &mut visits)?;
        self.walk(target, VisitState::VISITED_FROM_TARGET, &mut visits)?;

        let is_reached_from = |oid: &ObjectId, side: VisitState| {
            visits
                .get(oid)
                .map(|visit| visit.state.contains(side))
                .unwrap_or(false)
        };

        if is_reached_from(target, VisitState::VISITED_FROM_SOURCE) {
            log::trace!("{} is an ancestor of {}", target, source);
            return Ok(Some(target.clone()));
        }
        if is_reached_from(source, VisitState::VISITED_FROM_TARGET) {
            log::trace!("{} is an ancestor of {}", source, target);
            return Ok(Some(source.clone()));
        }

        let split_point = visits
            .iter()
            .filter(|(_, visit)| visit.state.contains(VisitState::VISITED_FROM_BOTH))
            .min_by(|(left_oid, left), (right_oid, right)| {
                (left.from_source + left.from_target)
                    .cmp(&(right.from_source + right.from_target))
                    .then(left.from_source.cmp(&right.from_source))
                    .then(left_oid.cmp(right_oid))
            })
            .map(|(oid, visit)| {
                log::trace!(
                    "split point {} ({:?}, {} + {})",
                    oid,
                    visit.state,
                    visit.from_source,
                    visit.from_target
                );
                oid.clone()
            });

        Ok(split_point)
    }

    fn walk(
        &self,
        start: &ObjectId,
        side: VisitState,
        visits: &mut HashMap<ObjectId, Visit>,
    ) -> anyhow::Result<()> {
        let mut queue = VecDeque::from([(start.clone(), 0usize)]);

        while let Some((oid, distance)) = queue.pop_front() {
            let visit = visits.entry(oid.clone()).or_default();
            if visit.state.contains(side) {
                continue;
            }

            visit.state |= side;
            if side == VisitState::VISITED_FROM_SOURCE {
                visit.from_source = distance;
            } else {
                visit.from_target = distance;
            }
            log::trace!("visit {} at {} ({:?})", oid, distance, visit.state);

            for parent in (self.parents_loader)(&oid)? {
                queue.push_back((parent, distance + 1));
            }
        }

        Ok(())
    }
}
