//! Position sequencing for template groups.
//!
//! Every `(project_id, tracker_id)` group keeps its templates at positions
//! `1..=n` with no gaps and no duplicates. The functions here compute which
//! positions have to move for an insert, a move, or a removal; the storage
//! layer executes the resulting [`Shift`] as a single range update.

use crate::error::CoreError;
use crate::types::Position;

/// The first position in every group.
pub const FIRST_POSITION: Position = 1;

/// A contiguous block of positions that moves by `delta`.
///
/// Both bounds are inclusive.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Shift {
    pub from: Position,
    pub to: Position,
    pub delta: Position,
}

impl Shift {
    /// Whether `position` falls inside the shifted block.
    pub fn contains(&self, position: Position) -> bool {
        position >= self.from && position <= self.to
    }

    /// The new value of `position` once the shift has been applied.
    pub fn apply(&self, position: Position) -> Position {
        if self.contains(position) {
            position + self.delta
        } else {
            position
        }
    }
}

/// Anything that carries a manual position.
pub trait Positioned {
    fn position(&self) -> Position;
}

/// Position assigned to a template appended to a group of `group_size`.
pub fn next_position(group_size: i64) -> Position {
    Position::try_from(group_size).map_or(Position::MAX, |n| n.saturating_add(1))
}

/// Reject positions outside `[1, group_size]`.
pub fn validate_position(position: Position, group_size: i64) -> Result<(), CoreError> {
    if position < FIRST_POSITION || i64::from(position) > group_size {
        return Err(CoreError::InvalidPosition {
            position,
            group_size,
        });
    }
    Ok(())
}

/// Plan moving the template at `current` to `target`.
///
/// Moving forward pulls `(current, target]` down by one; moving backward
/// pushes `[target, current)` up by one. Returns `None` when the template
/// is already at `target`.
pub fn plan_move(
    current: Position,
    target: Position,
    group_size: i64,
) -> Result<Option<Shift>, CoreError> {
    validate_position(target, group_size)?;

    let shift = match current.cmp(&target) {
        std::cmp::Ordering::Equal => None,
        std::cmp::Ordering::Less => Some(Shift {
            from: current + 1,
            to: target,
            delta: -1,
        }),
        std::cmp::Ordering::Greater => Some(Shift {
            from: target,
            to: current - 1,
            delta: 1,
        }),
    };
    Ok(shift)
}

/// Plan closing the gap left by removing `removed` from a group that had
/// `group_size` members before the removal.
pub fn plan_compaction(removed: Position, group_size: i64) -> Option<Shift> {
    let last = Position::try_from(group_size).unwrap_or(Position::MAX);
    if removed >= last {
        return None;
    }
    Some(Shift {
        from: removed + 1,
        to: last,
        delta: -1,
    })
}

/// Sort ascending by position, the only supported manual order.
pub fn sort_by_position<T: Positioned>(items: &mut [T]) {
    items.sort_by_key(Positioned::position);
}

/// Whether `positions` is exactly `{1, ..., n}` in any order.
pub fn is_contiguous(positions: &[Position]) -> bool {
    let mut sorted = positions.to_vec();
    sorted.sort_unstable();
    sorted
        .iter()
        .enumerate()
        .all(|(idx, &p)| i64::from(p) == idx as i64 + 1)
}
