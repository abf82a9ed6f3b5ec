//! Position ledger: capacity bookkeeping for named position slots.
//!
//! Each project offers a set of named positions (e.g. "DEV"), each with an
//! offered capacity (`open_cnt`) and a currently-filled count (`close_cnt`).
//! The ledger is pure in-memory mutation; persisting the rows atomically is
//! the caller's job.

use std::collections::HashMap;

use crate::error::CoreError;

/// A requested position with its offered capacity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PositionRequest {
    pub name: String,
    pub count: i32,
}

/// One ledger row: capacity vs. filled count for a named position.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PositionSlot {
    pub position: String,
    pub open_cnt: i32,
    pub close_cnt: i32,
}

/// Build the initial ledger rows for a new project.
///
/// If `reserved` matches one of the requested names (case-insensitive, the
/// creator takes that seat immediately), its row starts with `close_cnt = 1`.
pub fn initialize(requested: &[PositionRequest], reserved: Option<&str>) -> Vec<PositionSlot> {
    let reserved_lower = reserved.map(str::to_lowercase);
    requested
        .iter()
        .map(|req| PositionSlot {
            position: req.name.clone(),
            open_cnt: req.count,
            close_cnt: match &reserved_lower {
                Some(r) if req.name.to_lowercase() == *r => 1,
                _ => 0,
            },
        })
        .collect()
}

/// True iff a row exists for `position` with spare capacity.
pub fn has_open_slot(slots: &[PositionSlot], position: &str) -> bool {
    slots
        .iter()
        .any(|s| s.position == position && s.open_cnt > s.close_cnt)
}

/// Rewrite the ledger to a new set of requested positions.
///
/// Fails with [`CoreError::CapacityConflict`] when any currently-filled
/// position would be orphaned: its name is absent from `requested`, or its
/// new capacity is below the filled count. On success every existing row is
/// rewritten (rows absent from `requested` are zeroed, not removed) and new
/// names are appended.
pub fn resize(
    slots: &mut Vec<PositionSlot>,
    requested: &[PositionRequest],
    filled: &HashMap<String, i32>,
) -> Result<(), CoreError> {
    for (position, &count) in filled {
        if count == 0 {
            continue;
        }
        let new_cap = requested.iter().find(|r| &r.name == position).map(|r| r.count);
        match new_cap {
            Some(cap) if cap >= count => {}
            _ => {
                return Err(CoreError::CapacityConflict(format!(
                    "Position '{position}' has {count} member(s) and cannot be removed or shrunk below that"
                )));
            }
        }
    }

    for slot in slots.iter_mut() {
        slot.open_cnt = 0;
        slot.close_cnt = 0;
    }

    for req in requested {
        let current = filled.get(&req.name).copied().unwrap_or(0);
        match slots.iter().position(|s| s.position == req.name) {
            Some(i) => {
                slots[i].open_cnt = req.count;
                slots[i].close_cnt = current;
            }
            None => slots.push(PositionSlot {
                position: req.name.clone(),
                open_cnt: req.count,
                close_cnt: current,
            }),
        }
    }

    Ok(())
}

/// Set every row's `close_cnt` from the given filled counts (0 if absent).
///
/// Used after approve/disapprove; `open_cnt` is untouched.
pub fn recompute_filled(slots: &mut [PositionSlot], filled: &HashMap<String, i32>) {
    for slot in slots.iter_mut() {
        slot.close_cnt = filled.get(&slot.position).copied().unwrap_or(0);
    }
}
