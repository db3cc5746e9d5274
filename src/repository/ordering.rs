//! Pure `order_index` planning.
//!
//! Every plan numbers the resulting sequence by position, so the catalog
//! comes out dense even when the store held ties or gaps. Only rows whose
//! value actually changes are reported; for an already dense catalog that is
//! the range between the two positions of a move, or the tail after a removal.

use crate::domain::category::{Category, OrderChange};
use crate::domain::types::{OrderIndex, TypeConstraintError};

/// Resulting arrangement plus the writes needed to reach it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderPlan {
    /// Categories in their new display order, carrying their new indices.
    pub items: Vec<Category>,
    /// Rows whose `order_index` changed.
    pub changes: Vec<OrderChange>,
}

/// Index for a category appended to the end of `items`.
pub fn next_order_index(items: &[Category]) -> Result<OrderIndex, TypeConstraintError> {
    match items.iter().map(|c| c.order_index).max() {
        Some(max) => max.next(),
        None => Ok(OrderIndex::ZERO),
    }
}

/// Moves the entry at `from` to `to`.
///
/// Out-of-range positions yield an unchanged plan.
pub fn plan_move(
    items: &[Category],
    from: usize,
    to: usize,
) -> Result<OrderPlan, TypeConstraintError> {
    let mut arranged = items.to_vec();
    if from == to || from >= items.len() || to >= items.len() {
        return Ok(OrderPlan {
            items: arranged,
            changes: Vec::new(),
        });
    }

    let moved = arranged.remove(from);
    arranged.insert(to, moved);
    let changes = renumber(&mut arranged)?;

    Ok(OrderPlan {
        items: arranged,
        changes,
    })
}

/// Removes the entry at `position` and closes the gap it leaves.
pub fn plan_removal(
    items: &[Category],
    position: usize,
) -> Result<OrderPlan, TypeConstraintError> {
    let mut arranged = items.to_vec();
    if position < arranged.len() {
        arranged.remove(position);
    }
    let changes = renumber(&mut arranged)?;

    Ok(OrderPlan {
        items: arranged,
        changes,
    })
}

fn renumber(items: &mut [Category]) -> Result<Vec<OrderChange>, TypeConstraintError> {
    let mut changes = Vec::new();
    for (position, category) in items.iter_mut().enumerate() {
        let slot = OrderIndex::from_position(position)?;
        if category.order_index != slot {
            category.order_index = slot;
            changes.push(OrderChange {
                id: category.id,
                order_index: slot,
            });
        }
    }
    Ok(changes)
}

/// `true` when `items` carry exactly the indices `0..items.len()` in order.
pub fn is_dense(items: &[Category]) -> bool {
    items
        .iter()
        .enumerate()
        .all(|(position, c)| usize::try_from(c.order_index.get()).is_ok_and(|i| i == position))
}
