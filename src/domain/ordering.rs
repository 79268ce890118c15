//! Stable weight ordering for sibling and root lists
//!
//! The weight comparator treats missing and incomparable weights as equal,
//! so it is not a total order. `slice::sort_by` may panic on such
//! comparators; an insertion sort keeps the result deterministic and stable.
//! Sibling lists are small, so the quadratic worst case is fine.

use std::cmp::Ordering;

use crate::domain::error::DomainResult;
use crate::domain::node::TreeNode;

/// Stable insertion sort driven by a fallible comparator.
///
/// An element moves left only past neighbours that compare strictly
/// greater, so equal elements keep their input order.
pub fn stable_sort_by<T, F>(items: &mut [T], mut compare: F) -> DomainResult<()>
where
    F: FnMut(&T, &T) -> DomainResult<Ordering>,
{
    for i in 1..items.len() {
        let mut j = i;
        while j > 0 && compare(&items[j - 1], &items[j])? == Ordering::Greater {
            items.swap(j - 1, j);
            j -= 1;
        }
    }
    Ok(())
}

/// Sorts nodes by weight, keeping input order among ties.
pub fn sort_by_weight(nodes: &mut [TreeNode]) -> DomainResult<()> {
    stable_sort_by(nodes, |a, b| a.compare_weight(b))
}
