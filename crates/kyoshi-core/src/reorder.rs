use crate::library::LibraryEntry;

/// Which side of the target item the dragged item lands on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DropEdge {
    Before,
    After,
}

/// Relocate the entry with `dragged_id` next to the entry currently at
/// `target_index`. Returns the reordered sequence, always a permutation of
/// the input, or `None` when the drop is a no-op (unknown id, out-of-range
/// target, or the item would end up where it already is).
///
/// When the dragged item sits before the target, removing it shifts the
/// target left by one; the index is adjusted so the visual drop intent holds
/// in both drag directions.
pub fn drag_reorder<T: LibraryEntry + Clone>(
    entries: &[T],
    dragged_id: &str,
    target_index: usize,
    edge: DropEdge,
) -> Option<Vec<T>> {
    if target_index >= entries.len() {
        return None;
    }
    let dragged_index = entries.iter().position(|e| e.id() == dragged_id)?;
    if dragged_index == target_index {
        return None;
    }

    let mut reordered = entries.to_vec();
    let dragged = reordered.remove(dragged_index);

    let mut target = target_index;
    if dragged_index < target {
        target -= 1;
    }
    let insert_at = match edge {
        DropEdge::Before => target,
        DropEdge::After => target + 1,
    };
    if insert_at == dragged_index {
        return None;
    }

    reordered.insert(insert_at, dragged);
    Some(reordered)
}

/// Current id order of a collection, as the reorder operation expects it.
pub fn id_order<T: LibraryEntry>(entries: &[T]) -> Vec<String> {
    entries.iter().map(|e| e.id().to_string()).collect()
}
