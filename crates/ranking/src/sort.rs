use std::cmp::Ordering;

/// Stable top-down merge sort.
///
/// Tolerance-based comparators are not transitive, which the standard
/// library sorts are allowed to reject. Merge sort only ever compares
/// adjacent runs, terminates for any comparator and is deterministic for a
/// fixed input order.
pub(crate) fn merge_sort_by<E, F>(items: Vec<E>, compare: &F) -> Vec<E>
where
    F: Fn(&E, &E) -> Ordering,
{
    if items.len() <= 1 {
        return items;
    }
    let mut left = items;
    let right = left.split_off(left.len() / 2);
    let left = merge_sort_by(left, compare);
    let right = merge_sort_by(right, compare);

    let mut merged = Vec::with_capacity(left.len() + right.len());
    let mut left = left.into_iter().peekable();
    let mut right = right.into_iter().peekable();
    loop {
        let take_right = match (left.peek(), right.peek()) {
            (Some(l), Some(r)) => compare(r, l) == Ordering::Less,
            (Some(_), None) => false,
            (None, Some(_)) => true,
            (None, None) => break,
        };
        let next = if take_right { right.next() } else { left.next() };
        merged.extend(next);
    }
    merged
}
