use crate::model::{SortColumn, SortDirection, User};
use std::cmp::Ordering;

fn compare(a: &User, b: &User, column: SortColumn, direction: SortDirection) -> Ordering {
    let ord = a.field(column).cmp(b.field(column));
    match direction {
        SortDirection::Ascending => ord,
        SortDirection::Descending => ord.reverse(),
    }
}

/// Borrowed view of `users` ordered by `column`. The sort is stable, so equal
/// keys keep their input order in either direction.
pub fn sorted_view(users: &[User], column: SortColumn, direction: SortDirection) -> Vec<&User> {
    let mut view: Vec<&User> = users.iter().collect();
    view.sort_by(|a, b| compare(a, b, column, direction));
    view
}
