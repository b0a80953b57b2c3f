//! Text table builder for CLI output.
//!
//! Formats the user list as aligned columns for `--text` mode.

use crate::model::{Field, SortColumn, SortDirection, User};

/// Pre-formatted lines for text output.
pub(crate) struct TextTable {
    pub lines: Vec<String>,
}

/// Header labels, with the sort arrow appended to the sorted column.
fn headers(sort: SortColumn, direction: SortDirection) -> Vec<String> {
    Field::ALL
        .iter()
        .map(|f| {
            if *f == sort {
                format!("{} {}", f.label(), direction.arrow())
            } else {
                f.label().to_string()
            }
        })
        .collect()
}

/// Build an aligned table from already-sorted users.
pub(crate) fn build_text_table(
    users: &[&User],
    sort: SortColumn,
    direction: SortDirection,
) -> TextTable {
    let headers = headers(sort, direction);
    let mut widths: Vec<usize> = headers.iter().map(|h| h.chars().count()).collect();
    for u in users {
        for f in Field::ALL {
            let w = u.field(f).chars().count();
            widths[f.index()] = widths[f.index()].max(w);
        }
    }

    let render = |cells: Vec<&str>| -> String {
        cells
            .iter()
            .zip(&widths)
            .map(|(c, w)| format!("{:<width$}", c, width = *w))
            .collect::<Vec<_>>()
            .join("  ")
            .trim_end()
            .to_string()
    };

    let mut lines = Vec::with_capacity(users.len() + 2);
    lines.push(render(headers.iter().map(String::as_str).collect()));
    lines.push(
        widths
            .iter()
            .map(|w| "-".repeat(*w))
            .collect::<Vec<_>>()
            .join("  "),
    );
    for u in users {
        lines.push(render(Field::ALL.iter().map(|f| u.field(*f)).collect()));
    }
    if users.is_empty() {
        lines.push("(no users)".into());
    }

    TextTable { lines }
}
