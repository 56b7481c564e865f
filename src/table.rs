//! Dense comparison table from sparse series
//!
//! Every series is laid onto one grid row per tick between the earliest and
//! latest recorded timestamp, one column per `(operation, target)` pair.
//! Cells without a sample hold the sentinel `0` until the gap fill runs:
//!
//! - first row: the next recorded value below it
//! - last row: the nearest value above it
//! - interior: `floor((9 * prev + next) / 10)`, leaning on the value above
//!   to mimic a ramp-up rather than interpolating linearly
//!
//! Rows are filled top to bottom in place, so `prev` for an interior cell is
//! the cell directly above once it has been filled itself.

use tracing::debug;

use crate::client::AccessMode;
use crate::error::{WorkloadError, WorkloadResult};
use crate::result::{ResultSet, Value};
use crate::store::MetricStore;

/// Marks a cell that has no sample yet
pub const SENTINEL: i64 = 0;

pub const TIMESTAMP_COLUMN: &str = "timestamp";

/// Upper bound on table rows, one per tick
pub const MAX_ROWS: usize = 1_000_000;

#[derive(Debug, Clone, Copy)]
enum Direction {
    Up,
    Down,
}

/// Column name for an `(operation, target)` pair
pub fn column_name(operation: AccessMode, target_id: &str) -> String {
    format!("{operation}:{target_id}")
}

/// Build the table for the given targets, columns in the order given
pub fn build_table<'a>(
    store: &MetricStore,
    target_ids: impl IntoIterator<Item = &'a str>,
) -> WorkloadResult<ResultSet> {
    let columns: Vec<(&str, AccessMode)> = target_ids
        .into_iter()
        .flat_map(|id| AccessMode::ALL.into_iter().map(move |op| (id, op)))
        .collect();

    let mut table = ResultSet::new(
        std::iter::once(TIMESTAMP_COLUMN.to_string())
            .chain(columns.iter().map(|(id, op)| column_name(*op, id))),
    );

    let (min, max) = store.min_max();
    if min > max {
        debug!("no samples recorded, table is empty");
        return Ok(table);
    }

    let row_count = max
        .checked_sub(min)
        .and_then(|span| usize::try_from(span).ok())
        .and_then(|span| span.checked_add(1))
        .filter(|rows| *rows <= MAX_ROWS)
        .ok_or(WorkloadError::TickRange { min, max })?;

    let mut grid = Vec::with_capacity(columns.len());
    for (target_id, operation) in &columns {
        let mut cells = vec![SENTINEL; row_count];
        for sample in store.for_target(target_id, *operation).samples {
            // later samples on the same tick overwrite earlier ones
            cells[(sample.timestamp - min) as usize] = sample.duration;
        }

        if cells.iter().all(|cell| *cell == SENTINEL) {
            return Err(WorkloadError::DegenerateColumn(column_name(
                *operation, target_id,
            )));
        }

        fill_gaps(&mut cells);
        grid.push(cells);
    }

    for row in 0..row_count {
        let mut values = Vec::with_capacity(grid.len() + 1);
        values.push(Value::Integer(min + row as i64));
        values.extend(grid.iter().map(|cells| Value::Integer(cells[row])));
        table.push(values);
    }

    debug!(
        "built table with {row_count} rows and {} columns",
        columns.len()
    );

    Ok(table)
}

/// Replace every sentinel cell in place, top to bottom
pub fn fill_gaps(cells: &mut [i64]) {
    let Some(last) = cells.len().checked_sub(1) else {
        return;
    };

    for row in 0..cells.len() {
        if cells[row] != SENTINEL {
            continue;
        }

        cells[row] = if row == 0 {
            find_valid(cells, row, Direction::Down)
        } else if row == last {
            find_valid(cells, row, Direction::Up)
        } else {
            let prev = find_valid(cells, row, Direction::Up);
            let next = find_valid(cells, row, Direction::Down);
            (9 * prev + next).div_euclid(10)
        };
    }
}

/// Nearest non-sentinel value from `row` in `direction`, or the sentinel
fn find_valid(cells: &[i64], row: usize, direction: Direction) -> i64 {
    let found = match direction {
        Direction::Up => cells[..=row].iter().rev().find(|c| **c != SENTINEL),
        Direction::Down => cells[row..].iter().find(|c| **c != SENTINEL),
    };
    found.copied().unwrap_or(SENTINEL)
}
