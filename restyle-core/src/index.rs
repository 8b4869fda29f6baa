//! Sheet ordering indices
//!
//! Call-sites that do not pass an explicit index get one from a process-wide
//! counter. Automatic indices start far below zero so that sheets with
//! explicit, user-chosen indices are inserted after every automatic one.

use std::sync::atomic::{AtomicI64, Ordering};

const FIRST_INDEX: i64 = -100_000_000_000;

static NEXT_INDEX: AtomicI64 = AtomicI64::new(FIRST_INDEX);

/// Allocate the next sheet index
///
/// Strictly increasing for the life of the process; never reset.
pub fn next_sheet_index() -> i64 {
    NEXT_INDEX.fetch_add(1, Ordering::SeqCst) + 1
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn indices_strictly_increase() {
        let a = next_sheet_index();
        let b = next_sheet_index();
        let c = next_sheet_index();
        assert!(a < b && b < c);
        assert!(c < 0);
    }
}
