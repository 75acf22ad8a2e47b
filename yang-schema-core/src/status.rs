//! Status/revision auditor (§4.F): the current→deprecated/obsolete
//! reference rule, and newest-first revision sorting.

use crate::model::{Revision, Status};

/// Check whether a reference from a definition with `referrer_status` (in
/// `referrer_module`) to a definition with `referent_status` (in
/// `referent_module`) is legal. Within the same module the referent must be
/// no more deprecated than the referrer; cross-module references are
/// unconstrained (§4.F).
pub fn check_status(
    referrer_module: &str,
    referrer_status: Status,
    referent_module: &str,
    referent_status: Status,
) -> bool {
    if referrer_module != referent_module {
        return true;
    }
    referent_status <= referrer_status
}

/// Place the lexicographically (== chronologically, for `YYYY-MM-DD`)
/// largest date at index 0 with a single pass and one swap. The rest of
/// the slice is left in whatever order it arrived in (§4.F: "not required
/// to be ordered").
pub fn sort_revisions(revs: &mut [Revision]) {
    if revs.len() < 2 {
        return;
    }
    let mut max_idx = 0;
    for (i, r) in revs.iter().enumerate().skip(1) {
        if r.date > revs[max_idx].date {
            max_idx = i;
        }
    }
    revs.swap(0, max_idx);
}
