use std::collections::HashSet;

use chrono::NaiveDate;

use crate::models::JobRecord;

/// Merge result lists given in priority order.
///
/// Records sharing a case-insensitive `(title, company)` keep only their
/// first occurrence. The survivors are ordered most recent first; equal ages
/// keep their input order.
pub fn merge(lists: Vec<Vec<JobRecord>>, today: NaiveDate) -> Vec<JobRecord> {
    let mut seen = HashSet::new();
    let mut merged: Vec<JobRecord> = lists
        .into_iter()
        .flatten()
        .filter(|record| seen.insert(record.dedup_key()))
        .collect();

    // sort_by_key is stable.
    merged.sort_by_key(|record| record.posted_date.age_days(today));
    ensure_unique_ids(&mut merged);
    merged
}

/// Give every record in a result set its own id.
///
/// The first holder of an id keeps it; later repeats get their position in
/// the list appended (`indeed_ab12_3`).
pub fn ensure_unique_ids(records: &mut [JobRecord]) {
    let mut seen = HashSet::new();
    for (index, record) in records.iter_mut().enumerate() {
        if seen.insert(record.id.clone()) {
            continue;
        }
        let mut suffix = index;
        let mut candidate = format!("{}_{suffix}", record.id);
        while !seen.insert(candidate.clone()) {
            suffix += 1;
            candidate = format!("{}_{suffix}", record.id);
        }
        record.id = candidate;
    }
}
