//! REP - inconsistency measurement and repair.
//!
//! For every unordered pair of origins, for every class/property table,
//! locates values asserted with both polarities where each polarity is
//! witnessed by at least one origin of the pair, and attributes to each
//! origin the maximum weight of any of its rows touching that table's
//! collision set. The overall degree of an origin is the max contribution
//! over all pairs and tables. Repair then cuts, per origin, every row with
//! weight `<=` that origin's degree. Grounded on
//! `godl-compile/compile.go`'s `computeInconsistencyDegrees`,
//! `computeInconsistencyDegree`, `restoreConsistancy`, `cut`.

use crate::error::Result;
use crate::store::FactStore;

/// Per-origin inconsistency degree, indexed the same way as the `origins`
/// slice passed in.
pub fn measure(store: &dyn FactStore, origins: &[String], tables: &[String]) -> Result<Vec<f64>> {
    let mut degrees = vec![0.0_f64; origins.len()];

    for i in 0..origins.len() {
        for j in (i + 1)..origins.len() {
            let pair = [origins[i].clone(), origins[j].clone()];
            for table in tables {
                for (weight, origin) in store.polarity_collisions(table, &pair)? {
                    if let Some(index) = origins.iter().position(|o| *o == origin) {
                        if weight > degrees[index] {
                            degrees[index] = weight;
                        }
                    }
                }
            }
        }
    }

    Ok(degrees)
}

/// Deletes, for every origin with a positive degree, every row of every
/// table with that origin and weight `<=` the degree. NaN degrees never
/// arise (NaN never compares `>` a running max) so an origin that only
/// ever asserted NaN-weighted facts is never cut.
pub fn repair(store: &dyn FactStore, origins: &[String], tables: &[String], degrees: &[f64]) -> Result<()> {
    for (origin, &degree) in origins.iter().zip(degrees.iter()) {
        if degree > 0.0 {
            for table in tables {
                store.cut(table, origin, degree)?;
            }
        }
    }
    Ok(())
}

/// Runs `measure`, `repair`, then `measure` again, returning
/// `(initial_degrees, post_repair_degrees)` for verification/reporting.
pub fn repair_and_verify(
    store: &dyn FactStore,
    origins: &[String],
    tables: &[String],
) -> Result<(Vec<f64>, Vec<f64>)> {
    let initial = measure(store, origins, tables)?;
    repair(store, origins, tables, &initial)?;
    let after = measure(store, origins, tables)?;
    Ok((initial, after))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::{SqliteStore, UnaryRow};

    fn insert(store: &SqliteStore, table: &str, value: &str, positive: bool, weight: f64, origin: &str) {
        store
            .insert_unary(
                table,
                &UnaryRow {
                    value: value.to_string(),
                    positive,
                    weight,
                    origin: origin.to_string(),
                },
            )
            .unwrap();
    }

    /// S4 - Inconsistency degree and cut.
    #[test]
    fn degree_and_cut() {
        let store = SqliteStore::open_in_memory().unwrap();
        store.create_tables(&["C".to_string()], &[]).unwrap();

        insert(&store, "C", "x", true, 0.3, "O1");
        insert(&store, "C", "x", false, 0.7, "O2");

        let origins = vec!["O1".to_string(), "O2".to_string()];
        let tables = vec!["C".to_string()];

        let (initial, after) = repair_and_verify(&store, &origins, &tables).unwrap();

        assert_eq!(initial[0], 0.3);
        assert_eq!(initial[1], 0.7);
        assert_eq!(after[0], 0.0);
        assert_eq!(after[1], 0.0);

        let remaining = store.select("SELECT value FROM \"C\"", 1).unwrap();
        assert!(remaining.is_empty());
    }

    #[test]
    fn repair_on_repaired_store_is_a_no_op() {
        let store = SqliteStore::open_in_memory().unwrap();
        store.create_tables(&["C".to_string()], &[]).unwrap();
        insert(&store, "C", "x", true, 0.3, "O1");
        insert(&store, "C", "x", false, 0.7, "O2");

        let origins = vec!["O1".to_string(), "O2".to_string()];
        let tables = vec!["C".to_string()];

        repair_and_verify(&store, &origins, &tables).unwrap();
        let (second_initial, second_after) = repair_and_verify(&store, &origins, &tables).unwrap();

        assert_eq!(second_initial, vec![0.0, 0.0]);
        assert_eq!(second_after, vec![0.0, 0.0]);
    }

    #[test]
    fn nan_weighted_rows_are_never_cut() {
        let store = SqliteStore::open_in_memory().unwrap();
        store.create_tables(&["C".to_string()], &[]).unwrap();
        insert(&store, "C", "x", true, f64::NAN, "O1");
        insert(&store, "C", "x", false, 0.4, "O2");

        let origins = vec!["O1".to_string(), "O2".to_string()];
        let tables = vec!["C".to_string()];

        measure(&store, &origins, &tables).unwrap();
        repair(&store, &origins, &tables, &[f64::NAN, 0.4]).unwrap();

        let remaining = store
            .select("SELECT origin FROM \"C\" WHERE origin = 'O1'", 1)
            .unwrap();
        assert_eq!(remaining.len(), 1);
    }
}
