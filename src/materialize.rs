//! MAT - the materializer.
//!
//! Given a closed `Relation` and a `FactStore` loaded with raw ABox facts,
//! expands each representative class's contents along the compact
//! incidence matrix: equivalence saturation, induction along covers, then
//! re-equivalence. Grounded on `godl-compile/compile.go`'s `populate`,
//! `populateTable`, `copyIntoTable`.

use crate::error::Result;
use crate::rel::Relation;
use crate::store::FactStore;

pub fn materialize(relation: &Relation, store: &dyn FactStore) -> Result<()> {
    for class in relation.equivalence_classes() {
        let representative = class[0];
        let rep_name = &relation.elements()[representative];

        // 1. Equivalence saturation: non-representatives feed the
        //    representative, then the representative feeds them back,
        //    making it the canonical holder before induction.
        for &member in class.iter().skip(1) {
            let member_name = &relation.elements()[member];
            copy_table(store, member_name, rep_name, false)?;
        }
        for &member in class.iter().skip(1) {
            let member_name = &relation.elements()[member];
            copy_table(store, rep_name, member_name, false)?;
        }

        // 2. Induction along compact-matrix covers.
        for j in 0..relation.size() {
            let cover = relation.compact_entry(representative, j);
            if cover == 0 {
                continue;
            }
            let dst_name = &relation.elements()[j];
            copy_table(store, rep_name, dst_name, cover < 0)?;
        }

        // 3. Re-equivalence: push the representative's now-complete
        //    extension back out to every equivalent.
        for &member in class.iter().skip(1) {
            let member_name = &relation.elements()[member];
            copy_table(store, rep_name, member_name, false)?;
        }
    }

    Ok(())
}

/// Copies both the unary and left/right binary-side shadow tables for a
/// name, since at the STORE layer a property's `P<L>`/`P<R>` derived sides
/// are ordinary unary tables. Binary property tables themselves are not
/// copied through REL edges - only their derived sides participate in
/// subsumption, per spec.md §3.
fn copy_table(store: &dyn FactStore, src: &str, dst: &str, flip: bool) -> Result<()> {
    store.copy_unary(src, dst, flip)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::{SqliteStore, UnaryRow};

    /// S3 - Induced negative fact.
    #[test]
    fn disjointness_induces_negative_fact() {
        let mut rel = Relation::new(2);
        rel.add_element("c").unwrap();
        rel.add_element("d").unwrap();
        rel.set_disjoint("c", "d").unwrap();
        rel.compute_all().unwrap();

        let store = SqliteStore::open_in_memory().unwrap();
        store
            .create_tables(&["c".to_string(), "d".to_string()], &[])
            .unwrap();
        store
            .insert_unary(
                "c",
                &UnaryRow {
                    value: "x".to_string(),
                    positive: true,
                    weight: 1.0,
                    origin: "O1".to_string(),
                },
            )
            .unwrap();

        materialize(&rel, &store).unwrap();

        let rows = store
            .select("SELECT value, polarity, weight, origin FROM \"d\"", 4)
            .unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0][0], "x");
        assert_eq!(rows[0][1], "0");
    }

    #[test]
    fn materialize_twice_is_idempotent() {
        let mut rel = Relation::new(2);
        rel.add_element("c").unwrap();
        rel.add_element("d").unwrap();
        rel.set_sub_class_of("c", "d").unwrap();
        rel.compute_all().unwrap();

        let store = SqliteStore::open_in_memory().unwrap();
        store
            .create_tables(&["c".to_string(), "d".to_string()], &[])
            .unwrap();
        store
            .insert_unary(
                "c",
                &UnaryRow {
                    value: "x".to_string(),
                    positive: true,
                    weight: 1.0,
                    origin: "O1".to_string(),
                },
            )
            .unwrap();

        materialize(&rel, &store).unwrap();
        let first = store.table_stats(&["d".to_string()]).unwrap();
        materialize(&rel, &store).unwrap();
        let second = store.table_stats(&["d".to_string()]).unwrap();

        assert_eq!(first, second);
    }
}
