//! REL - the subsumption/disjointness relation engine.
//!
//! A dense `{0, +1, -1}` matrix over named elements (classes and the
//! derived `P<L>`/`P<R>` sides of object properties). Built incrementally
//! with `add_element`/`set_sub_class_of`/`set_disjoint`, then closed once
//! with `compute_all`. Ported in spirit from
//! `examples/original_source/relations.go`'s `Relation`, but as an
//! explicit value threaded by callers rather than a package-level handle,
//! and returning `Result` instead of calling `log.Fatal`/`os.Exit`.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::error::{KernelError, Result};

/// A single entry of the relation matrix.
pub type Entry = i8;

pub const UNRELATED: Entry = 0;
pub const SUBSUMES: Entry = 1;
pub const DISJOINT: Entry = -1;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Relation {
    capacity: usize,
    size: usize,
    elements: Vec<String>,
    index_of: HashMap<String, usize>,
    matrix: Vec<Vec<Entry>>,
    compact_matrix: Vec<Vec<Entry>>,
    weights: Vec<usize>,
    equivalence_classes: Vec<Vec<usize>>,
    #[serde(default)]
    debug: bool,
}

/// The two derivation witnesses behind a detected TBox conflict.
#[derive(Debug, Clone)]
pub struct ConflictWitness {
    pub i: usize,
    pub j: usize,
    pub k: usize,
}

impl Relation {
    pub fn new(capacity: usize) -> Self {
        Relation {
            capacity,
            size: 0,
            elements: Vec::with_capacity(capacity),
            index_of: HashMap::with_capacity(capacity),
            matrix: vec![vec![UNRELATED; capacity]; capacity],
            compact_matrix: vec![vec![UNRELATED; capacity]; capacity],
            weights: Vec::new(),
            equivalence_classes: Vec::new(),
            debug: false,
        }
    }

    pub fn with_debug(mut self, debug: bool) -> Self {
        self.debug = debug;
        self
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn size(&self) -> usize {
        self.size
    }

    pub fn elements(&self) -> &[String] {
        &self.elements
    }

    pub fn index_of(&self, name: &str) -> Option<usize> {
        self.index_of.get(name).copied()
    }

    pub fn weight(&self, i: usize) -> usize {
        self.weights[i]
    }

    pub fn equivalence_classes(&self) -> &[Vec<usize>] {
        &self.equivalence_classes
    }

    pub fn entry(&self, i: usize, j: usize) -> Entry {
        self.matrix[i][j]
    }

    pub fn compact_entry(&self, i: usize, j: usize) -> Entry {
        self.compact_matrix[i][j]
    }

    /// Appends a new element. A duplicate name silently overwrites the
    /// prior index in the map, matching the source's "caller responsibility"
    /// contract - callers that care about uniqueness must check first.
    pub fn add_element(&mut self, name: &str) -> Result<usize> {
        if self.size == self.capacity {
            return Err(KernelError::CapacityExceeded {
                capacity: self.capacity,
                element: name.to_string(),
            });
        }

        let index = self.size;
        self.elements.push(name.to_string());
        self.index_of.insert(name.to_string(), index);
        self.size += 1;
        Ok(index)
    }

    fn index(&self, name: &str) -> Result<usize> {
        self.index_of
            .get(name)
            .copied()
            .ok_or_else(|| KernelError::UnknownElement(name.to_string()))
    }

    pub fn set_sub_class_of(&mut self, subsumee: &str, subsumer: &str) -> Result<bool> {
        let i = self.index(subsumee)?;
        let j = self.index(subsumer)?;
        Ok(self.set_sub_class_of_index(i, j))
    }

    /// Records `subsumee ⊑ subsumer`, refusing if the pair is already
    /// declared disjoint.
    pub fn set_sub_class_of_index(&mut self, subsumee: usize, subsumer: usize) -> bool {
        if self.matrix[subsumee][subsumer] == DISJOINT {
            return false;
        }

        if self.debug {
            tracing::debug!(
                subsumee = %self.elements[subsumee],
                subsumer = %self.elements[subsumer],
                "set_sub_class_of"
            );
        }

        self.matrix[subsumee][subsumer] = SUBSUMES;
        true
    }

    pub fn set_disjoint(&mut self, a: &str, b: &str) -> Result<bool> {
        let i = self.index(a)?;
        let j = self.index(b)?;
        Ok(self.set_disjoint_index(i, j))
    }

    /// Records `a ⋈ b`, refusing if either direction is already a
    /// subsumption.
    pub fn set_disjoint_index(&mut self, a: usize, b: usize) -> bool {
        if self.matrix[a][b] == SUBSUMES || self.matrix[b][a] == SUBSUMES {
            return false;
        }

        if self.debug {
            tracing::debug!(a = %self.elements[a], b = %self.elements[b], "set_disjoint");
        }

        self.matrix[a][b] = DISJOINT;
        self.matrix[b][a] = DISJOINT;
        true
    }

    /// The fixpoint: reflexivity, transitive + negative closure,
    /// equivalence-class extraction, weights, class ordering, compaction.
    pub fn compute_all(&mut self) -> Result<()> {
        for i in 0..self.size {
            self.matrix[i][i] = SUBSUMES;
        }

        self.compute_closure()?;
        self.compute_equivalence_classes();
        self.compute_weights();
        self.sort_equivalence_classes();
        self.compute_compact_matrix();

        Ok(())
    }

    /// Warshall-style transitive closure of ⊑, then upward propagation of
    /// disjointness. Halts with a `TboxInconsistent` error carrying the
    /// three indices involved the moment a −1 propagation would overwrite
    /// an existing +1.
    fn compute_closure(&mut self) -> Result<()> {
        let n = self.size;

        for k in 0..n {
            for i in 0..n {
                if self.matrix[i][k] != SUBSUMES {
                    continue;
                }
                for j in 0..n {
                    if self.matrix[i][j] == UNRELATED && self.matrix[k][j] == SUBSUMES {
                        self.matrix[i][j] = SUBSUMES;
                    }
                }
            }
        }

        for i in 0..n {
            for j in 0..n {
                if self.matrix[i][j] != DISJOINT {
                    continue;
                }
                for k in 0..n {
                    if self.matrix[k][i] == SUBSUMES {
                        if self.matrix[k][j] == SUBSUMES {
                            return Err(KernelError::TboxInconsistent {
                                i: self.elements[i].clone(),
                                j: self.elements[j].clone(),
                                k: self.elements[k].clone(),
                            });
                        }
                        self.matrix[k][j] = DISJOINT;
                        self.matrix[j][k] = DISJOINT;
                    }
                }
            }
        }

        Ok(())
    }

    /// Same algorithm as `compute_closure`, but returns the witness instead
    /// of erroring - useful for tests and diagnostics that want to inspect
    /// a conflict without unwinding.
    pub fn find_conflict(&self) -> Option<ConflictWitness> {
        let n = self.size;
        for i in 0..n {
            for j in 0..n {
                if self.matrix[i][j] != DISJOINT {
                    continue;
                }
                for k in 0..n {
                    if self.matrix[k][i] == SUBSUMES && self.matrix[k][j] == SUBSUMES {
                        return Some(ConflictWitness { i, j, k });
                    }
                }
            }
        }
        None
    }

    fn compute_equivalence_classes(&mut self) {
        let mut marked = vec![false; self.size];
        let mut classes = Vec::new();

        for i in 0..self.size {
            if marked[i] {
                continue;
            }
            marked[i] = true;
            let mut class = vec![i];
            for j in (i + 1)..self.size {
                if self.matrix[i][j] == SUBSUMES && self.matrix[j][i] == SUBSUMES {
                    marked[j] = true;
                    class.push(j);
                }
            }
            classes.push(class);
        }

        self.equivalence_classes = classes;
    }

    fn compute_weights(&mut self) {
        self.weights = (0..self.size)
            .map(|i| (0..self.size).filter(|&j| self.matrix[i][j] == SUBSUMES).count())
            .collect();
    }

    fn sort_equivalence_classes(&mut self) {
        let weights = &self.weights;
        self.equivalence_classes
            .sort_by(|a, b| weights[b[0]].cmp(&weights[a[0]]));
    }

    /// Removes transitively-implied edges, keeping only Hasse covers, and
    /// zeroes the row/column of every non-representative class member.
    fn compute_compact_matrix(&mut self) {
        let n = self.size;
        self.compact_matrix = vec![vec![UNRELATED; n]; n];

        for i in 0..n {
            for j in 0..n {
                if i == j {
                    continue;
                }
                let val = self.matrix[i][j];
                if val == UNRELATED {
                    continue;
                }

                let mut keep = true;
                for k in 0..n {
                    if self.matrix[i][k] == SUBSUMES
                        && self.matrix[k][j] == val
                        && self.matrix[k][i] != SUBSUMES
                        && self.matrix[j][k] != SUBSUMES
                    {
                        keep = false;
                        break;
                    }
                }

                if keep {
                    self.compact_matrix[i][j] = val;
                }
            }
        }

        for class in &self.equivalence_classes {
            for &member in class.iter().skip(1) {
                for j in 0..n {
                    self.compact_matrix[member][j] = UNRELATED;
                    self.compact_matrix[j][member] = UNRELATED;
                }
            }
        }
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }

    pub fn from_json(raw: &str) -> Result<Self> {
        Ok(serde_json::from_str(raw)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn build(elements: &[&str]) -> Relation {
        let mut r = Relation::new(elements.len());
        for e in elements {
            r.add_element(e).unwrap();
        }
        r
    }

    /// S1 - Equivalence and subsumption.
    #[test]
    fn equivalence_and_subsumption() {
        let mut r = build(&["a", "b", "c", "d", "e", "f", "g"]);
        r.set_sub_class_of("c", "a").unwrap();
        r.set_sub_class_of("d", "a").unwrap();
        r.set_disjoint("c", "d").unwrap();
        r.set_sub_class_of("b", "c").unwrap();
        r.set_sub_class_of("e", "b").unwrap();
        r.set_sub_class_of("f", "d").unwrap();
        r.set_sub_class_of("b", "g").unwrap();
        r.set_sub_class_of("g", "b").unwrap();
        r.compute_all().unwrap();

        let b = r.index_of("b").unwrap();
        let g = r.index_of("g").unwrap();
        let a = r.index_of("a").unwrap();
        let c = r.index_of("c").unwrap();

        let class_of_b = r
            .equivalence_classes()
            .iter()
            .find(|class| class.contains(&b))
            .unwrap();
        assert!(class_of_b.contains(&g));
        assert_eq!(class_of_b.len(), 2);

        assert_eq!(r.weight(a), 1);
        assert_eq!(r.weight(c), 2);
        assert_eq!(r.weight(b), 4);
    }

    /// S2 - Disjointness propagation.
    #[test]
    fn disjointness_propagation() {
        let mut r = build(&["c", "d", "e", "f"]);
        r.set_sub_class_of("e", "c").unwrap();
        r.set_disjoint("c", "d").unwrap();
        r.set_disjoint("e", "f").unwrap();
        assert!(r.compute_all().is_ok());

        let mut r2 = build(&["c", "d", "e", "f"]);
        r2.set_sub_class_of("e", "c").unwrap();
        r2.set_disjoint("c", "d").unwrap();
        r2.set_sub_class_of("e", "f").unwrap();
        r2.set_sub_class_of("f", "d").unwrap();
        assert!(r2.compute_all().is_err());
    }

    #[test]
    fn reflexivity_after_compute_all() {
        let mut r = build(&["a", "b"]);
        r.compute_all().unwrap();
        for i in 0..r.size() {
            assert_eq!(r.entry(i, i), SUBSUMES);
        }
    }

    #[test]
    fn transitivity_holds() {
        let mut r = build(&["a", "b", "c"]);
        r.set_sub_class_of("a", "b").unwrap();
        r.set_sub_class_of("b", "c").unwrap();
        r.compute_all().unwrap();
        let (a, c) = (r.index_of("a").unwrap(), r.index_of("c").unwrap());
        assert_eq!(r.entry(a, c), SUBSUMES);
    }

    #[test]
    fn disjointness_is_symmetric() {
        let mut r = build(&["a", "b"]);
        r.set_disjoint("a", "b").unwrap();
        r.compute_all().unwrap();
        let (a, b) = (r.index_of("a").unwrap(), r.index_of("b").unwrap());
        assert_eq!(r.entry(a, b), r.entry(b, a));
    }

    #[test]
    fn equivalence_classes_match_mutual_subsumption() {
        let mut r = build(&["a", "b", "c"]);
        r.set_sub_class_of("a", "b").unwrap();
        r.set_sub_class_of("b", "a").unwrap();
        r.compute_all().unwrap();
        let (a, b, c) = (
            r.index_of("a").unwrap(),
            r.index_of("b").unwrap(),
            r.index_of("c").unwrap(),
        );
        let same_class = |x: usize, y: usize| {
            r.equivalence_classes()
                .iter()
                .any(|class| class.contains(&x) && class.contains(&y))
        };
        assert!(same_class(a, b));
        assert!(!same_class(a, c));
    }

    #[test]
    fn json_round_trip_is_structural() {
        let mut r = build(&["a", "b", "c"]);
        r.set_sub_class_of("a", "b").unwrap();
        r.set_disjoint("b", "c").unwrap();
        r.compute_all().unwrap();

        let json = r.to_json().unwrap();
        let restored = Relation::from_json(&json).unwrap();

        assert_eq!(r.elements(), restored.elements());
        assert_eq!(r.equivalence_classes(), restored.equivalence_classes());
        for i in 0..r.size() {
            for j in 0..r.size() {
                assert_eq!(r.entry(i, j), restored.entry(i, j));
                assert_eq!(r.compact_entry(i, j), restored.compact_entry(i, j));
            }
        }
    }

    #[test]
    fn capacity_exceeded_is_reported() {
        let mut r = Relation::new(1);
        r.add_element("a").unwrap();
        assert!(matches!(
            r.add_element("b"),
            Err(KernelError::CapacityExceeded { .. })
        ));
    }
}
