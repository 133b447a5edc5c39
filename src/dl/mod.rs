//! DL - surface ontology syntax: parses the prefix-notation language
//! (`dl::parser`) and imports a parsed document into a `Relation` (TBox)
//! or a `FactStore` (ABox). Grounded on
//! `examples/original_source/godl-import/import.go`'s `ImportTBox` and
//! `importABox`.

pub mod ast;
pub mod parser;

use std::collections::BTreeMap;
use std::path::PathBuf;

use ast::Predicate;

use crate::error::{KernelError, Result};
use crate::rel::Relation;
use crate::store::{left_side_table, right_side_table, BinaryRow, FactStore, UnaryRow};
use crate::weight::WeightGenerator;

fn missing_ontology(source_name: &str) -> KernelError {
    KernelError::Parse {
        file: PathBuf::from(source_name),
        offset: 0,
        message: "document has no 'Ontology' element".to_string(),
    }
}

fn malformed(source_name: &str, predicate: &str, message: &str) -> KernelError {
    KernelError::Parse {
        file: PathBuf::from(source_name),
        offset: 0,
        message: format!("'{predicate}': {message}"),
    }
}

/// Fetches `predicate.arguments[index]`, reporting a parse error (rather
/// than panicking) on a malformed document.
fn arg<'a>(predicate: &'a Predicate, index: usize, source_name: &str) -> Result<&'a Predicate> {
    predicate.arguments.get(index).ok_or_else(|| {
        malformed(
            source_name,
            &predicate.name,
            &format!("expected at least {} argument(s)", index + 1),
        )
    })
}

/// The schema resulting from importing a TBox: the closed `Relation` over
/// class names (including the derived `P__dl_left__`/`P__dl_right__` sides
/// of every object property) plus the bookkeeping `dlreason-import`
/// persists as metadata.
pub struct TBoxSchema {
    pub relation: Relation,
    pub class_names: Vec<String>,
    pub object_property_names: Vec<String>,
    pub data_property_names: Vec<String>,
    /// Declaration/axiom kinds this importer does not model (e.g.
    /// `ObjectComplementOf`), with occurrence counts - logged as warnings,
    /// never a hard failure.
    pub unimplemented: BTreeMap<String, usize>,
}

/// Imports a parsed TBox document, closing the resulting `Relation`.
pub fn import_tbox(doc: &Predicate, source_name: &str, debug: bool) -> Result<TBoxSchema> {
    let ontology = doc.find_ontology().ok_or_else(|| missing_ontology(source_name))?;

    let mut class_names = Vec::new();
    let mut object_property_names = Vec::new();
    let mut data_property_names = Vec::new();
    let mut unimplemented: BTreeMap<String, usize> = BTreeMap::new();

    for top in &ontology.arguments {
        if top.name != "Declaration" {
            continue;
        }
        let declaration = arg(top, 0, source_name)?;
        match declaration.name.as_str() {
            "Class" => class_names.push(arg(declaration, 0, source_name)?.name.clone()),
            "ObjectProperty" => {
                let name = arg(declaration, 0, source_name)?.name.clone();
                class_names.push(left_side_table(&name));
                class_names.push(right_side_table(&name));
                object_property_names.push(name);
            }
            "DataProperty" => data_property_names.push(arg(declaration, 0, source_name)?.name.clone()),
            other => {
                *unimplemented.entry(format!("Declaration({other})")).or_insert(0) += 1;
            }
        }
    }

    let mut relation = Relation::new(class_names.len()).with_debug(debug);
    for name in &class_names {
        relation.add_element(name)?;
    }

    for top in &ontology.arguments {
        match top.name.as_str() {
            "SubClassOf" => {
                let left = &arg(top, 0, source_name)?.name;
                let right = &arg(top, 1, source_name)?.name;
                relation.set_sub_class_of(left, right)?;
            }
            "DisjointClasses" => {
                let left = &arg(top, 0, source_name)?.name;
                let right = &arg(top, 1, source_name)?.name;
                relation.set_disjoint(left, right)?;
            }
            "EquivalentClasses" => {
                let left = arg(top, 0, source_name)?.name.clone();
                let right = arg(top, 1, source_name)?.name.clone();
                relation.set_sub_class_of(&left, &right)?;
                relation.set_sub_class_of(&right, &left)?;
            }
            "ObjectPropertyDomain" => {
                let property = &arg(top, 0, source_name)?.name;
                let range_class = &arg(top, 1, source_name)?.name;
                relation.set_sub_class_of(&left_side_table(property), range_class)?;
            }
            "ObjectPropertyRange" => {
                let property = &arg(top, 0, source_name)?.name;
                let range_class = &arg(top, 1, source_name)?.name;
                relation.set_sub_class_of(&right_side_table(property), range_class)?;
            }
            "Declaration" => {}
            other => {
                *unimplemented.entry(other.to_string()).or_insert(0) += 1;
            }
        }
    }

    relation.compute_all()?;

    Ok(TBoxSchema {
        relation,
        class_names,
        object_property_names,
        data_property_names,
        unimplemented,
    })
}

/// Imports a parsed ABox document's assertions into `store`, tagging every
/// row with `origin` and weighting it with the n-th call to `weights`,
/// where n counts only rows actually inserted - an unrecognized predicate
/// does not advance the weight sequence. Returns unrecognized-predicate
/// occurrence counts, to be logged as warnings by the caller.
pub fn import_abox(
    store: &dyn FactStore,
    doc: &Predicate,
    origin: &str,
    weights: &WeightGenerator,
    source_name: &str,
) -> Result<BTreeMap<String, usize>> {
    let ontology = doc.find_ontology().ok_or_else(|| missing_ontology(source_name))?;
    let mut unimplemented: BTreeMap<String, usize> = BTreeMap::new();
    let mut n: u32 = 1;

    for assertion in &ontology.arguments {
        let weight = weights.next(n);
        match assertion.name.as_str() {
            "ClassAssertion" => {
                let class_name = &arg(assertion, 0, source_name)?.name;
                let value = arg(assertion, 1, source_name)?.name.clone();
                store.insert_unary(
                    class_name,
                    &UnaryRow {
                        value,
                        positive: true,
                        weight,
                        origin: origin.to_string(),
                    },
                )?;
                n += 1;
            }
            "ObjectPropertyAssertion" => {
                let property = &arg(assertion, 0, source_name)?.name;
                let left_value = arg(assertion, 1, source_name)?.name.clone();
                let right_value = arg(assertion, 2, source_name)?.name.clone();

                store.insert_binary(
                    property,
                    &BinaryRow {
                        left_value: left_value.clone(),
                        right_value: right_value.clone(),
                        positive: true,
                        weight,
                        origin: origin.to_string(),
                    },
                )?;
                n += 1;

                store.insert_unary(
                    &left_side_table(property),
                    &UnaryRow {
                        value: left_value,
                        positive: true,
                        weight,
                        origin: origin.to_string(),
                    },
                )?;
                n += 1;

                store.insert_unary(
                    &right_side_table(property),
                    &UnaryRow {
                        value: right_value,
                        positive: true,
                        weight,
                        origin: origin.to_string(),
                    },
                )?;
                n += 1;
            }
            other => {
                *unimplemented.entry(other.to_string()).or_insert(0) += 1;
            }
        }
    }

    Ok(unimplemented)
}
