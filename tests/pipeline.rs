//! End-to-end pipeline tests: dl parse -> TBox close -> ABox import ->
//! materialize -> repair -> query.

use dlreason::dl::{self, parser as dl_parser};
use dlreason::store::{FactStore, SqliteStore};
use dlreason::weight::{WeightGenerator, WeightMode};
use dlreason::{materialize, query, repair};

const TBOX: &str = r#"Ontology(
    Declaration(Class(Animal))
    Declaration(Class(Bird))
    Declaration(Class(Fish))
    SubClassOf(Bird Animal)
    SubClassOf(Fish Animal)
    DisjointClasses(Bird Fish)
)"#;

fn open_and_import_tbox() -> (SqliteStore, dl::TBoxSchema) {
    let doc = dl_parser::parse(TBOX);
    let schema = dl::import_tbox(&doc, "tbox.dl", false).unwrap();
    let store = SqliteStore::open_in_memory().unwrap();
    store.create_tables(&schema.class_names, &schema.object_property_names).unwrap();
    (store, schema)
}

#[test]
fn subsumption_propagates_a_fact_to_every_superclass() {
    let (store, schema) = open_and_import_tbox();

    let abox = dl_parser::parse(r#"Ontology( ClassAssertion(Bird "tweety") )"#);
    let weights = WeightGenerator::new(WeightMode::Constant);
    dl::import_abox(&store, &abox, "birds.dl", &weights, "birds.dl").unwrap();

    materialize::materialize(&schema.relation, &store).unwrap();

    let rows = query::run(&store, "q(?x) :- Animal(?x)").unwrap();
    assert_eq!(rows, vec![vec!["\"tweety\"".to_string()]]);
}

#[test]
fn disjointness_induces_negative_fact_visible_to_negated_query() {
    let (store, schema) = open_and_import_tbox();

    let abox = dl_parser::parse(r#"Ontology( ClassAssertion(Bird "tweety") )"#);
    let weights = WeightGenerator::new(WeightMode::Constant);
    dl::import_abox(&store, &abox, "birds.dl", &weights, "birds.dl").unwrap();

    materialize::materialize(&schema.relation, &store).unwrap();

    let still_fish = query::run(&store, "q(?x) :- Fish(?x)").unwrap();
    assert!(still_fish.is_empty());

    let not_fish = query::run(&store, "q(?x) :- !Fish(?x), Bird(?x)").unwrap();
    assert_eq!(not_fish, vec![vec!["\"tweety\"".to_string()]]);
}

#[test]
fn conflicting_origins_are_measured_and_repaired() {
    let (store, schema) = open_and_import_tbox();

    let a = dl_parser::parse(r#"Ontology( ClassAssertion(Bird "x") )"#);
    let b = dl_parser::parse(r#"Ontology( ClassAssertion(Fish "x") )"#);
    let weights = WeightGenerator::new(WeightMode::Constant);
    dl::import_abox(&store, &a, "a.dl", &weights, "a.dl").unwrap();
    dl::import_abox(&store, &b, "b.dl", &weights, "b.dl").unwrap();

    materialize::materialize(&schema.relation, &store).unwrap();

    let origins = vec!["a.dl".to_string(), "b.dl".to_string()];
    let (initial, after) = repair::repair_and_verify(&store, &origins, &schema.class_names).unwrap();

    assert!(initial.iter().any(|&d| d > 0.0));
    assert!(after.iter().all(|&d| d == 0.0));

    let survivors = query::run(&store, "q(?x) :- Animal(?x)").unwrap();
    assert!(survivors.is_empty());
}

#[test]
fn wildcard_query_projects_object_property_domain() {
    let doc = dl_parser::parse(
        r#"Ontology(
            Declaration(Class(Person))
            Declaration(Class(Document))
            Declaration(ObjectProperty(authorOf))
            ObjectPropertyDomain(authorOf Person)
            ObjectPropertyRange(authorOf Document)
        )"#,
    );
    let schema = dl::import_tbox(&doc, "tbox.dl", false).unwrap();
    let store = SqliteStore::open_in_memory().unwrap();
    store.create_tables(&schema.class_names, &schema.object_property_names).unwrap();

    let abox = dl_parser::parse(r#"Ontology( ObjectPropertyAssertion(authorOf "ada" "notes") )"#);
    let weights = WeightGenerator::new(WeightMode::Constant);
    dl::import_abox(&store, &abox, "a.dl", &weights, "a.dl").unwrap();

    materialize::materialize(&schema.relation, &store).unwrap();

    let authors = query::run(&store, "q(?x) :- authorOf(?x, _)").unwrap();
    assert_eq!(authors, vec![vec!["\"ada\"".to_string()]]);

    let people = query::run(&store, "q(?x) :- Person(?x)").unwrap();
    assert_eq!(people, vec![vec!["\"ada\"".to_string()]]);
}
