//! QRY - compiles a single conjunctive rule into a `SelectPlan` and runs it
//! against a `FactStore`.

pub mod ast;
pub mod parser;
pub mod plan;

use crate::error::Result;
use crate::store::FactStore;

pub use ast::Rule;
pub use plan::SelectPlan;

/// Parses and compiles `line`, returning the plan without running it -
/// `dlreason-query` uses this to report "not in fragment" errors before
/// touching the store.
pub fn compile(line: &str) -> Result<SelectPlan> {
    let rule = parser::parse_rule(line)?;
    plan::compile(&rule)
}

/// Parses, compiles and executes `line` against `store`, returning each
/// answer's column values in head-variable order.
pub fn run(store: &dyn FactStore, line: &str) -> Result<Vec<Vec<String>>> {
    let rule = parser::parse_rule(line)?;
    let plan = plan::compile(&rule)?;
    let sql = plan.to_sql();
    store.select(&sql, plan.projections.len())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::{SqliteStore, UnaryRow};

    #[test]
    fn run_projects_matching_rows() {
        let store = SqliteStore::open_in_memory().unwrap();
        store.create_tables(&["A".to_string(), "B".to_string()], &[]).unwrap();
        store
            .insert_unary(
                "A",
                &UnaryRow {
                    value: "x".to_string(),
                    positive: true,
                    weight: 1.0,
                    origin: "O".to_string(),
                },
            )
            .unwrap();

        let rows = run(&store, "q(?x) :- A(?x)").unwrap();
        assert_eq!(rows, vec![vec!["x".to_string()]]);
    }
}
