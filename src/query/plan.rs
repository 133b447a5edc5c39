//! Translates a parsed `Rule` into a relational selection plan.
//!
//! Rather than directly formatting a SQL string the way
//! `godl-query/query.go`'s `buildQuery` does, this first builds a small
//! structural `SelectPlan` so the translation can be unit-tested without a
//! database connection; `to_sql` then renders the
//! cross-product-plus-equalities semantics spec.md §4.5 requires.

use crate::error::{KernelError, Result};
use crate::store::{left_side_table, right_side_table};

use super::ast::{Arg, Literal, Rule};

/// Which column of a literal's backing table a projected or bound variable
/// maps to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Column {
    Value,
    LeftValue,
    RightValue,
}

#[derive(Debug, Clone)]
pub struct TableRef {
    pub alias: String,
    pub table: String,
}

#[derive(Debug, Clone)]
pub struct Projection {
    pub head_variable: String,
    pub alias: String,
    pub column: Column,
}

#[derive(Debug, Clone)]
pub enum Predicate {
    /// `alias.column = 'constant'`
    BoundToConstant { alias: String, column: Column, constant: String },
    /// `alias_a.column_a = alias_b.column_b`
    JoinVariable {
        alias_a: String,
        column_a: Column,
        alias_b: String,
        column_b: Column,
    },
    /// `alias.polarity = 1` / `alias.polarity = 0`
    Polarity { alias: String, positive: bool },
}

#[derive(Debug, Clone)]
pub struct SelectPlan {
    pub projections: Vec<Projection>,
    pub tables: Vec<TableRef>,
    pub predicates: Vec<Predicate>,
}

/// The backing table a literal reads from, and which columns its
/// arguments bind to - arity 1 or a one-wildcard arity-2 literal use the
/// `P<L>`/`P<R>` shadow tables and the `Value` column; a two-argument,
/// no-wildcard literal uses the property table itself with `LeftValue`/
/// `RightValue`.
fn table_for(literal: &Literal) -> (String, bool) {
    if literal.arity() == 2 && literal.wildcard_count() == 1 {
        let projects_left = matches!(literal.args[1], Arg::Wildcard);
        let table = if projects_left {
            left_side_table(&literal.predicate)
        } else {
            right_side_table(&literal.predicate)
        };
        (table, true)
    } else {
        (literal.predicate.clone(), false)
    }
}

pub fn compile(rule: &Rule) -> Result<SelectPlan> {
    let mut tables = Vec::with_capacity(rule.body.len());
    let mut predicates = Vec::new();

    for (i, literal) in rule.body.iter().enumerate() {
        let (backing_table, is_shadow) = table_for(literal);
        let alias = format!("t{i}");
        tables.push(TableRef {
            alias: alias.clone(),
            table: backing_table,
        });
        predicates.push(Predicate::Polarity {
            alias: alias.clone(),
            positive: literal.positive,
        });

        if is_shadow {
            let bound_arg = literal.args.iter().find(|a| !matches!(a, Arg::Wildcard)).unwrap();
            bind_arg(bound_arg, &alias, Column::Value, &mut predicates, rule);
        } else {
            match literal.arity() {
                1 => bind_arg(&literal.args[0], &alias, Column::Value, &mut predicates, rule),
                2 => {
                    bind_arg(&literal.args[0], &alias, Column::LeftValue, &mut predicates, rule);
                    bind_arg(&literal.args[1], &alias, Column::RightValue, &mut predicates, rule);
                }
                n => {
                    return Err(KernelError::QueryNotInFragment {
                        reason: format!("arity {n} not in fragment"),
                    })
                }
            }
        }
    }

    let mut projections = Vec::with_capacity(rule.head.variables.len());
    for var in &rule.head.variables {
        let (alias, column) = first_binding(var, rule)
            .ok_or_else(|| KernelError::QueryNotInFragment {
                reason: format!("variable '?{var}' not bound by any body literal"),
            })?;
        projections.push(Projection {
            head_variable: var.clone(),
            alias,
            column,
        });
    }

    Ok(SelectPlan {
        projections,
        tables,
        predicates,
    })
}

/// Finds the first body literal binding `variable`, and the column of its
/// backing table that binding occupies.
fn first_binding(variable: &str, rule: &Rule) -> Option<(String, Column)> {
    for (i, literal) in rule.body.iter().enumerate() {
        let alias = format!("t{i}");
        let (_, is_shadow) = table_for(literal);

        if is_shadow {
            if literal.args.iter().any(|a| a.as_variable() == Some(variable)) {
                return Some((alias, Column::Value));
            }
            continue;
        }

        match literal.arity() {
            1 => {
                if literal.args[0].as_variable() == Some(variable) {
                    return Some((alias, Column::Value));
                }
            }
            2 => {
                if literal.args[0].as_variable() == Some(variable) {
                    return Some((alias, Column::LeftValue));
                }
                if literal.args[1].as_variable() == Some(variable) {
                    return Some((alias, Column::RightValue));
                }
            }
            _ => {}
        }
    }
    None
}

/// Emits the WHERE-clause predicate(s) that bind a single literal argument:
/// a constant equality, or (for the first occurrence of a variable already
/// bound elsewhere) a join equality against that earlier binding.
fn bind_arg(arg: &Arg, alias: &str, column: Column, predicates: &mut Vec<Predicate>, rule: &Rule) {
    match arg {
        Arg::Constant(value) => predicates.push(Predicate::BoundToConstant {
            alias: alias.to_string(),
            column,
            constant: value.clone(),
        }),
        Arg::Variable(name) => {
            if let Some((other_alias, other_column)) = first_binding(name, rule) {
                if other_alias != alias || other_column != column {
                    predicates.push(Predicate::JoinVariable {
                        alias_a: alias.to_string(),
                        column_a: column,
                        alias_b: other_alias,
                        column_b: other_column,
                    });
                }
            }
        }
        Arg::Wildcard => {}
    }
}

impl Column {
    fn sql_name(self) -> &'static str {
        match self {
            Column::Value => "value",
            Column::LeftValue => "left_value",
            Column::RightValue => "right_value",
        }
    }
}

impl SelectPlan {
    /// Renders the cross-product-plus-equalities SQL this plan denotes.
    pub fn to_sql(&self) -> String {
        let select = self
            .projections
            .iter()
            .map(|p| format!("\"{}\".{} AS {}", p.alias, p.column.sql_name(), p.head_variable))
            .collect::<Vec<_>>()
            .join(", ");

        let from = self
            .tables
            .iter()
            .map(|t| format!("\"{}\" AS \"{}\"", t.table, t.alias))
            .collect::<Vec<_>>()
            .join(", ");

        let where_clause = self
            .predicates
            .iter()
            .map(render_predicate)
            .collect::<Vec<_>>()
            .join(" AND ");

        if where_clause.is_empty() {
            format!("SELECT DISTINCT {select} FROM {from}")
        } else {
            format!("SELECT DISTINCT {select} FROM {from} WHERE {where_clause}")
        }
    }
}

fn render_predicate(predicate: &Predicate) -> String {
    match predicate {
        Predicate::BoundToConstant { alias, column, constant } => {
            let escaped = constant.replace('\'', "''");
            format!("\"{alias}\".{} = '{escaped}'", column.sql_name())
        }
        Predicate::JoinVariable {
            alias_a,
            column_a,
            alias_b,
            column_b,
        } => format!(
            "\"{alias_a}\".{} = \"{alias_b}\".{}",
            column_a.sql_name(),
            column_b.sql_name()
        ),
        Predicate::Polarity { alias, positive } => {
            let value = if *positive { 1 } else { 0 };
            format!("\"{alias}\".polarity = {value}")
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::query::parser::parse_rule;

    /// S5 - Query translation.
    #[test]
    fn negated_literal_excludes_matches() {
        let rule = parse_rule("q(?x) :- A(?x), !B(?x)").unwrap();
        let plan = compile(&rule).unwrap();

        assert_eq!(plan.projections.len(), 1);
        assert_eq!(plan.projections[0].alias, "t0");
        assert_eq!(plan.tables.len(), 2);

        let sql = plan.to_sql();
        assert!(sql.contains("\"t0\".polarity = 1"));
        assert!(sql.contains("\"t1\".polarity = 0"));
        assert!(sql.contains("\"t0\".value = \"t1\".value"));
    }

    /// S6 - Wildcard projection.
    #[test]
    fn wildcard_projects_left_side_table() {
        let rule = parse_rule("q(?x) :- P(?x, _)").unwrap();
        let plan = compile(&rule).unwrap();
        assert_eq!(plan.tables[0].table, "P__dl_left__");
        assert_eq!(plan.projections[0].column, Column::Value);
    }

    #[test]
    fn binary_two_variables_projects_both_sides() {
        let rule = parse_rule("q(?x, ?y) :- P(?x, ?y)").unwrap();
        let plan = compile(&rule).unwrap();
        assert_eq!(plan.tables[0].table, "P");
        assert_eq!(plan.projections[0].column, Column::LeftValue);
        assert_eq!(plan.projections[1].column, Column::RightValue);
    }

    #[test]
    fn binary_with_constant_binds_equality() {
        let rule = parse_rule(r#"q(?x) :- P(?x, "c")"#).unwrap();
        let plan = compile(&rule).unwrap();
        let sql = plan.to_sql();
        assert!(sql.contains("right_value = 'c'"));
    }
}
