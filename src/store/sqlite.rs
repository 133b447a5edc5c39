//! `rusqlite`-backed `FactStore`, the single production implementation.
//!
//! Table and column names come from the TBox (class/property names) and are
//! not arbitrary user input by the time they reach here, but are still
//! quoted defensively; all row *values* are bound as parameters rather than
//! interpolated into SQL text.

use std::cell::RefCell;
use std::path::Path;

use rusqlite::Connection;

use crate::error::Result;

use super::{BinaryRow, FactStore, MetadataKey, UnaryRow};

pub struct SqliteStore {
    conn: RefCell<Connection>,
}

fn quote_ident(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}

/// `select` results feed `query::plan` answers and ad-hoc diagnostics
/// alike, both of which want plain strings regardless of a column's
/// underlying SQLite storage class (`value`/`origin` are TEXT, `polarity`
/// is INTEGER, `weight` is REAL).
fn column_to_string(value: rusqlite::types::ValueRef<'_>) -> String {
    use rusqlite::types::ValueRef;
    match value {
        ValueRef::Null => String::new(),
        ValueRef::Integer(i) => i.to_string(),
        ValueRef::Real(f) => f.to_string(),
        ValueRef::Text(t) => String::from_utf8_lossy(t).into_owned(),
        ValueRef::Blob(b) => String::from_utf8_lossy(b).into_owned(),
    }
}

impl SqliteStore {
    pub fn open(path: &Path) -> Result<Self> {
        let conn = Connection::open(path)?;
        Self::init(conn)
    }

    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        Self::init(conn)
    }

    fn init(conn: Connection) -> Result<Self> {
        conn.execute(
            "CREATE TABLE IF NOT EXISTS __dl_metadata__ (name TEXT PRIMARY KEY, value TEXT)",
            [],
        )?;
        Ok(SqliteStore {
            conn: RefCell::new(conn),
        })
    }
}

impl FactStore for SqliteStore {
    fn create_tables(&self, class_names: &[String], property_names: &[String]) -> Result<()> {
        let conn = self.conn.borrow();
        for class in class_names {
            let table = quote_ident(class);
            conn.execute(
                &format!(
                    "CREATE TABLE IF NOT EXISTS {table} \
                     (value TEXT, polarity INTEGER, weight REAL, origin TEXT, \
                      PRIMARY KEY (value, polarity, weight, origin))"
                ),
                [],
            )?;
        }

        for property in property_names {
            let table = quote_ident(property);
            conn.execute(
                &format!(
                    "CREATE TABLE IF NOT EXISTS {table} \
                     (left_value TEXT, right_value TEXT, polarity INTEGER, weight REAL, origin TEXT, \
                      PRIMARY KEY (left_value, right_value, polarity, weight, origin))"
                ),
                [],
            )?;

            for side in [super::left_side_table(property), super::right_side_table(property)] {
                let side_table = quote_ident(&side);
                conn.execute(
                    &format!(
                        "CREATE TABLE IF NOT EXISTS {side_table} \
                         (value TEXT, polarity INTEGER, weight REAL, origin TEXT, \
                          PRIMARY KEY (value, polarity, weight, origin))"
                    ),
                    [],
                )?;
            }
        }

        Ok(())
    }

    fn insert_unary(&self, table: &str, row: &UnaryRow) -> Result<()> {
        let t = quote_ident(table);
        self.conn.borrow().execute(
            &format!("INSERT OR IGNORE INTO {t} (value, polarity, weight, origin) VALUES (?1, ?2, ?3, ?4)"),
            rusqlite::params![row.value, row.positive as i64, row.weight, row.origin],
        )?;
        Ok(())
    }

    fn insert_binary(&self, table: &str, row: &BinaryRow) -> Result<()> {
        let t = quote_ident(table);
        self.conn.borrow().execute(
            &format!(
                "INSERT OR IGNORE INTO {t} (left_value, right_value, polarity, weight, origin) \
                 VALUES (?1, ?2, ?3, ?4, ?5)"
            ),
            rusqlite::params![row.left_value, row.right_value, row.positive as i64, row.weight, row.origin],
        )?;
        Ok(())
    }

    fn copy_unary(&self, src: &str, dst: &str, flip_polarity: bool) -> Result<()> {
        let s = quote_ident(src);
        let d = quote_ident(dst);
        let polarity_expr = if flip_polarity { "0" } else { "1" };
        self.conn.borrow().execute(
            &format!(
                "INSERT OR IGNORE INTO {d} (value, polarity, weight, origin) \
                 SELECT value, {polarity_expr}, weight, origin FROM {s} WHERE polarity = 1"
            ),
            [],
        )?;
        Ok(())
    }

    fn copy_binary(&self, src: &str, dst: &str, flip_polarity: bool) -> Result<()> {
        let s = quote_ident(src);
        let d = quote_ident(dst);
        let polarity_expr = if flip_polarity { "0" } else { "1" };
        self.conn.borrow().execute(
            &format!(
                "INSERT OR IGNORE INTO {d} (left_value, right_value, polarity, weight, origin) \
                 SELECT left_value, right_value, {polarity_expr}, weight, origin FROM {s} WHERE polarity = 1"
            ),
            [],
        )?;
        Ok(())
    }

    fn polarity_collisions(&self, table: &str, origins: &[String]) -> Result<Vec<(f64, String)>> {
        if origins.is_empty() {
            return Ok(Vec::new());
        }

        let t = quote_ident(table);
        let placeholders: Vec<String> = (1..=origins.len()).map(|i| format!("?{i}")).collect();
        let origin_filter = placeholders.join(", ");

        let sql = format!(
            "SELECT value FROM {t} WHERE origin IN ({origin_filter}) AND polarity = 1
             INTERSECT
             SELECT value FROM {t} WHERE origin IN ({origin_filter}) AND polarity = 0"
        );

        let conn = self.conn.borrow();
        let mut collided_values: Vec<String> = Vec::new();
        {
            let mut stmt = conn.prepare(&sql)?;
            let params: Vec<&dyn rusqlite::ToSql> =
                origins.iter().map(|o| o as &dyn rusqlite::ToSql).collect();
            // Both IN-lists use the same numbered placeholders (?1..?N), so
            // SQLite reuses one bind per origin rather than needing each
            // placeholder bound twice.
            let mut rows = stmt.query(params.as_slice())?;
            while let Some(row) = rows.next()? {
                collided_values.push(row.get(0)?);
            }
        }

        if collided_values.is_empty() {
            return Ok(Vec::new());
        }

        let value_placeholders: Vec<String> = (1..=collided_values.len()).map(|i| format!("?{i}")).collect();
        let sql = format!(
            "SELECT MAX(weight), origin FROM {t} WHERE value IN ({}) GROUP BY origin",
            value_placeholders.join(", ")
        );
        let mut stmt = conn.prepare(&sql)?;
        let params: Vec<&dyn rusqlite::ToSql> =
            collided_values.iter().map(|v| v as &dyn rusqlite::ToSql).collect();
        let mut rows = stmt.query(params.as_slice())?;

        let mut out = Vec::new();
        while let Some(row) = rows.next()? {
            let weight: f64 = row.get(0)?;
            let origin: String = row.get(1)?;
            out.push((weight, origin));
        }
        Ok(out)
    }

    fn cut(&self, table: &str, origin: &str, threshold: f64) -> Result<()> {
        let t = quote_ident(table);
        self.conn.borrow().execute(
            &format!("DELETE FROM {t} WHERE origin = ?1 AND weight <= ?2"),
            rusqlite::params![origin, threshold],
        )?;
        Ok(())
    }

    fn select(&self, sql: &str, n_columns: usize) -> Result<Vec<Vec<String>>> {
        let conn = self.conn.borrow();
        let mut stmt = conn.prepare(sql)?;
        let mut rows = stmt.query([])?;
        let mut out = Vec::new();
        while let Some(row) = rows.next()? {
            let mut cols = Vec::with_capacity(n_columns);
            for i in 0..n_columns {
                cols.push(column_to_string(row.get_ref(i)?));
            }
            out.push(cols);
        }
        Ok(out)
    }

    fn save_metadata(&self, key: MetadataKey, json: &str) -> Result<()> {
        self.conn.borrow().execute(
            "INSERT OR REPLACE INTO __dl_metadata__ (name, value) VALUES (?1, ?2)",
            rusqlite::params![key.as_str(), json],
        )?;
        Ok(())
    }

    fn load_metadata(&self, key: MetadataKey) -> Result<String> {
        let conn = self.conn.borrow();
        let value: String = conn.query_row(
            "SELECT value FROM __dl_metadata__ WHERE name = ?1",
            rusqlite::params![key.as_str()],
            |row| row.get(0),
        )?;
        Ok(value)
    }

    fn table_stats(&self, tables: &[String]) -> Result<Vec<(String, u64)>> {
        let conn = self.conn.borrow();
        let mut out = Vec::with_capacity(tables.len());
        for table in tables {
            let t = quote_ident(table);
            let count: i64 = conn.query_row(&format!("SELECT COUNT(*) FROM {t}"), [], |row| row.get(0))?;
            out.push((table.clone(), count as u64));
        }
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn insert_or_ignore_is_idempotent() {
        let store = SqliteStore::open_in_memory().unwrap();
        store.create_tables(&["C".to_string()], &[]).unwrap();

        let row = UnaryRow {
            value: "x".to_string(),
            positive: true,
            weight: 1.0,
            origin: "O1".to_string(),
        };
        store.insert_unary("C", &row).unwrap();
        store.insert_unary("C", &row).unwrap();

        let stats = store.table_stats(&["C".to_string()]).unwrap();
        assert_eq!(stats[0].1, 1);
    }

    #[test]
    fn metadata_round_trips() {
        let store = SqliteStore::open_in_memory().unwrap();
        store.save_metadata(MetadataKey::Origins, "[\"a.json\"]").unwrap();
        assert_eq!(store.load_metadata(MetadataKey::Origins).unwrap(), "[\"a.json\"]");
    }
}
