//! Database schema definitions
//!
//! The records table mirrors the tabular dataset: an `identifier` primary key
//! followed by one TEXT column per configured field.

use crate::record::IDENTIFIER_COLUMN;
use rusqlite::Connection;

/// Name of the table holding captured records
pub const RECORDS_TABLE: &str = "records";

/// Quotes an SQL identifier so arbitrary field names ("Broker Number") are safe
pub fn quote_ident(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}

/// SQL creating the records table for the given field columns
pub fn create_table_sql(columns: &[String]) -> String {
    let mut sql = format!(
        "CREATE TABLE IF NOT EXISTS {} (\n    {} TEXT PRIMARY KEY NOT NULL",
        RECORDS_TABLE,
        quote_ident(IDENTIFIER_COLUMN)
    );
    for column in columns {
        sql.push_str(&format!(",\n    {} TEXT", quote_ident(column)));
    }
    sql.push_str("\n)");
    sql
}

/// Creates the records table and adds any field column it lacks
///
/// Columns are only ever added, so a profile that gains a field keeps its
/// earlier rows.
pub fn initialize_schema(conn: &Connection, columns: &[String]) -> rusqlite::Result<()> {
    conn.execute_batch(&create_table_sql(columns))?;

    let existing = existing_columns(conn)?;
    for column in columns {
        if !existing.iter().any(|c| c == column) {
            tracing::info!("Adding column {} to {}", column, RECORDS_TABLE);
            conn.execute_batch(&format!(
                "ALTER TABLE {} ADD COLUMN {} TEXT",
                RECORDS_TABLE,
                quote_ident(column)
            ))?;
        }
    }
    Ok(())
}

/// Column names of the records table
pub fn existing_columns(conn: &Connection) -> rusqlite::Result<Vec<String>> {
    let mut stmt = conn.prepare(&format!("PRAGMA table_info({})", RECORDS_TABLE))?;
    let columns = stmt
        .query_map([], |row| row.get::<_, String>(1))?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(columns)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn columns() -> Vec<String> {
        vec!["Broker Number".to_string(), "Website".to_string()]
    }

    #[test]
    fn test_quote_ident() {
        assert_eq!(quote_ident("Website"), "\"Website\"");
        assert_eq!(quote_ident("a\"b"), "\"a\"\"b\"");
    }

    #[test]
    fn test_initialize_schema_is_idempotent() {
        let conn = Connection::open_in_memory().unwrap();
        initialize_schema(&conn, &columns()).unwrap();
        initialize_schema(&conn, &columns()).unwrap();

        let existing = existing_columns(&conn).unwrap();
        assert_eq!(
            existing,
            vec!["identifier", "Broker Number", "Website"]
        );
    }

    #[test]
    fn test_initialize_schema_adds_new_columns() {
        let conn = Connection::open_in_memory().unwrap();
        initialize_schema(&conn, &columns()).unwrap();

        let mut more = columns();
        more.push("Company Name".to_string());
        initialize_schema(&conn, &more).unwrap();

        assert!(existing_columns(&conn)
            .unwrap()
            .contains(&"Company Name".to_string()));
    }
}
