//! Relational backend over sqlx's `Any` driver.
//!
//! The loader is synchronous, so the sink owns a current-thread tokio runtime
//! and blocks on each statement. PostgreSQL and SQLite are supported; the
//! dialect follows the URL scheme.

use log::{debug, info};
use sqlx::{Any, AnyConnection, Connection};
use tokio::runtime::{Builder, Runtime};

use crate::{
    coerce::SqlValue,
    ddl::{SqlDialect, TableSchema},
    error::SinkError,
};

use super::TableSink;

pub struct SqlTableSink {
    runtime: Runtime,
    connection: Option<AnyConnection>,
    dialect: SqlDialect,
    insert_sql: Option<(String, String)>,
}

impl SqlTableSink {
    pub fn connect(url: &str) -> Result<Self, SinkError> {
        let dialect = SqlDialect::from_url(url)?;
        sqlx::any::install_default_drivers();
        let runtime = Builder::new_current_thread().enable_all().build()?;
        let connection = runtime.block_on(AnyConnection::connect(url))?;
        info!("Connected to {dialect} database");
        Ok(Self {
            runtime,
            connection: Some(connection),
            dialect,
            insert_sql: None,
        })
    }

    fn insert_statement(&mut self, table: &TableSchema) -> String {
        match &self.insert_sql {
            Some((name, sql)) if *name == table.table => sql.clone(),
            _ => {
                let sql = table.insert_statement();
                debug!("{sql}");
                self.insert_sql = Some((table.table.clone(), sql.clone()));
                sql
            }
        }
    }
}

impl TableSink for SqlTableSink {
    fn dialect(&self) -> SqlDialect {
        self.dialect
    }

    fn create_table(&mut self, table: &TableSchema) -> Result<(), SinkError> {
        let sql = table.create_statement();
        let Self {
            runtime,
            connection,
            ..
        } = self;
        let connection = connection.as_mut().ok_or(SinkError::Closed)?;
        runtime.block_on(sqlx::query::<Any>(&sql).execute(&mut *connection))?;
        Ok(())
    }

    fn insert_row(&mut self, table: &TableSchema, values: &[SqlValue]) -> Result<(), SinkError> {
        let sql = self.insert_statement(table);
        let Self {
            runtime,
            connection,
            ..
        } = self;
        let connection = connection.as_mut().ok_or(SinkError::Closed)?;
        let mut query = sqlx::query::<Any>(&sql);
        for value in values {
            query = match value {
                SqlValue::Integer(v) => query.bind(*v),
                SqlValue::Float(v) => query.bind(*v),
                SqlValue::Text(v) => query.bind(v.clone()),
            };
        }
        runtime.block_on(query.execute(&mut *connection))?;
        Ok(())
    }

    fn finish(&mut self) -> Result<(), SinkError> {
        if let Some(connection) = self.connection.take() {
            self.runtime.block_on(connection.close())?;
            debug!("Closed {} connection", self.dialect);
        }
        Ok(())
    }
}

impl Drop for SqlTableSink {
    fn drop(&mut self) {
        if let Some(connection) = self.connection.take() {
            let _ = self.runtime.block_on(connection.close());
        }
    }
}
