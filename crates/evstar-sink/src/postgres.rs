//! PostgreSQL table sink
//!
//! Each table is replaced inside its own transaction:
//! `DROP TABLE IF EXISTS`, `CREATE TABLE`, then multi-row parameterised
//! `INSERT` batches. A failure rolls back that table only; tables committed
//! earlier in the run stay replaced.
//!
//! ## Usage
//!
//! ```rust,ignore
//! let config = Config::from_file(Path::new("evstar.toml"))?;
//! if let Some(SinkConfig::Postgres(pg)) = &config.sink {
//!     let sink = PostgresSink::connect(pg).await?;
//!     sink.replace_table(&table).await?;
//! }
//! ```
//!
//! Requires the `postgres` feature.

use crate::adapter::{quote_ident, LoadError, TableIdentifier, TableSink};
use evstar_core::{LogicalType, Nullability, PostgresSinkConfig, Schema, Table};

#[cfg(feature = "postgres")]
use evstar_core::Value;

#[cfg(feature = "postgres")]
use tokio_postgres::{types::ToSql, Client, Config as PgConfig, NoTls};

#[cfg(feature = "postgres")]
use postgres_native_tls::MakeTlsConnector;

#[cfg(feature = "postgres")]
use native_tls::TlsConnector;

#[cfg(feature = "postgres")]
use tokio::sync::Mutex;

/// PostgreSQL caps bind parameters per statement at 65535
pub const MAX_BIND_PARAMETERS: usize = 65535;

/// PostgreSQL table sink
#[cfg_attr(not(feature = "postgres"), allow(dead_code))]
pub struct PostgresSink {
    /// Client behind a lock, transactions need `&mut Client`
    #[cfg(feature = "postgres")]
    client: Mutex<Client>,

    /// host:port/database, for logs
    target: String,

    schema: String,

    batch_size: usize,
}

impl PostgresSink {
    /// Connect using a sink config, over TLS when `config.tls` is set
    #[cfg(feature = "postgres")]
    pub async fn connect(config: &PostgresSinkConfig) -> Result<Self, LoadError> {
        let password = config
            .resolve_password()
            .map_err(|e| LoadError::ConfigError(e.to_string()))?;

        let mut pg = PgConfig::new();
        pg.host(&config.host)
            .port(config.port)
            .dbname(&config.database)
            .user(&config.user);
        if !password.is_empty() {
            pg.password(password);
        }

        let target = format!("{}:{}/{}", config.host, config.port, config.database);

        let client = if config.tls {
            let connector = TlsConnector::builder()
                .build()
                .map_err(|e| LoadError::ConfigError(format!("Failed to create TLS connector: {}", e)))?;
            let (client, connection) = pg
                .connect(MakeTlsConnector::new(connector))
                .await
                .map_err(|e| LoadError::ConnectionError(format!("{} with TLS: {}", target, e)))?;
            spawn_connection(connection, target.clone());
            client
        } else {
            let (client, connection) = pg
                .connect(NoTls)
                .await
                .map_err(|e| LoadError::ConnectionError(format!("{}: {}", target, e)))?;
            spawn_connection(connection, target.clone());
            client
        };

        tracing::info!(endpoint = %target, tls = config.tls, "connected to PostgreSQL");

        Ok(Self {
            client: Mutex::new(client),
            target,
            schema: config.schema.clone(),
            batch_size: config.batch_size,
        })
    }

    /// Connect without postgres feature (returns error)
    #[cfg(not(feature = "postgres"))]
    pub async fn connect(_config: &PostgresSinkConfig) -> Result<Self, LoadError> {
        Err(LoadError::ConfigError(
            "PostgreSQL support not compiled. Rebuild with: cargo build --features postgres".to_string(),
        ))
    }

    fn identifier(&self, table: &Table) -> TableIdentifier {
        TableIdentifier::new(&self.schema, &table.name)
    }
}

#[cfg(feature = "postgres")]
fn spawn_connection<C>(connection: C, target: String)
where
    C: std::future::Future<Output = Result<(), tokio_postgres::Error>> + Send + 'static,
{
    tokio::spawn(async move {
        if let Err(e) = connection.await {
            tracing::error!(endpoint = %target, error = %e, "PostgreSQL connection error");
        }
    });
}

/// Column type used in `CREATE TABLE`
pub fn postgres_type(logical_type: LogicalType) -> &'static str {
    match logical_type {
        LogicalType::Int => "BIGINT",
        LogicalType::Float => "DOUBLE PRECISION",
        LogicalType::String => "TEXT",
    }
}

pub fn drop_table_sql(id: &TableIdentifier) -> String {
    format!("DROP TABLE IF EXISTS {}", id.quoted())
}

pub fn create_table_sql(id: &TableIdentifier, schema: &Schema) -> String {
    let columns: Vec<String> = schema
        .columns
        .iter()
        .map(|c| {
            let mut def = format!("{} {}", quote_ident(&c.name), postgres_type(c.logical_type));
            if c.nullable == Nullability::No {
                def.push_str(" NOT NULL");
            }
            def
        })
        .collect();
    format!("CREATE TABLE {} ({})", id.quoted(), columns.join(", "))
}

/// Multi-row insert with `$n` placeholders for `rows` rows
pub fn insert_sql(id: &TableIdentifier, schema: &Schema, rows: usize) -> String {
    let width = schema.len();
    let names: Vec<String> = schema.columns.iter().map(|c| quote_ident(&c.name)).collect();
    let tuples: Vec<String> = (0..rows)
        .map(|row| {
            let placeholders: Vec<String> = (1..=width).map(|col| format!("${}", row * width + col)).collect();
            format!("({})", placeholders.join(", "))
        })
        .collect();
    format!(
        "INSERT INTO {} ({}) VALUES {}",
        id.quoted(),
        names.join(", "),
        tuples.join(", ")
    )
}

/// Rows per INSERT, bounded by the configured batch size and the bind-parameter limit
pub fn rows_per_batch(batch_size: usize, columns: usize) -> usize {
    (MAX_BIND_PARAMETERS / columns.max(1)).min(batch_size).max(1)
}

/// Typed parameter for one cell; nulls keep the column's type
#[cfg(feature = "postgres")]
fn bind_value(logical_type: LogicalType, value: &Value) -> Box<dyn ToSql + Sync + Send> {
    match logical_type {
        LogicalType::Int => Box::new(value.as_int()),
        LogicalType::Float => Box::new(value.as_float()),
        LogicalType::String => Box::new(value.as_text().map(str::to_string)),
    }
}

#[cfg(feature = "postgres")]
#[async_trait::async_trait]
impl TableSink for PostgresSink {
    fn name(&self) -> &'static str {
        "PostgreSQL"
    }

    async fn replace_table(&self, table: &Table) -> Result<(), LoadError> {
        let id = self.identifier(table);
        let fail = |e: tokio_postgres::Error| LoadError::write(&table.name, e);

        let mut client = self.client.lock().await;
        let tx = client.transaction().await.map_err(fail)?;

        tx.batch_execute(&drop_table_sql(&id)).await.map_err(fail)?;
        tx.batch_execute(&create_table_sql(&id, &table.schema)).await.map_err(fail)?;

        let batch = rows_per_batch(self.batch_size, table.schema.len());
        for chunk in table.rows().chunks(batch) {
            let params: Vec<Box<dyn ToSql + Sync + Send>> = chunk
                .iter()
                .flat_map(|row| {
                    table
                        .schema
                        .columns
                        .iter()
                        .zip(row)
                        .map(|(column, value)| bind_value(column.logical_type, value))
                })
                .collect();
            let refs: Vec<&(dyn ToSql + Sync)> = params.iter().map(|p| &**p as &(dyn ToSql + Sync)).collect();

            let sql = insert_sql(&id, &table.schema, chunk.len());
            tx.execute(sql.as_str(), &refs).await.map_err(fail)?;
        }

        tx.commit().await.map_err(fail)?;

        tracing::info!(
            endpoint = %self.target,
            table = %id,
            rows = table.row_count(),
            "replaced table"
        );
        Ok(())
    }

    async fn test_connection(&self) -> Result<(), LoadError> {
        self.client
            .lock()
            .await
            .simple_query("SELECT 1")
            .await
            .map(|_| ())
            .map_err(|e| LoadError::ConnectionError(format!("{}: {}", self.target, e)))
    }
}

#[cfg(not(feature = "postgres"))]
#[async_trait::async_trait]
impl TableSink for PostgresSink {
    fn name(&self) -> &'static str {
        "PostgreSQL"
    }

    async fn replace_table(&self, table: &Table) -> Result<(), LoadError> {
        Err(LoadError::write(
            self.identifier(table).fqn(),
            "PostgreSQL support not compiled",
        ))
    }

    async fn test_connection(&self) -> Result<(), LoadError> {
        Err(LoadError::ConfigError(
            "PostgreSQL support not compiled".to_string(),
        ))
    }
}
