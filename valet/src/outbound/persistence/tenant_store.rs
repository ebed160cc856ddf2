//! PostgreSQL-backed store with an ambient per-session tenant tag.

use std::collections::BTreeMap;

use ortho_config::OrthoConfig;
use postgres::types::{ToSql, Type};
use postgres::{Client, NoTls};
use serde_json::Value;
use tracing::{debug, info};

use crate::config::StoreSettings;

/// A result row: output column name mapped to a JSON value.
pub type RowMap = BTreeMap<String, Value>;

/// Errors raised by the tenant-scoped store.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TenantStoreError {
    /// The store is unreachable or misconfigured.
    #[error("store connection failed: {message}")]
    Connection {
        /// Description of the connection failure.
        message: String,
    },
    /// A statement was malformed, violated a constraint, or the session was
    /// lost mid-query.
    #[error("store query failed: {message}")]
    Query {
        /// Description of the query failure.
        message: String,
    },
}

impl TenantStoreError {
    /// Build a [`TenantStoreError::Connection`].
    pub fn connection(message: impl Into<String>) -> Self {
        Self::Connection {
            message: message.into(),
        }
    }

    /// Build a [`TenantStoreError::Query`].
    pub fn query(message: impl Into<String>) -> Self {
        Self::Query {
            message: message.into(),
        }
    }
}

/// A synchronous database session carrying an optional tenant tag.
///
/// The tag is communicated to the server once, at open time, as the
/// `app.tenant_id` session variable; row isolation built on top of it (for
/// example row-level security policies) is entirely the database's job.
///
/// The caller must see `close` run on every exit path. Dropping the store
/// releases the connection too, so holding it in a scope is sufficient;
/// `close` stays available for callers that want the release to be explicit
/// and is safe to call repeatedly.
///
/// # Examples
///
/// ```no_run
/// use valet::config::StoreSettings;
/// use valet::outbound::persistence::TenantStore;
///
/// # fn demo() -> Result<(), valet::outbound::persistence::TenantStoreError> {
/// let settings = StoreSettings {
///     host: "localhost".into(),
///     port: 5432,
///     name: "valet".into(),
///     user: "valet".into(),
///     password: "secret".into(),
/// };
/// let mut store = TenantStore::open(&settings, Some("customer-001"))?;
/// let rows = store.execute("SELECT 1", &[])?;
/// assert_eq!(rows.len(), 1);
/// store.close();
/// # Ok(())
/// # }
/// ```
pub struct TenantStore {
    client: Option<Client>,
    tenant: Option<String>,
}

// Manual impl: the driver client does not implement Debug.
impl std::fmt::Debug for TenantStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TenantStore")
            .field("open", &self.client.is_some())
            .field("tenant", &self.tenant)
            .finish()
    }
}

impl TenantStore {
    /// Open a session using the given connection parameters, applying the
    /// tenant tag when one is supplied.
    ///
    /// A handshake or tag failure yields [`TenantStoreError::Connection`]
    /// and the partially-built connection is dropped, not leaked.
    pub fn open(
        settings: &StoreSettings,
        tenant: Option<&str>,
    ) -> Result<Self, TenantStoreError> {
        let mut config = postgres::Config::new();
        config
            .host(&settings.host)
            .port(settings.port)
            .dbname(&settings.name)
            .user(&settings.user)
            .password(&settings.password);

        let mut client = config
            .connect(NoTls)
            .map_err(|error| TenantStoreError::connection(describe_postgres_error(&error)))?;

        if let Some(tenant) = tenant {
            client
                .execute("SELECT set_config('app.tenant_id', $1, false)", &[&tenant])
                .map_err(|error| TenantStoreError::connection(describe_postgres_error(&error)))?;
            debug!(tenant, "applied tenant session tag");
        }

        info!(database = %settings.name, "connected to database");
        Ok(Self {
            client: Some(client),
            tenant: tenant.map(str::to_owned),
        })
    }

    /// Open a session with parameters read from the process environment.
    ///
    /// Absent required parameters surface as a connection error, the same
    /// class as an unreachable server.
    pub fn open_from_env(tenant: Option<&str>) -> Result<Self, TenantStoreError> {
        let settings =
            StoreSettings::load_from_iter([std::ffi::OsString::from("valet")]).map_err(|error| {
                TenantStoreError::connection(format!("load store settings: {error}"))
            })?;
        Self::open(&settings, tenant)
    }

    /// The tenant tag applied at open time, when one was supplied.
    pub fn tenant(&self) -> Option<&str> {
        self.tenant.as_deref()
    }

    /// Whether the underlying connection is still held.
    pub fn is_open(&self) -> bool {
        self.client.is_some()
    }

    /// Execute one statement with driver-substituted positional parameters.
    ///
    /// Reads return their result set as ordered row mappings; mutations run
    /// in the driver's autocommit mode (the commit is implicit) and return
    /// an empty sequence. On [`TenantStoreError::Query`] the session is in
    /// an undefined state and the caller must close the store. Executing on
    /// a closed store reports a connection error.
    pub fn execute(
        &mut self,
        query: &str,
        params: &[&(dyn ToSql + Sync)],
    ) -> Result<Vec<RowMap>, TenantStoreError> {
        let client = self
            .client
            .as_mut()
            .ok_or_else(|| TenantStoreError::connection("store is closed"))?;

        let rows = client
            .query(query, params)
            .map_err(|error| TenantStoreError::query(describe_postgres_error(&error)))?;

        rows.iter().map(row_to_map).collect()
    }

    /// Release the underlying connection. Safe to call repeatedly.
    pub fn close(&mut self) {
        if self.client.take().is_some() {
            info!("database connection closed");
        }
    }
}

/// Convert a driver row into a column-name-to-JSON mapping.
fn row_to_map(row: &postgres::Row) -> Result<RowMap, TenantStoreError> {
    let mut map = RowMap::new();
    for (index, column) in row.columns().iter().enumerate() {
        let value = column_value(row, index, column.name(), column.type_())?;
        map.insert(column.name().to_owned(), value);
    }
    Ok(map)
}

/// Decode one column into a JSON value, with SQL NULL as `Value::Null`.
///
/// Column types without a defined mapping are an explicit query error
/// naming the type, never a silently wrong value.
fn column_value(
    row: &postgres::Row,
    index: usize,
    name: &str,
    ty: &Type,
) -> Result<Value, TenantStoreError> {
    let decode_error = |error: postgres::Error| {
        TenantStoreError::query(format!("decode column '{name}': {error}"))
    };

    let value = if *ty == Type::BOOL {
        row.try_get::<_, Option<bool>>(index)
            .map_err(decode_error)?
            .map(Value::Bool)
    } else if *ty == Type::INT2 {
        row.try_get::<_, Option<i16>>(index)
            .map_err(decode_error)?
            .map(Value::from)
    } else if *ty == Type::INT4 {
        row.try_get::<_, Option<i32>>(index)
            .map_err(decode_error)?
            .map(Value::from)
    } else if *ty == Type::INT8 {
        row.try_get::<_, Option<i64>>(index)
            .map_err(decode_error)?
            .map(Value::from)
    } else if *ty == Type::FLOAT4 {
        row.try_get::<_, Option<f32>>(index)
            .map_err(decode_error)?
            .map(|float| Value::from(f64::from(float)))
    } else if *ty == Type::FLOAT8 {
        row.try_get::<_, Option<f64>>(index)
            .map_err(decode_error)?
            .map(Value::from)
    } else if *ty == Type::TEXT || *ty == Type::VARCHAR || *ty == Type::BPCHAR || *ty == Type::NAME
    {
        row.try_get::<_, Option<String>>(index)
            .map_err(decode_error)?
            .map(Value::String)
    } else if *ty == Type::JSON || *ty == Type::JSONB {
        row.try_get::<_, Option<Value>>(index).map_err(decode_error)?
    } else if *ty == Type::UUID {
        row.try_get::<_, Option<uuid::Uuid>>(index)
            .map_err(decode_error)?
            .map(|id| Value::String(id.to_string()))
    } else if *ty == Type::TIMESTAMP {
        row.try_get::<_, Option<chrono::NaiveDateTime>>(index)
            .map_err(decode_error)?
            .map(|stamp| Value::String(stamp.format("%Y-%m-%dT%H:%M:%S%.6f").to_string()))
    } else if *ty == Type::TIMESTAMPTZ {
        row.try_get::<_, Option<chrono::DateTime<chrono::Utc>>>(index)
            .map_err(decode_error)?
            .map(|stamp| Value::String(stamp.to_rfc3339()))
    } else {
        return Err(TenantStoreError::query(format!(
            "unsupported column type {ty} for column '{name}'"
        )));
    };

    Ok(value.unwrap_or(Value::Null))
}

/// Render a driver error with enough detail to be actionable.
///
/// The `postgres::Error` `Display` implementation often collapses database
/// errors to a generic `db error`; prefer the server's message and SQLSTATE
/// when they are available.
fn describe_postgres_error(error: &postgres::Error) -> String {
    let Some(db_error) = error.as_db_error() else {
        return error.to_string();
    };

    let mut summary = format!("{} (SQLSTATE {})", db_error.message(), db_error.code().code());
    if let Some(detail) = db_error.detail() {
        summary.push_str("; detail: ");
        summary.push_str(detail);
    }
    summary
}
