//! MS SQL Server connection implementation using tiberius

use async_trait::async_trait;
use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use futures::TryStreamExt;
use procgate_core::{
    ParamMap, ProcValue, ProcedureConnection, ProcgateError, Result, ResultSet, ResultSets,
};
use rust_decimal::Decimal;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};
use tiberius::numeric::Numeric;
use tiberius::{
    AuthMethod, Client, ColumnData, Config, EncryptionLevel, FromSql, QueryItem, ToSql,
};
use tokio::net::TcpStream;
use tokio::sync::Mutex;
use tokio_util::compat::{Compat, TokioAsyncWriteCompatExt};

use crate::config::MssqlConfig;
use crate::dialect::build_exec_statement;

/// MS SQL Server connection errors
#[derive(Debug, thiserror::Error)]
pub enum MssqlConnectionError {
    #[error("Connection failed: {0}")]
    ConnectionFailed(String),

    #[error("Authentication failed: {0}")]
    AuthenticationFailed(String),

    #[error("Procedure execution failed: {0}")]
    ExecutionFailed(String),

    #[error("Type conversion error: {0}")]
    TypeConversion(String),

    #[error("Connection is closed")]
    ConnectionClosed,

    #[error("Tiberius error: {0}")]
    Tiberius(#[from] tiberius::error::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<MssqlConnectionError> for ProcgateError {
    fn from(err: MssqlConnectionError) -> Self {
        match err {
            MssqlConnectionError::ConnectionFailed(_)
            | MssqlConnectionError::AuthenticationFailed(_)
            | MssqlConnectionError::ConnectionClosed
            | MssqlConnectionError::Io(_) => ProcgateError::Connection(err.to_string()),
            MssqlConnectionError::TypeConversion(msg) => ProcgateError::Conversion(msg),
            MssqlConnectionError::ExecutionFailed(_) | MssqlConnectionError::Tiberius(_) => {
                ProcgateError::Query(err.to_string())
            }
        }
    }
}

/// MS SQL Server connection using tiberius
pub struct MssqlConnection {
    client: Mutex<Client<Compat<TcpStream>>>,
    closed: AtomicBool,
    database: Option<String>,
    schema: String,
    command_timeout: Duration,
}

impl MssqlConnection {
    /// Open a new MS SQL Server connection
    #[tracing::instrument(skip(config), fields(host = %config.host, port = config.port, database = config.database.as_deref()))]
    pub async fn connect(
        config: &MssqlConfig,
    ) -> std::result::Result<Self, MssqlConnectionError> {
        tracing::debug!("connecting to MS SQL Server");

        let mut tds = Config::new();
        tds.host(&config.host);
        tds.port(config.port);

        if let Some(db) = &config.database {
            tds.database(db);
        }

        if config.trust_cert {
            tds.trust_cert();
        }

        tds.encryption(EncryptionLevel::Required);

        match (&config.username, &config.password) {
            (Some(user), Some(pass)) => {
                tds.authentication(AuthMethod::sql_server(user, pass));
            }
            (Some(user), None) => {
                tds.authentication(AuthMethod::sql_server(user, ""));
            }
            (None, _) => {
                return Err(MssqlConnectionError::AuthenticationFailed(
                    "a SQL Server login is required".to_string(),
                ));
            }
        }

        let tcp = TcpStream::connect(tds.get_addr())
            .await
            .map_err(|e| MssqlConnectionError::ConnectionFailed(e.to_string()))?;

        tcp.set_nodelay(true)?;

        let client = Client::connect(tds, tcp.compat_write())
            .await
            .map_err(|e| MssqlConnectionError::ConnectionFailed(e.to_string()))?;

        tracing::debug!("successfully connected to MS SQL Server");

        Ok(Self {
            client: Mutex::new(client),
            closed: AtomicBool::new(false),
            database: config.database.clone(),
            schema: config.schema.clone(),
            command_timeout: config.command_timeout(),
        })
    }

    fn ensure_not_closed(&self) -> std::result::Result<(), MssqlConnectionError> {
        if self.closed.load(Ordering::SeqCst) {
            return Err(MssqlConnectionError::ConnectionClosed);
        }
        Ok(())
    }
}

#[async_trait]
impl ProcedureConnection for MssqlConnection {
    fn driver_name(&self) -> &str {
        "mssql"
    }

    async fn call_procedure(&self, procedure: &str, params: &ParamMap) -> Result<ResultSets> {
        self.ensure_not_closed()?;
        let start = Instant::now();

        let statement = build_exec_statement(&self.schema, procedure, params);
        let bound = params_to_tiberius(params);

        let mut client = self.client.lock().await;
        let outcome = tokio::time::timeout(
            self.command_timeout,
            collect_result_sets(&mut client, &statement, &bound),
        )
        .await;

        match outcome {
            Ok(Ok(sets)) => {
                tracing::debug!(
                    procedure = %procedure,
                    result_sets = sets.len(),
                    rows = sets.total_rows(),
                    duration_ms = start.elapsed().as_millis() as u64,
                    "procedure call completed"
                );
                Ok(sets)
            }
            Ok(Err(e)) => {
                tracing::error!(procedure = %procedure, error = %e, "procedure call failed");
                Err(e.into())
            }
            Err(_) => {
                // The TDS stream is left mid-response; the connection cannot be reused.
                self.closed.store(true, Ordering::SeqCst);
                tracing::error!(
                    procedure = %procedure,
                    timeout_ms = self.command_timeout.as_millis() as u64,
                    "procedure call timed out"
                );
                Err(ProcgateError::Timeout(format!(
                    "procedure call exceeded {:?}",
                    self.command_timeout
                )))
            }
        }
    }

    async fn ping(&self) -> Result<()> {
        self.ensure_not_closed()?;
        let mut client = self.client.lock().await;
        let outcome = tokio::time::timeout(self.command_timeout, async {
            client.simple_query("SELECT 1").await?.into_results().await
        })
        .await;

        match outcome {
            Ok(Ok(_)) => Ok(()),
            Ok(Err(e)) => Err(MssqlConnectionError::from(e).into()),
            Err(_) => {
                self.closed.store(true, Ordering::SeqCst);
                Err(ProcgateError::Timeout("ping timed out".to_string()))
            }
        }
    }

    async fn close(&self) -> Result<()> {
        self.closed.store(true, Ordering::SeqCst);
        tracing::debug!("MS SQL Server connection closed");
        Ok(())
    }

    fn is_closed(&self) -> bool {
        self.closed.load(Ordering::SeqCst)
    }
}

/// Run the statement and gather every result set in production order.
///
/// Each metadata token opens a new result set, so sets without rows are kept.
async fn collect_result_sets(
    client: &mut Client<Compat<TcpStream>>,
    statement: &str,
    params: &[TiberiusParam],
) -> std::result::Result<ResultSets, MssqlConnectionError> {
    let param_refs: Vec<&dyn ToSql> = params.iter().map(|p| p as &dyn ToSql).collect();

    let mut stream = client.query(statement, &param_refs[..]).await?;
    let mut sets = ResultSets::new();

    while let Some(item) = stream.try_next().await? {
        match item {
            QueryItem::Metadata(meta) => {
                let columns = meta
                    .columns()
                    .iter()
                    .map(|col| col.name().to_string())
                    .collect();
                sets.push(ResultSet::new(columns));
            }
            QueryItem::Row(row) => {
                let values = row
                    .into_iter()
                    .map(column_data_to_value)
                    .collect::<std::result::Result<Vec<_>, _>>()?;
                match sets.last_mut() {
                    Some(set) => set.push_values(values),
                    None => {
                        return Err(MssqlConnectionError::TypeConversion(
                            "row received before result metadata".to_string(),
                        ));
                    }
                }
            }
        }
    }

    Ok(sets)
}

/// Convert tiberius ColumnData to a procgate value.
///
/// NULL of any SQL type becomes `ProcValue::Null`.
pub(crate) fn column_data_to_value(
    col_data: ColumnData<'static>,
) -> std::result::Result<ProcValue, MssqlConnectionError> {
    let value = match col_data {
        ColumnData::Bit(v) => v.map(ProcValue::Bool),
        ColumnData::U8(v) => v.map(|v| ProcValue::Int(v as i64)),
        ColumnData::I16(v) => v.map(|v| ProcValue::Int(v as i64)),
        ColumnData::I32(v) => v.map(|v| ProcValue::Int(v as i64)),
        ColumnData::I64(v) => v.map(ProcValue::Int),
        ColumnData::F32(v) => v.map(|v| ProcValue::Float(v as f64)),
        ColumnData::F64(v) => v.map(ProcValue::Float),
        ColumnData::String(v) => v.map(|v| ProcValue::Text(v.into_owned())),
        ColumnData::Guid(v) => v.map(|v| ProcValue::Text(v.to_string())),
        ColumnData::Binary(v) => v.map(|v| ProcValue::Text(hex::encode(v.as_ref()))),
        ColumnData::Numeric(v) => v.map(numeric_to_value),
        ColumnData::Xml(v) => v.map(|v| ProcValue::Text(v.into_owned().into_string())),
        ref data @ (ColumnData::DateTime(_)
        | ColumnData::SmallDateTime(_)
        | ColumnData::DateTime2(_)) => {
            NaiveDateTime::from_sql(data).map_err(conversion_error)?.map(ProcValue::Timestamp)
        }
        ref data @ ColumnData::Date(_) => NaiveDate::from_sql(data)
            .map_err(conversion_error)?
            .map(|d| ProcValue::Timestamp(d.and_time(NaiveTime::MIN))),
        ref data @ ColumnData::Time(_) => NaiveTime::from_sql(data)
            .map_err(conversion_error)?
            .map(|t| ProcValue::Text(t.to_string())),
        ref data @ ColumnData::DateTimeOffset(_) => {
            chrono::DateTime::<chrono::Utc>::from_sql(data)
                .map_err(conversion_error)?
                .map(|dt| ProcValue::Timestamp(dt.naive_utc()))
        }
    };

    Ok(value.unwrap_or(ProcValue::Null))
}

fn conversion_error(err: tiberius::error::Error) -> MssqlConnectionError {
    MssqlConnectionError::TypeConversion(err.to_string())
}

/// Decimal columns keep their exact value when it fits in `rust_decimal`
fn numeric_to_value(n: Numeric) -> ProcValue {
    match Decimal::try_from_i128_with_scale(n.value(), n.scale() as u32) {
        Ok(d) => ProcValue::Decimal(d),
        Err(_) => ProcValue::Text(n.to_string()),
    }
}

/// Container for tiberius parameter values
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum TiberiusParam {
    Null,
    Bool(bool),
    I64(i64),
    Numeric { value: i128, scale: u8 },
    F64(f64),
    String(String),
    DateTime(NaiveDateTime),
}

impl ToSql for TiberiusParam {
    fn to_sql(&self) -> ColumnData<'_> {
        match self {
            // NVARCHAR NULL converts implicitly to every parameter type; INT NULL
            // does not convert to date, time, uniqueidentifier or binary types
            TiberiusParam::Null => ColumnData::String(None),
            TiberiusParam::Bool(v) => ColumnData::Bit(Some(*v)),
            TiberiusParam::I64(v) => ColumnData::I64(Some(*v)),
            TiberiusParam::Numeric { value, scale } => {
                ColumnData::Numeric(Some(Numeric::new_with_scale(*value, *scale)))
            }
            TiberiusParam::F64(v) => ColumnData::F64(Some(*v)),
            TiberiusParam::String(v) => {
                ColumnData::String(Some(std::borrow::Cow::Borrowed(v.as_str())))
            }
            TiberiusParam::DateTime(v) => v.to_sql(),
        }
    }
}

/// Convert a procgate value to a tiberius parameter
pub(crate) fn value_to_tiberius_param(value: &ProcValue) -> TiberiusParam {
    match value {
        ProcValue::Null => TiberiusParam::Null,
        ProcValue::Bool(b) => TiberiusParam::Bool(*b),
        ProcValue::Int(i) => TiberiusParam::I64(*i),
        ProcValue::Decimal(d) => TiberiusParam::Numeric {
            value: d.mantissa(),
            scale: d.scale() as u8,
        },
        ProcValue::Float(f) => TiberiusParam::F64(*f),
        ProcValue::Text(s) | ProcValue::Raw(s) => TiberiusParam::String(s.clone()),
        ProcValue::Timestamp(ts) => TiberiusParam::DateTime(*ts),
    }
}

/// Convert a parameter map to tiberius parameters in binding order
pub(crate) fn params_to_tiberius(params: &ParamMap) -> Vec<TiberiusParam> {
    params
        .iter()
        .map(|(_, value)| value_to_tiberius_param(value))
        .collect()
}

impl std::fmt::Debug for MssqlConnection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MssqlConnection")
            .field("database", &self.database)
            .field("schema", &self.schema)
            .field("closed", &self.closed.load(Ordering::SeqCst))
            .finish()
    }
}
