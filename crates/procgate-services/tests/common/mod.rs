//! Common test utilities and mocks

#![allow(dead_code)]

use async_trait::async_trait;
use parking_lot::Mutex;
use procgate_connection::{ConnectionFactory, ConnectionPool, PoolConfig};
use procgate_core::{
    ParamMap, ProcValue, ProcedureConnection, ProcgateError, Result, ResultSet, ResultSets,
};
use procgate_services::{AllowList, ProcedureService};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

/// A procedure call observed by the mock database
#[derive(Debug, Clone, PartialEq)]
pub struct RecordedCall {
    pub procedure: String,
    pub params: Vec<(String, ProcValue)>,
}

type Responder = dyn Fn(&str, &ParamMap) -> Result<ResultSets> + Send + Sync;

/// Shared state of the mock database behind every mock connection
pub struct MockDatabase {
    responder: Box<Responder>,
    calls: Mutex<Vec<RecordedCall>>,
    ping_fails: AtomicBool,
}

impl MockDatabase {
    /// Database that answers every call with no result sets
    pub fn new() -> Arc<Self> {
        Self::with_responder(|_, _| Ok(ResultSets::new()))
    }

    /// Database whose answers are computed per call
    pub fn with_responder<F>(responder: F) -> Arc<Self>
    where
        F: Fn(&str, &ParamMap) -> Result<ResultSets> + Send + Sync + 'static,
    {
        Arc::new(Self {
            responder: Box::new(responder),
            calls: Mutex::new(Vec::new()),
            ping_fails: AtomicBool::new(false),
        })
    }

    /// Every call received so far, in order
    pub fn calls(&self) -> Vec<RecordedCall> {
        self.calls.lock().clone()
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().len()
    }

    pub fn fail_pings(&self) {
        self.ping_fails.store(true, Ordering::SeqCst);
    }
}

/// Mock connection for testing the service without a real database
pub struct MockConnection {
    db: Arc<MockDatabase>,
    closed: AtomicBool,
}

#[async_trait]
impl ProcedureConnection for MockConnection {
    fn driver_name(&self) -> &str {
        "mock"
    }

    async fn call_procedure(&self, procedure: &str, params: &ParamMap) -> Result<ResultSets> {
        self.db.calls.lock().push(RecordedCall {
            procedure: procedure.to_string(),
            params: params
                .iter()
                .map(|(name, value)| (name.to_string(), value.clone()))
                .collect(),
        });
        (self.db.responder)(procedure, params)
    }

    async fn ping(&self) -> Result<()> {
        if self.db.ping_fails.load(Ordering::SeqCst) {
            return Err(ProcgateError::Connection("ping refused".into()));
        }
        Ok(())
    }

    async fn close(&self) -> Result<()> {
        self.closed.store(true, Ordering::SeqCst);
        Ok(())
    }

    fn is_closed(&self) -> bool {
        self.closed.load(Ordering::SeqCst)
    }
}

/// Factory handing out connections to one mock database
pub struct MockFactory {
    db: Arc<MockDatabase>,
    created: AtomicUsize,
    unreachable: bool,
}

impl MockFactory {
    pub fn new(db: Arc<MockDatabase>) -> Self {
        Self {
            db,
            created: AtomicUsize::new(0),
            unreachable: false,
        }
    }

    /// Factory whose every connection attempt fails
    pub fn unreachable(db: Arc<MockDatabase>) -> Self {
        Self {
            unreachable: true,
            ..Self::new(db)
        }
    }

    pub fn created(&self) -> usize {
        self.created.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ConnectionFactory for MockFactory {
    async fn create(&self) -> Result<Arc<dyn ProcedureConnection>> {
        if self.unreachable {
            return Err(ProcgateError::Connection("connection refused".into()));
        }
        self.created.fetch_add(1, Ordering::SeqCst);
        Ok(Arc::new(MockConnection {
            db: self.db.clone(),
            closed: AtomicBool::new(false),
        }))
    }
}

pub const BANKING_PROCEDURES: [&str; 3] = ["sp_ConsultarBanco", "sp_CrearDeposito", "sp_ListarBancos"];

/// Service over a mock database with the banking allow-list
pub fn service_with(factory: Arc<MockFactory>) -> ProcedureService {
    let pool = ConnectionPool::new(PoolConfig::new(1, 4).with_acquire_timeout_ms(200), factory);
    let allow_list = AllowList::new(BANKING_PROCEDURES).expect("valid allow-list");
    ProcedureService::new(Arc::new(pool), Arc::new(allow_list))
}

/// Build a result set from column names and rows of values
pub fn result_set(columns: &[&str], rows: Vec<Vec<ProcValue>>) -> ResultSet {
    let mut set = ResultSet::new(columns.iter().map(|c| c.to_string()).collect());
    for row in rows {
        set.push_values(row);
    }
    set
}
