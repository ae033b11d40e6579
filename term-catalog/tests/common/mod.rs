//! Shared fixtures for integration tests.

#![allow(dead_code)]

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use arrow::array::{ArrayRef, Date32Array, Float64Array, Int64Array, StringArray};
use arrow::datatypes::{DataType, Field, Schema};
use arrow::record_batch::RecordBatch;
use async_trait::async_trait;
use datafusion::datasource::MemTable;
use datafusion::prelude::SessionContext;
use datafusion::sql::TableReference;
use term_catalog::error::{CatalogError, Result};
use term_catalog::sources::catalog_session;
use term_catalog::warehouse::QueryExecutor;

/// Rows in the `ORDERS` fixture.
pub const ORDERS_ROWS: usize = 1_500;

/// 2024-01-01 as days since the epoch.
pub const FIRST_ORDER_DAY: i32 = 19_723;

/// Distinct order dates in the `ORDERS` fixture.
pub const ORDER_DAYS: i32 = 30;

pub fn register(ctx: &SessionContext, name: &str, batch: RecordBatch) {
    let table = MemTable::try_new(batch.schema(), vec![vec![batch]]).unwrap();
    ctx.register_table(TableReference::bare(name), Arc::new(table))
        .unwrap();
}

/// `ORDERS`: a non-null surrogate key, a nullable foreign key, a date, a
/// three-valued status and an amount.
pub fn orders_batch() -> RecordBatch {
    let schema = Arc::new(Schema::new(vec![
        Field::new("ORDER_SK", DataType::Int64, false),
        Field::new("CUSTOMER_SK", DataType::Int64, true),
        Field::new("ORDER_DATE", DataType::Date32, true),
        Field::new("STATUS", DataType::Utf8, true),
        Field::new("ORDER_AMOUNT", DataType::Float64, true),
    ]));

    let statuses = ["OPEN", "SHIPPED", "CLOSED"];
    let order_sk: Vec<i64> = (1..=ORDERS_ROWS as i64).collect();
    let customer_sk: Vec<Option<i64>> = (0..ORDERS_ROWS)
        .map(|i| if i % 10 == 0 { None } else { Some((i % 200) as i64 + 1) })
        .collect();
    let order_date: Vec<i32> = (0..ORDERS_ROWS)
        .map(|i| FIRST_ORDER_DAY + (i as i32 % ORDER_DAYS))
        .collect();
    let status: Vec<&str> = (0..ORDERS_ROWS).map(|i| statuses[i % 3]).collect();
    let amount: Vec<f64> = (0..ORDERS_ROWS).map(|i| 10.0 + (i % 100) as f64).collect();

    let columns: Vec<ArrayRef> = vec![
        Arc::new(Int64Array::from(order_sk)),
        Arc::new(Int64Array::from(customer_sk)),
        Arc::new(Date32Array::from(order_date)),
        Arc::new(StringArray::from(status)),
        Arc::new(Float64Array::from(amount)),
    ];
    RecordBatch::try_new(schema, columns).unwrap()
}

/// A table `name` with a single text column `CODE` holding `distinct`
/// distinct values, each repeated three times.
pub fn codes_batch(distinct: usize) -> RecordBatch {
    let schema = Arc::new(Schema::new(vec![Field::new("CODE", DataType::Utf8, true)]));
    let values: Vec<String> = (0..distinct * 3)
        .map(|i| format!("V{:03}", i % distinct))
        .collect();
    RecordBatch::try_new(schema, vec![Arc::new(StringArray::from(values)) as ArrayRef]).unwrap()
}

/// A table with `rows` rows of `EVENT_SK` and `EVENT_COUNT`.
pub fn events_batch(rows: usize) -> RecordBatch {
    let schema = Arc::new(Schema::new(vec![
        Field::new("EVENT_SK", DataType::Int64, false),
        Field::new("EVENT_COUNT", DataType::Int64, true),
    ]));
    let columns: Vec<ArrayRef> = vec![
        Arc::new(Int64Array::from((0..rows as i64).collect::<Vec<_>>())),
        Arc::new(Int64Array::from(
            (0..rows as i64).map(|i| i % 7).collect::<Vec<_>>(),
        )),
    ];
    RecordBatch::try_new(schema, columns).unwrap()
}

/// Session with `ORDERS` registered and `information_schema` enabled.
pub fn orders_context() -> SessionContext {
    let ctx = catalog_session();
    register(&ctx, "ORDERS", orders_batch());
    ctx
}

/// Wraps a session, failing statements that mention `fail_on` and counting
/// `COUNT(*)` statements.
pub struct FaultyExecutor {
    inner: SessionContext,
    fail_on: Option<String>,
    row_counts: AtomicUsize,
}

impl FaultyExecutor {
    pub fn new(inner: SessionContext) -> Self {
        Self {
            inner,
            fail_on: None,
            row_counts: AtomicUsize::new(0),
        }
    }

    pub fn failing_on(mut self, fragment: impl Into<String>) -> Self {
        self.fail_on = Some(fragment.into());
        self
    }

    pub fn row_count_queries(&self) -> usize {
        self.row_counts.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl QueryExecutor for FaultyExecutor {
    async fn execute(&self, sql: &str) -> Result<Vec<RecordBatch>> {
        if sql.contains("COUNT(*)") {
            self.row_counts.fetch_add(1, Ordering::SeqCst);
        }
        if let Some(fragment) = &self.fail_on {
            if sql.contains(fragment.as_str()) {
                return Err(CatalogError::query_with_sql(
                    "simulated warehouse failure",
                    sql,
                ));
            }
        }
        self.inner.execute(sql).await
    }
}
