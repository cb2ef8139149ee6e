//! SQLite-backed order store.

use std::path::{Path, PathBuf};

use parking_lot::Mutex;
use rusqlite::{params, Connection, OptionalExtension};
use tracing::{debug, info};

use crate::schema::SCHEMA_SQL;
use crate::types::{OrderStatus, OrderStore};
use helpdesk_core::{Error, Result};

/// Orders every fresh install can be tested against.
pub fn example_orders() -> Vec<OrderStatus> {
    vec![
        OrderStatus::new("12345", "shipped", "2 days", "Wireless Headphones"),
        OrderStatus::new("98765", "processing", "4-6 days", "Smartphone Case"),
    ]
}

pub struct SqliteOrderStore {
    conn: Mutex<Connection>,
    db_path: PathBuf,
}

impl SqliteOrderStore {
    /// Open or create the store. The file will be `db_dir/orders.db`.
    pub fn open(db_dir: impl AsRef<Path>) -> Result<Self> {
        let db_dir = db_dir.as_ref();
        std::fs::create_dir_all(db_dir)?;
        let db_path = db_dir.join("orders.db");

        let conn = Connection::open(&db_path).map_err(|e| Error::Database(e.to_string()))?;
        conn.execute_batch("PRAGMA journal_mode = WAL; PRAGMA synchronous = NORMAL;")
            .map_err(|e| Error::Database(e.to_string()))?;

        let store = Self::with_connection(conn, db_path)?;
        info!(
            "Order store initialized: {} orders, path={}",
            store.count_orders()?,
            store.db_path.display()
        );
        Ok(store)
    }

    /// Open a private in-memory store.
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory().map_err(|e| Error::Database(e.to_string()))?;
        Self::with_connection(conn, PathBuf::from(":memory:"))
    }

    fn with_connection(conn: Connection, db_path: PathBuf) -> Result<Self> {
        conn.execute_batch(SCHEMA_SQL)
            .map_err(|e| Error::Database(format!("Schema init failed: {}", e)))?;
        Ok(Self {
            conn: Mutex::new(conn),
            db_path,
        })
    }

    pub fn db_path(&self) -> &Path {
        &self.db_path
    }

    /// Insert or replace an order.
    pub fn upsert_order(&self, order: &OrderStatus) -> Result<()> {
        let conn = self.conn.lock();
        conn.prepare_cached(
            "INSERT INTO orders (order_id, status, eta, items) VALUES (?1, ?2, ?3, ?4)
             ON CONFLICT(order_id) DO UPDATE SET
                status = excluded.status, eta = excluded.eta, items = excluded.items",
        )
        .map_err(|e| Error::Database(e.to_string()))?
        .execute(params![order.order_id, order.status, order.eta, order.items])
        .map_err(|e| Error::Database(e.to_string()))?;
        Ok(())
    }

    /// Insert the example orders, leaving existing rows untouched. Returns rows inserted.
    pub fn seed_example_orders(&self) -> Result<usize> {
        let conn = self.conn.lock();
        let mut stmt = conn
            .prepare_cached(
                "INSERT OR IGNORE INTO orders (order_id, status, eta, items) VALUES (?1, ?2, ?3, ?4)",
            )
            .map_err(|e| Error::Database(e.to_string()))?;

        let mut inserted = 0;
        for o in example_orders() {
            inserted += stmt
                .execute(params![o.order_id, o.status, o.eta, o.items])
                .map_err(|e| Error::Database(e.to_string()))?;
        }
        debug!("Seeded {} example orders", inserted);
        Ok(inserted)
    }

    pub fn count_orders(&self) -> Result<i64> {
        let conn = self.conn.lock();
        let count = conn
            .query_row("SELECT COUNT(*) FROM orders", [], |row| row.get(0))
            .map_err(|e| Error::Database(e.to_string()))?;
        Ok(count)
    }
}

impl OrderStore for SqliteOrderStore {
    fn get(&self, order_id: &str) -> Result<Option<OrderStatus>> {
        let conn = self.conn.lock();
        let row = conn
            .prepare_cached("SELECT order_id, status, eta, items FROM orders WHERE order_id = ?1")
            .map_err(|e| Error::Database(e.to_string()))?
            .query_row(params![order_id], |row| {
                Ok(OrderStatus {
                    order_id: row.get(0)?,
                    status: row.get(1)?,
                    eta: row.get(2)?,
                    items: row.get(3)?,
                })
            })
            .optional()
            .map_err(|e| Error::Database(e.to_string()))?;
        Ok(row)
    }
}
