//! redb-based storage layer for slots, orders and their event streams
//!
//! # Tables
//!
//! | Table | Key | Value | Purpose |
//! |-------|-----|-------|---------|
//! | `slots` | `slot_id` | `TimeSlot` | Provider time slots |
//! | `provider_slots` | `(provider_id, date, slot_id)` | `()` | Schedule index |
//! | `orders` | `order_id` | `Order` | Current order state |
//! | `events` | `(order_id, sequence)` | `OrderEvent` | Event stream (append-only) |
//! | `due_orders` | `order_id` | `i64` | Resolver index (non-terminal orders only) |
//! | `client_orders` | `(client_id, order_id)` | `()` | Orders by client |
//! | `provider_orders` | `(provider_id, order_id)` | `()` | Orders by provider |
//! | `services` | `service_id` | `ServiceInfo` | Catalog |
//! | `designs` | `design_id` | `DesignInfo` | Catalog |
//!
//! # Concurrency
//!
//! redb admits a single write transaction at a time. Every read-check-write
//! on a slot or order happens inside one write transaction, which makes slot
//! claims linearizable and order transitions serialized.

use redb::{
    Database, ReadableDatabase, ReadableTable, ReadableTableMetadata, TableDefinition,
    WriteTransaction,
};
use shared::models::{DesignInfo, ServiceInfo};
use shared::order::{Order, OrderEvent};
use shared::schedule::TimeSlot;
use std::path::Path;
use std::sync::Arc;
use thiserror::Error;

/// Table for slots: key = slot_id, value = JSON-serialized TimeSlot
const SLOTS_TABLE: TableDefinition<&str, &[u8]> = TableDefinition::new("slots");

/// Schedule index: key = (provider_id, "YYYY-MM-DD", slot_id)
const PROVIDER_SLOTS_TABLE: TableDefinition<(&str, &str, &str), ()> =
    TableDefinition::new("provider_slots");

/// Table for orders: key = order_id, value = JSON-serialized Order
const ORDERS_TABLE: TableDefinition<&str, &[u8]> = TableDefinition::new("orders");

/// Table for storing events: key = (order_id, sequence), value = JSON-serialized OrderEvent
const EVENTS_TABLE: TableDefinition<(&str, u64), &[u8]> = TableDefinition::new("events");

/// Resolver index: key = order_id, value = instant the order becomes due
const DUE_ORDERS_TABLE: TableDefinition<&str, i64> = TableDefinition::new("due_orders");

const CLIENT_ORDERS_TABLE: TableDefinition<(&str, &str), ()> =
    TableDefinition::new("client_orders");

const PROVIDER_ORDERS_TABLE: TableDefinition<(&str, &str), ()> =
    TableDefinition::new("provider_orders");

const SERVICES_TABLE: TableDefinition<&str, &[u8]> = TableDefinition::new("services");

const DESIGNS_TABLE: TableDefinition<&str, &[u8]> = TableDefinition::new("designs");

/// Sorts after every id the server issues
const KEY_MAX: &str = "\u{10FFFF}";

/// Storage errors
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Database error: {0}")]
    Database(#[from] redb::DatabaseError),

    #[error("Transaction error: {0}")]
    Transaction(#[from] redb::TransactionError),

    #[error("Table error: {0}")]
    Table(#[from] redb::TableError),

    #[error("Storage error: {0}")]
    Storage(#[from] redb::StorageError),

    #[error("Commit error: {0}")]
    Commit(#[from] redb::CommitError),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

pub type StorageResult<T> = Result<T, StorageError>;

/// Booking storage backed by redb
#[derive(Clone)]
pub struct BookingStorage {
    db: Arc<Database>,
}

impl BookingStorage {
    /// Open or create the database at the given path
    ///
    /// Commits are durable as soon as `commit()` returns (redb default
    /// `Durability::Immediate`), so a restarted process sees every
    /// acknowledged claim and transition.
    pub fn open(path: impl AsRef<Path>) -> StorageResult<Self> {
        let db = Database::create(path)?;
        Self::init(db)
    }

    /// Open an in-memory database (tests, ephemeral runs)
    pub fn open_in_memory() -> StorageResult<Self> {
        let db = Database::builder().create_with_backend(redb::backends::InMemoryBackend::new())?;
        Self::init(db)
    }

    fn init(db: Database) -> StorageResult<Self> {
        let write_txn = db.begin_write()?;
        {
            // Create all tables if they don't exist
            let _ = write_txn.open_table(SLOTS_TABLE)?;
            let _ = write_txn.open_table(PROVIDER_SLOTS_TABLE)?;
            let _ = write_txn.open_table(ORDERS_TABLE)?;
            let _ = write_txn.open_table(EVENTS_TABLE)?;
            let _ = write_txn.open_table(DUE_ORDERS_TABLE)?;
            let _ = write_txn.open_table(CLIENT_ORDERS_TABLE)?;
            let _ = write_txn.open_table(PROVIDER_ORDERS_TABLE)?;
            let _ = write_txn.open_table(SERVICES_TABLE)?;
            let _ = write_txn.open_table(DESIGNS_TABLE)?;
        }
        write_txn.commit()?;

        Ok(Self { db: Arc::new(db) })
    }

    /// Begin a write transaction
    pub fn begin_write(&self) -> StorageResult<WriteTransaction> {
        Ok(self.db.begin_write()?)
    }

    // ========== Slot Operations ==========

    /// Insert or overwrite a slot and its schedule index entry
    pub fn put_slot(&self, txn: &WriteTransaction, slot: &TimeSlot) -> StorageResult<()> {
        let value = serde_json::to_vec(slot)?;
        {
            let mut table = txn.open_table(SLOTS_TABLE)?;
            table.insert(slot.id.as_str(), value.as_slice())?;
        }
        let date = slot.date.to_string();
        let mut index = txn.open_table(PROVIDER_SLOTS_TABLE)?;
        index.insert((slot.provider_id.as_str(), date.as_str(), slot.id.as_str()), ())?;
        Ok(())
    }

    /// Delete a slot and its index entry
    pub fn delete_slot(&self, txn: &WriteTransaction, slot: &TimeSlot) -> StorageResult<()> {
        {
            let mut table = txn.open_table(SLOTS_TABLE)?;
            table.remove(slot.id.as_str())?;
        }
        let date = slot.date.to_string();
        let mut index = txn.open_table(PROVIDER_SLOTS_TABLE)?;
        index.remove((slot.provider_id.as_str(), date.as_str(), slot.id.as_str()))?;
        Ok(())
    }

    /// Get a slot (within transaction)
    pub fn get_slot_txn(
        &self,
        txn: &WriteTransaction,
        slot_id: &str,
    ) -> StorageResult<Option<TimeSlot>> {
        let table = txn.open_table(SLOTS_TABLE)?;
        match table.get(slot_id)? {
            Some(value) => Ok(Some(serde_json::from_slice(value.value())?)),
            None => Ok(None),
        }
    }

    /// Get a slot by ID
    pub fn get_slot(&self, slot_id: &str) -> StorageResult<Option<TimeSlot>> {
        let read_txn = self.db.begin_read()?;
        let table = read_txn.open_table(SLOTS_TABLE)?;
        match table.get(slot_id)? {
            Some(value) => Ok(Some(serde_json::from_slice(value.value())?)),
            None => Ok(None),
        }
    }

    /// All slots of a provider on one day (within transaction)
    pub fn get_day_slots_txn(
        &self,
        txn: &WriteTransaction,
        provider_id: &str,
        date: &str,
    ) -> StorageResult<Vec<TimeSlot>> {
        let ids: Vec<String> = {
            let index = txn.open_table(PROVIDER_SLOTS_TABLE)?;
            let mut ids = Vec::new();
            for result in index.range((provider_id, date, "")..=(provider_id, date, KEY_MAX))? {
                let (key, _value) = result?;
                ids.push(key.value().2.to_string());
            }
            ids
        };

        let table = txn.open_table(SLOTS_TABLE)?;
        let mut slots = Vec::with_capacity(ids.len());
        for id in ids {
            if let Some(value) = table.get(id.as_str())? {
                slots.push(serde_json::from_slice(value.value())?);
            }
        }
        Ok(slots)
    }

    /// Slots of a provider between two dates (inclusive, `YYYY-MM-DD`), sorted by start
    pub fn list_provider_slots(
        &self,
        provider_id: &str,
        from: &str,
        to: &str,
    ) -> StorageResult<Vec<TimeSlot>> {
        let read_txn = self.db.begin_read()?;
        let index = read_txn.open_table(PROVIDER_SLOTS_TABLE)?;
        let table = read_txn.open_table(SLOTS_TABLE)?;

        let mut slots: Vec<TimeSlot> = Vec::new();
        for result in index.range((provider_id, from, "")..=(provider_id, to, KEY_MAX))? {
            let (key, _value) = result?;
            let (_, _, slot_id) = key.value();
            if let Some(value) = table.get(slot_id)? {
                slots.push(serde_json::from_slice(value.value())?);
            }
        }

        slots.sort_by_key(|s| s.starts_at);
        Ok(slots)
    }

    // ========== Order Operations ==========

    /// Store an order and keep the party and resolver indexes in sync
    ///
    /// `due_at` is `None` once the order no longer needs the resolver.
    pub fn put_order(
        &self,
        txn: &WriteTransaction,
        order: &Order,
        due_at: Option<i64>,
    ) -> StorageResult<()> {
        let value = serde_json::to_vec(order)?;
        {
            let mut table = txn.open_table(ORDERS_TABLE)?;
            table.insert(order.id.as_str(), value.as_slice())?;
        }
        {
            let mut due = txn.open_table(DUE_ORDERS_TABLE)?;
            match due_at {
                Some(at) => {
                    due.insert(order.id.as_str(), at)?;
                }
                None => {
                    due.remove(order.id.as_str())?;
                }
            }
        }
        {
            let mut by_client = txn.open_table(CLIENT_ORDERS_TABLE)?;
            by_client.insert((order.client_id.as_str(), order.id.as_str()), ())?;
        }
        let mut by_provider = txn.open_table(PROVIDER_ORDERS_TABLE)?;
        by_provider.insert((order.provider_id.as_str(), order.id.as_str()), ())?;
        Ok(())
    }

    /// Get an order (within transaction)
    pub fn get_order_txn(
        &self,
        txn: &WriteTransaction,
        order_id: &str,
    ) -> StorageResult<Option<Order>> {
        let table = txn.open_table(ORDERS_TABLE)?;
        match table.get(order_id)? {
            Some(value) => Ok(Some(serde_json::from_slice(value.value())?)),
            None => Ok(None),
        }
    }

    /// Get an order by ID
    pub fn get_order(&self, order_id: &str) -> StorageResult<Option<Order>> {
        let read_txn = self.db.begin_read()?;
        let table = read_txn.open_table(ORDERS_TABLE)?;
        match table.get(order_id)? {
            Some(value) => Ok(Some(serde_json::from_slice(value.value())?)),
            None => Ok(None),
        }
    }

    /// Orders where `actor_id` is the client or the provider, newest first
    pub fn list_orders_for_party(&self, actor_id: &str) -> StorageResult<Vec<Order>> {
        let read_txn = self.db.begin_read()?;
        let orders = read_txn.open_table(ORDERS_TABLE)?;

        let mut ids: Vec<String> = Vec::new();
        for def in [CLIENT_ORDERS_TABLE, PROVIDER_ORDERS_TABLE] {
            let index = read_txn.open_table(def)?;
            for result in index.range((actor_id, "")..=(actor_id, KEY_MAX))? {
                let (key, _value) = result?;
                ids.push(key.value().1.to_string());
            }
        }
        ids.sort();
        ids.dedup();

        let mut result = Vec::with_capacity(ids.len());
        for id in ids {
            if let Some(value) = orders.get(id.as_str())? {
                result.push(serde_json::from_slice::<Order>(value.value())?);
            }
        }
        result.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(result)
    }

    // ========== Resolver Index ==========

    /// Order ids whose due instant is at or before `now`, earliest first
    pub fn get_due_orders(&self, now: i64) -> StorageResult<Vec<(String, i64)>> {
        let read_txn = self.db.begin_read()?;
        let table = read_txn.open_table(DUE_ORDERS_TABLE)?;

        let mut due = Vec::new();
        for result in table.iter()? {
            let (key, value) = result?;
            let at = value.value();
            if at <= now {
                due.push((key.value().to_string(), at));
            }
        }
        due.sort_by_key(|(_, at)| *at);
        Ok(due)
    }

    /// Number of orders the resolver is tracking
    pub fn due_order_count(&self) -> StorageResult<u64> {
        let read_txn = self.db.begin_read()?;
        let table = read_txn.open_table(DUE_ORDERS_TABLE)?;
        Ok(table.len()?)
    }

    /// Drop an entry from the resolver index (within transaction)
    pub fn clear_due(&self, txn: &WriteTransaction, order_id: &str) -> StorageResult<()> {
        let mut table = txn.open_table(DUE_ORDERS_TABLE)?;
        table.remove(order_id)?;
        Ok(())
    }

    // ========== Event Operations ==========

    /// Store an event
    pub fn store_event(&self, txn: &WriteTransaction, event: &OrderEvent) -> StorageResult<()> {
        let mut table = txn.open_table(EVENTS_TABLE)?;
        let key = (event.order_id.as_str(), event.sequence);
        let value = serde_json::to_vec(event)?;
        table.insert(key, value.as_slice())?;
        Ok(())
    }

    /// Get all events for an order
    pub fn get_events_for_order(&self, order_id: &str) -> StorageResult<Vec<OrderEvent>> {
        let read_txn = self.db.begin_read()?;
        let table = read_txn.open_table(EVENTS_TABLE)?;

        let mut events = Vec::new();
        for result in table.range((order_id, 0u64)..=(order_id, u64::MAX))? {
            let (_key, value) = result?;
            let event: OrderEvent = serde_json::from_slice(value.value())?;
            events.push(event);
        }

        events.sort_by_key(|e| e.sequence);
        Ok(events)
    }

    // ========== Catalog Operations ==========

    pub fn put_service(&self, service: &ServiceInfo) -> StorageResult<()> {
        let txn = self.db.begin_write()?;
        {
            let mut table = txn.open_table(SERVICES_TABLE)?;
            let value = serde_json::to_vec(service)?;
            table.insert(service.id.as_str(), value.as_slice())?;
        }
        txn.commit()?;
        Ok(())
    }

    pub fn get_service(&self, service_id: &str) -> StorageResult<Option<ServiceInfo>> {
        let read_txn = self.db.begin_read()?;
        let table = read_txn.open_table(SERVICES_TABLE)?;
        match table.get(service_id)? {
            Some(value) => Ok(Some(serde_json::from_slice(value.value())?)),
            None => Ok(None),
        }
    }

    pub fn get_all_services(&self) -> StorageResult<Vec<ServiceInfo>> {
        let read_txn = self.db.begin_read()?;
        let table = read_txn.open_table(SERVICES_TABLE)?;
        let mut services = Vec::new();
        for result in table.iter()? {
            let (_key, value) = result?;
            services.push(serde_json::from_slice(value.value())?);
        }
        Ok(services)
    }

    pub fn put_design(&self, design: &DesignInfo) -> StorageResult<()> {
        let txn = self.db.begin_write()?;
        {
            let mut table = txn.open_table(DESIGNS_TABLE)?;
            let value = serde_json::to_vec(design)?;
            table.insert(design.id.as_str(), value.as_slice())?;
        }
        txn.commit()?;
        Ok(())
    }

    pub fn get_design(&self, design_id: &str) -> StorageResult<Option<DesignInfo>> {
        let read_txn = self.db.begin_read()?;
        let table = read_txn.open_table(DESIGNS_TABLE)?;
        match table.get(design_id)? {
            Some(value) => Ok(Some(serde_json::from_slice(value.value())?)),
            None => Ok(None),
        }
    }

    pub fn get_all_designs(&self) -> StorageResult<Vec<DesignInfo>> {
        let read_txn = self.db.begin_read()?;
        let table = read_txn.open_table(DESIGNS_TABLE)?;
        let mut designs = Vec::new();
        for result in table.iter()? {
            let (_key, value) = result?;
            designs.push(serde_json::from_slice(value.value())?);
        }
        Ok(designs)
    }

    // ========== Statistics ==========

    pub fn get_stats(&self) -> StorageResult<StorageStats> {
        let read_txn = self.db.begin_read()?;
        Ok(StorageStats {
            slot_count: read_txn.open_table(SLOTS_TABLE)?.len()?,
            order_count: read_txn.open_table(ORDERS_TABLE)?.len()?,
            event_count: read_txn.open_table(EVENTS_TABLE)?.len()?,
            due_order_count: read_txn.open_table(DUE_ORDERS_TABLE)?.len()?,
        })
    }
}

/// Storage statistics
#[derive(Debug, Clone, serde::Serialize)]
pub struct StorageStats {
    pub slot_count: u64,
    pub order_count: u64,
    pub event_count: u64,
    pub due_order_count: u64,
}
