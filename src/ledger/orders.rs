use super::shards::MonthShards;
use crate::collection::{Decoded, ShardedCollection};
use crate::core::{Month, Result, StoreError};
use crate::keys;
use crate::model::Order;
use crate::storage::SharedStore;
use chrono::Local;
use log::warn;
use serde_json::Value;

/// Orders of the active year, sharded by month name.
pub struct OrderBook {
    orders: ShardedCollection<Order, MonthShards>,
}

impl OrderBook {
    pub fn new(store: SharedStore) -> Self {
        Self {
            orders: ShardedCollection::new(store, keys::ORDERS, MonthShards),
        }
    }

    pub fn collection(&self) -> &ShardedCollection<Order, MonthShards> {
        &self.orders
    }

    /// Writes an empty array to each of the twelve month shards not yet present.
    pub fn initialize(&self) -> Result<usize> {
        self.orders.initialize_shards()
    }

    /// Adds an order to the shard of its event month (or its explicit month).
    /// Ids are unique across all twelve shards.
    pub fn add(&self, mut order: Order) -> Result<Order> {
        let month = order.effective_month().ok_or_else(|| {
            StoreError::InvalidShard("order needs a month or a YYYY-MM-DD eventDate".into())
        })?;
        if !order.id.is_empty() {
            if let Some(existing) = self.find_month_of(&order.id)? {
                return Err(StoreError::DuplicateId {
                    collection: self.orders.name().to_string(),
                    shard: existing.name().to_string(),
                    id: order.id,
                });
            }
        }
        order.month = Some(month);
        if order.created_at.is_none() {
            order.created_at = Some(Local::now().to_rfc3339());
        }
        self.orders.append_to(order, month.name())
    }

    pub fn get(&self, id: &str, month: Month) -> Result<Option<Order>> {
        self.orders.get(id, month.name())
    }

    /// Searches every month shard.
    pub fn find(&self, id: &str) -> Result<Option<Order>> {
        for month in Month::ALL {
            if let Some(order) = self.get(id, month)? {
                return Ok(Some(order));
            }
        }
        Ok(None)
    }

    fn find_month_of(&self, id: &str) -> Result<Option<Month>> {
        for month in Month::ALL {
            if self.get(id, month)?.is_some() {
                return Ok(Some(month));
            }
        }
        Ok(None)
    }

    /// Merges `patch` into the order. The order stays in `month` even if
    /// the patch moves its event date elsewhere; use [`Self::move_to_month`]
    /// to relocate it.
    pub fn update(&self, id: &str, month: Month, patch: &Value) -> Result<Option<Order>> {
        let mut patch = patch.clone();
        if let Value::Object(fields) = &mut patch {
            fields.remove("month");
            if let Some(new_month) = fields
                .get("eventDate")
                .and_then(Value::as_str)
                .and_then(Month::of_date_str)
            {
                if new_month != month {
                    warn!(
                        "order '{}' eventDate moved to {} but stays in shard {}",
                        id, new_month, month
                    );
                }
            }
        }
        self.orders.replace(id, &patch, month.name())
    }

    pub fn delete(&self, id: &str, month: Month) -> Result<bool> {
        self.orders.remove(id, month.name())
    }

    /// Delete-then-insert into another month shard. If the insert fails the
    /// order is put back where it was.
    pub fn move_to_month(&self, id: &str, from: Month, to: Month) -> Result<Option<Order>> {
        let Some(order) = self.get(id, from)? else {
            return Ok(None);
        };
        if from == to {
            return Ok(Some(order));
        }

        self.orders.remove(id, from.name())?;
        let mut moved = order.clone();
        moved.month = Some(to);
        match self.orders.append_to(moved, to.name()) {
            Ok(moved) => Ok(Some(moved)),
            Err(err) => {
                if let Err(restore) = self.orders.append_to(order, from.name()) {
                    warn!("failed to restore order '{}' into {}: {}", id, from, restore);
                }
                Err(err)
            }
        }
    }

    pub fn list_month(&self, month: Month) -> Result<Vec<Order>> {
        self.orders.list_shard(month.name())
    }

    /// All twelve month shards, January first.
    pub fn list_all(&self) -> Result<Vec<Order>> {
        self.orders.list_universe()
    }

    /// Non-empty month shards with their orders, including the elements
    /// that could not be decoded.
    pub fn by_month(&self) -> Result<Vec<(Month, Decoded<Order>)>> {
        let mut out = Vec::new();
        for month in Month::ALL {
            let decoded = self.orders.list_shard_checked(month.name())?;
            if !decoded.is_empty() {
                out.push((month, decoded));
            }
        }
        Ok(out)
    }
}
