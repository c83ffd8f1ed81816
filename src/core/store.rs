//! In-memory order store
//!
//! This module provides the `InMemoryStore`, the authoritative dataset behind
//! every query. The dataset is held as one immutable [`Generation`]: the three
//! entity vectors plus the indexes built over them.
//!
//! # Atomic Replace
//!
//! `bulk_replace` builds and validates the new generation without holding
//! any lock, then swaps the shared pointer under a short write lock. Readers
//! clone the current pointer and work on that snapshot, so a reader sees
//! either the old generation or the new one, never a mix.
//!
//! # Indexes
//!
//! - user id → position in `users`
//! - order id → position in `orders`
//! - order id → positions of its lines in `order_products`

use crate::core::traits::OrderRepository;
use crate::types::{
    BuyDateRange, ImportResult, NormalizedBatch, Order, OrderDetails, OrderDetailsOrder,
    OrderDetailsProduct, OrderError, OrderId, OrderProduct, OrdersDetails, User, UserId,
};
use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::Arc;

/// One complete, internally consistent snapshot of the dataset
#[derive(Debug, Default)]
struct Generation {
    users: Vec<User>,
    orders: Vec<Order>,
    order_products: Vec<OrderProduct>,
    user_index: HashMap<UserId, usize>,
    order_index: HashMap<OrderId, usize>,
    products_by_order: HashMap<OrderId, Vec<usize>>,
}

impl Generation {
    /// Index a batch, rejecting anything a relational schema would refuse
    ///
    /// # Errors
    ///
    /// `OrderError::Persist` on a duplicate user or order id, an order whose
    /// user is missing, or a product line whose order is missing.
    fn build(batch: NormalizedBatch) -> Result<Self, OrderError> {
        let NormalizedBatch {
            users,
            orders,
            order_products,
        } = batch;

        let mut user_index = HashMap::with_capacity(users.len());
        for (position, user) in users.iter().enumerate() {
            if user_index.insert(user.id, position).is_some() {
                return Err(OrderError::persist(format!("duplicate user id {}", user.id)));
            }
        }

        let mut order_index = HashMap::with_capacity(orders.len());
        for (position, order) in orders.iter().enumerate() {
            if !user_index.contains_key(&order.user_id) {
                return Err(OrderError::persist(format!(
                    "order {} references unknown user {}",
                    order.id, order.user_id
                )));
            }
            if order_index.insert(order.id, position).is_some() {
                return Err(OrderError::persist(format!(
                    "duplicate order id {}",
                    order.id
                )));
            }
        }

        let mut products_by_order: HashMap<OrderId, Vec<usize>> =
            HashMap::with_capacity(orders.len());
        for (position, product) in order_products.iter().enumerate() {
            if !order_index.contains_key(&product.order_id) {
                return Err(OrderError::persist(format!(
                    "product line {} references unknown order {}",
                    position + 1,
                    product.order_id
                )));
            }
            products_by_order
                .entry(product.order_id)
                .or_default()
                .push(position);
        }

        Ok(Self {
            users,
            orders,
            order_products,
            user_index,
            order_index,
            products_by_order,
        })
    }

    fn order_details(&self, order: &Order) -> OrderDetailsOrder {
        let products = self
            .products_by_order
            .get(&order.id)
            .map(|positions| {
                positions
                    .iter()
                    .map(|&p| {
                        let product = &self.order_products[p];
                        OrderDetailsProduct {
                            product_id: product.product_id,
                            value: product.product_value,
                        }
                    })
                    .collect()
            })
            .unwrap_or_default();

        OrderDetailsOrder {
            order_id: order.id,
            date: order.buy_date,
            total: order.total,
            products,
        }
    }

    fn user_name(&self, user_id: UserId) -> String {
        self.user_index
            .get(&user_id)
            .map(|&p| self.users[p].name.clone())
            .unwrap_or_default()
    }

    /// Group orders by user, users in first-encountered order
    fn group<'a>(&'a self, orders: impl Iterator<Item = &'a Order>) -> OrdersDetails {
        let mut details: OrdersDetails = Vec::new();
        let mut positions: HashMap<UserId, usize> = HashMap::new();

        for order in orders {
            let entry = self.order_details(order);
            match positions.get(&order.user_id) {
                Some(&p) => details[p].orders.push(entry),
                None => {
                    positions.insert(order.user_id, details.len());
                    details.push(OrderDetails {
                        user_id: order.user_id,
                        name: self.user_name(order.user_id),
                        orders: vec![entry],
                    });
                }
            }
        }

        details
    }
}

/// In-memory store holding one active generation
#[derive(Debug, Default)]
pub struct InMemoryStore {
    current: RwLock<Arc<Generation>>,
}

impl InMemoryStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    fn snapshot(&self) -> Arc<Generation> {
        Arc::clone(&self.current.read())
    }

    /// Entity counts of the active generation
    pub fn counts(&self) -> ImportResult {
        let generation = self.snapshot();
        ImportResult {
            users: generation.users.len(),
            orders: generation.orders.len(),
            products: generation.order_products.len(),
        }
    }
}

impl OrderRepository for InMemoryStore {
    fn bulk_replace(&self, batch: NormalizedBatch) -> Result<(), OrderError> {
        let generation = Arc::new(Generation::build(batch)?);
        tracing::debug!(
            users = generation.users.len(),
            orders = generation.orders.len(),
            products = generation.order_products.len(),
            "installing new generation"
        );
        *self.current.write() = generation;
        Ok(())
    }

    fn get_details_by_order_id(&self, order_id: OrderId) -> Result<OrderDetails, OrderError> {
        let generation = self.snapshot();
        let position = *generation
            .order_index
            .get(&order_id)
            .ok_or_else(|| OrderError::order_not_found(order_id))?;

        generation
            .group(std::iter::once(&generation.orders[position]))
            .pop()
            .ok_or_else(|| OrderError::order_not_found(order_id))
    }

    fn list_details(&self) -> Result<OrdersDetails, OrderError> {
        let generation = self.snapshot();
        let details = generation.group(generation.orders.iter());
        if details.is_empty() {
            return Err(OrderError::orders_not_found());
        }
        Ok(details)
    }

    fn list_details_by_range_buy_date(
        &self,
        range: &BuyDateRange,
    ) -> Result<OrdersDetails, OrderError> {
        let generation = self.snapshot();
        let details = generation.group(
            generation
                .orders
                .iter()
                .filter(|order| range.contains(order.buy_date)),
        );
        if details.is_empty() {
            return Err(OrderError::orders_not_found());
        }
        Ok(details)
    }
}
