//! Identity-based lookup and the single canonical order record.
//!
//! The design notes single this out as the fix for the reference
//! implementation's worst latent bug: storing an order by value in both a
//! ladder queue and a lookup map means a fill applied through one handle
//! is invisible through the other. Here the registry is the *only* place
//! an [`Order`]'s fields live; the ladders index it by [`OrderId`].

use std::collections::HashMap;

use crate::order::{Order, OrderId};

#[derive(Default)]
pub struct OrderRegistry {
    orders: HashMap<OrderId, Order>,
}

impl OrderRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contains(&self, id: OrderId) -> bool {
        self.orders.contains_key(&id)
    }

    pub fn get(&self, id: OrderId) -> Option<&Order> {
        self.orders.get(&id)
    }

    pub fn get_mut(&mut self, id: OrderId) -> Option<&mut Order> {
        self.orders.get_mut(&id)
    }

    pub fn insert(&mut self, order: Order) {
        self.orders.insert(order.id, order);
    }

    pub fn remove(&mut self, id: OrderId) -> Option<Order> {
        self.orders.remove(&id)
    }

    pub fn len(&self) -> usize {
        self.orders.len()
    }

    pub fn is_empty(&self) -> bool {
        self.orders.is_empty()
    }
}
