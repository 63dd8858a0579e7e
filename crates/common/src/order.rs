//! The bakery order.

use serde::Serialize;
use thiserror::Error;

use crate::{Destination, OrderId};

/// Errors raised when building an [`Order`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum OrderError {
    /// Amount must be at least one.
    #[error("Invalid amount: {amount} (must be greater than 0)")]
    InvalidAmount { amount: u64 },

    /// Product type is empty.
    #[error("Product type is required")]
    EmptyType,
}

/// A bakery order.
///
/// Orders are immutable once created: the router reads the product type to
/// classify them and fulfillment workers read them to bake.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Order {
    id: OrderId,
    #[serde(rename = "type")]
    product_type: String,
    amount: u32,
}

impl Order {
    /// Creates a validated order.
    pub fn new(
        id: impl Into<OrderId>,
        product_type: impl Into<String>,
        amount: u32,
    ) -> Result<Self, OrderError> {
        let product_type = product_type.into().trim().to_string();
        if product_type.is_empty() {
            return Err(OrderError::EmptyType);
        }
        if amount == 0 {
            return Err(OrderError::InvalidAmount {
                amount: u64::from(amount),
            });
        }
        Ok(Self {
            id: id.into(),
            product_type,
            amount,
        })
    }

    pub fn id(&self) -> OrderId {
        self.id
    }

    /// Returns the product type as submitted (trimmed).
    pub fn product_type(&self) -> &str {
        &self.product_type
    }

    pub fn amount(&self) -> u32 {
        self.amount
    }

    /// Returns the destination this order routes to.
    pub fn destination(&self) -> Destination {
        Destination::for_type(&self.product_type)
    }

    /// Renders the payload delivered on fulfillment channels.
    ///
    /// ```
    /// # use common::Order;
    /// let order = Order::new(9u64, "brownie", 1).unwrap();
    /// assert_eq!(
    ///     order.to_xml(),
    ///     "<order><type>brownie</type><id>9</id><amount>1</amount></order>"
    /// );
    /// ```
    pub fn to_xml(&self) -> String {
        format!(
            "<order><type>{}</type><id>{}</id><amount>{}</amount></order>",
            escape_xml(&self.product_type),
            self.id,
            self.amount
        )
    }
}

fn escape_xml(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&apos;"),
            _ => escaped.push(c),
        }
    }
    escaped
}
