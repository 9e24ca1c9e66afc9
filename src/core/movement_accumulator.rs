//! Per-client movement grouping
//!
//! A [`MovementAccumulator`] belongs to exactly one client and groups that
//! client's line-items by movement identifier, keeping movements in the order
//! their identifier was first seen.
//!
//! The order date of a movement is the maximum document date over all of its
//! lines, not the date of the first line. Unparseable dates (`None`) never
//! win against a valid date, and ties keep the existing value.

use crate::types::{Detail, Movement, MovementId};
use chrono::NaiveDateTime;
use std::collections::HashMap;

/// In-progress movement
#[derive(Debug, Clone)]
pub struct MovementBuilder {
    id: MovementId,
    discount_category: Option<String>,
    details: Vec<Detail>,
    order_date: Option<NaiveDateTime>,
}

impl MovementBuilder {
    fn new(id: MovementId) -> Self {
        MovementBuilder {
            id,
            discount_category: None,
            details: Vec::new(),
            order_date: None,
        }
    }

    /// Append a line and fold its date and discount category in
    fn record(
        &mut self,
        detail: Detail,
        document_date: Option<NaiveDateTime>,
        discount_category: Option<&str>,
    ) {
        self.details.push(detail);

        if document_date > self.order_date {
            self.order_date = document_date;
        }

        if self.discount_category.is_none() {
            self.discount_category = discount_category
                .filter(|category| !category.trim().is_empty())
                .map(str::to_string);
        }
    }

    /// Current order date (latest seen so far)
    pub fn order_date(&self) -> Option<NaiveDateTime> {
        self.order_date
    }

    /// Project into the output shape
    pub fn into_movement(self) -> Movement {
        Movement {
            id: self.id,
            discount_category: self.discount_category.unwrap_or_default(),
            details: self.details,
            unpaid_amount: String::new(),
            payment_due_date: String::new(),
            order_date: self.order_date,
        }
    }
}

/// Movements of a single client, keyed by movement identifier
#[derive(Debug, Clone, Default)]
pub struct MovementAccumulator {
    /// Movement identifier to position in `movements`
    index: HashMap<MovementId, usize>,
    /// Movements in first-seen order
    movements: Vec<MovementBuilder>,
}

impl MovementAccumulator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add one line to its movement, creating the movement on first sight
    ///
    /// # Returns
    ///
    /// `true` if this call created the movement, so the owning client can
    /// count each distinct movement exactly once.
    pub fn accumulate(
        &mut self,
        movement_id: &str,
        detail: Detail,
        document_date: Option<NaiveDateTime>,
        discount_category: Option<&str>,
    ) -> bool {
        let (position, created) = match self.index.get(movement_id) {
            Some(&position) => (position, false),
            None => {
                let position = self.movements.len();
                self.index.insert(movement_id.to_string(), position);
                self.movements
                    .push(MovementBuilder::new(movement_id.to_string()));
                (position, true)
            }
        };

        self.movements[position].record(detail, document_date, discount_category);
        created
    }

    /// Look up an in-progress movement
    pub fn get(&self, movement_id: &str) -> Option<&MovementBuilder> {
        self.index
            .get(movement_id)
            .map(|&position| &self.movements[position])
    }

    /// Number of distinct movements
    pub fn len(&self) -> usize {
        self.movements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.movements.is_empty()
    }

    /// Finalize every movement, preserving first-seen order
    pub fn into_movements(self) -> Vec<Movement> {
        self.movements
            .into_iter()
            .map(MovementBuilder::into_movement)
            .collect()
    }
}
