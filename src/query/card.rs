//! Search cards - AND-groups of rows

use tracing::warn;

use crate::catalog::{Catalog, SearchModel};
use crate::error::{QueryError, Result};

use super::row::{Row, SavedCard};

/// An ordered list of rows that must all match.
///
/// Row indices come from `next_row_index` and are never handed out twice,
/// so removed rows leave gaps instead of being renumbered.
#[derive(Debug, Clone)]
pub struct Card {
    pub index: u32,
    pub name: String,
    pub model: SearchModel,
    pub rows: Vec<Row>,
    next_row_index: u32,
}

impl PartialEq for Card {
    fn eq(&self, other: &Self) -> bool {
        self.index == other.index && self.model == other.model && self.rows == other.rows
    }
}

impl Eq for Card {}

impl Card {
    /// A card with one default row, or the rows of `data` when given.
    ///
    /// Saved rows keep their original indices; rows saved without one are
    /// numbered after the highest index seen so far, as are rows whose saved
    /// index is taken or has no successor.
    pub fn create(
        index: u32,
        name: &str,
        model: SearchModel,
        data: Option<&SavedCard>,
        catalog: &Catalog,
    ) -> Self {
        let mut card = Card {
            index,
            name: name.to_string(),
            model,
            rows: Vec::new(),
            next_row_index: 0,
        };

        for saved in data.map(|d| d.rows.as_slice()).unwrap_or_default() {
            let row_index = match saved.row_id {
                Some(id) if id < u32::MAX && card.row(id).is_none() => id,
                _ => card.next_row_index,
            };
            if let Err(e) = card.insert_row(Row::create(index, row_index, Some(saved), catalog)) {
                warn!(card = index, error = %e, "skipping row during rehydration");
            }
        }

        if card.rows.is_empty() {
            card.rows.push(Row::new(index, 0, catalog));
            card.next_row_index = 1;
        }

        card
    }

    /// Assemble a card from already-built rows, as the decoder does
    pub(crate) fn from_rows(index: u32, model: SearchModel, rows: Vec<Row>) -> Result<Self> {
        let mut card = Card {
            index,
            name: default_card_name(index),
            model,
            rows: Vec::with_capacity(rows.len()),
            next_row_index: 0,
        };
        for row in rows {
            card.insert_row(row)?;
        }
        Ok(card)
    }

    fn insert_row(&mut self, row: Row) -> Result<()> {
        let next = row
            .row_index
            .checked_add(1)
            .ok_or(QueryError::IndexOutOfRange(row.row_index))?;
        self.next_row_index = self.next_row_index.max(next);
        let pos = self
            .rows
            .iter()
            .position(|r| r.row_index > row.row_index)
            .unwrap_or(self.rows.len());
        self.rows.insert(pos, row);
        Ok(())
    }

    /// Append a default row under the next unused index
    pub fn add_row(&mut self, catalog: &Catalog) -> Result<&mut Row> {
        let row_index = self.next_row_index;
        self.next_row_index = row_index
            .checked_add(1)
            .ok_or(QueryError::IndexOutOfRange(row_index))?;
        self.rows.push(Row::new(self.index, row_index, catalog));
        let last = self.rows.len() - 1;
        Ok(&mut self.rows[last])
    }

    /// Remove a row. The last remaining row cannot be removed.
    pub fn remove_row(&mut self, row_index: u32) -> Result<Row> {
        let pos = self
            .rows
            .iter()
            .position(|r| r.row_index == row_index)
            .ok_or(QueryError::RowNotFound {
                card: self.index,
                row: row_index,
            })?;

        if self.rows.len() == 1 {
            return Err(QueryError::LastRow(self.index));
        }

        Ok(self.rows.remove(pos))
    }

    pub fn row(&self, row_index: u32) -> Option<&Row> {
        self.rows.iter().find(|r| r.row_index == row_index)
    }

    pub fn row_mut(&mut self, row_index: u32) -> Option<&mut Row> {
        self.rows.iter_mut().find(|r| r.row_index == row_index)
    }

    /// Index the next added row will get
    pub fn next_row_index(&self) -> u32 {
        self.next_row_index
    }

    /// DOM id of the card container
    pub fn dom_id(&self) -> String {
        format!("qcard_c{}", self.index)
    }

    pub fn to_saved(&self) -> SavedCard {
        SavedCard {
            card_id: self.index,
            rows: self.rows.iter().map(Row::to_saved).collect(),
        }
    }
}

pub(crate) fn default_card_name(index: u32) -> String {
    format!("Card {}", index)
}
