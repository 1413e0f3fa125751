//! The full search: cards over one model, ANDed together

use tracing::{debug, warn};

use crate::catalog::{Catalog, SearchModel};
use crate::error::{QueryError, Result};

use super::card::{default_card_name, Card};
use super::row::{Row, SavedCard};

/// Index of the first card appended to an empty search
pub const FIRST_CARD_INDEX: u32 = 1;

/// Every card of one submission, in index order.
///
/// Semantics: AND across cards, AND across a card's rows, OR across a row's
/// fields, with `negate` applied to the row after its OR.
#[derive(Debug, Clone)]
pub struct SearchExpression {
    pub model: SearchModel,
    pub cards: Vec<Card>,
    next_card_index: u32,
}

impl PartialEq for SearchExpression {
    fn eq(&self, other: &Self) -> bool {
        self.model == other.model && self.cards == other.cards
    }
}

impl Eq for SearchExpression {}

impl SearchExpression {
    /// An expression with no cards yet; the first appended card is card 1
    pub fn empty(model: SearchModel) -> Self {
        SearchExpression {
            model,
            cards: Vec::new(),
            next_card_index: FIRST_CARD_INDEX,
        }
    }

    /// The state a fresh search page starts in: one card with one blank row
    pub fn new(catalog: &Catalog) -> Self {
        let mut expr = SearchExpression::empty(catalog.model());
        expr.reset_cards(None, catalog);
        expr
    }

    /// Rebuild from cards a page embedded for a previous search
    pub fn rehydrate(saved: &[SavedCard], catalog: &Catalog) -> Self {
        let mut expr = SearchExpression::empty(catalog.model());
        expr.reset_cards(Some(saved), catalog);
        expr
    }

    pub(crate) fn from_cards(model: SearchModel, cards: Vec<Card>) -> Result<Self> {
        let mut expr = SearchExpression::empty(model);
        for card in cards {
            expr.insert_card(card)?;
        }
        Ok(expr)
    }

    fn insert_card(&mut self, card: Card) -> Result<()> {
        let next = card
            .index
            .checked_add(1)
            .ok_or(QueryError::IndexOutOfRange(card.index))?;
        self.next_card_index = self.next_card_index.max(next);
        let pos = self
            .cards
            .iter()
            .position(|c| c.index > card.index)
            .unwrap_or(self.cards.len());
        self.cards.insert(pos, card);
        Ok(())
    }

    /// Add a card, either fresh or from saved data.
    ///
    /// Saved data keeps its `card_id`; otherwise the card gets the next
    /// index never used in this search.
    pub fn create_card(
        &mut self,
        name: Option<&str>,
        data: Option<&SavedCard>,
        catalog: &Catalog,
    ) -> Result<u32> {
        let index = match data {
            Some(saved) => {
                if self.card(saved.card_id).is_some() {
                    return Err(QueryError::malformed(format!(
                        "duplicate card id {}",
                        saved.card_id
                    )));
                }
                saved.card_id
            }
            None => self.next_card_index,
        };

        let name = name
            .map(str::to_string)
            .unwrap_or_else(|| default_card_name(index));
        let card = Card::create(index, &name, self.model, data, catalog);
        debug!(card = index, rows = card.rows.len(), "created card");
        self.insert_card(card)?;

        Ok(index)
    }

    /// Append a blank card and return its index
    pub fn add_card(&mut self, catalog: &Catalog) -> Result<u32> {
        self.create_card(None, None, catalog)
    }

    /// Remove a card together with all of its rows
    pub fn remove_card(&mut self, index: u32) -> Result<Card> {
        let pos = self
            .cards
            .iter()
            .position(|c| c.index == index)
            .ok_or(QueryError::CardNotFound(index))?;
        Ok(self.cards.remove(pos))
    }

    /// Append a blank row to a card and return its row index
    pub fn add_row(&mut self, card_index: u32, catalog: &Catalog) -> Result<u32> {
        let card = self
            .card_mut(card_index)
            .ok_or(QueryError::CardNotFound(card_index))?;
        Ok(card.add_row(catalog)?.row_index)
    }

    pub fn remove_row(&mut self, card_index: u32, row_index: u32) -> Result<Row> {
        self.card_mut(card_index)
            .ok_or(QueryError::CardNotFound(card_index))?
            .remove_row(row_index)
    }

    /// Clear every card and rebuild from `existing`.
    ///
    /// Cards that cannot be restored are skipped. When nothing is restored a
    /// single blank card is inserted and numbering starts over.
    pub fn reset_cards(&mut self, existing: Option<&[SavedCard]>, catalog: &Catalog) {
        self.cards.clear();
        self.model = catalog.model();
        self.next_card_index = FIRST_CARD_INDEX;

        for saved in existing.unwrap_or_default() {
            if let Err(e) = self.create_card(None, Some(saved), catalog) {
                warn!(card = saved.card_id, error = %e, "skipping card during rehydration");
            }
        }

        if self.cards.is_empty() {
            let card = Card::create(
                FIRST_CARD_INDEX,
                &default_card_name(FIRST_CARD_INDEX),
                self.model,
                None,
                catalog,
            );
            self.cards.push(card);
            self.next_card_index = FIRST_CARD_INDEX + 1;
        }
    }

    pub fn card(&self, index: u32) -> Option<&Card> {
        self.cards.iter().find(|c| c.index == index)
    }

    pub fn card_mut(&mut self, index: u32) -> Option<&mut Card> {
        self.cards.iter_mut().find(|c| c.index == index)
    }

    pub fn row_mut(&mut self, card_index: u32, row_index: u32) -> Option<&mut Row> {
        self.card_mut(card_index)?.row_mut(row_index)
    }

    pub fn rows(&self) -> impl Iterator<Item = &Row> {
        self.cards.iter().flat_map(|c| c.rows.iter())
    }

    pub fn rows_mut(&mut self) -> impl Iterator<Item = &mut Row> {
        self.cards.iter_mut().flat_map(|c| c.rows.iter_mut())
    }

    /// Index the next appended card will get
    pub fn next_card_index(&self) -> u32 {
        self.next_card_index
    }

    /// The shape the search page embeds to restore this search
    pub fn to_saved(&self) -> Vec<SavedCard> {
        self.cards.iter().map(Card::to_saved).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{builtin_catalog, Lookup, LookupCatalog};
    use crate::query::SavedRow;

    fn catalog() -> Catalog {
        Catalog::new(builtin_catalog(SearchModel::Inventory), LookupCatalog::default())
    }

    #[test]
    fn test_new_search_has_default_card() {
        let expr = SearchExpression::new(&catalog());

        assert_eq!(expr.model, SearchModel::Inventory);
        assert_eq!(expr.cards.len(), 1);
        assert_eq!(expr.cards[0].rows.len(), 1);
        assert_eq!(expr.cards[0].rows[0].lookup, Lookup::Contains);
    }

    #[test]
    fn test_card_indices_never_reused() {
        let catalog = catalog();
        let mut expr = SearchExpression::new(&catalog);
        assert_eq!(expr.cards[0].index, 1);
        let second = expr.add_card(&catalog).unwrap();
        let third = expr.add_card(&catalog).unwrap();
        assert_eq!((second, third), (2, 3));

        expr.remove_card(2).unwrap();
        let fourth = expr.add_card(&catalog).unwrap();

        assert_eq!(fourth, 4);
        assert_eq!(expr.remove_card(2).unwrap_err(), QueryError::CardNotFound(2));
    }

    #[test]
    fn test_row_operations_through_expression() {
        let catalog = catalog();
        let mut expr = SearchExpression::new(&catalog);

        assert_eq!(expr.add_row(1, &catalog).unwrap(), 1);
        expr.remove_row(1, 0).unwrap();
        assert_eq!(expr.remove_row(1, 1).unwrap_err(), QueryError::LastRow(1));
        assert_eq!(expr.add_row(9, &catalog).unwrap_err(), QueryError::CardNotFound(9));
    }

    #[test]
    fn test_reset_cards_rehydrates_and_skips_duplicates() {
        let catalog = catalog();
        let row = SavedRow {
            row_id: Some(2),
            fields: vec!["serial_number".into()],
            lookup: "exact".into(),
            query: "SN-001".into(),
            nega: false,
            multi: false,
        };
        let saved = vec![
            SavedCard { card_id: 5, rows: vec![row.clone()] },
            SavedCard { card_id: 5, rows: vec![row.clone()] },
            SavedCard { card_id: 2, rows: vec![row] },
        ];

        let mut expr = SearchExpression::new(&catalog);
        expr.reset_cards(Some(&saved), &catalog);

        let indices: Vec<u32> = expr.cards.iter().map(|c| c.index).collect();
        assert_eq!(indices, vec![2, 5]);
        assert_eq!(expr.next_card_index(), 6);
        assert_eq!(expr.cards[0].rows[0].row_index, 2);
    }

    #[test]
    fn test_reset_cards_without_data_inserts_default() {
        let catalog = catalog();
        let mut expr = SearchExpression::new(&catalog);
        expr.add_card(&catalog).unwrap();

        expr.reset_cards(Some(&[]), &catalog);

        assert_eq!(expr.cards.len(), 1);
        assert_eq!(expr.cards[0].index, 1);
        assert_eq!(expr.next_card_index(), 2);
    }

    #[test]
    fn test_card_at_max_index_cannot_be_inserted() {
        let catalog = catalog();
        let saved = SavedCard {
            card_id: u32::MAX,
            rows: Vec::new(),
        };
        let mut expr = SearchExpression::new(&catalog);

        assert_eq!(
            expr.create_card(None, Some(&saved), &catalog),
            Err(QueryError::IndexOutOfRange(u32::MAX))
        );
        assert_eq!(expr.cards.len(), 1);
        assert_eq!(expr.add_card(&catalog).unwrap(), 2);
    }

    #[test]
    fn test_rehydrate_skips_out_of_range_card() {
        let catalog = catalog();
        let saved = vec![
            SavedCard { card_id: u32::MAX, rows: Vec::new() },
            SavedCard { card_id: 7, rows: Vec::new() },
        ];

        let expr = SearchExpression::rehydrate(&saved, &catalog);

        let indices: Vec<u32> = expr.cards.iter().map(|c| c.index).collect();
        assert_eq!(indices, vec![7]);
        assert_eq!(expr.next_card_index(), 8);
    }
}
