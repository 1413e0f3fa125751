//! Search-bar queries expanded into a full search

use crate::catalog::{quick_search_fields, Catalog, Lookup, LookupClass};
use crate::query::{SearchExpression, DEFAULT_MULTI_SIZE};

/// One card, one row: `text` contained in any of the model's quick-search
/// fields. Falls back to every text field when the catalog has none of them.
pub fn quick_search(text: &str, catalog: &Catalog) -> SearchExpression {
    let mut fields: Vec<String> = quick_search_fields(catalog.model())
        .iter()
        .filter(|id| catalog.fields.get(id).is_some())
        .map(|id| id.to_string())
        .collect();

    if fields.is_empty() {
        fields = catalog
            .fields
            .selectable()
            .filter(|f| f.lookup_class == LookupClass::Text)
            .map(|f| f.id.clone())
            .collect();
    }

    let mut expr = SearchExpression::new(catalog);
    let card = expr.cards[0].index;
    if let Some(row) = expr.row_mut(card, 0) {
        row.set_multiplicity(DEFAULT_MULTI_SIZE);
        row.select_fields(fields);
        row.set_lookup(Lookup::Contains);
        row.set_value(text.trim());
    }
    expr
}
