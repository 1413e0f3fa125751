//! View models for drawing cards and rows

use serde::Serialize;
use std::fmt::Write;

use crate::catalog::{Catalog, FieldDescriptor};

use super::{Card, Row, SearchExpression};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldOption {
    pub value: String,
    pub text: String,
    pub selected: bool,
    pub disabled: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LookupOption {
    pub value: String,
    pub text: String,
    pub selected: bool,
    /// Legal for every currently selected field
    pub legal: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RowView {
    pub dom_id: String,
    pub card_index: u32,
    pub row_index: u32,
    pub fields: Vec<FieldOption>,
    pub lookups: Vec<LookupOption>,
    pub value: String,
    pub negate: bool,
    pub multi: bool,
    /// Number of visible options in the field list
    pub size: usize,
    pub removable: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CardView {
    pub dom_id: String,
    pub index: u32,
    pub name: String,
    pub model: String,
    pub rows: Vec<RowView>,
}

pub fn render_row(row: &Row, catalog: &Catalog, removable: bool) -> RowView {
    let selected: Vec<&FieldDescriptor> = row
        .selected_fields
        .iter()
        .filter_map(|id| catalog.fields.get(id))
        .collect();

    let fields = catalog
        .fields
        .fields
        .iter()
        .map(|f| FieldOption {
            value: f.id.clone(),
            text: f.label.clone(),
            selected: f.is_selectable() && row.selected_fields.contains(&f.id),
            disabled: !f.is_selectable(),
        })
        .collect();

    let lookups = catalog
        .lookups
        .lookups
        .iter()
        .map(|l| LookupOption {
            value: l.id.to_string(),
            text: l.label.clone(),
            selected: l.id == row.lookup,
            legal: selected.iter().all(|f| f.lookup_class.permits(&l.id)),
        })
        .collect();

    RowView {
        dom_id: row.dom_id(),
        card_index: row.card_index,
        row_index: row.row_index,
        fields,
        lookups,
        value: row.value.clone(),
        negate: row.negate,
        multi: row.multi,
        size: if row.multi { row.list_size } else { 1 },
        removable,
    }
}

pub fn render_card(card: &Card, catalog: &Catalog) -> CardView {
    let removable = card.rows.len() > 1;
    CardView {
        dom_id: card.dom_id(),
        index: card.index,
        name: card.name.clone(),
        model: card.model.to_string(),
        rows: card
            .rows
            .iter()
            .map(|r| render_row(r, catalog, removable))
            .collect(),
    }
}

pub fn render_expression(expr: &SearchExpression, catalog: &Catalog) -> Vec<CardView> {
    expr.cards.iter().map(|c| render_card(c, catalog)).collect()
}

/// Plain-text rendering, one line per row
pub fn render_text(cards: &[CardView]) -> String {
    let mut out = String::new();

    for (i, card) in cards.iter().enumerate() {
        if i > 0 {
            out.push_str("AND\n");
        }
        let _ = writeln!(out, "[{}] {} ({})", card.index, card.name, card.model);

        for row in &card.rows {
            let fields: Vec<&str> = row
                .fields
                .iter()
                .filter(|f| f.selected)
                .map(|f| f.text.as_str())
                .collect();
            let lookup = row
                .lookups
                .iter()
                .find(|l| l.selected)
                .map(|l| l.text.as_str())
                .unwrap_or("?");
            let fields = if fields.is_empty() {
                "(no field)".to_string()
            } else {
                fields.join(" OR ")
            };
            let not = if row.negate { "NOT " } else { "" };
            let _ = writeln!(
                out,
                "  {}.{}  {}({}) {} \"{}\"",
                row.card_index, row.row_index, not, fields, lookup, row.value
            );
        }
    }

    out
}
