//! Search rows - one predicate inside a card

use serde::{Deserialize, Deserializer, Serialize};
use tracing::warn;

use crate::catalog::{Catalog, Lookup};

/// Field list height while a row is in multi-select mode
pub const DEFAULT_MULTI_SIZE: usize = 6;

/// One predicate: an OR over `selected_fields`, compared with `lookup`
/// against `value`, optionally negated as a whole.
#[derive(Debug, Clone)]
pub struct Row {
    pub card_index: u32,
    pub row_index: u32,

    /// Ordered, duplicate-free. At most one entry unless `multi` is set.
    pub selected_fields: Vec<String>,

    pub lookup: Lookup,
    pub value: String,
    pub negate: bool,
    pub multi: bool,

    /// Visible options in the field list when `multi` is set. Rendering only.
    pub list_size: usize,
}

impl PartialEq for Row {
    fn eq(&self, other: &Self) -> bool {
        self.card_index == other.card_index
            && self.row_index == other.row_index
            && self.selected_fields == other.selected_fields
            && self.lookup == other.lookup
            && self.value == other.value
            && self.negate == other.negate
            && self.multi == other.multi
    }
}

impl Eq for Row {}

impl Row {
    /// A fresh row: the catalog's default lookup, nothing selected, empty value
    pub fn new(card_index: u32, row_index: u32, catalog: &Catalog) -> Self {
        Row {
            card_index,
            row_index,
            selected_fields: Vec::new(),
            lookup: catalog.lookups.default_lookup(),
            value: String::new(),
            negate: false,
            multi: false,
            list_size: 1,
        }
    }

    /// Build a row, seeded from previously saved data when present
    pub fn create(
        card_index: u32,
        row_index: u32,
        initial: Option<&SavedRow>,
        catalog: &Catalog,
    ) -> Self {
        let mut row = Row::new(card_index, row_index, catalog);

        if let Some(saved) = initial {
            let multi = saved.multi || saved.fields.len() > 1;
            row.set_multiplicity(if multi { DEFAULT_MULTI_SIZE } else { 1 });
            row.select_fields(saved.fields.iter().cloned());
            row.lookup = Lookup::parse(&saved.lookup);
            row.value = saved.query.clone();
            row.negate = saved.nega;
        }

        row
    }

    /// DOM id of the row container
    pub fn dom_id(&self) -> String {
        format!("qfield-row_c{}_f{}", self.card_index, self.row_index)
    }

    /// Switch between single and multi-field selection.
    ///
    /// A size above one turns on multi-select and sets how many options the
    /// list shows. Leaving multi-select keeps only the first selected field.
    pub fn set_multiplicity(&mut self, size: usize) {
        if size > 1 {
            self.multi = true;
            self.list_size = size;
        } else {
            self.multi = false;
            self.list_size = 1;
            self.selected_fields.truncate(1);
        }
    }

    /// Replace the selection, dropping duplicates and keeping first-seen order
    pub fn select_fields<I>(&mut self, ids: I)
    where
        I: IntoIterator<Item = String>,
    {
        self.selected_fields.clear();
        for id in ids {
            if !self.selected_fields.contains(&id) {
                self.selected_fields.push(id);
            }
        }
        if !self.multi {
            self.selected_fields.truncate(1);
        }
    }

    pub fn set_lookup(&mut self, lookup: Lookup) {
        self.lookup = lookup;
    }

    pub fn set_value(&mut self, value: impl Into<String>) {
        self.value = value.into();
    }

    pub fn set_negate(&mut self, negate: bool) {
        self.negate = negate;
    }

    pub fn to_saved(&self) -> SavedRow {
        SavedRow {
            row_id: Some(self.row_index),
            fields: self.selected_fields.clone(),
            lookup: self.lookup.to_string(),
            query: self.value.clone(),
            nega: self.negate,
            multi: self.multi,
        }
    }
}

/// A row as the search page embeds it for rehydration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SavedRow {
    /// Original row index. Rows without one are numbered by position.
    #[serde(default, skip_serializing_if = "Option::is_none", deserialize_with = "index_opt")]
    pub row_id: Option<u32>,

    #[serde(default)]
    pub fields: Vec<String>,
    pub lookup: String,
    #[serde(default, deserialize_with = "query_literal")]
    pub query: String,
    #[serde(default)]
    pub nega: bool,
    #[serde(default)]
    pub multi: bool,
}

/// A card as the search page embeds it for rehydration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SavedCard {
    #[serde(deserialize_with = "index")]
    pub card_id: u32,
    #[serde(default)]
    pub rows: Vec<SavedRow>,
}

impl SavedCard {
    /// Parse a JSON array of saved cards one card at a time.
    ///
    /// A card that does not match the saved shape is logged and dropped so
    /// the rest of the search can still be restored.
    pub fn parse_list(json: &str) -> serde_json::Result<Vec<SavedCard>> {
        let raw: Vec<serde_json::Value> = serde_json::from_str(json)?;
        let mut cards = Vec::with_capacity(raw.len());
        for (position, value) in raw.into_iter().enumerate() {
            match serde_json::from_value::<SavedCard>(value) {
                Ok(card) => cards.push(card),
                Err(e) => warn!(position, error = %e, "skipping unreadable saved card"),
            }
        }
        Ok(cards)
    }
}

/// Query literals are usually strings, but `isnull` rows carry a JSON bool
#[derive(Deserialize)]
#[serde(untagged)]
enum QueryRepr {
    Bool(bool),
    Num(serde_json::Number),
    Str(String),
}

fn query_literal<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Option::<QueryRepr>::deserialize(deserializer)? {
        Some(QueryRepr::Bool(true)) => "True".to_string(),
        Some(QueryRepr::Bool(false)) => "False".to_string(),
        Some(QueryRepr::Num(n)) => n.to_string(),
        Some(QueryRepr::Str(s)) => s,
        None => String::new(),
    })
}

/// Indices arrive as numbers or as the string prefix taken from the URL
#[derive(Deserialize)]
#[serde(untagged)]
enum IndexRepr {
    Int(u32),
    Str(String),
}

impl IndexRepr {
    fn into_index<E: serde::de::Error>(self) -> Result<u32, E> {
        match self {
            IndexRepr::Int(i) => Ok(i),
            IndexRepr::Str(s) => s
                .trim()
                .parse()
                .map_err(|_| E::custom(format!("invalid index '{}'", s))),
        }
    }
}

fn index<'de, D>(deserializer: D) -> Result<u32, D::Error>
where
    D: Deserializer<'de>,
{
    IndexRepr::deserialize(deserializer)?.into_index()
}

fn index_opt<'de, D>(deserializer: D) -> Result<Option<u32>, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<IndexRepr>::deserialize(deserializer)? {
        Some(repr) => repr.into_index().map(Some),
        None => Ok(None),
    }
}
