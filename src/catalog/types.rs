//! Catalog type definitions

use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::QueryError;

/// The record type a search runs against. One model per search session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SearchModel {
    Inventory,
    Part,
    Build,
    Assembly,
}

impl SearchModel {
    pub const ALL: [SearchModel; 4] = [
        SearchModel::Inventory,
        SearchModel::Part,
        SearchModel::Build,
        SearchModel::Assembly,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            SearchModel::Inventory => "inventory",
            SearchModel::Part => "part",
            SearchModel::Build => "build",
            SearchModel::Assembly => "assembly",
        }
    }

    /// Path of the server's search results page for this model
    pub fn search_path(&self) -> &'static str {
        match self {
            SearchModel::Inventory => "/search/inventory",
            SearchModel::Part => "/search/parts",
            SearchModel::Build => "/search/builds",
            SearchModel::Assembly => "/search/assembly",
        }
    }
}

impl fmt::Display for SearchModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SearchModel {
    type Err = QueryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "inventory" => Ok(SearchModel::Inventory),
            "part" | "parts" => Ok(SearchModel::Part),
            "build" | "builds" => Ok(SearchModel::Build),
            "assembly" | "assemblies" => Ok(SearchModel::Assembly),
            _ => Err(QueryError::UnknownModel(s.to_string())),
        }
    }
}

/// Type category of a field. Decides which lookups are legal and which
/// literal formats the validator accepts.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LookupClass {
    #[default]
    #[serde(alias = "TEXT", alias = "STR_LOOKUP", alias = "ITER_LOOKUP", alias = "EXACT_LOOKUP")]
    Text,
    #[serde(alias = "NUMERIC", alias = "NUM_LOOKUP")]
    Numeric,
    #[serde(alias = "DATE", alias = "DATE_LOOKUP")]
    Date,
    #[serde(alias = "BOOLEAN", alias = "BOOL_LOOKUP")]
    Boolean,
}

impl LookupClass {
    /// Whether `lookup` may be used against a field of this class
    pub fn permits(&self, lookup: &Lookup) -> bool {
        use Lookup::*;
        match self {
            LookupClass::Text => matches!(lookup, Contains | Exact),
            LookupClass::Numeric => matches!(lookup, Exact | Gte | Lte),
            LookupClass::Date => matches!(lookup, Exact | Gte | Lte | IsNull | Date),
            LookupClass::Boolean => matches!(lookup, Exact | IsNull),
        }
    }
}

/// A comparison operator.
///
/// Ids outside the known set are kept as `Other` so a decoded search keeps
/// whatever the URL carried; validation then rejects them as illegal.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Lookup {
    Contains,
    Exact,
    Gte,
    Lte,
    IsNull,
    Date,
    Other(String),
}

impl Lookup {
    /// Wire id understood by the server
    pub fn as_str(&self) -> &str {
        match self {
            Lookup::Contains => "icontains",
            Lookup::Exact => "exact",
            Lookup::Gte => "gte",
            Lookup::Lte => "lte",
            Lookup::IsNull => "isnull",
            Lookup::Date => "date",
            Lookup::Other(s) => s,
        }
    }

    pub fn parse(s: &str) -> Self {
        match s {
            "icontains" | "contains" => Lookup::Contains,
            "exact" => Lookup::Exact,
            "gte" => Lookup::Gte,
            "lte" => Lookup::Lte,
            "isnull" => Lookup::IsNull,
            "date" => Lookup::Date,
            other => Lookup::Other(other.to_string()),
        }
    }

    pub fn is_comparative(&self) -> bool {
        matches!(self, Lookup::Gte | Lookup::Lte)
    }
}

impl fmt::Display for Lookup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<String> for Lookup {
    fn from(s: String) -> Self {
        Lookup::parse(&s)
    }
}

impl From<&str> for Lookup {
    fn from(s: &str) -> Self {
        Lookup::parse(s)
    }
}

impl From<Lookup> for String {
    fn from(l: Lookup) -> Self {
        l.as_str().to_string()
    }
}

/// A queryable field, as described by the server for one model.
///
/// Accepts the in-page shape `{value, text, disabled, legal_lookup}` as well
/// as the native field names.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldDescriptor {
    /// Stable field path, e.g. `part__part_number`. Empty for headings.
    #[serde(alias = "value", default, deserialize_with = "null_as_empty")]
    pub id: String,

    /// Display label
    #[serde(alias = "text")]
    pub label: String,

    #[serde(alias = "legal_lookup", alias = "legal_lookups", default)]
    pub lookup_class: LookupClass,

    /// Section separator in the field list; never selectable
    #[serde(alias = "disabled", default)]
    pub disabled_heading: bool,
}

impl FieldDescriptor {
    pub fn new(id: &str, label: &str, lookup_class: LookupClass) -> Self {
        FieldDescriptor {
            id: id.to_string(),
            label: label.to_string(),
            lookup_class,
            disabled_heading: false,
        }
    }

    pub fn heading(label: &str) -> Self {
        FieldDescriptor {
            id: String::new(),
            label: label.to_string(),
            lookup_class: LookupClass::Text,
            disabled_heading: true,
        }
    }

    pub fn is_selectable(&self) -> bool {
        !self.disabled_heading && !self.id.is_empty()
    }
}

fn null_as_empty<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}

/// An operator entry in the lookup dropdown
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LookupDescriptor {
    #[serde(alias = "value")]
    pub id: Lookup,

    #[serde(alias = "text")]
    pub label: String,
}

impl LookupDescriptor {
    pub fn new(id: Lookup, label: &str) -> Self {
        LookupDescriptor {
            id,
            label: label.to_string(),
        }
    }
}

/// The fields a model can be searched on, in display order
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldCatalog {
    pub model: SearchModel,
    pub fields: Vec<FieldDescriptor>,
}

impl FieldCatalog {
    pub fn new(model: SearchModel, fields: Vec<FieldDescriptor>) -> Self {
        FieldCatalog { model, fields }
    }

    /// Look up a selectable field by id. Headings never match.
    pub fn get(&self, id: &str) -> Option<&FieldDescriptor> {
        self.fields.iter().find(|f| f.is_selectable() && f.id == id)
    }

    pub fn selectable(&self) -> impl Iterator<Item = &FieldDescriptor> {
        self.fields.iter().filter(|f| f.is_selectable())
    }

    /// Label for a field id, falling back to the id itself
    pub fn label_for<'a>(&'a self, id: &'a str) -> &'a str {
        self.get(id).map(|f| f.label.as_str()).unwrap_or(id)
    }
}

/// The operators offered in the lookup dropdown
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LookupCatalog {
    pub lookups: Vec<LookupDescriptor>,
}

impl Default for LookupCatalog {
    fn default() -> Self {
        LookupCatalog {
            lookups: vec![
                LookupDescriptor::new(Lookup::Contains, "Contains"),
                LookupDescriptor::new(Lookup::Exact, "Exact"),
                LookupDescriptor::new(Lookup::Date, "Date"),
                LookupDescriptor::new(Lookup::Gte, ">="),
                LookupDescriptor::new(Lookup::Lte, "<="),
                LookupDescriptor::new(Lookup::IsNull, "Is-Null"),
            ],
        }
    }
}

impl LookupCatalog {
    /// Operator preselected on a fresh row: the first catalog entry
    pub fn default_lookup(&self) -> Lookup {
        self.lookups
            .first()
            .map(|l| l.id.clone())
            .unwrap_or(Lookup::Contains)
    }
}

/// Field and lookup catalogs for one search page
#[derive(Debug, Clone, PartialEq)]
pub struct Catalog {
    pub fields: FieldCatalog,
    pub lookups: LookupCatalog,
}

impl Catalog {
    pub fn new(fields: FieldCatalog, lookups: LookupCatalog) -> Self {
        Catalog { fields, lookups }
    }

    pub fn model(&self) -> SearchModel {
        self.fields.model
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_legal_lookups_per_class() {
        assert!(LookupClass::Text.permits(&Lookup::Contains));
        assert!(!LookupClass::Text.permits(&Lookup::Gte));
        assert!(LookupClass::Numeric.permits(&Lookup::Lte));
        assert!(!LookupClass::Numeric.permits(&Lookup::Contains));
        assert!(LookupClass::Date.permits(&Lookup::Date));
        assert!(LookupClass::Date.permits(&Lookup::IsNull));
        assert!(LookupClass::Boolean.permits(&Lookup::IsNull));
        assert!(!LookupClass::Boolean.permits(&Lookup::Gte));
        assert!(!LookupClass::Text.permits(&Lookup::Other("regex".into())));
    }

    #[test]
    fn test_lookup_wire_ids() {
        assert_eq!(Lookup::parse("contains"), Lookup::Contains);
        assert_eq!(Lookup::Contains.as_str(), "icontains");
        assert_eq!(Lookup::parse("startswith"), Lookup::Other("startswith".into()));
        assert_eq!(Lookup::parse("startswith").as_str(), "startswith");
    }

    #[test]
    fn test_field_descriptor_from_page_shape() {
        let json = r#"[
            {"value": "part__name", "text": "Name", "legal_lookup": "STR_LOOKUP"},
            {"value": null, "text": "--Part--", "disabled": true},
            {"value": "part__unit_cost", "text": "Unit Cost", "legal_lookup": "NUM_LOOKUP"}
        ]"#;
        let fields: Vec<FieldDescriptor> = serde_json::from_str(json).unwrap();

        assert_eq!(fields.len(), 3);
        assert_eq!(fields[0].lookup_class, LookupClass::Text);
        assert!(fields[1].disabled_heading);
        assert!(fields[1].id.is_empty());
        assert_eq!(fields[2].lookup_class, LookupClass::Numeric);
    }

    #[test]
    fn test_catalog_skips_headings() {
        let catalog = FieldCatalog::new(
            SearchModel::Part,
            vec![
                FieldDescriptor::heading("--UDF--"),
                FieldDescriptor::new("name", "Name", LookupClass::Text),
            ],
        );
        assert_eq!(catalog.selectable().count(), 1);
        assert!(catalog.get("").is_none());
        assert_eq!(catalog.label_for("name"), "Name");
        assert_eq!(catalog.label_for("missing"), "missing");
    }

    #[test]
    fn test_model_from_str() {
        assert_eq!("Parts".parse::<SearchModel>().unwrap(), SearchModel::Part);
        assert!("widgets".parse::<SearchModel>().is_err());
    }
}
