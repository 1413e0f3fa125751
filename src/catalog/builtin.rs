//! Built-in field catalogs for the searchable models

use super::{FieldCatalog, FieldDescriptor, LookupClass, SearchModel};

use LookupClass::{Boolean, Date, Numeric, Text};

fn f(id: &str, label: &str, class: LookupClass) -> FieldDescriptor {
    FieldDescriptor::new(id, label, class)
}

fn h(label: &str) -> FieldDescriptor {
    FieldDescriptor::heading(label)
}

/// The catalog the search page ships for `model`
pub fn builtin_catalog(model: SearchModel) -> FieldCatalog {
    let fields = match model {
        SearchModel::Inventory => vec![
            f("part__name", "Name", Text),
            f("part__friendly_name", "Friendly Name", Text),
            f("serial_number", "Serial Number", Text),
            f("old_serial_number", "Old Serial Number", Text),
            f("location__name", "Location", Text),
            f("build__assembly__name", "Build", Text),
            f("created_at", "Date Created", Date),
            f("updated_at", "Date Modified", Date),
            h("--Part--"),
            f("part__part_number", "Part Number", Text),
            f("part__part_type__name", "Part Type", Text),
            f("part__revision", "Part Revision", Text),
            f("part__unit_cost", "Unit Cost", Numeric),
            f("part__refurbishment_cost", "Refurb Cost", Numeric),
            h("--User-Defined-Fields--"),
            f("fieldvalues__field__field_name", "UDF Name", Text),
            f("fieldvalues__field_value", "UDF Value", Text),
            h("--Actions--"),
            f("actions__latest__action_type", "Latest Action", Text),
            f("actions__latest__user__name", "Latest Action: User", Text),
            f("actions__latest__created_at", "Latest Action: Time", Date),
            f("actions__latest__location__name", "Latest Action: Location", Text),
            f("actions__latest__detail", "Latest Action: Notes", Text),
            f("actions__count", "Total Action Count", Numeric),
            h("--Calibrations--"),
            f("calibration_events__latest__calibration_date", "Latest Calibration Event: Date", Date),
            f("calibration_events__latest__approved", "Latest Calibration Event: Approved", Boolean),
        ],
        SearchModel::Part => vec![
            f("name", "Name", Text),
            f("friendly_name", "Friendly Name", Text),
            f("part_number", "Part Number", Text),
            f("part_type__name", "Part Type", Text),
            f("revision", "Part Revision", Text),
            f("unit_cost", "Unit Cost", Numeric),
            f("refurbishment_cost", "Refurb Cost", Numeric),
            f("note", "Notes", Text),
            f("inventory__count", "Inventory Count", Numeric),
            h("--User-Defined-Fields--"),
            f("user_defined_fields__field_name", "UDF Name", Text),
        ],
        SearchModel::Build => vec![
            f("assembly__name", "Name", Text),
            f("build_number", "Build Number", Text),
            f("assembly__assembly_type__name", "Type", Text),
            f("location__name", "Location", Text),
            f("assembly__description", "Description", Text),
            f("build_notes", "Notes", Text),
            f("is_deployed", "is-deployed?", Boolean),
            f("flag", "is-flagged?", Boolean),
            f("created_at", "Date Created", Date),
            f("updated_at", "Date Modified", Date),
            h("--Actions--"),
            f("actions__latest__action_type", "Latest Action", Text),
            f("actions__latest__user__name", "Latest Action: User", Text),
            f("actions__latest__created_at", "Latest Action: Time", Date),
            f("actions__latest__location__name", "Latest Action: Location", Text),
            f("actions__latest__detail", "Latest Action: Notes", Text),
            f("actions__count", "Total Action Count", Numeric),
        ],
        SearchModel::Assembly => vec![
            f("name", "Name", Text),
            f("assembly_number", "Number", Text),
            f("assembly_type__name", "Type", Text),
            f("description", "Description", Text),
        ],
    };

    FieldCatalog::new(model, fields)
}

/// Fields the search bar matches a free-text query against
pub fn quick_search_fields(model: SearchModel) -> &'static [&'static str] {
    match model {
        SearchModel::Inventory => &[
            "part__name",
            "part__friendly_name",
            "serial_number",
            "old_serial_number",
            "location__name",
        ],
        SearchModel::Part => &["part_number", "name", "friendly_name"],
        SearchModel::Build => &[
            "build_number",
            "assembly__name",
            "assembly__assembly_type__name",
            "assembly__description",
            "build_notes",
            "location__name",
        ],
        SearchModel::Assembly => &["assembly_number", "name", "assembly_type__name", "description"],
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_quick_search_fields_are_in_catalog() {
        for model in SearchModel::ALL {
            let catalog = builtin_catalog(model);
            for id in quick_search_fields(model) {
                let field = catalog.get(id).unwrap();
                assert_eq!(field.lookup_class, LookupClass::Text, "{} {}", model, id);
            }
        }
    }

    #[test]
    fn test_headings_are_not_selectable() {
        let catalog = builtin_catalog(SearchModel::Inventory);
        assert!(catalog.fields.iter().any(|f| f.disabled_heading));
        assert!(catalog.selectable().all(|f| !f.disabled_heading));
    }
}
