//! Catalog loader - reads field/lookup catalogs from JSON or YAML files

use anyhow::{bail, Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use tracing::debug;
use walkdir::WalkDir;

use super::builtin::builtin_catalog;
use super::{Catalog, FieldCatalog, FieldDescriptor, LookupCatalog, LookupDescriptor, SearchModel};

/// On-disk catalog: either the bare field list the page embeds, or a
/// document carrying both fields and lookups.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum CatalogFile {
    Full {
        fields: Vec<FieldDescriptor>,
        #[serde(default)]
        lookups: Option<Vec<LookupDescriptor>>,
    },
    Fields(Vec<FieldDescriptor>),
}

/// Load the catalog for `model`.
///
/// An explicit file wins, then `<model>.{json,yaml,yml}` inside `catalog_dir`,
/// then the built-in catalog.
pub fn load_catalog(
    model: SearchModel,
    file: Option<&Path>,
    catalog_dir: Option<&Path>,
) -> Result<Catalog> {
    if let Some(path) = file {
        return load_catalog_file(model, path);
    }

    if let Some(dir) = catalog_dir {
        if let Some(path) = find_catalog_file(dir, model) {
            return load_catalog_file(model, &path);
        }
        debug!(model = %model, dir = %dir.display(), "no catalog file found, using built-in");
    }

    Ok(Catalog::new(builtin_catalog(model), LookupCatalog::default()))
}

/// Parse a single catalog file
pub fn load_catalog_file(model: SearchModel, path: &Path) -> Result<Catalog> {
    let contents = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read catalog file: {}", path.display()))?;

    let parsed: CatalogFile = match path.extension().and_then(|e| e.to_str()) {
        Some("json") => serde_json::from_str(&contents)
            .with_context(|| format!("Failed to parse catalog file: {}", path.display()))?,
        Some("yaml") | Some("yml") => serde_yaml::from_str(&contents)
            .with_context(|| format!("Failed to parse catalog file: {}", path.display()))?,
        _ => bail!("Unsupported catalog file type: {}", path.display()),
    };

    let (fields, lookups) = match parsed {
        CatalogFile::Full { fields, lookups } => (fields, lookups),
        CatalogFile::Fields(fields) => (fields, None),
    };

    if !fields.iter().any(|f| f.is_selectable()) {
        bail!("Catalog file has no selectable fields: {}", path.display());
    }

    let lookups = match lookups {
        Some(lookups) if !lookups.is_empty() => LookupCatalog { lookups },
        _ => LookupCatalog::default(),
    };

    debug!(model = %model, path = %path.display(), fields = fields.len(), "loaded catalog");
    Ok(Catalog::new(FieldCatalog::new(model, fields), lookups))
}

fn find_catalog_file(dir: &Path, model: SearchModel) -> Option<PathBuf> {
    WalkDir::new(dir)
        .max_depth(1)
        .into_iter()
        .filter_map(|e| e.ok())
        .map(|e| e.into_path())
        .find(|p| {
            let stem_matches = p.file_stem().and_then(|s| s.to_str()) == Some(model.as_str());
            let ext_matches = matches!(
                p.extension().and_then(|e| e.to_str()),
                Some("json") | Some("yaml") | Some("yml")
            );
            stem_matches && ext_matches
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{Lookup, LookupClass};
    use tempfile::tempdir;

    #[test]
    fn test_load_builtin_catalog() {
        let catalog = load_catalog(SearchModel::Part, None, None).unwrap();

        assert_eq!(catalog.model(), SearchModel::Part);
        assert!(catalog.fields.get("part_number").is_some());
        assert_eq!(catalog.lookups.default_lookup(), Lookup::Contains);
    }

    #[test]
    fn test_load_page_shaped_json() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("fields.json");
        std::fs::write(
            &path,
            r#"[{"value": "name", "text": "Name", "legal_lookup": "STR_LOOKUP"},
                {"value": "unit_cost", "text": "Unit Cost", "legal_lookup": "NUM_LOOKUP"}]"#,
        )
        .unwrap();

        let catalog = load_catalog(SearchModel::Part, Some(&path), None).unwrap();

        assert_eq!(catalog.fields.fields.len(), 2);
        assert_eq!(
            catalog.fields.get("unit_cost").unwrap().lookup_class,
            LookupClass::Numeric
        );
    }

    #[test]
    fn test_load_yaml_from_catalog_dir() {
        let dir = tempdir().unwrap();
        let yaml = r#"
fields:
  - id: build_number
    label: Build Number
    lookup_class: text
  - id: is_deployed
    label: Deployed
    lookup_class: boolean
lookups:
  - id: exact
    label: Exact
  - id: isnull
    label: Is-Null
"#;
        std::fs::write(dir.path().join("build.yaml"), yaml).unwrap();

        let catalog = load_catalog(SearchModel::Build, None, Some(dir.path())).unwrap();

        assert_eq!(catalog.fields.fields.len(), 2);
        assert_eq!(catalog.lookups.default_lookup(), Lookup::Exact);

        // No file for this model in the directory
        let fallback = load_catalog(SearchModel::Assembly, None, Some(dir.path())).unwrap();
        assert!(fallback.fields.get("assembly_number").is_some());
    }

    #[test]
    fn test_reject_catalog_without_fields() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("part.json");
        std::fs::write(&path, r#"[{"value": null, "text": "--Only--", "disabled": true}]"#).unwrap();

        assert!(load_catalog_file(SearchModel::Part, &path).is_err());
    }
}
