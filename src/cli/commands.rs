//! CLI command implementations

use anyhow::{Context, Result};
use std::path::Path;
use tracing::debug;

use rdb_search::catalog::Catalog;
use rdb_search::codec::{decode, decode_lenient, encode, parse_query_string, quick_search, to_query_string};
use rdb_search::query::{render_expression, render_text, validate, SavedCard, SearchExpression};
use rdb_search::submit::{SubmitController, SubmitError, Submission, Transport};

/// Read a search from a saved-cards JSON file or a query string / URL
fn read_search(input: &str, catalog: &Catalog) -> Result<SearchExpression> {
    let path = Path::new(input);
    if path.extension().map_or(false, |ext| ext == "json") && path.exists() {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read search file: {}", path.display()))?;
        let saved = SavedCard::parse_list(&contents)
            .with_context(|| format!("Failed to parse search file: {}", path.display()))?;
        debug!(cards = saved.len(), "rehydrating saved search");
        return Ok(SearchExpression::rehydrate(&saved, catalog));
    }

    let (expr, skipped) = decode_lenient(parse_query_string(input), catalog.model());
    if !skipped.is_empty() {
        eprintln!("Skipped {} malformed parameter(s)", skipped.len());
    }
    if expr.cards.is_empty() {
        return Ok(SearchExpression::new(catalog));
    }
    Ok(expr)
}

/// List the searchable fields of a model
pub fn fields(catalog: &Catalog) -> Result<()> {
    println!("Fields for '{}':\n", catalog.model());

    for field in &catalog.fields.fields {
        if field.is_selectable() {
            let lookups: Vec<&str> = catalog
                .lookups
                .lookups
                .iter()
                .filter(|l| field.lookup_class.permits(&l.id))
                .map(|l| l.label.as_str())
                .collect();
            println!("  {:<48} {:<32} [{}]", field.id, field.label, lookups.join(", "));
        } else {
            println!("{}", field.label);
        }
    }

    Ok(())
}

/// Encode a saved search into a query string
pub fn encode_search(input: &str, catalog: &Catalog) -> Result<()> {
    let expr = read_search(input, catalog)?;
    println!("{}", to_query_string(&encode(&expr)));
    Ok(())
}

/// Decode a query string into the saved-cards JSON the search page embeds
pub fn decode_search(query: &str, catalog: &Catalog, strict: bool) -> Result<()> {
    let params = parse_query_string(query);
    let expr = if strict {
        decode(params, catalog.model())?
    } else {
        read_search(query, catalog)?
    };

    println!("{}", serde_json::to_string_pretty(&expr.to_saved())?);
    Ok(())
}

/// Validate a search and report every problem
pub fn validate_search(input: &str, catalog: &Catalog) -> Result<()> {
    let mut expr = read_search(input, catalog)?;

    match validate(&mut expr, &catalog.fields) {
        Ok(()) => {
            println!("✓ Search is valid.");
            Ok(())
        }
        Err(report) => {
            for violation in &report.violations {
                println!("ERROR: {}", violation);
            }
            println!("\nFound {} problem(s).", report.len());
            std::process::exit(1);
        }
    }
}

/// Validate, encode and print the resulting navigation
pub fn submit_search(input: &str, catalog: &Catalog, action: &str, transport: Transport) -> Result<()> {
    let mut expr = read_search(input, catalog)?;
    submit_expression(&mut expr, catalog, action, transport)
}

/// Expand a search-bar query and print the navigation
pub fn quick(text: &str, catalog: &Catalog, action: &str, transport: Transport) -> Result<()> {
    let mut expr = quick_search(text, catalog);
    submit_expression(&mut expr, catalog, action, transport)
}

fn submit_expression(
    expr: &mut SearchExpression,
    catalog: &Catalog,
    action: &str,
    transport: Transport,
) -> Result<()> {
    let mut controller = SubmitController::new(action, transport);

    match controller.submit(expr, &catalog.fields) {
        Ok(submission) => {
            print_submission(&submission);
            Ok(())
        }
        Err(SubmitError::Blocked(report)) => {
            for violation in &report.violations {
                println!("ERROR: {}", violation);
            }
            std::process::exit(1);
        }
        Err(e) => Err(e.into()),
    }
}

fn print_submission(submission: &Submission) {
    println!("{} {}", submission.transport, submission.url());
    if let Some(body) = submission.body() {
        println!("{}", body);
    }
}

/// Show the cards and rows of a search
pub fn render(input: &str, catalog: &Catalog, json: bool) -> Result<()> {
    let expr = read_search(input, catalog)?;
    let cards = render_expression(&expr, catalog);

    if json {
        println!("{}", serde_json::to_string_pretty(&cards)?);
    } else {
        print!("{}", render_text(&cards));
    }

    Ok(())
}
