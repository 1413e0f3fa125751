//! Wire format - flat `f`/`l`/`q`/`n` request parameters
//!
//! Every row contributes one `f` per selected field, one `l`, one `q`, and an
//! `n` only when negated. Each value carries a `"{card}.{row}."` prefix so
//! the decoder can regroup entries regardless of their order.

use std::collections::BTreeMap;
use tracing::{debug, warn};
use url::form_urlencoded;

use crate::catalog::{Lookup, SearchModel};
use crate::error::{QueryError, Result};
use crate::query::{Card, Row, SearchExpression, DEFAULT_MULTI_SIZE};

pub const FIELD_KEY: &str = "f";
pub const LOOKUP_KEY: &str = "l";
pub const QUERY_KEY: &str = "q";
pub const NEGATE_KEY: &str = "n";

/// A single request parameter
pub type Param = (String, String);

/// Flatten a search into request parameters, in card, row, field order
pub fn encode(expr: &SearchExpression) -> Vec<Param> {
    let mut params = Vec::new();

    for row in expr.rows() {
        let prefix = format!("{}.{}.", row.card_index, row.row_index);
        for field in &row.selected_fields {
            params.push((FIELD_KEY.to_string(), format!("{}{}", prefix, field)));
        }
        params.push((LOOKUP_KEY.to_string(), format!("{}{}", prefix, row.lookup)));
        params.push((QUERY_KEY.to_string(), format!("{}{}", prefix, row.value)));
        if row.negate {
            params.push((NEGATE_KEY.to_string(), format!("{}1", prefix)));
        }
    }

    debug!(params = params.len(), cards = expr.cards.len(), "encoded search");
    params
}

/// Rebuild a search from request parameters.
///
/// Fails on the first prefix that is not two integers, and on any row with
/// a missing or repeated `l`/`q`, or a repeated `n`. Keys other than
/// `f`/`l`/`q`/`n` are ignored.
pub fn decode<I, K, V>(params: I, model: SearchModel) -> Result<SearchExpression>
where
    I: IntoIterator<Item = (K, V)>,
    K: AsRef<str>,
    V: AsRef<str>,
{
    let (expr, problems) = decode_inner(params, model, true);
    match problems.into_iter().next() {
        Some(err) => Err(err),
        None => Ok(expr),
    }
}

/// Like [`decode`], but skips bad entries and rows instead of failing.
///
/// Used when restoring a search from a URL the user may have edited; the
/// skipped problems are returned for logging.
pub fn decode_lenient<I, K, V>(params: I, model: SearchModel) -> (SearchExpression, Vec<QueryError>)
where
    I: IntoIterator<Item = (K, V)>,
    K: AsRef<str>,
    V: AsRef<str>,
{
    let (expr, problems) = decode_inner(params, model, false);
    for problem in &problems {
        warn!(error = %problem, "skipped search parameter");
    }
    (expr, problems)
}

#[derive(Default)]
struct RowParts {
    fields: Vec<String>,
    lookups: Vec<String>,
    queries: Vec<String>,
    negates: Vec<String>,
}

fn decode_inner<I, K, V>(params: I, model: SearchModel, strict: bool) -> (SearchExpression, Vec<QueryError>)
where
    I: IntoIterator<Item = (K, V)>,
    K: AsRef<str>,
    V: AsRef<str>,
{
    let mut problems = Vec::new();
    let mut groups: BTreeMap<(u32, u32), RowParts> = BTreeMap::new();

    for (key, value) in params {
        let key = key.as_ref();
        if ![FIELD_KEY, LOOKUP_KEY, QUERY_KEY, NEGATE_KEY].contains(&key) {
            continue;
        }

        let (card, row, payload) = match split_prefix(value.as_ref()) {
            Ok(parts) => parts,
            Err(e) => {
                problems.push(e);
                if strict {
                    return (SearchExpression::empty(model), problems);
                }
                continue;
            }
        };

        let parts = groups.entry((card, row)).or_default();
        let bucket = match key {
            FIELD_KEY => &mut parts.fields,
            LOOKUP_KEY => &mut parts.lookups,
            QUERY_KEY => &mut parts.queries,
            _ => &mut parts.negates,
        };
        bucket.push(payload.to_string());
    }

    let mut cards: BTreeMap<u32, Vec<Row>> = BTreeMap::new();
    for ((card, row), parts) in groups {
        match build_row(card, row, parts) {
            Ok(row) => cards.entry(card).or_default().push(row),
            Err(e) => {
                problems.push(e);
                if strict {
                    return (SearchExpression::empty(model), problems);
                }
            }
        }
    }

    let mut built = Vec::with_capacity(cards.len());
    for (index, rows) in cards {
        match Card::from_rows(index, model, rows) {
            Ok(card) => built.push(card),
            Err(e) => {
                problems.push(e);
                if strict {
                    return (SearchExpression::empty(model), problems);
                }
            }
        }
    }

    match SearchExpression::from_cards(model, built) {
        Ok(expr) => (expr, problems),
        Err(e) => {
            problems.push(e);
            (SearchExpression::empty(model), problems)
        }
    }
}

/// Split `"{card}.{row}.{payload}"`. The payload may itself contain dots.
fn split_prefix(value: &str) -> Result<(u32, u32, &str)> {
    let mut parts = value.splitn(3, '.');
    let (card, row, payload) = match (parts.next(), parts.next(), parts.next()) {
        (Some(card), Some(row), Some(payload)) => (card, row, payload),
        _ => return Err(QueryError::malformed(format!("missing card/row prefix in '{}'", value))),
    };

    let card = parse_index(card).ok_or_else(|| {
        QueryError::malformed(format!("bad card index in '{}'", value))
    })?;
    let row = parse_index(row).ok_or_else(|| {
        QueryError::malformed(format!("bad row index in '{}'", value))
    })?;

    Ok((card, row, payload))
}

/// Plain decimal digits only, so the prefix re-encodes byte for byte.
/// `u32::MAX` is refused since the card or row after it has no index.
fn parse_index(raw: &str) -> Option<u32> {
    if raw.is_empty() || !raw.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    raw.parse().ok().filter(|&index| index < u32::MAX)
}

fn build_row(card: u32, row: u32, parts: RowParts) -> Result<Row> {
    let single = |values: Vec<String>, key: &str| -> Result<String> {
        let count = values.len();
        match <[String; 1]>::try_from(values) {
            Ok([value]) => Ok(value),
            Err(_) => Err(QueryError::malformed(format!(
                "{}.{}: expected one '{}' entry, found {}",
                card, row, key, count
            ))),
        }
    };

    let lookup = single(parts.lookups, LOOKUP_KEY)?;
    let value = single(parts.queries, QUERY_KEY)?;
    if parts.negates.len() > 1 {
        return Err(QueryError::malformed(format!(
            "{}.{}: repeated '{}' entry",
            card, row, NEGATE_KEY
        )));
    }

    let mut fields: Vec<String> = Vec::with_capacity(parts.fields.len());
    for field in parts.fields {
        if !fields.contains(&field) {
            fields.push(field);
        }
    }
    let multi = fields.len() > 1;

    Ok(Row {
        card_index: card,
        row_index: row,
        selected_fields: fields,
        lookup: Lookup::parse(&lookup),
        value,
        negate: !parts.negates.is_empty(),
        multi,
        list_size: if multi { DEFAULT_MULTI_SIZE } else { 1 },
    })
}

/// Serialize parameters as `application/x-www-form-urlencoded`.
/// The same string serves as a GET query string or a POST body.
pub fn to_query_string(params: &[Param]) -> String {
    form_urlencoded::Serializer::new(String::new())
        .extend_pairs(params.iter().map(|(k, v)| (k.as_str(), v.as_str())))
        .finish()
}

/// Parse a query string, a form body, or a full URL with a query part
pub fn parse_query_string(input: &str) -> Vec<Param> {
    let query = input.split_once('?').map(|(_, q)| q).unwrap_or(input);
    let query = query.split('#').next().unwrap_or_default();

    form_urlencoded::parse(query.as_bytes())
        .map(|(k, v)| (k.into_owned(), v.into_owned()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{builtin_catalog, Catalog, LookupCatalog};

    fn catalog() -> Catalog {
        Catalog::new(builtin_catalog(SearchModel::Inventory), LookupCatalog::default())
    }

    fn pairs(raw: &[(&str, &str)]) -> Vec<Param> {
        raw.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect()
    }

    /// Two cards; the first has a negated multi-field row and a row whose
    /// value contains dots, the second has had a row removed.
    fn sample() -> SearchExpression {
        let catalog = catalog();
        let mut expr = SearchExpression::new(&catalog);

        let row = expr.row_mut(1, 0).unwrap();
        row.set_multiplicity(6);
        row.select_fields(vec!["part__name".to_string(), "serial_number".to_string()]);
        row.set_value("CTD");
        row.set_negate(true);

        let second = expr.add_row(1, &catalog).unwrap();
        let row = expr.row_mut(1, second).unwrap();
        row.select_fields(vec!["part__unit_cost".to_string()]);
        row.set_lookup(Lookup::Gte);
        row.set_value("10.5");

        let card = expr.add_card(&catalog).unwrap();
        expr.add_row(card, &catalog).unwrap();
        expr.add_row(card, &catalog).unwrap();
        expr.remove_row(card, 1).unwrap();
        for row in expr.card_mut(card).unwrap().rows.iter_mut() {
            row.select_fields(vec!["location__name".to_string()]);
            row.set_value("Lab");
        }

        expr
    }

    #[test]
    fn test_encode_layout() {
        let params = encode(&sample());

        assert_eq!(
            &params[..6],
            &pairs(&[
                ("f", "1.0.part__name"),
                ("f", "1.0.serial_number"),
                ("l", "1.0.icontains"),
                ("q", "1.0.CTD"),
                ("n", "1.0.1"),
                ("f", "1.1.part__unit_cost"),
            ])[..]
        );
        assert!(!params.iter().any(|(k, v)| k == "n" && v.starts_with("1.1.")));
        assert!(params.iter().any(|(_, v)| v == "2.2.Lab"));
    }

    #[test]
    fn test_decode_inverts_encode() {
        let expr = sample();
        let decoded = decode(encode(&expr), SearchModel::Inventory).unwrap();

        assert_eq!(decoded, expr);
        let indices: Vec<u32> = decoded.cards[1].rows.iter().map(|r| r.row_index).collect();
        assert_eq!(indices, vec![0, 2]);
    }

    #[test]
    fn test_rehydrate_then_reencode_is_identical() {
        let catalog = catalog();
        let original = to_query_string(&encode(&sample()));

        let decoded = decode(parse_query_string(&original), SearchModel::Inventory).unwrap();
        let restored = SearchExpression::rehydrate(&decoded.to_saved(), &catalog);

        assert_eq!(to_query_string(&encode(&restored)), original);
    }

    #[test]
    fn test_decode_is_order_independent() {
        let params = pairs(&[
            ("q", "3.1.2021-01-01"),
            ("l", "3.1.gte"),
            ("q", "0.0.a.b.c"),
            ("f", "3.1.created_at"),
            ("l", "0.0.exact"),
            ("f", "0.0.serial_number"),
            ("trashtog", "on"),
        ]);

        let expr = decode(params, SearchModel::Inventory).unwrap();

        assert_eq!(expr.cards.len(), 2);
        assert_eq!(expr.cards[0].rows[0].value, "a.b.c");
        assert_eq!(expr.cards[1].index, 3);
        assert_eq!(expr.cards[1].rows[0].lookup, Lookup::Gte);
        assert_eq!(expr.next_card_index(), 4);
    }

    #[test]
    fn test_decode_rejects_malformed() {
        let bad_prefix = pairs(&[("f", "x.0.name"), ("l", "x.0.exact"), ("q", "x.0.")]);
        assert!(matches!(
            decode(bad_prefix, SearchModel::Part),
            Err(QueryError::MalformedParameter(_))
        ));

        let no_prefix = pairs(&[("q", "nothing")]);
        assert!(decode(no_prefix, SearchModel::Part).is_err());

        let two_lookups = pairs(&[
            ("f", "0.0.name"),
            ("l", "0.0.exact"),
            ("l", "0.0.icontains"),
            ("q", "0.0.x"),
        ]);
        assert!(decode(two_lookups, SearchModel::Part).is_err());

        let missing_query = pairs(&[("f", "0.0.name"), ("l", "0.0.exact")]);
        assert!(decode(missing_query, SearchModel::Part).is_err());
    }

    #[test]
    fn test_decode_rejects_signed_prefix() {
        for prefix in ["+1.0.", "1.+0.", "-1.0.", " 1.0."] {
            let params = pairs(&[
                ("f", &format!("{}name", prefix)),
                ("l", &format!("{}exact", prefix)),
                ("q", &format!("{}x", prefix)),
            ]);
            assert!(
                matches!(
                    decode(params, SearchModel::Part),
                    Err(QueryError::MalformedParameter(_))
                ),
                "{} should be rejected",
                prefix
            );
        }
    }

    #[test]
    fn test_decode_rejects_index_without_successor() {
        let max_card = pairs(&[
            ("f", "4294967295.0.name"),
            ("l", "4294967295.0.exact"),
            ("q", "4294967295.0."),
        ]);
        assert!(matches!(
            decode(max_card, SearchModel::Part),
            Err(QueryError::MalformedParameter(_))
        ));

        let params = pairs(&[
            ("f", "0.4294967295.name"),
            ("l", "0.4294967295.exact"),
            ("q", "0.4294967295."),
            ("f", "0.0.name"),
            ("l", "0.0.exact"),
            ("q", "0.0.CTD"),
        ]);
        let (mut expr, problems) = decode_lenient(params, SearchModel::Part);

        assert_eq!(problems.len(), 3);
        assert_eq!(expr.cards.len(), 1);
        assert_eq!(expr.cards[0].rows.len(), 1);
        assert_eq!(expr.cards[0].next_row_index(), 1);

        let catalog = Catalog::new(builtin_catalog(SearchModel::Part), LookupCatalog::default());
        assert_eq!(expr.add_row(0, &catalog).unwrap(), 1);
        assert_eq!(expr.add_card(&catalog).unwrap(), 1);
    }

    #[test]
    fn test_decode_lenient_skips_bad_rows() {
        let params = pairs(&[
            ("f", "0.0.name"),
            ("l", "0.0.exact"),
            ("q", "0.0.CTD"),
            ("f", ".0.name"),
            ("f", "0.1.name"),
            ("l", "0.1.exact"),
            ("q", "0.1.a"),
            ("q", "0.1.b"),
        ]);

        let (expr, problems) = decode_lenient(params, SearchModel::Part);

        assert_eq!(problems.len(), 2);
        assert_eq!(expr.cards.len(), 1);
        assert_eq!(expr.cards[0].rows.len(), 1);
        assert_eq!(expr.cards[0].rows[0].value, "CTD");
    }

    #[test]
    fn test_query_string_escaping() {
        let params = pairs(&[("f", "0.0.name"), ("l", "0.0.icontains"), ("q", "0.0.a&b c")]);
        let qs = to_query_string(&params);

        assert_eq!(qs, "f=0.0.name&l=0.0.icontains&q=0.0.a%26b+c");
        assert_eq!(parse_query_string(&format!("/search/parts?{}#top", qs)), params);
    }
}
