//! Filter, search and ordering evaluation over JSON rows.

use std::cmp::Ordering;

use serde_json::Value;

use crate::domain::ports::{lookup, value_as_f64, Filter, FilterOp, Row, SortDirection, TextSearch};
use crate::shared::parse_timestamp;

/// Compare two scalars the way a typed column would: numbers numerically,
/// timestamps chronologically, everything else as text. `None` for nulls.
pub fn compare(a: &Value, b: &Value) -> Option<Ordering> {
    if a.is_null() || b.is_null() {
        return None;
    }
    if let (Some(x), Some(y)) = (value_as_f64(a), value_as_f64(b)) {
        return x.partial_cmp(&y);
    }
    match (a, b) {
        (Value::Bool(x), Value::Bool(y)) => Some(x.cmp(y)),
        (Value::String(x), Value::String(y)) => match (parse_timestamp(x), parse_timestamp(y)) {
            (Some(tx), Some(ty)) => Some(tx.cmp(&ty)),
            _ => Some(x.cmp(y)),
        },
        _ => Some(scalar_text(a).cmp(&scalar_text(b))),
    }
}

/// Equality as a typed column sees it. Text against text is exact; a JSON
/// number on either side compares numerically, so `id = "4"` still matches.
pub fn equals(a: &Value, b: &Value) -> bool {
    match (a, b) {
        (Value::Null, _) | (_, Value::Null) => false,
        (Value::String(x), Value::String(y)) => x == y,
        (Value::Number(_), _) | (_, Value::Number(_)) => {
            match (value_as_f64(a), value_as_f64(b)) {
                (Some(x), Some(y)) => x == y,
                _ => false,
            }
        }
        (Value::Bool(x), Value::Bool(y)) => x == y,
        _ => scalar_text(a) == scalar_text(b),
    }
}

fn scalar_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// SQL LIKE: `%` any run, `_` one char, `\` escapes the next char.
pub fn like(text: &str, pattern: &str, case_insensitive: bool) -> bool {
    let (text, pattern): (Vec<char>, Vec<char>) = if case_insensitive {
        (
            text.to_lowercase().chars().collect(),
            pattern.to_lowercase().chars().collect(),
        )
    } else {
        (text.chars().collect(), pattern.chars().collect())
    };

    // Tokenize so escapes are resolved once.
    enum Token {
        Any,
        One,
        Lit(char),
    }
    let mut tokens = Vec::with_capacity(pattern.len());
    let mut chars = pattern.into_iter();
    while let Some(c) = chars.next() {
        tokens.push(match c {
            '%' => Token::Any,
            '_' => Token::One,
            '\\' => Token::Lit(chars.next().unwrap_or('\\')),
            c => Token::Lit(c),
        });
    }

    // matched[j]: the first i text chars match the first j tokens
    let mut matched = vec![false; tokens.len() + 1];
    matched[0] = true;
    for (j, token) in tokens.iter().enumerate() {
        if matches!(token, Token::Any) {
            matched[j + 1] = matched[j];
        }
    }
    for ch in text {
        let mut next = vec![false; tokens.len() + 1];
        for (j, token) in tokens.iter().enumerate() {
            next[j + 1] = match token {
                Token::Any => next[j] || matched[j + 1],
                Token::One => matched[j],
                Token::Lit(l) => matched[j] && *l == ch,
            };
        }
        matched = next;
    }
    matched[tokens.len()]
}

pub fn matches_filter(row: &Row, filter: &Filter) -> bool {
    let Some(value) = lookup(row, &filter.column) else {
        return false;
    };
    match filter.op {
        FilterOp::Eq => equals(value, &filter.value),
        FilterOp::Gte => matches!(
            compare(value, &filter.value),
            Some(Ordering::Greater | Ordering::Equal)
        ),
        FilterOp::Lte => matches!(
            compare(value, &filter.value),
            Some(Ordering::Less | Ordering::Equal)
        ),
        FilterOp::Like | FilterOp::ILike => {
            let (Some(pattern), false) = (filter.value.as_str(), value.is_null()) else {
                return false;
            };
            like(&scalar_text(value), pattern, filter.op == FilterOp::ILike)
        }
    }
}

pub fn matches_search(row: &Row, search: &TextSearch) -> bool {
    let needle = search.text.to_lowercase();
    search.columns.iter().any(|column| match lookup(row, column) {
        Some(Value::Null) | None => false,
        Some(value) => scalar_text(value).to_lowercase().contains(&needle),
    })
}

/// Nulls sort last ascending and first descending.
pub fn order_rows(rows: &mut [Row], column: &str, direction: SortDirection) {
    rows.sort_by(|a, b| {
        let ordering = match (lookup(a, column), lookup(b, column)) {
            (None | Some(Value::Null), None | Some(Value::Null)) => Ordering::Equal,
            (None | Some(Value::Null), _) => Ordering::Greater,
            (_, None | Some(Value::Null)) => Ordering::Less,
            (Some(x), Some(y)) => compare(x, y).unwrap_or(Ordering::Equal),
        };
        match direction {
            SortDirection::Asc => ordering,
            SortDirection::Desc => ordering.reverse(),
        }
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn row(value: Value) -> Row {
        value.as_object().cloned().unwrap()
    }

    #[test]
    fn test_like_wildcards_and_escapes() {
        assert!(like("Jane.Doe@x.org", "jane.doe@x.org", true));
        assert!(!like("Jane.Doe@x.org", "jane.doe@x.org", false));
        assert!(like("abc", "a%", false));
        assert!(like("abc", "%c", false));
        assert!(like("abc", "a_c", false));
        assert!(!like("abbc", "a_c", false));
        assert!(like("100%", "100\\%", false));
        assert!(!like("1000", "100\\%", false));
        assert!(like("", "%", false));
    }

    #[test]
    fn test_compare_mixed_date_formats() {
        let a = json!("2024-03-01");
        let b = json!("2024-03-01T00:00:00+00:00");
        assert_eq!(compare(&a, &b), Some(Ordering::Equal));
        assert_eq!(compare(&json!("2024-02-28 23:00:00"), &b), Some(Ordering::Less));
        assert_eq!(compare(&json!(10), &json!("9")), Some(Ordering::Greater));
        assert_eq!(compare(&json!(null), &json!(1)), None);
    }

    #[test]
    fn test_eq_compares_text_exactly() {
        let r = row(json!({"id": 4, "title": "1.0", "content": "2024-01-05"}));
        assert!(matches_filter(&r, &Filter::eq("title", "1.0")));
        assert!(!matches_filter(&r, &Filter::eq("title", "1")));
        assert!(!matches_filter(&r, &Filter::eq("content", "2024-01-05T00:00:00Z")));
        assert!(matches_filter(&r, &Filter::eq("id", "4")));
        assert!(matches_filter(&r, &Filter::eq("id", 4)));
        assert!(!matches_filter(&r, &Filter::eq("id", "4x")));
        assert!(matches_filter(&r, &Filter::gte("content", "2024-01-05T00:00:00Z")));
    }

    #[test]
    fn test_filters_on_embedded_columns() {
        let r = row(json!({"status": "Scheduled", "patients": {"last_name": "Smith"}}));
        assert!(matches_filter(&r, &Filter::eq("status", "Scheduled")));
        assert!(matches_filter(&r, &Filter::ilike("patients.last_name", "smi%")));
        assert!(!matches_filter(&r, &Filter::eq("missing", "x")));
    }

    #[test]
    fn test_order_rows_puts_nulls_last() {
        let mut rows = vec![
            row(json!({"n": 2})),
            row(json!({"n": null})),
            row(json!({"n": 1})),
        ];
        order_rows(&mut rows, "n", SortDirection::Asc);
        let ns: Vec<Value> = rows.iter().map(|r| r["n"].clone()).collect();
        assert_eq!(ns, vec![json!(1), json!(2), json!(null)]);
    }
}
