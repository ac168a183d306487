//! Translation of backend-neutral queries into PostgREST URL parameters.

use serde_json::Value;

use crate::domain::ports::{
    escape_like, Columns, Filter, FilterOp, Projection, RowRange, SortSpec, TextSearch,
};

pub type Params = Vec<(String, String)>;

/// `*,patients(first_name,last_name)`
pub fn select_param(projection: &Projection) -> String {
    let mut parts: Vec<String> = match &projection.columns {
        Columns::All => vec!["*".to_string()],
        Columns::Only(columns) => columns.clone(),
    };
    for embed in &projection.embeds {
        let columns = if embed.columns.is_empty() {
            "*".to_string()
        } else {
            embed.columns.join(",")
        };
        parts.push(format!("{}({})", embed.table, columns));
    }
    parts.join(",")
}

fn render_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// `(column, "op.value")`; a null equality becomes `is.null`.
pub fn filter_param(filter: &Filter) -> (String, String) {
    let rendered = match (filter.op, &filter.value) {
        (FilterOp::Eq, Value::Null) => "is.null".to_string(),
        (op, value) => format!("{}.{}", op.as_str(), render_value(value)),
    };
    (filter.column.clone(), rendered)
}

/// Double-quote a value inside a logic tree so `,` `(` `)` stay literal.
fn quote(raw: &str) -> String {
    format!("\"{}\"", raw.replace('\\', "\\\\").replace('"', "\\\""))
}

/// `("or", "(a.ilike.\"%x%\",b.ilike.\"%x%\")")`; the text matches literally.
pub fn search_param(search: &TextSearch) -> (String, String) {
    let pattern = quote(&format!("%{}%", escape_like(&search.text)));
    let predicates: Vec<String> = search
        .columns
        .iter()
        .map(|column| format!("{}.ilike.{}", column, pattern))
        .collect();
    ("or".to_string(), format!("({})", predicates.join(",")))
}

/// `status.desc`, or `patients(last_name).asc` for an embedded column.
pub fn order_param(sort: &SortSpec) -> (String, String) {
    let target = match sort.referenced() {
        Some((relation, column)) => format!("{}({})", relation, column),
        None => sort.column.clone(),
    };
    (
        "order".to_string(),
        format!("{}.{}", target, sort.direction.as_str()),
    )
}

pub fn range_params(range: RowRange) -> Params {
    vec![
        ("offset".to_string(), range.offset.to_string()),
        ("limit".to_string(), range.limit.to_string()),
    ]
}

pub fn where_params(filters: &[Filter], search: Option<&TextSearch>) -> Params {
    let mut params: Params = filters.iter().map(filter_param).collect();
    if let Some(search) = search {
        params.push(search_param(search));
    }
    params
}

/// Total from a `Content-Range` header: `0-19/42` or `*/42`.
pub fn parse_content_range(header: &str) -> Option<u64> {
    let (_, total) = header.trim().rsplit_once('/')?;
    total.parse().ok()
}

/// Table names become URL path segments; only plain identifiers pass.
pub fn is_valid_table(name: &str) -> bool {
    !name.is_empty()
        && name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_')
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ports::SortDirection;
    use serde_json::json;

    #[test]
    fn test_select_param_with_embeds() {
        let projection = Projection::all()
            .embed("patients", ["first_name", "last_name"])
            .embed("employees", Vec::<String>::new());
        assert_eq!(
            select_param(&projection),
            "*,patients(first_name,last_name),employees(*)"
        );
        assert_eq!(
            select_param(&Projection::columns(["medication_id", "generic_name"])),
            "medication_id,generic_name"
        );
    }

    #[test]
    fn test_filter_params() {
        assert_eq!(
            filter_param(&Filter::gte("admission_date", "2024-03-01T00:00:00Z")),
            ("admission_date".into(), "gte.2024-03-01T00:00:00Z".into())
        );
        assert_eq!(
            filter_param(&Filter::eq("id", 4)),
            ("id".into(), "eq.4".into())
        );
        assert_eq!(
            filter_param(&Filter::eq("title", json!(null))),
            ("title".into(), "is.null".into())
        );
    }

    #[test]
    fn test_search_param_quotes_and_escapes() {
        let search = TextSearch::new("O'Neil, 50%", ["last_name", "patients.first_name"]).unwrap();
        let (key, value) = search_param(&search);
        assert_eq!(key, "or");
        assert_eq!(
            value,
            r#"(last_name.ilike."%O'Neil, 50\\%%",patients.first_name.ilike."%O'Neil, 50\\%%")"#
        );
    }

    #[test]
    fn test_order_param_for_embedded_column() {
        let sort = SortSpec::new("patients.last_name", SortDirection::Desc);
        assert_eq!(
            order_param(&sort),
            ("order".into(), "patients(last_name).desc".into())
        );
        let sort = SortSpec::new("status", SortDirection::Asc);
        assert_eq!(order_param(&sort).1, "status.asc");
    }

    #[test]
    fn test_parse_content_range() {
        assert_eq!(parse_content_range("0-19/42"), Some(42));
        assert_eq!(parse_content_range("*/0"), Some(0));
        assert_eq!(parse_content_range("0-19/*"), None);
        assert_eq!(parse_content_range("garbage"), None);
    }

    #[test]
    fn test_table_names() {
        assert!(is_valid_table("billing_and_insurance"));
        assert!(!is_valid_table("../auth"));
        assert!(!is_valid_table(""));
    }
}
