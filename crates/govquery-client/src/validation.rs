//! Heuristic SQL validation and formatting
//!
//! This is a cheap local pre-filter, not a parser. It checks the leading
//! keyword, parenthesis balance and the presence of `FROM` in a `SELECT`.
//! Many syntactically invalid statements pass; callers that need a real
//! verdict should use the backend's `/parse-sql` endpoint.

use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Leading keywords a statement may start with
const STATEMENT_KEYWORDS: &[&str] = &[
    "SELECT",
    "FROM",
    "WHERE",
    "HAVING",
    "LIMIT",
    "INSERT",
    "UPDATE",
    "DELETE",
    "CREATE",
    "DROP",
    "ALTER",
    "INDEX",
    "JOIN",
    "UNION",
    "INTERSECT",
    "EXCEPT",
    "WITH",
    "AS",
    "ON",
    "AND",
    "OR",
    "NOT",
    "IN",
    "EXISTS",
    "BETWEEN",
    "LIKE",
    "COUNT",
    "SUM",
    "AVG",
    "MIN",
    "MAX",
    "DISTINCT",
    "ALL",
];

static WHITESPACE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s+").expect("invalid whitespace regex"));

static COMMA: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s*,\s*").expect("invalid comma regex"));

static CLAUSE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\s+(SELECT|FROM|WHERE|GROUP\s+BY|ORDER\s+BY|HAVING|LIMIT)\s+")
        .expect("invalid clause regex")
});

static JOIN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\s+((?:(?:LEFT|RIGHT|FULL|INNER|CROSS)\s+)?(?:OUTER\s+)?JOIN)\s+")
        .expect("invalid join regex")
});

static LOGICAL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\s+(AND|OR)\s+").expect("invalid logical regex"));

static COLUMNS: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?is)\bSELECT\s+(.*?)\s+FROM\b").expect("invalid columns regex")
});

static FROM_TABLE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\bFROM\s+(\w+(?:\.\w+)*)").expect("invalid from regex"));

static WHERE_CLAUSE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?is)\bWHERE\s+(.*?)(?:\s+GROUP\s+BY\b|\s+ORDER\s+BY\b|\s+HAVING\b|\s+LIMIT\b|$)")
        .expect("invalid where regex")
});

static GROUP_BY: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?is)\bGROUP\s+BY\s+(.*?)(?:\s+ORDER\s+BY\b|\s+HAVING\b|\s+LIMIT\b|$)")
        .expect("invalid group by regex")
});

static ORDER_BY: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?is)\bORDER\s+BY\s+(.*?)(?:\s+LIMIT\b|$)").expect("invalid order by regex")
});

static LIMIT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\bLIMIT\s+(\d+)").expect("invalid limit regex"));

/// Reasons the local validator rejects a statement
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SqlValidationError {
    #[error("Empty SQL query")]
    EmptyInput,

    #[error("Invalid SQL statement. Must start with a valid keyword, got: {0}")]
    InvalidKeyword(String),

    #[error("Mismatched parentheses")]
    UnbalancedParentheses,

    #[error("SELECT statement must include {0} clause")]
    MissingRequiredClause(&'static str),
}

/// Flat record of clause boundaries; not an expression tree
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShallowAst {
    /// Leading keyword, uppercased
    pub statement: String,
    pub columns: Vec<String>,
    pub from: Option<String>,
    #[serde(rename = "where")]
    pub where_clause: Option<String>,
    pub group_by: Option<String>,
    pub order_by: Option<String>,
    pub limit: Option<String>,
}

/// Validation verdict in wire form.
///
/// `ast` is only present when `valid`. The AST type defaults to the local
/// [`ShallowAst`]; the remote parser's tree decodes as `serde_json::Value`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SqlParseResult<A = ShallowAst> {
    pub valid: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub formatted_sql: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ast: Option<A>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Accepted statement: formatted text plus shallow AST
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedSql {
    pub formatted_sql: String,
    pub ast: ShallowAst,
}

/// Flattened verdict for callers that only need pass/fail plus messages
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationSummary {
    pub valid: bool,
    pub errors: Vec<String>,
}

/// Validate a statement and derive its formatted text and shallow AST.
///
/// Heuristic only: acceptance does not mean the backend will accept the SQL.
pub fn parse_sql(sql: &str) -> Result<ParsedSql, SqlValidationError> {
    let cleaned = strip_sql_comments(sql);
    let trimmed = cleaned.trim();

    let Some(first) = trimmed.split_whitespace().next() else {
        return Err(SqlValidationError::EmptyInput);
    };

    let statement = first.to_uppercase();
    if !STATEMENT_KEYWORDS.contains(&statement.as_str()) {
        return Err(SqlValidationError::InvalidKeyword(statement));
    }

    if !parentheses_balanced(trimmed) {
        return Err(SqlValidationError::UnbalancedParentheses);
    }

    if statement == "SELECT" && !trimmed.to_uppercase().contains("FROM") {
        return Err(SqlValidationError::MissingRequiredClause("FROM"));
    }

    Ok(ParsedSql {
        formatted_sql: format_cleaned(trimmed),
        ast: extract_ast(trimmed, statement),
    })
}

/// Validate a statement, reporting rejection as data.
///
/// Heuristic only: see [`parse_sql`].
pub fn validate_sql(sql: &str) -> SqlParseResult {
    match parse_sql(sql) {
        Ok(parsed) => SqlParseResult {
            valid: true,
            formatted_sql: Some(parsed.formatted_sql),
            ast: Some(parsed.ast),
            error: None,
        },
        Err(e) => SqlParseResult {
            valid: false,
            formatted_sql: None,
            ast: None,
            error: Some(e.to_string()),
        },
    }
}

pub fn validate_sql_summary(sql: &str) -> ValidationSummary {
    let result = validate_sql(sql);
    ValidationSummary {
        valid: result.valid,
        errors: result.error.into_iter().collect(),
    }
}

/// Cosmetic reformatting: one clause per line, one list item per line.
///
/// Comments are dropped and whitespace outside string literals is
/// normalized. Formatting formatted output returns it unchanged.
pub fn format_sql(sql: &str) -> String {
    format_cleaned(strip_sql_comments(sql).trim())
}

fn format_cleaned(sql: &str) -> String {
    let mut out = String::with_capacity(sql.len() + 16);

    for (quoted, segment) in split_quoted(sql) {
        if quoted {
            out.push_str(segment);
            continue;
        }

        let s = WHITESPACE.replace_all(segment, " ");
        let s = COMMA.replace_all(&s, ",\n  ");
        let s = CLAUSE.replace_all(&s, "\n$1 ");
        let s = JOIN.replace_all(&s, "\n$1 ");
        let s = LOGICAL.replace_all(&s, "\n  $1 ");
        out.push_str(&s);
    }

    out.trim().to_string()
}

/// Whitespace-collapsed single-line form used for clause extraction
fn normalize(sql: &str) -> String {
    let mut out = String::with_capacity(sql.len());
    for (quoted, segment) in split_quoted(sql) {
        if quoted {
            out.push_str(segment);
        } else {
            out.push_str(&WHITESPACE.replace_all(segment, " "));
        }
    }
    out.trim().trim_end_matches(';').trim_end().to_string()
}

fn extract_ast(sql: &str, statement: String) -> ShallowAst {
    let normalized = normalize(sql);
    let capture = |re: &Regex| {
        re.captures(&normalized)
            .and_then(|c| c.get(1))
            .map(|m| m.as_str().trim().to_string())
            .filter(|s| !s.is_empty())
    };

    let columns = capture(&COLUMNS)
        .map(|list| split_top_level(&list))
        .unwrap_or_default();

    ShallowAst {
        statement,
        columns,
        from: capture(&FROM_TABLE),
        where_clause: capture(&WHERE_CLAUSE),
        group_by: capture(&GROUP_BY),
        order_by: capture(&ORDER_BY),
        limit: capture(&LIMIT),
    }
}

/// Split on commas that sit outside parentheses and string literals
fn split_top_level(list: &str) -> Vec<String> {
    let mut items = Vec::new();
    let mut current = String::new();
    let mut depth: u32 = 0;
    let mut quote: Option<char> = None;

    for c in list.chars() {
        match (quote, c) {
            (Some(q), _) if c == q => quote = None,
            (Some(_), _) => {}
            (None, '\'' | '"') => quote = Some(c),
            (None, '(') => depth += 1,
            (None, ')') => depth = depth.saturating_sub(1),
            (None, ',') if depth == 0 => {
                items.push(std::mem::take(&mut current));
                continue;
            }
            (None, _) => {}
        }
        current.push(c);
    }
    items.push(current);

    items
        .into_iter()
        .map(|item| item.trim().to_string())
        .filter(|item| !item.is_empty())
        .collect()
}

/// Depth never goes negative and ends at zero; parentheses inside closed
/// string literals are ignored, an unterminated literal still counts
fn parentheses_balanced(sql: &str) -> bool {
    let mut depth: u32 = 0;

    for (quoted, segment) in split_quoted(sql) {
        if quoted && is_closed_literal(segment) {
            continue;
        }
        for c in segment.chars() {
            match c {
                '(' => depth += 1,
                ')' => {
                    let Some(next) = depth.checked_sub(1) else {
                        return false;
                    };
                    depth = next;
                }
                _ => {}
            }
        }
    }

    depth == 0
}

fn is_closed_literal(segment: &str) -> bool {
    let mut chars = segment.chars();
    match (chars.next(), chars.next_back()) {
        (Some(open), Some(close)) => open == close,
        _ => false,
    }
}

/// Split into alternating unquoted and quoted (`'...'` or `"..."`) slices.
///
/// An unterminated literal runs to the end of the input.
fn split_quoted(sql: &str) -> Vec<(bool, &str)> {
    let mut segments = Vec::new();
    let mut start = 0;
    let mut quote: Option<char> = None;

    for (i, c) in sql.char_indices() {
        match quote {
            None if c == '\'' || c == '"' => {
                if i > start {
                    segments.push((false, &sql[start..i]));
                }
                start = i;
                quote = Some(c);
            }
            Some(q) if c == q => {
                let end = i + c.len_utf8();
                segments.push((true, &sql[start..end]));
                start = end;
                quote = None;
            }
            _ => {}
        }
    }

    if start < sql.len() {
        segments.push((quote.is_some(), &sql[start..]));
    }

    segments
}

/// Strip SQL comments (both -- and /* */ style)
pub fn strip_sql_comments(sql: &str) -> String {
    let mut result = String::with_capacity(sql.len());
    let mut chars = sql.chars().peekable();
    let mut in_single_quote = false;
    let mut in_double_quote = false;

    while let Some(c) = chars.next() {
        // Track string literals to avoid stripping inside them
        if c == '\'' && !in_double_quote {
            in_single_quote = !in_single_quote;
            result.push(c);
            continue;
        }
        if c == '"' && !in_single_quote {
            in_double_quote = !in_double_quote;
            result.push(c);
            continue;
        }

        if in_single_quote || in_double_quote {
            result.push(c);
            continue;
        }

        if c == '-' && chars.peek() == Some(&'-') {
            chars.next();
            for ch in chars.by_ref() {
                if ch == '\n' {
                    result.push(' ');
                    break;
                }
            }
            continue;
        }

        if c == '/' && chars.peek() == Some(&'*') {
            chars.next();
            while let Some(ch) = chars.next() {
                if ch == '*' && chars.peek() == Some(&'/') {
                    chars.next();
                    result.push(' ');
                    break;
                }
            }
            continue;
        }

        result.push(c);
    }

    result
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_accepts_simple_select() {
        let result = validate_sql("SELECT a, b FROM t LIMIT 3");
        assert!(result.valid);
        assert!(result.error.is_none());

        let ast = result.ast.unwrap();
        assert_eq!(ast.statement, "SELECT");
        assert_eq!(ast.from.as_deref(), Some("t"));
        assert_eq!(ast.limit.as_deref(), Some("3"));
        assert_eq!(ast.columns, vec!["a", "b"]);
        assert!(ast.where_clause.is_none());
    }

    #[test]
    fn test_rejects_bad_keyword() {
        let result = validate_sql("FOO BAR");
        assert!(!result.valid);
        assert!(result.ast.is_none());
        assert!(result.error.unwrap().contains("FOO"));

        assert_eq!(
            parse_sql("foo bar").unwrap_err(),
            SqlValidationError::InvalidKeyword("FOO".into())
        );
    }

    #[test]
    fn test_rejects_unbalanced_parentheses() {
        let result = validate_sql("SELECT a FROM t WHERE (a=1");
        assert!(!result.valid);
        assert!(result.error.unwrap().to_lowercase().contains("parentheses"));
    }

    #[test]
    fn test_rejects_close_before_open() {
        assert_eq!(
            parse_sql("SELECT a FROM t WHERE )a = 1(").unwrap_err(),
            SqlValidationError::UnbalancedParentheses
        );
    }

    #[test]
    fn test_parentheses_inside_literals_ignored() {
        assert!(validate_sql("SELECT a FROM t WHERE b = ')'").valid);
        assert!(validate_sql("SELECT a FROM t WHERE b = '(' AND (c = 1)").valid);
    }

    #[test]
    fn test_parentheses_after_unterminated_literal_counted() {
        let result = validate_sql("SELECT a FROM t WHERE b = '(");
        assert!(!result.valid);
        assert_eq!(result.error.as_deref(), Some("Mismatched parentheses"));

        assert!(!validate_sql("SELECT a FROM t WHERE b = ')").valid);
        assert!(validate_sql("SELECT a FROM t WHERE b = '()").valid);
        assert!(validate_sql("SELECT a FROM t WHERE b = ''").valid);
    }

    #[test]
    fn test_rejects_select_without_from() {
        let result = validate_sql("SELECT a");
        assert!(!result.valid);
        assert!(result.error.unwrap().contains("FROM"));
        assert_eq!(
            parse_sql("select 1").unwrap_err(),
            SqlValidationError::MissingRequiredClause("FROM")
        );
    }

    #[test]
    fn test_rejects_empty_input() {
        assert_eq!(parse_sql("").unwrap_err(), SqlValidationError::EmptyInput);
        assert_eq!(parse_sql("   \n\t").unwrap_err(), SqlValidationError::EmptyInput);
        assert_eq!(
            parse_sql("-- just a comment").unwrap_err(),
            SqlValidationError::EmptyInput
        );
        assert_eq!(
            validate_sql("").error.as_deref(),
            Some("Empty SQL query")
        );
    }

    #[test]
    fn test_lowercase_keywords_accepted() {
        let parsed = parse_sql("select name from counties where pop > 100").unwrap();
        assert_eq!(parsed.ast.statement, "SELECT");
        assert_eq!(parsed.ast.from.as_deref(), Some("counties"));
        assert_eq!(parsed.ast.where_clause.as_deref(), Some("pop > 100"));
    }

    #[test]
    fn test_non_select_statements() {
        let insert = parse_sql("INSERT INTO t VALUES (1, 2)").unwrap();
        assert_eq!(insert.ast.statement, "INSERT");
        assert!(insert.ast.from.is_none());
        assert!(insert.ast.columns.is_empty());

        let delete = parse_sql("DELETE FROM t WHERE id = 1").unwrap();
        assert_eq!(delete.ast.statement, "DELETE");
        assert_eq!(delete.ast.from.as_deref(), Some("t"));
        assert_eq!(delete.ast.where_clause.as_deref(), Some("id = 1"));

        assert!(parse_sql("WITH x AS (SELECT 1 FROM d) SELECT * FROM x").is_ok());
    }

    #[test]
    fn test_heuristic_accepts_nonsense_with_right_shape() {
        // Pre-filter only: shape checks pass, so this is accepted
        assert!(validate_sql("SELECT FROM FROM FROM").valid);
    }

    #[test]
    fn test_full_clause_extraction() {
        let sql = "SELECT state, SUM(pop) FROM census WHERE year = 2020 AND pop > 0 \
                   GROUP BY state ORDER BY state DESC LIMIT 10;";
        let ast = parse_sql(sql).unwrap().ast;

        assert_eq!(ast.columns, vec!["state", "SUM(pop)"]);
        assert_eq!(ast.from.as_deref(), Some("census"));
        assert_eq!(ast.where_clause.as_deref(), Some("year = 2020 AND pop > 0"));
        assert_eq!(ast.group_by.as_deref(), Some("state"));
        assert_eq!(ast.order_by.as_deref(), Some("state DESC"));
        assert_eq!(ast.limit.as_deref(), Some("10"));
    }

    #[test]
    fn test_column_split_respects_parentheses_and_literals() {
        let ast = parse_sql("SELECT COALESCE(a, b), 'x, y' AS label, c FROM t")
            .unwrap()
            .ast;
        assert_eq!(ast.columns, vec!["COALESCE(a, b)", "'x, y' AS label", "c"]);
    }

    #[test]
    fn test_extraction_across_newlines() {
        let ast = parse_sql("SELECT a,\n       b\nFROM   acs.b01001\nWHERE  x = 1\nORDER BY a")
            .unwrap()
            .ast;
        assert_eq!(ast.columns, vec!["a", "b"]);
        assert_eq!(ast.from.as_deref(), Some("acs.b01001"));
        assert_eq!(ast.where_clause.as_deref(), Some("x = 1"));
        assert_eq!(ast.order_by.as_deref(), Some("a"));
    }

    #[test]
    fn test_comments_ignored() {
        let parsed = parse_sql("-- population\nSELECT a /* col */ FROM t").unwrap();
        assert_eq!(parsed.ast.columns, vec!["a"]);
        assert!(!parsed.formatted_sql.contains("population"));
    }

    #[test]
    fn test_format_simple_select() {
        assert_eq!(
            format_sql("SELECT a, b FROM t LIMIT 3"),
            "SELECT a,\n  b\nFROM t\nLIMIT 3"
        );
    }

    #[test]
    fn test_format_where_and_join() {
        let formatted = format_sql(
            "select c.name, s.pop from counties c left join stats s on c.id = s.id \
             where s.pop > 10 and c.state = 'OH' order by s.pop desc",
        );
        assert_eq!(
            formatted,
            "select c.name,\n  s.pop\nfrom counties c\nleft join stats s on c.id = s.id\n\
             where s.pop > 10\n  and c.state = 'OH'\norder by s.pop desc"
        );
    }

    #[test]
    fn test_format_preserves_string_literals() {
        let formatted = format_sql("SELECT a FROM t WHERE b = 'x,  y AND z'");
        assert!(formatted.ends_with("WHERE b = 'x,  y AND z'"));
    }

    #[test]
    fn test_format_idempotent() {
        let queries = [
            "SELECT a, b FROM t LIMIT 3",
            "select  a ,b,c  from t where x=1 and y=2 or z=3 group by a order by b limit 5",
            "SELECT t.a, COUNT(*) FROM t INNER JOIN u ON t.id = u.id WHERE t.v IN (1, 2) GROUP BY t.a HAVING COUNT(*) > 1",
            "SELECT name FROM t WHERE label = 'a,  b' AND x = \"c  d\"",
            "WITH x AS (SELECT a FROM t) SELECT * FROM x",
            "SELECT a,FROM t",
        ];

        for sql in queries {
            let once = format_sql(sql);
            let twice = format_sql(&once);
            let thrice = format_sql(&twice);
            assert_eq!(once, twice, "not idempotent for {sql:?}");
            assert_eq!(twice, thrice, "not stable for {sql:?}");
        }
    }

    #[test]
    fn test_formatted_output_revalidates_to_same_ast() {
        let sql = "SELECT a, b FROM t WHERE x = 1 AND y = 2 ORDER BY a LIMIT 3";
        let parsed = parse_sql(sql).unwrap();
        let reparsed = parse_sql(&parsed.formatted_sql).unwrap();
        assert_eq!(parsed.ast, reparsed.ast);
    }

    #[test]
    fn test_summary() {
        assert_eq!(
            validate_sql_summary("SELECT a FROM t"),
            ValidationSummary {
                valid: true,
                errors: vec![]
            }
        );

        let summary = validate_sql_summary("SELECT a");
        assert!(!summary.valid);
        assert_eq!(summary.errors.len(), 1);
        assert!(summary.errors[0].contains("FROM"));
    }

    #[test]
    fn test_parse_result_wire_shape() {
        let invalid = serde_json::to_value(validate_sql("FOO")).unwrap();
        assert_eq!(
            invalid,
            serde_json::json!({ "valid": false, "error": "Invalid SQL statement. Must start with a valid keyword, got: FOO" })
        );

        let valid = serde_json::to_value(validate_sql("SELECT a FROM t")).unwrap();
        assert_eq!(valid["valid"], true);
        assert_eq!(valid["ast"]["from"], "t");
        assert!(valid["ast"]["where"].is_null());
        assert!(valid.get("error").is_none());
    }

    #[test]
    fn test_parse_result_decodes_remote_tree() {
        let remote: SqlParseResult<serde_json::Value> = serde_json::from_value(serde_json::json!({
            "valid": true,
            "formatted_sql": "SELECT\n  a\nFROM t",
            "ast": { "kind": "select", "expressions": [] }
        }))
        .unwrap();
        assert!(remote.valid);
        assert_eq!(remote.ast.unwrap()["kind"], "select");
    }

    #[test]
    fn test_split_quoted() {
        assert_eq!(
            split_quoted("a 'b c' \"d\" e"),
            vec![
                (false, "a "),
                (true, "'b c'"),
                (false, " "),
                (true, "\"d\""),
                (false, " e")
            ]
        );
        assert_eq!(split_quoted("x 'open"), vec![(false, "x "), (true, "'open")]);
    }

    #[test]
    fn test_strip_comments_preserves_string_literals() {
        let sql = "SELECT '--not a comment' FROM t";
        let cleaned = strip_sql_comments(sql);
        assert!(cleaned.contains("'--not a comment'"));
    }

    #[test]
    fn test_strip_sql_comments_line_comment() {
        let sql = "SELECT * -- comment\nFROM users";
        let cleaned = strip_sql_comments(sql);
        assert!(!cleaned.contains("comment"));
        assert!(cleaned.contains("SELECT"));
        assert!(cleaned.contains("FROM"));
    }

    #[test]
    fn test_strip_sql_comments_block_comment() {
        let sql = "SELECT /* comment */ * FROM users";
        let cleaned = strip_sql_comments(sql);
        assert!(!cleaned.contains("comment"));
        assert!(cleaned.contains('*'));
    }
}
