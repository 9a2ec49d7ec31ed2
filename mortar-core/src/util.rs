//! Escaping and clause assembly helpers shared by every statement kind

use crate::builder::common::WhereClause;
use crate::builder::join::JoinClause;
use crate::Value;

/// Wrapping character for identifiers
pub const BACKTICK: char = '`';
/// Wrapping character for string literals
pub const QUOTE: char = '\'';
/// Column token selecting every column
pub const WILDCARD: &str = "*";

/// Surround `value` with `wrap`
pub fn escape(value: &str, wrap: char) -> String {
    let mut escaped = String::with_capacity(value.len() + 2);
    escaped.push(wrap);
    escaped.push_str(value);
    escaped.push(wrap);
    escaped
}

/// Backtick an identifier, passing the `*` wildcard through untouched
pub fn escape_identifier(name: &str) -> String {
    if name == WILDCARD {
        name.to_string()
    } else {
        escape(name, BACKTICK)
    }
}

/// Escape every element, preserving order
pub fn escape_all<I, S>(values: I, wrap: char) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    values
        .into_iter()
        .map(|value| {
            if wrap == BACKTICK {
                escape_identifier(value.as_ref())
            } else {
                escape(value.as_ref(), wrap)
            }
        })
        .collect()
}

/// Render a WHERE fragment: the first clause takes the `WHERE` keyword, every
/// following clause is prefixed with its own glue
pub fn render_where_clause(clauses: &[WhereClause]) -> String {
    let mut rendered = String::new();

    for (i, clause) in clauses.iter().enumerate() {
        if i == 0 {
            rendered.push_str("WHERE ");
        } else {
            rendered.push_str(clause.glue.as_str());
            rendered.push(' ');
        }

        rendered.push_str(&clause.to_string());
        rendered.push(' ');
    }

    rendered.trim_end().to_string()
}

/// Render every JOIN in insertion order, space separated
pub fn render_join_clause(joins: &[JoinClause]) -> String {
    joins
        .iter()
        .map(|join| join.to_string())
        .collect::<Vec<_>>()
        .join(" ")
}

/// Render `column = 'value'` pairs, comma separated
pub fn render_assignments(pairs: &[(String, Value)]) -> String {
    pairs
        .iter()
        .map(|(column, value)| format!("{} = {}", escape(column, BACKTICK), value.to_literal()))
        .collect::<Vec<_>>()
        .join(", ")
}

/// Join statement fragments with single spaces, skipping empty ones
pub(crate) fn assemble<I, S>(fragments: I) -> String
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    fragments
        .into_iter()
        .filter_map(|fragment| {
            let fragment = fragment.as_ref().trim();
            (!fragment.is_empty()).then(|| fragment.to_string())
        })
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder::common::Glue;
    use crate::builder::join::JoinKind;
    use crate::Operator;
    use pretty_assertions::assert_eq;

    fn clause(glue: Glue, column: &str, operator: Operator, matches: &str) -> WhereClause {
        WhereClause::new(column, operator, matches, glue).unwrap()
    }

    #[test]
    fn test_escape() {
        assert_eq!(escape("users", BACKTICK), "`users`");
        assert_eq!(escape("Aberdeener", QUOTE), "'Aberdeener'");
    }

    #[test]
    fn test_escape_identifier_wildcard_passthrough() {
        assert_eq!(escape_identifier("*"), "*");
        assert_eq!(escape_identifier("username"), "`username`");
    }

    #[test]
    fn test_escape_all_preserves_order() {
        assert_eq!(
            escape_all(["username", "*", "full_name"], BACKTICK),
            vec!["`username`", "*", "`full_name`"]
        );
        assert_eq!(escape_all(vec!["a", "*"], QUOTE), vec!["'a'", "'*'"]);
    }

    #[test]
    fn test_render_where_empty() {
        assert_eq!(render_where_clause(&[]), "");
    }

    #[test]
    fn test_render_where_uses_each_glue() {
        let clauses = vec![
            clause(Glue::Or, "username", Operator::EQ, "Aberdeener"),
            clause(Glue::And, "full_name", Operator::NEQ, "Ronan Boyle"),
            clause(Glue::Or, "email", Operator::LIKE, "%@example.com"),
        ];

        assert_eq!(
            render_where_clause(&clauses),
            "WHERE `username` = 'Aberdeener' AND `full_name` <> 'Ronan Boyle' OR `email` LIKE '%@example.com'"
        );
    }

    #[test]
    fn test_render_join_clause_keeps_order() {
        let joins = vec![
            JoinClause::new(JoinKind::Inner, "users_groups", "users", "user_id", "id"),
            JoinClause::new(JoinKind::LeftOuter, "groups", "users_groups", "id", "group_id"),
        ];

        assert_eq!(
            render_join_clause(&joins),
            "INNER JOIN `users_groups` ON `users_groups`.`user_id` = `users`.`id` \
             LEFT OUTER JOIN `groups` ON `groups`.`id` = `users_groups`.`group_id`"
        );
        assert_eq!(render_join_clause(&[]), "");
    }

    #[test]
    fn test_render_assignments() {
        let pairs = vec![
            ("username".to_string(), Value::from("Aber")),
            ("visits".to_string(), Value::from(3)),
        ];
        assert_eq!(render_assignments(&pairs), "`username` = 'Aber', `visits` = '3'");
    }

    #[test]
    fn test_assemble_skips_empty_fragments() {
        assert_eq!(
            assemble(["SELECT *", "FROM `users`", "", "  ", "LIMIT 5"]),
            "SELECT * FROM `users` LIMIT 5"
        );
    }
}
