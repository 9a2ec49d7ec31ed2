//! JOIN clause configuration for SELECT statements

use std::fmt;
use std::str::FromStr;

use crate::util::{escape, BACKTICK};
use crate::{Error, Result};

/// JOIN flavours MySQL understands
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JoinKind {
    Inner,
    LeftOuter,
    RightOuter,
    FullOuter,
    Outer,
}

impl JoinKind {
    pub const ALL: [JoinKind; 5] = [
        JoinKind::Inner,
        JoinKind::LeftOuter,
        JoinKind::RightOuter,
        JoinKind::FullOuter,
        JoinKind::Outer,
    ];

    /// The keyword placed before `JOIN`
    pub fn keyword(&self) -> &'static str {
        match self {
            JoinKind::Inner => "INNER",
            JoinKind::LeftOuter => "LEFT OUTER",
            JoinKind::RightOuter => "RIGHT OUTER",
            JoinKind::FullOuter => "FULL OUTER",
            JoinKind::Outer => "OUTER",
        }
    }
}

impl fmt::Display for JoinKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.keyword())
    }
}

impl FromStr for JoinKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::ALL
            .iter()
            .copied()
            .find(|kind| kind.keyword() == s)
            .ok_or_else(|| Error::InvalidJoinKeyword {
                keyword: s.to_string(),
            })
    }
}

/// A fully resolved JOIN
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JoinClause {
    pub kind: JoinKind,
    pub table: String,
    pub through: String,
    pub foreign_key: String,
    pub local_key: String,
}

impl JoinClause {
    pub fn new(
        kind: JoinKind,
        table: impl Into<String>,
        through: impl Into<String>,
        foreign_key: impl Into<String>,
        local_key: impl Into<String>,
    ) -> Self {
        Self {
            kind,
            table: table.into(),
            through: through.into(),
            foreign_key: foreign_key.into(),
            local_key: local_key.into(),
        }
    }
}

impl fmt::Display for JoinClause {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let table = escape(&self.table, BACKTICK);
        write!(
            f,
            "{} JOIN {} ON {}.{} = {}.{}",
            self.kind,
            table,
            table,
            escape(&self.foreign_key, BACKTICK),
            escape(&self.through, BACKTICK),
            escape(&self.local_key, BACKTICK),
        )
    }
}

/// The part of a SELECT builder a join needs: its primary table, and a place
/// to record the finished clause
pub trait JoinRegistry {
    fn primary_table(&self) -> &str;

    fn register_join(&mut self, join: JoinClause);
}

/// A join being configured inside a `*_join()` callback
///
/// Call `table()` and optionally `through()`, then `on()` to record the
/// clause. Several joins may be recorded from one callback by repeating the
/// sequence.
pub struct Join<'q> {
    kind: JoinKind,
    registry: &'q mut dyn JoinRegistry,
    table: Option<String>,
    through: Option<String>,
}

impl<'q> Join<'q> {
    pub(crate) fn new(kind: JoinKind, registry: &'q mut dyn JoinRegistry) -> Self {
        Self {
            kind,
            registry,
            table: None,
            through: None,
        }
    }

    pub fn kind(&self) -> JoinKind {
        self.kind
    }

    /// Table being joined
    pub fn table(&mut self, table: &str) -> &mut Self {
        self.table = Some(table.to_string());
        self
    }

    /// Table the local key lives on. Defaults to the SELECT's primary table.
    pub fn through(&mut self, through: &str) -> &mut Self {
        self.through = Some(through.to_string());
        self
    }

    /// Bind the keys and record the join
    ///
    /// `local_key` defaults to `foreign_key` when `None`.
    pub fn on<'k>(&mut self, foreign_key: &str, local_key: impl Into<Option<&'k str>>) -> Result<()> {
        let table = self.table.take().ok_or(Error::JoinNotConfigured)?;
        let through = self
            .through
            .take()
            .unwrap_or_else(|| self.registry.primary_table().to_string());
        let local_key = local_key.into().unwrap_or(foreign_key);

        self.registry.register_join(JoinClause::new(
            self.kind,
            table,
            through,
            foreign_key,
            local_key,
        ));
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    struct Recorder {
        table: String,
        joins: Vec<JoinClause>,
    }

    impl JoinRegistry for Recorder {
        fn primary_table(&self) -> &str {
            &self.table
        }

        fn register_join(&mut self, join: JoinClause) {
            self.joins.push(join);
        }
    }

    fn recorder() -> Recorder {
        Recorder {
            table: "users".to_string(),
            joins: Vec::new(),
        }
    }

    #[test]
    fn test_join_kind_keywords() {
        assert_eq!("LEFT OUTER".parse::<JoinKind>().unwrap(), JoinKind::LeftOuter);
        assert_eq!(JoinKind::FullOuter.to_string(), "FULL OUTER");

        let err = "CROSS".parse::<JoinKind>().unwrap_err();
        assert!(matches!(err, Error::InvalidJoinKeyword { ref keyword } if keyword == "CROSS"));
    }

    #[test]
    fn test_join_defaults_through_and_local_key() {
        let mut recorder = recorder();
        Join::new(JoinKind::Inner, &mut recorder)
            .table("posts")
            .on("user_id", None)
            .unwrap();

        assert_eq!(
            recorder.joins[0].to_string(),
            "INNER JOIN `posts` ON `posts`.`user_id` = `users`.`user_id`"
        );
    }

    #[test]
    fn test_join_with_through_and_local_key() {
        let mut recorder = recorder();
        {
            let mut join = Join::new(JoinKind::LeftOuter, &mut recorder);
            join.table("users_groups").on("user_id", "id").unwrap();
            join.table("groups")
                .through("users_groups")
                .on("id", "group_id")
                .unwrap();
        }

        assert_eq!(
            recorder.joins,
            vec![
                JoinClause::new(JoinKind::LeftOuter, "users_groups", "users", "user_id", "id"),
                JoinClause::new(JoinKind::LeftOuter, "groups", "users_groups", "id", "group_id"),
            ]
        );
    }

    #[test]
    fn test_on_without_table_fails() {
        let mut recorder = recorder();
        let err = Join::new(JoinKind::Inner, &mut recorder)
            .on("user_id", None)
            .unwrap_err();

        assert!(matches!(err, Error::JoinNotConfigured));
        assert!(recorder.joins.is_empty());
    }
}
