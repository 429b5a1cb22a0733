use async_graphql::Enum;
use rusqlite::types::Value;
use serde::{Deserialize, Serialize};

/// Named list filters understood by `list`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, Enum)]
#[serde(rename_all = "camelCase")]
pub enum PostFilter {
    #[default]
    All,
    Draft,
    Unread,
    Replied,
    RepliedByMe,
    Unreplied,
    UnrepliedByMe,
}

/// A SQL condition over the `posts p` alias together with its positional
/// (`?`) parameters, in order of appearance.
#[derive(Debug, Clone, PartialEq)]
pub struct Predicate {
    pub sql: &'static str,
    pub params: Vec<Value>,
}

impl Predicate {
    fn unconstrained() -> Self {
        Self {
            sql: "1 = 1",
            params: Vec::new(),
        }
    }

    fn fixed(sql: &'static str) -> Self {
        Self {
            sql,
            params: Vec::new(),
        }
    }

    fn for_user(sql: &'static str, user_id: &str) -> Self {
        Self {
            sql,
            params: vec![Value::Text(user_id.to_string())],
        }
    }
}

impl PostFilter {
    pub fn predicate(self, user_id: &str) -> Predicate {
        match self {
            PostFilter::All => Predicate::unconstrained(),
            PostFilter::Draft => Predicate::fixed("p.published = 0"),
            PostFilter::Unread => Predicate::for_user(
                "NOT EXISTS (SELECT 1 FROM read_markers rm WHERE rm.post_id = p.id AND rm.user_id = ?)",
                user_id,
            ),
            PostFilter::Replied => {
                Predicate::fixed("EXISTS (SELECT 1 FROM comments c WHERE c.post_id = p.id)")
            }
            PostFilter::RepliedByMe => Predicate::for_user(
                "EXISTS (SELECT 1 FROM comments c WHERE c.post_id = p.id AND c.author_id = ?)",
                user_id,
            ),
            PostFilter::Unreplied => {
                Predicate::fixed("NOT EXISTS (SELECT 1 FROM comments c WHERE c.post_id = p.id)")
            }
            PostFilter::UnrepliedByMe => Predicate::for_user(
                "NOT EXISTS (SELECT 1 FROM comments c WHERE c.post_id = p.id AND c.author_id = ?)",
                user_id,
            ),
        }
    }
}
