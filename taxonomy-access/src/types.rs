use serde::{Deserialize, Serialize};
use std::borrow::Borrow;
use std::fmt::{Display, Formatter};
use std::ops::Deref;
use std::str::FromStr;

/// id of a user account; owned by whatever authenticates users, this crate only references it
#[derive(Debug, Clone, Copy, Eq, PartialEq, Ord, PartialOrd, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(pub i64);

/// id of a taxonomy term
#[derive(Debug, Clone, Copy, Eq, PartialEq, Ord, PartialOrd, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TermId(pub i64);

/// key of an access scheme, i.e. `view` or `edit`
#[derive(Debug, Clone, Eq, PartialEq, Ord, PartialOrd, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SchemeId(String);

/// id of a taxonomy category (vocabulary)
#[derive(Debug, Clone, Eq, PartialEq, Ord, PartialOrd, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CategoryId(String);

macro_rules! int_id {
    ($name:ident) => {
        impl Display for $name {
            fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl FromStr for $name {
            type Err = std::num::ParseIntError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Ok(Self(i64::from_str(s.trim())?))
            }
        }

        impl From<i64> for $name {
            fn from(value: i64) -> Self {
                Self(value)
            }
        }
    };
}

macro_rules! str_id {
    ($name:ident) => {
        impl $name {
            pub fn new<S: ToString>(id: S) -> Self {
                Self(id.to_string())
            }

            pub fn as_str(&self) -> &str {
                self.0.as_str()
            }
        }

        impl Display for $name {
            fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl Deref for $name {
            type Target = str;

            fn deref(&self) -> &Self::Target {
                self.0.as_str()
            }
        }

        impl Borrow<str> for $name {
            fn borrow(&self) -> &str {
                self.0.as_str()
            }
        }

        impl From<&str> for $name {
            fn from(value: &str) -> Self {
                Self(value.to_string())
            }
        }

        impl From<String> for $name {
            fn from(value: String) -> Self {
                Self(value)
            }
        }

        impl FromStr for $name {
            type Err = std::convert::Infallible;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Ok(Self(s.to_string()))
            }
        }
    };
}

int_id!(UserId);
int_id!(TermId);
str_id!(SchemeId);
str_id!(CategoryId);

#[derive(Debug, Clone, Eq, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub id: UserId,
    pub name: String,
}

#[derive(Debug, Clone, Eq, PartialEq, Serialize, Deserialize)]
pub struct Category {
    pub id: CategoryId,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
}

/// one node of a category's term tree in flattened (depth first) order
#[derive(Debug, Clone, Eq, PartialEq, Serialize, Deserialize)]
pub struct Term {
    pub id: TermId,
    pub name: String,
    /// 0 for the category's top level terms
    pub depth: usize,
    pub category: CategoryId,
}

impl Term {
    pub fn new<S: ToString>(id: TermId, name: S, depth: usize, category: CategoryId) -> Self {
        Self {
            id,
            name: name.to_string(),
            depth,
            category,
        }
    }

    /// name prefixed with one `-` per level of nesting
    pub fn indented_name(&self) -> String {
        format!("{}{}", "-".repeat(self.depth), self.name)
    }
}

#[derive(Debug, Clone, Eq, PartialEq, Serialize, Deserialize)]
pub struct Scheme {
    pub id: SchemeId,
    pub label: String,
}

impl Scheme {
    pub fn new<S: ToString>(id: SchemeId, label: S) -> Self {
        Self {
            id,
            label: label.to_string(),
        }
    }
}

/// the fact that `user` holds `scheme` access on `term`. a row exists or it does not.
#[derive(Debug, Clone, Eq, PartialEq, Ord, PartialOrd, Hash, Serialize, Deserialize)]
pub struct Grant {
    pub scheme: SchemeId,
    pub user: UserId,
    pub term: TermId,
}

impl Grant {
    pub fn new(scheme: SchemeId, user: UserId, term: TermId) -> Self {
        Self { scheme, user, term }
    }

    pub fn key(&self) -> GrantKey {
        (self.scheme.clone(), self.term)
    }
}

/// a granted (scheme, term) pair of a single user
pub type GrantKey = (SchemeId, TermId);

#[derive(
    Debug,
    Clone,
    Copy,
    Eq,
    PartialEq,
    Hash,
    strum_macros::Display,
    strum_macros::EnumString,
    strum_macros::IntoStaticStr,
)]
#[strum(serialize_all = "lowercase")]
pub enum GrantChangeKind {
    Grant,
    Revoke,
}

/// one requested transition of a single (scheme, term) cell for a user
#[derive(Debug, Clone, Eq, PartialEq, Hash, Serialize, Deserialize)]
pub enum GrantChange {
    Grant(SchemeId, TermId),
    Revoke(SchemeId, TermId),
}

impl GrantChange {
    pub fn new(scheme: SchemeId, term: TermId, granted: bool) -> Self {
        match granted {
            true => GrantChange::Grant(scheme, term),
            false => GrantChange::Revoke(scheme, term),
        }
    }

    pub fn kind(&self) -> GrantChangeKind {
        match self {
            GrantChange::Grant(..) => GrantChangeKind::Grant,
            GrantChange::Revoke(..) => GrantChangeKind::Revoke,
        }
    }

    pub fn scheme(&self) -> &SchemeId {
        match self {
            GrantChange::Grant(scheme, _) | GrantChange::Revoke(scheme, _) => scheme,
        }
    }

    pub fn term(&self) -> TermId {
        match self {
            GrantChange::Grant(_, term) | GrantChange::Revoke(_, term) => *term,
        }
    }

    pub fn is_grant(&self) -> bool {
        matches!(self, GrantChange::Grant(..))
    }

    pub fn key(&self) -> GrantKey {
        (self.scheme().clone(), self.term())
    }
}

impl Display for GrantChange {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} {}:{}", self.kind(), self.scheme(), self.term())
    }
}

#[cfg(test)]
pub mod test {
    use crate::types::{CategoryId, GrantChange, GrantChangeKind, SchemeId, Term, TermId, UserId};
    use std::str::FromStr;

    #[test]
    pub fn test_indented_name() {
        let colors = CategoryId::from("colors");
        let navy = Term::new(TermId(12), "Navy", 2, colors.clone());
        assert_eq!(navy.indented_name(), "--Navy");
        let red = Term::new(TermId(10), "Red", 0, colors);
        assert_eq!(red.indented_name(), "Red");
    }

    #[test]
    pub fn test_change_display() {
        let change = GrantChange::new(SchemeId::from("edit"), TermId(11), false);
        assert_eq!(change.kind(), GrantChangeKind::Revoke);
        assert_eq!(change.to_string(), "revoke edit:11");
        assert!(GrantChange::new(SchemeId::from("edit"), TermId(11), true).is_grant());
    }

    #[test]
    pub fn test_parse_ids() {
        assert_eq!(UserId::from_str(" 42").unwrap(), UserId(42));
        assert!(TermId::from_str("red").is_err());
    }
}
