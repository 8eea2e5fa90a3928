//! Seed fixture file format.
//!
//! Rows reference each other by natural key (owner username, tea name)
//! rather than by ID, since IDs are only known after insertion.

use std::collections::HashSet;

use serde::Deserialize;

use teahouse_core::{Email, Username};

/// Fixtures bundled into the binary, used when no file is given.
pub const BUNDLED: &str = include_str!("../fixtures/seed.yaml");

/// A complete fixture file.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Fixtures {
    #[serde(default)]
    pub users: Vec<UserFixture>,
    #[serde(default)]
    pub teas: Vec<TeaFixture>,
    #[serde(default)]
    pub comments: Vec<CommentFixture>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct UserFixture {
    pub username: String,
    pub email: String,
    pub password: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TeaFixture {
    pub name: String,
    pub in_stock: bool,
    pub rating: i32,
    /// Username of the owning user.
    pub owner: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CommentFixture {
    /// Name of the tea the comment belongs to.
    pub tea: String,
    pub content: String,
}

impl Fixtures {
    /// Parse fixtures from YAML.
    ///
    /// # Errors
    ///
    /// Returns `serde_yaml::Error` if the document doesn't match the format.
    pub fn from_yaml(content: &str) -> Result<Self, serde_yaml::Error> {
        serde_yaml::from_str(content)
    }

    /// Check references and field formats before touching the database.
    ///
    /// Returns one message per problem; empty means valid.
    #[must_use]
    pub fn validate(&self) -> Vec<String> {
        let mut errors = Vec::new();

        let mut usernames = HashSet::new();
        for user in &self.users {
            match Username::parse(&user.username) {
                Ok(name) => {
                    if !usernames.insert(name.as_str().to_owned()) {
                        errors.push(format!("duplicate user {:?}", user.username));
                    }
                }
                Err(e) => errors.push(format!("user {:?}: {e}", user.username)),
            }
            if let Err(e) = Email::parse(&user.email) {
                errors.push(format!("user {:?}: {e}", user.username));
            }
        }

        let mut tea_names = HashSet::new();
        for tea in &self.teas {
            if !tea_names.insert(tea.name.as_str()) {
                errors.push(format!("duplicate tea {:?}", tea.name));
            }
            if !usernames.contains(tea.owner.trim()) {
                errors.push(format!("tea {:?}: unknown owner {:?}", tea.name, tea.owner));
            }
        }

        for comment in &self.comments {
            if !tea_names.contains(comment.tea.as_str()) {
                errors.push(format!("comment on unknown tea {:?}", comment.tea));
            }
        }

        errors
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_bundled_fixtures_are_valid() {
        let fixtures = Fixtures::from_yaml(BUNDLED).unwrap();

        assert!(!fixtures.users.is_empty());
        assert!(!fixtures.teas.is_empty());
        assert!(!fixtures.comments.is_empty());
        assert_eq!(fixtures.validate(), Vec::<String>::new());
    }

    #[test]
    fn test_missing_sections_default_to_empty() {
        let fixtures = Fixtures::from_yaml("users: []").unwrap();
        assert!(fixtures.teas.is_empty());
        assert!(fixtures.validate().is_empty());
    }

    #[test]
    fn test_dangling_references_reported() {
        let fixtures = Fixtures::from_yaml(
            r"
teas:
  - name: Sencha
    in_stock: true
    rating: 4
    owner: nobody
comments:
  - tea: Matcha
    content: Whisked.
",
        )
        .unwrap();

        let errors = fixtures.validate();
        assert_eq!(errors.len(), 2);
        assert!(errors[0].contains("unknown owner"));
        assert!(errors[1].contains("unknown tea"));
    }

    #[test]
    fn test_duplicate_tea_reported() {
        let fixtures = Fixtures::from_yaml(
            r"
users:
  - username: a
    email: a@example.com
    password: long-enough
teas:
  - { name: Chai, in_stock: true, rating: 1, owner: a }
  - { name: Chai, in_stock: false, rating: 2, owner: a }
",
        )
        .unwrap();

        assert_eq!(fixtures.validate(), vec![r#"duplicate tea "Chai""#.to_string()]);
    }

    #[test]
    fn test_bad_email_reported() {
        let fixtures = Fixtures::from_yaml(
            r"
users:
  - username: a
    email: not-an-email
    password: long-enough
",
        )
        .unwrap();

        assert_eq!(fixtures.validate().len(), 1);
    }
}
