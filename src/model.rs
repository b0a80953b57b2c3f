use serde::{Deserialize, Deserializer, Serialize};
use std::time::Duration;

/// Placeholder password given to every new draft.
pub const DEFAULT_PASSWORD: &str = "123456";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClientConfig {
    pub base_url: String,
    pub default_password: String,
    #[serde(default, with = "humantime_serde")]
    pub timeout: Option<Duration>,
    pub user_agent: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    #[serde(
        default,
        deserialize_with = "deserialize_id",
        skip_serializing_if = "Option::is_none"
    )]
    pub id: Option<String>,
    pub first_name: String,
    pub last_name: String,
    pub phone: String,
    pub position: String,
    pub email: String,
    #[serde(default)]
    pub password: String,
}

impl User {
    /// Empty record carrying only the placeholder password.
    pub fn draft(default_password: &str) -> Self {
        Self {
            password: default_password.to_string(),
            ..Default::default()
        }
    }

    pub fn field(&self, field: Field) -> &str {
        match field {
            Field::FirstName => &self.first_name,
            Field::LastName => &self.last_name,
            Field::Phone => &self.phone,
            Field::Position => &self.position,
            Field::Email => &self.email,
        }
    }

    pub fn field_mut(&mut self, field: Field) -> &mut String {
        match field {
            Field::FirstName => &mut self.first_name,
            Field::LastName => &mut self.last_name,
            Field::Phone => &mut self.phone,
            Field::Position => &mut self.position,
            Field::Email => &mut self.email,
        }
    }
}

/// json-server style backends hand out either string or numeric ids.
fn deserialize_id<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum RawId {
        Text(String),
        Int(i64),
        Uint(u64),
    }

    Ok(Option::<RawId>::deserialize(deserializer)?.map(|raw| match raw {
        RawId::Text(s) => s,
        RawId::Int(n) => n.to_string(),
        RawId::Uint(n) => n.to_string(),
    }))
}

/// Editable, sortable columns of the user table, in display order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "camelCase")]
pub enum Field {
    FirstName,
    LastName,
    Phone,
    Position,
    Email,
}

impl Field {
    pub const ALL: [Field; 5] = [
        Field::FirstName,
        Field::LastName,
        Field::Phone,
        Field::Position,
        Field::Email,
    ];

    pub fn label(self) -> &'static str {
        match self {
            Field::FirstName => "First Name",
            Field::LastName => "Last Name",
            Field::Phone => "Phone",
            Field::Position => "Position",
            Field::Email => "Email",
        }
    }

    pub fn index(self) -> usize {
        match self {
            Field::FirstName => 0,
            Field::LastName => 1,
            Field::Phone => 2,
            Field::Position => 3,
            Field::Email => 4,
        }
    }

    pub fn next(self) -> Field {
        Field::ALL[(self.index() + 1) % Field::ALL.len()]
    }

    pub fn prev(self) -> Field {
        Field::ALL[(self.index() + Field::ALL.len() - 1) % Field::ALL.len()]
    }
}

pub type SortColumn = Field;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum SortDirection {
    #[default]
    Ascending,
    Descending,
}

impl SortDirection {
    pub fn flipped(self) -> Self {
        match self {
            SortDirection::Ascending => SortDirection::Descending,
            SortDirection::Descending => SortDirection::Ascending,
        }
    }

    pub fn arrow(self) -> &'static str {
        match self {
            SortDirection::Ascending => "↑",
            SortDirection::Descending => "↓",
        }
    }
}

/// Load state of the user list as the page sees it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PageStatus {
    Loading,
    Ready,
    Failed(String),
}

#[derive(Debug, Clone)]
pub struct PageSnapshot {
    pub status: PageStatus,
    pub users: Vec<User>,
    pub refreshed_at: Option<String>,
}

/// Messages from the controller task to presentation layers.
#[derive(Debug, Clone)]
pub enum PageEvent {
    Snapshot(PageSnapshot),
    Info(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn numeric_and_string_ids_decode_to_strings() {
        let body = r#"[
            {"id": 7, "firstName": "Ana", "lastName": "Lee", "phone": "1", "position": "Eng", "email": "ana@x.com", "password": "p"},
            {"id": "a1b2", "firstName": "Bo", "lastName": "Kim", "phone": "2", "position": "Ops", "email": "bo@x.com"}
        ]"#;
        let users: Vec<User> = serde_json::from_str(body).unwrap();
        assert_eq!(users[0].id.as_deref(), Some("7"));
        assert_eq!(users[1].id.as_deref(), Some("a1b2"));
        assert_eq!(users[1].password, "");
    }

    #[test]
    fn draft_omits_id_on_the_wire() {
        let draft = User::draft(DEFAULT_PASSWORD);
        let v = serde_json::to_value(&draft).unwrap();
        assert!(v.get("id").is_none());
        assert_eq!(v["password"], "123456");
        assert_eq!(v["firstName"], "");
    }

    #[test]
    fn field_cycle_wraps_both_ways() {
        assert_eq!(Field::Email.next(), Field::FirstName);
        assert_eq!(Field::FirstName.prev(), Field::Email);
    }
}
