use std::fmt;
use std::str::FromStr;

use chrono::{
  DateTime,
  Utc
};
use serde::de::{
  self,
  Visitor
};
use serde::{
  Deserialize,
  Deserializer,
  Serialize,
  Serializer
};
use uuid::Uuid;

/// Identifier the store assigns to a
/// task row. Kept as the text the
/// store sent, whether the key column
/// is a uuid or an integer.
#[derive(
  Debug,
  Clone,
  PartialEq,
  Eq,
  PartialOrd,
  Ord,
  Hash,
)]
pub struct TaskId(String);

impl TaskId {
  pub fn as_str(&self) -> &str {
    &self.0
  }

  pub fn random() -> Self {
    Self::from(Uuid::new_v4())
  }
}

impl fmt::Display for TaskId {
  fn fmt(
    &self,
    f: &mut fmt::Formatter<'_>
  ) -> fmt::Result {
    f.write_str(&self.0)
  }
}

impl From<Uuid> for TaskId {
  fn from(id: Uuid) -> Self {
    Self(id.to_string())
  }
}

impl From<i64> for TaskId {
  fn from(id: i64) -> Self {
    Self(id.to_string())
  }
}

#[derive(
  Debug, Clone, Copy, PartialEq, Eq,
)]
pub struct BlankTaskId;

impl fmt::Display for BlankTaskId {
  fn fmt(
    &self,
    f: &mut fmt::Formatter<'_>
  ) -> fmt::Result {
    f.write_str(
      "task id cannot be blank"
    )
  }
}

impl std::error::Error for BlankTaskId {}

impl FromStr for TaskId {
  type Err = BlankTaskId;

  fn from_str(
    s: &str
  ) -> Result<Self, Self::Err> {
    let s = s.trim();
    if s.is_empty() {
      return Err(BlankTaskId);
    }
    Ok(Self(s.to_string()))
  }
}

impl Serialize for TaskId {
  fn serialize<S: Serializer>(
    &self,
    serializer: S
  ) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(&self.0)
  }
}

struct TaskIdVisitor;

impl Visitor<'_> for TaskIdVisitor {
  type Value = TaskId;

  fn expecting(
    &self,
    f: &mut fmt::Formatter<'_>
  ) -> fmt::Result {
    f.write_str(
      "a task id string or integer"
    )
  }

  fn visit_str<E: de::Error>(
    self,
    v: &str
  ) -> Result<TaskId, E> {
    v.parse().map_err(E::custom)
  }

  fn visit_i64<E: de::Error>(
    self,
    v: i64
  ) -> Result<TaskId, E> {
    Ok(TaskId(v.to_string()))
  }

  fn visit_u64<E: de::Error>(
    self,
    v: u64
  ) -> Result<TaskId, E> {
    Ok(TaskId(v.to_string()))
  }
}

impl<'de> Deserialize<'de> for TaskId {
  fn deserialize<D: Deserializer<'de>>(
    deserializer: D
  ) -> Result<Self, D::Error> {
    deserializer
      .deserialize_any(TaskIdVisitor)
  }
}

#[derive(
  Debug,
  Clone,
  Copy,
  Serialize,
  Deserialize,
  PartialEq,
  Eq,
  Hash,
  Default,
)]
#[serde(rename_all = "lowercase")]
pub enum TaskPriority {
  Low,
  #[default]
  Medium,
  High
}

impl TaskPriority {
  pub const ALL: [TaskPriority; 3] = [
    TaskPriority::Low,
    TaskPriority::Medium,
    TaskPriority::High
  ];

  pub fn as_str(
    self
  ) -> &'static str {
    match self {
      | TaskPriority::Low => "low",
      | TaskPriority::Medium => "medium",
      | TaskPriority::High => "high"
    }
  }

  pub fn label(
    self
  ) -> &'static str {
    match self {
      | TaskPriority::Low => {
        "Low Priority"
      }
      | TaskPriority::Medium => {
        "Medium Priority"
      }
      | TaskPriority::High => {
        "High Priority"
      }
    }
  }
}

impl fmt::Display for TaskPriority {
  fn fmt(
    &self,
    f: &mut fmt::Formatter<'_>
  ) -> fmt::Result {
    f.write_str(self.as_str())
  }
}

#[derive(
  Debug, Clone, PartialEq, Eq,
)]
pub struct UnknownPriority(
  pub String
);

impl fmt::Display for UnknownPriority {
  fn fmt(
    &self,
    f: &mut fmt::Formatter<'_>
  ) -> fmt::Result {
    write!(
      f,
      "unknown priority `{}` \
       (expected low, medium or high)",
      self.0
    )
  }
}

impl std::error::Error
  for UnknownPriority
{
}

impl FromStr for TaskPriority {
  type Err = UnknownPriority;

  fn from_str(
    s: &str
  ) -> Result<Self, Self::Err> {
    match s
      .trim()
      .to_ascii_lowercase()
      .as_str()
    {
      | "low" => Ok(TaskPriority::Low),
      | "medium" => {
        Ok(TaskPriority::Medium)
      }
      | "high" => {
        Ok(TaskPriority::High)
      }
      | _ => {
        Err(UnknownPriority(
          s.to_string()
        ))
      }
    }
  }
}

/// A row of the remote `tasks` table.
#[derive(
  Debug,
  Clone,
  Serialize,
  Deserialize,
  PartialEq,
)]
pub struct TaskDto {
  pub id:          TaskId,
  #[serde(default)]
  pub title:       String,
  #[serde(
    default,
    deserialize_with = "null_as_default"
  )]
  pub description: String,
  #[serde(
    default,
    deserialize_with = "lenient_priority"
  )]
  pub priority:    TaskPriority,
  pub created_at:  DateTime<Utc>,
  #[serde(default)]
  pub updated_at:  Option<DateTime<Utc>>
}

/// Body of an insert-one call; id and
/// timestamps are assigned by the store.
#[derive(
  Debug,
  Clone,
  Serialize,
  Deserialize,
  PartialEq,
)]
pub struct TaskInsert {
  pub title:       String,
  pub description: String,
  pub priority:    TaskPriority
}

/// Field set written by an update-one
/// call.
#[derive(
  Debug,
  Clone,
  Serialize,
  Deserialize,
  PartialEq,
)]
pub struct TaskPatch {
  pub title:       String,
  pub description: String,
  pub priority:    TaskPriority,
  pub updated_at:  DateTime<Utc>
}

#[derive(
  Debug,
  Clone,
  Serialize,
  Deserialize,
  PartialEq,
  Eq,
)]
pub struct BookDto {
  pub id:     u32,
  pub title:  String,
  pub author: String,
  /// `None` is the empty year left
  /// behind by an unparseable edit.
  pub year:   Option<i32>
}

impl BookDto {
  pub fn year_text(&self) -> String {
    self
      .year
      .map(|year| year.to_string())
      .unwrap_or_default()
  }
}

fn null_as_default<'de, D, T>(
  deserializer: D
) -> Result<T, D::Error>
where
  D: Deserializer<'de>,
  T: Default + Deserialize<'de>
{
  Ok(
    Option::<T>::deserialize(
      deserializer
    )?
    .unwrap_or_default()
  )
}

/// Null, missing or unrecognised
/// priorities read as the default so
/// one odd row cannot sink a listing.
fn lenient_priority<'de, D>(
  deserializer: D
) -> Result<TaskPriority, D::Error>
where
  D: Deserializer<'de>
{
  let raw = Option::<String>::deserialize(
    deserializer
  )?;
  Ok(
    raw
      .and_then(|raw| raw.parse().ok())
      .unwrap_or_default()
  )
}
