//! Per-contributor session record.

use crate::stroke::PathSet;
use serde::de::{MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::time::{SystemTime, UNIX_EPOCH};

/// Identifier of one contributor session.
///
/// Generated ids are Unix timestamps in milliseconds and serialize as JSON
/// numbers. A parsed id keeps its JSON type, so `"007"` stays a string.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SessionId {
    text: String,
    /// Written back as a JSON number.
    numeric: bool,
}

impl SessionId {
    /// Create a session id from the current time.
    pub fn generate() -> Self {
        let millis = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_millis() as u64)
            .unwrap_or_default();
        Self::from(millis)
    }

    pub fn as_str(&self) -> &str {
        &self.text
    }

    /// Whether the id is written as a JSON number.
    pub fn is_numeric(&self) -> bool {
        self.numeric
    }
}

impl From<String> for SessionId {
    fn from(text: String) -> Self {
        Self {
            text,
            numeric: false,
        }
    }
}

impl From<&str> for SessionId {
    fn from(text: &str) -> Self {
        Self::from(text.to_string())
    }
}

impl From<u64> for SessionId {
    fn from(id: u64) -> Self {
        Self {
            text: id.to_string(),
            numeric: true,
        }
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text)
    }
}

impl Serialize for SessionId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self.text.parse::<u64>() {
            Ok(n) if self.numeric => serializer.serialize_u64(n),
            _ => serializer.serialize_str(&self.text),
        }
    }
}

impl<'de> Deserialize<'de> for SessionId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum RawId {
            Number(u64),
            Text(String),
        }

        Ok(match RawId::deserialize(deserializer)? {
            RawId::Number(n) => Self::from(n),
            RawId::Text(s) => Self::from(s),
        })
    }
}

/// Drawings keyed by label, in the order labels were first confirmed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Drawings {
    entries: Vec<(String, PathSet)>,
}

impl Drawings {
    pub fn new() -> Self {
        Self::default()
    }

    /// Get the drawing stored for a label.
    pub fn get(&self, label: &str) -> Option<&PathSet> {
        self.entries
            .iter()
            .find(|(l, _)| l == label)
            .map(|(_, paths)| paths)
    }

    /// Store a drawing, replacing any previous one for the same label.
    ///
    /// A replaced label keeps its original position.
    pub fn insert(&mut self, label: impl Into<String>, paths: PathSet) {
        let label = label.into();
        match self.entries.iter_mut().find(|(l, _)| *l == label) {
            Some((_, existing)) => *existing = paths,
            None => self.entries.push((label, paths)),
        }
    }

    pub fn contains(&self, label: &str) -> bool {
        self.get(label).is_some()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn labels(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(label, _)| label.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &PathSet)> {
        self.entries
            .iter()
            .map(|(label, paths)| (label.as_str(), paths))
    }
}

impl Serialize for Drawings {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (label, paths) in &self.entries {
            map.serialize_entry(label, paths)?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for Drawings {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct DrawingsVisitor;

        impl<'de> Visitor<'de> for DrawingsVisitor {
            type Value = Drawings;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a map of label to path set")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<Drawings, A::Error> {
                let mut drawings = Drawings::new();
                while let Some((label, paths)) = access.next_entry::<String, PathSet>()? {
                    drawings.insert(label, paths);
                }
                Ok(drawings)
            }
        }

        deserializer.deserialize_map(DrawingsVisitor)
    }
}

/// Everything one contributor produced in a session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "RawRecord")]
pub struct SessionRecord {
    pub session: SessionId,
    pub username: String,
    pub drawings: Drawings,
}

/// On-disk layout, including the `student` name older raw files use.
/// `username` wins when both are present.
#[derive(Deserialize)]
struct RawRecord {
    session: SessionId,
    #[serde(default)]
    username: Option<String>,
    #[serde(default)]
    student: Option<String>,
    #[serde(default)]
    drawings: Drawings,
}

impl From<RawRecord> for SessionRecord {
    fn from(raw: RawRecord) -> Self {
        Self {
            session: raw.session,
            username: raw.username.or(raw.student).unwrap_or_default(),
            drawings: raw.drawings,
        }
    }
}

impl SessionRecord {
    /// Create a record with no username and no drawings.
    pub fn new(session: SessionId) -> Self {
        Self {
            session,
            username: String::new(),
            drawings: Drawings::new(),
        }
    }

    /// File name the record is exported under: `{session}.json`.
    pub fn file_name(&self) -> String {
        format!("{}.json", self.session)
    }

    /// File name of a label's image export: `{session}_{username}_{label}.png`.
    pub fn image_file_name(&self, label: &str) -> String {
        format!("{}_{}_{}.png", self.session, self.username, label)
    }

    /// Serialize the record to JSON.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    /// Serialize the record to indented JSON.
    pub fn to_json_pretty(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Deserialize a record from JSON.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stroke::{Point, Stroke};

    fn stroke(points: &[(u32, u32)]) -> Stroke {
        Stroke::from_points(points.iter().copied().map(Point::from).collect()).unwrap()
    }

    #[test]
    fn test_drawings_keep_first_insertion_order() {
        let mut drawings = Drawings::new();
        drawings.insert("car", PathSet::new());
        drawings.insert("fish", PathSet::new());
        drawings.insert("car", vec![stroke(&[(1, 1)])].into());

        assert_eq!(drawings.labels().collect::<Vec<_>>(), vec!["car", "fish"]);
        assert_eq!(drawings.get("car").map(PathSet::len), Some(1));
        assert!(!drawings.contains("house"));
    }

    #[test]
    fn test_record_json_round_trip() {
        let mut record = SessionRecord::new(SessionId::from(1663053145814));
        record.username = "Jane Doe".to_string();
        record.drawings.insert(
            "house",
            vec![stroke(&[(10, 10), (20, 10), (20, 20)]), stroke(&[(5, 5)])].into(),
        );
        record
            .drawings
            .insert("car", vec![stroke(&[(3, 4), (5, 6)])].into());

        let json = record.to_json().unwrap();
        assert!(json.starts_with(r#"{"session":1663053145814,"username":"Jane Doe","drawings":{"house":"#));

        let parsed = SessionRecord::from_json(&json).unwrap();
        assert_eq!(parsed, record);
        assert_eq!(parsed.drawings.labels().collect::<Vec<_>>(), vec!["house", "car"]);
    }

    #[test]
    fn test_legacy_student_field() {
        let json = r#"{"session":"abc","student":"Radu","drawings":{"car":[[[1,2],[3,4]]]}}"#;
        let record = SessionRecord::from_json(json).unwrap();

        assert_eq!(record.session.as_str(), "abc");
        assert_eq!(record.username, "Radu");
        assert_eq!(record.drawings.get("car").map(PathSet::point_count), Some(2));
    }

    #[test]
    fn test_username_wins_over_student() {
        let json = r#"{"session":1,"student":"Old","username":"New","drawings":{}}"#;
        let record = SessionRecord::from_json(json).unwrap();
        assert_eq!(record.username, "New");

        let record = SessionRecord::from_json(r#"{"session":1}"#).unwrap();
        assert_eq!(record.username, "");
        assert!(record.drawings.is_empty());
    }

    #[test]
    fn test_string_id_keeps_its_type() {
        let json = r#"{"session":"007","username":"Ann","drawings":{}}"#;
        let record = SessionRecord::from_json(json).unwrap();
        assert_eq!(record.session.as_str(), "007");
        assert!(!record.session.is_numeric());

        let written = record.to_json().unwrap();
        assert!(written.starts_with(r#"{"session":"007","#));
        assert_eq!(SessionRecord::from_json(&written).unwrap(), record);

        let numeric_text = SessionId::from("1663053145814");
        assert_eq!(
            serde_json::to_string(&numeric_text).unwrap(),
            r#""1663053145814""#
        );
    }

    #[test]
    fn test_numeric_id_stays_a_number() {
        let id: SessionId = serde_json::from_str("1663053145814").unwrap();
        assert!(id.is_numeric());
        assert_eq!(id, SessionId::from(1663053145814));
        assert_eq!(serde_json::to_string(&id).unwrap(), "1663053145814");
    }

    #[test]
    fn test_file_names() {
        let mut record = SessionRecord::new(SessionId::from(42));
        record.username = "Jane Doe".to_string();

        assert_eq!(record.file_name(), "42.json");
        assert_eq!(record.image_file_name("car"), "42_Jane Doe_car.png");
    }

    #[test]
    fn test_generated_ids_are_numeric() {
        let id = SessionId::generate();
        assert!(id.as_str().parse::<u64>().is_ok());
        assert!(serde_json::to_string(&id).unwrap().chars().all(|c| c.is_ascii_digit()));
    }
}
