//! Saved-item data model returned by the Pocket `get` endpoint.
//!
//! Pocket encodes most scalar fields as strings (`"0"`/`"1"` flags, unix
//! timestamps, word counts). They are converted to typed values here, and an
//! unexpected value fails the whole decode.

use std::borrow::Cow;
use std::collections::{BTreeMap, HashMap};
use std::fmt;

use chrono::{DateTime, Utc};
use serde::de::{self, Deserializer, Error as _};
use serde::Deserialize;

/// Read state of an item.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ItemStatus {
    #[default]
    Unread,
    Archived,
    Deleted,
}

impl ItemStatus {
    fn from_code(code: &str) -> Option<Self> {
        match code {
            "0" => Some(Self::Unread),
            "1" => Some(Self::Archived),
            "2" => Some(Self::Deleted),
            _ => None,
        }
    }
}

/// Whether an item contains, or is, a video/image.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum MediaPresence {
    #[default]
    None,
    Has,
    Is,
}

impl MediaPresence {
    fn from_code(code: &str) -> Option<Self> {
        match code {
            "0" => Some(Self::None),
            "1" => Some(Self::Has),
            "2" => Some(Self::Is),
            _ => None,
        }
    }
}

/// One saved bookmark entry.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct FetchItem {
    pub item_id: String,
    #[serde(default)]
    pub resolved_id: String,
    #[serde(default)]
    pub given_url: String,
    #[serde(default)]
    pub given_title: String,
    #[serde(default, deserialize_with = "bool_flag")]
    pub favorite: bool,
    #[serde(default, deserialize_with = "item_status")]
    pub status: ItemStatus,
    #[serde(default, deserialize_with = "timestamp")]
    pub time_added: Option<DateTime<Utc>>,
    #[serde(default, deserialize_with = "timestamp")]
    pub time_updated: Option<DateTime<Utc>>,
    #[serde(default, deserialize_with = "timestamp")]
    pub time_read: Option<DateTime<Utc>>,
    #[serde(default, deserialize_with = "timestamp")]
    pub time_favorited: Option<DateTime<Utc>>,
    /// Position under the requested sort order.
    #[serde(default, deserialize_with = "count")]
    pub sort_id: u64,
    #[serde(default)]
    pub resolved_title: String,
    #[serde(default)]
    pub resolved_url: String,
    #[serde(default)]
    pub excerpt: String,
    #[serde(default, deserialize_with = "bool_flag")]
    pub is_article: bool,
    #[serde(default, deserialize_with = "bool_flag")]
    pub is_index: bool,
    #[serde(default, deserialize_with = "media_presence")]
    pub has_video: MediaPresence,
    #[serde(default, deserialize_with = "media_presence")]
    pub has_image: MediaPresence,
    #[serde(default, deserialize_with = "count")]
    pub word_count: u64,
    #[serde(default)]
    pub lang: String,
    #[serde(default)]
    pub top_image_url: String,
    /// Estimated listening time in seconds.
    #[serde(default, deserialize_with = "count")]
    pub listen_duration_estimate: u64,
    #[serde(default)]
    pub amp_url: String,
    #[serde(default)]
    pub domain_metadata: HashMap<String, String>,
    #[serde(default)]
    pub tags: HashMap<String, HashMap<String, String>>,
}

impl FetchItem {
    /// Resolved title, falling back to the submitted one.
    pub fn title(&self) -> &str {
        if self.resolved_title.is_empty() {
            &self.given_title
        } else {
            &self.resolved_title
        }
    }

    /// Resolved URL, falling back to the submitted one.
    pub fn url(&self) -> &str {
        if self.resolved_url.is_empty() {
            &self.given_url
        } else {
            &self.resolved_url
        }
    }

    /// Line appended to the digest for this item.
    pub fn digest_line(&self) -> String {
        format!("{} ( {} )\n", self.title(), self.url())
    }
}

impl fmt::Display for FetchItem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ( {} )", self.title(), self.url())
    }
}

/// Body of a successful `get` call.
#[derive(Debug, Default, Deserialize)]
pub struct FetchResult {
    #[serde(default, deserialize_with = "item_list")]
    pub list: BTreeMap<u64, FetchItem>,
}

impl FetchResult {
    pub fn len(&self) -> usize {
        self.list.len()
    }

    pub fn is_empty(&self) -> bool {
        self.list.is_empty()
    }

    /// Items in upstream sort order.
    ///
    /// The collection is keyed by item id, so map order says nothing about
    /// recency. Items are ordered by `sort_id`, then newest `time_added`,
    /// then key.
    pub fn into_items(self) -> Vec<FetchItem> {
        let mut entries: Vec<(u64, FetchItem)> = self.list.into_iter().collect();
        entries.sort_by(|(ka, a), (kb, b)| {
            a.sort_id
                .cmp(&b.sort_id)
                .then_with(|| b.time_added.cmp(&a.time_added))
                .then_with(|| ka.cmp(kb))
        });
        entries.into_iter().map(|(_, item)| item).collect()
    }
}

// =============================================================================
// Field decoders
// =============================================================================

/// A scalar Pocket sends either as a string or as a bare number.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum FlagValue {
    Text(String),
    Number(u64),
}

impl FlagValue {
    fn code(&self) -> Cow<'_, str> {
        match self {
            Self::Text(s) => Cow::Borrowed(s.trim()),
            Self::Number(n) => Cow::Owned(n.to_string()),
        }
    }
}

fn bool_flag<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    let value = FlagValue::deserialize(deserializer)?;
    match value.code().as_ref() {
        "0" => Ok(false),
        "1" => Ok(true),
        other => Err(de::Error::custom(format!("invalid boolean flag '{other}'"))),
    }
}

fn item_status<'de, D>(deserializer: D) -> Result<ItemStatus, D::Error>
where
    D: Deserializer<'de>,
{
    let value = FlagValue::deserialize(deserializer)?;
    let code = value.code();
    ItemStatus::from_code(&code)
        .ok_or_else(|| de::Error::custom(format!("invalid item status '{code}'")))
}

fn media_presence<'de, D>(deserializer: D) -> Result<MediaPresence, D::Error>
where
    D: Deserializer<'de>,
{
    let value = FlagValue::deserialize(deserializer)?;
    let code = value.code();
    MediaPresence::from_code(&code)
        .ok_or_else(|| de::Error::custom(format!("invalid media flag '{code}'")))
}

fn count<'de, D>(deserializer: D) -> Result<u64, D::Error>
where
    D: Deserializer<'de>,
{
    match FlagValue::deserialize(deserializer)? {
        FlagValue::Number(n) => Ok(n),
        FlagValue::Text(s) if s.trim().is_empty() => Ok(0),
        FlagValue::Text(s) => s
            .trim()
            .parse::<u64>()
            .map_err(|_| de::Error::custom(format!("invalid count '{s}'"))),
    }
}

fn timestamp<'de, D>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error>
where
    D: Deserializer<'de>,
{
    let secs = count(deserializer)?;
    if secs == 0 {
        return Ok(None);
    }
    let secs = i64::try_from(secs)
        .map_err(|_| D::Error::custom(format!("timestamp out of range: {secs}")))?;
    DateTime::from_timestamp(secs, 0)
        .map(Some)
        .ok_or_else(|| de::Error::custom(format!("timestamp out of range: {secs}")))
}

/// Pocket sends `"list": []` when nothing matches.
fn item_list<'de, D>(deserializer: D) -> Result<BTreeMap<u64, FetchItem>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = serde_json::Value::deserialize(deserializer)?;
    match value {
        serde_json::Value::Null => Ok(BTreeMap::new()),
        serde_json::Value::Array(entries) if entries.is_empty() => Ok(BTreeMap::new()),
        serde_json::Value::Object(entries) => entries
            .into_iter()
            .map(|(key, item)| -> Result<(u64, FetchItem), D::Error> {
                let id = key
                    .parse::<u64>()
                    .map_err(|_| D::Error::custom(format!("invalid item key '{key}'")))?;
                let item = FetchItem::deserialize(item).map_err(D::Error::custom)?;
                Ok((id, item))
            })
            .collect(),
        other => Err(de::Error::custom(format!(
            "expected an object of items, found {other}"
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample(
        given_title: &str,
        given_url: &str,
        resolved_title: &str,
        resolved_url: &str,
    ) -> FetchItem {
        FetchItem {
            item_id: "1".to_string(),
            given_title: given_title.to_string(),
            given_url: given_url.to_string(),
            resolved_title: resolved_title.to_string(),
            resolved_url: resolved_url.to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn test_title_prefers_resolved() {
        let item = sample("Given", "http://g", "Resolved", "http://r");
        assert_eq!(item.title(), "Resolved");
        assert_eq!(item.url(), "http://r");
    }

    #[test]
    fn test_title_falls_back_to_given() {
        let item = sample("Given", "http://g", "", "");
        assert_eq!(item.title(), "Given");
        assert_eq!(item.url(), "http://g");
    }

    #[test]
    fn test_title_and_url_fall_back_independently() {
        let item = sample("Given", "http://g", "", "http://r");
        assert_eq!(item.title(), "Given");
        assert_eq!(item.url(), "http://r");

        let item = sample("Given", "http://g", "Resolved", "");
        assert_eq!(item.title(), "Resolved");
        assert_eq!(item.url(), "http://g");
    }

    #[test]
    fn test_both_empty_stays_empty() {
        let item = sample("", "", "", "");
        assert_eq!(item.title(), "");
        assert_eq!(item.url(), "");
        assert_eq!(item.digest_line(), " (  )\n");
    }

    #[test]
    fn test_digest_line_format() {
        let item = sample("", "", "T", "U");
        assert_eq!(item.digest_line(), "T ( U )\n");
        assert_eq!(item.to_string(), "T ( U )");
    }

    #[test]
    fn test_decode_full_item() {
        let json = r#"{
            "item_id": "229279689",
            "resolved_id": "229279689",
            "given_url": "http://www.grantland.com/blog/the-triangle/post/_/id/38347/ryder-cup-preview",
            "given_title": "The Massive Ryder Cup Preview - The Triangle Blog - Grantland",
            "favorite": "1",
            "status": "0",
            "time_added": "1473190000",
            "time_updated": "1473190100",
            "time_read": "0",
            "time_favorited": "0",
            "sort_id": 0,
            "resolved_title": "The Massive Ryder Cup Preview",
            "resolved_url": "http://www.grantland.com/blog/the-triangle/post/_/id/38347/ryder-cup-preview",
            "excerpt": "The list of things I love about the Ryder Cup is so long",
            "is_article": "1",
            "is_index": "0",
            "has_video": "1",
            "has_image": "2",
            "word_count": "3197",
            "lang": "en",
            "listen_duration_estimate": 1238,
            "domain_metadata": {"name": "Grantland", "logo": "https://logo.example/g.png"},
            "tags": {"golf": {"item_id": "229279689", "tag": "golf"}}
        }"#;

        let item: FetchItem = serde_json::from_str(json).unwrap();
        assert_eq!(item.item_id, "229279689");
        assert!(item.favorite);
        assert_eq!(item.status, ItemStatus::Unread);
        assert_eq!(item.time_added.unwrap().timestamp(), 1_473_190_000);
        assert!(item.time_read.is_none());
        assert!(item.is_article);
        assert!(!item.is_index);
        assert_eq!(item.has_video, MediaPresence::Has);
        assert_eq!(item.has_image, MediaPresence::Is);
        assert_eq!(item.word_count, 3197);
        assert_eq!(item.listen_duration_estimate, 1238);
        assert_eq!(item.domain_metadata["name"], "Grantland");
        assert_eq!(item.tags["golf"]["tag"], "golf");
        assert_eq!(item.title(), "The Massive Ryder Cup Preview");
    }

    #[test]
    fn test_decode_rejects_unknown_flag() {
        let json = r#"{"item_id": "1", "favorite": "yes"}"#;
        let err = serde_json::from_str::<FetchItem>(json).unwrap_err();
        assert!(err.to_string().contains("invalid boolean flag 'yes'"));

        let json = r#"{"item_id": "1", "status": "7"}"#;
        assert!(serde_json::from_str::<FetchItem>(json).is_err());
    }

    #[test]
    fn test_decode_empty_list_as_array() {
        let json = r#"{"status": 2, "complete": 1, "list": [], "since": 1}"#;
        let result: FetchResult = serde_json::from_str(json).unwrap();
        assert!(result.is_empty());
    }

    #[test]
    fn test_decode_missing_list() {
        let result: FetchResult = serde_json::from_str(r#"{"status": 1}"#).unwrap();
        assert_eq!(result.len(), 0);
    }

    #[test]
    fn test_decode_rejects_bad_key() {
        let json = r#"{"list": {"abc": {"item_id": "1"}}}"#;
        assert!(serde_json::from_str::<FetchResult>(json).is_err());
    }

    #[test]
    fn test_into_items_follows_sort_id() {
        let json = r#"{"list": {
            "10": {"item_id": "10", "sort_id": 2, "given_title": "third"},
            "30": {"item_id": "30", "sort_id": 0, "given_title": "first"},
            "20": {"item_id": "20", "sort_id": 1, "given_title": "second"}
        }}"#;
        let result: FetchResult = serde_json::from_str(json).unwrap();
        let titles: Vec<String> = result
            .into_items()
            .iter()
            .map(|i| i.title().to_string())
            .collect();
        assert_eq!(titles, vec!["first", "second", "third"]);
    }

    #[test]
    fn test_into_items_ties_prefer_newest() {
        let json = r#"{"list": {
            "1": {"item_id": "1", "time_added": "100"},
            "2": {"item_id": "2", "time_added": "300"},
            "3": {"item_id": "3", "time_added": "200"}
        }}"#;
        let result: FetchResult = serde_json::from_str(json).unwrap();
        let ids: Vec<String> = result.into_items().into_iter().map(|i| i.item_id).collect();
        assert_eq!(ids, vec!["2", "3", "1"]);
    }
}
