//! Placeholder tokens for templated form filling.
//!
//! A [`PlaceholderMap`] is a flat mapping from bracketed tokens such as
//! `{start_year}` to replacement strings. Maps are built by the constructor
//! functions below, consumed once by a substitution pass over a document,
//! and discarded.

use chrono::{Datelike, Duration, NaiveDate};
use tracing::{debug, info};

/// Upper limit of roster slots in the application form template.
pub const MAX_MEMBERS: usize = 7;

/// Flat token -> replacement mapping. Insertion order is preserved so the
/// substitution pass and log output stay deterministic.
#[derive(Debug, Clone, Default)]
pub struct PlaceholderMap {
    entries: Vec<(String, String)>,
}

impl PlaceholderMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or overwrite a token.
    pub fn insert(&mut self, token: impl Into<String>, value: impl Into<String>) {
        let token = token.into();
        let value = value.into();
        if let Some(entry) = self.entries.iter_mut().find(|(t, _)| *t == token) {
            entry.1 = value;
        } else {
            self.entries.push((token, value));
        }
    }

    pub fn get(&self, token: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(t, _)| t == token)
            .map(|(_, v)| v.as_str())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(t, v)| (t.as_str(), v.as_str()))
    }

    /// Replace every contained token in `text`.
    ///
    /// Returns the new text and whether anything changed. Tokens absent
    /// from the text leave it untouched.
    pub fn apply_to_text(&self, text: &str) -> (String, bool) {
        let mut result = text.to_string();
        let mut replaced = false;
        for (token, value) in &self.entries {
            if result.contains(token.as_str()) {
                result = result.replace(token.as_str(), value);
                replaced = true;
            }
        }
        (result, replaced)
    }

    /// Merge another map into this one (later entries win on collision).
    pub fn extend(&mut self, other: PlaceholderMap) {
        for (token, value) in other.entries {
            self.insert(token, value);
        }
    }
}

/// One roster slot in the application form.
#[derive(Debug, Clone, Default)]
pub struct Member {
    pub id: String,
    pub name: String,
    pub age: String,
    pub gender: String,
}

/// Everything the form asks about the applying group.
#[derive(Debug, Clone)]
pub struct Roster {
    pub room: String,
    pub phone: String,
    pub members: Vec<Member>,
}

/// Date tokens for the form: the stay starts tomorrow and ends one week
/// after the base date.
pub fn date_map(base_date: NaiveDate) -> PlaceholderMap {
    let tomorrow = base_date + Duration::days(1);
    let one_week_later = base_date + Duration::weeks(1);
    info!("building date placeholders from base date {base_date}");

    let mut map = PlaceholderMap::new();
    map.insert("{start_year}", tomorrow.year().to_string());
    map.insert("{start_month}", tomorrow.month().to_string());
    map.insert("{start_day}", tomorrow.day().to_string());
    map.insert("{start_short_year}", format!("{:02}", tomorrow.year() % 100));
    map.insert("{end_month}", one_week_later.month().to_string());
    map.insert("{end_day}", one_week_later.day().to_string());
    map.insert(
        "{end_short_year}",
        format!("{:02}", one_week_later.year() % 100),
    );
    map
}

/// Roster tokens: headline fields plus exactly [`MAX_MEMBERS`] slots of
/// id/name/age/gender, blank-padded past the actual member count.
pub fn member_map(roster: &Roster) -> PlaceholderMap {
    let mut map = PlaceholderMap::new();
    map.insert("{total_members}", roster.members.len().to_string());
    map.insert("{use_room}", roster.room.clone());
    map.insert("{phone_number}", roster.phone.clone());

    for slot in 0..MAX_MEMBERS {
        let member = roster.members.get(slot).cloned().unwrap_or_default();
        let n = slot + 1;
        map.insert(format!("{{member_id_{n}}}"), member.id);
        map.insert(format!("{{member_name_{n}}}"), member.name);
        map.insert(format!("{{age_{n}}}"), member.age);
        map.insert(format!("{{gender_{n}}}"), member.gender);
    }

    debug!("roster placeholders ready: {} entries", map.len());
    map
}

/// Count the gender slots and append `{total_males}` / `{total_females}`.
pub fn add_gender_totals(map: &mut PlaceholderMap) {
    let mut males = 0;
    let mut females = 0;
    for (token, value) in map.iter() {
        if token.contains("gender") {
            match value {
                "male" => males += 1,
                "female" => females += 1,
                _ => {}
            }
        }
    }

    map.insert("{total_males}", males.to_string());
    map.insert("{total_females}", females.to_string());
    info!("gender totals appended: {males} male / {females} female");
}
