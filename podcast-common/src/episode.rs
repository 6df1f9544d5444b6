//! Episode records and the episode data mapper
//!
//! [`RawEpisode`] is the schema of a record as the remote source returns it.
//! [`EpisodeMapper`] validates a raw record and turns it into the normalized
//! [`Episode`] used by page props and the playback queue.
//!
//! The display forms of the duration and of the publish date are derived from
//! `duration` and `published_at` whenever they are read. They are never stored.

use chrono::{DateTime, Datelike, NaiveDate, NaiveDateTime};
use serde::ser::SerializeStruct;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

use crate::duration::format_duration;
use crate::{Error, Result};

// ============================================================================
// Raw record schema
// ============================================================================

/// Episode record as served by `GET /episodes` and `GET /episodes/{id}`
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct RawEpisode {
    #[serde(deserialize_with = "string_or_number")]
    pub id: String,
    pub title: String,
    pub members: String,
    pub thumbnail: String,
    /// ISO-8601 timestamp, validated by the mapper
    pub published_at: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Media file; required by the mapper, optional here so the error names the record
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file: Option<RawFile>,
}

/// Nested media file of a raw record
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct RawFile {
    pub duration: RawDuration,
    pub url: String,
    #[serde(default, rename = "type", skip_serializing_if = "Option::is_none")]
    pub mime_type: Option<String>,
}

/// Duration as the source sends it: a JSON number or a numeric string
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(untagged)]
pub enum RawDuration {
    Seconds(u64),
    Fractional(f64),
    Text(String),
}

impl RawDuration {
    /// Whole seconds, or `None` when the value is negative or not a number.
    /// Fractional values truncate.
    pub fn to_seconds(&self) -> Option<u64> {
        match self {
            RawDuration::Seconds(secs) => Some(*secs),
            RawDuration::Fractional(value) => whole_seconds(*value),
            RawDuration::Text(text) => {
                let text = text.trim();
                text.parse::<u64>()
                    .ok()
                    .or_else(|| text.parse::<f64>().ok().and_then(whole_seconds))
            }
        }
    }
}

fn whole_seconds(value: f64) -> Option<u64> {
    if value.is_finite() && value >= 0.0 && value <= u64::MAX as f64 {
        Some(value.trunc() as u64)
    } else {
        None
    }
}

fn string_or_number<'de, D>(deserializer: D) -> std::result::Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Id {
        Text(String),
        Number(i64),
    }

    Ok(match Id::deserialize(deserializer)? {
        Id::Text(text) => text,
        Id::Number(n) => n.to_string(),
    })
}

// ============================================================================
// Date locale
// ============================================================================

/// Fixed locale used for publish date display
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
pub enum DateLocale {
    /// `8 jan 21`
    #[default]
    #[serde(rename = "pt-BR")]
    PtBr,
    /// `8 Jan 21`
    #[serde(rename = "en-US")]
    EnUs,
}

const PT_BR_MONTHS: [&str; 12] = [
    "jan", "fev", "mar", "abr", "mai", "jun", "jul", "ago", "set", "out", "nov", "dez",
];

const EN_US_MONTHS: [&str; 12] = [
    "Jan", "Feb", "Mar", "Apr", "May", "Jun", "Jul", "Aug", "Sep", "Oct", "Nov", "Dec",
];

impl DateLocale {
    /// Abbreviated month name, `month` in 1..=12
    pub fn month_abbrev(self, month: u32) -> &'static str {
        let table = match self {
            DateLocale::PtBr => &PT_BR_MONTHS,
            DateLocale::EnUs => &EN_US_MONTHS,
        };
        table[(month.clamp(1, 12) - 1) as usize]
    }

    /// "day abbreviated-month 2-digit-year", day unpadded
    pub fn format_date(self, when: &NaiveDateTime) -> String {
        format!(
            "{} {} {}",
            when.day(),
            self.month_abbrev(when.month()),
            when.format("%y")
        )
    }

    pub fn tag(self) -> &'static str {
        match self {
            DateLocale::PtBr => "pt-BR",
            DateLocale::EnUs => "en-US",
        }
    }
}

impl fmt::Display for DateLocale {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

impl FromStr for DateLocale {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "pt-BR" | "pt_BR" => Ok(DateLocale::PtBr),
            "en-US" | "en_US" => Ok(DateLocale::EnUs),
            other => Err(Error::Config(format!("Unsupported date locale: {}", other))),
        }
    }
}

/// Parse an ISO-8601 publish timestamp into its wall-clock form.
///
/// Accepts RFC 3339 with an offset, naive date-times with either `T` or a
/// space separator, and bare dates. Offsets are not converted: the wall-clock
/// reading of the timestamp is what gets displayed.
pub fn parse_published_at(text: &str) -> Option<NaiveDateTime> {
    let text = text.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(text) {
        return Some(dt.naive_local());
    }
    for pattern in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M"] {
        if let Ok(dt) = NaiveDateTime::parse_from_str(text, pattern) {
            return Some(dt);
        }
    }
    NaiveDate::parse_from_str(text, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
}

// ============================================================================
// Normalized episode
// ============================================================================

/// Normalized episode used for rendering and playback
#[derive(Debug, Clone, PartialEq)]
pub struct Episode {
    pub id: String,
    pub title: String,
    pub members: String,
    pub thumbnail: String,
    /// Length in whole seconds
    pub duration: u64,
    /// Playable media URL
    pub url: String,
    pub published_at: NaiveDateTime,
    pub locale: DateLocale,
    /// Trusted HTML, detail entity only
    pub description: Option<String>,
}

impl Episode {
    pub fn duration_as_string(&self) -> String {
        format_duration(self.duration)
    }

    pub fn published_at_display(&self) -> String {
        self.locale.format_date(&self.published_at)
    }
}

impl Serialize for Episode {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let fields = if self.description.is_some() { 9 } else { 8 };
        let mut state = serializer.serialize_struct("Episode", fields)?;
        state.serialize_field("id", &self.id)?;
        state.serialize_field("title", &self.title)?;
        state.serialize_field("members", &self.members)?;
        state.serialize_field("thumbnail", &self.thumbnail)?;
        state.serialize_field("duration", &self.duration)?;
        state.serialize_field("durationAsString", &self.duration_as_string())?;
        state.serialize_field("url", &self.url)?;
        state.serialize_field("publishedAt", &self.published_at_display())?;
        if let Some(description) = &self.description {
            state.serialize_field("description", description)?;
        }
        state.end()
    }
}

// ============================================================================
// Mapper
// ============================================================================

/// Turns raw records into [`Episode`]s for a fixed display locale
#[derive(Debug, Clone, Copy, Default)]
pub struct EpisodeMapper {
    locale: DateLocale,
}

impl EpisodeMapper {
    pub fn new(locale: DateLocale) -> Self {
        Self { locale }
    }

    pub fn locale(&self) -> DateLocale {
        self.locale
    }

    /// Listing entity: everything except the description
    pub fn summary(&self, raw: RawEpisode) -> Result<Episode> {
        let mut episode = self.map(raw)?;
        episode.description = None;
        Ok(episode)
    }

    /// Detail entity: keeps the description, empty when the record has none
    pub fn detail(&self, raw: RawEpisode) -> Result<Episode> {
        let mut episode = self.map(raw)?;
        episode.description.get_or_insert_with(String::new);
        Ok(episode)
    }

    fn map(&self, raw: RawEpisode) -> Result<Episode> {
        let file = raw
            .file
            .ok_or_else(|| Error::malformed(&raw.id, "missing file"))?;

        let duration = file.duration.to_seconds().ok_or_else(|| {
            Error::malformed(&raw.id, format!("invalid duration {:?}", file.duration))
        })?;

        let published_at = parse_published_at(&raw.published_at).ok_or_else(|| {
            Error::malformed(&raw.id, format!("unparseable published_at {:?}", raw.published_at))
        })?;

        Ok(Episode {
            id: raw.id,
            title: raw.title,
            members: raw.members,
            thumbnail: raw.thumbnail,
            duration,
            url: file.url,
            published_at,
            locale: self.locale,
            description: raw.description,
        })
    }
}
