//! Typed view over mediainfo JSON output.

use crate::error::{Error, Result};
use crate::format::coalesce;
use serde::Deserialize;
use serde_json::{Map, Value};

/// Kind of a track, taken from its `@type` attribute.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub enum TrackKind {
    General,
    Video,
    Audio,
    Text,
    Menu,
    #[serde(other)]
    Other,
}

impl TrackKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            TrackKind::General => "General",
            TrackKind::Video => "Video",
            TrackKind::Audio => "Audio",
            TrackKind::Text => "Text",
            TrackKind::Menu => "Menu",
            TrackKind::Other => "Other",
        }
    }
}

impl std::fmt::Display for TrackKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// One track of a probed file.
#[derive(Debug, Clone, Deserialize)]
pub struct Track {
    #[serde(rename = "@type")]
    pub kind: TrackKind,
    #[serde(flatten)]
    pub attributes: Map<String, Value>,
}

impl Track {
    /// Read an attribute as text.
    ///
    /// Numbers and booleans are rendered; null, blank strings and nested
    /// objects count as absent.
    pub fn text(&self, name: &str) -> Option<String> {
        let value = match self.attributes.get(name)? {
            Value::String(s) => Some(s.clone()),
            Value::Number(n) => Some(n.to_string()),
            Value::Bool(b) => Some(b.to_string()),
            _ => None,
        };
        coalesce([value])
    }
}

#[derive(Debug, Deserialize)]
struct Envelope {
    media: MediaSection,
}

#[derive(Debug, Deserialize)]
struct MediaSection {
    #[serde(rename = "@ref")]
    reference: String,
    #[serde(rename = "track")]
    tracks: Vec<Track>,
}

/// A single probe result: reference path, tracks, and the raw JSON it came from.
#[derive(Debug, Clone)]
pub struct RawMediaRecord {
    pub reference: String,
    pub tracks: Vec<Track>,
    raw: Value,
}

impl RawMediaRecord {
    /// Build a record from parsed probe JSON.
    pub fn from_value(raw: Value) -> Result<Self> {
        let envelope = Envelope::deserialize(&raw).map_err(|e| Error::Structure(e.to_string()))?;

        Ok(Self {
            reference: envelope.media.reference,
            tracks: envelope.media.tracks,
            raw,
        })
    }

    /// Parse one line of a probe dump.
    pub fn from_json_str(line: &str) -> Result<Self> {
        let raw: Value = serde_json::from_str(line)?;
        Self::from_value(raw)
    }

    /// First track of the given kind.
    pub fn track(&self, kind: TrackKind) -> Option<&Track> {
        self.tracks.iter().find(|t| t.kind == kind)
    }

    /// Shorthand for `track(kind)?.text(name)`.
    pub fn field(&self, kind: TrackKind, name: &str) -> Option<String> {
        self.track(kind)?.text(name)
    }

    /// Base name of the reference path; handles both separator styles.
    pub fn file_name(&self) -> &str {
        self.reference
            .rsplit(['/', '\\'])
            .next()
            .unwrap_or(&self.reference)
    }

    /// Record the volume label inside the raw JSON.
    pub fn set_volume(&mut self, volume: &str) {
        if let Value::Object(map) = &mut self.raw {
            map.insert("volume".to_string(), Value::String(volume.to_string()));
        }
    }

    /// The raw probe JSON.
    pub fn raw(&self) -> &Value {
        &self.raw
    }

    /// Compact single-line JSON, as written to probe dumps.
    pub fn to_json_line(&self) -> String {
        self.raw.to_string()
    }
}
