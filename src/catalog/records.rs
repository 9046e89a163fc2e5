//! Marker records and the configuration rows they are built from

use crate::core::{GeoFix, ID_CATEGORY_STRIDE};
use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::warn;

/// Classification of a marker. Serialized as its numeric code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "u32", into = "u32")]
pub enum MarkerCategory {
    Kaaba,
    Mosque,
    /// Mussala, a place set aside for prayer
    PrayerRoom,
    Person,
    Sponsor,
    TeamMember,
    Pointer,
    /// Any code not listed above, kept verbatim
    Unrecognized(u32),
}

impl MarkerCategory {
    pub const ALL: [MarkerCategory; 7] = [
        MarkerCategory::Kaaba,
        MarkerCategory::Mosque,
        MarkerCategory::PrayerRoom,
        MarkerCategory::Person,
        MarkerCategory::Sponsor,
        MarkerCategory::TeamMember,
        MarkerCategory::Pointer,
    ];

    /// Numeric code used in `markers.json` and in id encoding
    pub fn code(&self) -> u32 {
        match self {
            MarkerCategory::Kaaba => 1,
            MarkerCategory::Mosque => 10,
            MarkerCategory::PrayerRoom => 15,
            MarkerCategory::Person => 40,
            MarkerCategory::Sponsor => 50,
            MarkerCategory::TeamMember => 60,
            MarkerCategory::Pointer => 1000,
            MarkerCategory::Unrecognized(code) => *code,
        }
    }

    /// Parse a category name as typed on the command line
    pub fn from_name(name: &str) -> Option<Self> {
        match name.to_ascii_lowercase().as_str() {
            "kaaba" => Some(MarkerCategory::Kaaba),
            "mosque" => Some(MarkerCategory::Mosque),
            "prayer_room" | "prayer-room" | "mussala" => Some(MarkerCategory::PrayerRoom),
            "person" | "muslim" => Some(MarkerCategory::Person),
            "sponsor" => Some(MarkerCategory::Sponsor),
            "team_member" | "team-member" | "team" => Some(MarkerCategory::TeamMember),
            "pointer" => Some(MarkerCategory::Pointer),
            _ => name.parse::<u32>().ok().map(MarkerCategory::from),
        }
    }
}

impl From<u32> for MarkerCategory {
    fn from(code: u32) -> Self {
        match code {
            1 => MarkerCategory::Kaaba,
            10 => MarkerCategory::Mosque,
            15 => MarkerCategory::PrayerRoom,
            40 => MarkerCategory::Person,
            50 => MarkerCategory::Sponsor,
            60 => MarkerCategory::TeamMember,
            1000 => MarkerCategory::Pointer,
            other => MarkerCategory::Unrecognized(other),
        }
    }
}

impl From<MarkerCategory> for u32 {
    fn from(category: MarkerCategory) -> Self {
        category.code()
    }
}

impl Default for MarkerCategory {
    fn default() -> Self {
        MarkerCategory::Unrecognized(0)
    }
}

impl fmt::Display for MarkerCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MarkerCategory::Kaaba => write!(f, "kaaba"),
            MarkerCategory::Mosque => write!(f, "mosque"),
            MarkerCategory::PrayerRoom => write!(f, "prayer_room"),
            MarkerCategory::Person => write!(f, "person"),
            MarkerCategory::Sponsor => write!(f, "sponsor"),
            MarkerCategory::TeamMember => write!(f, "team_member"),
            MarkerCategory::Pointer => write!(f, "pointer"),
            MarkerCategory::Unrecognized(code) => write!(f, "category {}", code),
        }
    }
}

/// Pack a category and a raw record id into one map-wide id.
///
/// `category_code * 100_000_000 + raw_id`. Unique across categories as
/// long as `raw_id` stays within `1..100_000_000`; larger ids are still
/// encoded but may collide. A zero code leaves the id unchanged, as does
/// an id too large to encode at all.
pub fn encode_id(category: MarkerCategory, raw_id: i64) -> i64 {
    if raw_id >= ID_CATEGORY_STRIDE {
        warn!(raw_id, %category, "marker id may collide across categories");
    }

    match (category.code() as i64)
        .checked_mul(ID_CATEGORY_STRIDE)
        .and_then(|base| base.checked_add(raw_id))
    {
        Some(encoded) => encoded,
        None => {
            warn!(raw_id, %category, "marker id too large to encode, left unchanged");
            raw_id
        }
    }
}

/// Contact entry attached to a marker
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Contact {
    #[serde(rename = "type")]
    pub kind: String,
    pub value: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub person: String,
}

/// Address as written in `markers.json`: plain text or `{"full": ...}`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Address {
    Text(String),
    Detailed { full: String },
}

impl Address {
    pub fn as_text(&self) -> &str {
        match self {
            Address::Text(text) => text,
            Address::Detailed { full } => full,
        }
    }
}

impl Default for Address {
    fn default() -> Self {
        Address::Text(String::new())
    }
}

/// One row of `markers.json`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MarkerInfo {
    pub id: i64,
    #[serde(default, alias = "name")]
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(rename = "type", default)]
    pub category: MarkerCategory,
    #[serde(default)]
    pub address: Address,
    pub gps: GeoFix,
    #[serde(default, alias = "contacts")]
    pub contact: Vec<Contact>,
    /// Imam responsible for the site
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub iman: Option<String>,
}

/// A project sponsor, shown on the map when it has a location
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Sponsor {
    #[serde(default)]
    pub id: i64,
    pub name: String,
    #[serde(default)]
    pub description: String,
    /// Logo as a data URI or URL
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub logo: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gps: Option<GeoFix>,
}

/// A project team member, shown on the map when they have a location
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TeamMember {
    #[serde(default)]
    pub id: i64,
    pub name: String,
    #[serde(default)]
    pub role: String,
    /// Photo as a data URI or URL
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub photo: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gps: Option<GeoFix>,
}

/// Normalized marker, whatever list it came from
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MarkerRecord {
    pub id: i64,
    pub title: String,
    pub description: String,
    pub address: String,
    pub category: MarkerCategory,
    pub position: GeoFix,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub photo_ref: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub contacts: Vec<Contact>,
}

impl MarkerRecord {
    /// Map-wide id, see [`encode_id`]
    pub fn encoded_id(&self) -> i64 {
        encode_id(self.category, self.id)
    }
}

impl From<MarkerInfo> for MarkerRecord {
    fn from(info: MarkerInfo) -> Self {
        MarkerRecord {
            id: info.id,
            title: info.title,
            description: info.description,
            address: info.address.as_text().to_string(),
            category: info.category,
            position: info.gps,
            photo_ref: None,
            contacts: info.contact,
        }
    }
}

impl Sponsor {
    /// `None` when the sponsor has no location
    pub fn to_record(&self) -> Option<MarkerRecord> {
        let position = self.gps?;
        Some(MarkerRecord {
            id: self.id,
            title: self.name.clone(),
            description: self.description.clone(),
            address: String::new(),
            category: MarkerCategory::Sponsor,
            position,
            photo_ref: self.logo.clone(),
            contacts: Vec::new(),
        })
    }
}

impl TeamMember {
    /// `None` when the member has no location
    pub fn to_record(&self) -> Option<MarkerRecord> {
        let position = self.gps?;
        Some(MarkerRecord {
            id: self.id,
            title: self.name.clone(),
            description: self.role.clone(),
            address: String::new(),
            category: MarkerCategory::TeamMember,
            position,
            photo_ref: self.photo.clone(),
            contacts: Vec::new(),
        })
    }
}

/// Every shape a marker can be created from
#[derive(Debug, Clone, PartialEq)]
pub enum MarkerSource {
    /// Loose fields supplied by the caller
    RawFields {
        id: i64,
        category: MarkerCategory,
        title: String,
        snippet: String,
        address: String,
        position: GeoFix,
    },
    Info(MarkerInfo),
    Sponsor(Sponsor),
    TeamMember(TeamMember),
}

impl MarkerSource {
    /// Normalize into a record; sponsors and team members without a
    /// location produce nothing
    pub fn into_record(self) -> Option<MarkerRecord> {
        match self {
            MarkerSource::RawFields { id, category, title, snippet, address, position } => {
                Some(MarkerRecord {
                    id,
                    title,
                    description: snippet,
                    address,
                    category,
                    position,
                    photo_ref: None,
                    contacts: Vec::new(),
                })
            }
            MarkerSource::Info(info) => Some(MarkerRecord::from(info)),
            MarkerSource::Sponsor(sponsor) => sponsor.to_record(),
            MarkerSource::TeamMember(member) => member.to_record(),
        }
    }
}
