//! Marker icon resolution

use crate::catalog::error::CatalogError;
use crate::catalog::records::MarkerCategory;
use crate::core::{PERSON_ICON_ASSET, PLACE_ICON_ASSET};
use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use serde::Serialize;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, PoisonError};
use tracing::{debug, warn};

const DATA_URI_PREFIX: &str = "data:";

/// Icons shipped with the application
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum BundledIcon {
    /// Places of prayer
    Place,
    /// People and free pointers
    Person,
}

impl BundledIcon {
    pub fn asset(&self) -> &'static str {
        match self {
            BundledIcon::Place => PLACE_ICON_ASSET,
            BundledIcon::Person => PERSON_ICON_ASSET,
        }
    }

    /// Bundled icon for a category, if it has one
    pub fn for_category(category: MarkerCategory) -> Option<Self> {
        match category {
            MarkerCategory::Kaaba | MarkerCategory::Mosque | MarkerCategory::PrayerRoom => {
                Some(BundledIcon::Place)
            }
            MarkerCategory::Person | MarkerCategory::Pointer => Some(BundledIcon::Person),
            MarkerCategory::Sponsor
            | MarkerCategory::TeamMember
            | MarkerCategory::Unrecognized(_) => None,
        }
    }
}

/// A resolved marker icon
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "source", rename_all = "snake_case")]
pub enum Icon {
    Bundled { kind: BundledIcon, path: PathBuf },
    Inline {
        mime: String,
        #[serde(skip)]
        bytes: Arc<[u8]>,
    },
}

impl Icon {
    pub fn bundled_kind(&self) -> Option<BundledIcon> {
        match self {
            Icon::Bundled { kind, .. } => Some(*kind),
            Icon::Inline { .. } => None,
        }
    }
}

/// What an icon is looked up by
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum IconRef<'a> {
    Category(MarkerCategory),
    /// Data URI, URL or anything else a record carries
    Reference(&'a str),
}

/// Resolves icon references and memoizes decoded inline images
pub struct IconCache {
    assets_dir: PathBuf,
    inline: Mutex<HashMap<String, Icon>>,
    debug: bool,
}

impl IconCache {
    pub fn new<P: AsRef<Path>>(assets_dir: P, debug: bool) -> Self {
        Self {
            assets_dir: assets_dir.as_ref().to_path_buf(),
            inline: Mutex::new(HashMap::new()),
            debug,
        }
    }

    fn bundled(&self, kind: BundledIcon) -> Icon {
        Icon::Bundled {
            kind,
            path: self.assets_dir.join(kind.asset()),
        }
    }

    /// Resolve an icon reference.
    ///
    /// Categories map to bundled icons; `data:` URIs are decoded inline;
    /// `http` references fall back to the bundled person icon without any
    /// network access. Anything else, or a data URI that fails to decode,
    /// yields no icon and the caller picks a default.
    pub fn resolve(&self, reference: IconRef<'_>) -> Option<Icon> {
        match reference {
            IconRef::Category(category) => {
                let icon = BundledIcon::for_category(category).map(|kind| self.bundled(kind));
                if icon.is_none() && self.debug {
                    debug!(%category, "no bundled icon for category");
                }
                icon
            }
            IconRef::Reference(text) if text.starts_with(DATA_URI_PREFIX) => {
                self.resolve_data_uri(text)
            }
            IconRef::Reference(text) if text.starts_with("http") => {
                if self.debug {
                    debug!(url = text, "remote icon replaced by bundled person icon");
                }
                Some(self.bundled(BundledIcon::Person))
            }
            IconRef::Reference(text) => {
                if self.debug {
                    debug!(reference = text, "unrecognized icon reference");
                }
                None
            }
        }
    }

    fn resolve_data_uri(&self, uri: &str) -> Option<Icon> {
        let mut cache = self.inline.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(icon) = cache.get(uri) {
            return Some(icon.clone());
        }

        match decode_data_uri(uri) {
            Ok((mime, bytes)) => {
                let icon = Icon::Inline {
                    mime,
                    bytes: Arc::from(bytes),
                };
                cache.insert(uri.to_string(), icon.clone());
                Some(icon)
            }
            Err(e) => {
                warn!(error = %e, "marker icon dropped");
                None
            }
        }
    }

    /// Number of decoded inline icons held
    pub fn cached_count(&self) -> usize {
        self.inline.lock().unwrap_or_else(PoisonError::into_inner).len()
    }

    pub fn assets_dir(&self) -> &Path {
        &self.assets_dir
    }
}

/// Split a data URI into its media type and payload bytes
pub fn decode_data_uri(uri: &str) -> Result<(String, Vec<u8>), CatalogError> {
    let failure = |reason: &str| CatalogError::IconResolution {
        reference: abbreviate(uri),
        reason: reason.to_string(),
    };

    let rest = uri.strip_prefix(DATA_URI_PREFIX).ok_or_else(|| failure("not a data URI"))?;
    let (header, payload) = rest.split_once(',').ok_or_else(|| failure("missing ',' separator"))?;

    let (media_type, is_base64) = match header.strip_suffix(";base64") {
        Some(media_type) => (media_type, true),
        None => (header, false),
    };
    let mime = if media_type.is_empty() {
        "text/plain".to_string()
    } else {
        media_type.to_string()
    };

    let bytes = if is_base64 {
        let compact: String = payload.chars().filter(|c| !c.is_whitespace()).collect();
        STANDARD
            .decode(compact.as_bytes())
            .map_err(|e| failure(&e.to_string()))?
    } else {
        payload.as_bytes().to_vec()
    };

    if bytes.is_empty() {
        return Err(failure("empty payload"));
    }
    Ok((mime, bytes))
}

// Keep multi-kilobyte data URIs out of log lines
fn abbreviate(uri: &str) -> String {
    const MAX: usize = 48;
    match uri.char_indices().nth(MAX) {
        Some((idx, _)) => format!("{}...", &uri[..idx]),
        None => uri.to_string(),
    }
}
