//! Configuration sources for marker, sponsor and team lists

use crate::catalog::error::{CatalogError, CatalogResult};
use crate::catalog::records::{MarkerInfo, MarkerRecord, Sponsor, TeamMember};
use serde::de::DeserializeOwned;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Where the catalog reads its static lists from
pub trait RecordSource {
    /// Points of interest (`markers.json`)
    fn markers(&self) -> CatalogResult<Vec<MarkerInfo>>;

    /// Project sponsors
    fn sponsors(&self) -> CatalogResult<Vec<Sponsor>>;

    /// Project team members
    fn team(&self) -> CatalogResult<Vec<TeamMember>>;
}

/// Read the points of interest once, dropping placeholder rows (`id <= 0`).
/// Source order is kept.
pub fn load_marker_records(source: &dyn RecordSource) -> CatalogResult<Vec<MarkerRecord>> {
    let rows = source.markers()?;
    let total = rows.len();

    let records: Vec<MarkerRecord> = rows
        .into_iter()
        .filter(|info| info.id > 0)
        .map(MarkerRecord::from)
        .collect();

    if records.len() != total {
        debug!(dropped = total - records.len(), "skipped placeholder marker rows");
    }
    Ok(records)
}

/// JSON files in one settings directory
#[derive(Debug, Clone)]
pub struct JsonDirectorySource {
    dir: PathBuf,
    markers_file: String,
    sponsors_file: String,
    team_file: String,
}

impl JsonDirectorySource {
    /// Directory holding `markers.json`, `sponsors.json` and `team.json`
    pub fn new<P: AsRef<Path>>(dir: P) -> Self {
        Self {
            dir: dir.as_ref().to_path_buf(),
            markers_file: "markers.json".to_string(),
            sponsors_file: "sponsors.json".to_string(),
            team_file: "team.json".to_string(),
        }
    }

    pub fn with_file_names(mut self, markers: &str, sponsors: &str, team: &str) -> Self {
        self.markers_file = markers.to_string();
        self.sponsors_file = sponsors.to_string();
        self.team_file = team.to_string();
        self
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Read a JSON array. A missing optional file reads as an empty list.
    fn read_list<T: DeserializeOwned>(&self, file: &str, required: bool) -> CatalogResult<Vec<T>> {
        let path = self.dir.join(file);
        let path_str = path.to_string_lossy().to_string();

        let content = match fs::read_to_string(&path) {
            Ok(content) => content,
            Err(e) if e.kind() == ErrorKind::NotFound && !required => {
                debug!(path = %path_str, "optional list not found, using none");
                return Ok(Vec::new());
            }
            Err(e) => return Err(CatalogError::config_load(path_str, e)),
        };

        serde_json::from_str(&content).map_err(|e| CatalogError::config_load(path_str, e))
    }
}

impl RecordSource for JsonDirectorySource {
    fn markers(&self) -> CatalogResult<Vec<MarkerInfo>> {
        self.read_list(&self.markers_file, true)
    }

    fn sponsors(&self) -> CatalogResult<Vec<Sponsor>> {
        self.read_list(&self.sponsors_file, false)
    }

    fn team(&self) -> CatalogResult<Vec<TeamMember>> {
        self.read_list(&self.team_file, false)
    }
}

/// Lists held in memory
#[derive(Debug, Clone, Default)]
pub struct StaticSource {
    pub markers: Vec<MarkerInfo>,
    pub sponsors: Vec<Sponsor>,
    pub team: Vec<TeamMember>,
}

impl StaticSource {
    pub fn new(markers: Vec<MarkerInfo>) -> Self {
        Self {
            markers,
            ..Self::default()
        }
    }

    pub fn with_sponsors(mut self, sponsors: Vec<Sponsor>) -> Self {
        self.sponsors = sponsors;
        self
    }

    pub fn with_team(mut self, team: Vec<TeamMember>) -> Self {
        self.team = team;
        self
    }

    /// Parse the three lists from JSON text
    pub fn from_json(markers: &str, sponsors: &str, team: &str) -> CatalogResult<Self> {
        Ok(Self {
            markers: serde_json::from_str(markers)
                .map_err(|e| CatalogError::config_load("markers", e))?,
            sponsors: serde_json::from_str(sponsors)
                .map_err(|e| CatalogError::config_load("sponsors", e))?,
            team: serde_json::from_str(team).map_err(|e| CatalogError::config_load("team", e))?,
        })
    }
}

impl RecordSource for StaticSource {
    fn markers(&self) -> CatalogResult<Vec<MarkerInfo>> {
        Ok(self.markers.clone())
    }

    fn sponsors(&self) -> CatalogResult<Vec<Sponsor>> {
        Ok(self.sponsors.clone())
    }

    fn team(&self) -> CatalogResult<Vec<TeamMember>> {
        Ok(self.team.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn marker_json(ids: &[i64]) -> String {
        let rows: Vec<String> = ids
            .iter()
            .map(|id| {
                format!(
                    r#"{{"id": {}, "title": "m{}", "type": 10, "gps": {{"latitude": -3.7, "longitude": -38.5}}}}"#,
                    id, id
                )
            })
            .collect();
        format!("[{}]", rows.join(","))
    }

    #[test]
    fn test_placeholder_rows_dropped_in_order() {
        let source = StaticSource::from_json(&marker_json(&[0, 1, -3, 5]), "[]", "[]").unwrap();
        let records = load_marker_records(&source).unwrap();
        let ids: Vec<i64> = records.iter().map(|r| r.id).collect();
        assert_eq!(ids, vec![1, 5]);
    }

    #[test]
    fn test_malformed_markers_rejected() {
        let result = StaticSource::from_json(r#"[{"id": 1}]"#, "[]", "[]");
        assert!(matches!(result, Err(CatalogError::ConfigLoad { ref origin, .. }) if origin == "markers"));
    }

    #[test]
    fn test_directory_source() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("markers.json"), marker_json(&[1, 2])).unwrap();
        fs::write(
            dir.path().join("sponsors.json"),
            r#"[{"id": 2, "name": "Acme", "gps": {"latitude": -3.92, "longitude": -38.45}}]"#,
        )
        .unwrap();

        let source = JsonDirectorySource::new(dir.path());
        assert_eq!(load_marker_records(&source).unwrap().len(), 2);
        assert_eq!(source.sponsors().unwrap().len(), 1);
        // team.json is optional
        assert!(source.team().unwrap().is_empty());
    }

    #[test]
    fn test_missing_markers_file_is_fatal() {
        let dir = tempdir().unwrap();
        let source = JsonDirectorySource::new(dir.path());
        assert!(matches!(source.markers(), Err(CatalogError::ConfigLoad { .. })));
    }

    #[test]
    fn test_malformed_optional_file_is_fatal() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("team.json"), "{not json").unwrap();
        let source = JsonDirectorySource::new(dir.path());
        assert!(source.team().is_err());
    }
}
