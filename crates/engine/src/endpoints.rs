//! Regional endpoint configuration.
//!
//! The remote service is deployed per region; a task's region key is chosen
//! at submission and must be threaded unchanged through every call for the
//! task's lifetime. The map is built once at startup and read-only after.

use std::collections::HashMap;

use crate::adapter::EngineError;

/// Read-only map from region key to base URL.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RegionMap {
    endpoints: HashMap<String, String>,
}

/// Errors from parsing a region table string.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RegionMapError {
    #[error("invalid region entry '{0}', expected name=url")]
    InvalidEntry(String),

    #[error("region table is empty")]
    Empty,
}

impl RegionMap {
    pub fn new(endpoints: HashMap<String, String>) -> Self {
        Self { endpoints }
    }

    /// Parse a `name=url,name=url` table (the `REGION_ENDPOINTS`
    /// environment variable format). Trailing slashes on URLs are trimmed
    /// so adapters can join paths uniformly.
    pub fn parse(table: &str) -> Result<Self, RegionMapError> {
        let mut endpoints = HashMap::new();

        for entry in table.split(',').map(str::trim).filter(|s| !s.is_empty()) {
            let (name, url) = entry
                .split_once('=')
                .ok_or_else(|| RegionMapError::InvalidEntry(entry.to_string()))?;
            let name = name.trim();
            let url = url.trim().trim_end_matches('/');
            if name.is_empty() || url.is_empty() {
                return Err(RegionMapError::InvalidEntry(entry.to_string()));
            }
            endpoints.insert(name.to_string(), url.to_string());
        }

        if endpoints.is_empty() {
            return Err(RegionMapError::Empty);
        }
        Ok(Self { endpoints })
    }

    /// Resolve a region key to its base URL.
    pub fn base_url(&self, region: &str) -> Result<&str, EngineError> {
        self.endpoints
            .get(region)
            .map(String::as_str)
            .ok_or_else(|| EngineError::UnknownRegion(region.to_string()))
    }

    /// All configured region keys.
    pub fn regions(&self) -> impl Iterator<Item = &str> {
        self.endpoints.keys().map(String::as_str)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    #[test]
    fn parses_multi_region_table() {
        let map = RegionMap::parse("us=https://us.engine.example,eu=https://eu.engine.example")
            .unwrap();

        assert_eq!(map.base_url("us").unwrap(), "https://us.engine.example");
        assert_eq!(map.base_url("eu").unwrap(), "https://eu.engine.example");
    }

    #[test]
    fn trims_trailing_slash_and_whitespace() {
        let map = RegionMap::parse(" default = http://127.0.0.1:9800/ ").unwrap();
        assert_eq!(map.base_url("default").unwrap(), "http://127.0.0.1:9800");
    }

    #[test]
    fn unknown_region_errors() {
        let map = RegionMap::parse("us=https://us.engine.example").unwrap();
        assert_matches!(
            map.base_url("mars"),
            Err(EngineError::UnknownRegion(r)) if r == "mars"
        );
    }

    #[test]
    fn rejects_entry_without_equals() {
        assert_matches!(
            RegionMap::parse("useast"),
            Err(RegionMapError::InvalidEntry(_))
        );
    }

    #[test]
    fn rejects_empty_table() {
        assert_eq!(RegionMap::parse("  , "), Err(RegionMapError::Empty));
    }
}
