//! Coordinate reference system identifier.
//!
//! The drainage algorithms never interpret the CRS; it is carried alongside
//! rasters so that exported products keep their georeferencing.

use serde::{Deserialize, Serialize};
use std::fmt;

/// An opaque coordinate reference system identifier.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Crs {
    /// EPSG code, if known
    epsg: Option<u32>,
    /// Free-form authority string (WKT, PROJ, "EPSG:2154", ...)
    definition: Option<String>,
}

impl Crs {
    /// Create a CRS from an EPSG code
    pub fn from_epsg(code: u32) -> Self {
        Self {
            epsg: Some(code),
            definition: None,
        }
    }

    /// Create a CRS from a free-form definition string
    pub fn from_definition(definition: impl Into<String>) -> Self {
        Self {
            epsg: None,
            definition: Some(definition.into()),
        }
    }

    /// Get the EPSG code if known
    pub fn epsg(&self) -> Option<u32> {
        self.epsg
    }

    /// Get the definition string if present
    pub fn definition(&self) -> Option<&str> {
        self.definition.as_deref()
    }
}

impl fmt::Display for Crs {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (self.epsg, &self.definition) {
            (Some(code), _) => write!(f, "EPSG:{code}"),
            (None, Some(def)) => write!(f, "{def}"),
            (None, None) => write!(f, "unknown CRS"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_epsg_display() {
        let crs = Crs::from_epsg(2154);
        assert_eq!(crs.to_string(), "EPSG:2154");
        assert_eq!(crs.epsg(), Some(2154));
    }

    #[test]
    fn test_definition_passthrough() {
        let crs = Crs::from_definition("+proj=longlat +datum=WGS84");
        assert_eq!(crs.definition(), Some("+proj=longlat +datum=WGS84"));
        assert_eq!(crs.epsg(), None);
    }
}
