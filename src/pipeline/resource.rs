// src/pipeline/resource.rs

//! Typed handles for the things tasks read, write and remove.
//!
//! A resource is written as `<kind>/<locator>`:
//!
//! ```text
//! file/data/input.tif
//! vector/roads
//! raster/elevation@PERMANENT/nz/grassdata
//! ```
//!
//! The string a resource was parsed from is kept verbatim and is its identity:
//! two resources are the same entity iff their specs match byte-for-byte.

use std::fmt;
use std::path::Path;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ResourceError {
    #[error("invalid resource type \"{kind}\" in \"{spec}\" (expected file, vector or raster)")]
    UnknownKind { spec: String, kind: String },

    #[error("resource \"{0}\" has no locator (expected <kind>/<locator>)")]
    MissingLocator(String),

    #[error("malformed map name \"{0}\"")]
    MalformedMapName(String),
}

/// Kind of an entry in the geospatial store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MapKind {
    Vector,
    Raster,
}

impl MapKind {
    /// Name used by the store's listing tools (`g.list type=<..>`).
    pub fn as_str(self) -> &'static str {
        match self {
            MapKind::Vector => "vector",
            MapKind::Raster => "raster",
        }
    }
}

impl fmt::Display for MapKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A map name, optionally qualified as `name@mapset[/location[/database]]`.
///
/// Qualifier segments are read right-to-left, so the database segment keeps
/// any remaining slashes (absolute database paths survive intact).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct MapName {
    pub name: String,
    pub mapset: Option<String>,
    pub location: Option<String>,
    pub database: Option<String>,
}

impl MapName {
    fn parse(locator: &str, spec: &str) -> Result<Self, ResourceError> {
        let mut parts = locator.split('@');
        let name = parts.next().unwrap_or_default();
        let qualifier = parts.next();
        if parts.next().is_some() || name.is_empty() {
            return Err(ResourceError::MalformedMapName(spec.to_string()));
        }

        let Some(qualifier) = qualifier else {
            return Ok(Self {
                name: name.to_string(),
                mapset: None,
                location: None,
                database: None,
            });
        };

        let mut segments = qualifier.rsplitn(3, '/');
        let mapset = segments.next().filter(|s| !s.is_empty());
        if mapset.is_none() {
            return Err(ResourceError::MalformedMapName(spec.to_string()));
        }

        Ok(Self {
            name: name.to_string(),
            mapset: mapset.map(str::to_string),
            location: segments.next().map(str::to_string),
            database: segments.next().map(str::to_string),
        })
    }

    /// True if the name carries no `@` qualifier (resolved against the
    /// current scope).
    pub fn is_unqualified(&self) -> bool {
        self.mapset.is_none()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Locator {
    File { path: String },
    Map { kind: MapKind, map: MapName },
}

/// A dependency or product of a task.
#[derive(Debug, Clone)]
pub struct Resource {
    spec: String,
    locator: Locator,
}

impl Resource {
    pub fn parse(spec: &str) -> Result<Self, ResourceError> {
        let (kind, rest) = spec
            .split_once('/')
            .ok_or_else(|| ResourceError::MissingLocator(spec.to_string()))?;

        let locator = match kind {
            "file" => {
                if rest.is_empty() {
                    return Err(ResourceError::MissingLocator(spec.to_string()));
                }
                Locator::File {
                    path: rest.to_string(),
                }
            }
            "vector" => Locator::Map {
                kind: MapKind::Vector,
                map: MapName::parse(rest, spec)?,
            },
            "raster" => Locator::Map {
                kind: MapKind::Raster,
                map: MapName::parse(rest, spec)?,
            },
            other => {
                return Err(ResourceError::UnknownKind {
                    spec: spec.to_string(),
                    kind: other.to_string(),
                });
            }
        };

        Ok(Self {
            spec: spec.to_string(),
            locator,
        })
    }

    /// Canonical identity: the spec string exactly as written.
    pub fn id(&self) -> &str {
        &self.spec
    }

    pub fn locator(&self) -> &Locator {
        &self.locator
    }

    pub fn is_file(&self) -> bool {
        matches!(self.locator, Locator::File { .. })
    }

    /// Filesystem path for `file/` resources.
    pub fn file_path(&self) -> Option<&Path> {
        match &self.locator {
            Locator::File { path } => Some(Path::new(path)),
            Locator::Map { .. } => None,
        }
    }
}

impl PartialEq for Resource {
    fn eq(&self, other: &Self) -> bool {
        self.spec == other.spec
    }
}

impl Eq for Resource {}

impl std::hash::Hash for Resource {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.spec.hash(state);
    }
}

impl FromStr for Resource {
    type Err = ResourceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Resource::parse(s)
    }
}

impl fmt::Display for Resource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.spec)
    }
}

impl Serialize for Resource {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.spec)
    }
}

impl<'de> Deserialize<'de> for Resource {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let spec = String::deserialize(deserializer)?;
        Resource::parse(&spec).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn map(spec: &str) -> (MapKind, MapName) {
        match Resource::parse(spec).unwrap().locator {
            Locator::Map { kind, map } => (kind, map),
            other => panic!("expected a map, got {other:?}"),
        }
    }

    #[test]
    fn file_paths_keep_their_slashes() {
        let res = Resource::parse("file/foobar/baz.tif").unwrap();
        assert_eq!(res.file_path(), Some(Path::new("foobar/baz.tif")));

        let res = Resource::parse("file//foobar/baz.tif").unwrap();
        assert_eq!(res.file_path(), Some(Path::new("/foobar/baz.tif")));
        assert_eq!(res.id(), "file//foobar/baz.tif");
    }

    #[test]
    fn fully_qualified_map_name() {
        let (kind, map) = map("vector/mypoint@mydb/myloc/maps");
        assert_eq!(kind, MapKind::Vector);
        assert_eq!(map.name, "mypoint");
        assert_eq!(map.mapset.as_deref(), Some("maps"));
        assert_eq!(map.location.as_deref(), Some("myloc"));
        assert_eq!(map.database.as_deref(), Some("mydb"));
    }

    #[test]
    fn partially_qualified_map_names() {
        let (_, map_) = map("vector/mypoint");
        assert!(map_.is_unqualified());
        assert_eq!(map_.location, None);
        assert_eq!(map_.database, None);

        let (kind, map_) = map("raster/dem@foo");
        assert_eq!(kind, MapKind::Raster);
        assert_eq!(map_.mapset.as_deref(), Some("foo"));
        assert_eq!(map_.location, None);

        let (_, map_) = map("raster/dem@/srv/grassdata/nz/PERMANENT");
        assert_eq!(map_.database.as_deref(), Some("/srv/grassdata"));
        assert_eq!(map_.location.as_deref(), Some("nz"));
    }

    #[test]
    fn malformed_specs_are_rejected() {
        assert!(matches!(
            Resource::parse("table/foo"),
            Err(ResourceError::UnknownKind { .. })
        ));
        assert!(matches!(
            Resource::parse("vector"),
            Err(ResourceError::MissingLocator(_))
        ));
        assert!(matches!(
            Resource::parse("vector/a@b@c"),
            Err(ResourceError::MalformedMapName(_))
        ));
        assert!(matches!(
            Resource::parse("raster/@PERMANENT"),
            Err(ResourceError::MalformedMapName(_))
        ));
    }

    #[test]
    fn identity_is_the_spec_string() {
        let a = Resource::parse("vector/roads").unwrap();
        let b: Resource = "vector/roads".parse().unwrap();
        let c = Resource::parse("vector/roads@PERMANENT").unwrap();
        assert_eq!(a, b);
        assert_ne!(a, c);
        assert_eq!(c.to_string(), "vector/roads@PERMANENT");
    }
}
