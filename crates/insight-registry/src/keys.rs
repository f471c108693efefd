//! Key alias maps: display names used in sentences to internal record fields

use serde::{Deserialize, Serialize};

use crate::{FieldType, RegistryError};

/// Display name / internal field pairs, split by type.
pub struct KeyAliasMap {
    numeric: &'static [(&'static str, &'static str)],
    string: &'static [(&'static str, &'static str)],
}

static COURSE_KEYS: KeyAliasMap = KeyAliasMap {
    numeric: &[
        ("Average", "avg"),
        ("Pass", "pass"),
        ("Fail", "fail"),
        ("Audit", "audit"),
        ("Year", "year"),
    ],
    string: &[
        ("Department", "dept"),
        ("ID", "id"),
        ("Instructor", "instructor"),
        ("Title", "title"),
        ("UUID", "uuid"),
    ],
};

static ROOM_KEYS: KeyAliasMap = KeyAliasMap {
    numeric: &[("Latitude", "lat"), ("Longitude", "lon"), ("Seats", "seats")],
    string: &[
        ("Full Name", "fullname"),
        ("Short Name", "shortname"),
        ("Number", "number"),
        ("Name", "name"),
        ("Address", "address"),
        ("Type", "type"),
        ("Furniture", "furniture"),
        ("Link", "href"),
    ],
};

impl KeyAliasMap {
    fn entries(&self) -> impl Iterator<Item = (&'static str, &'static str, FieldType)> + '_ {
        self.numeric
            .iter()
            .map(|(d, i)| (*d, *i, FieldType::Number))
            .chain(self.string.iter().map(|(d, i)| (*d, *i, FieldType::String)))
    }

    /// Internal field name for a display name.
    pub fn resolve(&self, display: &str) -> Option<&'static str> {
        self.entries()
            .find(|(d, _, _)| *d == display)
            .map(|(_, internal, _)| internal)
    }

    /// Declared type of an internal field name.
    pub fn field_type(&self, internal: &str) -> Option<FieldType> {
        self.entries()
            .find(|(_, i, _)| *i == internal)
            .map(|(_, _, ty)| ty)
    }

    pub fn is_field(&self, internal: &str) -> bool {
        self.field_type(internal).is_some()
    }

    pub fn display_names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.entries().map(|(d, _, _)| d)
    }

    /// Internal fields with their types, numeric subset first.
    pub fn fields(&self) -> impl Iterator<Item = (&'static str, FieldType)> + '_ {
        self.entries().map(|(_, i, ty)| (i, ty))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DatasetKind {
    Courses,
    Rooms,
}

impl DatasetKind {
    pub const ALL: [DatasetKind; 2] = [DatasetKind::Courses, DatasetKind::Rooms];

    pub fn key_map(self) -> &'static KeyAliasMap {
        match self {
            DatasetKind::Courses => &COURSE_KEYS,
            DatasetKind::Rooms => &ROOM_KEYS,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            DatasetKind::Courses => "courses",
            DatasetKind::Rooms => "rooms",
        }
    }
}

impl std::str::FromStr for DatasetKind {
    type Err = RegistryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "courses" => Ok(DatasetKind::Courses),
            "rooms" => Ok(DatasetKind::Rooms),
            other => Err(RegistryError::UnknownCategory(other.to_string())),
        }
    }
}

impl std::fmt::Display for DatasetKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
