use crate::error::{ConversionError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Coordinate reference systems used by Chinese map providers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CoordinateSystem {
    /// Baidu Maps offset of GCJ02
    #[serde(alias = "BD09")]
    Bd09,
    /// National obfuscated system ("Mars coordinates")
    #[serde(alias = "GCJ02")]
    Gcj02,
    /// Unmodified GPS coordinates
    #[serde(alias = "WGS84")]
    Wgs84,
}

impl CoordinateSystem {
    /// All systems in output order
    pub const ALL: [CoordinateSystem; 3] = [
        CoordinateSystem::Bd09,
        CoordinateSystem::Gcj02,
        CoordinateSystem::Wgs84,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            CoordinateSystem::Bd09 => "BD09",
            CoordinateSystem::Gcj02 => "GCJ02",
            CoordinateSystem::Wgs84 => "WGS84",
        }
    }

    /// Names of the longitude and latitude columns appended for this system
    pub fn column_names(&self) -> [&'static str; 2] {
        match self {
            CoordinateSystem::Bd09 => ["bd09_x", "bd09_y"],
            CoordinateSystem::Gcj02 => ["gcj02_x", "gcj02_y"],
            CoordinateSystem::Wgs84 => ["wgs84_x", "wgs84_y"],
        }
    }

    fn bit(&self) -> u8 {
        match self {
            CoordinateSystem::Bd09 => 0b001,
            CoordinateSystem::Gcj02 => 0b010,
            CoordinateSystem::Wgs84 => 0b100,
        }
    }
}

impl fmt::Display for CoordinateSystem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl FromStr for CoordinateSystem {
    type Err = ConversionError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "bd09" => Ok(CoordinateSystem::Bd09),
            "gcj02" => Ok(CoordinateSystem::Gcj02),
            "wgs84" => Ok(CoordinateSystem::Wgs84),
            other => Err(ConversionError::InvalidArgument(format!(
                "Unknown coordinate system '{}'. Expected one of: bd09, gcj02, wgs84",
                other
            ))),
        }
    }
}

/// Set of systems to append to each row.
///
/// Iteration always follows BD09 -> GCJ02 -> WGS84, whatever order the
/// systems were inserted in.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct OutputSystems(u8);

impl OutputSystems {
    pub fn new() -> Self {
        Self(0)
    }

    pub fn all() -> Self {
        CoordinateSystem::ALL.into_iter().collect()
    }

    pub fn with(mut self, system: CoordinateSystem) -> Self {
        self.insert(system);
        self
    }

    pub fn insert(&mut self, system: CoordinateSystem) {
        self.0 |= system.bit();
    }

    pub fn contains(&self, system: CoordinateSystem) -> bool {
        self.0 & system.bit() != 0
    }

    pub fn is_empty(&self) -> bool {
        self.0 == 0
    }

    pub fn len(&self) -> usize {
        self.0.count_ones() as usize
    }

    pub fn iter(&self) -> impl Iterator<Item = CoordinateSystem> + '_ {
        CoordinateSystem::ALL
            .into_iter()
            .filter(move |system| self.contains(*system))
    }
}

impl FromIterator<CoordinateSystem> for OutputSystems {
    fn from_iter<I: IntoIterator<Item = CoordinateSystem>>(iter: I) -> Self {
        let mut systems = OutputSystems::new();
        for system in iter {
            systems.insert(system);
        }
        systems
    }
}

impl fmt::Display for OutputSystems {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let names: Vec<&str> = self.iter().map(|s| s.name()).collect();
        write!(f, "{}", names.join(", "))
    }
}

impl Serialize for OutputSystems {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.collect_seq(self.iter())
    }
}

impl<'de> Deserialize<'de> for OutputSystems {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let systems = Vec::<CoordinateSystem>::deserialize(deserializer)?;
        Ok(systems.into_iter().collect())
    }
}
