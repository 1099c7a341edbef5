// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Core identifier and category types

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Opaque element identifier supplied by the host model
///
/// Used for rooms and elements alike; the kernel only compares ids.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Serialize, Deserialize, Default)]
pub struct ElementId(pub u64);

impl fmt::Display for ElementId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

impl From<u64> for ElementId {
    fn from(id: u64) -> Self {
        ElementId(id)
    }
}

impl From<ElementId> for u64 {
    fn from(id: ElementId) -> Self {
        id.0
    }
}

/// Element category tag
///
/// Drives the choice of classification strategy. Unknown categories keep
/// the name the host gave them.
#[derive(Clone, PartialEq, Eq, Hash, Debug, Serialize, Deserialize, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Category {
    // Linear, thick elements
    Wall,
    CurtainWall,

    // Connectors between rooms
    Door,
    Window,
    Opening,

    // Point-located content
    Furniture,
    Fixture,
    Equipment,
    Column,

    // Linear runs
    Pipe,
    Duct,
    Beam,

    #[default]
    Generic,

    /// Unknown category - keeps the host name
    Unknown(String),
}

impl FromStr for Category {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Ok(Self::parse(s))
    }
}

impl Category {
    /// Parse a category name, accepting singular, plural and host
    /// built-in forms (`"Wall"`, `"Walls"`, `"OST_Walls"`)
    pub fn parse(s: &str) -> Self {
        let upper = s.trim().to_uppercase();
        let name = upper.strip_prefix("OST_").unwrap_or(&upper);
        match name {
            "WALL" | "WALLS" => Category::Wall,
            "CURTAINWALL" | "CURTAIN_WALL" | "CURTAINWALLS" => Category::CurtainWall,
            "DOOR" | "DOORS" => Category::Door,
            "WINDOW" | "WINDOWS" => Category::Window,
            "OPENING" | "OPENINGS" | "SWALLHOLE" => Category::Opening,
            "FURNITURE" => Category::Furniture,
            "FIXTURE" | "FIXTURES" | "PLUMBINGFIXTURES" | "LIGHTINGFIXTURES" => {
                Category::Fixture
            }
            "EQUIPMENT" | "MECHANICALEQUIPMENT" | "ELECTRICALEQUIPMENT" => Category::Equipment,
            "COLUMN" | "COLUMNS" | "STRUCTURALCOLUMNS" => Category::Column,
            "PIPE" | "PIPES" | "PIPECURVES" => Category::Pipe,
            "DUCT" | "DUCTS" | "DUCTCURVES" => Category::Duct,
            "BEAM" | "BEAMS" | "STRUCTURALFRAMING" => Category::Beam,
            "GENERIC" | "GENERICMODEL" => Category::Generic,
            _ => Category::Unknown(s.to_string()),
        }
    }

    /// Get the category name as a string
    pub fn name(&self) -> &str {
        match self {
            Category::Wall => "Wall",
            Category::CurtainWall => "CurtainWall",
            Category::Door => "Door",
            Category::Window => "Window",
            Category::Opening => "Opening",
            Category::Furniture => "Furniture",
            Category::Fixture => "Fixture",
            Category::Equipment => "Equipment",
            Category::Column => "Column",
            Category::Pipe => "Pipe",
            Category::Duct => "Duct",
            Category::Beam => "Beam",
            Category::Generic => "Generic",
            Category::Unknown(s) => s,
        }
    }

    /// Check if this category connects two regions (doors, windows,
    /// openings) and may carry a relational hint
    pub fn is_connector(&self) -> bool {
        matches!(self, Category::Door | Category::Window | Category::Opening)
    }

    /// Check if this category is a linear element with an implicit
    /// thickness that its location curve does not report
    pub fn is_wall_like(&self) -> bool {
        matches!(self, Category::Wall | Category::CurtainWall)
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}
