//! Terrain symbols that make up the tile world.
//!
//! The generator only decides which symbol sits in a cell; colors and
//! characters here are hints for whatever renders the world.

use serde::{Deserialize, Serialize};

/// One tile's terrain.
///
/// Declaration order is the stable default order used for tie-breaking
/// during generation.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TerrainSymbol {
    Water,
    SwampWater,
    LightGrass,
    DarkGrass,
    Soil,
}

impl TerrainSymbol {
    /// Number of terrain symbols
    pub const COUNT: usize = 5;

    /// All symbols in stable order
    pub const ALL: [TerrainSymbol; Self::COUNT] = [
        TerrainSymbol::Water,
        TerrainSymbol::SwampWater,
        TerrainSymbol::LightGrass,
        TerrainSymbol::DarkGrass,
        TerrainSymbol::Soil,
    ];

    /// Position in [`TerrainSymbol::ALL`], used to index per-terrain arrays
    pub fn index(self) -> usize {
        match self {
            TerrainSymbol::Water => 0,
            TerrainSymbol::SwampWater => 1,
            TerrainSymbol::LightGrass => 2,
            TerrainSymbol::DarkGrass => 3,
            TerrainSymbol::Soil => 4,
        }
    }

    /// Short map code
    pub fn code(self) -> &'static str {
        match self {
            TerrainSymbol::Water => "W",
            TerrainSymbol::SwampWater => "SW",
            TerrainSymbol::LightGrass => "LG",
            TerrainSymbol::DarkGrass => "DG",
            TerrainSymbol::Soil => "S",
        }
    }

    pub fn display_name(self) -> &'static str {
        match self {
            TerrainSymbol::Water => "Water",
            TerrainSymbol::SwampWater => "Swamp water",
            TerrainSymbol::LightGrass => "Light grass",
            TerrainSymbol::DarkGrass => "Dark grass",
            TerrainSymbol::Soil => "Soil",
        }
    }

    /// Get RGB color for rendering
    pub fn color(self) -> (u8, u8, u8) {
        match self {
            TerrainSymbol::Water => (0x67, 0xc0, 0xd6),
            TerrainSymbol::SwampWater => (0x3e, 0x44, 0x31),
            TerrainSymbol::LightGrass => (0x2a, 0xaa, 0x3b),
            TerrainSymbol::DarkGrass => (0x01, 0x3b, 0x01),
            TerrainSymbol::Soil => (0x96, 0x70, 0x2b),
        }
    }

    /// Get ASCII character for terminal display
    pub fn ascii_char(self) -> char {
        match self {
            TerrainSymbol::Water => '~',
            TerrainSymbol::SwampWater => '%',
            TerrainSymbol::LightGrass => '.',
            TerrainSymbol::DarkGrass => '"',
            TerrainSymbol::Soil => ':',
        }
    }

    /// Water and swamp water slow down anything walking through them
    pub fn is_liquid(self) -> bool {
        matches!(self, TerrainSymbol::Water | TerrainSymbol::SwampWater)
    }

    /// Movement speed multiplier for entities standing on this terrain
    pub fn speed_multiplier(self) -> f64 {
        if self.is_liquid() {
            0.3
        } else {
            1.0
        }
    }

    /// Seeds can only be planted on soil
    pub fn is_plantable(self) -> bool {
        self == TerrainSymbol::Soil
    }
}

impl std::fmt::Display for TerrainSymbol {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.code())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_index_matches_all_order() {
        for (i, terrain) in TerrainSymbol::ALL.iter().enumerate() {
            assert_eq!(terrain.index(), i);
        }
    }

    #[test]
    fn test_liquid_slows_movement() {
        assert_eq!(TerrainSymbol::Water.speed_multiplier(), 0.3);
        assert_eq!(TerrainSymbol::SwampWater.speed_multiplier(), 0.3);
        assert_eq!(TerrainSymbol::LightGrass.speed_multiplier(), 1.0);
        assert!(!TerrainSymbol::Soil.is_liquid());
    }

    #[test]
    fn test_only_soil_is_plantable() {
        let plantable: Vec<_> = TerrainSymbol::ALL.iter().filter(|t| t.is_plantable()).collect();
        assert_eq!(plantable, vec![&TerrainSymbol::Soil]);
    }

    #[test]
    fn test_serde_names() {
        let json = serde_json::to_string(&TerrainSymbol::SwampWater).unwrap();
        assert_eq!(json, "\"swamp_water\"");
        let back: TerrainSymbol = serde_json::from_str("\"dark_grass\"").unwrap();
        assert_eq!(back, TerrainSymbol::DarkGrass);
        assert!(serde_json::from_str::<TerrainSymbol>("\"lava\"").is_err());
    }
}
