//! Simplified three-way waste taxonomy.
//!
//! The detector speaks in fine-grained material labels ("green-glass",
//! "cardboard", ...).  Operators guess in coarse buckets, so every label is
//! folded into recycle / organic / waste before comparison.  Anything the
//! table does not know lands in `Waste`; "unknown" is passed through.

use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Bucket {
    Recycle,
    Organic,
    Waste,
    Unknown,
}

const RECYCLE: &[&str] = &[
    "plastic",
    "metal",
    "glass",
    "green-glass",
    "white-glass",
    "paper",
    "cardboard",
    "recycle",
    "recycling",
];

const ORGANIC: &[&str] = &["organic", "food", "compost", "biological"];

impl Bucket {
    /// Buckets an operator can pick as a guess or override.
    pub const GUESSABLE: [Bucket; 3] = [Bucket::Recycle, Bucket::Organic, Bucket::Waste];

    pub fn label(self) -> &'static str {
        match self {
            Bucket::Recycle => "recycle",
            Bucket::Organic => "organic",
            Bucket::Waste => "waste",
            Bucket::Unknown => "unknown",
        }
    }
}

impl fmt::Display for Bucket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for Bucket {
    type Err = std::convert::Infallible;

    /// Never fails: unrecognised labels are waste.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(simplify(s))
    }
}

/// Fold a detector label into its bucket (case-insensitive, total).
pub fn simplify(classification: &str) -> Bucket {
    let key = classification.trim().to_ascii_lowercase();
    if key == "unknown" {
        return Bucket::Unknown;
    }
    if RECYCLE.contains(&key.as_str()) {
        Bucket::Recycle
    } else if ORGANIC.contains(&key.as_str()) {
        Bucket::Organic
    } else {
        Bucket::Waste
    }
}

/// Chart colour for a raw category label, as RGB.
pub fn category_color(classification: &str) -> (u8, u8, u8) {
    match classification.to_ascii_lowercase().as_str() {
        "plastic" => (0x34, 0x98, 0xdb),
        "paper" => (0x4a, 0x7c, 0x59),
        "glass" => (0x17, 0xa2, 0xb8),
        "organic" | "biological" => (0x27, 0xae, 0x60),
        "clothes" => (0xe9, 0x1e, 0x63),
        "electronics" => (0x9c, 0x27, 0xb0),
        // metal / other / unknown and anything new share the neutral grey
        _ => (0x95, 0xa5, 0xa6),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_recycle_labels() {
        for label in RECYCLE {
            assert_eq!(simplify(label), Bucket::Recycle, "{label}");
        }
        assert_eq!(simplify("Green-Glass"), Bucket::Recycle);
        assert_eq!(simplify("PLASTIC"), Bucket::Recycle);
    }

    #[test]
    fn test_organic_labels() {
        for label in ORGANIC {
            assert_eq!(simplify(label), Bucket::Organic, "{label}");
        }
        assert_eq!(simplify("Biological"), Bucket::Organic);
    }

    #[test]
    fn test_waste_is_the_default() {
        for label in ["clothes", "shoes", "electronics", "other", "waste"] {
            assert_eq!(simplify(label), Bucket::Waste, "{label}");
        }
        assert_eq!(simplify("styrofoam"), Bucket::Waste);
        assert_eq!(simplify(""), Bucket::Waste);
    }

    #[test]
    fn test_unknown_passes_through() {
        assert_eq!(simplify("Unknown"), Bucket::Unknown);
        assert_eq!(simplify("unknown"), Bucket::Unknown);
    }

    #[test]
    fn test_only_unknown_maps_to_unknown() {
        let samples = ["plastic", "food", "batteries", "Unknowns", "n/a", "metal"];
        for s in samples {
            assert!(Bucket::GUESSABLE.contains(&simplify(s)), "{s}");
        }
    }

    #[test]
    fn test_parse_and_display() {
        let b: Bucket = "cardboard".parse().unwrap();
        assert_eq!(b, Bucket::Recycle);
        assert_eq!(b.to_string(), "recycle");
    }

    #[test]
    fn test_category_colors() {
        assert_eq!(category_color("Plastic"), (0x34, 0x98, 0xdb));
        assert_eq!(category_color("metal"), category_color("mystery"));
    }
}
