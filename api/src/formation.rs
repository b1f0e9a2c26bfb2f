/// Formation catalog and position-code classification.

/// A named tactical template. The goalkeeper is implicit, so the three
/// outfield counts always add up to 10.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Formation {
    pub code: &'static str,
    pub defenders: u8,
    pub midfielders: u8,
    pub forwards: u8,
}

pub const FORMATIONS: [Formation; 7] = [
    Formation { code: "4-3-3", defenders: 4, midfielders: 3, forwards: 3 },
    Formation { code: "4-4-2", defenders: 4, midfielders: 4, forwards: 2 },
    Formation { code: "4-2-3-1", defenders: 4, midfielders: 5, forwards: 1 },
    Formation { code: "3-5-2", defenders: 3, midfielders: 5, forwards: 2 },
    Formation { code: "3-4-3", defenders: 3, midfielders: 4, forwards: 3 },
    Formation { code: "5-3-2", defenders: 5, midfielders: 3, forwards: 2 },
    Formation { code: "4-1-4-1", defenders: 4, midfielders: 5, forwards: 1 },
];

impl Formation {
    pub fn from_code(code: &str) -> Option<Formation> {
        let code = code.trim();
        FORMATIONS.iter().find(|f| f.code == code).copied()
    }

    pub fn all() -> &'static [Formation] {
        &FORMATIONS
    }

    pub fn outfield(&self) -> u8 {
        self.defenders + self.midfielders + self.forwards
    }

    pub fn required(&self, group: PositionGroup) -> usize {
        match group {
            PositionGroup::Goalkeeper => 1,
            PositionGroup::Defender => usize::from(self.defenders),
            PositionGroup::Midfielder => usize::from(self.midfielders),
            PositionGroup::Forward => usize::from(self.forwards),
        }
    }

    /// Cycle through the catalog; used by the lineup builder's formation picker.
    pub fn next(code: Option<&str>) -> Formation {
        let idx = code
            .and_then(|c| FORMATIONS.iter().position(|f| f.code == c))
            .map(|i| (i + 1) % FORMATIONS.len())
            .unwrap_or(0);
        FORMATIONS[idx]
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum PositionGroup {
    Goalkeeper,
    Defender,
    Midfielder,
    Forward,
}

const GOALKEEPER_CODES: &[&str] = &["GK"];
const DEFENDER_CODES: &[&str] = &["CB", "LCB", "RCB", "RB", "LB", "SW", "RWB", "LWB"];
const MIDFIELDER_CODES: &[&str] = &["CDM", "DM", "CM", "LCM", "RCM", "CAM", "AM", "LM", "RM"];
const FORWARD_CODES: &[&str] = &["ST", "CF", "LW", "RW", "LF", "RF", "SS"];

impl PositionGroup {
    /// Classify a position code. Codes outside the closed tables belong to no group.
    pub fn classify(code: &str) -> Option<Self> {
        let code = code.trim().to_ascii_uppercase();
        let code = code.as_str();
        if GOALKEEPER_CODES.contains(&code) {
            Some(PositionGroup::Goalkeeper)
        } else if DEFENDER_CODES.contains(&code) {
            Some(PositionGroup::Defender)
        } else if MIDFIELDER_CODES.contains(&code) {
            Some(PositionGroup::Midfielder)
        } else if FORWARD_CODES.contains(&code) {
            Some(PositionGroup::Forward)
        } else {
            None
        }
    }

    pub fn short(&self) -> &'static str {
        match self {
            PositionGroup::Goalkeeper => "GK",
            PositionGroup::Defender => "DEF",
            PositionGroup::Midfielder => "MID",
            PositionGroup::Forward => "FWD",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_catalog_formation_has_ten_outfield_players() {
        for f in Formation::all() {
            assert_eq!(f.outfield(), 10, "{} does not add up to 10", f.code);
        }
    }

    #[test]
    fn from_code_trims_and_rejects_unknown() {
        assert_eq!(Formation::from_code(" 4-4-2 ").map(|f| f.forwards), Some(2));
        assert!(Formation::from_code("4-6-0").is_none());
        assert!(Formation::from_code("").is_none());
    }

    #[test]
    fn next_cycles_through_catalog_and_wraps() {
        assert_eq!(Formation::next(None).code, "4-3-3");
        assert_eq!(Formation::next(Some("4-3-3")).code, "4-4-2");
        assert_eq!(Formation::next(Some("4-1-4-1")).code, "4-3-3");
        assert_eq!(Formation::next(Some("bogus")).code, "4-3-3");
    }

    #[test]
    fn classify_is_case_insensitive_and_closed() {
        assert_eq!(PositionGroup::classify("gk"), Some(PositionGroup::Goalkeeper));
        assert_eq!(PositionGroup::classify("SW"), Some(PositionGroup::Defender));
        assert_eq!(PositionGroup::classify("cam"), Some(PositionGroup::Midfielder));
        assert_eq!(PositionGroup::classify("ST"), Some(PositionGroup::Forward));
        assert_eq!(PositionGroup::classify("COACH"), None);
    }
}
