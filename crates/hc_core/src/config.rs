//! config.rs: election configuration (load-once, read-only).
//!
//! Wire shape is JSON (see `config/portugal.json`); `hc_io::config` reads and
//! validates it. Enums carry explicit wire tokens.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

use crate::errors::CoreError;
use crate::party::PartyRoster;
use crate::tokens::{DistrictId, PartyId};

/// ------------ Macros ------------

/// Define a serde'd enum with explicit wire tokens.
macro_rules! serde_enum {
    ($name:ident => { $($variant:ident = $token:expr),+ $(,)? }) => {
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
        pub enum $name {
            $(
                #[serde(rename = $token)]
                $variant,
            )+
        }

        impl $name {
            pub fn token(self) -> &'static str {
                match self {
                    $( $name::$variant => $token, )+
                }
            }
        }

        impl core::str::FromStr for $name {
            type Err = String;
            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $( $token => Ok($name::$variant), )+
                    other => Err(format!("unknown {} token: {other}", stringify!($name))),
                }
            }
        }
    };
}

serde_enum!(ProjectionMode => {
    Literal           = "literal",
    Normalized        = "normalized",
    TurnoutPreserving = "turnout_preserving"
});

impl Default for ProjectionMode {
    fn default() -> Self { ProjectionMode::Literal }
}

/// ------------ Shapes ------------

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DistrictSeats {
    pub id: DistrictId,
    pub seats: u32,
}

/// Named group of tracked parties summed against the majority threshold.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Block {
    pub name: String,
    pub parties: Vec<PartyId>,
}

fn default_label_column() -> String { "Partido".to_string() }
fn default_others() -> PartyId { PartyId::from_static("Outros") }
fn default_grid_columns() -> u32 { 6 }

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ElectionConfig {
    pub title: String,
    #[serde(default = "default_label_column")]
    pub label_column: String,
    pub districts: Vec<DistrictSeats>,
    pub tracked_parties: Vec<PartyId>,
    #[serde(default = "default_others")]
    pub others_label: PartyId,
    /// Non-party ballot rows folded into the aggregate, named in the report's
    /// note on that row. Every untracked row is folded regardless.
    #[serde(default)]
    pub non_party_votes: Vec<String>,
    pub majority_seats: u32,
    #[serde(default)]
    pub blocks: Vec<Block>,
    #[serde(default)]
    pub party_order: Vec<PartyId>,
    #[serde(default)]
    pub party_colors: BTreeMap<PartyId, String>,
    #[serde(default = "default_grid_columns")]
    pub grid_columns: u32,
    #[serde(default)]
    pub projection: ProjectionMode,
}

/// One configuration finding (stable machine-readable code + message).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ConfigIssue {
    pub code: &'static str,
    pub message: String,
}

impl ConfigIssue {
    fn new(code: &'static str, message: impl Into<String>) -> Self {
        Self { code, message: message.into() }
    }
}

impl ElectionConfig {
    pub fn roster(&self) -> Result<PartyRoster, CoreError> {
        PartyRoster::new(self.tracked_parties.clone(), self.others_label.clone())
    }

    pub fn district_ids(&self) -> Vec<DistrictId> {
        self.districts.iter().map(|d| d.id.clone()).collect()
    }

    pub fn seats_of(&self, id: &DistrictId) -> Option<u32> {
        self.districts.iter().find(|d| &d.id == id).map(|d| d.seats)
    }

    pub fn total_seats(&self) -> u32 {
        self.districts.iter().map(|d| d.seats).sum()
    }

    /// Display order: `party_order` when given, otherwise tracked order + aggregate.
    pub fn display_order(&self) -> Vec<PartyId> {
        if self.party_order.is_empty() {
            let mut v = self.tracked_parties.clone();
            v.push(self.others_label.clone());
            v
        } else {
            self.party_order.clone()
        }
    }

    /// Validate domains and cross-references. Empty vec = valid.
    pub fn validate(&self) -> Vec<ConfigIssue> {
        let mut issues = Vec::new();

        if self.title.trim().is_empty() {
            issues.push(ConfigIssue::new("Title.Empty", "title must not be empty"));
        }
        if self.label_column.trim().is_empty() {
            issues.push(ConfigIssue::new("LabelColumn.Empty", "label_column must not be empty"));
        }

        // Districts: non-empty, unique, seats >= 1
        if self.districts.is_empty() {
            issues.push(ConfigIssue::new("Districts.Empty", "at least one district is required"));
        }
        let mut seen_d = BTreeSet::new();
        for d in &self.districts {
            if !seen_d.insert(&d.id) {
                issues.push(ConfigIssue::new("Districts.Duplicate", format!("duplicate district {}", d.id)));
            }
            if d.seats == 0 {
                issues.push(ConfigIssue::new("Districts.ZeroSeats", format!("district {} has 0 seats", d.id)));
            }
            if d.id.as_str() == self.label_column {
                issues.push(ConfigIssue::new(
                    "Districts.LabelClash",
                    format!("district {} clashes with the label column", d.id),
                ));
            }
        }

        // Roster
        let roster = match self.roster() {
            Ok(r) => Some(r),
            Err(e) => {
                issues.push(ConfigIssue::new("Parties.Roster", e.to_string()));
                None
            }
        };

        let total = self.total_seats();
        if self.majority_seats == 0 || self.majority_seats > total {
            issues.push(ConfigIssue::new(
                "Majority.OutOfRange",
                format!("majority_seats {} not in 1..={total}", self.majority_seats),
            ));
        }
        if self.grid_columns == 0 {
            issues.push(ConfigIssue::new("Grid.ZeroColumns", "grid_columns must be >= 1"));
        }

        if let Some(roster) = roster {
            let mut seen_b = BTreeSet::new();
            for b in &self.blocks {
                if !seen_b.insert(b.name.as_str()) {
                    issues.push(ConfigIssue::new("Blocks.Duplicate", format!("duplicate block {}", b.name)));
                }
                if b.parties.is_empty() {
                    issues.push(ConfigIssue::new("Blocks.Empty", format!("block {} has no parties", b.name)));
                }
                for p in &b.parties {
                    if !matches!(roster.resolve(p), Some(crate::party::Party::Tracked(_))) {
                        issues.push(ConfigIssue::new(
                            "Blocks.UnknownParty",
                            format!("block {} references non-tracked party {p}", b.name),
                        ));
                    }
                }
            }
            let mut seen_o = BTreeSet::new();
            for p in &self.party_order {
                if roster.resolve(p).is_none() {
                    issues.push(ConfigIssue::new("Order.UnknownParty", format!("party_order references unknown {p}")));
                }
                if !seen_o.insert(p) {
                    issues.push(ConfigIssue::new("Order.Duplicate", format!("party_order lists {p} twice")));
                }
            }
            for p in self.party_colors.keys() {
                if roster.resolve(p).is_none() {
                    issues.push(ConfigIssue::new("Colors.UnknownParty", format!("party_colors references unknown {p}")));
                }
            }
        }

        issues
    }

    /// Bundled configuration: the 22 Portuguese electoral circles (230 seats).
    pub fn portugal_default() -> Self {
        const SEATS: &[(&str, u32)] = &[
            ("Aveiro", 16), ("Beja", 3), ("Braga", 19), ("Bragança", 3),
            ("Castelo Branco", 4), ("Coimbra", 9), ("Évora", 3), ("Faro", 9),
            ("Guarda", 3), ("Leiria", 10), ("Lisboa", 48), ("Portalegre", 2),
            ("Porto", 40), ("Santarém", 9), ("Setúbal", 19), ("Viana do Castelo", 5),
            ("Vila Real", 5), ("Viseu", 8), ("Açores", 5), ("Madeira", 6),
            ("Europa", 2), ("Fora da Europa", 2),
        ];
        const PARTIES: &[&str] = &["PSD", "PS", "CH", "IL", "BE", "PCP", "L", "PAN"];
        const COLORS: &[(&str, &str)] = &[
            ("PSD", "#FF8C00"), ("PS", "#FF66CC"), ("CH", "#1F2A5C"), ("IL", "#00ADEF"),
            ("BE", "#C90535"), ("PCP", "#E4000F"), ("L", "#00CD8C"), ("PAN", "#1AA9A5"),
            ("Outros", "#808080"),
        ];
        const ORDER: &[&str] = &["BE", "PCP", "L", "PS", "PAN", "PSD", "IL", "CH", "Outros"];

        let p = |s: &'static str| PartyId::from_static(s);
        ElectionConfig {
            title: "Simulador de Legislativas".to_string(),
            label_column: default_label_column(),
            districts: SEATS
                .iter()
                .map(|(id, seats)| DistrictSeats { id: DistrictId::from_static(*id), seats: *seats })
                .collect(),
            tracked_parties: PARTIES.iter().copied().map(p).collect(),
            others_label: default_others(),
            non_party_votes: vec!["Votos em branco".to_string(), "Votos nulos".to_string()],
            majority_seats: 116,
            blocks: vec![
                Block { name: "Direita".to_string(), parties: vec![p("PSD"), p("IL")] },
                Block {
                    name: "Esquerda".to_string(),
                    parties: ["PS", "BE", "PCP", "L", "PAN"].into_iter().map(p).collect(),
                },
            ],
            party_order: ORDER.iter().copied().map(p).collect(),
            party_colors: COLORS.iter().map(|(k, v)| (p(*k), v.to_string())).collect(),
            grid_columns: default_grid_columns(),
            projection: ProjectionMode::Literal,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid_and_has_230_seats() {
        let c = ElectionConfig::portugal_default();
        assert!(c.validate().is_empty(), "{:?}", c.validate());
        assert_eq!(c.total_seats(), 230);
        assert_eq!(c.districts.len(), 22);
        assert_eq!(c.seats_of(&DistrictId::new("Lisboa").unwrap()), Some(48));
    }

    #[test]
    fn validate_reports_bad_cross_refs() {
        let mut c = ElectionConfig::portugal_default();
        c.districts[0].seats = 0;
        c.majority_seats = 1000;
        c.blocks[0].parties.push(PartyId::new("Outros").unwrap());
        c.party_colors.insert(PartyId::new("XYZ").unwrap(), "#000".into());
        let codes: Vec<&str> = c.validate().iter().map(|i| i.code).collect();
        assert!(codes.contains(&"Districts.ZeroSeats"));
        assert!(codes.contains(&"Majority.OutOfRange"));
        assert!(codes.contains(&"Blocks.UnknownParty"));
        assert!(codes.contains(&"Colors.UnknownParty"));
    }

    #[test]
    fn projection_tokens_round_trip_through_json() {
        let v: ProjectionMode = serde_json::from_str("\"turnout_preserving\"").unwrap();
        assert_eq!(v, ProjectionMode::TurnoutPreserving);
        assert_eq!("normalized".parse::<ProjectionMode>(), Ok(ProjectionMode::Normalized));
        assert!("sideways".parse::<ProjectionMode>().is_err());
        assert_eq!(ProjectionMode::default().token(), "literal");
    }

    #[test]
    fn minimal_json_uses_defaults() {
        let json = r#"{
            "title": "t",
            "districts": [{"id": "North", "seats": 3}],
            "tracked_parties": ["A", "B"],
            "majority_seats": 2
        }"#;
        let c: ElectionConfig = serde_json::from_str(json).unwrap();
        assert_eq!(c.label_column, "Partido");
        assert_eq!(c.others_label.as_str(), "Outros");
        assert_eq!(c.projection, ProjectionMode::Literal);
        assert_eq!(c.display_order().len(), 3);
        assert!(c.validate().is_empty());
    }

    #[test]
    fn unknown_fields_are_rejected() {
        let json = r#"{"title":"t","districts":[],"tracked_parties":["A"],"majority_seats":1,"colour":1}"#;
        assert!(serde_json::from_str::<ElectionConfig>(json).is_err());
    }
}
