/// Starting XI / substitutes bookkeeping and formation validation.
///
/// Every mutating operation on [`Roster`] checks all of its preconditions
/// before touching any list, so a rejected call leaves the roster unchanged.
use crate::formation::{Formation, PositionGroup};
use serde::Serialize;
use std::fmt;

pub const STARTING_XI_LIMIT: usize = 11;
pub const SUBSTITUTES_LIMIT: usize = 7;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SquadPlayer {
    pub id: String,
    pub name: String,
    pub position_code: String, // "CB", "ST", ...
    pub jersey_number: u8,
    pub is_captain: bool,
}

impl SquadPlayer {
    pub fn group(&self) -> Option<PositionGroup> {
        PositionGroup::classify(&self.position_code)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Squad {
    StartingXi,
    Substitutes,
}

impl Squad {
    pub fn limit(self) -> usize {
        match self {
            Squad::StartingXi => STARTING_XI_LIMIT,
            Squad::Substitutes => SUBSTITUTES_LIMIT,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Squad::StartingXi => "starting XI",
            Squad::Substitutes => "substitutes",
        }
    }

    pub fn other(self) -> Self {
        match self {
            Squad::StartingXi => Squad::Substitutes,
            Squad::Substitutes => Squad::StartingXi,
        }
    }
}

/// Per-group counts of a starting XI against a formation's requirements.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationResult {
    /// None when the formation code is not in the catalog.
    pub formation: Option<Formation>,
    pub goalkeeper_count: usize,
    pub defender_count: usize,
    pub midfielder_count: usize,
    pub forward_count: usize,
    pub required_defenders: usize,
    pub required_midfielders: usize,
    pub required_forwards: usize,
    pub is_valid: bool,
}

impl ValidationResult {
    pub fn count(&self, group: PositionGroup) -> usize {
        match group {
            PositionGroup::Goalkeeper => self.goalkeeper_count,
            PositionGroup::Defender => self.defender_count,
            PositionGroup::Midfielder => self.midfielder_count,
            PositionGroup::Forward => self.forward_count,
        }
    }

    pub fn required(&self, group: PositionGroup) -> usize {
        match group {
            PositionGroup::Goalkeeper if self.formation.is_some() => 1,
            PositionGroup::Goalkeeper => 0,
            PositionGroup::Defender => self.required_defenders,
            PositionGroup::Midfielder => self.required_midfielders,
            PositionGroup::Forward => self.required_forwards,
        }
    }

    /// Compact "GK 1/1  DEF 4/4  MID 3/3  FWD 2/3" summary for display.
    pub fn summary(&self) -> String {
        [
            PositionGroup::Goalkeeper,
            PositionGroup::Defender,
            PositionGroup::Midfielder,
            PositionGroup::Forward,
        ]
        .iter()
        .map(|g| format!("{} {}/{}", g.short(), self.count(*g), self.required(*g)))
        .collect::<Vec<_>>()
        .join("  ")
    }
}

/// Check a starting XI against a catalog formation.
///
/// An unknown code yields an all-zero, invalid result with `formation: None`
/// ("no formation selected").
pub fn validate(formation_code: &str, starting_xi: &[SquadPlayer]) -> ValidationResult {
    let Some(formation) = Formation::from_code(formation_code) else {
        return ValidationResult::default();
    };

    let mut result = ValidationResult {
        formation: Some(formation),
        required_defenders: formation.required(PositionGroup::Defender),
        required_midfielders: formation.required(PositionGroup::Midfielder),
        required_forwards: formation.required(PositionGroup::Forward),
        ..Default::default()
    };

    for player in starting_xi {
        match player.group() {
            Some(PositionGroup::Goalkeeper) => result.goalkeeper_count += 1,
            Some(PositionGroup::Defender) => result.defender_count += 1,
            Some(PositionGroup::Midfielder) => result.midfielder_count += 1,
            Some(PositionGroup::Forward) => result.forward_count += 1,
            None => {}
        }
    }

    result.is_valid = result.goalkeeper_count == 1
        && result.defender_count == result.required_defenders
        && result.midfielder_count == result.required_midfielders
        && result.forward_count == result.required_forwards;
    result
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RejectionReason {
    CapacityExceeded { squad: Squad, limit: usize },
    DuplicatePlayer(String),
    IncompleteFormation(ValidationResult),
    MissingRequiredField(&'static str),
    PlayerNotFound(String),
}

impl fmt::Display for RejectionReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RejectionReason::CapacityExceeded { squad, limit } => {
                write!(f, "The {} is full ({limit} players max)", squad.label())
            }
            RejectionReason::DuplicatePlayer(id) => {
                write!(f, "Player {id} is already in the squad")
            }
            RejectionReason::IncompleteFormation(result) => {
                write!(f, "Lineup does not match the formation: {}", result.summary())
            }
            RejectionReason::MissingRequiredField(field) => write!(f, "Missing {field}"),
            RejectionReason::PlayerNotFound(id) => write!(f, "Player {id} is not in that list"),
        }
    }
}

/// Lineup submission body for `PUT /live-fixtures/{id}/lineup`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TeamLineup {
    pub team_id: String,
    pub formation: String,
    #[serde(rename = "startingXI")]
    pub starting_xi: Vec<LineupEntry>,
    pub substitutes: Vec<LineupEntry>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LineupEntry {
    pub player_id: String,
    pub position: String,
    pub jersey_number: u8,
    pub is_captain: bool,
}

impl From<&SquadPlayer> for LineupEntry {
    fn from(p: &SquadPlayer) -> Self {
        LineupEntry {
            player_id: p.id.clone(),
            position: p.position_code.clone(),
            jersey_number: p.jersey_number,
            is_captain: p.is_captain,
        }
    }
}

/// One team's selection for a fixture: the two squads plus the pool of
/// players not yet picked.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Roster {
    pub starting_xi: Vec<SquadPlayer>,
    pub substitutes: Vec<SquadPlayer>,
    pub available: Vec<SquadPlayer>,
}

impl Roster {
    pub fn new(mut available: Vec<SquadPlayer>) -> Self {
        for p in &mut available {
            p.is_captain = false;
        }
        available.sort_by_key(|p| p.jersey_number);
        Self { starting_xi: Vec::new(), substitutes: Vec::new(), available }
    }

    pub fn squad(&self, squad: Squad) -> &[SquadPlayer] {
        match squad {
            Squad::StartingXi => &self.starting_xi,
            Squad::Substitutes => &self.substitutes,
        }
    }

    fn squad_mut(&mut self, squad: Squad) -> &mut Vec<SquadPlayer> {
        match squad {
            Squad::StartingXi => &mut self.starting_xi,
            Squad::Substitutes => &mut self.substitutes,
        }
    }

    /// True if the id is already picked into either squad.
    pub fn contains(&self, player_id: &str) -> bool {
        self.starting_xi.iter().chain(&self.substitutes).any(|p| p.id == player_id)
    }

    pub fn captain(&self) -> Option<&SquadPlayer> {
        self.starting_xi.iter().find(|p| p.is_captain)
    }

    pub fn add_to_starting_xi(&mut self, player: SquadPlayer) -> Result<(), RejectionReason> {
        self.add(Squad::StartingXi, player)
    }

    pub fn add_to_substitutes(&mut self, player: SquadPlayer) -> Result<(), RejectionReason> {
        self.add(Squad::Substitutes, player)
    }

    pub fn remove_from_starting_xi(&mut self, player_id: &str) -> Result<SquadPlayer, RejectionReason> {
        self.remove(Squad::StartingXi, player_id)
    }

    pub fn remove_from_substitutes(&mut self, player_id: &str) -> Result<SquadPlayer, RejectionReason> {
        self.remove(Squad::Substitutes, player_id)
    }

    fn add(&mut self, squad: Squad, mut player: SquadPlayer) -> Result<(), RejectionReason> {
        let limit = squad.limit();
        if self.squad(squad).len() >= limit {
            return Err(RejectionReason::CapacityExceeded { squad, limit });
        }
        if self.contains(&player.id) {
            return Err(RejectionReason::DuplicatePlayer(player.id));
        }

        player.is_captain = false;
        self.available.retain(|p| p.id != player.id);
        self.squad_mut(squad).push(player);
        Ok(())
    }

    fn remove(&mut self, squad: Squad, player_id: &str) -> Result<SquadPlayer, RejectionReason> {
        let idx = self
            .squad(squad)
            .iter()
            .position(|p| p.id == player_id)
            .ok_or_else(|| RejectionReason::PlayerNotFound(player_id.to_owned()))?;

        let mut player = self.squad_mut(squad).remove(idx);
        player.is_captain = false;
        self.available.push(player.clone());
        self.available.sort_by_key(|p| p.jersey_number);
        Ok(player)
    }

    /// Move a player from one squad to the other. Destination capacity is
    /// checked before the source is touched.
    pub fn move_between_squads(
        &mut self,
        player_id: &str,
        from: Squad,
        to: Squad,
    ) -> Result<(), RejectionReason> {
        let idx = self
            .squad(from)
            .iter()
            .position(|p| p.id == player_id)
            .ok_or_else(|| RejectionReason::PlayerNotFound(player_id.to_owned()))?;
        if from == to {
            return Ok(());
        }

        let limit = to.limit();
        if self.squad(to).len() >= limit {
            return Err(RejectionReason::CapacityExceeded { squad: to, limit });
        }

        let mut player = self.squad_mut(from).remove(idx);
        if to == Squad::Substitutes {
            player.is_captain = false;
        }
        self.squad_mut(to).push(player);
        Ok(())
    }

    /// Make `player_id` the only captain. Only starters can captain the side.
    pub fn set_captain(&mut self, player_id: &str) -> Result<(), RejectionReason> {
        if !self.starting_xi.iter().any(|p| p.id == player_id) {
            return Err(RejectionReason::PlayerNotFound(player_id.to_owned()));
        }
        for p in &mut self.starting_xi {
            p.is_captain = p.id == player_id;
        }
        Ok(())
    }

    pub fn validate(&self, formation_code: &str) -> ValidationResult {
        validate(formation_code, &self.starting_xi)
    }

    /// Build the lineup submission, refusing anything the backend would
    /// have to reject anyway.
    pub fn build_lineup(&self, team_id: &str, formation_code: &str) -> Result<TeamLineup, RejectionReason> {
        if team_id.trim().is_empty() {
            return Err(RejectionReason::MissingRequiredField("team"));
        }
        let result = self.validate(formation_code);
        let Some(formation) = result.formation else {
            return Err(RejectionReason::MissingRequiredField("formation"));
        };
        if !result.is_valid {
            return Err(RejectionReason::IncompleteFormation(result));
        }
        if self.captain().is_none() {
            return Err(RejectionReason::MissingRequiredField("captain"));
        }

        Ok(TeamLineup {
            team_id: team_id.to_owned(),
            formation: formation.code.to_owned(),
            starting_xi: self.starting_xi.iter().map(LineupEntry::from).collect(),
            substitutes: self.substitutes.iter().map(LineupEntry::from).collect(),
        })
    }
}
