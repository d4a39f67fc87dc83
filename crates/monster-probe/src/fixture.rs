//! Fixture data: the monster records every scenario iterates over.
//!
//! Fixtures are loaded once before the suite runs and are read-only
//! afterwards. The on-disk shape is `{"monsters": [...]}` with a camelCase
//! `testId` key per record.

use crate::result::{ProbeError, ProbeResult};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::Path;

/// One creatable monster.
///
/// Stats are non-negative integers: the page renders them through the
/// `aria-valuenow` attribute of each stat bar and the form takes whole numbers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MonsterRecord {
    /// Display name shown on the card
    pub name: String,
    /// Hit points
    pub hp: u32,
    /// Attack stat
    pub attack: u32,
    /// Defense stat
    pub defense: u32,
    /// Speed stat
    pub speed: u32,
    /// `data-testid` of the creation-affordance card picked for this monster
    #[serde(rename = "testId")]
    pub test_id: String,
}

impl MonsterRecord {
    /// Create a record
    #[must_use]
    pub fn new(
        name: impl Into<String>,
        stats: [u32; 4],
        test_id: impl Into<String>,
    ) -> Self {
        let [hp, attack, defense, speed] = stats;
        Self {
            name: name.into(),
            hp,
            attack,
            defense,
            speed,
            test_id: test_id.into(),
        }
    }

    /// One-line summary used in step logs
    #[must_use]
    pub fn summary(&self) -> String {
        format!(
            "{} with HP:{}, ATK:{}, DEF:{}, SPD:{}",
            self.name, self.hp, self.attack, self.defense, self.speed
        )
    }
}

/// The fixture file
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MonsterFixture {
    /// Records in creation order
    pub monsters: Vec<MonsterRecord>,
}

impl MonsterFixture {
    /// Wrap records
    #[must_use]
    pub fn new(monsters: Vec<MonsterRecord>) -> Self {
        Self { monsters }
    }

    /// Parse and validate fixture JSON
    pub fn from_json(json: &str) -> ProbeResult<Self> {
        let fixture: Self = serde_json::from_str(json)?;
        fixture.validate()?;
        Ok(fixture)
    }

    /// Load and validate a fixture file
    pub fn load(path: &Path) -> ProbeResult<Self> {
        let json = std::fs::read_to_string(path).map_err(|e| {
            ProbeError::fixture(format!("cannot read {}: {e}", path.display()))
        })?;
        let fixture = Self::from_json(&json)?;
        tracing::debug!(
            path = %path.display(),
            count = fixture.len(),
            "loaded monster fixture"
        );
        Ok(fixture)
    }

    /// Check the records are usable: at least one, names and test ids set,
    /// test ids unique.
    pub fn validate(&self) -> ProbeResult<()> {
        if self.monsters.is_empty() {
            return Err(ProbeError::fixture("fixture contains no monsters"));
        }

        let mut seen = HashSet::new();
        for (i, monster) in self.monsters.iter().enumerate() {
            if monster.name.trim().is_empty() {
                return Err(ProbeError::fixture(format!("monster #{i} has an empty name")));
            }
            if monster.test_id.trim().is_empty() {
                return Err(ProbeError::fixture(format!(
                    "monster #{i} ({}) has an empty testId",
                    monster.name
                )));
            }
            if !seen.insert(monster.test_id.as_str()) {
                return Err(ProbeError::fixture(format!(
                    "duplicate testId {:?}",
                    monster.test_id
                )));
            }
        }
        Ok(())
    }

    /// Number of records
    #[must_use]
    pub fn len(&self) -> usize {
        self.monsters.len()
    }

    /// Whether there are no records
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.monsters.is_empty()
    }

    /// Iterate records in creation order
    pub fn iter(&self) -> std::slice::Iter<'_, MonsterRecord> {
        self.monsters.iter()
    }
}
