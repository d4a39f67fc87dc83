//! Locator table for the monster page.
//!
//! Every element the suite touches is addressed through a symbolic name in
//! [`MonsterLocators`]. Scenarios never see selector strings, and the
//! application's `data-testid` contract lives in exactly one place.
//!
//! Elements are addressed as `(selector, index)` pairs: the `index`-th match
//! of the selector in document order.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Selector type for locating elements
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Selector {
    /// CSS selector (e.g., `input[name="hp"]`)
    Css(String),
    /// Test ID selector (`data-testid` attribute)
    TestId(String),
}

impl Selector {
    /// Create a CSS selector
    #[must_use]
    pub fn css(selector: impl Into<String>) -> Self {
        Self::Css(selector.into())
    }

    /// Create a test ID selector
    #[must_use]
    pub fn test_id(id: impl Into<String>) -> Self {
        Self::TestId(id.into())
    }

    /// Render as a CSS selector string
    #[must_use]
    pub fn to_css(&self) -> String {
        match self {
            Self::Css(s) => s.clone(),
            Self::TestId(id) => {
                let escaped = id.replace('\\', "\\\\").replace('"', "\\\"");
                format!("[data-testid=\"{escaped}\"]")
            }
        }
    }
}

impl fmt::Display for Selector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_css())
    }
}

/// One element on the page: the `index`-th match of a selector
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Locator {
    selector: String,
    index: usize,
}

impl Locator {
    /// First match of `selector`
    #[must_use]
    pub fn new(selector: impl Into<String>) -> Self {
        Self {
            selector: selector.into(),
            index: 0,
        }
    }

    /// The `index`-th match instead of the first
    #[must_use]
    pub const fn nth(mut self, index: usize) -> Self {
        self.index = index;
        self
    }

    /// Selector string
    #[must_use]
    pub fn selector(&self) -> &str {
        &self.selector
    }

    /// Zero-based position among matches
    #[must_use]
    pub const fn index(&self) -> usize {
        self.index
    }
}

impl fmt::Display for Locator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}[{}]", self.selector, self.index)
    }
}

/// The four numeric stat inputs of the creation form
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NumericField {
    /// Hit points
    Hp,
    /// Attack
    Attack,
    /// Defense
    Defense,
    /// Speed
    Speed,
}

impl NumericField {
    /// All numeric fields in form order
    pub const ALL: [Self; 4] = [Self::Hp, Self::Attack, Self::Defense, Self::Speed];

    /// The input's `name` attribute
    #[must_use]
    pub const fn input_name(self) -> &'static str {
        match self {
            Self::Hp => "hp",
            Self::Attack => "attack",
            Self::Defense => "defense",
            Self::Speed => "speed",
        }
    }
}

impl fmt::Display for NumericField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.input_name())
    }
}

/// Symbolic element name -> selector string.
///
/// Deserializes with per-field defaults so a config file can override a
/// single entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MonsterLocators {
    /// Title that changes with the monster count
    pub dynamic_title: String,
    /// Create/submit button
    pub create_button: String,
    /// Per-card delete button
    pub delete_button: String,
    /// Rendered monster card
    pub monster_card: String,
    /// Name input
    pub name_input: String,
    /// HP input
    pub hp_input: String,
    /// Attack input
    pub attack_input: String,
    /// Defense input
    pub defense_input: String,
    /// Speed input
    pub speed_input: String,
    /// Validation alert
    pub alert_message: String,
    /// Card image
    pub monster_image: String,
    /// Card favorite toggle
    pub favorite_button: String,
    /// Card name label
    pub card_name: String,
    /// Card HP bar
    pub card_hp: String,
    /// Card attack bar
    pub card_attack: String,
    /// Card defense bar
    pub card_defense: String,
    /// Card speed bar
    pub card_speed: String,
}

/// Form inputs are addressed by their `name` attribute
fn named_input(name: &str) -> String {
    Selector::css(format!(r#"input[name="{name}"]"#)).to_css()
}

impl Default for MonsterLocators {
    fn default() -> Self {
        Self {
            dynamic_title: Selector::test_id("dynamic-title").to_css(),
            create_button: Selector::test_id("btn-create-monster").to_css(),
            delete_button: Selector::test_id("btn-delete").to_css(),
            monster_card: Selector::test_id("monster-card").to_css(),
            name_input: named_input("name"),
            hp_input: named_input(NumericField::Hp.input_name()),
            attack_input: named_input(NumericField::Attack.input_name()),
            defense_input: named_input(NumericField::Defense.input_name()),
            speed_input: named_input(NumericField::Speed.input_name()),
            alert_message: Selector::test_id("alert-required-fields").to_css(),
            monster_image: Selector::test_id("monster-image").to_css(),
            favorite_button: Selector::test_id("favorite-btn").to_css(),
            card_name: Selector::test_id("card-monster-name").to_css(),
            card_hp: Selector::test_id("card-monster-hp").to_css(),
            card_attack: Selector::test_id("card-monster-attack").to_css(),
            card_defense: Selector::test_id("card-monster-defense").to_css(),
            card_speed: Selector::test_id("card-monster-speed").to_css(),
        }
    }
}

impl MonsterLocators {
    /// Input selector for a numeric field
    #[must_use]
    pub fn numeric_input(&self, field: NumericField) -> &str {
        match field {
            NumericField::Hp => &self.hp_input,
            NumericField::Attack => &self.attack_input,
            NumericField::Defense => &self.defense_input,
            NumericField::Speed => &self.speed_input,
        }
    }

    /// Card stat bar selector for a numeric field
    #[must_use]
    pub fn card_stat(&self, field: NumericField) -> &str {
        match field {
            NumericField::Hp => &self.card_hp,
            NumericField::Attack => &self.card_attack,
            NumericField::Defense => &self.card_defense,
            NumericField::Speed => &self.card_speed,
        }
    }

    /// Creation-affordance card for a fixture `testId`
    #[must_use]
    pub fn affordance_card(test_id: &str) -> String {
        Selector::test_id(test_id).to_css()
    }

    /// All entries as `(name, selector)` in table order
    #[must_use]
    pub fn entries(&self) -> Vec<(&'static str, &str)> {
        vec![
            ("dynamic_title", self.dynamic_title.as_str()),
            ("create_button", self.create_button.as_str()),
            ("delete_button", self.delete_button.as_str()),
            ("monster_card", self.monster_card.as_str()),
            ("name_input", self.name_input.as_str()),
            ("hp_input", self.hp_input.as_str()),
            ("attack_input", self.attack_input.as_str()),
            ("defense_input", self.defense_input.as_str()),
            ("speed_input", self.speed_input.as_str()),
            ("alert_message", self.alert_message.as_str()),
            ("monster_image", self.monster_image.as_str()),
            ("favorite_button", self.favorite_button.as_str()),
            ("card_name", self.card_name.as_str()),
            ("card_hp", self.card_hp.as_str()),
            ("card_attack", self.card_attack.as_str()),
            ("card_defense", self.card_defense.as_str()),
            ("card_speed", self.card_speed.as_str()),
        ]
    }
}
