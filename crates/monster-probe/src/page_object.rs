//! Page object for the monster page.
//!
//! [`MonsterPage`] translates domain operations (create a monster, verify a
//! card, delete everything) into driver primitives against the immutable
//! [`MonsterLocators`] table. It caches no page state: every operation
//! re-queries the page, and every query retries within the wait budget.

use crate::driver::ProbeDriver;
use crate::expect::expect;
use crate::fixture::MonsterRecord;
use crate::image::ImageProbe;
use crate::locator::{Locator, MonsterLocators, NumericField};
use crate::result::{ProbeError, ProbeResult};
use crate::wait::{poll_until, Attempt, WaitOptions};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Title text when no cards exist
pub const EMPTY_TITLE: &str = "There are no monsters";

/// Alert text for a submit with empty fields
pub const REQUIRED_FIELDS_MESSAGE: &str = "All fields are required";

/// Alert text for a non-numeric stat
pub const NUMERIC_FIELD_MESSAGE: &str = "Please enter a valid number";

/// Value typed into stat inputs to trigger numeric validation
pub const INVALID_NUMERIC_VALUE: &str = "abc";

/// Default extra iterations the deletion loop allows beyond the initial count
pub const DEFAULT_DELETION_MARGIN: usize = 3;

/// Trait for page objects representing a page or component in the UI.
pub trait PageObject {
    /// URL the page lives at
    fn url(&self) -> &str;

    /// Symbolic element names and their selectors
    fn locator_entries(&self) -> Vec<(&'static str, &str)>;

    /// Get the page name for logging/debugging
    fn page_name(&self) -> &str {
        std::any::type_name::<Self>()
    }
}

/// CSS values the suite asserts on affordance and favorite elements
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct VisualExpectations {
    /// `transition` of a hovered affordance card
    pub hover_transition: String,
    /// `border` of a clicked affordance card
    pub selected_border: String,
    /// `color` of an active favorite toggle
    pub favorite_color: String,
}

impl Default for VisualExpectations {
    fn default() -> Self {
        Self {
            hover_transition: "0.2s ease-in-out".to_string(),
            selected_border: "1px solid rgb(0, 0, 0)".to_string(),
            favorite_color: "rgb(255, 0, 0)".to_string(),
        }
    }
}

/// How a fixture record is matched to a rendered card
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum CardOrdering {
    /// Record `i` is card `i`
    #[default]
    Positional,
    /// Record is the card whose name text equals the record name
    ByName,
}

/// The monster page
#[derive(Debug)]
pub struct MonsterPage<D: ProbeDriver + ?Sized = dyn ProbeDriver> {
    driver: Arc<D>,
    base_url: String,
    locators: MonsterLocators,
    visuals: VisualExpectations,
    wait: WaitOptions,
    deletion_margin: usize,
    ordering: CardOrdering,
    verify_affordance_effects: bool,
    images: ImageProbe,
}

impl<D: ProbeDriver + ?Sized> PageObject for MonsterPage<D> {
    fn url(&self) -> &str {
        &self.base_url
    }

    fn locator_entries(&self) -> Vec<(&'static str, &str)> {
        self.locators.entries()
    }

    fn page_name(&self) -> &str {
        "monster page"
    }
}

impl<D: ProbeDriver + ?Sized> MonsterPage<D> {
    /// Create a page object over `driver` at `base_url` with default settings
    #[must_use]
    pub fn new(driver: Arc<D>, base_url: impl Into<String>) -> Self {
        Self {
            driver,
            base_url: base_url.into(),
            locators: MonsterLocators::default(),
            visuals: VisualExpectations::default(),
            wait: WaitOptions::default(),
            deletion_margin: DEFAULT_DELETION_MARGIN,
            ordering: CardOrdering::default(),
            verify_affordance_effects: true,
            images: ImageProbe::default(),
        }
    }

    /// Replace the locator table
    #[must_use]
    pub fn with_locators(mut self, locators: MonsterLocators) -> Self {
        self.locators = locators;
        self
    }

    /// Replace the visual expectations
    #[must_use]
    pub fn with_visuals(mut self, visuals: VisualExpectations) -> Self {
        self.visuals = visuals;
        self
    }

    /// Set wait options
    #[must_use]
    pub const fn with_wait(mut self, wait: WaitOptions) -> Self {
        self.wait = wait;
        self
    }

    /// Set the deletion loop margin
    #[must_use]
    pub const fn with_deletion_margin(mut self, margin: usize) -> Self {
        self.deletion_margin = margin;
        self
    }

    /// Set card ordering
    #[must_use]
    pub const fn with_ordering(mut self, ordering: CardOrdering) -> Self {
        self.ordering = ordering;
        self
    }

    /// Enable or disable the hover/click checks on affordance cards
    #[must_use]
    pub const fn with_affordance_effects(mut self, verify: bool) -> Self {
        self.verify_affordance_effects = verify;
        self
    }

    /// Replace the image probe
    #[must_use]
    pub fn with_image_probe(mut self, images: ImageProbe) -> Self {
        self.images = images;
        self
    }

    /// The driver
    #[must_use]
    pub fn driver(&self) -> &D {
        &self.driver
    }

    /// Locator table
    #[must_use]
    pub const fn locators(&self) -> &MonsterLocators {
        &self.locators
    }

    /// Wait options
    #[must_use]
    pub const fn wait_options(&self) -> &WaitOptions {
        &self.wait
    }

    // ------------------------------------------------------------------
    // Primitives
    // ------------------------------------------------------------------

    async fn wait_for_element(&self, selector: &str, index: usize) -> ProbeResult<()> {
        let waited_for = format!("{selector}[{index}] to exist");
        let driver = &*self.driver;
        poll_until(&waited_for, &self.wait, move || async move {
            let count = driver.count(selector).await?;
            Ok(if count > index {
                Attempt::Ready(())
            } else {
                Attempt::Pending(format!("{count} match(es)"))
            })
        })
        .await
        .map(|_| ())
    }

    async fn click_at(&self, selector: &str, index: usize) -> ProbeResult<()> {
        self.wait_for_element(selector, index).await?;
        debug!(selector, index, "click");
        self.driver.click(selector, index).await
    }

    async fn type_at(&self, selector: &str, index: usize, text: &str) -> ProbeResult<()> {
        self.wait_for_element(selector, index).await?;
        debug!(selector, index, text, "type");
        self.driver.type_text(selector, index, text).await
    }

    async fn clear_at(&self, selector: &str, index: usize) -> ProbeResult<()> {
        self.wait_for_element(selector, index).await?;
        debug!(selector, index, "clear");
        self.driver.clear(selector, index).await
    }

    async fn hover_at(&self, selector: &str, index: usize) -> ProbeResult<()> {
        self.wait_for_element(selector, index).await?;
        debug!(selector, index, "hover");
        self.driver.hover(selector, index).await
    }

    // ------------------------------------------------------------------
    // Operations
    // ------------------------------------------------------------------

    /// Navigate to the base URL
    pub async fn visit(&self) -> ProbeResult<()> {
        info!(url = %self.base_url, "visiting monster page");
        self.driver.navigate(&self.base_url).await
    }

    /// Current text of the dynamic title
    pub async fn dynamic_title_text(&self) -> ProbeResult<String> {
        let selector = &self.locators.dynamic_title;
        self.wait_for_element(selector, 0).await?;
        Ok(self.driver.text(selector, 0).await?.unwrap_or_default())
    }

    /// Number of rendered cards, read once without waiting
    pub async fn monster_count(&self) -> ProbeResult<usize> {
        self.driver.count(&self.locators.monster_card).await
    }

    /// Title shows the empty message
    pub async fn verify_empty_state(&self) -> ProbeResult<()> {
        expect(Locator::new(&self.locators.dynamic_title))
            .to_have_text(EMPTY_TITLE)
            .check(&*self.driver, &self.wait)
            .await
    }

    /// Rendered card count equals `count`
    pub async fn verify_monster_count(&self, count: usize) -> ProbeResult<()> {
        info!(count, "verifying monster count");
        expect(Locator::new(&self.locators.monster_card))
            .to_have_count(count)
            .check(&*self.driver, &self.wait)
            .await
    }

    /// Type every field of `record` into the form
    pub async fn fill_form(&self, record: &MonsterRecord) -> ProbeResult<()> {
        self.type_at(&self.locators.name_input, 0, &record.name).await?;
        for field in NumericField::ALL {
            let value = stat_value(record, field).to_string();
            self.type_at(self.locators.numeric_input(field), 0, &value)
                .await?;
        }
        Ok(())
    }

    /// Hover the affordance card and assert its transition
    pub async fn verify_hover_effect(&self, test_id: &str) -> ProbeResult<()> {
        let card = MonsterLocators::affordance_card(test_id);
        self.hover_at(&card, 0).await?;
        expect(Locator::new(card))
            .to_have_css("transition", &self.visuals.hover_transition)
            .check(&*self.driver, &self.wait)
            .await
    }

    /// Click the affordance card and assert its selected border
    pub async fn verify_click_effect(&self, test_id: &str) -> ProbeResult<()> {
        let card = MonsterLocators::affordance_card(test_id);
        self.click_at(&card, 0).await?;
        expect(Locator::new(card))
            .to_have_css("border", &self.visuals.selected_border)
            .check(&*self.driver, &self.wait)
            .await
    }

    /// Create one monster through the form
    pub async fn create_monster(&self, record: &MonsterRecord) -> ProbeResult<()> {
        info!(monster = %record.summary(), "creating monster");
        self.click_at(&self.locators.create_button, 0).await?;

        if self.verify_affordance_effects {
            self.verify_hover_effect(&record.test_id).await?;
            self.verify_click_effect(&record.test_id).await?;
        } else {
            self.click_at(&MonsterLocators::affordance_card(&record.test_id), 0)
                .await?;
        }

        self.fill_form(record).await?;
        expect(Locator::new(&self.locators.create_button))
            .to_be_enabled()
            .check(&*self.driver, &self.wait)
            .await?;
        self.click_at(&self.locators.create_button, 0).await
    }

    /// Index of the card that should show `record`.
    ///
    /// `ByName` requires exactly one card with the record's name; duplicates
    /// would make the match ambiguous.
    async fn card_index(&self, record: &MonsterRecord, index: usize) -> ProbeResult<usize> {
        match self.ordering {
            CardOrdering::Positional => Ok(index),
            CardOrdering::ByName => {
                let driver = &*self.driver;
                let selector = self.locators.card_name.as_str();
                let name = record.name.as_str();
                let waited_for = format!("exactly one card named {name:?}");
                let found = poll_until(&waited_for, &self.wait, move || async move {
                    let count = driver.count(selector).await?;
                    let mut names = Vec::with_capacity(count);
                    for i in 0..count {
                        names.push(driver.text(selector, i).await?.unwrap_or_default());
                    }
                    let matches: Vec<usize> = names
                        .iter()
                        .enumerate()
                        .filter(|(_, text)| text.as_str() == name)
                        .map(|(i, _)| i)
                        .collect();
                    Ok(match matches.as_slice() {
                        [only] => Attempt::Ready(*only),
                        [] => Attempt::Pending(format!("{names:?}")),
                        many => Attempt::Pending(format!("{} cards named {name:?}", many.len())),
                    })
                })
                .await;

                match found {
                    Ok(result) => Ok(result.value),
                    Err(ProbeError::Timeout { last_observed, .. }) => {
                        Err(ProbeError::AssertionFailed {
                            selector: selector.to_string(),
                            expected: format!("exactly one card named {name:?}"),
                            actual: last_observed,
                        })
                    }
                    Err(e) => Err(e),
                }
            }
        }
    }

    /// Verify the card for `record`: name, stats, favorite toggle and image
    pub async fn verify_monster(&self, record: &MonsterRecord, index: usize) -> ProbeResult<()> {
        let index = self.card_index(record, index).await?;
        info!(monster = %record.name, index, "verifying monster card");

        expect(Locator::new(&self.locators.card_name).nth(index))
            .to_have_text(&record.name)
            .check(&*self.driver, &self.wait)
            .await?;

        for field in NumericField::ALL {
            expect(Locator::new(self.locators.card_stat(field)).nth(index))
                .to_have_attribute("aria-valuenow", stat_value(record, field).to_string())
                .check(&*self.driver, &self.wait)
                .await?;
        }

        self.verify_favorite_toggle(index).await?;
        self.verify_monster_image(index).await
    }

    /// Toggle the favorite on and off, asserting the color each time.
    ///
    /// The second click must restore the color the button had before the
    /// first one, not merely leave the favorite color.
    pub async fn verify_favorite_toggle(&self, index: usize) -> ProbeResult<()> {
        let button = &self.locators.favorite_button;
        let favorite = &self.visuals.favorite_color;

        self.wait_for_element(button, index).await?;
        let original = self
            .driver
            .computed_style(button, index, "color")
            .await?
            .ok_or_else(|| ProbeError::AssertionFailed {
                selector: format!("{button}[{index}]"),
                expected: "a computed color".to_string(),
                actual: "no value".to_string(),
            })?;

        self.click_at(button, index).await?;
        expect(Locator::new(button).nth(index))
            .to_have_css("color", favorite)
            .check(&*self.driver, &self.wait)
            .await?;

        self.click_at(button, index).await?;
        expect(Locator::new(button).nth(index))
            .not_to_have_css("color", favorite)
            .check(&*self.driver, &self.wait)
            .await?;
        expect(Locator::new(button).nth(index))
            .to_have_css("color", &original)
            .check(&*self.driver, &self.wait)
            .await
    }

    /// The card image is visible and its `src` answers HTTP 200
    pub async fn verify_monster_image(&self, index: usize) -> ProbeResult<()> {
        let image = &self.locators.monster_image;
        expect(Locator::new(image).nth(index))
            .to_be_visible()
            .check(&*self.driver, &self.wait)
            .await?;

        let src = self
            .driver
            .attribute(image, index, "src")
            .await?
            .filter(|s| !s.is_empty())
            .ok_or_else(|| ProbeError::AssertionFailed {
                selector: format!("{image}[{index}]"),
                expected: "a src attribute".to_string(),
                actual: "no value".to_string(),
            })?;
        let page_url = self.driver.current_url().await?;
        let url = self.images.check(&page_url, &src).await?;
        debug!(%url, "image reachable");
        Ok(())
    }

    /// Click the first delete button
    pub async fn delete_first_monster(&self) -> ProbeResult<()> {
        self.click_at(&self.locators.delete_button, 0).await
    }

    /// Delete cards one at a time until none remain.
    ///
    /// Runs at most `initial_count + deletion_margin` iterations. Returns the
    /// number of iterations that removed a card.
    ///
    /// # Errors
    ///
    /// Returns [`ProbeError::DeletionStalled`] if cards remain once the
    /// iterations are used up
    pub async fn delete_all_monsters(&self) -> ProbeResult<usize> {
        let initial = self.monster_count().await?;
        let guard = initial + self.deletion_margin;
        info!(initial, guard, "deleting all monsters");

        let driver = &*self.driver;
        let cards = self.locators.monster_card.as_str();
        let mut deleted = 0;

        for attempt in 1..=guard {
            let before = driver.count(cards).await?;
            if before == 0 {
                break;
            }

            self.delete_first_monster().await?;
            let waited_for = format!("card count below {before}");
            let dropped = poll_until(&waited_for, &self.wait, move || async move {
                let now = driver.count(cards).await?;
                Ok(if now < before {
                    Attempt::Ready(now)
                } else {
                    Attempt::Pending(format!("{now} card(s)"))
                })
            })
            .await;

            match dropped {
                Ok(result) => {
                    deleted += 1;
                    debug!(attempt, remaining = result.value, "card deleted");
                }
                Err(ProbeError::Timeout { last_observed, .. }) => {
                    warn!(attempt, before, %last_observed, "card count did not drop after delete");
                }
                Err(e) => return Err(e),
            }
        }

        let remaining = driver.count(cards).await?;
        if remaining > 0 {
            return Err(ProbeError::DeletionStalled {
                attempts: guard,
                remaining,
            });
        }
        info!(deleted, "all monsters deleted");
        Ok(deleted)
    }

    /// Submitting an empty form shows the required-fields alert
    pub async fn verify_required_fields_alert(&self) -> ProbeResult<()> {
        self.click_at(&self.locators.create_button, 0).await?;
        self.expect_alert(REQUIRED_FIELDS_MESSAGE).await
    }

    /// Each stat input rejects a non-numeric value
    pub async fn verify_numeric_field_validation(&self) -> ProbeResult<()> {
        for field in NumericField::ALL {
            info!(%field, "checking numeric validation");
            let input = self.locators.numeric_input(field);
            self.type_at(input, 0, INVALID_NUMERIC_VALUE).await?;
            self.expect_alert(NUMERIC_FIELD_MESSAGE).await?;
            self.clear_at(input, 0).await?;
            self.expect_numeric_alert_cleared(field).await?;
        }
        Ok(())
    }

    /// The numeric alert goes away once the offending input is empty, so the
    /// next field's check cannot pass on a leftover alert
    async fn expect_numeric_alert_cleared(&self, field: NumericField) -> ProbeResult<()> {
        let driver = &*self.driver;
        let selector = self.locators.alert_message.as_str();
        let waited_for = format!("numeric alert to clear after {field}");
        let cleared = poll_until(&waited_for, &self.wait, move || async move {
            if driver.count(selector).await? == 0 {
                return Ok(Attempt::Ready(()));
            }
            match driver.text(selector, 0).await? {
                Some(text) if text == NUMERIC_FIELD_MESSAGE => {
                    Ok(Attempt::Pending(format!("{text:?}")))
                }
                _ => Ok(Attempt::Ready(())),
            }
        })
        .await;

        match cleared {
            Ok(_) => Ok(()),
            Err(ProbeError::Timeout { last_observed, .. }) => Err(ProbeError::AssertionFailed {
                selector: selector.to_string(),
                expected: format!("alert cleared after clearing {field}"),
                actual: last_observed,
            }),
            Err(e) => Err(e),
        }
    }

    async fn expect_alert(&self, message: &str) -> ProbeResult<()> {
        let alert = Locator::new(&self.locators.alert_message);
        expect(alert.clone())
            .to_be_visible()
            .check(&*self.driver, &self.wait)
            .await?;
        expect(alert)
            .to_have_text(message)
            .check(&*self.driver, &self.wait)
            .await
    }
}

const fn stat_value(record: &MonsterRecord, field: NumericField) -> u32 {
    match field {
        NumericField::Hp => record.hp,
        NumericField::Attack => record.attack,
        NumericField::Defense => record.defense,
        NumericField::Speed => record.speed,
    }
}
