//! In-memory model of the monster page.
//!
//! `FakeMonsterApp` implements [`ProbeDriver`] by interpreting the selectors
//! of a [`MonsterLocators`] table against a small state machine that behaves
//! like the real page: a creation form with validation, a list of cards with
//! favorite toggles and delete buttons, and a title that reflects the count.
//! Faults can be switched on to exercise the failure paths of the suite.

use crate::driver::{not_found, ProbeDriver};
use crate::locator::{MonsterLocators, NumericField};
use crate::page_object::{
    EMPTY_TITLE, NUMERIC_FIELD_MESSAGE, REQUIRED_FIELDS_MESSAGE,
};
use crate::result::ProbeResult;
use async_trait::async_trait;
use tokio::sync::Mutex;

/// Title rendered once at least one card exists
pub const POPULATED_TITLE: &str = "Your Monsters";

const HOVER_TRANSITION: &str = "0.2s ease-in-out";
const SELECTED_BORDER: &str = "1px solid rgb(0, 0, 0)";
const UNSELECTED_BORDER: &str = "0px none rgb(0, 0, 0)";
const FAVORITE_COLOR: &str = "rgb(255, 0, 0)";
const DEFAULT_COLOR: &str = "rgb(0, 0, 0)";
const UNFAVORITED_COLOR: &str = "rgb(0, 0, 255)";

/// Faults the fake page can be told to exhibit
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FakeFaults {
    /// Delete buttons do nothing
    pub stuck_deletes: bool,
    /// New cards are rendered first instead of last
    pub newest_first: bool,
    /// Card images point at a path the image server does not have
    pub broken_images: bool,
    /// Un-favoriting leaves a third color instead of the original one
    pub unfavorite_recolors: bool,
    /// A successful submit renders the new card twice
    pub duplicate_creates: bool,
    /// The numeric alert stays up after the offending input is cleared
    pub sticky_alerts: bool,
}

/// Construction options for [`FakeMonsterApp`]
#[derive(Debug, Clone)]
pub struct FakeAppOptions {
    /// Locator table the fake interprets
    pub locators: MonsterLocators,
    /// Base URL images are served from
    pub image_base_url: String,
    /// `data-testid`s of the creation-affordance cards
    pub affordance_ids: Vec<String>,
    /// Faults to exhibit
    pub faults: FakeFaults,
}

impl Default for FakeAppOptions {
    fn default() -> Self {
        Self {
            locators: MonsterLocators::default(),
            image_base_url: "http://localhost:3000/images".to_string(),
            affordance_ids: (1..=5).map(|i| format!("monster-{i}")).collect(),
            faults: FakeFaults::default(),
        }
    }
}

impl FakeAppOptions {
    /// Set the image base URL
    #[must_use]
    pub fn with_image_base_url(mut self, url: impl Into<String>) -> Self {
        self.image_base_url = url.into();
        self
    }

    /// Set the affordance ids
    #[must_use]
    pub fn with_affordances<I, S>(mut self, ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.affordance_ids = ids.into_iter().map(Into::into).collect();
        self
    }

    /// Set faults
    #[must_use]
    pub const fn with_faults(mut self, faults: FakeFaults) -> Self {
        self.faults = faults;
        self
    }
}

#[derive(Debug, Clone)]
struct Card {
    name: String,
    stats: [String; 4],
    image: String,
    favorite: bool,
    toggled: bool,
}

#[derive(Debug, Default)]
struct PageState {
    url: String,
    name: String,
    stats: [String; 4],
    alert: Option<&'static str>,
    selected: Option<String>,
    hovered: Option<String>,
    cards: Vec<Card>,
    calls: Vec<String>,
    closed: bool,
}

impl PageState {
    fn reset(&mut self, url: &str) {
        let calls = std::mem::take(&mut self.calls);
        *self = Self {
            url: url.to_string(),
            calls,
            ..Self::default()
        };
    }

    fn invalid_numeric(&self) -> bool {
        self.stats
            .iter()
            .any(|v| !v.is_empty() && v.trim().parse::<f64>().is_err())
    }

    fn revalidate(&mut self) {
        if self.invalid_numeric() {
            self.alert = Some(NUMERIC_FIELD_MESSAGE);
        } else if self.alert == Some(NUMERIC_FIELD_MESSAGE) {
            self.alert = None;
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Target {
    Title,
    Create,
    Delete,
    Card,
    NameInput,
    StatInput(NumericField),
    Alert,
    Image,
    Favorite,
    CardName,
    CardStat(NumericField),
    Affordance(String),
    Unknown,
}

const fn stat_index(field: NumericField) -> usize {
    match field {
        NumericField::Hp => 0,
        NumericField::Attack => 1,
        NumericField::Defense => 2,
        NumericField::Speed => 3,
    }
}

/// In-memory monster page
#[derive(Debug)]
pub struct FakeMonsterApp {
    options: FakeAppOptions,
    state: Mutex<PageState>,
}

impl Default for FakeMonsterApp {
    fn default() -> Self {
        Self::new(FakeAppOptions::default())
    }
}

impl FakeMonsterApp {
    /// Create a fake page
    #[must_use]
    pub fn new(options: FakeAppOptions) -> Self {
        Self {
            options,
            state: Mutex::new(PageState::default()),
        }
    }

    /// Names of the rendered cards in display order
    pub async fn card_names(&self) -> Vec<String> {
        self.state
            .lock()
            .await
            .cards
            .iter()
            .map(|c| c.name.clone())
            .collect()
    }

    /// Driver calls made so far, e.g. `click:[data-testid="btn-delete"]#0`
    pub async fn history(&self) -> Vec<String> {
        self.state.lock().await.calls.clone()
    }

    /// Check if a driver method was called
    pub async fn was_called(&self, method: &str) -> bool {
        self.state
            .lock()
            .await
            .calls
            .iter()
            .any(|c| c.starts_with(method))
    }

    /// Whether `close` has been called
    pub async fn is_closed(&self) -> bool {
        self.state.lock().await.closed
    }

    fn resolve(&self, selector: &str) -> Target {
        let l = &self.options.locators;
        if selector == l.dynamic_title {
            return Target::Title;
        }
        if selector == l.create_button {
            return Target::Create;
        }
        if selector == l.delete_button {
            return Target::Delete;
        }
        if selector == l.monster_card {
            return Target::Card;
        }
        if selector == l.name_input {
            return Target::NameInput;
        }
        if selector == l.alert_message {
            return Target::Alert;
        }
        if selector == l.monster_image {
            return Target::Image;
        }
        if selector == l.favorite_button {
            return Target::Favorite;
        }
        if selector == l.card_name {
            return Target::CardName;
        }
        for field in NumericField::ALL {
            if selector == l.numeric_input(field) {
                return Target::StatInput(field);
            }
            if selector == l.card_stat(field) {
                return Target::CardStat(field);
            }
        }
        self.options
            .affordance_ids
            .iter()
            .find(|id| MonsterLocators::affordance_card(id) == selector)
            .map_or(Target::Unknown, |id| Target::Affordance(id.clone()))
    }

    fn count_in(&self, state: &PageState, target: &Target) -> usize {
        match target {
            Target::Title
            | Target::Create
            | Target::NameInput
            | Target::StatInput(_)
            | Target::Affordance(_) => usize::from(!state.url.is_empty()),
            Target::Alert => usize::from(state.alert.is_some()),
            Target::Delete
            | Target::Card
            | Target::Image
            | Target::Favorite
            | Target::CardName
            | Target::CardStat(_) => state.cards.len(),
            Target::Unknown => 0,
        }
    }

    fn exists(&self, state: &PageState, target: &Target, index: usize) -> bool {
        index < self.count_in(state, target)
    }

    fn image_url(&self, affordance: Option<&str>) -> String {
        let base = self.options.image_base_url.trim_end_matches('/');
        if self.options.faults.broken_images {
            return format!("{base}/missing/{}.png", affordance.unwrap_or("none"));
        }
        format!("{base}/{}.png", affordance.unwrap_or("placeholder"))
    }

    fn submit(&self, state: &mut PageState) {
        if state.name.is_empty() || state.stats.iter().any(String::is_empty) {
            state.alert = Some(REQUIRED_FIELDS_MESSAGE);
            return;
        }
        if state.invalid_numeric() {
            state.alert = Some(NUMERIC_FIELD_MESSAGE);
            return;
        }

        let card = Card {
            name: std::mem::take(&mut state.name),
            stats: std::mem::take(&mut state.stats),
            image: self.image_url(state.selected.as_deref()),
            favorite: false,
            toggled: false,
        };
        let copies = if self.options.faults.duplicate_creates { 2 } else { 1 };
        for _ in 0..copies {
            if self.options.faults.newest_first {
                state.cards.insert(0, card.clone());
            } else {
                state.cards.push(card.clone());
            }
        }
        state.alert = None;
        state.selected = None;
    }
}

#[async_trait]
impl ProbeDriver for FakeMonsterApp {
    async fn navigate(&self, url: &str) -> ProbeResult<()> {
        let mut state = self.state.lock().await;
        state.calls.push(format!("navigate:{url}"));
        state.reset(url);
        Ok(())
    }

    async fn current_url(&self) -> ProbeResult<String> {
        Ok(self.state.lock().await.url.clone())
    }

    async fn count(&self, selector: &str) -> ProbeResult<usize> {
        let target = self.resolve(selector);
        let state = self.state.lock().await;
        Ok(self.count_in(&state, &target))
    }

    async fn text(&self, selector: &str, index: usize) -> ProbeResult<Option<String>> {
        let target = self.resolve(selector);
        let state = self.state.lock().await;
        if !self.exists(&state, &target, index) {
            return Ok(None);
        }
        let text = match target {
            Target::Title if state.cards.is_empty() => EMPTY_TITLE.to_string(),
            Target::Title => POPULATED_TITLE.to_string(),
            Target::Alert => state.alert.unwrap_or_default().to_string(),
            Target::CardName => state.cards[index].name.clone(),
            Target::Create => "Create Monster".to_string(),
            _ => String::new(),
        };
        Ok(Some(text))
    }

    async fn attribute(
        &self,
        selector: &str,
        index: usize,
        name: &str,
    ) -> ProbeResult<Option<String>> {
        let target = self.resolve(selector);
        let state = self.state.lock().await;
        if !self.exists(&state, &target, index) {
            return Ok(None);
        }
        let value = match (&target, name) {
            (Target::CardStat(field), "aria-valuenow") => {
                Some(state.cards[index].stats[stat_index(*field)].clone())
            }
            (Target::Image, "src") => Some(state.cards[index].image.clone()),
            (Target::NameInput, "value") => Some(state.name.clone()),
            (Target::StatInput(field), "value") => Some(state.stats[stat_index(*field)].clone()),
            (Target::StatInput(field), "name") => Some(field.input_name().to_string()),
            (Target::Affordance(id), "data-testid") => Some(id.clone()),
            _ => None,
        };
        Ok(value)
    }

    async fn computed_style(
        &self,
        selector: &str,
        index: usize,
        property: &str,
    ) -> ProbeResult<Option<String>> {
        let target = self.resolve(selector);
        let state = self.state.lock().await;
        if !self.exists(&state, &target, index) {
            return Ok(None);
        }
        let value = match (&target, property) {
            (Target::Affordance(_), "transition") => HOVER_TRANSITION,
            (Target::Affordance(id), "border") => {
                if state.selected.as_deref() == Some(id.as_str()) {
                    SELECTED_BORDER
                } else {
                    UNSELECTED_BORDER
                }
            }
            (Target::Favorite, "color") => {
                let card = &state.cards[index];
                if card.favorite {
                    FAVORITE_COLOR
                } else if card.toggled && self.options.faults.unfavorite_recolors {
                    UNFAVORITED_COLOR
                } else {
                    DEFAULT_COLOR
                }
            }
            (_, "color") => DEFAULT_COLOR,
            _ => "",
        };
        Ok(Some(value.to_string()))
    }

    async fn is_visible(&self, selector: &str, index: usize) -> ProbeResult<bool> {
        let target = self.resolve(selector);
        let state = self.state.lock().await;
        Ok(self.exists(&state, &target, index))
    }

    async fn is_enabled(&self, selector: &str, index: usize) -> ProbeResult<bool> {
        let target = self.resolve(selector);
        let state = self.state.lock().await;
        Ok(self.exists(&state, &target, index))
    }

    async fn click(&self, selector: &str, index: usize) -> ProbeResult<()> {
        let target = self.resolve(selector);
        let mut state = self.state.lock().await;
        if !self.exists(&state, &target, index) {
            return Err(not_found(selector, index));
        }
        state.calls.push(format!("click:{selector}#{index}"));
        match target {
            Target::Create => self.submit(&mut state),
            Target::Delete => {
                if !self.options.faults.stuck_deletes {
                    state.cards.remove(index);
                }
            }
            Target::Favorite => {
                let card = &mut state.cards[index];
                card.favorite = !card.favorite;
                card.toggled = true;
            }
            Target::Affordance(id) => state.selected = Some(id),
            _ => {}
        }
        Ok(())
    }

    async fn hover(&self, selector: &str, index: usize) -> ProbeResult<()> {
        let target = self.resolve(selector);
        let mut state = self.state.lock().await;
        if !self.exists(&state, &target, index) {
            return Err(not_found(selector, index));
        }
        state.calls.push(format!("hover:{selector}#{index}"));
        if let Target::Affordance(id) = target {
            state.hovered = Some(id);
        }
        Ok(())
    }

    async fn type_text(&self, selector: &str, index: usize, text: &str) -> ProbeResult<()> {
        let target = self.resolve(selector);
        let mut state = self.state.lock().await;
        if !self.exists(&state, &target, index) {
            return Err(not_found(selector, index));
        }
        state.calls.push(format!("type:{selector}#{index}={text}"));
        match target {
            Target::NameInput => state.name.push_str(text),
            Target::StatInput(field) => {
                state.stats[stat_index(field)].push_str(text);
                state.revalidate();
            }
            _ => {}
        }
        Ok(())
    }

    async fn clear(&self, selector: &str, index: usize) -> ProbeResult<()> {
        let target = self.resolve(selector);
        let mut state = self.state.lock().await;
        if !self.exists(&state, &target, index) {
            return Err(not_found(selector, index));
        }
        state.calls.push(format!("clear:{selector}#{index}"));
        match target {
            Target::NameInput => state.name.clear(),
            Target::StatInput(field) => {
                state.stats[stat_index(field)].clear();
                if !self.options.faults.sticky_alerts {
                    state.revalidate();
                }
            }
            _ => {}
        }
        Ok(())
    }

    async fn screenshot(&self) -> ProbeResult<Vec<u8>> {
        // PNG signature only
        Ok(vec![0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A])
    }

    async fn close(&self) -> ProbeResult<()> {
        let mut state = self.state.lock().await;
        state.calls.push("close".to_string());
        state.closed = true;
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    const URL: &str = "http://localhost:3000/";

    async fn visited() -> (FakeMonsterApp, MonsterLocators) {
        let app = FakeMonsterApp::default();
        app.navigate(URL).await.unwrap();
        (app, MonsterLocators::default())
    }

    async fn fill(app: &FakeMonsterApp, l: &MonsterLocators, name: &str, stats: [&str; 4]) {
        app.type_text(&l.name_input, 0, name).await.unwrap();
        for (field, value) in NumericField::ALL.into_iter().zip(stats) {
            app.type_text(l.numeric_input(field), 0, value).await.unwrap();
        }
    }

    mod page_tests {
        use super::*;

        #[tokio::test]
        async fn test_nothing_rendered_before_navigation() {
            let app = FakeMonsterApp::default();
            let l = MonsterLocators::default();
            assert_eq!(app.count(&l.dynamic_title).await.unwrap(), 0);
            assert!(app.click(&l.create_button, 0).await.is_err());
        }

        #[tokio::test]
        async fn test_empty_title() {
            let (app, l) = visited().await;
            assert_eq!(
                app.text(&l.dynamic_title, 0).await.unwrap().as_deref(),
                Some(EMPTY_TITLE)
            );
            assert_eq!(app.count(&l.monster_card).await.unwrap(), 0);
        }

        #[tokio::test]
        async fn test_unknown_selector_matches_nothing() {
            let (app, _) = visited().await;
            assert_eq!(app.count(".nope").await.unwrap(), 0);
            assert_eq!(app.text(".nope", 0).await.unwrap(), None);
        }

        #[tokio::test]
        async fn test_navigation_resets_state() {
            let (app, l) = visited().await;
            fill(&app, &l, "Shark", ["1", "2", "3", "4"]).await;
            app.click(&l.create_button, 0).await.unwrap();
            assert_eq!(app.count(&l.monster_card).await.unwrap(), 1);

            app.navigate(URL).await.unwrap();
            assert_eq!(app.count(&l.monster_card).await.unwrap(), 0);
            assert!(app.was_called("navigate:").await);
        }
    }

    mod form_tests {
        use super::*;

        #[tokio::test]
        async fn test_empty_submit_shows_required_alert() {
            let (app, l) = visited().await;
            app.click(&l.create_button, 0).await.unwrap();
            assert_eq!(
                app.text(&l.alert_message, 0).await.unwrap().as_deref(),
                Some(REQUIRED_FIELDS_MESSAGE)
            );
        }

        #[tokio::test]
        async fn test_non_numeric_input_alerts_then_clears() {
            let (app, l) = visited().await;
            app.type_text(&l.hp_input, 0, "abc").await.unwrap();
            assert_eq!(
                app.text(&l.alert_message, 0).await.unwrap().as_deref(),
                Some(NUMERIC_FIELD_MESSAGE)
            );
            app.clear(&l.hp_input, 0).await.unwrap();
            assert_eq!(app.count(&l.alert_message).await.unwrap(), 0);
        }

        #[tokio::test]
        async fn test_submit_creates_card_and_resets_form() {
            let (app, l) = visited().await;
            app.click(&MonsterLocators::affordance_card("monster-2"), 0)
                .await
                .unwrap();
            fill(&app, &l, "Old Shark", ["70", "80", "50", "60"]).await;
            app.click(&l.create_button, 0).await.unwrap();

            assert_eq!(app.card_names().await, vec!["Old Shark".to_string()]);
            assert_eq!(
                app.attribute(&l.card_attack, 0, "aria-valuenow")
                    .await
                    .unwrap()
                    .as_deref(),
                Some("80")
            );
            assert_eq!(
                app.attribute(&l.monster_image, 0, "src").await.unwrap().as_deref(),
                Some("http://localhost:3000/images/monster-2.png")
            );
            assert_eq!(
                app.attribute(&l.name_input, 0, "value").await.unwrap().as_deref(),
                Some("")
            );
            assert_eq!(
                app.text(&l.dynamic_title, 0).await.unwrap().as_deref(),
                Some(POPULATED_TITLE)
            );
        }
    }

    mod card_tests {
        use super::*;

        #[tokio::test]
        async fn test_affordance_styles() {
            let (app, _) = visited().await;
            let card = MonsterLocators::affordance_card("monster-1");
            assert_eq!(
                app.computed_style(&card, 0, "border").await.unwrap().as_deref(),
                Some(UNSELECTED_BORDER)
            );
            app.hover(&card, 0).await.unwrap();
            app.click(&card, 0).await.unwrap();
            assert_eq!(
                app.computed_style(&card, 0, "transition").await.unwrap().as_deref(),
                Some(HOVER_TRANSITION)
            );
            assert_eq!(
                app.computed_style(&card, 0, "border").await.unwrap().as_deref(),
                Some(SELECTED_BORDER)
            );
        }

        #[tokio::test]
        async fn test_favorite_toggles_color() {
            let (app, l) = visited().await;
            fill(&app, &l, "A", ["1", "1", "1", "1"]).await;
            app.click(&l.create_button, 0).await.unwrap();

            app.click(&l.favorite_button, 0).await.unwrap();
            assert_eq!(
                app.computed_style(&l.favorite_button, 0, "color").await.unwrap().as_deref(),
                Some(FAVORITE_COLOR)
            );
            app.click(&l.favorite_button, 0).await.unwrap();
            assert_eq!(
                app.computed_style(&l.favorite_button, 0, "color").await.unwrap().as_deref(),
                Some(DEFAULT_COLOR)
            );
        }

        #[tokio::test]
        async fn test_newest_first_fault() {
            let app = FakeMonsterApp::new(FakeAppOptions::default().with_faults(FakeFaults {
                newest_first: true,
                ..FakeFaults::default()
            }));
            let l = MonsterLocators::default();
            app.navigate(URL).await.unwrap();
            for name in ["A", "B"] {
                fill(&app, &l, name, ["1", "1", "1", "1"]).await;
                app.click(&l.create_button, 0).await.unwrap();
            }
            assert_eq!(app.card_names().await, vec!["B".to_string(), "A".to_string()]);
        }

        #[tokio::test]
        async fn test_stuck_deletes_fault() {
            let app = FakeMonsterApp::new(FakeAppOptions::default().with_faults(FakeFaults {
                stuck_deletes: true,
                ..FakeFaults::default()
            }));
            let l = MonsterLocators::default();
            app.navigate(URL).await.unwrap();
            fill(&app, &l, "A", ["1", "1", "1", "1"]).await;
            app.click(&l.create_button, 0).await.unwrap();
            app.click(&l.delete_button, 0).await.unwrap();
            assert_eq!(app.count(&l.monster_card).await.unwrap(), 1);
        }

        #[tokio::test]
        async fn test_duplicate_creates_fault() {
            let app = FakeMonsterApp::new(FakeAppOptions::default().with_faults(FakeFaults {
                duplicate_creates: true,
                ..FakeFaults::default()
            }));
            let l = MonsterLocators::default();
            app.navigate(URL).await.unwrap();
            fill(&app, &l, "A", ["1", "1", "1", "1"]).await;
            app.click(&l.create_button, 0).await.unwrap();
            assert_eq!(app.card_names().await, vec!["A".to_string(), "A".to_string()]);
        }

        #[tokio::test]
        async fn test_unfavorite_recolors_fault() {
            let app = FakeMonsterApp::new(FakeAppOptions::default().with_faults(FakeFaults {
                unfavorite_recolors: true,
                ..FakeFaults::default()
            }));
            let l = MonsterLocators::default();
            app.navigate(URL).await.unwrap();
            fill(&app, &l, "A", ["1", "1", "1", "1"]).await;
            app.click(&l.create_button, 0).await.unwrap();
            app.click(&l.favorite_button, 0).await.unwrap();
            app.click(&l.favorite_button, 0).await.unwrap();
            assert_eq!(
                app.computed_style(&l.favorite_button, 0, "color").await.unwrap().as_deref(),
                Some(UNFAVORITED_COLOR)
            );
        }

        #[tokio::test]
        async fn test_sticky_alerts_fault() {
            let app = FakeMonsterApp::new(FakeAppOptions::default().with_faults(FakeFaults {
                sticky_alerts: true,
                ..FakeFaults::default()
            }));
            let l = MonsterLocators::default();
            app.navigate(URL).await.unwrap();
            let hp = l.numeric_input(NumericField::Hp);
            app.type_text(hp, 0, "abc").await.unwrap();
            app.clear(hp, 0).await.unwrap();
            assert_eq!(
                app.text(&l.alert_message, 0).await.unwrap().as_deref(),
                Some(NUMERIC_FIELD_MESSAGE)
            );
        }

        #[tokio::test]
        async fn test_delete_removes_card() {
            let (app, l) = visited().await;
            fill(&app, &l, "A", ["1", "1", "1", "1"]).await;
            app.click(&l.create_button, 0).await.unwrap();
            app.click(&l.delete_button, 0).await.unwrap();
            assert_eq!(app.count(&l.monster_card).await.unwrap(), 0);
            assert!(app.click(&l.delete_button, 0).await.is_err());
        }
    }
}
