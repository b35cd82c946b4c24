//! Scripted in-memory page for exercising the engine without a browser
//!
//! A [`MockPage`] holds one [`PageScript`] per URL. Navigating to a URL
//! makes its script current; element operations consult the current script
//! (or the active frame's script) and every successful interaction is
//! recorded for later assertions.

use async_trait::async_trait;
use courtside_core::{
    Button, CourtsideError, FormVariant, FrameRef, Locator, PageAutomation, Result,
};
use std::collections::{HashMap, HashSet};
use std::sync::{Mutex, MutexGuard};

use crate::selectors::{self, field};

/// PNG signature, enough for screenshot files to look like PNGs
const PNG_SIGNATURE: [u8; 8] = [0x89, b'P', b'N', b'G', 0x0d, 0x0a, 0x1a, 0x0a];

/// A recorded page interaction
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Interaction {
    Navigate(String),
    Click(Locator),
    Type(Locator, String),
    SwitchToFrame(FrameRef),
    SwitchToMain,
    Screenshot,
}

/// Elements, links and frames present on one page
#[derive(Debug, Clone, Default)]
pub struct PageScript {
    elements: HashSet<Locator>,
    links: HashMap<Locator, Vec<String>>,
    texts: HashMap<Locator, Vec<String>>,
    frames: HashMap<FrameRef, PageScript>,
}

impl PageScript {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_element(mut self, locator: Locator) -> Self {
        self.elements.insert(locator);
        self
    }

    pub fn without_element(mut self, locator: &Locator) -> Self {
        self.elements.remove(locator);
        for frame in self.frames.values_mut() {
            frame.elements.remove(locator);
        }
        self
    }

    pub fn with_links(mut self, locator: Locator, links: &[&str]) -> Self {
        self.links
            .insert(locator, links.iter().map(|l| l.to_string()).collect());
        self
    }

    pub fn with_texts(mut self, locator: Locator, texts: &[&str]) -> Self {
        self.texts
            .insert(locator, texts.iter().map(|t| t.to_string()).collect());
        self
    }

    pub fn with_frame(mut self, frame: FrameRef, script: PageScript) -> Self {
        self.frames.insert(frame, script);
        self
    }

    /// Add a results table: one `(row label, available slot links)` per row
    pub fn with_results_table(mut self, date: &str, rows: &[(&str, &[&str])]) -> Self {
        self = self.with_element(selectors::date_table(date));
        if !rows.is_empty() {
            self = self.with_element(selectors::time_rows(date));
        }
        let labels: Vec<&str> = rows.iter().map(|(label, _)| *label).collect();
        self = self.with_texts(selectors::time_row_labels(date), &labels);
        for (index, (_, links)) in rows.iter().enumerate() {
            self = self.with_links(selectors::available_slot_links(date, index), links);
        }
        self
    }

    /// A slot's booking page with player details and a payment frame
    pub fn booking_page(variant: FormVariant, payment_frame: FrameRef) -> Self {
        let mut page = Self::new()
            .with_element(selectors::button(Button::ConfirmPlayerDetails))
            .with_element(selectors::button(Button::ContinueToPayment))
            .with_element(selectors::input(field::NUM_PLAYERS));

        let identification: &[&str] = match variant {
            FormVariant::CentralPark => &[field::PERMIT_NUMBER, field::CENTRAL_PARK_NAME],
            FormVariant::General => &[field::EXISTING_PERMIT, field::NAME],
        };
        for id in identification
            .iter()
            .chain(&[field::EMAIL, field::ADDRESS, field::CITY, field::ZIP, field::PHONE])
        {
            page = page.with_element(selectors::input(id));
        }

        let mut payment = Self::new().with_element(selectors::button(Button::PayNow));
        for id in [field::CC_NUMBER, field::EXP_MONTH, field::EXP_YEAR, field::CVV] {
            payment = payment.with_element(selectors::input(id));
        }

        page.with_frame(payment_frame, payment)
    }

    /// A rebooking page, which only offers "Make Reservation"
    pub fn rebook_page() -> Self {
        Self::new().with_element(selectors::button(Button::MakeReservation))
    }

    fn has(&self, locator: &Locator) -> bool {
        self.elements.contains(locator)
            || self.links.get(locator).is_some_and(|l| !l.is_empty())
            || self.texts.get(locator).is_some_and(|t| !t.is_empty())
    }
}

#[derive(Debug, Default)]
struct MockState {
    current_url: Option<String>,
    frame: Option<FrameRef>,
    interactions: Vec<Interaction>,
}

/// In-memory [`PageAutomation`] driven by per-URL scripts
#[derive(Debug, Default)]
pub struct MockPage {
    pages: HashMap<String, PageScript>,
    unreachable: HashSet<String>,
    flaky: HashMap<String, usize>,
    state: Mutex<MockState>,
}

impl MockPage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_page(mut self, url: &str, script: PageScript) -> Self {
        self.pages.insert(url.to_string(), script);
        self
    }

    /// Navigating to `url` fails
    pub fn with_unreachable(mut self, url: &str) -> Self {
        self.unreachable.insert(url.to_string());
        self
    }

    /// The first `failures` navigations to `url` fail, later ones succeed
    pub fn with_flaky(mut self, url: &str, failures: usize) -> Self {
        self.flaky.insert(url.to_string(), failures);
        self
    }

    fn state(&self) -> MutexGuard<'_, MockState> {
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    pub fn interactions(&self) -> Vec<Interaction> {
        self.state().interactions.clone()
    }

    pub fn navigations(&self) -> Vec<String> {
        self.interactions()
            .into_iter()
            .filter_map(|i| match i {
                Interaction::Navigate(url) => Some(url),
                _ => None,
            })
            .collect()
    }

    pub fn clicks(&self) -> Vec<Locator> {
        self.interactions()
            .into_iter()
            .filter_map(|i| match i {
                Interaction::Click(locator) => Some(locator),
                _ => None,
            })
            .collect()
    }

    /// Locators that received text, in order
    pub fn typed(&self) -> Vec<Locator> {
        self.interactions()
            .into_iter()
            .filter_map(|i| match i {
                Interaction::Type(locator, _) => Some(locator),
                _ => None,
            })
            .collect()
    }

    /// Whether any player or payment field was typed into or toggled
    pub fn touched_personal_fields(&self) -> bool {
        let personal: Vec<Locator> = field::PERSONAL
            .iter()
            .map(|id| selectors::input(id))
            .collect();
        self.typed()
            .iter()
            .chain(self.clicks().iter())
            .any(|locator| personal.contains(locator))
    }

    /// Run `f` against the script in scope (current page, or its active frame)
    fn in_scope<T>(&self, f: impl FnOnce(&PageScript) -> Result<T>) -> Result<T> {
        let state = self.state();
        let url = state
            .current_url
            .as_ref()
            .ok_or_else(|| CourtsideError::Browser("No page loaded".to_string()))?;
        let page = self
            .pages
            .get(url)
            .ok_or_else(|| CourtsideError::Browser(format!("No script for {}", url)))?;
        let script = match &state.frame {
            None => page,
            Some(frame) => page
                .frames
                .get(frame)
                .ok_or_else(|| CourtsideError::FrameNotFound(frame.to_string()))?,
        };
        f(script)
    }

    fn record(&self, interaction: Interaction) {
        self.state().interactions.push(interaction);
    }

    fn require(&self, locator: &Locator) -> Result<()> {
        self.in_scope(|script| {
            if script.has(locator) {
                Ok(())
            } else {
                Err(CourtsideError::ElementNotFound {
                    selector: locator.to_string(),
                })
            }
        })
    }
}

#[async_trait]
impl PageAutomation for MockPage {
    async fn navigate(&self, url: &str) -> Result<()> {
        self.record(Interaction::Navigate(url.to_string()));
        let tries = self.navigations().iter().filter(|u| *u == url).count();
        let flaking = self.flaky.get(url).is_some_and(|failures| tries <= *failures);
        if flaking || self.unreachable.contains(url) || !self.pages.contains_key(url) {
            return Err(CourtsideError::Navigation {
                url: url.to_string(),
                reason: "unreachable".to_string(),
            });
        }
        let mut state = self.state();
        state.current_url = Some(url.to_string());
        state.frame = None;
        Ok(())
    }

    async fn current_url(&self) -> Result<String> {
        self.state()
            .current_url
            .clone()
            .ok_or_else(|| CourtsideError::Browser("No page loaded".to_string()))
    }

    async fn exists(&self, locator: &Locator) -> Result<bool> {
        self.in_scope(|script| Ok(script.has(locator)))
    }

    async fn link_targets(&self, locator: &Locator) -> Result<Vec<String>> {
        self.in_scope(|script| Ok(script.links.get(locator).cloned().unwrap_or_default()))
    }

    async fn text_contents(&self, locator: &Locator) -> Result<Vec<String>> {
        self.in_scope(|script| Ok(script.texts.get(locator).cloned().unwrap_or_default()))
    }

    async fn click(&self, locator: &Locator) -> Result<()> {
        self.require(locator)?;
        self.record(Interaction::Click(locator.clone()));
        Ok(())
    }

    async fn type_text(&self, locator: &Locator, text: &str) -> Result<()> {
        self.require(locator)?;
        self.record(Interaction::Type(locator.clone(), text.to_string()));
        Ok(())
    }

    async fn switch_to_frame(&self, frame: &FrameRef) -> Result<()> {
        let found = self.in_scope(|script| Ok(script.frames.contains_key(frame)))?;
        if !found {
            return Err(CourtsideError::FrameNotFound(frame.to_string()));
        }
        self.state().frame = Some(frame.clone());
        self.record(Interaction::SwitchToFrame(frame.clone()));
        Ok(())
    }

    async fn switch_to_main(&self) -> Result<()> {
        self.state().frame = None;
        self.record(Interaction::SwitchToMain);
        Ok(())
    }

    async fn screenshot(&self) -> Result<Vec<u8>> {
        let url = self.state().current_url.clone().unwrap_or_default();
        self.record(Interaction::Screenshot);
        let mut png = PNG_SIGNATURE.to_vec();
        png.extend_from_slice(url.as_bytes());
        Ok(png)
    }
}
