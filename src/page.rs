//! Page State
//!
//! The small pieces of state behind the page chrome: theme, navigation,
//! scroll indicators, section completion, copy buttons and collapsibles.
//!
//! Nothing here touches a document. Each type holds the state and exposes the
//! transitions; the host wires them to its events and applies the results.
//! Persistence goes through [`KeyValueStore`] under two keys:
//!
//! - `theme`: `"dark"` or `"light"`
//! - `completedSections`: JSON array of section ids

use crate::error::{LabError, Result};
use crate::store::KeyValueStore;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

/// Storage key for the theme
pub const THEME_KEY: &str = "theme";
/// Storage key for completed sections
pub const SECTIONS_KEY: &str = "completedSections";
/// Scroll offset past which the back-to-top button shows
pub const BACK_TO_TOP_THRESHOLD: f64 = 500.0;
/// Visible fraction of a section that counts as reading it
pub const SECTION_COMPLETE_RATIO: f64 = 0.8;
/// How long the "Copied!" label stays before the host resets it
pub const COPIED_LABEL_MS: u64 = 2000;

// ============================================================================
// THEME
// ============================================================================

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    #[default]
    Dark,
    Light,
}

impl Theme {
    pub fn as_str(self) -> &'static str {
        match self {
            Theme::Dark => "dark",
            Theme::Light => "light",
        }
    }

    pub fn toggled(self) -> Self {
        match self {
            Theme::Dark => Theme::Light,
            Theme::Light => Theme::Dark,
        }
    }
}

impl fmt::Display for Theme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Theme {
    type Err = ();

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "dark" => Ok(Theme::Dark),
            "light" => Ok(Theme::Light),
            _ => Err(()),
        }
    }
}

/// Current theme and whether the user chose it explicitly
#[derive(Clone, Debug)]
pub struct ThemeManager {
    theme: Theme,
    explicit: bool,
}

impl ThemeManager {
    /// Restore the saved theme, defaulting to dark
    pub fn init(store: &dyn KeyValueStore) -> Self {
        match store.get(THEME_KEY).and_then(|s| s.parse().ok()) {
            Some(theme) => Self {
                theme,
                explicit: true,
            },
            None => Self {
                theme: Theme::default(),
                explicit: false,
            },
        }
    }

    pub fn theme(&self) -> Theme {
        self.theme
    }

    /// Persist a theme, then switch to it
    pub fn set_theme(&mut self, theme: Theme, store: &mut dyn KeyValueStore) -> Result<()> {
        store.set(THEME_KEY, theme.as_str())?;
        self.theme = theme;
        self.explicit = true;
        Ok(())
    }

    /// Flip between dark and light
    pub fn toggle(&mut self, store: &mut dyn KeyValueStore) -> Result<Theme> {
        let next = self.theme.toggled();
        self.set_theme(next, store)?;
        Ok(next)
    }

    /// The OS colour scheme changed; followed only until the user picks one
    pub fn system_preference_changed(&mut self, prefers_dark: bool) {
        if !self.explicit {
            self.theme = if prefers_dark { Theme::Dark } else { Theme::Light };
        }
    }
}

// ============================================================================
// SECTION TRACKING
// ============================================================================

/// Sections the reader has scrolled through
#[derive(Clone, Debug, Default)]
pub struct SectionTracker {
    completed: BTreeSet<String>,
}

impl SectionTracker {
    /// Load saved progress
    ///
    /// # Errors
    ///
    /// Returns [`LabError::Json`] if the stored value is not a JSON array of
    /// strings.
    pub fn load(store: &dyn KeyValueStore) -> Result<Self> {
        let completed = match store.get(SECTIONS_KEY) {
            Some(json) => serde_json::from_str::<Vec<String>>(&json)?
                .into_iter()
                .collect(),
            None => BTreeSet::new(),
        };
        Ok(Self { completed })
    }

    /// Mark a section complete and persist
    ///
    /// # Returns
    ///
    /// `true` if the section was not already complete. Empty ids are ignored.
    ///
    /// # Errors
    ///
    /// A failed store write is returned and the section stays incomplete, so a
    /// later call retries the write.
    pub fn mark_complete(
        &mut self,
        section_id: &str,
        store: &mut dyn KeyValueStore,
    ) -> Result<bool> {
        if section_id.is_empty() || !self.completed.insert(section_id.to_string()) {
            return Ok(false);
        }
        if let Err(err) = self.save(store) {
            self.completed.remove(section_id);
            return Err(err);
        }
        tracing::debug!(section = section_id, "section completed");
        Ok(true)
    }

    /// A section's visibility changed
    pub fn observe(
        &mut self,
        section_id: &str,
        intersection_ratio: f64,
        store: &mut dyn KeyValueStore,
    ) -> Result<bool> {
        if intersection_ratio > SECTION_COMPLETE_RATIO {
            self.mark_complete(section_id, store)
        } else {
            Ok(false)
        }
    }

    pub fn is_complete(&self, section_id: &str) -> bool {
        self.completed.contains(section_id)
    }

    /// Whether a table-of-contents link (`#section`) points at a completed section
    pub fn is_link_completed(&self, href: &str) -> bool {
        let id = href.trim_start_matches('#');
        !id.is_empty() && self.is_complete(id)
    }

    pub fn completed(&self) -> impl Iterator<Item = &str> {
        self.completed.iter().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.completed.len()
    }

    pub fn is_empty(&self) -> bool {
        self.completed.is_empty()
    }

    fn save(&self, store: &mut dyn KeyValueStore) -> Result<()> {
        let ids: Vec<&str> = self.completed().collect();
        store.set(SECTIONS_KEY, &serde_json::to_string(&ids)?)
    }
}

// ============================================================================
// SCROLL
// ============================================================================

/// Reading progress in percent, capped at 100
///
/// Returns 0 when the document is no taller than the viewport.
pub fn scroll_progress(scroll_top: f64, scroll_height: f64, viewport_height: f64) -> f64 {
    let scrollable = scroll_height - viewport_height;
    if scrollable <= 0.0 {
        return 0.0;
    }
    (scroll_top / scrollable * 100.0).clamp(0.0, 100.0)
}

pub fn back_to_top_visible(scroll_top: f64) -> bool {
    scroll_top > BACK_TO_TOP_THRESHOLD
}

// ============================================================================
// NAVIGATION
// ============================================================================

/// Navigation links and which section is current
#[derive(Clone, Debug, Default)]
pub struct ActiveNav {
    hrefs: Vec<String>,
    active_section: Option<String>,
}

impl ActiveNav {
    pub fn new<I, S>(hrefs: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            hrefs: hrefs.into_iter().map(Into::into).collect(),
            active_section: None,
        }
    }

    /// A section entered the viewport band
    pub fn section_intersecting(&mut self, section_id: &str) {
        self.active_section = Some(section_id.to_string());
    }

    pub fn active_section(&self) -> Option<&str> {
        self.active_section.as_deref()
    }

    pub fn is_active(&self, href: &str) -> bool {
        match &self.active_section {
            Some(id) => href.strip_prefix('#') == Some(id.as_str()),
            None => false,
        }
    }

    /// Active flag for every link, in order
    pub fn link_states(&self) -> Vec<(&str, bool)> {
        self.hrefs
            .iter()
            .map(|h| (h.as_str(), self.is_active(h)))
            .collect()
    }
}

/// Slide-out menu on small screens
#[derive(Clone, Debug, Default)]
pub struct MobileNav {
    open: bool,
}

impl MobileNav {
    pub fn is_open(&self) -> bool {
        self.open
    }

    pub fn toggle(&mut self) {
        self.open = !self.open;
    }

    /// Overlay click, link click
    pub fn close(&mut self) {
        self.open = false;
    }

    /// Escape closes an open menu
    ///
    /// # Returns
    ///
    /// `true` if the key was handled.
    pub fn key_pressed(&mut self, key: &str) -> bool {
        if key == "Escape" && self.open {
            self.close();
            true
        } else {
            false
        }
    }

    /// Body scrolling is locked while the menu is open
    pub fn body_scroll_locked(&self) -> bool {
        self.open
    }
}

// ============================================================================
// COPY BUTTONS
// ============================================================================

/// System clipboard
pub trait Clipboard {
    fn write_text(&mut self, text: &str) -> Result<()>;
}

/// State of one code block's copy button
#[derive(Clone, Debug, Default)]
pub struct CopyButton {
    copied: bool,
}

impl CopyButton {
    /// Copy the block's text
    ///
    /// A missing or empty block does nothing. A failed write is logged and
    /// leaves the button as it was.
    ///
    /// # Returns
    ///
    /// `true` if the text reached the clipboard.
    pub fn copy(&mut self, code: Option<&str>, clipboard: &mut dyn Clipboard) -> bool {
        let Some(code) = code.filter(|c| !c.is_empty()) else {
            return false;
        };

        match clipboard.write_text(code) {
            Ok(()) => {
                self.copied = true;
                true
            }
            Err(err) => {
                tracing::warn!(error = %err, "failed to copy");
                false
            }
        }
    }

    pub fn is_copied(&self) -> bool {
        self.copied
    }

    pub fn label(&self) -> &'static str {
        if self.copied {
            "Copied!"
        } else {
            "Copy"
        }
    }

    /// Called by the host [`COPIED_LABEL_MS`] after a successful copy
    pub fn reset_label(&mut self) {
        self.copied = false;
    }
}

/// In-memory clipboard
#[derive(Clone, Debug, Default)]
pub struct MemoryClipboard {
    pub contents: Option<String>,
    /// When set, every write fails with this message
    pub fail_with: Option<String>,
}

impl Clipboard for MemoryClipboard {
    fn write_text(&mut self, text: &str) -> Result<()> {
        if let Some(message) = &self.fail_with {
            return Err(LabError::Clipboard(message.clone()));
        }
        self.contents = Some(text.to_string());
        Ok(())
    }
}

// ============================================================================
// COLLAPSIBLES
// ============================================================================

/// Expandable section header
#[derive(Clone, Debug, Default)]
pub struct Collapsible {
    open: bool,
}

impl Collapsible {
    pub fn is_open(&self) -> bool {
        self.open
    }

    pub fn click(&mut self) {
        self.open = !self.open;
    }

    /// Enter and Space act like a click
    pub fn key_pressed(&mut self, key: &str) -> bool {
        if key == "Enter" || key == " " {
            self.click();
            true
        } else {
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;

    #[test]
    fn test_theme_defaults_to_dark_and_persists_toggle() {
        let mut store = MemoryStore::new();
        let mut themes = ThemeManager::init(&store);
        assert_eq!(themes.theme(), Theme::Dark);
        assert_eq!(store.get(THEME_KEY), None);

        assert_eq!(themes.toggle(&mut store).unwrap(), Theme::Light);
        assert_eq!(store.get(THEME_KEY).as_deref(), Some("light"));

        let restored = ThemeManager::init(&store);
        assert_eq!(restored.theme(), Theme::Light);
    }

    #[test]
    fn test_system_preference_only_until_explicit_choice() {
        let mut store = MemoryStore::new();
        let mut themes = ThemeManager::init(&store);
        themes.system_preference_changed(false);
        assert_eq!(themes.theme(), Theme::Light);

        themes.set_theme(Theme::Dark, &mut store).unwrap();
        themes.system_preference_changed(false);
        assert_eq!(themes.theme(), Theme::Dark);
    }

    #[test]
    fn test_section_tracker_round_trip() {
        let mut store = MemoryStore::new();
        let mut tracker = SectionTracker::load(&store).unwrap();
        assert!(tracker.is_empty());

        assert!(tracker.mark_complete("forward-pass", &mut store).unwrap());
        assert!(!tracker.mark_complete("forward-pass", &mut store).unwrap());
        assert!(!tracker.mark_complete("", &mut store).unwrap());
        assert!(!tracker.observe("backward-pass", 0.5, &mut store).unwrap());
        assert!(tracker.observe("backward-pass", 0.9, &mut store).unwrap());

        let restored = SectionTracker::load(&store).unwrap();
        assert_eq!(
            restored.completed().collect::<Vec<_>>(),
            vec!["backward-pass", "forward-pass"]
        );
        assert!(restored.is_link_completed("#forward-pass"));
        assert!(!restored.is_link_completed("#gradient-checking"));
        assert!(!restored.is_link_completed("#"));
    }

    /// Store whose writes fail while `offline` is set
    #[derive(Default)]
    struct FlakyStore {
        inner: MemoryStore,
        offline: bool,
    }

    impl KeyValueStore for FlakyStore {
        fn get(&self, key: &str) -> Option<String> {
            self.inner.get(key)
        }

        fn set(&mut self, key: &str, value: &str) -> Result<()> {
            if self.offline {
                return Err(LabError::Io(std::io::Error::other("quota exceeded")));
            }
            self.inner.set(key, value)
        }

        fn remove(&mut self, key: &str) -> Result<()> {
            self.inner.remove(key)
        }
    }

    #[test]
    fn test_failed_save_leaves_section_incomplete() {
        let mut store = FlakyStore {
            offline: true,
            ..FlakyStore::default()
        };
        let mut tracker = SectionTracker::load(&store).unwrap();

        assert!(tracker.mark_complete("intro", &mut store).is_err());
        assert!(!tracker.is_complete("intro"));

        let mut themes = ThemeManager::init(&store);
        assert!(themes.toggle(&mut store).is_err());
        assert_eq!(themes.theme(), Theme::Dark);

        store.offline = false;
        assert!(tracker.mark_complete("intro", &mut store).unwrap());
        assert_eq!(store.get(SECTIONS_KEY).as_deref(), Some("[\"intro\"]"));
    }

    #[test]
    fn test_section_tracker_rejects_bad_json() {
        let mut store = MemoryStore::new();
        store.set(SECTIONS_KEY, "{oops").unwrap();
        assert!(matches!(SectionTracker::load(&store), Err(LabError::Json(_))));
    }

    #[test]
    fn test_scroll_progress() {
        assert_eq!(scroll_progress(0.0, 3000.0, 1000.0), 0.0);
        assert_eq!(scroll_progress(1000.0, 3000.0, 1000.0), 50.0);
        assert_eq!(scroll_progress(2500.0, 3000.0, 1000.0), 100.0);
        assert_eq!(scroll_progress(10.0, 800.0, 1000.0), 0.0);

        assert!(!back_to_top_visible(500.0));
        assert!(back_to_top_visible(501.0));
    }

    #[test]
    fn test_active_nav() {
        let mut nav = ActiveNav::new(["#intro", "#backprop", "#quiz"]);
        assert!(nav.link_states().iter().all(|(_, active)| !active));

        nav.section_intersecting("backprop");
        assert_eq!(
            nav.link_states(),
            vec![("#intro", false), ("#backprop", true), ("#quiz", false)]
        );
    }

    #[test]
    fn test_mobile_nav() {
        let mut nav = MobileNav::default();
        assert!(!nav.key_pressed("Escape"));

        nav.toggle();
        assert!(nav.is_open());
        assert!(nav.body_scroll_locked());
        assert!(!nav.key_pressed("Enter"));
        assert!(nav.key_pressed("Escape"));
        assert!(!nav.is_open());
    }

    #[test]
    fn test_copy_success_and_failure() {
        let mut clipboard = MemoryClipboard::default();
        let mut button = CopyButton::default();

        assert!(!button.copy(None, &mut clipboard));
        assert!(!button.copy(Some(""), &mut clipboard));
        assert_eq!(button.label(), "Copy");

        assert!(button.copy(Some("let x = 1;"), &mut clipboard));
        assert_eq!(clipboard.contents.as_deref(), Some("let x = 1;"));
        assert_eq!(button.label(), "Copied!");
        button.reset_label();

        clipboard.fail_with = Some("permission denied".to_string());
        assert!(!button.copy(Some("let y = 2;"), &mut clipboard));
        assert!(!button.is_copied());
        assert_eq!(clipboard.contents.as_deref(), Some("let x = 1;"));
    }

    #[test]
    fn test_collapsible_keyboard() {
        let mut section = Collapsible::default();
        assert!(section.key_pressed("Enter"));
        assert!(section.is_open());
        assert!(section.key_pressed(" "));
        assert!(!section.is_open());
        assert!(!section.key_pressed("a"));
    }
}
