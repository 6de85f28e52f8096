//! Sanity subsystem
//!
//! Sanity is a bounded resource in `[0, 100]`. Losses and gains are clamped
//! arithmetic; every non-zero change produces a notification, and crossing
//! into a different [`SanityThreshold`] band produces a second, distinct one.

use log::debug;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::game::state::GameState;
use crate::game::types::{Room, MAX_SANITY};

/// Severe narrative effects trigger strictly below this value.
pub const SEVERE_EFFECTS_BELOW: u32 = 25;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SanityThreshold {
    Normal,
    Disturbed,
    Unreliable,
    Garbled,
}

impl SanityThreshold {
    pub fn classify(sanity: u32) -> Self {
        match sanity {
            75..=u32::MAX => SanityThreshold::Normal,
            50..=74 => SanityThreshold::Disturbed,
            25..=49 => SanityThreshold::Unreliable,
            _ => SanityThreshold::Garbled,
        }
    }

    /// Inclusive `(low, high)` bounds of the band.
    pub fn bounds(&self) -> (u32, u32) {
        match self {
            SanityThreshold::Normal => (75, 100),
            SanityThreshold::Disturbed => (50, 74),
            SanityThreshold::Unreliable => (25, 49),
            SanityThreshold::Garbled => (0, 24),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            SanityThreshold::Normal => "normal",
            SanityThreshold::Disturbed => "disturbed",
            SanityThreshold::Unreliable => "unreliable",
            SanityThreshold::Garbled => "garbled",
        }
    }

    fn entered_message(&self) -> &'static str {
        match self {
            SanityThreshold::Normal => "Your thoughts settle. The world feels solid again.",
            SanityThreshold::Disturbed => {
                "Something is wrong at the edges of your vision. You are disturbed."
            }
            SanityThreshold::Unreliable => {
                "You can no longer trust what you see. Your senses are unreliable."
            }
            SanityThreshold::Garbled => "The walls breathe. Your thoughts come apart like wet paper.",
        }
    }
}

impl fmt::Display for SanityThreshold {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// What a sanity adjustment actually did.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SanityChange {
    /// Applied signed delta after clamping.
    pub delta: i32,
    pub notifications: Vec<String>,
}

impl SanityChange {
    fn merge(&mut self, other: SanityChange) {
        self.delta += other.delta;
        self.notifications.extend(other.notifications);
    }
}

fn band_notice(before: u32, after: u32, change: &mut SanityChange) {
    let (from, to) = (SanityThreshold::classify(before), SanityThreshold::classify(after));
    if from != to {
        debug!("sanity band {} -> {}", from, to);
        change.notifications.push(to.entered_message().to_string());
    }
}

pub fn apply_loss(state: &mut GameState, amount: u32, reason: &str) -> SanityChange {
    let before = state.sanity;
    state.sanity = before.saturating_sub(amount);
    let lost = before - state.sanity;
    let mut change = SanityChange::default();
    if lost > 0 {
        change.delta = -(lost as i32);
        change
            .notifications
            .push(format!("Your grip on reality slips ({}). Sanity -{}.", reason, lost));
        band_notice(before, state.sanity, &mut change);
    }
    change
}

pub fn apply_gain(state: &mut GameState, amount: u32) -> SanityChange {
    let before = state.sanity;
    state.sanity = before.saturating_add(amount).min(MAX_SANITY);
    let gained = state.sanity - before;
    let mut change = SanityChange::default();
    if gained > 0 {
        change.delta = gained as i32;
        change
            .notifications
            .push(format!("A measure of calm returns. Sanity +{}.", gained));
        band_notice(before, state.sanity, &mut change);
    }
    change
}

/// Apply a signed effect through [`apply_loss`] or [`apply_gain`].
pub fn apply_effect(state: &mut GameState, effect: i32, reason: &str) -> SanityChange {
    match effect {
        e if e < 0 => apply_loss(state, e.unsigned_abs(), reason),
        e if e > 0 => apply_gain(state, e.unsigned_abs()),
        _ => SanityChange::default(),
    }
}

pub fn classify(sanity: u32) -> SanityThreshold {
    SanityThreshold::classify(sanity)
}

/// Effects of walking into `room`.
pub fn process_room_entry(state: &mut GameState, room: &Room) -> SanityChange {
    let mut change = apply_effect(state, room.sanity_effect, &room.name.to_lowercase());
    if room.is_safe_room {
        change.merge(SanityChange {
            delta: 0,
            notifications: vec!["You feel safer here.".to_string()],
        });
    }
    change
}

pub fn should_trigger_severe_effects(sanity: u32) -> bool {
    sanity < SEVERE_EFFECTS_BELOW
}

const HALLUCINATIONS: &[&str] = &[
    "A figure stands at the edge of your lamplight. When you look, it is gone.",
    "Someone whispers your name from inside the walls.",
    "Your hands are wet. You do not remember why.",
    "The shadows lean toward you, then pretend they did not.",
    "You hear footsteps matching yours, half a beat behind.",
];

/// Deterministic hallucination for the given turn.
pub fn hallucination(turn: u32) -> &'static str {
    HALLUCINATIONS[turn as usize % HALLUCINATIONS.len()]
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    fn room(effect: i32, safe: bool) -> Room {
        Room {
            id: "chapel".into(),
            name: "Chapel".into(),
            description: "Pews.".into(),
            description_themed: "Pews.".into(),
            exits: BTreeMap::new(),
            doors: BTreeMap::new(),
            items: Vec::new(),
            sanity_effect: effect,
            is_safe_room: safe,
            is_cursed_room: false,
            is_dark: false,
            liquid_source: None,
            is_start: false,
        }
    }

    #[test]
    fn test_classify_band_edges() {
        assert_eq!(classify(100), SanityThreshold::Normal);
        assert_eq!(classify(75), SanityThreshold::Normal);
        assert_eq!(classify(74), SanityThreshold::Disturbed);
        assert_eq!(classify(50), SanityThreshold::Disturbed);
        assert_eq!(classify(49), SanityThreshold::Unreliable);
        assert_eq!(classify(25), SanityThreshold::Unreliable);
        assert_eq!(classify(24), SanityThreshold::Garbled);
        assert_eq!(classify(0), SanityThreshold::Garbled);
    }

    #[test]
    fn test_loss_and_gain_clamp() {
        let mut state = GameState::new("chapel");
        let change = apply_gain(&mut state, 10);
        assert_eq!(change.delta, 0);
        assert!(change.notifications.is_empty());

        let change = apply_loss(&mut state, 250, "void");
        assert_eq!(state.sanity, 0);
        assert_eq!(change.delta, -100);
        assert_eq!(change.notifications.len(), 2);
    }

    #[test]
    fn test_band_crossing_adds_notification() {
        let mut state = GameState::new("chapel");
        let change = apply_loss(&mut state, 10, "dread");
        assert_eq!(state.sanity, 90);
        assert_eq!(change.notifications.len(), 1);

        let change = apply_loss(&mut state, 20, "dread");
        assert_eq!(state.sanity, 70);
        assert_eq!(change.notifications.len(), 2);
        assert!(change.notifications[1].contains("disturbed"));
    }

    #[test]
    fn test_room_entry_effects() {
        let mut state = GameState::new("chapel");
        state.sanity = 60;
        let change = process_room_entry(&mut state, &room(5, true));
        assert_eq!(state.sanity, 65);
        assert_eq!(change.delta, 5);
        assert!(change.notifications.iter().any(|n| n == "You feel safer here."));

        let change = process_room_entry(&mut state, &room(0, true));
        assert_eq!(change.delta, 0);
        assert_eq!(change.notifications, vec!["You feel safer here.".to_string()]);

        let change = process_room_entry(&mut state, &room(-3, false));
        assert_eq!(state.sanity, 62);
        assert_eq!(change.delta, -3);
    }

    #[test]
    fn test_severe_effects_strictly_below_25() {
        assert!(!should_trigger_severe_effects(25));
        assert!(should_trigger_severe_effects(24));
        assert!(should_trigger_severe_effects(0));
        assert_eq!(hallucination(0), hallucination(5));
    }
}
