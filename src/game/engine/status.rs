//! Read-only introspection verbs and end-of-turn processing.

use log::debug;

use crate::game::errors::GameError;
use crate::game::sanity::{self, SanityThreshold};
use crate::game::state::GameState;
use crate::game::types::{Capability, MAX_SANITY, MAX_SCORE};
use crate::game::world::World;

use super::{display_name, ActionResult, Step};

/// Turns a curse lasts once it takes hold.
pub const CURSE_TURNS: u32 = 10;

/// Battery level below which the lamp warns it is dimming.
pub const LOW_BATTERY_WARNING: u32 = 20;

const RANKS: &[(u32, &str)] = &[
    (350, "Master of the Dark"),
    (300, "Keeper of Secrets"),
    (200, "Occultist"),
    (100, "Seeker"),
    (50, "Wanderer"),
    (0, "Lost Soul"),
];

pub fn rank_for(score: u32) -> &'static str {
    RANKS
        .iter()
        .find(|(threshold, _)| score >= *threshold)
        .map(|(_, rank)| *rank)
        .unwrap_or("Lost Soul")
}

fn yes_no(flag: bool) -> &'static str {
    if flag {
        "yes"
    } else {
        "no"
    }
}

pub(super) fn score(_world: &World, state: &GameState) -> Step<ActionResult> {
    let lines = [
        format!(
            "Your score is {} of a possible {}, earning you the rank of {}.",
            state.score,
            MAX_SCORE,
            rank_for(state.score)
        ),
        format!("Sanity: {}/{}", state.sanity, MAX_SANITY),
        format!("Souls collected: {}", state.souls_collected),
        format!("Moves: {}", state.moves),
        format!("Cursed: {}", yes_no(state.cursed)),
        format!("Blood moon: {}", yes_no(state.blood_moon_active)),
    ];
    Ok(ActionResult::success(lines.join("\n")))
}

pub(super) fn diagnose(world: &World, state: &GameState) -> Step<ActionResult> {
    let band = SanityThreshold::classify(state.sanity);
    let mut lines = vec![format!(
        "Sanity {}/{} ({}).",
        state.sanity, MAX_SANITY, band
    )];
    lines.push(
        match band {
            SanityThreshold::Normal => "You are steady, for now.",
            SanityThreshold::Disturbed => "Your hands will not stop shaking.",
            SanityThreshold::Unreliable => "You no longer trust your own eyes.",
            SanityThreshold::Garbled => "You are barely holding yourself together.",
        }
        .to_string(),
    );
    if state.cursed {
        lines.push(format!(
            "A curse clings to you for {} more turns.",
            state.curse_duration
        ));
    }
    if state
        .inventory
        .iter()
        .any(|id| world.get_object(id).is_ok_and(|o| o.has(Capability::Light)))
    {
        lines.push(format!("Lamp battery: {}.", state.lamp_battery));
    }
    if let Some(vehicle) = &state.current_vehicle {
        lines.push(format!("You are aboard the {}.", display_name(world, vehicle)?));
    }
    Ok(ActionResult::success(lines.join("\n")))
}

pub(super) fn help() -> Step<ActionResult> {
    Ok(ActionResult::success(
        "Try verbs like LOOK, EXAMINE, TAKE, DROP, OPEN, CLOSE, PUT x IN y, \
         LOCK/UNLOCK x WITH key, TIE x TO y, FILL, POUR, BOARD, INFLATE, \
         ENTER, EXIT, ATTACK x WITH y, TURN ON lamp, INVENTORY, SCORE, DIAGNOSE, \
         WAIT and BACK. Move with NORTH, SOUTH, UP, IN and the like (or N, S, U).",
    ))
}

pub(super) fn wait() -> Step<ActionResult> {
    Ok(ActionResult::success("Time passes. Somewhere below, something moves."))
}

/// Drain the lit lamp, if one is carried.
fn drain_lamp(world: &World, state: &mut GameState, result: &mut ActionResult) -> Result<(), GameError> {
    let mut lamp = None;
    for id in &state.inventory {
        if world.get_object(id)?.has(Capability::Light) && state.world.state_of(world, id)?.is_on {
            lamp = Some(id.clone());
            break;
        }
    }
    let Some(lamp) = lamp else {
        return Ok(());
    };

    let drain = if state.cursed { 2 } else { 1 };
    let before = state.lamp_battery;
    state.lamp_battery = before.saturating_sub(drain);
    debug!("lamp {} battery {} -> {}", lamp, before, state.lamp_battery);

    let name = display_name(world, &lamp)?;
    if state.lamp_battery == 0 {
        state.world.state_of_mut(world, &lamp)?.is_on = false;
        result.notify(format!("Your {} flickers and dies.", name));
    } else if before >= LOW_BATTERY_WARNING && state.lamp_battery < LOW_BATTERY_WARNING {
        result.notify(format!("Your {} is growing dim.", name));
    }
    Ok(())
}

/// Bookkeeping after a successful, state-changing action.
pub(super) fn end_turn(world: &World, state: &mut GameState, result: &mut ActionResult) -> Result<(), GameError> {
    state.turn_count += 1;
    drain_lamp(world, state, result)?;

    if state.cursed {
        state.curse_duration = state.curse_duration.saturating_sub(1);
        if state.curse_duration == 0 {
            state.cursed = false;
            result.notify("The weight on your shoulders lifts. The curse is broken.");
        }
    }

    if sanity::should_trigger_severe_effects(state.sanity) {
        result.notify(sanity::hallucination(state.turn_count));
    }
    Ok(())
}
