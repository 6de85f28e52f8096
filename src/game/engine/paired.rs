//! Paired inverse operations: lock/unlock, tie/untie, fill/pour,
//! board/disembark, enter/exit and inflate/deflate.
//!
//! Each inverse restores exactly the fields its forward operation touched.

use crate::game::parser::{ParsedCommand, Verb};
use crate::game::resolver::{resolve_among, ResolveResult};
use crate::game::state::GameState;
use crate::game::types::{Capability, Direction};
use crate::game::world::World;

use super::interactions::follow_up;
use super::movement::{check_free_to_leave, go_direction, move_to};
use super::{display_name, held, present, refuse, ActionResult, Step};

// ============================================================================
// Lock / Unlock
// ============================================================================

/// Check that the player can work the lock on `id`: holds the key, and the
/// named instrument (if any) is that key.
fn check_key(world: &World, state: &GameState, command: &ParsedCommand, id: &str) -> Step<()> {
    let object = world.get_object(id)?;
    let Some(lock) = &object.capabilities.lockable else {
        return Ok(());
    };
    let Some(key) = lock.key_id.as_deref() else {
        return Ok(());
    };
    if let Some(instrument) = command.instrument.as_deref() {
        let used = held(world, state, Some(instrument), command.verb)?;
        if used != key {
            return refuse(format!(
                "The {} doesn't fit the {}.",
                display_name(world, &used)?,
                object.display_name()
            ));
        }
    }
    if !state.has_item(key) {
        return refuse("You don't have the right key.");
    }
    Ok(())
}

pub(super) fn lock(world: &World, command: &ParsedCommand, state: &mut GameState) -> Step<ActionResult> {
    let id = present(world, state, command.object.as_deref(), Verb::Lock)?;
    let object = world.get_object(&id)?;
    let name = object.display_name();
    if !object.has(Capability::Lockable) {
        return refuse(format!("You can't lock the {}.", name));
    }
    let current = state.world.state_of(world, &id)?;
    if current.is_locked {
        return refuse(format!("The {} is already locked.", name));
    }
    if current.is_open {
        return refuse(format!("You'll have to close the {} first.", name));
    }
    check_key(world, state, command, &id)?;

    state.world.state_of_mut(world, &id)?.is_locked = true;
    let mut result = ActionResult::success(format!("You lock the {}.", name));
    follow_up(world, state, object, Verb::Lock, &mut result)?;
    Ok(result)
}

pub(super) fn unlock(world: &World, command: &ParsedCommand, state: &mut GameState) -> Step<ActionResult> {
    let id = present(world, state, command.object.as_deref(), Verb::Unlock)?;
    let object = world.get_object(&id)?;
    let name = object.display_name();
    if !object.has(Capability::Lockable) {
        return refuse(format!("You can't unlock the {}.", name));
    }
    if !state.world.state_of(world, &id)?.is_locked {
        return refuse(format!("The {} isn't locked.", name));
    }
    check_key(world, state, command, &id)?;

    state.world.state_of_mut(world, &id)?.is_locked = false;
    let mut result = ActionResult::success(format!("You unlock the {}.", name));
    follow_up(world, state, object, Verb::Unlock, &mut result)?;
    Ok(result)
}

// ============================================================================
// Tie / Untie
// ============================================================================

pub(super) fn tie(world: &World, command: &ParsedCommand, state: &mut GameState) -> Step<ActionResult> {
    let rope_id = held(world, state, command.object.as_deref(), Verb::Tie)?;
    let rope = world.get_object(&rope_id)?;
    let Some(spec) = &rope.capabilities.rope else {
        return refuse(format!("You can't tie the {} to anything.", rope.display_name()));
    };
    if let Some(current) = state.world.state_of(world, &rope_id)?.tied_to.as_deref() {
        return refuse(format!(
            "The {} is already tied to the {}.",
            rope.display_name(),
            display_name(world, current)?
        ));
    }
    let Some(target_name) = command.target.as_deref() else {
        return refuse(format!("What do you want to tie the {} to?", rope.display_name()));
    };
    let target_id = present(world, state, Some(target_name), Verb::Tie)?;
    let target = display_name(world, &target_id)?;
    if !spec.targets.contains(&target_id) {
        return refuse(format!("You can't tie the {} to the {}.", rope.display_name(), target));
    }
    if state.world.state_of(world, &target_id)?.attached_rope.is_some() {
        return refuse(format!("Something is already tied to the {}.", target));
    }

    let rope_state = state.world.state_of_mut(world, &rope_id)?;
    rope_state.is_tied = true;
    rope_state.tied_to = Some(target_id.clone());
    state.world.state_of_mut(world, &target_id)?.attached_rope = Some(rope_id.clone());

    let mut result = ActionResult::success(format!(
        "You tie the {} securely to the {}.",
        rope.display_name(),
        target
    ));
    follow_up(world, state, rope, Verb::Tie, &mut result)?;
    Ok(result)
}

pub(super) fn untie(world: &World, command: &ParsedCommand, state: &mut GameState) -> Step<ActionResult> {
    let id = present(world, state, command.object.as_deref(), Verb::Untie)?;
    let object = world.get_object(&id)?;
    let current = state.world.state_of(world, &id)?;

    // Either the rope itself or the thing it is tied to may be named.
    let (rope_id, target_id) = if object.has(Capability::Rope) {
        match current.tied_to.clone() {
            Some(target) => (id.clone(), target),
            None => return refuse(format!("The {} isn't tied to anything.", object.display_name())),
        }
    } else {
        match current.attached_rope.clone() {
            Some(rope) => (rope, id.clone()),
            None => return refuse(format!("Nothing is tied to the {}.", object.display_name())),
        }
    };
    if !state.has_item(&rope_id) {
        return refuse(format!("You aren't holding the {}.", display_name(world, &rope_id)?));
    }

    let rope_state = state.world.state_of_mut(world, &rope_id)?;
    rope_state.is_tied = false;
    rope_state.tied_to = None;
    state.world.state_of_mut(world, &target_id)?.attached_rope = None;

    let mut result = ActionResult::success(format!(
        "You untie the {} from the {}.",
        display_name(world, &rope_id)?,
        display_name(world, &target_id)?
    ));
    follow_up(world, state, world.get_object(&rope_id)?, Verb::Untie, &mut result)?;
    Ok(result)
}

// ============================================================================
// Fill / Pour
// ============================================================================

pub(super) fn fill(world: &World, command: &ParsedCommand, state: &mut GameState) -> Step<ActionResult> {
    let id = held(world, state, command.object.as_deref(), Verb::Fill)?;
    let object = world.get_object(&id)?;
    let name = object.display_name();
    let Some(spec) = &object.capabilities.liquid else {
        return refuse(format!("The {} can't hold liquid.", name));
    };
    let room = world.get_room(&state.current_room)?;
    let Some(source) = room.liquid_source.as_deref() else {
        return refuse("There's nothing here to fill it with.");
    };
    if let Some(wanted) = command.instrument.as_deref() {
        if !wanted.eq_ignore_ascii_case(source) {
            return refuse(format!("There's no {} here.", wanted));
        }
    }
    if state.world.state_of(world, &id)?.liquid_level > 0 {
        return refuse(format!("The {} is already full.", name));
    }

    let object_state = state.world.state_of_mut(world, &id)?;
    object_state.liquid_level = spec.capacity;
    object_state.liquid = Some(source.to_string());

    let mut result = ActionResult::success(format!("You fill the {} with {}.", name, source));
    follow_up(world, state, object, Verb::Fill, &mut result)?;
    Ok(result)
}

/// Held liquid holder named directly, or by the liquid it holds.
fn liquid_holder(world: &World, state: &GameState, command: &ParsedCommand) -> Step<String> {
    let Some(name) = command.object.as_deref() else {
        return refuse("What do you want to pour?");
    };
    if let ResolveResult::Found(id) = resolve_among(world, &state.inventory, name)? {
        return Ok(id);
    }
    for id in &state.inventory {
        let object_state = state.world.state_of(world, id)?;
        if object_state.liquid_level > 0
            && object_state
                .liquid
                .as_deref()
                .is_some_and(|l| l.eq_ignore_ascii_case(name))
        {
            return Ok(id.clone());
        }
    }
    held(world, state, Some(name), Verb::Pour)
}

pub(super) fn pour(world: &World, command: &ParsedCommand, state: &mut GameState) -> Step<ActionResult> {
    let id = liquid_holder(world, state, command)?;
    let object = world.get_object(&id)?;
    let name = object.display_name();
    if !object.has(Capability::Liquid) {
        return refuse(format!("You can't pour the {}.", name));
    }
    let current = state.world.state_of(world, &id)?;
    if current.liquid_level == 0 {
        return refuse(format!("The {} is empty.", name));
    }
    let liquid = current.liquid.clone().unwrap_or_else(|| "liquid".to_string());
    let target_id = match command.target.as_deref() {
        Some(target) => Some(present(world, state, Some(target), Verb::Pour)?),
        None => None,
    };

    let object_state = state.world.state_of_mut(world, &id)?;
    object_state.liquid_level = 0;
    object_state.liquid = None;

    let mut result = match &target_id {
        Some(target_id) => {
            let target = world.get_object(target_id)?;
            let mut result = ActionResult::success(format!(
                "You pour the {} over the {}. It soaks away.",
                liquid,
                target.display_name()
            ));
            follow_up(world, state, target, Verb::Pour, &mut result)?;
            result
        }
        None => ActionResult::success(format!(
            "You pour out the {}. It seeps into the ground.",
            liquid
        )),
    };
    if target_id.is_none() {
        follow_up(world, state, object, Verb::Pour, &mut result)?;
    }
    Ok(result)
}

// ============================================================================
// Board / Disembark
// ============================================================================

pub(super) fn board(world: &World, command: &ParsedCommand, state: &mut GameState) -> Step<ActionResult> {
    let id = present(world, state, command.object.as_deref(), Verb::Board)?;
    let object = world.get_object(&id)?;
    let name = object.display_name();
    let Some(spec) = &object.capabilities.vehicle else {
        return refuse(format!("You can't board the {}.", name));
    };
    if let Some(current) = state.current_vehicle.as_deref() {
        return refuse(format!("You're already in the {}.", display_name(world, current)?));
    }
    if state.has_item(&id) {
        return refuse(format!("You'll have to put the {} down first.", name));
    }
    let current = state.world.state_of(world, &id)?;
    if object.has(Capability::Inflatable) && !current.is_inflated {
        return refuse(format!("The {} is a limp heap. It needs inflating first.", name));
    }
    if current.is_occupied {
        return refuse(format!("The {} is already occupied.", name));
    }

    state.current_vehicle = Some(id.clone());
    state.world.state_of_mut(world, &id)?.is_occupied = true;

    let message = spec
        .aboard_message
        .clone()
        .unwrap_or_else(|| format!("You climb into the {}.", name));
    let mut result = ActionResult::success(message);
    follow_up(world, state, object, Verb::Board, &mut result)?;
    Ok(result)
}

pub(super) fn disembark(world: &World, command: &ParsedCommand, state: &mut GameState) -> Step<ActionResult> {
    let Some(vehicle) = state.current_vehicle.clone() else {
        return refuse("You aren't in anything.");
    };
    if let Some(name) = command.object.as_deref() {
        let named = present(world, state, Some(name), Verb::Disembark)?;
        if named != vehicle {
            return refuse(format!("You aren't in the {}.", display_name(world, &named)?));
        }
    }

    state.current_vehicle = None;
    state.world.state_of_mut(world, &vehicle)?.is_occupied = false;
    let object = world.get_object(&vehicle)?;
    let mut result = ActionResult::success(format!("You climb out of the {}.", object.display_name()));
    follow_up(world, state, object, Verb::Disembark, &mut result)?;
    Ok(result)
}

// ============================================================================
// Enter / Exit
// ============================================================================

pub(super) fn enter(world: &World, command: &ParsedCommand, state: &mut GameState) -> Step<ActionResult> {
    if command.object.is_none() {
        return go_direction(world, state, Direction::In);
    }
    let id = present(world, state, command.object.as_deref(), Verb::Enter)?;
    let object = world.get_object(&id)?;
    let name = object.display_name();
    let Some(spec) = &object.capabilities.enterable else {
        if object.has(Capability::Vehicle) {
            return board(world, command, state);
        }
        return refuse(format!("You can't enter the {}.", name));
    };
    if state.current_vehicle.is_some() {
        return refuse("You'll have to get out first.");
    }
    let current = state.world.state_of(world, &id)?;
    if object.has(Capability::Openable) && !current.is_open {
        return refuse(format!("The {} is closed.", name));
    }
    check_free_to_leave(world, state)?;

    let mut result = move_to(world, state, &spec.destination)?;
    state.inside = Some(id.clone());
    result.message = format!("You enter the {}.\n\n{}", name, result.message);
    follow_up(world, state, object, Verb::Enter, &mut result)?;
    Ok(result)
}

pub(super) fn exit(world: &World, command: &ParsedCommand, state: &mut GameState) -> Step<ActionResult> {
    if let Some(inside) = state.inside.clone() {
        if let Some(name) = command.object.as_deref() {
            let matches = resolve_among(world, std::slice::from_ref(&inside), name)?;
            if matches != ResolveResult::Found(inside.clone()) {
                return refuse(format!("You aren't in any {}.", name));
            }
        }
        let object = world.get_object(&inside)?;
        let Some(spec) = &object.capabilities.enterable else {
            return refuse("There's no way out from here.");
        };
        check_free_to_leave(world, state)?;
        let mut result = move_to(world, state, &spec.exit_to)?;
        state.inside = None;
        result.message = format!("You leave the {}.\n\n{}", object.display_name(), result.message);
        follow_up(world, state, object, Verb::Exit, &mut result)?;
        return Ok(result);
    }
    if state.current_vehicle.is_some() {
        return disembark(world, command, state);
    }
    if command.object.is_some() {
        return refuse("You aren't inside that.");
    }
    go_direction(world, state, Direction::Out)
}

// ============================================================================
// Inflate / Deflate
// ============================================================================

pub(super) fn inflate(world: &World, command: &ParsedCommand, state: &mut GameState) -> Step<ActionResult> {
    let id = present(world, state, command.object.as_deref(), Verb::Inflate)?;
    let object = world.get_object(&id)?;
    let name = object.display_name();
    let Some(spec) = &object.capabilities.inflatable else {
        return refuse(format!("You can't inflate the {}.", name));
    };
    if state.world.state_of(world, &id)?.is_inflated {
        return refuse(format!("The {} is already inflated.", name));
    }
    if let Some(pump) = spec.pump_id.as_deref() {
        if let Some(instrument) = command.instrument.as_deref() {
            let used = held(world, state, Some(instrument), Verb::Inflate)?;
            if used != pump {
                return refuse(format!(
                    "You can't inflate anything with the {}.",
                    display_name(world, &used)?
                ));
            }
        }
        if !state.has_item(pump) {
            return refuse("You'll need something to pump air with.");
        }
    }

    state.world.state_of_mut(world, &id)?.is_inflated = true;
    let mut result = ActionResult::success(format!("The {} swells with air.", name));
    follow_up(world, state, object, Verb::Inflate, &mut result)?;
    Ok(result)
}

pub(super) fn deflate(world: &World, command: &ParsedCommand, state: &mut GameState) -> Step<ActionResult> {
    let id = present(world, state, command.object.as_deref(), Verb::Deflate)?;
    let object = world.get_object(&id)?;
    let name = object.display_name();
    if !object.has(Capability::Inflatable) {
        return refuse(format!("You can't deflate the {}.", name));
    }
    let current = state.world.state_of(world, &id)?;
    if !current.is_inflated {
        return refuse(format!("The {} isn't inflated.", name));
    }
    if current.is_occupied || state.current_vehicle.as_deref() == Some(id.as_str()) {
        return refuse(format!("You can't deflate the {} while you're in it.", name));
    }

    state.world.state_of_mut(world, &id)?.is_inflated = false;
    let mut result = ActionResult::success(format!("The {} sags and collapses.", name));
    follow_up(world, state, object, Verb::Deflate, &mut result)?;
    Ok(result)
}
