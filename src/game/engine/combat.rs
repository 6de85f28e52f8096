use log::info;

use crate::game::parser::{ParsedCommand, Verb};
use crate::game::state::GameState;
use crate::game::world::World;

use super::interactions::follow_up;
use super::{held, present, refuse, ActionResult, Step};

/// Damage of a bare-handed strike.
pub const UNARMED_DAMAGE: u32 = 1;

/// ATTACK creature [WITH weapon]. The creature never strikes back.
pub(super) fn attack(world: &World, command: &ParsedCommand, state: &mut GameState) -> Step<ActionResult> {
    let id = present(world, state, command.object.as_deref(), Verb::Attack)?;
    let creature = world.get_object(&id)?;
    let name = creature.display_name();
    let Some(spec) = &creature.capabilities.creature else {
        return refuse(format!("You can't attack the {}.", name));
    };
    if state.world.state_of(world, &id)?.is_dead {
        return refuse(format!("The {} is already dead.", name));
    }

    let weapon = match command.instrument.as_deref() {
        Some(instrument) => Some(held(world, state, Some(instrument), Verb::Attack)?),
        None => None,
    };
    let (damage, weapon_name) = match &weapon {
        Some(weapon_id) => {
            let weapon = world.get_object(weapon_id)?;
            let damage = weapon
                .capabilities
                .weapon
                .as_ref()
                .map(|w| w.damage)
                .filter(|d| *d > 0)
                .unwrap_or(UNARMED_DAMAGE);
            (damage, Some(weapon.display_name()))
        }
        None => (UNARMED_DAMAGE, None),
    };

    let target = state.world.state_of_mut(world, &id)?;
    target.health = target.health.saturating_sub(damage);
    let killed = target.health == 0;
    if killed {
        target.is_alive = false;
        target.is_dead = true;
    }

    let strike = match weapon_name {
        Some(weapon) => format!("You strike the {} with the {}.", name, weapon),
        None => format!("You strike the {} with your bare hands.", name),
    };
    let mut result = if killed {
        ActionResult::success(format!("{} The {} collapses and is still.", strike, name))
    } else {
        ActionResult::success(format!("{} The {} staggers.", strike, name))
    };

    if killed && spec.has_soul {
        state.souls_collected += 1;
        info!("session {} collected soul of {}", state.session_id, id);
        result.notify(format!(
            "Something cold passes into you. Souls collected: {}.",
            state.souls_collected
        ));
    }
    follow_up(world, state, creature, Verb::Attack, &mut result)?;
    Ok(result)
}
