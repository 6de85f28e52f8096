use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

use crate::game::parser::Verb;

pub const GAME_STATE_SCHEMA_VERSION: u8 = 1;

/// Sanity bounds shared by the state factory and the sanity subsystem.
pub const MAX_SANITY: u32 = 100;
pub const MAX_SCORE: u32 = 350;
pub const MAX_LAMP_BATTERY: u32 = 200;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    North,
    South,
    East,
    West,
    Up,
    Down,
    Northeast,
    Northwest,
    Southeast,
    Southwest,
    In,
    Out,
}

impl Direction {
    pub const ALL: [Direction; 12] = [
        Direction::North,
        Direction::South,
        Direction::East,
        Direction::West,
        Direction::Up,
        Direction::Down,
        Direction::Northeast,
        Direction::Northwest,
        Direction::Southeast,
        Direction::Southwest,
        Direction::In,
        Direction::Out,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Direction::North => "north",
            Direction::South => "south",
            Direction::East => "east",
            Direction::West => "west",
            Direction::Up => "up",
            Direction::Down => "down",
            Direction::Northeast => "northeast",
            Direction::Northwest => "northwest",
            Direction::Southeast => "southeast",
            Direction::Southwest => "southwest",
            Direction::In => "in",
            Direction::Out => "out",
        }
    }

    /// Resolve a full name or abbreviation ("n", "ne", "u") to a direction.
    pub fn from_token(token: &str) -> Option<Direction> {
        let dir = match token {
            "n" | "north" => Direction::North,
            "s" | "south" => Direction::South,
            "e" | "east" => Direction::East,
            "w" | "west" => Direction::West,
            "u" | "up" => Direction::Up,
            "d" | "down" => Direction::Down,
            "ne" | "northeast" => Direction::Northeast,
            "nw" | "northwest" => Direction::Northwest,
            "se" | "southeast" => Direction::Southeast,
            "sw" | "southwest" => Direction::Southwest,
            "in" | "inside" => Direction::In,
            "out" | "outside" => Direction::Out,
            _ => return None,
        };
        Some(dir)
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A scalar held in object state, interaction conditions and session flags.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(untagged)]
pub enum StateValue {
    Bool(bool),
    Int(i64),
    Text(String),
}

impl StateValue {
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            StateValue::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_int(&self) -> Option<i64> {
        match self {
            StateValue::Int(n) => Some(*n),
            _ => None,
        }
    }

    fn kind(&self) -> ValueKind {
        match self {
            StateValue::Bool(_) => ValueKind::Bool,
            StateValue::Int(_) => ValueKind::Int,
            StateValue::Text(_) => ValueKind::Text,
        }
    }
}

impl fmt::Display for StateValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StateValue::Bool(b) => write!(f, "{}", b),
            StateValue::Int(n) => write!(f, "{}", n),
            StateValue::Text(s) => f.write_str(s),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ValueKind {
    Bool,
    Int,
    Text,
}

/// Optional behaviours an object may declare.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Capability {
    Openable,
    Container,
    Lockable,
    Creature,
    Vehicle,
    Liquid,
    Turnable,
    Rope,
    Enterable,
    Inflatable,
    Weapon,
    Light,
}

impl Capability {
    pub fn name(&self) -> &'static str {
        match self {
            Capability::Openable => "openable",
            Capability::Container => "container",
            Capability::Lockable => "lockable",
            Capability::Creature => "creature",
            Capability::Vehicle => "vehicle",
            Capability::Liquid => "liquid",
            Capability::Turnable => "turnable",
            Capability::Rope => "rope",
            Capability::Enterable => "enterable",
            Capability::Inflatable => "inflatable",
            Capability::Weapon => "weapon",
            Capability::Light => "light",
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum ObjectKind {
    Item,
    Container,
    Creature,
    Npc,
    Vehicle,
    Door,
    Scenery,
    Tool,
}

impl ObjectKind {
    /// Whether an object of this kind may declare the given capability.
    pub fn permits(&self, capability: Capability) -> bool {
        use Capability as C;
        use ObjectKind as K;
        match capability {
            C::Openable => matches!(self, K::Container | K::Door | K::Vehicle),
            C::Container => matches!(self, K::Container | K::Vehicle | K::Item),
            C::Lockable => matches!(self, K::Container | K::Door),
            C::Creature => matches!(self, K::Creature | K::Npc),
            C::Vehicle => matches!(self, K::Vehicle),
            C::Liquid => matches!(self, K::Item | K::Container | K::Tool),
            C::Turnable => matches!(self, K::Scenery | K::Tool | K::Door),
            C::Rope => matches!(self, K::Item | K::Tool),
            C::Enterable => matches!(self, K::Scenery | K::Door),
            C::Inflatable => matches!(self, K::Vehicle | K::Item),
            C::Weapon => matches!(self, K::Item | K::Tool),
            C::Light => matches!(self, K::Item | K::Tool),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ObjectKind::Item => "item",
            ObjectKind::Container => "container",
            ObjectKind::Creature => "creature",
            ObjectKind::Npc => "npc",
            ObjectKind::Vehicle => "vehicle",
            ObjectKind::Door => "door",
            ObjectKind::Scenery => "scenery",
            ObjectKind::Tool => "tool",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContainerSpec {
    pub capacity: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LockSpec {
    #[serde(default)]
    pub key_id: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreatureSpec {
    pub health: u32,
    #[serde(default)]
    pub has_soul: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct VehicleSpec {
    #[serde(default)]
    pub aboard_message: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LiquidSpec {
    pub capacity: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TurnSpec {
    pub positions: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RopeSpec {
    pub targets: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnterSpec {
    /// Room reached by entering the object.
    pub destination: String,
    /// Room the player returns to on EXIT.
    pub exit_to: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct InflateSpec {
    #[serde(default)]
    pub pump_id: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WeaponSpec {
    pub damage: u32,
}

/// Capability components attached to an object. Each is optional; which
/// ones are legal depends on the object's [`ObjectKind`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct Capabilities {
    #[serde(default)]
    pub openable: bool,
    #[serde(default)]
    pub container: Option<ContainerSpec>,
    #[serde(default)]
    pub lockable: Option<LockSpec>,
    #[serde(default)]
    pub creature: Option<CreatureSpec>,
    #[serde(default)]
    pub vehicle: Option<VehicleSpec>,
    #[serde(default)]
    pub liquid: Option<LiquidSpec>,
    #[serde(default)]
    pub turnable: Option<TurnSpec>,
    #[serde(default)]
    pub rope: Option<RopeSpec>,
    #[serde(default)]
    pub enterable: Option<EnterSpec>,
    #[serde(default)]
    pub inflatable: Option<InflateSpec>,
    #[serde(default)]
    pub weapon: Option<WeaponSpec>,
    #[serde(default)]
    pub light: bool,
}

impl Capabilities {
    pub fn has(&self, capability: Capability) -> bool {
        match capability {
            Capability::Openable => self.openable,
            Capability::Container => self.container.is_some(),
            Capability::Lockable => self.lockable.is_some(),
            Capability::Creature => self.creature.is_some(),
            Capability::Vehicle => self.vehicle.is_some(),
            Capability::Liquid => self.liquid.is_some(),
            Capability::Turnable => self.turnable.is_some(),
            Capability::Rope => self.rope.is_some(),
            Capability::Enterable => self.enterable.is_some(),
            Capability::Inflatable => self.inflatable.is_some(),
            Capability::Weapon => self.weapon.is_some(),
            Capability::Light => self.light,
        }
    }

    pub fn declared(&self) -> Vec<Capability> {
        [
            Capability::Openable,
            Capability::Container,
            Capability::Lockable,
            Capability::Creature,
            Capability::Vehicle,
            Capability::Liquid,
            Capability::Turnable,
            Capability::Rope,
            Capability::Enterable,
            Capability::Inflatable,
            Capability::Weapon,
            Capability::Light,
        ]
        .into_iter()
        .filter(|cap| self.has(*cap))
        .collect()
    }
}

/// Typed key into an object's state.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum StateKey {
    IsOpen,
    IsLocked,
    IsTied,
    IsInflated,
    IsOn,
    IsOccupied,
    IsAlive,
    IsDead,
    Health,
    LiquidLevel,
    Position,
    /// A one-off puzzle key declared in the object's initial `extra` map.
    Extra(String),
}

impl StateKey {
    pub fn parse(name: &str) -> StateKey {
        match name {
            "is_open" => StateKey::IsOpen,
            "is_locked" => StateKey::IsLocked,
            "is_tied" => StateKey::IsTied,
            "is_inflated" => StateKey::IsInflated,
            "is_on" => StateKey::IsOn,
            "is_occupied" => StateKey::IsOccupied,
            "is_alive" => StateKey::IsAlive,
            "is_dead" => StateKey::IsDead,
            "health" => StateKey::Health,
            "liquid_level" => StateKey::LiquidLevel,
            "position" => StateKey::Position,
            other => StateKey::Extra(other.to_string()),
        }
    }

    pub fn name(&self) -> &str {
        match self {
            StateKey::IsOpen => "is_open",
            StateKey::IsLocked => "is_locked",
            StateKey::IsTied => "is_tied",
            StateKey::IsInflated => "is_inflated",
            StateKey::IsOn => "is_on",
            StateKey::IsOccupied => "is_occupied",
            StateKey::IsAlive => "is_alive",
            StateKey::IsDead => "is_dead",
            StateKey::Health => "health",
            StateKey::LiquidLevel => "liquid_level",
            StateKey::Position => "position",
            StateKey::Extra(name) => name,
        }
    }

    /// Capability an object must declare before this key is meaningful.
    pub fn required_capability(&self) -> Option<Capability> {
        match self {
            StateKey::IsOpen => Some(Capability::Openable),
            StateKey::IsLocked => Some(Capability::Lockable),
            StateKey::IsTied => Some(Capability::Rope),
            StateKey::IsInflated => Some(Capability::Inflatable),
            StateKey::IsOn => Some(Capability::Light),
            StateKey::IsOccupied => Some(Capability::Vehicle),
            StateKey::IsAlive | StateKey::IsDead | StateKey::Health => Some(Capability::Creature),
            StateKey::LiquidLevel => Some(Capability::Liquid),
            StateKey::Position => Some(Capability::Turnable),
            StateKey::Extra(_) => None,
        }
    }

    fn value_kind(&self) -> Option<ValueKind> {
        match self {
            StateKey::Health | StateKey::LiquidLevel | StateKey::Position => Some(ValueKind::Int),
            StateKey::Extra(_) => None,
            _ => Some(ValueKind::Bool),
        }
    }

    /// Check that a value has the type this key stores.
    pub fn accepts(&self, value: &StateValue) -> bool {
        match self.value_kind() {
            Some(kind) => kind == value.kind(),
            None => true,
        }
    }
}

impl fmt::Display for StateKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Mutable per-object state. The catalog holds each object's initial state;
/// sessions hold modified copies in their world overlay.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(default, deny_unknown_fields)]
pub struct ObjectState {
    pub is_open: bool,
    pub is_locked: bool,
    pub is_tied: bool,
    pub tied_to: Option<String>,
    pub attached_rope: Option<String>,
    pub is_inflated: bool,
    pub is_on: bool,
    pub is_occupied: bool,
    pub is_alive: bool,
    pub is_dead: bool,
    pub health: u32,
    pub liquid_level: u32,
    pub liquid: Option<String>,
    pub position: u32,
    pub contents: Vec<String>,
    pub extra: BTreeMap<String, StateValue>,
}

impl ObjectState {
    pub fn get(&self, key: &StateKey) -> Option<StateValue> {
        let value = match key {
            StateKey::IsOpen => StateValue::Bool(self.is_open),
            StateKey::IsLocked => StateValue::Bool(self.is_locked),
            StateKey::IsTied => StateValue::Bool(self.is_tied),
            StateKey::IsInflated => StateValue::Bool(self.is_inflated),
            StateKey::IsOn => StateValue::Bool(self.is_on),
            StateKey::IsOccupied => StateValue::Bool(self.is_occupied),
            StateKey::IsAlive => StateValue::Bool(self.is_alive),
            StateKey::IsDead => StateValue::Bool(self.is_dead),
            StateKey::Health => StateValue::Int(i64::from(self.health)),
            StateKey::LiquidLevel => StateValue::Int(i64::from(self.liquid_level)),
            StateKey::Position => StateValue::Int(i64::from(self.position)),
            StateKey::Extra(name) => return self.extra.get(name).cloned(),
        };
        Some(value)
    }

    /// Assign a typed value. Integer keys clamp negatives to zero.
    pub fn set(&mut self, key: &StateKey, value: &StateValue) -> Result<(), String> {
        if !key.accepts(value) {
            return Err(format!("value '{}' has the wrong type for '{}'", value, key));
        }
        let as_u32 = |v: &StateValue| {
            v.as_int()
                .map(|n| u32::try_from(n.max(0)).unwrap_or(u32::MAX))
                .unwrap_or(0)
        };
        let flag = value.as_bool().unwrap_or(false);
        match key {
            StateKey::IsOpen => self.is_open = flag,
            StateKey::IsLocked => self.is_locked = flag,
            StateKey::IsTied => self.is_tied = flag,
            StateKey::IsInflated => self.is_inflated = flag,
            StateKey::IsOn => self.is_on = flag,
            StateKey::IsOccupied => self.is_occupied = flag,
            StateKey::IsAlive => self.is_alive = flag,
            StateKey::IsDead => self.is_dead = flag,
            StateKey::Health => self.health = as_u32(value),
            StateKey::LiquidLevel => self.liquid_level = as_u32(value),
            StateKey::Position => self.position = as_u32(value),
            StateKey::Extra(name) => {
                self.extra.insert(name.clone(), value.clone());
            }
        }
        Ok(())
    }
}

/// Conjunction of `(key, expected value)` clauses. Empty matches everything.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Condition {
    pub clauses: Vec<(StateKey, StateValue)>,
}

impl Condition {
    pub fn is_empty(&self) -> bool {
        self.clauses.is_empty()
    }

    pub fn matches(&self, state: &ObjectState) -> bool {
        self.clauses
            .iter()
            .all(|(key, expected)| state.get(key).as_ref() == Some(expected))
    }
}

/// A single typed assignment applied by an interaction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Assignment {
    pub key: StateKey,
    pub value: StateValue,
}

/// A data-driven verb response attached to an object.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Interaction {
    pub verb: Verb,
    pub response_base: String,
    pub response_themed: String,
    pub condition: Condition,
    pub state_change: Vec<Assignment>,
    pub flag_change: Vec<(String, StateValue)>,
    pub sanity_effect: i32,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Room {
    pub id: String,
    pub name: String,
    pub description: String,
    pub description_themed: String,
    pub exits: BTreeMap<Direction, String>,
    /// Door objects guarding particular exits.
    pub doors: BTreeMap<Direction, String>,
    pub items: Vec<String>,
    pub sanity_effect: i32,
    pub is_safe_room: bool,
    pub is_cursed_room: bool,
    pub is_dark: bool,
    pub liquid_source: Option<String>,
    pub is_start: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GameObject {
    pub id: String,
    pub name: String,
    pub tone_name: Option<String>,
    pub description: String,
    pub aliases: Vec<String>,
    pub kind: ObjectKind,
    pub is_takeable: bool,
    pub is_treasure: bool,
    pub treasure_value: u32,
    pub capabilities: Capabilities,
    pub state: ObjectState,
    pub interactions: Vec<Interaction>,
}

impl GameObject {
    /// Name used in player-facing text.
    pub fn display_name(&self) -> &str {
        self.tone_name.as_deref().unwrap_or(&self.name)
    }

    pub fn capacity(&self) -> u32 {
        self.capabilities
            .container
            .as_ref()
            .map(|c| c.capacity)
            .unwrap_or(0)
    }

    pub fn has(&self, capability: Capability) -> bool {
        self.capabilities.has(capability)
    }

    /// First interaction for `verb` whose condition holds against `state`.
    pub fn find_interaction(&self, verb: Verb, state: &ObjectState) -> Option<&Interaction> {
        self.interactions
            .iter()
            .filter(|i| i.verb == verb)
            .find(|i| i.condition.matches(state))
    }
}
