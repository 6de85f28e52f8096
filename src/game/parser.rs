//! Command parser: free text to a structured [`ParsedCommand`].
//!
//! Parsing is a pure function of the input text. Input is lowercased,
//! stripped of punctuation and articles, and resolved through a fixed
//! verb/direction/synonym table. A recognised preposition splits the rest
//! of the line into the direct object and a target or instrument.
//! Unrecognised or empty input yields [`Verb::Unknown`] with no other
//! fields populated.

use std::fmt;

use crate::game::types::Direction;

/// Canonical action tokens.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Verb {
    Look,
    Examine,
    Read,
    Search,
    Listen,
    Smell,
    Touch,
    Use,
    Push,
    Pull,
    Turn,
    Take,
    Drop,
    Put,
    Open,
    Close,
    Inventory,
    Go,
    Back,
    Enter,
    Exit,
    Lock,
    Unlock,
    Tie,
    Untie,
    Fill,
    Pour,
    Board,
    Disembark,
    Inflate,
    Deflate,
    Attack,
    TurnOn,
    TurnOff,
    Score,
    Diagnose,
    Wait,
    Help,
    // Recognised words without a handler yet
    Climb,
    Jump,
    Swim,
    Dig,
    Give,
    Throw,
    Eat,
    Drink,
    Pray,
    Sleep,
    Burn,
    #[default]
    Unknown,
}

impl Verb {
    pub fn name(&self) -> &'static str {
        match self {
            Verb::Look => "look",
            Verb::Examine => "examine",
            Verb::Read => "read",
            Verb::Search => "search",
            Verb::Listen => "listen",
            Verb::Smell => "smell",
            Verb::Touch => "touch",
            Verb::Use => "use",
            Verb::Push => "push",
            Verb::Pull => "pull",
            Verb::Turn => "turn",
            Verb::Take => "take",
            Verb::Drop => "drop",
            Verb::Put => "put",
            Verb::Open => "open",
            Verb::Close => "close",
            Verb::Inventory => "inventory",
            Verb::Go => "go",
            Verb::Back => "back",
            Verb::Enter => "enter",
            Verb::Exit => "exit",
            Verb::Lock => "lock",
            Verb::Unlock => "unlock",
            Verb::Tie => "tie",
            Verb::Untie => "untie",
            Verb::Fill => "fill",
            Verb::Pour => "pour",
            Verb::Board => "board",
            Verb::Disembark => "disembark",
            Verb::Inflate => "inflate",
            Verb::Deflate => "deflate",
            Verb::Attack => "attack",
            Verb::TurnOn => "turn_on",
            Verb::TurnOff => "turn_off",
            Verb::Score => "score",
            Verb::Diagnose => "diagnose",
            Verb::Wait => "wait",
            Verb::Help => "help",
            Verb::Climb => "climb",
            Verb::Jump => "jump",
            Verb::Swim => "swim",
            Verb::Dig => "dig",
            Verb::Give => "give",
            Verb::Throw => "throw",
            Verb::Eat => "eat",
            Verb::Drink => "drink",
            Verb::Pray => "pray",
            Verb::Sleep => "sleep",
            Verb::Burn => "burn",
            Verb::Unknown => "unknown",
        }
    }

    /// Look up a verb by its canonical name (as used in world data).
    pub fn from_name(name: &str) -> Option<Verb> {
        let name = name.trim().to_ascii_lowercase();
        ALL_VERBS
            .iter()
            .copied()
            .find(|v| *v != Verb::Unknown && v.name() == name)
    }

    /// Whether the action engine has a handler for this verb.
    pub fn is_implemented(&self) -> bool {
        !matches!(
            self,
            Verb::Climb
                | Verb::Jump
                | Verb::Swim
                | Verb::Dig
                | Verb::Give
                | Verb::Throw
                | Verb::Eat
                | Verb::Drink
                | Verb::Pray
                | Verb::Sleep
                | Verb::Burn
                | Verb::Unknown
        )
    }

    /// Verbs that never mutate game state and never consume a turn.
    pub fn is_read_only(&self) -> bool {
        matches!(
            self,
            Verb::Look | Verb::Inventory | Verb::Score | Verb::Diagnose | Verb::Help
        )
    }

    /// Verbs whose handler consults an object's interactions.
    pub fn takes_interactions(&self) -> bool {
        self.is_implemented()
            && !self.is_read_only()
            && !matches!(self, Verb::Go | Verb::Back | Verb::Wait)
    }
}

impl fmt::Display for Verb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

const ALL_VERBS: &[Verb] = &[
    Verb::Look,
    Verb::Examine,
    Verb::Read,
    Verb::Search,
    Verb::Listen,
    Verb::Smell,
    Verb::Touch,
    Verb::Use,
    Verb::Push,
    Verb::Pull,
    Verb::Turn,
    Verb::Take,
    Verb::Drop,
    Verb::Put,
    Verb::Open,
    Verb::Close,
    Verb::Inventory,
    Verb::Go,
    Verb::Back,
    Verb::Enter,
    Verb::Exit,
    Verb::Lock,
    Verb::Unlock,
    Verb::Tie,
    Verb::Untie,
    Verb::Fill,
    Verb::Pour,
    Verb::Board,
    Verb::Disembark,
    Verb::Inflate,
    Verb::Deflate,
    Verb::Attack,
    Verb::TurnOn,
    Verb::TurnOff,
    Verb::Score,
    Verb::Diagnose,
    Verb::Wait,
    Verb::Help,
    Verb::Climb,
    Verb::Jump,
    Verb::Swim,
    Verb::Dig,
    Verb::Give,
    Verb::Throw,
    Verb::Eat,
    Verb::Drink,
    Verb::Pray,
    Verb::Sleep,
    Verb::Burn,
    Verb::Unknown,
];

/// Single-word synonyms.
const VERB_WORDS: &[(&str, Verb)] = &[
    ("look", Verb::Look),
    ("l", Verb::Look),
    ("examine", Verb::Examine),
    ("x", Verb::Examine),
    ("inspect", Verb::Examine),
    ("check", Verb::Examine),
    ("study", Verb::Examine),
    ("describe", Verb::Examine),
    ("read", Verb::Read),
    ("peruse", Verb::Read),
    ("search", Verb::Search),
    ("rummage", Verb::Search),
    ("listen", Verb::Listen),
    ("hear", Verb::Listen),
    ("smell", Verb::Smell),
    ("sniff", Verb::Smell),
    ("touch", Verb::Touch),
    ("feel", Verb::Touch),
    ("rub", Verb::Touch),
    ("use", Verb::Use),
    ("push", Verb::Push),
    ("press", Verb::Push),
    ("shove", Verb::Push),
    ("pull", Verb::Pull),
    ("tug", Verb::Pull),
    ("yank", Verb::Pull),
    ("turn", Verb::Turn),
    ("rotate", Verb::Turn),
    ("spin", Verb::Turn),
    ("twist", Verb::Turn),
    ("switch", Verb::Turn),
    ("take", Verb::Take),
    ("get", Verb::Take),
    ("grab", Verb::Take),
    ("carry", Verb::Take),
    ("drop", Verb::Drop),
    ("discard", Verb::Drop),
    ("put", Verb::Put),
    ("place", Verb::Put),
    ("insert", Verb::Put),
    ("stow", Verb::Put),
    ("open", Verb::Open),
    ("close", Verb::Close),
    ("shut", Verb::Close),
    ("inventory", Verb::Inventory),
    ("inv", Verb::Inventory),
    ("i", Verb::Inventory),
    ("go", Verb::Go),
    ("walk", Verb::Go),
    ("run", Verb::Go),
    ("move", Verb::Go),
    ("travel", Verb::Go),
    ("head", Verb::Go),
    ("back", Verb::Back),
    ("return", Verb::Back),
    ("retreat", Verb::Back),
    ("enter", Verb::Enter),
    ("exit", Verb::Exit),
    ("leave", Verb::Exit),
    ("lock", Verb::Lock),
    ("unlock", Verb::Unlock),
    ("tie", Verb::Tie),
    ("fasten", Verb::Tie),
    ("knot", Verb::Tie),
    ("attach", Verb::Tie),
    ("untie", Verb::Untie),
    ("unfasten", Verb::Untie),
    ("unknot", Verb::Untie),
    ("detach", Verb::Untie),
    ("fill", Verb::Fill),
    ("pour", Verb::Pour),
    ("empty", Verb::Pour),
    ("spill", Verb::Pour),
    ("board", Verb::Board),
    ("embark", Verb::Board),
    ("disembark", Verb::Disembark),
    ("alight", Verb::Disembark),
    ("inflate", Verb::Inflate),
    ("deflate", Verb::Deflate),
    ("attack", Verb::Attack),
    ("kill", Verb::Attack),
    ("hit", Verb::Attack),
    ("strike", Verb::Attack),
    ("fight", Verb::Attack),
    ("stab", Verb::Attack),
    ("slay", Verb::Attack),
    ("light", Verb::TurnOn),
    ("ignite", Verb::TurnOn),
    ("extinguish", Verb::TurnOff),
    ("douse", Verb::TurnOff),
    ("score", Verb::Score),
    ("diagnose", Verb::Diagnose),
    ("status", Verb::Diagnose),
    ("wait", Verb::Wait),
    ("z", Verb::Wait),
    ("help", Verb::Help),
    ("climb", Verb::Climb),
    ("scale", Verb::Climb),
    ("jump", Verb::Jump),
    ("leap", Verb::Jump),
    ("swim", Verb::Swim),
    ("dig", Verb::Dig),
    ("give", Verb::Give),
    ("offer", Verb::Give),
    ("throw", Verb::Throw),
    ("toss", Verb::Throw),
    ("hurl", Verb::Throw),
    ("eat", Verb::Eat),
    ("drink", Verb::Drink),
    ("sip", Verb::Drink),
    ("pray", Verb::Pray),
    ("sleep", Verb::Sleep),
    ("burn", Verb::Burn),
];

/// Two-word verbs, matched before single words.
const PHRASAL_VERBS: &[(&str, &str, Verb)] = &[
    ("pick", "up", Verb::Take),
    ("put", "down", Verb::Drop),
    ("look", "at", Verb::Examine),
    ("look", "in", Verb::Search),
    ("look", "inside", Verb::Search),
    ("look", "under", Verb::Search),
    ("turn", "on", Verb::TurnOn),
    ("switch", "on", Verb::TurnOn),
    ("turn", "off", Verb::TurnOff),
    ("switch", "off", Verb::TurnOff),
    ("get", "in", Verb::Board),
    ("get", "into", Verb::Board),
    ("get", "on", Verb::Board),
    ("climb", "in", Verb::Board),
    ("climb", "into", Verb::Board),
    ("get", "out", Verb::Disembark),
    ("get", "off", Verb::Disembark),
    ("climb", "out", Verb::Disembark),
    ("blow", "up", Verb::Inflate),
    ("go", "back", Verb::Back),
    ("let", "air", Verb::Deflate),
];

const ARTICLES: &[&str] = &["the", "a", "an"];

const PREPOSITIONS: &[&str] = &[
    "in", "into", "inside", "on", "onto", "with", "using", "to", "from", "at", "under",
];

/// Prepositions whose complement is the tool used rather than the target.
const INSTRUMENT_PREPOSITIONS: &[&str] = &["with", "using"];

/// Structured result of parsing one line of player input.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ParsedCommand {
    pub verb: Verb,
    pub object: Option<String>,
    pub target: Option<String>,
    pub instrument: Option<String>,
    pub preposition: Option<String>,
    pub direction: Option<Direction>,
}

impl ParsedCommand {
    fn with_verb(verb: Verb) -> Self {
        Self {
            verb,
            ..Default::default()
        }
    }

    fn go(direction: Direction) -> Self {
        Self {
            verb: Verb::Go,
            direction: Some(direction),
            ..Default::default()
        }
    }
}

fn tokenize(input: &str) -> Vec<String> {
    input
        .to_lowercase()
        .split_whitespace()
        .map(|t| {
            t.trim_matches(|c: char| !c.is_alphanumeric() && c != '\'' && c != '-')
                .to_string()
        })
        .filter(|t| !t.is_empty() && !ARTICLES.contains(&t.as_str()))
        .collect()
}

fn lookup_verb(word: &str) -> Option<Verb> {
    VERB_WORDS
        .iter()
        .find(|(w, _)| *w == word)
        .map(|(_, verb)| *verb)
}

fn join(tokens: &[String]) -> Option<String> {
    if tokens.is_empty() {
        None
    } else {
        Some(tokens.join(" "))
    }
}

/// Parse a line of player input. Never fails.
pub fn parse(input: &str) -> ParsedCommand {
    let tokens = tokenize(input);
    let Some(first) = tokens.first() else {
        return ParsedCommand::default();
    };

    // Bare direction: "n", "north", "in"
    if let Some(direction) = Direction::from_token(first) {
        if tokens.len() == 1 {
            return ParsedCommand::go(direction);
        }
    }

    let (mut verb, consumed) = match tokens.get(1).and_then(|second| {
        PHRASAL_VERBS
            .iter()
            .find(|(a, b, _)| a == first && b == second)
            .map(|(_, _, verb)| *verb)
    }) {
        Some(verb) => (verb, 2),
        None => match lookup_verb(first) {
            Some(verb) => (verb, 1),
            None => return ParsedCommand::default(),
        },
    };

    let mut rest: Vec<String> = tokens[consumed..].to_vec();

    // "turn lamp on" / "switch lamp off"
    if verb == Verb::Turn {
        match rest.last().map(String::as_str) {
            Some("on") => {
                verb = Verb::TurnOn;
                rest.pop();
            }
            Some("off") => {
                verb = Verb::TurnOff;
                rest.pop();
            }
            _ => {}
        }
    }

    // "get out of boat" / "climb off of raft"
    if verb == Verb::Disembark && rest.first().map(String::as_str) == Some("of") {
        rest.remove(0);
    }

    // "let air out of raft"
    if verb == Verb::Deflate && first == "let" {
        rest.retain(|t| t != "out" && t != "of");
    }

    if verb == Verb::Go {
        return match rest.first().and_then(|t| Direction::from_token(t)) {
            Some(direction) => ParsedCommand::go(direction),
            None => ParsedCommand {
                verb: Verb::Go,
                object: join(&rest),
                ..Default::default()
            },
        };
    }

    let mut command = ParsedCommand::with_verb(verb);
    match rest.iter().position(|t| PREPOSITIONS.contains(&t.as_str())) {
        Some(index) => {
            let preposition = rest[index].clone();
            let complement = join(&rest[index + 1..]);
            command.object = join(&rest[..index]);
            if INSTRUMENT_PREPOSITIONS.contains(&preposition.as_str()) {
                command.instrument = complement;
            } else {
                command.target = complement;
            }
            command.preposition = Some(preposition);
        }
        None => command.object = join(&rest),
    }
    command
}
