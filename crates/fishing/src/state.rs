#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FishMode {
    Resting,
    Fighting,
}

impl FishMode {
    pub fn flip(self) -> Self {
        match self {
            FishMode::Resting => FishMode::Fighting,
            FishMode::Fighting => FishMode::Resting,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Pump,
    Reel,
}

/// Whether the player's action matched the fish's current mode. Resisted
/// actions always record `Failed`, regardless of effectiveness.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GoodUse {
    Success,
    Failed,
}

/// The fields a client would render for one action, cleared at the start of
/// the next tick (spec §4.5 step 5).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ActionRecord {
    pub action: Action,
    pub resisted: bool,
    pub good_use: GoodUse,
    pub damage: i32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EndReason {
    Escaped,
    Caught,
    Timeout,
}

/// Emitted once per tick while the minigame continues.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TickEvent {
    pub mode: FishMode,
    pub deceptive_mode: bool,
    pub fish_cur_hp: i32,
    pub time_left: i32,
    pub last_action: Option<ActionRecord>,
}
