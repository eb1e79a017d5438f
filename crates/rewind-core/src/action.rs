//! The closed vocabulary of loggable command kinds.

use std::fmt;
use std::str::FromStr;

use crate::error::CoreError;

/// Kind of a logged command.
///
/// Each tag has a stable wire name (see [`as_str`](ActionTag::as_str))
/// that is written to the `Action` field of a log line. The set is
/// closed: a name outside it fails to parse with
/// [`CoreError::UnknownAction`].
///
/// # Examples
///
/// ```
/// use rewind_core::ActionTag;
///
/// let tag: ActionTag = "stand-ground".parse().unwrap();
/// assert_eq!(tag, ActionTag::StandGround);
/// assert_eq!(tag.as_str(), "stand-ground");
/// assert!("teleport".parse::<ActionTag>().is_err());
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ActionTag {
    /// Stop all orders.
    Stop,
    /// Hold position and only fight in range.
    StandGround,
    /// Guard another unit.
    Defend,
    /// Follow another unit.
    Follow,
    /// Move to a tile.
    Move,
    /// Pick up an item unit.
    PickUp,
    /// Repair a building.
    Repair,
    /// Toggle automatic repair.
    AutoRepair,
    /// Attack a unit or a tile.
    Attack,
    /// Attack the ground at a tile.
    AttackGround,
    /// Use another unit (item, shrine, ...).
    Use,
    /// Trade with another unit.
    Trade,
    /// Patrol between the current position and a tile.
    Patrol,
    /// Board a transporter.
    Board,
    /// Unload a transporter.
    Unload,
    /// Construct a building.
    Build,
    /// Dismiss (destroy) an own unit.
    Dismiss,
    /// Gather resources at a tile.
    ResourceLoc,
    /// Gather resources from a unit.
    Resource,
    /// Return carried goods to a depot.
    ReturnGoods,
    /// Train a unit.
    Train,
    /// Cancel a queued training order.
    CancelTrain,
    /// Upgrade a building to another type.
    UpgradeTo,
    /// Cancel an upgrade-to order.
    CancelUpgradeTo,
    /// Transform a unit into another type.
    TransformInto,
    /// Research an upgrade.
    Research,
    /// Cancel research.
    CancelResearch,
    /// Learn an ability upgrade.
    LearnAbility,
    /// Cast a spell.
    SpellCast,
    /// Toggle automatic casting of a spell.
    AutoSpellCast,
    /// Set a building's rally point.
    RallyPoint,
    /// Accept a quest.
    Quest,
    /// Buy a unit or item from a market.
    Buy,
    /// Switch the produced resource of a building.
    ProduceResource,
    /// Sell a resource at a market.
    SellResource,
    /// Buy a resource at a market.
    BuyResource,
    /// Change the diplomatic state between two seats.
    Diplomacy,
    /// Change shared vision between two seats.
    SharedVision,
    /// Console input: a script command or a cheat code.
    Input,
    /// Broadcast a chat line.
    Chat,
    /// A seat leaves the game.
    Quit,
}

impl ActionTag {
    /// Every tag, in declaration order.
    pub const ALL: [ActionTag; 41] = [
        Self::Stop,
        Self::StandGround,
        Self::Defend,
        Self::Follow,
        Self::Move,
        Self::PickUp,
        Self::Repair,
        Self::AutoRepair,
        Self::Attack,
        Self::AttackGround,
        Self::Use,
        Self::Trade,
        Self::Patrol,
        Self::Board,
        Self::Unload,
        Self::Build,
        Self::Dismiss,
        Self::ResourceLoc,
        Self::Resource,
        Self::ReturnGoods,
        Self::Train,
        Self::CancelTrain,
        Self::UpgradeTo,
        Self::CancelUpgradeTo,
        Self::TransformInto,
        Self::Research,
        Self::CancelResearch,
        Self::LearnAbility,
        Self::SpellCast,
        Self::AutoSpellCast,
        Self::RallyPoint,
        Self::Quest,
        Self::Buy,
        Self::ProduceResource,
        Self::SellResource,
        Self::BuyResource,
        Self::Diplomacy,
        Self::SharedVision,
        Self::Input,
        Self::Chat,
        Self::Quit,
    ];

    /// Wire name written to the `Action` field of a log line.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Stop => "stop",
            Self::StandGround => "stand-ground",
            Self::Defend => "defend",
            Self::Follow => "follow",
            Self::Move => "move",
            Self::PickUp => "pick-up",
            Self::Repair => "repair",
            Self::AutoRepair => "auto-repair",
            Self::Attack => "attack",
            Self::AttackGround => "attack-ground",
            Self::Use => "use",
            Self::Trade => "trade",
            Self::Patrol => "patrol",
            Self::Board => "board",
            Self::Unload => "unload",
            Self::Build => "build",
            Self::Dismiss => "dismiss",
            Self::ResourceLoc => "resource-loc",
            Self::Resource => "resource",
            Self::ReturnGoods => "return",
            Self::Train => "train",
            Self::CancelTrain => "cancel-train",
            Self::UpgradeTo => "upgrade-to",
            Self::CancelUpgradeTo => "cancel-upgrade-to",
            Self::TransformInto => "transform-into",
            Self::Research => "research",
            Self::CancelResearch => "cancel-research",
            Self::LearnAbility => "learn-ability",
            Self::SpellCast => "spell-cast",
            Self::AutoSpellCast => "auto-spell-cast",
            Self::RallyPoint => "rally_point",
            Self::Quest => "quest",
            Self::Buy => "buy",
            Self::ProduceResource => "produce-resource",
            Self::SellResource => "sell-resource",
            Self::BuyResource => "buy-resource",
            Self::Diplomacy => "diplomacy",
            Self::SharedVision => "shared-vision",
            Self::Input => "input",
            Self::Chat => "chat",
            Self::Quit => "quit",
        }
    }

    /// Whether the command acts on a subject entity.
    ///
    /// Seat-level commands (diplomacy, chat, quit, ...) are logged with
    /// no actor.
    pub fn requires_actor(self) -> bool {
        !matches!(
            self,
            Self::Diplomacy | Self::SharedVision | Self::Input | Self::Chat | Self::Quit
        )
    }
}

impl fmt::Display for ActionTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ActionTag {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .iter()
            .copied()
            .find(|tag| tag.as_str() == s)
            .ok_or_else(|| CoreError::UnknownAction {
                name: s.to_string(),
            })
    }
}
