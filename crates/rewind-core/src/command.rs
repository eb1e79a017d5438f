//! Command requests from live play and typed dispatch commands for replay.
//!
//! A [`CommandRequest`] is what the driver hands to the recorder: the
//! caller-chosen arguments of one command, without tick or checksum
//! (those are captured by the recorder). A [`SimCommand`] is what the
//! replay stepper hands back to the simulation: one typed operation per
//! [`ActionTag`], built from a logged record by
//! [`SimCommand::from_record`].

use crate::action::ActionTag;
use crate::error::DispatchError;
use crate::id::{SeatId, SlotId, TilePos};
use crate::record::{CommandRecord, RecordedAction};

/// Arguments of one command issued during live play.
///
/// `action == None` is a probe: recording it only makes sure the log
/// file and header exist.
///
/// # Examples
///
/// ```
/// use rewind_core::{ActionTag, CommandRequest, SlotId, TilePos};
///
/// let req = CommandRequest::new(ActionTag::Attack)
///     .actor(SlotId(1))
///     .target(SlotId(2))
///     .flush(1);
///
/// assert_eq!(req.action, Some(ActionTag::Attack));
/// assert_eq!(req.position, None);
/// assert!(CommandRequest::probe().action.is_none());
/// ```
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct CommandRequest {
    /// Command kind, or `None` for a probe.
    pub action: Option<ActionTag>,
    /// Subject entity.
    pub actor: Option<SlotId>,
    /// Queue-flush flag.
    pub flush: i32,
    /// Target tile.
    pub position: Option<TilePos>,
    /// Secondary entity.
    pub target: Option<SlotId>,
    /// String argument.
    pub payload: Option<String>,
    /// Numeric argument.
    pub num: Option<i32>,
}

impl CommandRequest {
    /// A request for `action` with no arguments.
    pub fn new(action: ActionTag) -> Self {
        Self {
            action: Some(action),
            ..Self::default()
        }
    }

    /// A request that records nothing but bootstraps the log.
    pub fn probe() -> Self {
        Self::default()
    }

    /// Set the subject entity.
    pub fn actor(mut self, slot: SlotId) -> Self {
        self.actor = Some(slot);
        self
    }

    /// Set the flush flag.
    pub fn flush(mut self, flush: i32) -> Self {
        self.flush = flush;
        self
    }

    /// Set the target tile.
    pub fn position(mut self, pos: impl Into<TilePos>) -> Self {
        self.position = Some(pos.into());
        self
    }

    /// Set the secondary entity.
    pub fn target(mut self, slot: SlotId) -> Self {
        self.target = Some(slot);
        self
    }

    /// Set the string argument.
    pub fn payload(mut self, payload: impl Into<String>) -> Self {
        self.payload = Some(payload.into());
        self
    }

    /// Set the numeric argument.
    pub fn num(mut self, num: i32) -> Self {
        self.num = Some(num);
        self
    }
}

/// How a console `input` line is interpreted.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum InputKind {
    /// A line starting with `-`: a script command (prefix stripped).
    Script,
    /// Anything else: a cheat code.
    Cheat,
}

/// A typed operation against the simulation's dispatch surface.
///
/// One variant per [`ActionTag`]; each carries exactly the arguments
/// the simulation consumes for that action.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SimCommand {
    /// Stop all orders.
    Stop {
        /// Subject.
        unit: SlotId,
    },
    /// Hold position.
    StandGround {
        /// Subject.
        unit: SlotId,
        /// Flush flag.
        flush: i32,
    },
    /// Guard `target`.
    Defend {
        /// Subject.
        unit: SlotId,
        /// Unit to guard.
        target: SlotId,
        /// Flush flag.
        flush: i32,
    },
    /// Follow `target`.
    Follow {
        /// Subject.
        unit: SlotId,
        /// Unit to follow.
        target: SlotId,
        /// Flush flag.
        flush: i32,
    },
    /// Move to `pos`.
    Move {
        /// Subject.
        unit: SlotId,
        /// Destination.
        pos: TilePos,
        /// Flush flag.
        flush: i32,
    },
    /// Pick up `target`.
    PickUp {
        /// Subject.
        unit: SlotId,
        /// Item to pick up.
        target: SlotId,
        /// Flush flag.
        flush: i32,
    },
    /// Repair at `pos` or the given building.
    Repair {
        /// Subject.
        unit: SlotId,
        /// Tile.
        pos: TilePos,
        /// Building to repair.
        target: Option<SlotId>,
        /// Flush flag.
        flush: i32,
    },
    /// Toggle automatic repair.
    AutoRepair {
        /// Subject.
        unit: SlotId,
        /// Auto-repair mode.
        mode: i32,
    },
    /// Attack a unit or a tile.
    Attack {
        /// Subject.
        unit: SlotId,
        /// Tile.
        pos: TilePos,
        /// Unit to attack.
        target: Option<SlotId>,
        /// Flush flag.
        flush: i32,
    },
    /// Attack the ground at `pos`.
    AttackGround {
        /// Subject.
        unit: SlotId,
        /// Tile.
        pos: TilePos,
        /// Flush flag.
        flush: i32,
    },
    /// Use `target`.
    Use {
        /// Subject.
        unit: SlotId,
        /// Unit to use.
        target: SlotId,
        /// Flush flag.
        flush: i32,
    },
    /// Trade with `target`.
    Trade {
        /// Subject.
        unit: SlotId,
        /// Trade partner.
        target: SlotId,
        /// Flush flag.
        flush: i32,
    },
    /// Patrol to `pos`.
    Patrol {
        /// Subject.
        unit: SlotId,
        /// Far end of the patrol.
        pos: TilePos,
        /// Flush flag.
        flush: i32,
    },
    /// Board `target`.
    Board {
        /// Subject.
        unit: SlotId,
        /// Transporter.
        target: SlotId,
        /// Flush flag.
        flush: i32,
    },
    /// Unload at `pos`.
    Unload {
        /// Subject (transporter).
        unit: SlotId,
        /// Tile.
        pos: TilePos,
        /// Passenger to unload, or all.
        target: Option<SlotId>,
        /// Flush flag.
        flush: i32,
    },
    /// Build `unit_type` at `pos`.
    Build {
        /// Builder.
        unit: SlotId,
        /// Site.
        pos: TilePos,
        /// Building type identifier.
        unit_type: String,
        /// Flush flag.
        flush: i32,
    },
    /// Dismiss a unit.
    Dismiss {
        /// Subject.
        unit: SlotId,
        /// Whether resources are salvaged.
        salvage: bool,
    },
    /// Gather at `pos`.
    ResourceLoc {
        /// Worker.
        unit: SlotId,
        /// Resource tile.
        pos: TilePos,
        /// Flush flag.
        flush: i32,
    },
    /// Gather from `target`.
    Resource {
        /// Worker.
        unit: SlotId,
        /// Resource unit.
        target: SlotId,
        /// Flush flag.
        flush: i32,
    },
    /// Return carried goods.
    ReturnGoods {
        /// Worker.
        unit: SlotId,
        /// Depot, or the nearest.
        target: Option<SlotId>,
        /// Flush flag.
        flush: i32,
    },
    /// Train `count` units of `unit_type`.
    Train {
        /// Producing building.
        unit: SlotId,
        /// Unit type identifier.
        unit_type: String,
        /// Quantity.
        count: i32,
        /// Flush flag.
        flush: i32,
    },
    /// Cancel a queued training order.
    CancelTrain {
        /// Producing building.
        unit: SlotId,
        /// Queue slot.
        slot: i32,
        /// Unit type of the cancelled order, if known.
        unit_type: Option<String>,
    },
    /// Upgrade to `unit_type`.
    UpgradeTo {
        /// Subject.
        unit: SlotId,
        /// Target type identifier.
        unit_type: String,
        /// Flush flag.
        flush: i32,
    },
    /// Cancel an upgrade-to order.
    CancelUpgradeTo {
        /// Subject.
        unit: SlotId,
    },
    /// Transform into `unit_type`.
    TransformInto {
        /// Subject.
        unit: SlotId,
        /// Target type identifier.
        unit_type: String,
        /// Flush flag.
        flush: i32,
    },
    /// Research `upgrade`.
    Research {
        /// Researching building.
        unit: SlotId,
        /// Upgrade identifier.
        upgrade: String,
        /// Researching seat or variant index.
        num: i32,
        /// Flush flag.
        flush: i32,
    },
    /// Cancel research.
    CancelResearch {
        /// Researching building.
        unit: SlotId,
    },
    /// Learn an ability upgrade.
    LearnAbility {
        /// Subject.
        unit: SlotId,
        /// Ability upgrade identifier.
        upgrade: String,
    },
    /// Cast spell number `spell`.
    SpellCast {
        /// Caster.
        unit: SlotId,
        /// Target tile.
        pos: TilePos,
        /// Target unit.
        target: Option<SlotId>,
        /// Spell index.
        spell: i32,
        /// Flush flag.
        flush: i32,
    },
    /// Toggle automatic casting of spell number `spell`.
    AutoSpellCast {
        /// Caster.
        unit: SlotId,
        /// Spell index.
        spell: i32,
        /// New autocast state.
        enabled: bool,
    },
    /// Set a rally point.
    RallyPoint {
        /// Building.
        unit: SlotId,
        /// Rally tile.
        pos: TilePos,
    },
    /// Accept a quest.
    Quest {
        /// Quest giver.
        unit: SlotId,
        /// Quest identifier.
        quest: String,
    },
    /// Buy from a market.
    Buy {
        /// Market.
        unit: SlotId,
        /// Unit or item bought.
        target: Option<SlotId>,
        /// Buying seat.
        num: i32,
    },
    /// Switch produced resource.
    ProduceResource {
        /// Building.
        unit: SlotId,
        /// Resource index.
        resource: i32,
    },
    /// Sell a resource.
    SellResource {
        /// Market.
        unit: SlotId,
        /// Resource index.
        resource: i32,
        /// Selling seat.
        seat: i32,
    },
    /// Buy a resource.
    BuyResource {
        /// Market.
        unit: SlotId,
        /// Resource index.
        resource: i32,
        /// Buying seat.
        seat: i32,
    },
    /// Change diplomacy of `seat` towards `other`.
    Diplomacy {
        /// Acting seat.
        seat: SeatId,
        /// New diplomatic state name (`allied`, `enemy`, ...).
        state: String,
        /// Other seat.
        other: SeatId,
    },
    /// Change shared vision of `seat` towards `other`.
    SharedVision {
        /// Acting seat.
        seat: SeatId,
        /// Whether vision is shared.
        enabled: bool,
        /// Other seat.
        other: SeatId,
    },
    /// Console input.
    Input {
        /// Script command or cheat.
        kind: InputKind,
        /// Text with the script prefix stripped.
        text: String,
    },
    /// Chat line broadcast to all seats.
    Chat {
        /// Message.
        text: String,
    },
    /// A seat leaves.
    Quit {
        /// Leaving seat.
        seat: i32,
    },
}

struct Args<'a> {
    tag: ActionTag,
    rec: &'a CommandRecord,
}

impl Args<'_> {
    fn missing(&self, argument: &'static str) -> DispatchError {
        DispatchError::MissingArgument {
            action: self.tag,
            argument,
        }
    }

    fn unit(&self) -> Result<SlotId, DispatchError> {
        self.rec.actor_slot.ok_or_else(|| self.missing("actor"))
    }

    fn target(&self) -> Result<SlotId, DispatchError> {
        self.rec.target_slot.ok_or_else(|| self.missing("target"))
    }

    fn pos(&self) -> Result<TilePos, DispatchError> {
        self.rec.position.ok_or_else(|| self.missing("position"))
    }

    fn payload(&self) -> Result<String, DispatchError> {
        self.rec
            .payload
            .clone()
            .filter(|p| !p.is_empty())
            .ok_or_else(|| self.missing("payload"))
    }

    fn num(&self) -> Result<i32, DispatchError> {
        self.rec.num.ok_or_else(|| self.missing("num"))
    }

    /// First positional argument (`PosX`), used as a plain integer by
    /// toggle and seat-level actions.
    fn arg1(&self) -> Result<i32, DispatchError> {
        self.rec
            .position
            .map(|p| p.x)
            .ok_or_else(|| self.missing("position"))
    }

    fn arg2(&self) -> Result<i32, DispatchError> {
        self.rec
            .position
            .map(|p| p.y)
            .ok_or_else(|| self.missing("position"))
    }

    fn seat(&self, v: i32) -> Result<SeatId, DispatchError> {
        u32::try_from(v)
            .map(SeatId)
            .map_err(|_| self.missing("seat"))
    }
}

impl SimCommand {
    /// Build the dispatch operation for a logged record.
    ///
    /// # Errors
    ///
    /// [`DispatchError::UnknownAction`] for an unrecognized action name,
    /// [`DispatchError::MissingArgument`] when a field the action needs
    /// is unset.
    pub fn from_record(rec: &CommandRecord) -> Result<Self, DispatchError> {
        let tag = match &rec.action {
            RecordedAction::Known(tag) => *tag,
            RecordedAction::Unrecognized(name) => {
                return Err(DispatchError::UnknownAction { name: name.clone() })
            }
        };
        let a = Args { tag, rec };
        let flush = rec.flush;

        let cmd = match tag {
            ActionTag::Stop => Self::Stop { unit: a.unit()? },
            ActionTag::StandGround => Self::StandGround {
                unit: a.unit()?,
                flush,
            },
            ActionTag::Defend => Self::Defend {
                unit: a.unit()?,
                target: a.target()?,
                flush,
            },
            ActionTag::Follow => Self::Follow {
                unit: a.unit()?,
                target: a.target()?,
                flush,
            },
            ActionTag::Move => Self::Move {
                unit: a.unit()?,
                pos: a.pos()?,
                flush,
            },
            ActionTag::PickUp => Self::PickUp {
                unit: a.unit()?,
                target: a.target()?,
                flush,
            },
            ActionTag::Repair => Self::Repair {
                unit: a.unit()?,
                pos: rec.position.unwrap_or(TilePos::new(-1, -1)),
                target: rec.target_slot,
                flush,
            },
            ActionTag::AutoRepair => Self::AutoRepair {
                unit: a.unit()?,
                mode: a.arg1()?,
            },
            ActionTag::Attack => Self::Attack {
                unit: a.unit()?,
                pos: rec.position.unwrap_or(TilePos::new(-1, -1)),
                target: rec.target_slot,
                flush,
            },
            ActionTag::AttackGround => Self::AttackGround {
                unit: a.unit()?,
                pos: a.pos()?,
                flush,
            },
            ActionTag::Use => Self::Use {
                unit: a.unit()?,
                target: a.target()?,
                flush,
            },
            ActionTag::Trade => Self::Trade {
                unit: a.unit()?,
                target: a.target()?,
                flush,
            },
            ActionTag::Patrol => Self::Patrol {
                unit: a.unit()?,
                pos: a.pos()?,
                flush,
            },
            ActionTag::Board => Self::Board {
                unit: a.unit()?,
                target: a.target()?,
                flush,
            },
            ActionTag::Unload => Self::Unload {
                unit: a.unit()?,
                pos: rec.position.unwrap_or(TilePos::new(-1, -1)),
                target: rec.target_slot,
                flush,
            },
            ActionTag::Build => Self::Build {
                unit: a.unit()?,
                pos: a.pos()?,
                unit_type: a.payload()?,
                flush,
            },
            ActionTag::Dismiss => Self::Dismiss {
                unit: a.unit()?,
                salvage: rec.position.is_some_and(|p| p.x > 0),
            },
            ActionTag::ResourceLoc => Self::ResourceLoc {
                unit: a.unit()?,
                pos: a.pos()?,
                flush,
            },
            ActionTag::Resource => Self::Resource {
                unit: a.unit()?,
                target: a.target()?,
                flush,
            },
            ActionTag::ReturnGoods => Self::ReturnGoods {
                unit: a.unit()?,
                target: rec.target_slot,
                flush,
            },
            ActionTag::Train => Self::Train {
                unit: a.unit()?,
                unit_type: a.payload()?,
                count: rec.num.unwrap_or(1),
                flush,
            },
            ActionTag::CancelTrain => Self::CancelTrain {
                unit: a.unit()?,
                slot: rec.num.unwrap_or(-1),
                unit_type: rec.payload.clone().filter(|p| !p.is_empty()),
            },
            ActionTag::UpgradeTo => Self::UpgradeTo {
                unit: a.unit()?,
                unit_type: a.payload()?,
                flush,
            },
            ActionTag::CancelUpgradeTo => Self::CancelUpgradeTo { unit: a.unit()? },
            ActionTag::TransformInto => Self::TransformInto {
                unit: a.unit()?,
                unit_type: a.payload()?,
                flush,
            },
            ActionTag::Research => Self::Research {
                unit: a.unit()?,
                upgrade: a.payload()?,
                num: rec.num.unwrap_or(-1),
                flush,
            },
            ActionTag::CancelResearch => Self::CancelResearch { unit: a.unit()? },
            ActionTag::LearnAbility => Self::LearnAbility {
                unit: a.unit()?,
                upgrade: a.payload()?,
            },
            ActionTag::SpellCast => Self::SpellCast {
                unit: a.unit()?,
                pos: rec.position.unwrap_or(TilePos::new(-1, -1)),
                target: rec.target_slot,
                spell: a.num()?,
                flush,
            },
            ActionTag::AutoSpellCast => Self::AutoSpellCast {
                unit: a.unit()?,
                spell: a.num()?,
                enabled: a.arg1()? != 0,
            },
            ActionTag::RallyPoint => Self::RallyPoint {
                unit: a.unit()?,
                pos: a.pos()?,
            },
            ActionTag::Quest => Self::Quest {
                unit: a.unit()?,
                quest: a.payload()?,
            },
            ActionTag::Buy => Self::Buy {
                unit: a.unit()?,
                target: rec.target_slot,
                num: a.num()?,
            },
            ActionTag::ProduceResource => Self::ProduceResource {
                unit: a.unit()?,
                resource: a.num()?,
            },
            ActionTag::SellResource => Self::SellResource {
                unit: a.unit()?,
                resource: a.arg1()?,
                seat: a.num()?,
            },
            ActionTag::BuyResource => Self::BuyResource {
                unit: a.unit()?,
                resource: a.arg1()?,
                seat: a.num()?,
            },
            ActionTag::Diplomacy => Self::Diplomacy {
                seat: a.seat(a.arg1()?)?,
                state: a.payload()?,
                other: a.seat(a.arg2()?)?,
            },
            ActionTag::SharedVision => Self::SharedVision {
                seat: a.seat(a.arg1()?)?,
                enabled: a.payload()?.trim().parse::<i64>().unwrap_or(0) != 0,
                other: a.seat(a.arg2()?)?,
            },
            ActionTag::Input => {
                let text = rec.payload.clone().unwrap_or_default();
                match text.strip_prefix('-') {
                    Some(script) => Self::Input {
                        kind: InputKind::Script,
                        text: script.to_string(),
                    },
                    None => Self::Input {
                        kind: InputKind::Cheat,
                        text,
                    },
                }
            }
            ActionTag::Chat => Self::Chat {
                text: rec.payload.clone().unwrap_or_default(),
            },
            ActionTag::Quit => Self::Quit {
                seat: match rec.num {
                    Some(n) => n,
                    None => a.arg1()?,
                },
            },
        };
        Ok(cmd)
    }

    /// The tag this command was built from.
    pub fn tag(&self) -> ActionTag {
        match self {
            Self::Stop { .. } => ActionTag::Stop,
            Self::StandGround { .. } => ActionTag::StandGround,
            Self::Defend { .. } => ActionTag::Defend,
            Self::Follow { .. } => ActionTag::Follow,
            Self::Move { .. } => ActionTag::Move,
            Self::PickUp { .. } => ActionTag::PickUp,
            Self::Repair { .. } => ActionTag::Repair,
            Self::AutoRepair { .. } => ActionTag::AutoRepair,
            Self::Attack { .. } => ActionTag::Attack,
            Self::AttackGround { .. } => ActionTag::AttackGround,
            Self::Use { .. } => ActionTag::Use,
            Self::Trade { .. } => ActionTag::Trade,
            Self::Patrol { .. } => ActionTag::Patrol,
            Self::Board { .. } => ActionTag::Board,
            Self::Unload { .. } => ActionTag::Unload,
            Self::Build { .. } => ActionTag::Build,
            Self::Dismiss { .. } => ActionTag::Dismiss,
            Self::ResourceLoc { .. } => ActionTag::ResourceLoc,
            Self::Resource { .. } => ActionTag::Resource,
            Self::ReturnGoods { .. } => ActionTag::ReturnGoods,
            Self::Train { .. } => ActionTag::Train,
            Self::CancelTrain { .. } => ActionTag::CancelTrain,
            Self::UpgradeTo { .. } => ActionTag::UpgradeTo,
            Self::CancelUpgradeTo { .. } => ActionTag::CancelUpgradeTo,
            Self::TransformInto { .. } => ActionTag::TransformInto,
            Self::Research { .. } => ActionTag::Research,
            Self::CancelResearch { .. } => ActionTag::CancelResearch,
            Self::LearnAbility { .. } => ActionTag::LearnAbility,
            Self::SpellCast { .. } => ActionTag::SpellCast,
            Self::AutoSpellCast { .. } => ActionTag::AutoSpellCast,
            Self::RallyPoint { .. } => ActionTag::RallyPoint,
            Self::Quest { .. } => ActionTag::Quest,
            Self::Buy { .. } => ActionTag::Buy,
            Self::ProduceResource { .. } => ActionTag::ProduceResource,
            Self::SellResource { .. } => ActionTag::SellResource,
            Self::BuyResource { .. } => ActionTag::BuyResource,
            Self::Diplomacy { .. } => ActionTag::Diplomacy,
            Self::SharedVision { .. } => ActionTag::SharedVision,
            Self::Input { .. } => ActionTag::Input,
            Self::Chat { .. } => ActionTag::Chat,
            Self::Quit { .. } => ActionTag::Quit,
        }
    }

    /// The subject entity, if the command has one.
    pub fn unit(&self) -> Option<SlotId> {
        match self {
            Self::Stop { unit }
            | Self::StandGround { unit, .. }
            | Self::Defend { unit, .. }
            | Self::Follow { unit, .. }
            | Self::Move { unit, .. }
            | Self::PickUp { unit, .. }
            | Self::Repair { unit, .. }
            | Self::AutoRepair { unit, .. }
            | Self::Attack { unit, .. }
            | Self::AttackGround { unit, .. }
            | Self::Use { unit, .. }
            | Self::Trade { unit, .. }
            | Self::Patrol { unit, .. }
            | Self::Board { unit, .. }
            | Self::Unload { unit, .. }
            | Self::Build { unit, .. }
            | Self::Dismiss { unit, .. }
            | Self::ResourceLoc { unit, .. }
            | Self::Resource { unit, .. }
            | Self::ReturnGoods { unit, .. }
            | Self::Train { unit, .. }
            | Self::CancelTrain { unit, .. }
            | Self::UpgradeTo { unit, .. }
            | Self::CancelUpgradeTo { unit }
            | Self::TransformInto { unit, .. }
            | Self::Research { unit, .. }
            | Self::CancelResearch { unit }
            | Self::LearnAbility { unit, .. }
            | Self::SpellCast { unit, .. }
            | Self::AutoSpellCast { unit, .. }
            | Self::RallyPoint { unit, .. }
            | Self::Quest { unit, .. }
            | Self::Buy { unit, .. }
            | Self::ProduceResource { unit, .. }
            | Self::SellResource { unit, .. }
            | Self::BuyResource { unit, .. } => Some(*unit),
            Self::Diplomacy { .. }
            | Self::SharedVision { .. }
            | Self::Input { .. }
            | Self::Chat { .. }
            | Self::Quit { .. } => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::id::TickId;

    fn rec(tag: ActionTag) -> CommandRecord {
        CommandRecord::new(TickId(1), tag)
    }

    #[test]
    fn move_needs_actor_and_position() {
        let r = rec(ActionTag::Move)
            .with_actor(SlotId(0), "unit-peasant")
            .with_position(TilePos::new(5, 5));
        assert_eq!(
            SimCommand::from_record(&r).unwrap(),
            SimCommand::Move {
                unit: SlotId(0),
                pos: TilePos::new(5, 5),
                flush: 0
            }
        );

        let no_pos = rec(ActionTag::Move).with_actor(SlotId(0), "unit-peasant");
        assert_eq!(
            SimCommand::from_record(&no_pos).unwrap_err(),
            DispatchError::MissingArgument {
                action: ActionTag::Move,
                argument: "position"
            }
        );
    }

    #[test]
    fn attack_target_is_optional() {
        let r = rec(ActionTag::Attack)
            .with_actor(SlotId(1), "unit-archer")
            .with_target(SlotId(2));
        let cmd = SimCommand::from_record(&r).unwrap();
        assert_eq!(
            cmd,
            SimCommand::Attack {
                unit: SlotId(1),
                pos: TilePos::new(-1, -1),
                target: Some(SlotId(2)),
                flush: 0
            }
        );
        assert_eq!(cmd.unit(), Some(SlotId(1)));
        assert_eq!(cmd.tag(), ActionTag::Attack);
    }

    #[test]
    fn build_needs_payload() {
        let r = rec(ActionTag::Build)
            .with_actor(SlotId(3), "unit-peasant")
            .with_position(TilePos::new(2, 9))
            .with_payload("");
        assert!(matches!(
            SimCommand::from_record(&r),
            Err(DispatchError::MissingArgument {
                argument: "payload",
                ..
            })
        ));
    }

    #[test]
    fn quit_prefers_num_then_pos_x() {
        let by_num = rec(ActionTag::Quit).with_num(0);
        assert_eq!(
            SimCommand::from_record(&by_num).unwrap(),
            SimCommand::Quit { seat: 0 }
        );
        let by_pos = rec(ActionTag::Quit).with_position(TilePos::new(3, -1));
        assert_eq!(
            SimCommand::from_record(&by_pos).unwrap(),
            SimCommand::Quit { seat: 3 }
        );
        assert_eq!(SimCommand::from_record(&by_num).unwrap().unit(), None);
    }

    #[test]
    fn input_splits_script_and_cheat() {
        let script = rec(ActionTag::Input).with_payload("-SetSpeed(2)");
        assert_eq!(
            SimCommand::from_record(&script).unwrap(),
            SimCommand::Input {
                kind: InputKind::Script,
                text: "SetSpeed(2)".into()
            }
        );
        let cheat = rec(ActionTag::Input).with_payload("there is no aliens level");
        assert!(matches!(
            SimCommand::from_record(&cheat).unwrap(),
            SimCommand::Input {
                kind: InputKind::Cheat,
                ..
            }
        ));
    }

    #[test]
    fn diplomacy_reads_seats_from_position() {
        let r = rec(ActionTag::Diplomacy)
            .with_position(TilePos::new(0, 2))
            .with_payload("allied");
        assert_eq!(
            SimCommand::from_record(&r).unwrap(),
            SimCommand::Diplomacy {
                seat: SeatId(0),
                state: "allied".into(),
                other: SeatId(2)
            }
        );
    }

    #[test]
    fn shared_vision_parses_flag() {
        let r = rec(ActionTag::SharedVision)
            .with_position(TilePos::new(1, 0))
            .with_payload("1");
        assert!(matches!(
            SimCommand::from_record(&r).unwrap(),
            SimCommand::SharedVision { enabled: true, .. }
        ));
    }

    #[test]
    fn unrecognized_action_is_reported() {
        let r = CommandRecord::new(TickId(4), RecordedAction::Unrecognized("warp".into()));
        assert_eq!(
            SimCommand::from_record(&r).unwrap_err(),
            DispatchError::UnknownAction {
                name: "warp".into()
            }
        );
    }

    #[test]
    fn every_actor_action_rejects_missing_actor() {
        for tag in ActionTag::ALL.into_iter().filter(|t| t.requires_actor()) {
            let r = rec(tag)
                .with_position(TilePos::new(1, 1))
                .with_target(SlotId(9))
                .with_payload("x")
                .with_num(1);
            assert_eq!(
                SimCommand::from_record(&r).unwrap_err(),
                DispatchError::MissingArgument {
                    action: tag,
                    argument: "actor"
                },
                "{tag} accepted a record without actor"
            );
        }
    }
}
