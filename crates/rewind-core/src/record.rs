//! Logged command records and the ordered command log.

use std::fmt;

use crate::action::ActionTag;
use crate::error::CoreError;
use crate::id::{SlotId, TickId, TilePos};

/// The action of a logged record.
///
/// Records produced during live play always carry a [`Known`] tag.
/// A log decoded leniently may carry names outside the vocabulary; those
/// are kept verbatim so stepping can report and skip them.
///
/// [`Known`]: RecordedAction::Known
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum RecordedAction {
    /// A tag from the closed vocabulary.
    Known(ActionTag),
    /// A wire name that matched no tag.
    Unrecognized(String),
}

impl RecordedAction {
    /// The wire name of this action.
    pub fn as_str(&self) -> &str {
        match self {
            Self::Known(tag) => tag.as_str(),
            Self::Unrecognized(name) => name,
        }
    }

    /// The tag, or `None` for an unrecognized name.
    pub fn tag(&self) -> Option<ActionTag> {
        match self {
            Self::Known(tag) => Some(*tag),
            Self::Unrecognized(_) => None,
        }
    }
}

impl From<ActionTag> for RecordedAction {
    fn from(tag: ActionTag) -> Self {
        Self::Known(tag)
    }
}

impl fmt::Display for RecordedAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One logged command bound to a simulation tick.
///
/// Values are immutable once appended to a [`CommandLog`].
///
/// # Examples
///
/// ```
/// use rewind_core::{ActionTag, CommandRecord, SlotId, TickId, TilePos};
///
/// let rec = CommandRecord::new(TickId(10), ActionTag::Move)
///     .with_actor(SlotId(0), "unit-footman")
///     .with_position(TilePos::new(5, 5))
///     .with_checksum(0x1234);
///
/// assert_eq!(rec.tick, TickId(10));
/// assert_eq!(rec.position, Some(TilePos::new(5, 5)));
/// assert_eq!(rec.target_slot, None);
/// ```
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CommandRecord {
    /// Simulation tick at which the command was issued.
    pub tick: TickId,
    /// Slot of the commanding entity, if the command has a subject.
    pub actor_slot: Option<SlotId>,
    /// Type identifier of the actor at record time (empty without actor).
    pub actor_type_tag: String,
    /// Command kind.
    pub action: RecordedAction,
    /// Queue-flush flag, opaque to this layer.
    pub flush: i32,
    /// Optional target tile.
    pub position: Option<TilePos>,
    /// Optional secondary entity.
    pub target_slot: Option<SlotId>,
    /// Optional string argument (unit type, upgrade, chat text, ...).
    pub payload: Option<String>,
    /// Optional numeric argument.
    pub num: Option<i32>,
    /// Sync random seed after everything up to `tick` executed.
    ///
    /// `None` only for legacy logs written without sync information.
    pub checksum: Option<u32>,
}

impl CommandRecord {
    /// A record with every optional argument unset.
    pub fn new(tick: TickId, action: impl Into<RecordedAction>) -> Self {
        Self {
            tick,
            actor_slot: None,
            actor_type_tag: String::new(),
            action: action.into(),
            flush: 0,
            position: None,
            target_slot: None,
            payload: None,
            num: None,
            checksum: None,
        }
    }

    /// Set the actor slot and its type identifier.
    pub fn with_actor(mut self, slot: SlotId, type_tag: impl Into<String>) -> Self {
        self.actor_slot = Some(slot);
        self.actor_type_tag = type_tag.into();
        self
    }

    /// Set the flush flag.
    pub fn with_flush(mut self, flush: i32) -> Self {
        self.flush = flush;
        self
    }

    /// Set the target tile.
    pub fn with_position(mut self, pos: TilePos) -> Self {
        self.position = Some(pos);
        self
    }

    /// Set the secondary entity.
    pub fn with_target(mut self, slot: SlotId) -> Self {
        self.target_slot = Some(slot);
        self
    }

    /// Set the string argument.
    pub fn with_payload(mut self, payload: impl Into<String>) -> Self {
        self.payload = Some(payload.into());
        self
    }

    /// Set the numeric argument.
    pub fn with_num(mut self, num: i32) -> Self {
        self.num = Some(num);
        self
    }

    /// Set the recorded sync checksum.
    pub fn with_checksum(mut self, checksum: u32) -> Self {
        self.checksum = Some(checksum);
        self
    }
}

/// Append-only, tick-ordered sequence of command records.
///
/// Ticks are non-decreasing: [`push`](CommandLog::push) rejects a
/// record older than the last one. Several records may share a tick;
/// they replay in append order.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct CommandLog {
    records: Vec<CommandRecord>,
}

impl CommandLog {
    /// An empty log.
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a log from records, validating tick order.
    pub fn from_records(records: Vec<CommandRecord>) -> Result<Self, CoreError> {
        let mut log = Self::new();
        for record in records {
            log.push(record)?;
        }
        Ok(log)
    }

    /// Append a record.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::BackdatedRecord`] if `record.tick` is lower
    /// than the tick of the last record.
    pub fn push(&mut self, record: CommandRecord) -> Result<(), CoreError> {
        self.check_next(record.tick)?;
        self.records.push(record);
        Ok(())
    }

    /// Whether a record at `tick` could be appended now.
    ///
    /// # Errors
    ///
    /// [`CoreError::BackdatedRecord`] under the same rule as
    /// [`push`](CommandLog::push).
    pub fn check_next(&self, tick: TickId) -> Result<(), CoreError> {
        match self.last_tick() {
            Some(last) if tick < last => Err(CoreError::BackdatedRecord { tick, last }),
            _ => Ok(()),
        }
    }

    /// Tick of the last record, or `None` for an empty log.
    pub fn last_tick(&self) -> Option<TickId> {
        self.records.last().map(|r| r.tick)
    }

    /// Record at `index`.
    pub fn get(&self, index: usize) -> Option<&CommandRecord> {
        self.records.get(index)
    }

    /// All records in order.
    pub fn records(&self) -> &[CommandRecord] {
        &self.records
    }

    /// Iterate over records in order.
    pub fn iter(&self) -> std::slice::Iter<'_, CommandRecord> {
        self.records.iter()
    }

    /// Number of records.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether the log holds no records.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

impl<'a> IntoIterator for &'a CommandLog {
    type Item = &'a CommandRecord;
    type IntoIter = std::slice::Iter<'a, CommandRecord>;

    fn into_iter(self) -> Self::IntoIter {
        self.records.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn push_accepts_equal_ticks() {
        let mut log = CommandLog::new();
        log.push(CommandRecord::new(TickId(10), ActionTag::Move)).unwrap();
        log.push(CommandRecord::new(TickId(10), ActionTag::Attack))
            .unwrap();
        assert_eq!(log.len(), 2);
        assert_eq!(log.last_tick(), Some(TickId(10)));
    }

    #[test]
    fn push_rejects_backdated_record() {
        let mut log = CommandLog::new();
        log.push(CommandRecord::new(TickId(10), ActionTag::Move)).unwrap();
        let err = log
            .push(CommandRecord::new(TickId(9), ActionTag::Stop))
            .unwrap_err();
        assert_eq!(
            err,
            CoreError::BackdatedRecord {
                tick: TickId(9),
                last: TickId(10)
            }
        );
        assert_eq!(log.len(), 1);
        assert!(log.check_next(TickId(9)).is_err());
        assert!(log.check_next(TickId(10)).is_ok());
    }

    #[test]
    fn unrecognized_action_keeps_its_name() {
        let action = RecordedAction::Unrecognized("teleport".into());
        assert_eq!(action.as_str(), "teleport");
        assert_eq!(action.tag(), None);
        assert_eq!(
            RecordedAction::from(ActionTag::Chat).tag(),
            Some(ActionTag::Chat)
        );
    }

    proptest! {
        #[test]
        fn from_records_accepts_sorted_ticks(
            mut ticks in prop::collection::vec(0u64..1000, 0..64),
        ) {
            ticks.sort_unstable();
            let records = ticks
                .iter()
                .map(|&t| CommandRecord::new(TickId(t), ActionTag::Stop))
                .collect();
            let log = CommandLog::from_records(records).unwrap();
            prop_assert_eq!(log.len(), ticks.len());
            prop_assert!(log.records().windows(2).all(|w| w[0].tick <= w[1].tick));
        }
    }
}
