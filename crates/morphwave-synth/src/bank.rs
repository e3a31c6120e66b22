//! Lock-free publication of wavetable vectors to the audio thread.
//!
//! The bank holds one slot per [`TableTarget`]. Each slot pairs an
//! [`ArcSwap`] holding the current [`WaveTableVector`] with a count of loads
//! in progress. The control thread raises the count, builds the replacement
//! (allocating freely), swaps it in and lowers the count. The audio thread takes a
//! [`BlockTables`] view once per block; a slot whose flag is up is absent
//! from that view and the voice renders silence for it.
//!
//! ```rust
//! use morphwave_synth::{BasicShape, TABLE_SIZE, TableTarget, WaveBank};
//!
//! let bank = WaveBank::new();
//! // Fresh banks start with one sine table per slot
//! assert_eq!(bank.table_count(TableTarget::Osc1), 1);
//!
//! // A single buffer is appended
//! let saw = BasicShape::Saw.render(TABLE_SIZE);
//! assert_eq!(bank.load_from_buffers(TableTarget::Osc1, &[saw]).unwrap(), 2);
//!
//! // Several buffers replace the whole vector
//! let set = [BasicShape::Square.render(512), BasicShape::Triangle.render(4096)];
//! assert_eq!(bank.load_from_buffers(TableTarget::Osc1, &set).unwrap(), 2);
//! assert!(bank.all_loaded());
//! ```

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use arc_swap::{ArcSwap, Guard};

use crate::error::SynthError;
use crate::shapes::BasicShape;
use crate::wavetable::{MAX_TABLES, WaveTable, WaveTableVector};

/// Which table slot a load targets.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum TableTarget {
    /// Oscillator 1
    Osc1,
    /// Oscillator 2
    Osc2,
    /// LFO 1
    Lfo1,
    /// LFO 2
    Lfo2,
    /// LFO 3
    Lfo3,
}

impl TableTarget {
    /// Number of slots.
    pub const COUNT: usize = 5;

    /// All targets in slot order.
    pub const ALL: [TableTarget; Self::COUNT] = [
        TableTarget::Osc1,
        TableTarget::Osc2,
        TableTarget::Lfo1,
        TableTarget::Lfo2,
        TableTarget::Lfo3,
    ];

    /// The three LFO targets, in LFO order.
    pub const LFOS: [TableTarget; 3] = [TableTarget::Lfo1, TableTarget::Lfo2, TableTarget::Lfo3];

    /// Slot index.
    pub fn index(self) -> usize {
        self as usize
    }

    /// Lowercase name, as used in config files.
    pub fn name(self) -> &'static str {
        match self {
            TableTarget::Osc1 => "osc1",
            TableTarget::Osc2 => "osc2",
            TableTarget::Lfo1 => "lfo1",
            TableTarget::Lfo2 => "lfo2",
            TableTarget::Lfo3 => "lfo3",
        }
    }
}

impl fmt::Display for TableTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for TableTarget {
    type Err = SynthError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        TableTarget::ALL
            .into_iter()
            .find(|target| target.name().eq_ignore_ascii_case(s))
            .ok_or_else(|| SynthError::UnknownTarget(s.to_string()))
    }
}

struct Slot {
    vector: ArcSwap<WaveTableVector>,
    loading: AtomicUsize,
}

impl Slot {
    fn new(vector: WaveTableVector) -> Self {
        Self {
            vector: ArcSwap::from_pointee(vector),
            loading: AtomicUsize::new(0),
        }
    }
}

/// Shared handle to the five published wavetable vectors.
///
/// Cloning is cheap; every clone sees the same slots.
#[derive(Clone)]
pub struct WaveBank {
    slots: Arc<[Slot; TableTarget::COUNT]>,
}

impl Default for WaveBank {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for WaveBank {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut list = f.debug_map();
        for target in TableTarget::ALL {
            list.entry(&target.name(), &self.table_count(target));
        }
        list.finish()
    }
}

impl WaveBank {
    /// Create a bank with a single sine table in every slot.
    pub fn new() -> Self {
        Self {
            slots: Arc::new(core::array::from_fn(|_| {
                Slot::new(WaveTableVector::from_tables(vec![BasicShape::Sine.table()]))
            })),
        }
    }

    /// Create a bank with no tables. Every slot renders silence until loaded.
    pub fn empty() -> Self {
        Self {
            slots: Arc::new(core::array::from_fn(|_| Slot::new(WaveTableVector::new()))),
        }
    }

    /// Load source buffers into `target` and return its new table count.
    ///
    /// One buffer is appended to the slot's current vector (replacing the
    /// last table once the vector is full). Several buffers replace the
    /// vector. The slot reads as loading until this returns, including
    /// while another thread's load into the same slot is still running.
    /// Concurrent appends all land; of concurrent replacements the last
    /// one published wins.
    pub fn load_from_buffers<B: AsRef<[f32]>>(
        &self,
        target: TableTarget,
        buffers: &[B],
    ) -> Result<usize, SynthError> {
        let guard = self.begin_load(target);
        match buffers {
            [] => Err(SynthError::NoBuffers),
            [single] => Ok(guard.append(WaveTable::from_buffer(single.as_ref())?)),
            _ => Ok(guard.publish(WaveTableVector::from_buffers(buffers)?)),
        }
    }

    /// Replace `target` with one table per shape.
    pub fn load_shapes(
        &self,
        target: TableTarget,
        shapes: &[BasicShape],
    ) -> Result<usize, SynthError> {
        if shapes.is_empty() {
            return Err(SynthError::NoBuffers);
        }
        let guard = self.begin_load(target);
        let tables = shapes.iter().map(|shape| shape.table()).collect();
        Ok(guard.publish(WaveTableVector::from_tables(tables)))
    }

    /// Mark `target` as loading until the returned guard is published or dropped.
    pub fn begin_load(&self, target: TableTarget) -> LoadGuard<'_> {
        let slot = &self.slots[target.index()];
        slot.loading.fetch_add(1, Ordering::AcqRel);
        LoadGuard { slot, target }
    }

    /// Whether `target` has no load in progress.
    pub fn is_finished_loading(&self, target: TableTarget) -> bool {
        self.slots[target.index()].loading.load(Ordering::Acquire) == 0
    }

    /// Whether no slot has a load in progress.
    pub fn all_loaded(&self) -> bool {
        TableTarget::ALL
            .into_iter()
            .all(|target| self.is_finished_loading(target))
    }

    /// The vector currently published for `target`.
    pub fn vector(&self, target: TableTarget) -> Arc<WaveTableVector> {
        self.slots[target.index()].vector.load_full()
    }

    /// Number of tables currently published for `target`.
    pub fn table_count(&self, target: TableTarget) -> usize {
        self.slots[target.index()].vector.load().len()
    }

    /// Wait-free snapshot of every slot that is not loading.
    ///
    /// Taken by the audio thread once per block.
    pub fn block_tables(&self) -> BlockTables {
        BlockTables {
            slots: core::array::from_fn(|i| {
                let slot = &self.slots[i];
                if slot.loading.load(Ordering::Acquire) > 0 {
                    None
                } else {
                    Some(slot.vector.load())
                }
            }),
        }
    }
}

/// An in-progress load. The slot reads as loading while this is alive.
#[must_use = "dropping the guard ends the load without publishing"]
pub struct LoadGuard<'a> {
    slot: &'a Slot,
    target: TableTarget,
}

impl LoadGuard<'_> {
    /// Publish `vector` and end the load. Returns the new table count.
    pub fn publish(self, vector: WaveTableVector) -> usize {
        let count = vector.len();
        self.slot.vector.store(Arc::new(vector));
        #[cfg(feature = "tracing")]
        tracing::debug!(slot = %self.target, tables = count, "wavetable published");
        count
    }

    /// Append `table` to whatever is published when the swap happens and
    /// end the load. Returns the new table count.
    pub fn append(self, table: WaveTable) -> usize {
        let previous = self.slot.vector.rcu(|current| {
            let mut vector = WaveTableVector::clone(current);
            vector.push(table.clone());
            vector
        });
        let count = (previous.len() + 1).min(MAX_TABLES);
        #[cfg(feature = "tracing")]
        tracing::debug!(slot = %self.target, tables = count, "wavetable appended");
        count
    }

    /// Target this load writes to.
    pub fn target(&self) -> TableTarget {
        self.target
    }
}

impl Drop for LoadGuard<'_> {
    fn drop(&mut self) {
        self.slot.loading.fetch_sub(1, Ordering::AcqRel);
    }
}

/// Per-block view of the published tables.
pub struct BlockTables {
    slots: [Option<Guard<Arc<WaveTableVector>>>; TableTarget::COUNT],
}

impl BlockTables {
    /// The vector for `target`, or `None` while it is loading.
    #[inline]
    pub fn get(&self, target: TableTarget) -> Option<&WaveTableVector> {
        self.slots[target.index()].as_deref().map(|vector| vector.as_ref())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::wavetable::{MAX_TABLES, TABLE_SIZE};

    #[test]
    fn new_bank_is_seeded_with_sine() {
        let bank = WaveBank::new();
        for target in TableTarget::ALL {
            assert_eq!(bank.table_count(target), 1);
            assert!(bank.is_finished_loading(target));
        }
        let quarter = bank.vector(TableTarget::Lfo2).sample_at(TABLE_SIZE as f32 / 4.0, 0.0);
        assert!((quarter - 1.0).abs() < 1e-6);
    }

    #[test]
    fn single_buffer_appends_multi_replaces() {
        let bank = WaveBank::new();
        let saw = BasicShape::Saw.render(TABLE_SIZE);
        assert_eq!(bank.load_from_buffers(TableTarget::Osc2, &[saw.clone()]).unwrap(), 2);
        assert_eq!(bank.load_from_buffers(TableTarget::Osc2, &[saw.clone()]).unwrap(), 3);

        let set = [saw.clone(), saw];
        assert_eq!(bank.load_from_buffers(TableTarget::Osc2, &set).unwrap(), 2);
        // Other slots untouched
        assert_eq!(bank.table_count(TableTarget::Osc1), 1);
    }

    #[test]
    fn single_buffer_load_replaces_last_when_full() {
        let bank = WaveBank::new();
        let shapes = vec![BasicShape::Sine; MAX_TABLES];
        assert_eq!(bank.load_shapes(TableTarget::Lfo1, &shapes).unwrap(), MAX_TABLES);

        let dc = vec![0.5f32; 16];
        assert_eq!(bank.load_from_buffers(TableTarget::Lfo1, &[dc]).unwrap(), MAX_TABLES);
        let last = bank.vector(TableTarget::Lfo1).get(MAX_TABLES - 1).unwrap().sample_at(3.0);
        assert_eq!(last, 0.5);
    }

    #[test]
    fn failed_load_keeps_vector_and_clears_flag() {
        let bank = WaveBank::new();
        let empty: [Vec<f32>; 1] = [Vec::new()];
        assert_eq!(
            bank.load_from_buffers(TableTarget::Osc1, &empty),
            Err(SynthError::EmptyBuffer { index: 0 })
        );
        let none: [Vec<f32>; 0] = [];
        assert_eq!(
            bank.load_from_buffers(TableTarget::Osc1, &none),
            Err(SynthError::NoBuffers)
        );
        assert_eq!(bank.table_count(TableTarget::Osc1), 1);
        assert!(bank.all_loaded());
    }

    #[test]
    fn loading_slot_is_hidden_from_block_view() {
        let bank = WaveBank::new();
        let guard = bank.begin_load(TableTarget::Osc2);
        assert!(!bank.is_finished_loading(TableTarget::Osc2));
        assert!(!bank.all_loaded());

        let view = bank.block_tables();
        assert!(view.get(TableTarget::Osc1).is_some());
        assert!(view.get(TableTarget::Osc2).is_none());

        drop(guard);
        assert!(bank.block_tables().get(TableTarget::Osc2).is_some());
    }

    #[test]
    fn overlapping_loads_keep_slot_hidden() {
        let bank = WaveBank::new();
        let first = bank.begin_load(TableTarget::Lfo3);
        let second = bank.begin_load(TableTarget::Lfo3);
        drop(first);
        assert!(!bank.is_finished_loading(TableTarget::Lfo3));
        assert!(bank.block_tables().get(TableTarget::Lfo3).is_none());

        second.publish(WaveTableVector::new());
        assert!(bank.is_finished_loading(TableTarget::Lfo3));
    }

    #[test]
    fn concurrent_appends_all_land() {
        let bank = WaveBank::new();
        let handles: Vec<_> = (0..4)
            .map(|i| {
                let bank = bank.clone();
                std::thread::spawn(move || {
                    for _ in 0..5 {
                        let buffer = vec![i as f32 * 0.1; 64];
                        bank.load_from_buffers(TableTarget::Osc1, &[buffer]).unwrap();
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }
        assert_eq!(bank.table_count(TableTarget::Osc1), 21);
        assert!(bank.all_loaded());
    }

    #[test]
    fn clones_share_slots() {
        let bank = WaveBank::new();
        let other = bank.clone();
        other
            .load_shapes(TableTarget::Lfo3, &[BasicShape::Square, BasicShape::Saw])
            .unwrap();
        assert_eq!(bank.table_count(TableTarget::Lfo3), 2);
    }

    #[test]
    fn block_view_outlives_publication() {
        let bank = WaveBank::new();
        let view = bank.block_tables();
        bank.load_shapes(TableTarget::Osc1, &[BasicShape::Saw, BasicShape::Square])
            .unwrap();
        // The view keeps the vector it started the block with
        assert_eq!(view.get(TableTarget::Osc1).unwrap().len(), 1);
        assert_eq!(bank.table_count(TableTarget::Osc1), 2);
    }

    #[test]
    fn target_names_round_trip() {
        for target in TableTarget::ALL {
            assert_eq!(target.to_string().parse::<TableTarget>(), Ok(target));
        }
        assert_eq!(
            "osc3".parse::<TableTarget>(),
            Err(SynthError::UnknownTarget("osc3".into()))
        );
    }
}
