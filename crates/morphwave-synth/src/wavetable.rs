//! Single-cycle wavetables and morphable table vectors.
//!
//! A [`WaveTable`] always holds exactly [`TABLE_SIZE`] samples; sources of any
//! other length are linearly resampled when they are loaded. A
//! [`WaveTableVector`] stacks tables and blends between neighbours by a
//! continuous wave position, which is how a voice morphs timbre.
//!
//! Both types are built on the control thread and only read on the audio
//! thread. Publishing a new vector to running voices goes through
//! [`WaveBank`](crate::WaveBank).

use morphwave_core::lerp;

use crate::error::SynthError;

/// Samples per wavetable.
pub const TABLE_SIZE: usize = 2048;

/// Maximum number of tables in one [`WaveTableVector`].
pub const MAX_TABLES: usize = 100;

/// One cycle of a waveform, `TABLE_SIZE` samples long.
///
/// # Example
///
/// ```rust
/// use morphwave_synth::{TABLE_SIZE, WaveTable};
///
/// // A 4-sample ramp is stretched over the full table
/// let table = WaveTable::from_buffer(&[0.0, 0.25, 0.5, 0.75]).unwrap();
/// assert_eq!(table.samples().len(), TABLE_SIZE);
/// assert_eq!(table.sample_at(0.0), 0.0);
/// assert!((table.sample_at(TABLE_SIZE as f32 / 2.0) - 0.5).abs() < 1e-6);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct WaveTable {
    samples: Box<[f32]>,
}

impl Default for WaveTable {
    fn default() -> Self {
        Self::new()
    }
}

impl WaveTable {
    /// Create a silent table.
    pub fn new() -> Self {
        Self {
            samples: vec![0.0; TABLE_SIZE].into_boxed_slice(),
        }
    }

    /// Create a table from a generator called once per sample index.
    pub fn from_fn(f: impl FnMut(usize) -> f32) -> Self {
        Self {
            samples: (0..TABLE_SIZE).map(f).collect(),
        }
    }

    /// Create a table from a source buffer of any non-zero length.
    pub fn from_buffer(buffer: &[f32]) -> Result<Self, SynthError> {
        let mut table = Self::new();
        table.replace_contents(buffer)?;
        Ok(table)
    }

    /// Replace the table's contents with `buffer`, resampled to `TABLE_SIZE`.
    ///
    /// Output sample `i` reads the source at `i · len / TABLE_SIZE` with
    /// linear interpolation; the upper neighbour wraps around the source so
    /// the cycle stays continuous.
    pub fn replace_contents(&mut self, buffer: &[f32]) -> Result<(), SynthError> {
        if buffer.is_empty() {
            return Err(SynthError::EmptyBuffer { index: 0 });
        }

        if buffer.len() == TABLE_SIZE {
            self.samples.copy_from_slice(buffer);
            return Ok(());
        }

        let len = buffer.len();
        let ratio = len as f32 / TABLE_SIZE as f32;
        for (i, out) in self.samples.iter_mut().enumerate() {
            let pos = i as f32 * ratio;
            let i0 = (pos as usize).min(len - 1);
            let i1 = (i0 + 1) % len;
            *out = lerp(buffer[i0], buffer[i1], pos - i0 as f32);
        }
        Ok(())
    }

    /// Linearly interpolated read at a fractional index in `[0, TABLE_SIZE)`.
    ///
    /// The neighbour of the last sample is sample 0.
    #[inline]
    pub fn sample_at(&self, index: f32) -> f32 {
        let i0 = (index as usize).min(TABLE_SIZE - 1);
        let i1 = if i0 + 1 == TABLE_SIZE { 0 } else { i0 + 1 };
        let frac = index - i0 as f32;
        lerp(self.samples[i0], self.samples[i1], frac)
    }

    /// Raw samples, for visualization.
    pub fn samples(&self) -> &[f32] {
        &self.samples
    }
}

/// An ordered stack of wavetables blended by wave position.
///
/// Position `p` reads table `floor(p)` and the next one, weighted by the
/// fractional part. Past the last table the blend wraps to table 0.
///
/// # Example
///
/// ```rust
/// use morphwave_synth::{WaveTableVector, TABLE_SIZE};
///
/// let low = vec![0.0f32; TABLE_SIZE];
/// let high = vec![1.0f32; TABLE_SIZE];
/// let vector = WaveTableVector::from_buffers(&[low, high]).unwrap();
///
/// assert_eq!(vector.len(), 2);
/// assert_eq!(vector.sample_at(10.0, 0.25), 0.25);
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct WaveTableVector {
    tables: Vec<WaveTable>,
}

impl WaveTableVector {
    /// Create an empty vector. It renders silence.
    pub fn new() -> Self {
        Self { tables: Vec::new() }
    }

    /// Wrap already-built tables. Tables beyond `MAX_TABLES` are dropped.
    pub fn from_tables(mut tables: Vec<WaveTable>) -> Self {
        tables.truncate(MAX_TABLES);
        Self { tables }
    }

    /// Build a vector from source buffers, resampling each one.
    ///
    /// Buffers beyond `MAX_TABLES` are ignored.
    pub fn from_buffers<B: AsRef<[f32]>>(buffers: &[B]) -> Result<Self, SynthError> {
        if buffers.is_empty() {
            return Err(SynthError::NoBuffers);
        }
        let tables = buffers
            .iter()
            .take(MAX_TABLES)
            .enumerate()
            .map(|(index, buffer)| {
                WaveTable::from_buffer(buffer.as_ref())
                    .map_err(|_| SynthError::EmptyBuffer { index })
            })
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self { tables })
    }

    /// Append a table. A full vector has its last table replaced instead.
    pub fn push(&mut self, table: WaveTable) {
        if self.tables.len() >= MAX_TABLES {
            if let Some(last) = self.tables.last_mut() {
                *last = table;
            }
        } else {
            self.tables.push(table);
        }
    }

    /// Number of tables.
    pub fn len(&self) -> usize {
        self.tables.len()
    }

    /// Whether the vector holds no tables.
    pub fn is_empty(&self) -> bool {
        self.tables.is_empty()
    }

    /// Table at `index`, if present.
    pub fn get(&self, index: usize) -> Option<&WaveTable> {
        self.tables.get(index)
    }

    /// All tables in order.
    pub fn tables(&self) -> &[WaveTable] {
        &self.tables
    }

    /// Read sample `index` blended across tables at `wave_position`.
    ///
    /// `wave_position` is in table space: `0.0` is the first table and
    /// `len() - 1` the last.
    #[inline]
    pub fn sample_at(&self, index: f32, wave_position: f32) -> f32 {
        let count = self.tables.len();
        if count == 0 {
            return 0.0;
        }

        let floor = libm::floorf(wave_position);
        let frac = wave_position - floor;
        let lower = (floor as i64).rem_euclid(count as i64) as usize;
        let upper = if lower + 1 >= count { 0 } else { lower + 1 };

        let a = self.tables[lower].sample_at(index);
        if frac == 0.0 {
            return a;
        }
        lerp(a, self.tables[upper].sample_at(index), frac)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ramp() -> WaveTable {
        WaveTable::from_fn(|i| i as f32 / TABLE_SIZE as f32)
    }

    #[test]
    fn interpolates_between_neighbours() {
        let table = ramp();
        let step = 1.0 / TABLE_SIZE as f32;
        let got = table.sample_at(100.25);
        let expected = 100.0 * step + 0.25 * step;
        assert!((got - expected).abs() < 1e-7, "got {got}, expected {expected}");
    }

    #[test]
    fn last_index_wraps_to_first_sample() {
        let mut samples = vec![0.0; TABLE_SIZE];
        samples[0] = 1.0;
        samples[TABLE_SIZE - 1] = 0.0;
        let table = WaveTable::from_buffer(&samples).unwrap();

        // Halfway between the last sample (0.0) and sample 0 (1.0)
        let got = table.sample_at(TABLE_SIZE as f32 - 0.5);
        assert!((got - 0.5).abs() < 1e-6, "got {got}");
    }

    #[test]
    fn exact_length_buffer_is_copied() {
        let source: Vec<f32> = (0..TABLE_SIZE).map(|i| (i % 7) as f32).collect();
        let table = WaveTable::from_buffer(&source).unwrap();
        assert_eq!(table.samples(), source.as_slice());
    }

    #[test]
    fn longer_buffer_is_downsampled() {
        // 4096 samples -> every other sample
        let source: Vec<f32> = (0..TABLE_SIZE * 2).map(|i| i as f32).collect();
        let table = WaveTable::from_buffer(&source).unwrap();
        assert_eq!(table.samples()[0], 0.0);
        assert_eq!(table.samples()[1], 2.0);
        assert_eq!(table.samples()[TABLE_SIZE - 1], (TABLE_SIZE * 2 - 2) as f32);
    }

    #[test]
    fn shorter_buffer_wraps_while_upsampling() {
        let table = WaveTable::from_buffer(&[0.0, 1.0]).unwrap();
        // The final output samples blend the last source sample back into the first
        let last = table.samples()[TABLE_SIZE - 1];
        assert!(last < 0.01, "expected wrap toward 0.0, got {last}");
        assert_eq!(table.samples()[TABLE_SIZE / 2], 1.0);
    }

    #[test]
    fn empty_buffer_is_rejected() {
        assert_eq!(
            WaveTable::from_buffer(&[]),
            Err(SynthError::EmptyBuffer { index: 0 })
        );
        let buffers: [&[f32]; 2] = [&[1.0], &[]];
        assert_eq!(
            WaveTableVector::from_buffers(&buffers),
            Err(SynthError::EmptyBuffer { index: 1 })
        );
        let none: [&[f32]; 0] = [];
        assert_eq!(WaveTableVector::from_buffers(&none), Err(SynthError::NoBuffers));
    }

    #[test]
    fn vector_blends_and_wraps() {
        let buffers = [vec![0.0f32; 8], vec![1.0; 8], vec![2.0; 8]];
        let vector = WaveTableVector::from_buffers(&buffers).unwrap();

        assert_eq!(vector.sample_at(5.0, 0.0), 0.0);
        assert_eq!(vector.sample_at(5.0, 1.5), 1.5);
        assert_eq!(vector.sample_at(5.0, 2.0), 2.0);
        // Past the last table the blend heads back to table 0
        assert_eq!(vector.sample_at(5.0, 2.5), 1.0);
        // Negative positions wrap too
        assert_eq!(vector.sample_at(5.0, -1.0), 2.0);
    }

    #[test]
    fn empty_vector_is_silent() {
        assert_eq!(WaveTableVector::new().sample_at(12.0, 0.5), 0.0);
    }

    #[test]
    fn push_replaces_last_when_full() {
        let mut vector = WaveTableVector::new();
        for i in 0..MAX_TABLES {
            vector.push(WaveTable::from_fn(|_| i as f32));
        }
        assert_eq!(vector.len(), MAX_TABLES);

        vector.push(WaveTable::from_fn(|_| -1.0));
        assert_eq!(vector.len(), MAX_TABLES);
        assert_eq!(vector.get(MAX_TABLES - 1).unwrap().sample_at(0.0), -1.0);
        assert_eq!(vector.get(MAX_TABLES - 2).unwrap().sample_at(0.0), 98.0);
    }
}
