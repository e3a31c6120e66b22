//! Procedural single-cycle waveforms.
//!
//! Stand-ins for wavetables loaded from audio files: tests, benches, the
//! config crate and the CLI build tables from these.

use core::f32::consts::TAU;
use core::fmt;
use core::str::FromStr;

use crate::error::SynthError;
use crate::wavetable::{TABLE_SIZE, WaveTable};

/// Basic single-cycle waveform shapes.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum BasicShape {
    /// Sine wave
    Sine,
    /// Triangle wave, starting at zero and rising
    Triangle,
    /// Rising sawtooth from -1 to 1
    Saw,
    /// 50% duty square wave
    Square,
}

impl BasicShape {
    /// All shapes in menu order.
    pub const ALL: [BasicShape; 4] = [
        BasicShape::Sine,
        BasicShape::Triangle,
        BasicShape::Saw,
        BasicShape::Square,
    ];

    /// Lowercase name, as used in config files.
    pub fn name(self) -> &'static str {
        match self {
            BasicShape::Sine => "sine",
            BasicShape::Triangle => "triangle",
            BasicShape::Saw => "saw",
            BasicShape::Square => "square",
        }
    }

    /// Value at `phase` in `[0, 1)`.
    pub fn value_at(self, phase: f32) -> f32 {
        match self {
            BasicShape::Sine => libm::sinf(TAU * phase),
            BasicShape::Triangle => {
                if phase < 0.25 {
                    4.0 * phase
                } else if phase < 0.75 {
                    2.0 - 4.0 * phase
                } else {
                    4.0 * phase - 4.0
                }
            }
            BasicShape::Saw => 2.0 * phase - 1.0,
            BasicShape::Square => {
                if phase < 0.5 {
                    1.0
                } else {
                    -1.0
                }
            }
        }
    }

    /// Render one cycle into `len` samples.
    pub fn render(self, len: usize) -> Vec<f32> {
        (0..len)
            .map(|i| self.value_at(i as f32 / len as f32))
            .collect()
    }

    /// One cycle as a full-size wavetable.
    pub fn table(self) -> WaveTable {
        WaveTable::from_fn(|i| self.value_at(i as f32 / TABLE_SIZE as f32))
    }
}

impl fmt::Display for BasicShape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for BasicShape {
    type Err = SynthError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        BasicShape::ALL
            .into_iter()
            .find(|shape| shape.name().eq_ignore_ascii_case(s))
            .ok_or_else(|| SynthError::UnknownShape(s.to_string()))
    }
}
