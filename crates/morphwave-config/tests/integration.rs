//! Integration tests for morphwave-config.
//!
//! These tests go from TOML files on disk to rendered audio.

use morphwave_config::{ConfigError, EngineConfig, ValidationError, parse_assignment};
use morphwave_synth::{BasicShape, Synth, TableTarget, midi_to_freq};
use tempfile::TempDir;

fn render_mono<const N: usize>(synth: &mut Synth<N>, notes: &[u8], samples: usize) -> Vec<f32> {
    for &note in notes {
        synth.note_on(note, 100, midi_to_freq(note));
    }
    let mut out = vec![0.0f32; samples];
    for start in (0..samples).step_by(256) {
        let num = 256.min(samples - start);
        synth.render_block(&mut [&mut out[..]], start, num);
    }
    out
}

/// Save, reload and compare a config with non-default values in every section.
#[test]
fn test_save_load_roundtrip() {
    let temp_dir = TempDir::new().expect("should create temp dir");
    let path = temp_dir.path().join("patches").join("pad.toml");

    let mut config = EngineConfig::default();
    config.render.sample_rate = 44100;
    config.render.channels = 1;
    config.tables.osc1 = vec![BasicShape::Triangle, BasicShape::Square];
    for assignment in ["osc1.wave=0.5", "osc1.wave.lfo_source=1", "env1.attack=30ms"] {
        let (path, value) = parse_assignment(assignment).expect("valid assignment");
        config.set_param(&path, value).expect("known parameter");
    }

    config.save(&path).expect("should save config");
    assert!(path.exists(), "save should create parent directories");

    let loaded = EngineConfig::load(&path).expect("should load config");
    assert_eq!(loaded, config);
    assert_eq!(loaded.params.oscillators[0].wave.lfo_source, 1);
}

/// A hand-written file that only touches a few keys.
#[test]
fn test_load_partial_file() {
    let temp_dir = TempDir::new().expect("should create temp dir");
    let path = temp_dir.path().join("bright.toml");
    std::fs::write(
        &path,
        r#"
[render]
master_gain = 0.5

[tables]
osc2 = ["square", "saw"]

[params.filter]
mode = 0

[params.filter.freq]
value = 180.0
"#,
    )
    .expect("should write file");

    let config = EngineConfig::load(&path).expect("should load");
    assert_eq!(config.render.master_gain, 0.5);
    assert_eq!(config.render.block_size, 512);
    assert_eq!(config.tables.get(TableTarget::Osc2).len(), 2);
    assert_eq!(config.params.filter.mode, 0);
    assert_eq!(config.params.filter.freq.value, 180.0);
    assert!(config.validate().is_ok());
}

#[test]
fn test_load_missing_file() {
    let temp_dir = TempDir::new().expect("should create temp dir");
    let result = EngineConfig::load(temp_dir.path().join("nope.toml"));
    assert!(matches!(result, Err(ConfigError::ReadFile { .. })));
}

#[test]
fn test_malformed_toml() {
    assert!(matches!(
        EngineConfig::from_toml("[render\nsample_rate = 48000"),
        Err(ConfigError::TomlParse(_))
    ));
    assert!(matches!(
        EngineConfig::from_toml("[render]\nsample_rate = \"fast\""),
        Err(ConfigError::TomlParse(_))
    ));
}

/// Out-of-range values parse fine but fail validation with the offending path.
#[test]
fn test_out_of_range_file_fails_validation() {
    let config = EngineConfig::from_toml(
        r#"
[params.filter.res]
value = 1.5
"#,
    )
    .expect("should parse");

    match config.validate() {
        Err(ConfigError::Validation(ValidationError::OutOfRange { param, value, .. })) => {
            assert_eq!(param, "filter.res");
            assert_eq!(value, 1.5);
        }
        other => panic!("expected out-of-range error, got {other:?}"),
    }
    assert!(config.build_synth::<4>().is_err());
}

/// A config-built synth makes sound and tracks its render settings.
#[test]
fn test_build_synth_renders() {
    let config = EngineConfig::from_toml(
        r#"
[[params.envelopes]]
attack = 0.005
decay = 0.05
sustain = 0.7
release = 0.1

[[params.envelopes]]

[[params.envelopes]]
"#,
    )
    .expect("should parse");
    assert_eq!(config.params.envelopes[0].attack, 0.005);
    assert_eq!(config.params.envelopes[1].sustain, 0.8);

    let mut synth: Synth<4> = config.build_synth().expect("should build");
    assert_eq!(synth.sample_rate(), 48000.0);
    assert!(synth.bank().all_loaded());

    let out = render_mono(&mut synth, &[60, 64, 67], 4800);
    assert!(out.iter().all(|s| s.is_finite()));
    assert!(out.iter().any(|&s| s.abs() > 0.01));
    assert_eq!(synth.active_voice_count(), 3);
}

/// Master gain from the file applies from the first sample.
#[test]
fn test_master_gain_applies_immediately() {
    let mut loud = EngineConfig::default();
    loud.params.envelopes[0].attack = 0.0;
    let mut quiet = loud.clone();
    quiet.render.master_gain = 0.5;

    let a = render_mono(&mut loud.build_synth::<4>().unwrap(), &[57], 1024);
    let b = render_mono(&mut quiet.build_synth::<4>().unwrap(), &[57], 1024);
    for (x, y) in a.iter().zip(&b) {
        assert_eq!(*x * 0.5, *y);
    }
}

/// Overrides that name unknown parameters surface as engine errors.
#[test]
fn test_unknown_override() {
    let mut config = EngineConfig::default();
    let (path, value) = parse_assignment("lfo4.rate=2").expect("well formed");
    assert!(matches!(
        config.set_param(&path, value),
        Err(ConfigError::Synth(_))
    ));
}
