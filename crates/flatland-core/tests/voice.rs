//! Voice Cache Builder Tests

use flatland_core::voice::line_audio_path;
use flatland_core::{build_voice_cache, parse_script, ActorProfileRegistry, VoiceError};
use flatland_tts::{FlushReport, SilentSynthesizer, SpeechSynthesizer, TtsError, TtsResult, VoiceIdentity};
use std::path::{Path, PathBuf};

/// Records calls; writes the text itself as the "audio" on flush.
#[derive(Default)]
struct RecordingSynth {
    voice: VoiceIdentity,
    calls: Vec<String>,
    queued: Vec<(PathBuf, String)>,
    fail_flush: bool,
}

impl SpeechSynthesizer for RecordingSynth {
    fn select_voice(&mut self, identity: VoiceIdentity) {
        self.voice = identity;
    }

    fn render_to_file(&mut self, text: &str, output: &Path) -> TtsResult<()> {
        if text.contains("mumble") {
            return Err(TtsError::ProviderError("unintelligible".to_string()));
        }
        self.calls.push(format!("{:?}: {}", self.voice, text));
        self.queued.push((output.to_path_buf(), text.to_string()));
        Ok(())
    }

    fn flush(&mut self) -> TtsResult<FlushReport> {
        self.calls.push("flush".to_string());
        if self.fail_flush {
            return Err(TtsError::ProviderError("engine crashed".to_string()));
        }
        let queued = std::mem::take(&mut self.queued);
        for (path, text) in &queued {
            std::fs::write(path, text)?;
        }
        Ok(FlushReport {
            rendered: queued.len(),
            ..Default::default()
        })
    }
}

/// Each dialogue line gets a file named after its directive index, voiced
/// by the speaker's actor, with a single flush at the end.
#[test]
fn lines_are_voiced_then_flushed_once() {
    let dir = tempfile::tempdir().unwrap();
    let directives = parse_script("BARRY: Hi.\n[LAUGH]\nCARL: Yo.\nNARRATOR: Later.");
    let cast = ActorProfileRegistry::default();
    let mut synth = RecordingSynth::default();

    let cache = build_voice_cache(&directives, &cast, &mut synth, dir.path()).unwrap();

    assert_eq!(
        synth.calls,
        vec!["Primary: Hi.", "Secondary: Yo.", "Primary: Later.", "flush"]
    );
    assert_eq!(cache.len(), 3);
    assert!(cache.missing().is_empty());
    assert!(cache.get(1).is_none());

    let carl = cache.get(2).unwrap();
    assert_eq!(carl.path, line_audio_path(dir.path(), 2));
    assert_eq!(std::fs::read_to_string(&carl.path).unwrap(), "Yo.");
}

/// A line the engine rejects is skipped; the rest still render.
#[test]
fn rejected_line_is_missing() {
    let dir = tempfile::tempdir().unwrap();
    let directives = parse_script("BARRY: mumble mumble\nCARL: Speak up.");
    let mut synth = RecordingSynth::default();

    let cache = build_voice_cache(&directives, &ActorProfileRegistry::default(), &mut synth, dir.path()).unwrap();

    assert_eq!(cache.missing(), &[0]);
    assert!(cache.get(1).is_some());
}

/// A leftover file from an earlier run never stands in for a line.
#[test]
fn stale_files_are_removed() {
    let dir = tempfile::tempdir().unwrap();
    let stale = line_audio_path(dir.path(), 0);
    std::fs::write(&stale, b"old take").unwrap();

    let directives = parse_script("BARRY: Fresh line.");
    let mut synth = SilentSynthesizer::new();
    let cache = build_voice_cache(&directives, &ActorProfileRegistry::default(), &mut synth, dir.path()).unwrap();

    assert!(!stale.exists());
    assert!(cache.is_empty());
    assert_eq!(cache.missing(), &[0]);
}

/// A failing flush aborts the whole build.
#[test]
fn flush_failure_is_fatal() {
    let dir = tempfile::tempdir().unwrap();
    let directives = parse_script("BARRY: Hi.");
    let mut synth = RecordingSynth {
        fail_flush: true,
        ..Default::default()
    };

    let result = build_voice_cache(&directives, &ActorProfileRegistry::default(), &mut synth, dir.path());
    assert!(matches!(result, Err(VoiceError::Synthesis(_))));
}

/// The audio directory is created on demand.
#[test]
fn audio_dir_is_created() {
    let dir = tempfile::tempdir().unwrap();
    let audio_dir = dir.path().join("run").join("lines");
    let directives = parse_script("CARL: Hello?");
    let mut synth = RecordingSynth::default();

    let cache = build_voice_cache(&directives, &ActorProfileRegistry::default(), &mut synth, &audio_dir).unwrap();
    assert!(audio_dir.is_dir());
    assert_eq!(cache.len(), 1);
}

/// A long script with scattered rejections keeps every other line and
/// reports the rejected ones in order.
#[test]
fn long_script_keeps_line_order() {
    let dir = tempfile::tempdir().unwrap();
    let script: Vec<String> = (0..400)
        .map(|i| match i % 50 {
            7 => format!("BARRY: mumble {}", i),
            _ => format!("CARL: line {}", i),
        })
        .collect();
    let directives = parse_script(&script.join("\n"));
    let mut synth = RecordingSynth::default();

    let cache = build_voice_cache(&directives, &ActorProfileRegistry::default(), &mut synth, dir.path()).unwrap();

    let rejected: Vec<usize> = (0..400).filter(|i| i % 50 == 7).collect();
    assert_eq!(cache.missing(), rejected.as_slice());
    assert_eq!(cache.len(), 400 - rejected.len());
    assert_eq!(
        std::fs::read_to_string(&cache.get(399).unwrap().path).unwrap(),
        "line 399"
    );
}
