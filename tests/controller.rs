use std::sync::{Arc, Mutex};

use read_to_me_lib::engine::scripted::{EngineCommand, ScriptedEngine};
use read_to_me_lib::engine::Voice;
use read_to_me_lib::playback::{EngineEvents, PlaybackState, SpeakOptions, SpeechController};

type Log = Arc<Mutex<Vec<String>>>;

fn setup() -> (Arc<ScriptedEngine>, SpeechController, EngineEvents) {
    let engine = Arc::new(ScriptedEngine::with_voices(vec![
        Voice::new("Alice", "en-US"),
        Voice::new("Bob", "en-GB"),
    ]));
    let (controller, events) = SpeechController::new(engine.clone());
    (engine, controller, events)
}

/// Options that log every callback into `log`
fn logged(log: &Log, tag: &str) -> SpeakOptions {
    let words = log.clone();
    let ends = log.clone();
    let word_tag = tag.to_string();
    let end_tag = tag.to_string();
    SpeakOptions::default()
        .on_word_change(move |word, index| {
            words.lock().unwrap().push(format!("{}:word:{}:{}", word_tag, word, index));
        })
        .on_end(move || ends.lock().unwrap().push(format!("{}:end", end_tag)))
}

fn entries(log: &Log) -> Vec<String> {
    log.lock().unwrap().clone()
}

#[test]
fn reads_a_sentence_word_by_word() {
    let (engine, mut controller, mut events) = setup();
    let log = Log::default();

    controller.speak("The quick brown fox", logged(&log, "a").rate(1.0)).unwrap();
    engine.fire_word(4);
    controller.drain(&mut events);
    engine.fire_word(16);
    controller.drain(&mut events);
    engine.finish();
    controller.drain(&mut events);

    assert_eq!(entries(&log), vec!["a:word:quick:1", "a:word:fox:3", "a:end"]);
    assert!(!controller.is_currently_playing());
    assert_eq!(controller.state(), PlaybackState::Idle);
}

#[test]
fn unknown_voice_falls_back_to_default() {
    let (engine, mut controller, _events) = setup();

    let result = controller.speak("Hello world", SpeakOptions::default().voice("nonexistent-voice"));

    assert!(result.is_ok());
    let sent = engine.last_utterance().unwrap();
    assert_eq!(sent.text, "Hello world");
    assert_eq!(sent.voice, None);
    assert_eq!(controller.session().unwrap().voice_id(), Some("nonexistent-voice"));
}

#[test]
fn new_speak_supersedes_without_ending_previous() {
    let (engine, mut controller, mut events) = setup();
    let log = Log::default();

    controller.speak("first text", logged(&log, "1")).unwrap();
    controller.speak("second text", logged(&log, "2")).unwrap();
    controller.speak("third text", logged(&log, "3")).unwrap();
    controller.drain(&mut events);

    assert!(entries(&log).is_empty());
    assert_eq!(controller.current_text(), "third text");
    assert_eq!(controller.state(), PlaybackState::Speaking);

    engine.finish();
    controller.drain(&mut events);
    assert_eq!(entries(&log), vec!["3:end"]);
}

#[test]
fn late_events_from_superseded_utterance_are_ignored() {
    let (_engine, mut controller, mut events) = setup();
    let log = Log::default();

    let old = controller.speak("old words here", logged(&log, "old")).unwrap();
    controller.speak("new words", logged(&log, "new")).unwrap();

    controller.handle_event(read_to_me_lib::engine::EngineEvent::Boundary {
        utterance: old,
        kind: read_to_me_lib::engine::BoundaryKind::Word,
        char_offset: 9,
    });
    controller.handle_event(read_to_me_lib::engine::EngineEvent::Completed { utterance: old });
    controller.drain(&mut events);

    assert!(entries(&log).is_empty());
    assert_eq!(controller.word_index(), 0);
    assert!(controller.is_currently_playing());
}

#[test]
fn word_index_never_decreases_for_ordered_boundaries() {
    let (engine, mut controller, mut events) = setup();
    let indices = Arc::new(Mutex::new(Vec::new()));
    let sink = indices.clone();
    let text = "Reading  aloud is\tnice when the text is long enough";

    controller
        .speak(text, SpeakOptions::default().on_word_change(move |_, i| sink.lock().unwrap().push(i)))
        .unwrap();
    for offset in [0, 0, 3, 9, 10, 17, 18, 30, 30, 51, 80] {
        engine.fire_word(offset);
    }
    controller.drain(&mut events);

    let indices = indices.lock().unwrap();
    assert_eq!(indices.len(), 11);
    assert!(indices.windows(2).all(|w| w[0] <= w[1]), "{:?}", indices);
    assert_eq!(*indices.last().unwrap(), controller.words().len() - 1);
}

#[test]
fn skipped_boundaries_are_tolerated() {
    let (engine, mut controller, mut events) = setup();

    controller.speak("one two three four five", SpeakOptions::default()).unwrap();
    engine.fire_word(14);
    controller.drain(&mut events);

    assert_eq!(controller.word_index(), 3);
}

#[test]
fn stop_clears_state_and_is_idempotent() {
    let (engine, mut controller, mut events) = setup();
    let log = Log::default();

    controller.stop();
    assert_eq!(controller.state(), PlaybackState::Idle);

    controller.speak("some words to read", logged(&log, "s")).unwrap();
    engine.fire_word(5);
    controller.drain(&mut events);

    controller.stop();
    let after_first = (
        controller.current_text().to_string(),
        controller.words().to_vec(),
        controller.word_index(),
        controller.is_currently_playing(),
    );
    controller.stop();
    controller.drain(&mut events);

    assert_eq!(after_first, (String::new(), Vec::<String>::new(), 0, false));
    assert_eq!(controller.current_text(), "");
    assert!(controller.words().is_empty());
    assert_eq!(controller.word_index(), 0);
    assert!(!controller.is_currently_playing());
    assert_eq!(entries(&log), vec!["s:word:words:1"]);
}

#[test]
fn change_rate_restarts_from_current_word() {
    let (engine, mut controller, mut events) = setup();
    let log = Log::default();

    controller.speak("one two three four", logged(&log, "r").voice("Bob")).unwrap();
    engine.fire_word(4);
    controller.drain(&mut events);

    let restarted = controller.change_rate(1.5).unwrap();

    assert!(restarted.is_some());
    let sent = engine.last_utterance().unwrap();
    assert_eq!(sent.text, "two three four");
    assert_eq!(sent.rate, 1.5);
    assert_eq!(sent.voice, Some(Voice::new("Bob", "en-GB")));
    assert_eq!(controller.word_index(), 0);
    assert!(controller.is_currently_playing());

    // callbacks carry over to the restarted text
    engine.fire_word(4);
    engine.finish();
    controller.drain(&mut events);
    assert_eq!(entries(&log), vec!["r:word:two:1", "r:word:three:1", "r:end"]);
}

#[test]
fn change_rate_keeps_paused_sessions_paused() {
    let (engine, mut controller, _events) = setup();

    controller.speak("one two three", SpeakOptions::default()).unwrap();
    controller.pause();
    controller.change_rate(0.75).unwrap();

    assert_eq!(controller.state(), PlaybackState::Paused);
    let commands = engine.commands();
    assert!(matches!(commands[commands.len() - 2], EngineCommand::Speak(_)));
    assert_eq!(commands.last(), Some(&EngineCommand::Pause));
}

#[test]
fn change_rate_without_session_does_nothing() {
    let (engine, mut controller, _events) = setup();

    assert!(controller.change_rate(1.5).unwrap().is_none());
    assert!(engine.spoken().is_empty());
}

#[test]
fn pause_and_resume_keep_progress() {
    let (engine, mut controller, mut events) = setup();

    controller.speak("alpha beta gamma", SpeakOptions::default()).unwrap();
    engine.fire_word(6);
    controller.drain(&mut events);

    controller.pause();
    assert_eq!(controller.state(), PlaybackState::Paused);
    controller.resume();

    assert_eq!(controller.word_index(), 1);
    assert_eq!(controller.current_text(), "alpha beta gamma");
    assert!(controller.is_currently_playing());
    let tail: Vec<_> = engine.commands().into_iter().rev().take(2).collect();
    assert_eq!(tail, vec![EngineCommand::Resume, EngineCommand::Pause]);
}

#[test]
fn toggle_flips_between_playing_and_paused() {
    let (_engine, mut controller, _events) = setup();

    controller.toggle_play_pause();
    assert!(!controller.is_currently_playing());

    controller.speak("toggle me", SpeakOptions::default()).unwrap();
    controller.toggle_play_pause();
    assert!(!controller.is_currently_playing());
    controller.toggle_play_pause();
    assert!(controller.is_currently_playing());
}

#[test]
fn stopped_session_never_ends() {
    let (engine, mut controller, mut events) = setup();
    let log = Log::default();

    controller.speak("cut short", logged(&log, "c")).unwrap();
    controller.stop();
    engine.finish();
    controller.drain(&mut events);

    assert!(entries(&log).is_empty());
}

#[test]
fn whitespace_only_text_is_a_single_token() {
    let (engine, mut controller, mut events) = setup();
    let log = Log::default();

    controller.speak("   ", logged(&log, "w")).unwrap();
    engine.fire_word(2);
    controller.drain(&mut events);

    assert_eq!(controller.words(), ["   ".to_string()]);
    assert_eq!(controller.word_index(), 0);
    assert_eq!(entries(&log), vec!["w:word:   :0"]);
}

#[tokio::test]
async fn run_until_idle_applies_events_until_completion() {
    let (engine, mut controller, mut events) = setup();
    let ended = Arc::new(Mutex::new(0));
    let counter = ended.clone();

    controller
        .speak("short text", SpeakOptions::default().on_end(move || *counter.lock().unwrap() += 1))
        .unwrap();
    engine.fire_word(6);
    engine.finish();
    controller.run_until_idle(&mut events).await;

    assert_eq!(*ended.lock().unwrap(), 1);
    assert_eq!(controller.state(), PlaybackState::Idle);
}

#[tokio::test]
async fn listing_voices_does_not_block_speaking() {
    let engine = Arc::new(ScriptedEngine::new());
    let (mut controller, _events) = SpeechController::new(engine.clone());

    let pending = tokio::spawn(controller.list_voices());
    controller.speak("no voices yet", SpeakOptions::default().voice("Alice")).unwrap();
    assert_eq!(engine.last_utterance().unwrap().voice, None);

    engine.publish_voices(vec![Voice::new("Alice", "en-US")]);
    assert_eq!(pending.await.unwrap(), vec![Voice::new("Alice", "en-US")]);

    controller.speak("now with voice", SpeakOptions::default().voice("Alice")).unwrap();
    assert_eq!(engine.last_utterance().unwrap().voice, Some(Voice::new("Alice", "en-US")));
}
