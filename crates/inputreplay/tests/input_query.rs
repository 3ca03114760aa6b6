// Test module - relaxed lint rules
#![allow(clippy::default_trait_access)]
#![allow(clippy::indexing_slicing)]
#![allow(clippy::unreadable_literal)]
#![allow(clippy::cast_lossless)]
#![allow(clippy::panic)]
#![allow(clippy::manual_assert)]
#![allow(clippy::uninlined_format_args)]
#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]
#![allow(clippy::cast_possible_truncation)]
#![allow(missing_docs)]

//! Query interface tests
//!
//! Keyboard lookups, joypad bindings, the whole-pad bitmask, and port rules.

use inputreplay::keycodes;
use inputreplay::{
    parse_script, Bindings, Device, EngineConfig, JoypadButton, QueryError, ReplayEngine,
    ScriptOptions, JOYPAD_MASK,
};

fn engine_pressing(keys: &[u32], config: EngineConfig) -> ReplayEngine {
    let entries: Vec<String> = keys
        .iter()
        .map(|key| format!(r#"{{"frame":0,"action":1,"param_num":{}}}"#, key))
        .collect();
    let script = format!("[{}]", entries.join(","));
    let parsed = parse_script(script.as_bytes(), &ScriptOptions::from(&config));
    let mut engine = ReplayEngine::from_parsed(parsed, config);
    engine.advance(1);
    engine
}

fn joypad() -> u32 {
    Device::Joypad.id()
}

fn keyboard() -> u32 {
    Device::Keyboard.id()
}

#[test]
fn keyboard_query_reads_key_code_directly() {
    let engine = engine_pressing(&[keycodes::RETURN], EngineConfig::default());
    assert_eq!(engine.query(0, keyboard(), 0, keycodes::RETURN), 1);
    assert_eq!(engine.query(0, keyboard(), 0, keycodes::Z), 0);
}

#[test]
fn joypad_query_follows_default_bindings() {
    let engine = engine_pressing(&[keycodes::X, keycodes::UP], EngineConfig::default());
    assert_eq!(
        engine.query(0, joypad(), 0, JoypadButton::A.index() as u32),
        1
    );
    assert_eq!(
        engine.query(0, joypad(), 0, JoypadButton::Up.index() as u32),
        1
    );
    assert_eq!(
        engine.query(0, joypad(), 0, JoypadButton::B.index() as u32),
        0
    );
}

#[test]
fn joypad_mask_sets_one_bit_per_pressed_control() {
    let engine = engine_pressing(
        &[keycodes::Z, keycodes::RETURN, keycodes::X],
        EngineConfig::default(),
    );
    let mask = engine.query(0, joypad(), 0, JOYPAD_MASK);
    let expected = (1 << JoypadButton::B.index())
        | (1 << JoypadButton::Start.index())
        | (1 << JoypadButton::A.index());
    assert_eq!(mask, expected);
}

#[test]
fn joypad_mask_is_zero_without_input() {
    let engine = engine_pressing(&[], EngineConfig::default());
    assert_eq!(engine.query(0, joypad(), 0, JOYPAD_MASK), 0);
}

#[test]
fn highest_control_sets_the_sign_bit() {
    let config = EngineConfig {
        bindings: Bindings::unbound().with(JoypadButton::R3, 50),
        ..EngineConfig::default()
    };
    let engine = engine_pressing(&[50], config);
    let mask = engine.query(0, joypad(), 0, JOYPAD_MASK);
    assert_eq!(mask, i16::MIN);
}

#[test]
fn unbound_controls_never_report_pressed() {
    let config = EngineConfig {
        bindings: Bindings::unbound(),
        ..EngineConfig::default()
    };
    let engine = engine_pressing(&[keycodes::Z], config);
    assert_eq!(engine.query(0, joypad(), 0, JOYPAD_MASK), 0);
    assert_eq!(engine.query(0, joypad(), 0, 0), 0);
    assert_eq!(engine.query(0, keyboard(), 0, keycodes::Z), 1);
}

#[test]
fn keymap_translates_bound_keys() {
    let config = EngineConfig {
        bindings: Bindings::unbound().with(JoypadButton::Start, 1),
        ..EngineConfig::default()
    };
    let engine = engine_pressing(&[101], config).with_keymap(|key: u32| key + 100);
    assert_eq!(
        engine.query(0, joypad(), 0, JoypadButton::Start.index() as u32),
        1
    );
}

#[test]
fn other_ports_read_as_no_input() {
    let engine = engine_pressing(&[keycodes::Z], EngineConfig::default());
    assert_eq!(engine.query(1, keyboard(), 0, keycodes::Z), 0);
    assert_eq!(engine.query(1, joypad(), 0, JOYPAD_MASK), 0);
    assert_eq!(
        engine.try_query(1, keyboard(), 0, keycodes::Z),
        Err(QueryError::UnsupportedPort(1))
    );
}

#[test]
fn unsupported_devices_are_reported() {
    let engine = engine_pressing(&[keycodes::Z], EngineConfig::default());
    let mouse = Device::Mouse.id();
    assert_eq!(engine.query(0, mouse, 0, 0), 0);
    assert_eq!(
        engine.try_query(0, mouse, 0, 0),
        Err(QueryError::UnsupportedDevice(mouse))
    );
    assert_eq!(
        engine.try_query(0, 99, 0, 0),
        Err(QueryError::UnsupportedDevice(99))
    );
}

#[test]
fn capabilities_advertise_joypad_and_keyboard() {
    let engine = engine_pressing(&[], EngineConfig::default());
    let caps = engine.capabilities();
    assert_ne!(caps & (1 << Device::Joypad.id()), 0);
    assert_ne!(caps & (1 << Device::Keyboard.id()), 0);
    assert_eq!(caps & (1 << Device::Mouse.id()), 0);
}

#[test]
fn shutdown_path_clears_state_via_reset() {
    let mut engine = engine_pressing(&[keycodes::Z], EngineConfig::default());
    assert_eq!(engine.query(0, joypad(), 0, JOYPAD_MASK), 1);
    engine.reset();
    assert_eq!(engine.query(0, joypad(), 0, JOYPAD_MASK), 0);
}
