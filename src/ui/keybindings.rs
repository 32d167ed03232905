// src/ui/keybindings.rs
//! Keyboard input handling and key mappings.

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

/// Frequency change per key press, in Hz.
pub const FREQUENCY_STEP: f32 = 500.0;
/// Intensity factor change per key press.
pub const INTENSITY_STEP: f32 = 0.5;

/// Actions derived from key events.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ControlAction {
    ToggleLogScale,
    ToggleHue,
    ToggleLogIntensity,
    ToggleLabels,
    IntensityUp,
    IntensityDown,
    MinFrequencyDown,
    MinFrequencyUp,
    MaxFrequencyDown,
    MaxFrequencyUp,
    MoreTicks,
    FewerTicks,
    SpeedUp,
    SlowDown,
    LargerFft,
    SmallerFft,
    SaveSettings,
    TogglePause,
    Quit,
    None,
}

/// Convert a key event to a control action.
pub fn key_to_action(key: &KeyEvent) -> ControlAction {
    if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
        return ControlAction::Quit;
    }

    match key.code {
        KeyCode::Char('l') => ControlAction::ToggleLogScale,
        KeyCode::Char('c') => ControlAction::ToggleHue,
        KeyCode::Char('i') => ControlAction::ToggleLogIntensity,
        KeyCode::Char('a') => ControlAction::ToggleLabels,
        KeyCode::Char('+') | KeyCode::Char('=') => ControlAction::IntensityUp,
        KeyCode::Char('-') => ControlAction::IntensityDown,
        KeyCode::Char('[') => ControlAction::MinFrequencyDown,
        KeyCode::Char(']') => ControlAction::MinFrequencyUp,
        KeyCode::Char('{') => ControlAction::MaxFrequencyDown,
        KeyCode::Char('}') => ControlAction::MaxFrequencyUp,
        KeyCode::Char('T') => ControlAction::MoreTicks,
        KeyCode::Char('t') => ControlAction::FewerTicks,
        KeyCode::Right => ControlAction::SpeedUp,
        KeyCode::Left => ControlAction::SlowDown,
        KeyCode::Char('F') => ControlAction::LargerFft,
        KeyCode::Char('f') => ControlAction::SmallerFft,
        KeyCode::Char('w') => ControlAction::SaveSettings,
        KeyCode::Char(' ') => ControlAction::TogglePause,
        KeyCode::Char('q') | KeyCode::Esc => ControlAction::Quit,
        _ => ControlAction::None,
    }
}

/// One-line key reference for the status bar.
pub const HELP: &str = "l log  c hue  i log-int  +/- factor  [ ] min  { } max  t/T ticks  \
                        ←/→ speed  f/F fft  a labels  w save  space pause  q quit";

#[cfg(test)]
mod tests {
    use super::*;

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    #[test]
    fn toggles_and_steps() {
        assert_eq!(key_to_action(&key(KeyCode::Char('l'))), ControlAction::ToggleLogScale);
        assert_eq!(key_to_action(&key(KeyCode::Char('='))), ControlAction::IntensityUp);
        assert_eq!(key_to_action(&key(KeyCode::Char('}'))), ControlAction::MaxFrequencyUp);
        assert_eq!(key_to_action(&key(KeyCode::Left)), ControlAction::SlowDown);
        assert_eq!(key_to_action(&key(KeyCode::Char('F'))), ControlAction::LargerFft);
    }

    #[test]
    fn quit_keys() {
        assert_eq!(key_to_action(&key(KeyCode::Char('q'))), ControlAction::Quit);
        assert_eq!(key_to_action(&key(KeyCode::Esc)), ControlAction::Quit);
        let ctrl_c = KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL);
        assert_eq!(key_to_action(&ctrl_c), ControlAction::Quit);
        // Plain 'c' is the hue toggle.
        assert_eq!(key_to_action(&key(KeyCode::Char('c'))), ControlAction::ToggleHue);
    }

    #[test]
    fn unknown_keys_do_nothing() {
        assert_eq!(key_to_action(&key(KeyCode::Char('z'))), ControlAction::None);
        assert_eq!(key_to_action(&key(KeyCode::Tab)), ControlAction::None);
    }
}
