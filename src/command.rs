//! Control-event routing
//!
//! Front-ends (a window loop, a script, a test) feed discrete events in; the
//! core never polls an input source itself.

use serde::{Deserialize, Serialize};

use crate::settings::CrtMode;
use crate::sim::{SimControl, TickInput};

/// Discrete control events
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ControlEvent {
    /// Shorter launch interval
    Faster,
    /// Longer launch interval
    Slower,
    /// Default launch interval
    ResetIntensity,
    /// Salvo of surface and submarine launches
    Burst,
    TogglePause,
    CycleCrtMode,
    ToggleFullscreen,
    Quit,
}

impl ControlEvent {
    /// Default keyboard binding, using DOM-style key names
    pub fn from_key(key: &str) -> Option<Self> {
        match key {
            "ArrowUp" | "Up" => Some(ControlEvent::Faster),
            "ArrowDown" | "Down" => Some(ControlEvent::Slower),
            "r" | "R" => Some(ControlEvent::ResetIntensity),
            " " | "Space" => Some(ControlEvent::Burst),
            "p" | "P" => Some(ControlEvent::TogglePause),
            "c" | "C" => Some(ControlEvent::CycleCrtMode),
            "f" | "F" => Some(ControlEvent::ToggleFullscreen),
            "Escape" | "q" | "Q" => Some(ControlEvent::Quit),
            _ => None,
        }
    }
}

/// Collects events between ticks
///
/// Simulation controls queue up, in order, for the next `TickInput`. Display state
/// (CRT mode, fullscreen, quit) is kept here for the front-end to apply.
#[derive(Debug, Clone, Default)]
pub struct CommandCenter {
    pending: TickInput,
    crt_mode: CrtMode,
    fullscreen: bool,
    quit: bool,
}

impl CommandCenter {
    pub fn new(crt_mode: CrtMode) -> Self {
        Self {
            crt_mode,
            ..Self::default()
        }
    }

    pub fn handle(&mut self, event: ControlEvent) {
        log::debug!("Control event: {:?}", event);
        match event {
            ControlEvent::Faster => self.pending.controls.push(SimControl::Faster),
            ControlEvent::Slower => self.pending.controls.push(SimControl::Slower),
            ControlEvent::ResetIntensity => self.pending.controls.push(SimControl::ResetIntensity),
            ControlEvent::Burst => self.pending.controls.push(SimControl::Burst),
            // Two toggles before a tick cancel out
            ControlEvent::TogglePause => self.pending.toggle_pause = !self.pending.toggle_pause,
            ControlEvent::CycleCrtMode => {
                self.crt_mode = self.crt_mode.next();
                log::info!("CRT mode requested: {}", self.crt_mode.as_str());
            }
            ControlEvent::ToggleFullscreen => {
                self.fullscreen = !self.fullscreen;
                log::info!("Fullscreen: {}", self.fullscreen);
            }
            ControlEvent::Quit => self.quit = true,
        }
    }

    /// Handle a key press; unbound keys are ignored
    pub fn handle_key(&mut self, key: &str) -> Option<ControlEvent> {
        let event = ControlEvent::from_key(key)?;
        self.handle(event);
        Some(event)
    }

    /// Controls for the next tick, leaving the queue empty
    pub fn take_input(&mut self) -> TickInput {
        std::mem::take(&mut self.pending)
    }

    pub fn crt_mode(&self) -> CrtMode {
        self.crt_mode
    }

    /// Sync with the mode the renderer actually applied
    pub fn set_crt_mode(&mut self, mode: CrtMode) {
        self.crt_mode = mode;
    }

    pub fn is_fullscreen(&self) -> bool {
        self.fullscreen
    }

    pub fn should_quit(&self) -> bool {
        self.quit
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::{SimConfig, SimState, tick};

    #[test]
    fn test_sim_controls_accumulate_once() {
        let mut cc = CommandCenter::new(CrtMode::Full);
        cc.handle(ControlEvent::Burst);
        cc.handle(ControlEvent::Faster);
        let input = cc.take_input();
        assert_eq!(input.controls, vec![SimControl::Burst, SimControl::Faster]);
        assert!(cc.take_input().is_empty());
    }

    #[test]
    fn test_same_frame_repeats_are_kept() {
        let mut cc = CommandCenter::default();
        cc.handle(ControlEvent::Burst);
        cc.handle(ControlEvent::Burst);
        cc.handle(ControlEvent::Faster);
        cc.handle(ControlEvent::Faster);

        let config = SimConfig {
            aircraft_count: 0,
            ..SimConfig::default()
        };
        let mut state = SimState::new(17, config);
        state.time_since_launch = 0.0;
        let report = tick(&mut state, &cc.take_input(), 1.0 / 60.0);
        assert_eq!(report.launched, 16);
        assert_eq!(state.launch_interval, 1.0);
    }

    #[test]
    fn test_double_pause_cancels() {
        let mut cc = CommandCenter::default();
        cc.handle(ControlEvent::TogglePause);
        cc.handle(ControlEvent::TogglePause);
        assert!(!cc.take_input().toggle_pause);
    }

    #[test]
    fn test_display_controls() {
        let mut cc = CommandCenter::new(CrtMode::Off);
        cc.handle(ControlEvent::CycleCrtMode);
        assert_eq!(cc.crt_mode(), CrtMode::Light);
        cc.handle(ControlEvent::ToggleFullscreen);
        assert!(cc.is_fullscreen());
        assert!(!cc.should_quit());
        cc.handle(ControlEvent::Quit);
        assert!(cc.should_quit());
        // Display events never reach the simulation
        assert!(cc.take_input().is_empty());
    }

    #[test]
    fn test_key_bindings() {
        let mut cc = CommandCenter::default();
        assert_eq!(cc.handle_key("ArrowUp"), Some(ControlEvent::Faster));
        assert_eq!(cc.handle_key(" "), Some(ControlEvent::Burst));
        assert_eq!(cc.handle_key("x"), None);
        assert_eq!(ControlEvent::from_key("Escape"), Some(ControlEvent::Quit));
        let input = cc.take_input();
        assert_eq!(input.controls, vec![SimControl::Faster, SimControl::Burst]);
    }
}
