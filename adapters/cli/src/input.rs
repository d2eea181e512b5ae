use clap::ValueEnum;
use glam::Vec2;
use monster_couch_core::InputSource;

/// Radians the orbit script turns per input sample.
const ORBIT_STEP: f32 = 0.02;

/// Movement patterns available to a headless run.
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub(crate) enum InputScript {
    /// The player stands still.
    Idle,
    /// The player walks east until it reaches the wall.
    East,
    /// The player walks in a slow circle.
    Orbit,
}

/// Scripted stand-in for a gamepad or keyboard.
#[derive(Clone, Debug)]
pub(crate) struct ScriptedInput {
    script: InputScript,
    angle: f32,
}

impl ScriptedInput {
    pub(crate) fn new(script: InputScript) -> Self {
        Self { script, angle: 0.0 }
    }
}

impl InputSource for ScriptedInput {
    fn read(&mut self) -> Vec2 {
        match self.script {
            InputScript::Idle => Vec2::ZERO,
            InputScript::East => Vec2::X,
            InputScript::Orbit => {
                self.angle = (self.angle + ORBIT_STEP) % std::f32::consts::TAU;
                Vec2::new(-self.angle.sin(), self.angle.cos())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn orbit_input_stays_unit_length_and_turns() {
        let mut input = ScriptedInput::new(InputScript::Orbit);
        let first = input.read();
        let second = input.read();

        assert!((first.length() - 1.0).abs() < 1e-5);
        assert!((second.length() - 1.0).abs() < 1e-5);
        assert_ne!(first, second);
    }

    #[test]
    fn idle_input_is_zero() {
        assert_eq!(ScriptedInput::new(InputScript::Idle).read(), Vec2::ZERO);
    }
}
