use std::collections::HashSet;

use glam::Vec2;
use serde::{Deserialize, Serialize};
use winit::keyboard::KeyCode;

/// Gameplay actions the character responds to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum InputAction {
    Jump,
    Sprint,
    Walk,
    Slide,
    Wallrun,
    Vault,
    Dash,
}

impl InputAction {
    pub const ALL: [InputAction; 7] = [
        InputAction::Jump,
        InputAction::Sprint,
        InputAction::Walk,
        InputAction::Slide,
        InputAction::Wallrun,
        InputAction::Vault,
        InputAction::Dash,
    ];
}

/// Phase of an action on a given frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TriggerEvent {
    /// First frame the action is held
    Started,
    /// Every frame the action is held, including the first
    Triggered,
    /// Frame the action was released
    Completed,
}

/// Keys bound to each action and to the move axes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct KeyBindings {
    pub forward: Vec<KeyCode>,
    pub back: Vec<KeyCode>,
    pub left: Vec<KeyCode>,
    pub right: Vec<KeyCode>,
    pub jump: Vec<KeyCode>,
    pub sprint: Vec<KeyCode>,
    pub walk: Vec<KeyCode>,
    pub slide: Vec<KeyCode>,
    pub wallrun: Vec<KeyCode>,
    pub vault: Vec<KeyCode>,
    pub dash: Vec<KeyCode>,
}

impl Default for KeyBindings {
    fn default() -> Self {
        Self {
            forward: vec![KeyCode::KeyW],
            back: vec![KeyCode::KeyS],
            left: vec![KeyCode::KeyA],
            right: vec![KeyCode::KeyD],
            jump: vec![KeyCode::Space],
            sprint: vec![KeyCode::ShiftLeft],
            walk: vec![KeyCode::AltLeft],
            slide: vec![KeyCode::KeyC, KeyCode::ControlLeft],
            wallrun: vec![KeyCode::KeyE],
            vault: vec![KeyCode::KeyF],
            dash: vec![KeyCode::KeyQ],
        }
    }
}

impl KeyBindings {
    pub fn keys_for(&self, action: InputAction) -> &[KeyCode] {
        match action {
            InputAction::Jump => &self.jump,
            InputAction::Sprint => &self.sprint,
            InputAction::Walk => &self.walk,
            InputAction::Slide => &self.slide,
            InputAction::Wallrun => &self.wallrun,
            InputAction::Vault => &self.vault,
            InputAction::Dash => &self.dash,
        }
    }
}

/// Input resolved for one frame: move axis, look delta and action phases.
#[derive(Debug, Clone, Default)]
pub struct InputFrame {
    /// x = strafe right, y = forward
    pub move_axis: Vec2,
    pub look_delta: Vec2,
    pub actions: Vec<(InputAction, TriggerEvent)>,
}

impl InputFrame {
    pub fn has(&self, action: InputAction, event: TriggerEvent) -> bool {
        self.actions.contains(&(action, event))
    }
}

pub struct InputState {
    pressed_keys: HashSet<KeyCode>,
    just_pressed: HashSet<KeyCode>,
    just_released: HashSet<KeyCode>,
    mouse_delta: (f32, f32),
}

impl InputState {
    pub fn new() -> Self {
        Self {
            pressed_keys: HashSet::new(),
            just_pressed: HashSet::new(),
            just_released: HashSet::new(),
            mouse_delta: (0.0, 0.0),
        }
    }

    pub fn handle_key_press(&mut self, key: KeyCode) {
        if self.pressed_keys.insert(key) {
            self.just_pressed.insert(key);
        }
    }

    pub fn handle_key_release(&mut self, key: KeyCode) {
        if self.pressed_keys.remove(&key) {
            self.just_released.insert(key);
        }
    }

    pub fn handle_mouse_move(&mut self, dx: f32, dy: f32) {
        self.mouse_delta.0 += dx;
        self.mouse_delta.1 += dy;
    }

    pub fn consume_mouse_delta(&mut self) -> (f32, f32) {
        let delta = self.mouse_delta;
        self.mouse_delta = (0.0, 0.0);
        delta
    }

    pub fn is_pressed(&self, key: KeyCode) -> bool {
        self.pressed_keys.contains(&key)
    }

    fn any_pressed(&self, keys: &[KeyCode]) -> bool {
        keys.iter().any(|&k| self.is_pressed(k))
    }

    fn axis(&self, positive: &[KeyCode], negative: &[KeyCode]) -> f32 {
        let mut value = 0.0;
        if self.any_pressed(positive) {
            value += 1.0;
        }
        if self.any_pressed(negative) {
            value -= 1.0;
        }
        value
    }

    /// Resolve the bindings against the current key state. Consumes the mouse delta.
    pub fn frame(&mut self, bindings: &KeyBindings) -> InputFrame {
        let (dx, dy) = self.consume_mouse_delta();
        let move_axis = Vec2::new(
            self.axis(&bindings.right, &bindings.left),
            self.axis(&bindings.forward, &bindings.back),
        );

        let mut actions = Vec::new();
        for action in InputAction::ALL {
            let keys = bindings.keys_for(action);
            let started = keys.iter().any(|k| self.just_pressed.contains(k));
            let held = self.any_pressed(keys);
            let released = keys.iter().any(|k| self.just_released.contains(k));

            if started {
                actions.push((action, TriggerEvent::Started));
            }
            if held {
                actions.push((action, TriggerEvent::Triggered));
            }
            if released && !held {
                actions.push((action, TriggerEvent::Completed));
            }
        }

        InputFrame {
            move_axis,
            look_delta: Vec2::new(dx, dy),
            actions,
        }
    }

    /// Forget per-frame edges; call once the frame has been simulated.
    pub fn end_frame(&mut self) {
        self.just_pressed.clear();
        self.just_released.clear();
    }
}

impl Default for InputState {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn move_axis_from_wasd() {
        let bindings = KeyBindings::default();
        let mut input = InputState::new();
        input.handle_key_press(KeyCode::KeyW);
        input.handle_key_press(KeyCode::KeyD);
        let frame = input.frame(&bindings);
        assert_eq!(frame.move_axis, Vec2::new(1.0, 1.0));

        input.handle_key_press(KeyCode::KeyA);
        let frame = input.frame(&bindings);
        assert_eq!(frame.move_axis, Vec2::new(0.0, 1.0));
    }

    #[test]
    fn action_phases_follow_key_edges() {
        let bindings = KeyBindings::default();
        let mut input = InputState::new();

        input.handle_key_press(KeyCode::Space);
        let frame = input.frame(&bindings);
        assert!(frame.has(InputAction::Jump, TriggerEvent::Started));
        assert!(frame.has(InputAction::Jump, TriggerEvent::Triggered));
        input.end_frame();

        let frame = input.frame(&bindings);
        assert!(!frame.has(InputAction::Jump, TriggerEvent::Started));
        assert!(frame.has(InputAction::Jump, TriggerEvent::Triggered));
        input.end_frame();

        input.handle_key_release(KeyCode::Space);
        let frame = input.frame(&bindings);
        assert!(frame.has(InputAction::Jump, TriggerEvent::Completed));
        assert!(!frame.has(InputAction::Jump, TriggerEvent::Triggered));
    }

    #[test]
    fn second_binding_keeps_action_held() {
        let bindings = KeyBindings::default();
        let mut input = InputState::new();
        input.handle_key_press(KeyCode::KeyC);
        input.handle_key_press(KeyCode::ControlLeft);
        input.end_frame();
        input.handle_key_release(KeyCode::KeyC);
        let frame = input.frame(&bindings);
        assert!(!frame.has(InputAction::Slide, TriggerEvent::Completed));
        assert!(frame.has(InputAction::Slide, TriggerEvent::Triggered));
    }

    #[test]
    fn mouse_delta_is_consumed() {
        let bindings = KeyBindings::default();
        let mut input = InputState::new();
        input.handle_mouse_move(3.0, -2.0);
        input.handle_mouse_move(1.0, 0.0);
        assert_eq!(input.frame(&bindings).look_delta, Vec2::new(4.0, -2.0));
        assert_eq!(input.frame(&bindings).look_delta, Vec2::ZERO);
    }

    #[test]
    fn bindings_deserialize_from_json() {
        let bindings: KeyBindings = serde_json::from_str(r#"{ "jump": ["KeyJ"] }"#).unwrap();
        assert_eq!(bindings.jump, vec![KeyCode::KeyJ]);
        assert_eq!(bindings.forward, vec![KeyCode::KeyW]);
    }
}
