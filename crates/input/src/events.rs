use crate::action::Action;
use crate::bindings::{Key, KeyBindings};
use crate::state::InputState;
use std::collections::BTreeSet;
use std::sync::mpsc;

/// A raw key transition reported by the platform.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InputEvent {
    /// `repeat` is set for OS auto-repeat while the key stays down.
    KeyDown { key: Key, repeat: bool },
    KeyUp { key: Key },
}

impl InputEvent {
    pub fn down(key: impl Into<Key>) -> Self {
        Self::KeyDown {
            key: key.into(),
            repeat: false,
        }
    }

    pub fn up(key: impl Into<Key>) -> Self {
        Self::KeyUp { key: key.into() }
    }
}

/// Edge-triggered results of one drain.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FrameInput {
    /// A fresh jump key press arrived since the previous drain.
    pub jump: bool,
    /// Number of events applied.
    pub events: usize,
}

/// Producer half. Cheap to clone and safe to hand to other threads.
#[derive(Debug, Clone)]
pub struct InputSender {
    tx: mpsc::Sender<InputEvent>,
}

impl InputSender {
    /// Queue an event for the next tick. Returns false once the consumer is gone.
    pub fn send(&self, event: InputEvent) -> bool {
        self.tx.send(event).is_ok()
    }
}

/// Consumer half, owned by the frame loop.
#[derive(Debug)]
pub struct InputReceiver {
    rx: mpsc::Receiver<InputEvent>,
    /// Bound movement keys currently down. A direction stays held while any
    /// of its keys is in here.
    pressed: BTreeSet<Key>,
}

/// Create a connected sender/receiver pair.
pub fn input_channel() -> (InputSender, InputReceiver) {
    let (tx, rx) = mpsc::channel();
    (
        InputSender { tx },
        InputReceiver {
            rx,
            pressed: BTreeSet::new(),
        },
    )
}

impl InputReceiver {
    /// Apply every pending event, in arrival order, to `state`.
    pub fn drain_into(&mut self, bindings: &KeyBindings, state: &mut InputState) -> FrameInput {
        let mut frame = FrameInput::default();
        while let Ok(event) = self.rx.try_recv() {
            frame.events += 1;
            self.apply_event(event, bindings, state, &mut frame);
        }
        frame
    }

    fn apply_event(
        &mut self,
        event: InputEvent,
        bindings: &KeyBindings,
        state: &mut InputState,
        frame: &mut FrameInput,
    ) {
        let (key, down, repeat) = match event {
            InputEvent::KeyDown { key, repeat } => (key, true, repeat),
            InputEvent::KeyUp { key } => (key, false, false),
        };
        let Some(action) = bindings.action_for(&key) else {
            tracing::trace!(%key, "unbound key ignored");
            return;
        };
        let Some(direction) = action.direction() else {
            if action == Action::Jump && down && !repeat {
                frame.jump = true;
            }
            return;
        };
        if down {
            self.pressed.insert(key);
        } else {
            self.pressed.remove(&key);
        }
        let any_down = bindings.keys_for(action).any(|k| self.pressed.contains(k));
        state.set_held(direction, any_down);
    }
}
