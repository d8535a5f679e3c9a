use statig::{blocking::IntoStateMachineExt as _, prelude::*};

use super::config::{BUTTON_DEBOUNCE_MS, DELETE_REPEAT_MS, LONG_PRESS_MS};

/// Debounced button edges for one polling tick.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ButtonSignal {
    pub was_pressed: bool,
    pub was_released: bool,
    pub is_pressed: bool,
}

impl ButtonSignal {
    pub const IDLE: Self = Self {
        was_pressed: false,
        was_released: false,
        is_pressed: false,
    };
    pub const PRESS: Self = Self {
        was_pressed: true,
        was_released: false,
        is_pressed: true,
    };
    pub const HOLD: Self = Self {
        was_pressed: false,
        was_released: false,
        is_pressed: true,
    };
    pub const RELEASE: Self = Self {
        was_pressed: false,
        was_released: true,
        is_pressed: false,
    };

    fn released(self) -> bool {
        self.was_released || !self.is_pressed
    }
}

/// Level-to-edge conversion with a settle window, fed from the raw GPIO level.
#[derive(Clone, Copy, Debug)]
pub struct ButtonEdgeTracker {
    debounce_ms: u64,
    stable_pressed: bool,
    candidate_pressed: bool,
    candidate_since_ms: u64,
}

impl Default for ButtonEdgeTracker {
    fn default() -> Self {
        Self::new(BUTTON_DEBOUNCE_MS)
    }
}

impl ButtonEdgeTracker {
    pub const fn new(debounce_ms: u64) -> Self {
        Self {
            debounce_ms,
            stable_pressed: false,
            candidate_pressed: false,
            candidate_since_ms: 0,
        }
    }

    pub fn observe(&mut self, now_ms: u64, level_pressed: bool) -> ButtonSignal {
        if level_pressed != self.candidate_pressed {
            self.candidate_pressed = level_pressed;
            self.candidate_since_ms = now_ms;
        }

        let mut signal = ButtonSignal {
            is_pressed: self.stable_pressed,
            ..ButtonSignal::IDLE
        };
        if self.candidate_pressed != self.stable_pressed
            && now_ms.saturating_sub(self.candidate_since_ms) >= self.debounce_ms
        {
            self.stable_pressed = self.candidate_pressed;
            signal.is_pressed = self.stable_pressed;
            signal.was_pressed = self.stable_pressed;
            signal.was_released = !self.stable_pressed;
        }
        signal
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ButtonAction {
    /// Released before the long-press threshold.
    Click { held_ms: u64 },
    /// Threshold crossed while held; first Delete of the repeat run.
    LongPress,
    /// Another period elapsed in repeat mode.
    Repeat,
}

#[derive(Clone, Copy, Debug, Default)]
pub struct ButtonOutput {
    pub actions: [Option<ButtonAction>; 2],
}

#[derive(Clone, Copy, Debug)]
enum ButtonHsmEvent {
    Sample { now_ms: u64, signal: ButtonSignal },
}

#[derive(Clone, Copy, Debug, Default)]
struct DispatchContext {
    actions: [Option<ButtonAction>; 2],
}

impl DispatchContext {
    fn emit(&mut self, action: ButtonAction) {
        for slot in &mut self.actions {
            if slot.is_none() {
                *slot = Some(action);
                return;
            }
        }
    }

    fn finish(self) -> ButtonOutput {
        ButtonOutput {
            actions: self.actions,
        }
    }
}

pub struct ButtonClassifier {
    machine: statig::blocking::StateMachine<ButtonHsm>,
}

impl Default for ButtonClassifier {
    fn default() -> Self {
        Self::new(LONG_PRESS_MS, DELETE_REPEAT_MS)
    }
}

impl ButtonClassifier {
    pub fn new(long_press_ms: u64, repeat_ms: u64) -> Self {
        Self {
            machine: ButtonHsm::new(long_press_ms, repeat_ms).state_machine(),
        }
    }

    pub fn tick(&mut self, now_ms: u64, signal: ButtonSignal) -> ButtonOutput {
        let mut context = DispatchContext::default();
        self.machine
            .handle_with_context(&ButtonHsmEvent::Sample { now_ms, signal }, &mut context);
        context.finish()
    }

    pub fn is_repeating(&self) -> bool {
        self.machine.inner().repeat_mode_active
    }
}

struct ButtonHsm {
    long_press_ms: u64,
    repeat_ms: u64,
    press_start_ms: Option<u64>,
    last_repeat_ms: Option<u64>,
    repeat_mode_active: bool,
}

impl ButtonHsm {
    fn new(long_press_ms: u64, repeat_ms: u64) -> Self {
        Self {
            long_press_ms,
            repeat_ms,
            press_start_ms: None,
            last_repeat_ms: None,
            repeat_mode_active: false,
        }
    }

    fn held_ms(&self, now_ms: u64) -> u64 {
        self.press_start_ms
            .map_or(0, |start| now_ms.saturating_sub(start))
    }

    fn end_press(&mut self) {
        self.press_start_ms = None;
        self.last_repeat_ms = None;
        self.repeat_mode_active = false;
    }
}

#[state_machine(initial = "State::idle()")]
impl ButtonHsm {
    #[state]
    fn idle(&mut self, context: &mut DispatchContext, event: &ButtonHsmEvent) -> Outcome<State> {
        match event {
            ButtonHsmEvent::Sample { now_ms, signal } => {
                if !signal.was_pressed {
                    return Handled;
                }

                self.press_start_ms = Some(*now_ms);
                if signal.released() {
                    // Down and up inside one poll.
                    context.emit(ButtonAction::Click { held_ms: 0 });
                    self.end_press();
                    return Handled;
                }
                Transition(State::pressed())
            }
        }
    }

    #[state]
    fn pressed(&mut self, context: &mut DispatchContext, event: &ButtonHsmEvent) -> Outcome<State> {
        match event {
            ButtonHsmEvent::Sample { now_ms, signal } => {
                let held_ms = self.held_ms(*now_ms);

                if signal.released() {
                    // A release that already shows the threshold never reached repeat
                    // mode while down, so it is neither a click nor a Delete.
                    if held_ms < self.long_press_ms {
                        context.emit(ButtonAction::Click { held_ms });
                    }
                    self.end_press();
                    return Transition(State::idle());
                }

                if held_ms >= self.long_press_ms {
                    self.repeat_mode_active = true;
                    self.last_repeat_ms = Some(*now_ms);
                    context.emit(ButtonAction::LongPress);
                    return Transition(State::long_held());
                }
                Handled
            }
        }
    }

    #[state]
    fn long_held(
        &mut self,
        context: &mut DispatchContext,
        event: &ButtonHsmEvent,
    ) -> Outcome<State> {
        match event {
            ButtonHsmEvent::Sample { now_ms, signal } => {
                if signal.released() {
                    self.end_press();
                    return Transition(State::idle());
                }

                let due = self
                    .last_repeat_ms
                    .is_none_or(|last| now_ms.saturating_sub(last) >= self.repeat_ms);
                if due {
                    self.last_repeat_ms = Some(*now_ms);
                    context.emit(ButtonAction::Repeat);
                }
                Handled
            }
        }
    }
}
