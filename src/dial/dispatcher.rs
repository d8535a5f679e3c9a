use super::{
    button::{ButtonAction, ButtonClassifier, ButtonSignal},
    config::{DialConfig, KeyMapMode},
    encoder::{EncoderTracker, RotationDirection},
    keys::HidKey,
    shift::ShiftLatch,
    zone::{classify_zone, TouchPhase, TouchSample, TouchZone},
};

const RIGHT_CHAR: u8 = b'd';
const LEFT_CHAR: u8 = b'a';

/// Key transitions towards the host.
///
/// Implementations settle for a short fixed time after every transition so
/// the host registers each edge.
#[allow(async_fn_in_trait)]
pub trait HidSink {
    async fn press(&mut self, key: HidKey);
    async fn release(&mut self, key: HidKey);

    async fn write(&mut self, key: HidKey) {
        self.press(key).await;
        self.release(key).await;
    }
}

pub trait ZoneRenderer {
    fn render_zones(&mut self, pressed: TouchZone, shift_locked: bool);
}

/// One snapshot of every raw input, taken at the top of a poll.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct DialSample {
    pub now_ms: u64,
    pub touch: TouchSample,
    pub encoder_position: i32,
    pub button: ButtonSignal,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DialNotice {
    EscapeSent,
    ShiftToggled {
        locked: bool,
    },
    Rotated {
        direction: RotationDirection,
        delta: i32,
        steps: u32,
    },
    EnterClicked {
        held_ms: u64,
    },
    DeleteRepeatStarted,
}

#[derive(Clone, Copy, Debug, Default)]
pub struct DialReport {
    pub notices: [Option<DialNotice>; 4],
    pub renders: u8,
}

impl DialReport {
    fn notice(&mut self, notice: DialNotice) {
        for slot in &mut self.notices {
            if slot.is_none() {
                *slot = Some(notice);
                return;
            }
        }
    }
}

pub struct DialDispatcher {
    config: DialConfig,
    encoder: EncoderTracker,
    shift: ShiftLatch,
    button: ButtonClassifier,
    last_zone: TouchZone,
}

impl DialDispatcher {
    pub fn new(config: DialConfig, initial_encoder_position: i32) -> Self {
        Self {
            config,
            encoder: EncoderTracker::with_ticks_per_step(
                initial_encoder_position,
                config.ticks_per_step,
            ),
            shift: ShiftLatch::new(),
            button: ButtonClassifier::new(config.long_press_ms, config.delete_repeat_ms),
            last_zone: TouchZone::None,
        }
    }

    pub fn config(&self) -> &DialConfig {
        &self.config
    }

    pub fn shift_locked(&self) -> bool {
        self.shift.is_armed()
    }

    pub fn last_zone(&self) -> TouchZone {
        self.last_zone
    }

    pub fn encoder_baseline(&self) -> i32 {
        self.encoder.baseline()
    }

    pub fn render_current<R: ZoneRenderer>(&self, renderer: &mut R) {
        renderer.render_zones(self.last_zone, self.shift.is_armed());
    }

    pub async fn tick<H, R>(
        &mut self,
        sample: DialSample,
        hid: &mut H,
        renderer: &mut R,
    ) -> DialReport
    where
        H: HidSink,
        R: ZoneRenderer,
    {
        let mut report = DialReport::default();

        // Touch edges run first so a Shift tap arms the latch before this
        // poll's rotation or click consumes it.
        self.process_touch(sample.touch, hid, renderer, &mut report).await;
        self.process_encoder(sample.encoder_position, hid, renderer, &mut report)
            .await;
        self.process_button(sample.now_ms, sample.button, hid, renderer, &mut report)
            .await;

        report
    }

    async fn process_touch<H, R>(
        &mut self,
        touch: TouchSample,
        hid: &mut H,
        renderer: &mut R,
        report: &mut DialReport,
    ) where
        H: HidSink,
        R: ZoneRenderer,
    {
        let zone = classify_zone(touch, self.config.display_width);
        let begin = touch.phase == TouchPhase::Begin;
        let mut render = touch.phase == TouchPhase::End;

        if zone != self.last_zone {
            self.last_zone = zone;
            render = true;
        }

        if begin && zone == TouchZone::Shift {
            let locked = self.shift.toggle();
            report.notice(DialNotice::ShiftToggled { locked });
            render = true;
        }

        // The face shows the pressed zone before its key goes out.
        if render {
            self.render(renderer, report);
        }

        if begin && zone == TouchZone::Escape {
            tap(hid, HidKey::Escape).await;
            report.notice(DialNotice::EscapeSent);
        }
    }

    async fn process_encoder<H, R>(
        &mut self,
        position: i32,
        hid: &mut H,
        renderer: &mut R,
        report: &mut DialReport,
    ) where
        H: HidSink,
        R: ZoneRenderer,
    {
        let motion = self.encoder.update(position);
        let Some(direction) = motion.direction else {
            return;
        };

        let (ch, arrow) = match direction {
            RotationDirection::Clockwise => (RIGHT_CHAR, HidKey::RightArrow),
            RotationDirection::CounterClockwise => (LEFT_CHAR, HidKey::DownArrow),
        };

        for _ in 0..motion.steps {
            // Re-checked per step: the latch clears after the first character.
            if self.shift.is_armed() {
                self.emit_printable(ch, hid, renderer, report).await;
                continue;
            }
            match self.config.key_map {
                KeyMapMode::Arrows => tap(hid, arrow).await,
                KeyMapMode::Letters => hid.write(HidKey::Char(ch)).await,
            }
        }

        report.notice(DialNotice::Rotated {
            direction,
            delta: motion.delta,
            steps: motion.steps,
        });
    }

    async fn process_button<H, R>(
        &mut self,
        now_ms: u64,
        signal: ButtonSignal,
        hid: &mut H,
        renderer: &mut R,
        report: &mut DialReport,
    ) where
        H: HidSink,
        R: ZoneRenderer,
    {
        let output = self.button.tick(now_ms, signal);
        for action in output.actions.into_iter().flatten() {
            match action {
                ButtonAction::Click { held_ms } => {
                    self.emit_printable(b'\n', hid, renderer, report).await;
                    report.notice(DialNotice::EnterClicked { held_ms });
                }
                ButtonAction::LongPress => {
                    tap(hid, HidKey::Delete).await;
                    report.notice(DialNotice::DeleteRepeatStarted);
                }
                ButtonAction::Repeat => tap(hid, HidKey::Delete).await,
            }
        }
    }

    /// Writes a printable key, wrapped in Shift when the latch is armed.
    async fn emit_printable<H, R>(
        &mut self,
        ch: u8,
        hid: &mut H,
        renderer: &mut R,
        report: &mut DialReport,
    ) where
        H: HidSink,
        R: ZoneRenderer,
    {
        if !self.shift.take() {
            hid.write(HidKey::Char(ch)).await;
            return;
        }

        hid.press(HidKey::LeftShift).await;
        hid.write(HidKey::Char(ch)).await;
        hid.release(HidKey::LeftShift).await;
        self.render(renderer, report);
    }

    fn render<R: ZoneRenderer>(&self, renderer: &mut R, report: &mut DialReport) {
        renderer.render_zones(self.last_zone, self.shift.is_armed());
        report.renders = report.renders.saturating_add(1);
    }
}

async fn tap<H: HidSink>(hid: &mut H, key: HidKey) {
    hid.press(key).await;
    hid.release(key).await;
}

#[cfg(test)]
mod tests;
