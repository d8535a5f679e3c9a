use embassy_futures::block_on;

use super::*;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum HidOp {
    Press(HidKey),
    Release(HidKey),
    Write(HidKey),
}

#[derive(Default)]
struct RecordingSink {
    ops: std::vec::Vec<HidOp>,
}

impl HidSink for RecordingSink {
    async fn press(&mut self, key: HidKey) {
        self.ops.push(HidOp::Press(key));
    }

    async fn release(&mut self, key: HidKey) {
        self.ops.push(HidOp::Release(key));
    }

    async fn write(&mut self, key: HidKey) {
        self.ops.push(HidOp::Write(key));
    }
}

#[derive(Default)]
struct RecordingRenderer {
    renders: std::vec::Vec<(TouchZone, bool)>,
}

impl ZoneRenderer for RecordingRenderer {
    fn render_zones(&mut self, pressed: TouchZone, shift_locked: bool) {
        self.renders.push((pressed, shift_locked));
    }
}

struct Rig {
    dispatcher: DialDispatcher,
    hid: RecordingSink,
    renderer: RecordingRenderer,
    now_ms: u64,
    position: i32,
}

impl Rig {
    fn new(key_map: KeyMapMode) -> Self {
        Self {
            dispatcher: DialDispatcher::new(DialConfig::DEFAULT.with_key_map(key_map), 0),
            hid: RecordingSink::default(),
            renderer: RecordingRenderer::default(),
            now_ms: 0,
            position: 0,
        }
    }

    fn tick_with(&mut self, touch: TouchSample, button: ButtonSignal) -> DialReport {
        self.now_ms += 1;
        let sample = DialSample {
            now_ms: self.now_ms,
            touch,
            encoder_position: self.position,
            button,
        };
        block_on(
            self.dispatcher
                .tick(sample, &mut self.hid, &mut self.renderer),
        )
    }

    fn idle(&mut self) -> DialReport {
        self.tick_with(TouchSample::IDLE, ButtonSignal::IDLE)
    }

    fn rotate_to(&mut self, position: i32) -> DialReport {
        self.position = position;
        self.idle()
    }

    fn touch(&mut self, phase: TouchPhase, x: i32) -> DialReport {
        self.tick_with(TouchSample { phase, x, y: 120 }, ButtonSignal::IDLE)
    }

    fn tap_zone(&mut self, x: i32) {
        self.touch(TouchPhase::Begin, x);
        self.touch(TouchPhase::End, x);
        self.idle();
    }

    fn button(&mut self, signal: ButtonSignal) -> DialReport {
        self.tick_with(TouchSample::IDLE, signal)
    }

    fn clear(&mut self) {
        self.hid.ops.clear();
        self.renderer.renders.clear();
    }
}

fn shifted(ch: u8) -> [HidOp; 3] {
    [
        HidOp::Press(HidKey::LeftShift),
        HidOp::Write(HidKey::Char(ch)),
        HidOp::Release(HidKey::LeftShift),
    ]
}

fn notices(report: DialReport) -> std::vec::Vec<DialNotice> {
    report.notices.into_iter().flatten().collect()
}

#[test]
fn letter_mode_rotation_writes_plain_characters() {
    let mut rig = Rig::new(KeyMapMode::Letters);

    rig.rotate_to(0);
    rig.rotate_to(4);
    rig.rotate_to(8);

    assert_eq!(
        rig.hid.ops,
        std::vec![
            HidOp::Write(HidKey::Char(b'd')),
            HidOp::Write(HidKey::Char(b'd'))
        ]
    );
    assert_eq!(rig.dispatcher.encoder_baseline(), 8);
    assert!(rig.renderer.renders.is_empty());
}

#[test]
fn arrow_mode_maps_left_to_down_arrow() {
    let mut rig = Rig::new(KeyMapMode::Arrows);

    rig.rotate_to(4);
    rig.rotate_to(0);

    assert_eq!(
        rig.hid.ops,
        std::vec![
            HidOp::Press(HidKey::RightArrow),
            HidOp::Release(HidKey::RightArrow),
            HidOp::Press(HidKey::DownArrow),
            HidOp::Release(HidKey::DownArrow),
        ]
    );
}

#[test]
fn single_ticks_need_a_full_step() {
    let mut rig = Rig::new(KeyMapMode::Letters);

    for position in 1..=3 {
        rig.rotate_to(position);
    }
    assert!(rig.hid.ops.is_empty());

    let report = rig.rotate_to(4);
    assert_eq!(rig.hid.ops, std::vec![HidOp::Write(HidKey::Char(b'd'))]);
    assert_eq!(
        notices(report),
        std::vec![DialNotice::Rotated {
            direction: RotationDirection::Clockwise,
            delta: 4,
            steps: 1
        }]
    );
}

#[test]
fn shift_applies_to_first_character_of_a_batch_only() {
    let mut rig = Rig::new(KeyMapMode::Letters);
    rig.tap_zone(200);
    assert!(rig.dispatcher.shift_locked());
    rig.clear();

    rig.rotate_to(12);

    let mut expected = shifted(b'd').to_vec();
    expected.push(HidOp::Write(HidKey::Char(b'd')));
    expected.push(HidOp::Write(HidKey::Char(b'd')));
    assert_eq!(rig.hid.ops, expected);
    assert!(!rig.dispatcher.shift_locked());
    assert_eq!(rig.renderer.renders, std::vec![(TouchZone::None, false)]);
}

#[test]
fn shifted_rotation_in_arrow_mode_types_a_capital_then_arrows() {
    let mut rig = Rig::new(KeyMapMode::Arrows);
    rig.tap_zone(200);
    rig.clear();

    rig.rotate_to(-8);

    let mut expected = shifted(b'a').to_vec();
    expected.push(HidOp::Press(HidKey::DownArrow));
    expected.push(HidOp::Release(HidKey::DownArrow));
    assert_eq!(rig.hid.ops, expected);
}

#[test]
fn escape_zone_tap_sends_escape_and_keeps_latch() {
    let mut rig = Rig::new(KeyMapMode::Arrows);
    rig.tap_zone(200);
    rig.clear();

    let report = rig.touch(TouchPhase::Begin, 10);
    assert_eq!(
        rig.hid.ops,
        std::vec![
            HidOp::Press(HidKey::Escape),
            HidOp::Release(HidKey::Escape)
        ]
    );
    assert_eq!(notices(report), std::vec![DialNotice::EscapeSent]);
    assert!(rig.dispatcher.shift_locked());
    assert_eq!(rig.renderer.renders, std::vec![(TouchZone::Escape, true)]);
}

#[test]
fn shift_zone_tap_toggles_and_renders_lock_state() {
    let mut rig = Rig::new(KeyMapMode::Arrows);

    let report = rig.touch(TouchPhase::Begin, 180);
    assert_eq!(
        notices(report),
        std::vec![DialNotice::ShiftToggled { locked: true }]
    );
    assert_eq!(report.renders, 1);
    assert_eq!(rig.renderer.renders, std::vec![(TouchZone::Shift, true)]);

    rig.touch(TouchPhase::Hold, 182);
    assert_eq!(rig.renderer.renders.len(), 1);

    rig.touch(TouchPhase::End, 182);
    assert_eq!(
        rig.renderer.renders,
        std::vec![(TouchZone::Shift, true), (TouchZone::None, true)]
    );

    rig.touch(TouchPhase::Begin, 180);
    assert!(!rig.dispatcher.shift_locked());
    assert!(rig.hid.ops.is_empty());
}

#[test]
fn dragging_across_midpoint_rerenders_without_new_actions() {
    let mut rig = Rig::new(KeyMapMode::Arrows);
    rig.touch(TouchPhase::Begin, 100);
    rig.clear();

    let report = rig.touch(TouchPhase::Hold, 140);
    assert!(rig.hid.ops.is_empty());
    assert!(!rig.dispatcher.shift_locked());
    assert_eq!(report.renders, 1);
    assert_eq!(rig.renderer.renders, std::vec![(TouchZone::Shift, false)]);
}

#[test]
fn click_sends_enter_through_shift_path() {
    let mut rig = Rig::new(KeyMapMode::Arrows);
    rig.tap_zone(200);
    rig.clear();

    rig.button(ButtonSignal::PRESS);
    let report = rig.button(ButtonSignal::RELEASE);

    assert_eq!(rig.hid.ops, shifted(b'\n').to_vec());
    assert!(!rig.dispatcher.shift_locked());
    assert_eq!(
        notices(report),
        std::vec![DialNotice::EnterClicked { held_ms: 1 }]
    );
}

#[test]
fn long_press_deletes_and_never_enters() {
    let mut rig = Rig::new(KeyMapMode::Arrows);
    rig.tap_zone(200);
    rig.clear();

    rig.button(ButtonSignal::PRESS);
    let press_ms = rig.now_ms;
    while rig.now_ms < press_ms + 3_600 {
        rig.button(ButtonSignal::HOLD);
    }
    rig.button(ButtonSignal::RELEASE);

    let deletes = rig
        .hid
        .ops
        .iter()
        .filter(|op| **op == HidOp::Press(HidKey::Delete))
        .count();
    assert_eq!(deletes, 2);
    assert!(!rig.hid.ops.contains(&HidOp::Write(HidKey::ENTER)));
    assert!(rig.dispatcher.shift_locked());
}

#[test]
fn unchanged_inputs_are_idempotent() {
    let mut rig = Rig::new(KeyMapMode::Letters);
    rig.rotate_to(6);
    rig.touch(TouchPhase::Begin, 200);
    rig.touch(TouchPhase::Hold, 200);
    rig.clear();

    for _ in 0..50 {
        let report = rig.touch(TouchPhase::Hold, 200);
        assert_eq!(report.renders, 0);
        assert!(notices(report).is_empty());
    }
    for _ in 0..50 {
        rig.touch(TouchPhase::None, 0);
    }

    // Losing contact without an End edge still re-renders once.
    assert!(rig.hid.ops.is_empty());
    assert_eq!(rig.renderer.renders.len(), 1);
}

#[test]
fn shift_toggle_precedes_rotation_in_the_same_poll() {
    let mut rig = Rig::new(KeyMapMode::Letters);
    rig.position = 4;
    rig.touch(TouchPhase::Begin, 200);

    assert_eq!(rig.hid.ops, shifted(b'd').to_vec());
    assert_eq!(
        rig.renderer.renders,
        std::vec![(TouchZone::Shift, true), (TouchZone::Shift, false)]
    );
}
