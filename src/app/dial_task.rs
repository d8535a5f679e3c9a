use core::fmt::Write;

use dialkeys::dial::{DialDispatcher, DialNotice, RotationDirection};
use embassy_time::{Duration, Instant, Ticker};

use super::{
    config::{DIAL_CONFIG, DIAL_NOTICES, DIAL_POLL_MS},
    input::DialInputs,
    render::PanelRenderer,
    usb::UsbKeyboard,
};

pub(crate) struct DialContext {
    pub(crate) inputs: DialInputs,
    pub(crate) renderer: PanelRenderer,
    pub(crate) keyboard: UsbKeyboard,
}

#[embassy_executor::task]
pub(crate) async fn dial_task(context: DialContext) {
    let DialContext {
        mut inputs,
        mut renderer,
        mut keyboard,
    } = context;

    let mut dispatcher = DialDispatcher::new(DIAL_CONFIG, inputs.encoder_position());
    dispatcher.render_current(&mut renderer);
    esp_println::println!("dial: usb keyboard ready mode={:?}", DIAL_CONFIG.key_map);

    let mut ticker = Ticker::every(Duration::from_millis(DIAL_POLL_MS));
    loop {
        let sample = inputs.sample(Instant::now().as_millis());
        let report = dispatcher.tick(sample, &mut keyboard, &mut renderer).await;
        for notice in report.notices.into_iter().flatten() {
            // Dropped when the log task falls behind; the poll never waits on it.
            let _ = DIAL_NOTICES.try_send(notice);
        }
        ticker.next().await;
    }
}

#[embassy_executor::task]
pub(crate) async fn notice_log_task() {
    loop {
        let notice = DIAL_NOTICES.receive().await;
        esp_println::println!("{}", format_notice(notice));
    }
}

fn format_notice(notice: DialNotice) -> heapless::String<96> {
    let mut line = heapless::String::<96>::new();
    let _ = match notice {
        DialNotice::EscapeSent => write!(&mut line, "dial: escape"),
        DialNotice::ShiftToggled { locked } => write!(&mut line, "dial: shift locked={}", locked),
        DialNotice::Rotated {
            direction,
            delta,
            steps,
        } => write!(
            &mut line,
            "dial: rotate dir={} delta={} steps={}",
            match direction {
                RotationDirection::Clockwise => "right",
                RotationDirection::CounterClockwise => "left",
            },
            delta,
            steps
        ),
        DialNotice::EnterClicked { held_ms } => {
            write!(&mut line, "dial: enter held_ms={}", held_ms)
        }
        DialNotice::DeleteRepeatStarted => write!(&mut line, "dial: delete_repeat start"),
    };
    line
}
