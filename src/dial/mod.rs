//! Input interpretation for the dial: touch zones, detent steps, button
//! click/long-press and the one-shot Shift latch, sequenced into HID key
//! transitions by [`DialDispatcher`].
//!
//! Everything here is hardware independent and runs unchanged on the host.

pub mod button;
pub mod config;
pub mod dispatcher;
pub mod encoder;
pub mod keys;
pub mod shift;
pub mod zone;

pub use button::{ButtonAction, ButtonClassifier, ButtonEdgeTracker, ButtonSignal};
pub use config::{DialConfig, KeyMapMode};
pub use dispatcher::{DialDispatcher, DialNotice, DialReport, DialSample, HidSink, ZoneRenderer};
pub use encoder::{EncoderCounter, EncoderMotion, EncoderTracker, RotationDirection};
pub use keys::{HidKey, KeyReport, ReportError};
pub use shift::ShiftLatch;
pub use zone::{
    classify_zone, TouchEdgeTracker, TouchPhase, TouchReading, TouchSample, TouchZone,
};
