#![no_std]

pub mod dial;
pub mod drivers;
pub mod ui;
