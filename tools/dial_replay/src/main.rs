use std::{
    cell::RefCell,
    env,
    fs::File,
    io::{BufRead, BufReader},
    path::{Path, PathBuf},
    process,
};

#[allow(dead_code)]
#[path = "../../../src/dial/mod.rs"]
mod dial;
#[allow(dead_code)]
#[path = "../../../src/drivers/ft3267.rs"]
mod ft3267;
#[allow(dead_code)]
#[path = "../../../src/drivers/gc9a01.rs"]
mod gc9a01;
#[allow(dead_code)]
#[path = "../../../src/ui.rs"]
mod ui;

use dial::{
    ButtonEdgeTracker, DialConfig, DialDispatcher, DialSample, HidKey, HidSink, KeyMapMode,
    TouchEdgeTracker, TouchReading, TouchZone, ZoneRenderer,
};
use embassy_futures::block_on;

#[derive(Clone, Copy)]
struct ReplaySample {
    ms: u64,
    touch: TouchReading,
    encoder: i32,
    button_pressed: bool,
}

/// Shared by the HID and render sides so ops keep their emission order.
struct OpLog<'a> {
    ops: &'a RefCell<Vec<String>>,
}

impl HidSink for OpLog<'_> {
    async fn press(&mut self, key: HidKey) {
        self.ops
            .borrow_mut()
            .push(format!("press:{}", key_label(key)));
    }

    async fn release(&mut self, key: HidKey) {
        self.ops
            .borrow_mut()
            .push(format!("release:{}", key_label(key)));
    }

    async fn write(&mut self, key: HidKey) {
        self.ops
            .borrow_mut()
            .push(format!("write:{}", key_label(key)));
    }
}

impl ZoneRenderer for OpLog<'_> {
    fn render_zones(&mut self, pressed: TouchZone, shift_locked: bool) {
        self.ops.borrow_mut().push(format!(
            "render:{}:{}",
            zone_label(pressed),
            if shift_locked { "locked" } else { "unlocked" }
        ));
    }
}

fn main() {
    if let Err(err) = run() {
        eprintln!("error: {err}");
        process::exit(1);
    }
}

fn run() -> Result<(), String> {
    let args: Vec<String> = env::args().collect();
    if args.len() < 2 {
        return Err(usage());
    }

    let mut trace_path: Option<PathBuf> = None;
    let mut expect_path: Option<PathBuf> = None;
    let mut key_map = KeyMapMode::Arrows;

    let mut idx = 1usize;
    while idx < args.len() {
        match args[idx].as_str() {
            "--expect" => {
                idx += 1;
                let Some(path) = args.get(idx) else {
                    return Err("missing path after --expect".into());
                };
                expect_path = Some(PathBuf::from(path));
            }
            "--letters" => key_map = KeyMapMode::Letters,
            "-h" | "--help" => {
                println!("{}", usage());
                return Ok(());
            }
            value if value.starts_with('-') => {
                return Err(format!("unknown argument: {value}"));
            }
            value => {
                if trace_path.is_some() {
                    return Err("multiple trace paths provided".into());
                }
                trace_path = Some(PathBuf::from(value));
            }
        }
        idx += 1;
    }

    let trace_path = trace_path.ok_or_else(usage)?;
    let samples = parse_trace(&trace_path)?;
    let ops = replay(&samples, DialConfig::DEFAULT.with_key_map(key_map));

    println!("op,index,value");
    for (index, op) in ops.iter().enumerate() {
        println!("op,{},{}", index, op);
    }

    if let Some(expect_path) = expect_path {
        let expected = parse_expected_ops(&expect_path)?;
        if ops != expected {
            eprintln!("expected ops: {}", expected.join(","));
            eprintln!("actual ops:   {}", ops.join(","));
            return Err("op sequence mismatch".into());
        }
    }

    Ok(())
}

/// Runs the dispatcher once per millisecond, holding each sample's levels
/// until the next sample so debounce and repeat timing see real gaps.
fn replay(samples: &[ReplaySample], config: DialConfig) -> Vec<String> {
    let Some(first) = samples.first() else {
        return Vec::new();
    };

    let mut dispatcher = DialDispatcher::new(config, first.encoder);
    let mut button_edges = ButtonEdgeTracker::default();
    let mut touch_edges = TouchEdgeTracker::new();
    let ops = RefCell::new(Vec::new());
    let mut hid = OpLog { ops: &ops };
    let mut renderer = OpLog { ops: &ops };

    let mut current = *first;
    let mut next_idx = 0usize;
    let last_ms = samples.last().map_or(first.ms, |s| s.ms);
    for now_ms in first.ms..=last_ms {
        while next_idx < samples.len() && samples[next_idx].ms <= now_ms {
            current = samples[next_idx];
            next_idx += 1;
        }

        let sample = DialSample {
            now_ms,
            touch: touch_edges.observe(current.touch),
            encoder_position: current.encoder,
            button: button_edges.observe(now_ms, current.button_pressed),
        };

        block_on(dispatcher.tick(sample, &mut hid, &mut renderer));
    }

    ops.into_inner()
}

fn usage() -> String {
    "usage: dial_replay <trace.csv> [--letters] [--expect expected_ops.txt]".to_string()
}

fn parse_trace(path: &Path) -> Result<Vec<ReplaySample>, String> {
    let file = File::open(path).map_err(|e| format!("failed to open {}: {e}", path.display()))?;
    let reader = BufReader::new(file);

    let mut out: Vec<ReplaySample> = Vec::new();
    for (line_no, line_result) in reader.lines().enumerate() {
        let line_no = line_no + 1;
        let line = line_result
            .map_err(|e| format!("failed to read {}:{}: {e}", path.display(), line_no))?;
        let trimmed = line.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            continue;
        }
        if trimmed == "dial_trace,ms,touch,x,y,encoder,button" {
            continue;
        }

        let parts: Vec<&str> = trimmed.split(',').collect();
        if parts.len() != 7 {
            return Err(format!(
                "{}:{} invalid trace line, expected 7 columns",
                path.display(),
                line_no
            ));
        }
        if parts[0].trim() != "dial_trace" {
            continue;
        }

        let ms = parse_num::<u64>(parts[1], path, line_no, "ms")?;
        if out.last().is_some_and(|prev| prev.ms > ms) {
            return Err(format!(
                "{}:{} timestamps must not go backwards",
                path.display(),
                line_no
            ));
        }
        let active = parse_num::<u8>(parts[2], path, line_no, "touch")? != 0;
        let x = parse_num::<i32>(parts[3], path, line_no, "x")?;
        let y = parse_num::<i32>(parts[4], path, line_no, "y")?;
        let encoder = parse_num::<i32>(parts[5], path, line_no, "encoder")?;
        let button_pressed = parse_num::<u8>(parts[6], path, line_no, "button")? != 0;

        out.push(ReplaySample {
            ms,
            touch: if active {
                TouchReading::contact(x, y)
            } else {
                TouchReading::RELEASED
            },
            encoder,
            button_pressed,
        });
    }

    Ok(out)
}

fn parse_expected_ops(path: &Path) -> Result<Vec<String>, String> {
    let file = File::open(path).map_err(|e| format!("failed to open {}: {e}", path.display()))?;
    let reader = BufReader::new(file);

    let mut ops = Vec::new();
    for (line_no, line_result) in reader.lines().enumerate() {
        let line_no = line_no + 1;
        let line = line_result
            .map_err(|e| format!("failed to read {}:{}: {e}", path.display(), line_no))?;
        let token = line.trim();
        if token.is_empty() || token.starts_with('#') {
            continue;
        }
        ops.push(token.to_ascii_lowercase());
    }

    Ok(ops)
}

fn key_label(key: HidKey) -> String {
    match key {
        HidKey::Escape => "escape".into(),
        HidKey::Delete => "delete".into(),
        HidKey::RightArrow => "right".into(),
        HidKey::DownArrow => "down".into(),
        HidKey::LeftShift => "shift".into(),
        HidKey::Char(b'\n') => "enter".into(),
        HidKey::Char(b' ') => "space".into(),
        HidKey::Char(ch) => char::from(ch).to_string(),
    }
}

fn zone_label(zone: TouchZone) -> &'static str {
    match zone {
        TouchZone::None => "none",
        TouchZone::Escape => "escape",
        TouchZone::Shift => "shift",
    }
}

fn parse_num<T>(raw: &str, path: &Path, line_no: usize, field: &str) -> Result<T, String>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    raw.trim().parse::<T>().map_err(|e| {
        format!(
            "{}:{} invalid {} '{}': {}",
            path.display(),
            line_no,
            field,
            raw.trim(),
            e
        )
    })
}
