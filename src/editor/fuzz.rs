//! Background command generator for stress testing the editor.
//!
//! A worker thread produces a deterministic stream of pseudo-random
//! [`Command`]s from an odd 32-bit seed and queues them on a bounded
//! channel. The owner of the editor drains the queue on its own thread, so
//! the document is only ever touched by one thread.
//!
//! ```text
//! Owner Thread                        Fuzz Thread
//! ------------                        -----------
//! Fuzzer::start(seed)  ─── spawn ───▶  loop until quit flag:
//!                                        generate command
//! try_next() ◀──────── queue ─────────   send (blocks when full)
//! editor.dispatch(cmd)
//! stop(): set flag, drop queue ──────▶  send fails, exit
//! join
//! ```

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{self, Receiver, RecvTimeoutError, SyncSender};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use super::command::Command;
use super::input::{KeyCode, KeyEvent, KeyModifiers, MouseButton};
use crate::error::{Error, Result};
use crate::event::{LogLevel, emit_event, emit_log};

const NAV_KEYS: [KeyCode; 8] = [
    KeyCode::Left,
    KeyCode::Right,
    KeyCode::Up,
    KeyCode::Down,
    KeyCode::Home,
    KeyCode::End,
    KeyCode::PageUp,
    KeyCode::PageDown,
];

const GLYPHS: &[char] = &[
    'a', 'b', 'e', 'o', 'x', 'Z', '0', '7', ' ', ' ', ' ', '.', ',', '-', 'ñ', 'ß', 'Ж', '漢',
    '字', '😀', '\u{0301}',
];

const SHORTCUTS: [char; 7] = ['a', 'c', 'x', 'v', 'z', 'y', 'Z'];

fn random_modifiers(rng: &mut impl Rng) -> KeyModifiers {
    let mut m = KeyModifiers::empty();
    if rng.gen_bool(0.3) {
        m |= KeyModifiers::SHIFT;
    }
    if rng.gen_bool(0.1) {
        m |= KeyModifiers::CTRL;
    }
    m
}

fn random_text(rng: &mut impl Rng) -> String {
    let len = rng.gen_range(0..48);
    (0..len)
        .map(|_| {
            if rng.gen_ratio(1, 12) {
                '\n'
            } else {
                GLYPHS[rng.gen_range(0..GLYPHS.len())]
            }
        })
        .collect()
}

/// Draw one command from `rng`. Key navigation and typing dominate; mouse,
/// clipboard, history and resize commands are mixed in.
pub fn random_command(rng: &mut impl Rng) -> Command {
    let x = rng.gen_range(-16..720);
    let y = rng.gen_range(-16..520);
    match rng.gen_range(0..100) {
        0..30 => {
            let code = NAV_KEYS[rng.gen_range(0..NAV_KEYS.len())];
            Command::Key(KeyEvent::new(code, random_modifiers(rng)))
        }
        30..55 => {
            let c = GLYPHS[rng.gen_range(0..GLYPHS.len())];
            Command::Key(KeyEvent::from(c))
        }
        55..62 => {
            let code = if rng.gen_bool(0.5) {
                KeyCode::Backspace
            } else {
                KeyCode::Delete
            };
            Command::Key(KeyEvent::new(code, random_modifiers(rng)))
        }
        62..67 => Command::Key(KeyEvent::key(KeyCode::Enter)),
        67..72 => Command::Text(random_text(rng)),
        72..78 => Command::MouseDown {
            button: if rng.gen_ratio(1, 5) {
                MouseButton::Right
            } else {
                MouseButton::Left
            },
            x,
            y,
            modifiers: random_modifiers(rng),
        },
        78..81 => Command::MouseMove { x, y },
        81..84 => Command::MouseUp {
            button: MouseButton::Left,
        },
        84..88 => Command::DoubleClick { x, y },
        88..91 => Command::Wheel {
            dy: rng.gen_range(-120..=120),
        },
        91..98 => {
            let c = SHORTCUTS[rng.gen_range(0..SHORTCUTS.len())];
            let mut modifiers = KeyModifiers::CTRL;
            if c.is_ascii_uppercase() {
                modifiers |= KeyModifiers::SHIFT;
            }
            Command::Key(KeyEvent::new(
                KeyCode::Char(c.to_ascii_lowercase()),
                modifiers,
            ))
        }
        _ => Command::Resize {
            width: rng.gen_range(1..800),
            height: rng.gen_range(1..600),
        },
    }
}

fn fuzz_thread_main(
    seed: u32,
    tx: SyncSender<Command>,
    quit: Arc<AtomicBool>,
    interval: Duration,
) -> u64 {
    let mut rng = StdRng::seed_from_u64(u64::from(seed));
    let mut generated = 0u64;
    while !quit.load(Ordering::Acquire) {
        if tx.send(random_command(&mut rng)).is_err() {
            break;
        }
        generated += 1;
        if !interval.is_zero() {
            thread::sleep(interval);
        }
    }
    generated
}

/// Handle to a running fuzz worker.
///
/// Dropping the handle stops and joins the worker.
pub struct Fuzzer {
    rx: Option<Receiver<Command>>,
    quit: Arc<AtomicBool>,
    handle: Option<JoinHandle<u64>>,
    seed: u32,
    count: u64,
    last: Option<Command>,
}

impl Fuzzer {
    /// Spawn a worker seeded with `seed`, which must be odd.
    ///
    /// `queue` bounds how many commands may wait unconsumed; the worker
    /// blocks when the queue is full.
    pub fn start(seed: u32, interval: Duration, queue: usize) -> Result<Self> {
        if seed % 2 == 0 {
            return Err(Error::InvalidSeed(seed));
        }
        let (tx, rx) = mpsc::sync_channel(queue.max(1));
        let quit = Arc::new(AtomicBool::new(false));
        let flag = Arc::clone(&quit);
        let handle = thread::Builder::new()
            .name("paraedit-fuzz".to_string())
            .spawn(move || fuzz_thread_main(seed, tx, flag, interval))?;

        emit_log(LogLevel::Info, &format!("fuzzer started, seed {seed:#010x}"));
        emit_event("fuzz.started", &format!("seed={seed}"));
        Ok(Self {
            rx: Some(rx),
            quit,
            handle: Some(handle),
            seed,
            count: 0,
            last: None,
        })
    }

    #[must_use]
    pub fn seed(&self) -> u32 {
        self.seed
    }

    /// Commands handed out so far.
    #[must_use]
    pub fn count(&self) -> u64 {
        self.count
    }

    /// Most recently handed out command.
    #[must_use]
    pub fn last(&self) -> Option<&Command> {
        self.last.as_ref()
    }

    /// Whether a stop has been requested.
    #[must_use]
    pub fn is_stopping(&self) -> bool {
        self.quit.load(Ordering::Acquire)
    }

    fn take(&mut self, cmd: Command) -> Command {
        self.count += 1;
        self.last = Some(cmd.clone());
        cmd
    }

    /// Next queued command, without waiting.
    pub fn try_next(&mut self) -> Option<Command> {
        let cmd = self.rx.as_ref()?.try_recv().ok()?;
        Some(self.take(cmd))
    }

    /// Next queued command, waiting up to `timeout` for the worker.
    pub fn next_timeout(&mut self, timeout: Duration) -> Option<Command> {
        match self.rx.as_ref()?.recv_timeout(timeout) {
            Ok(cmd) => Some(self.take(cmd)),
            Err(RecvTimeoutError::Timeout | RecvTimeoutError::Disconnected) => None,
        }
    }

    /// Request a stop and join the worker. Returns how many commands the
    /// worker generated.
    pub fn stop(mut self) -> Result<u64> {
        self.shutdown()
    }

    fn shutdown(&mut self) -> Result<u64> {
        self.quit.store(true, Ordering::Release);
        // Unblocks a worker waiting on a full queue.
        drop(self.rx.take());
        let Some(handle) = self.handle.take() else {
            return Ok(0);
        };
        let generated = handle.join().map_err(|_| {
            emit_log(LogLevel::Error, "fuzz worker panicked");
            Error::Fuzzer("worker thread panicked".to_string())
        })?;
        emit_log(
            LogLevel::Info,
            &format!(
                "fuzzer stopped after {} commands ({generated} generated)",
                self.count
            ),
        );
        emit_event("fuzz.stopped", &format!("count={}", self.count));
        Ok(generated)
    }
}

impl Drop for Fuzzer {
    fn drop(&mut self) {
        if self.handle.is_some() {
            let _ = self.shutdown();
        }
    }
}

impl std::fmt::Debug for Fuzzer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Fuzzer")
            .field("seed", &self.seed)
            .field("count", &self.count)
            .field("running", &self.handle.is_some())
            .finish_non_exhaustive()
    }
}
