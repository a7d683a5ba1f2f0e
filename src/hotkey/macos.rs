//! macOS global key capture
//!
//! Uses `rdev::listen`, which installs a Quartz event tap on a dedicated
//! thread. The tap cannot be removed once installed, so the listener thread
//! is spawned once and `start`/`stop` only swap the channel it forwards to.
//!
//! Requirements:
//! - Accessibility (input monitoring) permission must be granted
//! - System Settings > Privacy & Security > Accessibility

use async_trait::async_trait;
use rdev::{listen, Event, EventType};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::thread;
use tokio::sync::mpsc;

use super::modifiers::{HeldModifiers, Side};
use super::{HotkeyError, HotkeyResult, Key, KeyCapture, KeyChord, Modifier};
use crate::platform::is_process_trusted;

type SharedSender = Arc<Mutex<Option<mpsc::Sender<KeyChord>>>>;

/// macOS key capture implementation using a Quartz event tap
pub struct MacOSKeyCapture {
    capturing: Arc<AtomicBool>,
    sender: SharedSender,
    listener_spawned: bool,
}

impl MacOSKeyCapture {
    pub fn new() -> Self {
        Self {
            capturing: Arc::new(AtomicBool::new(false)),
            sender: Arc::new(Mutex::new(None)),
            listener_spawned: false,
        }
    }

    fn spawn_listener(&mut self) -> HotkeyResult<()> {
        let sender = self.sender.clone();
        let capturing = self.capturing.clone();

        thread::Builder::new()
            .name("mousemover-keys".to_string())
            .spawn(move || {
                let mut held = HeldModifiers::default();
                let callback = move |event: Event| {
                    handle_event(&event, &mut held, &capturing, &sender);
                };

                if let Err(e) = listen(callback) {
                    tracing::error!("Key listener stopped: {:?}", e);
                }
            })
            .map_err(|e| HotkeyError::Platform(e.to_string()))?;

        self.listener_spawned = true;
        Ok(())
    }
}

impl Default for MacOSKeyCapture {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl KeyCapture for MacOSKeyCapture {
    async fn start(&mut self) -> HotkeyResult<mpsc::Receiver<KeyChord>> {
        if self.capturing.load(Ordering::SeqCst) {
            return Err(HotkeyError::AlreadyStarted);
        }

        if !is_process_trusted() {
            return Err(HotkeyError::PermissionDenied(
                "Accessibility permission required. Please enable in System Settings > Privacy & Security > Accessibility".to_string(),
            ));
        }

        let (tx, rx) = mpsc::channel(64);
        if let Ok(mut slot) = self.sender.lock() {
            *slot = Some(tx);
        }

        if !self.listener_spawned {
            self.spawn_listener()?;
        }

        self.capturing.store(true, Ordering::SeqCst);
        Ok(rx)
    }

    async fn stop(&mut self) -> HotkeyResult<()> {
        if !self.capturing.load(Ordering::SeqCst) {
            return Err(HotkeyError::NotStarted);
        }

        self.capturing.store(false, Ordering::SeqCst);
        if let Ok(mut slot) = self.sender.lock() {
            *slot = None;
        }
        Ok(())
    }

    fn is_capturing(&self) -> bool {
        self.capturing.load(Ordering::SeqCst)
    }
}

fn handle_event(
    event: &Event,
    held: &mut HeldModifiers,
    capturing: &AtomicBool,
    sender: &SharedSender,
) {
    match event.event_type {
        EventType::KeyPress(key) => {
            if let Some((modifier, side)) = modifier_from_rdev(key) {
                held.press(modifier, side);
                return;
            }

            if !capturing.load(Ordering::SeqCst) {
                return;
            }

            let Some(key) = key_from_rdev(key) else {
                return;
            };

            // Bare keys are never hotkeys; skip the channel for ordinary typing
            let modifiers = held.current();
            if modifiers.is_empty() {
                return;
            }

            let chord = KeyChord::new(key, modifiers);
            if let Ok(slot) = sender.lock() {
                if let Some(tx) = slot.as_ref() {
                    if tx.try_send(chord).is_err() {
                        tracing::debug!("Dropped key chord {}: receiver busy or gone", chord);
                    }
                }
            }
        }
        EventType::KeyRelease(key) => {
            if let Some((modifier, side)) = modifier_from_rdev(key) {
                held.release(modifier, side);
            }
        }
        _ => {}
    }
}

fn modifier_from_rdev(key: rdev::Key) -> Option<(Modifier, Side)> {
    use rdev::Key as K;

    match key {
        K::MetaLeft => Some((Modifier::Command, Side::Left)),
        K::MetaRight => Some((Modifier::Command, Side::Right)),
        K::ShiftLeft => Some((Modifier::Shift, Side::Left)),
        K::ShiftRight => Some((Modifier::Shift, Side::Right)),
        // rdev reports the right option key as AltGr on macOS
        K::Alt => Some((Modifier::Option, Side::Left)),
        K::AltGr => Some((Modifier::Option, Side::Right)),
        K::ControlLeft => Some((Modifier::Control, Side::Left)),
        K::ControlRight => Some((Modifier::Control, Side::Right)),
        _ => None,
    }
}

fn key_from_rdev(key: rdev::Key) -> Option<Key> {
    use rdev::Key as K;

    let key = match key {
        K::Num1 => Key::One,
        K::Num2 => Key::Two,
        K::Num3 => Key::Three,
        K::Num4 => Key::Four,
        K::Num5 => Key::Five,
        K::Num6 => Key::Six,
        K::Num7 => Key::Seven,
        K::Num8 => Key::Eight,
        K::Num9 => Key::Nine,
        K::Num0 => Key::Zero,
        K::KeyA => Key::A,
        K::KeyB => Key::B,
        K::KeyC => Key::C,
        K::KeyD => Key::D,
        K::KeyE => Key::E,
        K::KeyF => Key::F,
        K::KeyG => Key::G,
        K::KeyH => Key::H,
        K::KeyI => Key::I,
        K::KeyJ => Key::J,
        K::KeyK => Key::K,
        K::KeyL => Key::L,
        K::KeyM => Key::M,
        K::KeyN => Key::N,
        K::KeyO => Key::O,
        K::KeyP => Key::P,
        K::KeyQ => Key::Q,
        K::KeyR => Key::R,
        K::KeyS => Key::S,
        K::KeyT => Key::T,
        K::KeyU => Key::U,
        K::KeyV => Key::V,
        K::KeyW => Key::W,
        K::KeyX => Key::X,
        K::KeyY => Key::Y,
        K::KeyZ => Key::Z,
        _ => return None,
    };
    Some(key)
}
