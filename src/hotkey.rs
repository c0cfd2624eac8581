// ocr-translator/src/hotkey.rs

// ============================================================================
// MÓDULO HOTKEY - Teclas globais usando device_query
// ============================================================================
//
// Uma thread consulta o teclado a cada 50ms. Cada atalho dispara uma vez por
// pressionamento (borda de subida); segurar a tecla não repete o comando.
// Os comandos vão para a thread da UI por um canal crossbeam.
// ============================================================================

use crossbeam_channel::Sender;
use device_query::{DeviceQuery, DeviceState, Keycode};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::thread::{self, JoinHandle};
use std::time::Duration;
use thiserror::Error;

use crate::config::{HotkeyBinding, HotkeyConfig};
use crate::session::Waker;

/// Intervalo entre consultas ao teclado
const POLL_INTERVAL: Duration = Duration::from_millis(50);

/// Comandos enviados da thread de hotkeys para a thread da UI
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppCommand {
    /// Dispara um ciclo de captura
    Capture,
    /// Fecha o programa
    Quit,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum HotkeyError {
    #[error("tecla desconhecida: '{0}'")]
    UnknownKey(String),

    #[error("modificador desconhecido: '{0}' (use Ctrl, Shift ou Alt)")]
    UnknownModifier(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Modifier {
    None,
    Ctrl,
    Shift,
    Alt,
}

impl Modifier {
    fn parse(name: &str) -> Result<Self, HotkeyError> {
        match name.trim().to_ascii_lowercase().as_str() {
            "" => Ok(Modifier::None),
            "ctrl" | "control" => Ok(Modifier::Ctrl),
            "shift" => Ok(Modifier::Shift),
            "alt" => Ok(Modifier::Alt),
            _ => Err(HotkeyError::UnknownModifier(name.to_string())),
        }
    }

    fn is_held(self, keys: &[Keycode]) -> bool {
        match self {
            Modifier::None => true,
            Modifier::Ctrl => keys.contains(&Keycode::LControl) || keys.contains(&Keycode::RControl),
            Modifier::Shift => keys.contains(&Keycode::LShift) || keys.contains(&Keycode::RShift),
            Modifier::Alt => keys.contains(&Keycode::LAlt) || keys.contains(&Keycode::RAlt),
        }
    }
}

/// Um atalho já validado (modificador + tecla)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Hotkey {
    pub modifier: Modifier,
    pub key: Keycode,
}

impl Hotkey {
    pub fn parse(binding: &HotkeyBinding) -> Result<Self, HotkeyError> {
        Ok(Hotkey {
            modifier: Modifier::parse(&binding.modifier)?,
            key: parse_key(&binding.key)?,
        })
    }

    pub fn is_pressed(&self, keys: &[Keycode]) -> bool {
        keys.contains(&self.key) && self.modifier.is_held(keys)
    }
}

/// Converte o nome da tecla do config.json para o Keycode
pub fn parse_key(name: &str) -> Result<Keycode, HotkeyError> {
    let key = match name.trim().to_ascii_uppercase().as_str() {
        // Teclas de função
        "F1" => Keycode::F1,
        "F2" => Keycode::F2,
        "F3" => Keycode::F3,
        "F4" => Keycode::F4,
        "F5" => Keycode::F5,
        "F6" => Keycode::F6,
        "F7" => Keycode::F7,
        "F8" => Keycode::F8,
        "F9" => Keycode::F9,
        "F10" => Keycode::F10,
        "F11" => Keycode::F11,
        "F12" => Keycode::F12,

        // Especiais
        "ESCAPE" | "ESC" => Keycode::Escape,
        "SPACE" => Keycode::Space,
        "ENTER" => Keycode::Enter,
        "TAB" => Keycode::Tab,
        "HOME" => Keycode::Home,
        "END" => Keycode::End,
        "PAGEUP" => Keycode::PageUp,
        "PAGEDOWN" => Keycode::PageDown,
        "INSERT" => Keycode::Insert,
        "DELETE" => Keycode::Delete,

        // Numpad
        "NUMPAD0" => Keycode::Numpad0,
        "NUMPAD1" => Keycode::Numpad1,
        "NUMPAD2" => Keycode::Numpad2,
        "NUMPAD3" => Keycode::Numpad3,
        "NUMPAD4" => Keycode::Numpad4,
        "NUMPAD5" => Keycode::Numpad5,
        "NUMPAD6" => Keycode::Numpad6,
        "NUMPAD7" => Keycode::Numpad7,
        "NUMPAD8" => Keycode::Numpad8,
        "NUMPAD9" => Keycode::Numpad9,
        "NUMPADADD" => Keycode::NumpadAdd,
        "NUMPADSUBTRACT" => Keycode::NumpadSubtract,
        "NUMPADMULTIPLY" => Keycode::NumpadMultiply,
        "NUMPADDIVIDE" => Keycode::NumpadDivide,
        "NUMPADDECIMAL" => Keycode::NumpadDecimal,

        // Números
        "0" => Keycode::Key0,
        "1" => Keycode::Key1,
        "2" => Keycode::Key2,
        "3" => Keycode::Key3,
        "4" => Keycode::Key4,
        "5" => Keycode::Key5,
        "6" => Keycode::Key6,
        "7" => Keycode::Key7,
        "8" => Keycode::Key8,
        "9" => Keycode::Key9,

        // Letras
        "A" => Keycode::A,
        "B" => Keycode::B,
        "C" => Keycode::C,
        "D" => Keycode::D,
        "E" => Keycode::E,
        "F" => Keycode::F,
        "G" => Keycode::G,
        "H" => Keycode::H,
        "I" => Keycode::I,
        "J" => Keycode::J,
        "K" => Keycode::K,
        "L" => Keycode::L,
        "M" => Keycode::M,
        "N" => Keycode::N,
        "O" => Keycode::O,
        "P" => Keycode::P,
        "Q" => Keycode::Q,
        "R" => Keycode::R,
        "S" => Keycode::S,
        "T" => Keycode::T,
        "U" => Keycode::U,
        "V" => Keycode::V,
        "W" => Keycode::W,
        "X" => Keycode::X,
        "Y" => Keycode::Y,
        "Z" => Keycode::Z,

        _ => return Err(HotkeyError::UnknownKey(name.to_string())),
    };

    Ok(key)
}

// ============================================================================
// DETECÇÃO DE PRESSIONAMENTO
// ============================================================================

/// Atalhos ativos e o estado "estava pressionado" de cada um
#[derive(Debug)]
pub struct HotkeyBindings {
    bindings: Vec<(Hotkey, AppCommand, bool)>,
}

impl HotkeyBindings {
    pub fn from_config(config: &HotkeyConfig) -> Result<Self, HotkeyError> {
        Ok(HotkeyBindings {
            bindings: vec![
                (Hotkey::parse(&config.capture)?, AppCommand::Capture, false),
                (Hotkey::parse(&config.quit)?, AppCommand::Quit, false),
            ],
        })
    }

    /// Compara com a consulta anterior e devolve os atalhos recém-pressionados
    pub fn poll(&mut self, keys: &[Keycode]) -> Vec<AppCommand> {
        let mut fired = Vec::new();

        for (hotkey, command, was_down) in self.bindings.iter_mut() {
            let down = hotkey.is_pressed(keys);
            if down && !*was_down {
                fired.push(*command);
            }
            *was_down = down;
        }

        fired
    }
}

// ============================================================================
// THREAD DE HOTKEYS
// ============================================================================

/// Thread de consulta ao teclado. Para e espera a thread no `Drop`.
pub struct HotkeyListener {
    stop: Arc<AtomicBool>,
    waker: Arc<Mutex<Option<Waker>>>,
    handle: Option<JoinHandle<()>>,
}

impl HotkeyListener {
    pub fn start(mut bindings: HotkeyBindings, sender: Sender<AppCommand>) -> Self {
        let stop = Arc::new(AtomicBool::new(false));
        let waker: Arc<Mutex<Option<Waker>>> = Arc::new(Mutex::new(None));

        let thread_stop = Arc::clone(&stop);
        let thread_waker = Arc::clone(&waker);

        let handle = thread::spawn(move || {
            info!("⌨️  Thread de hotkeys iniciada");
            let device_state = DeviceState::new();

            while !thread_stop.load(Ordering::Relaxed) {
                let keys = device_state.get_keys();

                for command in bindings.poll(&keys) {
                    info!("⌨️  Atalho: {:?}", command);

                    if sender.send(command).is_err() {
                        // UI já fechou
                        return;
                    }

                    let waker = thread_waker.lock().ok().and_then(|w| w.clone());
                    if let Some(wake) = waker {
                        wake();
                    }
                }

                thread::sleep(POLL_INTERVAL);
            }

            info!("⌨️  Thread de hotkeys encerrada");
        });

        HotkeyListener {
            stop,
            waker,
            handle: Some(handle),
        }
    }

    /// Acorda a UI sempre que um comando é enviado
    pub fn set_waker(&self, waker: Waker) {
        if let Ok(mut slot) = self.waker.lock() {
            *slot = Some(waker);
        }
    }

    pub fn stop(&mut self) {
        self.stop.store(true, Ordering::Relaxed);
        if let Some(handle) = self.handle.take() {
            if handle.join().is_err() {
                warn!("⚠️  Thread de hotkeys terminou com pânico");
            }
        }
    }
}

impl Drop for HotkeyListener {
    fn drop(&mut self) {
        self.stop();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn binding(modifier: &str, key: &str) -> HotkeyBinding {
        HotkeyBinding {
            modifier: modifier.to_string(),
            key: key.to_string(),
        }
    }

    #[test]
    fn parses_key_names_case_insensitively() {
        assert_eq!(parse_key("F1"), Ok(Keycode::F1));
        assert_eq!(parse_key("escape"), Ok(Keycode::Escape));
        assert_eq!(parse_key("Esc"), Ok(Keycode::Escape));
        assert_eq!(parse_key("NumpadAdd"), Ok(Keycode::NumpadAdd));
        assert_eq!(parse_key("t"), Ok(Keycode::T));
        assert_eq!(parse_key("7"), Ok(Keycode::Key7));
    }

    #[test]
    fn rejects_unknown_names() {
        assert_eq!(
            parse_key("F13"),
            Err(HotkeyError::UnknownKey("F13".to_string()))
        );
        assert_eq!(
            Hotkey::parse(&binding("Super", "F1")),
            Err(HotkeyError::UnknownModifier("Super".to_string()))
        );
    }

    #[test]
    fn modifier_must_be_held() {
        let hotkey = Hotkey::parse(&binding("Ctrl", "T")).unwrap();

        assert!(!hotkey.is_pressed(&[Keycode::T]));
        assert!(hotkey.is_pressed(&[Keycode::LControl, Keycode::T]));
        assert!(hotkey.is_pressed(&[Keycode::T, Keycode::RControl]));
        assert!(!hotkey.is_pressed(&[Keycode::LControl]));
    }

    #[test]
    fn holding_a_key_fires_once() {
        let mut bindings = HotkeyBindings::from_config(&HotkeyConfig::default()).unwrap();

        assert!(bindings.poll(&[]).is_empty());
        assert_eq!(bindings.poll(&[Keycode::F1]), vec![AppCommand::Capture]);
        assert!(bindings.poll(&[Keycode::F1]).is_empty());
        assert!(bindings.poll(&[Keycode::F1]).is_empty());
        assert!(bindings.poll(&[]).is_empty());
        assert_eq!(bindings.poll(&[Keycode::F1]), vec![AppCommand::Capture]);
    }

    #[test]
    fn quit_and_capture_are_independent() {
        let mut bindings = HotkeyBindings::from_config(&HotkeyConfig::default()).unwrap();

        assert_eq!(bindings.poll(&[Keycode::F1]), vec![AppCommand::Capture]);
        assert_eq!(
            bindings.poll(&[Keycode::F1, Keycode::Escape]),
            vec![AppCommand::Quit]
        );
    }

    #[test]
    fn invalid_binding_in_config_is_an_error() {
        let mut config = HotkeyConfig::default();
        config.quit = binding("", "Banana");

        assert!(HotkeyBindings::from_config(&config).is_err());
    }
}
