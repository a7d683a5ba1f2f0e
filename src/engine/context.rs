//! Application context
//!
//! Owns the configuration, the binding store, the live hotkey registry and
//! the relocation engine. Built once at startup and rebuilt in place on
//! reload; there is no global state.

use std::sync::Arc;

use tokio::task::JoinHandle;

use crate::config::{BindingStore, Config, ConfigResult};
use crate::hotkey::{HotkeyBinding, HotkeyRegistry, KeyChord};
use crate::platform::Platform;
use crate::screen::DisplayId;

use super::{Outcome, Relocator};

pub struct AppContext {
    config: Config,
    platform: Platform,
    store: BindingStore,
    bindings: Vec<HotkeyBinding>,
    registry: HotkeyRegistry,
    relocator: Arc<Relocator>,
}

impl AppContext {
    pub fn new(config: Config, platform: Platform) -> Self {
        let mut context = Self {
            store: BindingStore::new(config.bindings_path()),
            relocator: Arc::new(Relocator::new(platform.clone(), &config)),
            bindings: Vec::new(),
            registry: HotkeyRegistry::new(),
            platform,
            config,
        };
        context.rebuild_hotkeys();
        context
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn bindings(&self) -> &[HotkeyBinding] {
        &self.bindings
    }

    pub fn registry(&self) -> &HotkeyRegistry {
        &self.registry
    }

    /// Apply a new configuration: every hotkey is unregistered and the
    /// registry rebuilt from the stored bindings and current displays
    pub fn reload(&mut self, config: Config) {
        self.store = BindingStore::new(config.bindings_path());
        // Shares the in-flight animation slot, so a jump started before the
        // reload is still superseded by the next one
        self.relocator = Arc::new(self.relocator.reconfigured(&config));
        self.config = config;
        self.rebuild_hotkeys();
    }

    /// Re-read bindings against the current displays, e.g. after a display
    /// was attached or removed
    pub fn refresh(&mut self) {
        self.rebuild_hotkeys();
    }

    /// Persist a new set of bindings and switch to them
    pub fn set_bindings(&mut self, bindings: Vec<HotkeyBinding>) -> ConfigResult<()> {
        self.store.save(&bindings)?;
        tracing::info!(
            "Saved {} binding(s) to {}",
            bindings.len(),
            self.store.path().display()
        );
        self.rebuild_hotkeys();
        Ok(())
    }

    /// Give `binding.display` a new chord, replacing its previous one
    pub fn bind(&mut self, binding: HotkeyBinding) -> ConfigResult<()> {
        let mut bindings: Vec<HotkeyBinding> = self
            .bindings
            .iter()
            .copied()
            .filter(|b| b.display != binding.display)
            .collect();
        bindings.push(binding);
        self.set_bindings(bindings)
    }

    /// Drop the binding of `display`. Returns whether it had one.
    pub fn unbind(&mut self, display: DisplayId) -> ConfigResult<bool> {
        let before = self.bindings.len();
        let bindings: Vec<HotkeyBinding> = self
            .bindings
            .iter()
            .copied()
            .filter(|b| b.display != display)
            .collect();

        if bindings.len() == before {
            return Ok(false);
        }
        self.set_bindings(bindings)?;
        Ok(true)
    }

    /// Remove the stored bindings and fall back to the defaults
    pub fn reset_bindings(&mut self) -> ConfigResult<()> {
        self.store.clear()?;
        tracing::info!("Cleared stored bindings at {}", self.store.path().display());
        self.rebuild_hotkeys();
        Ok(())
    }

    /// Start handling a pressed chord. Returns `None` when the chord is not
    /// registered.
    pub fn dispatch(&self, chord: &KeyChord) -> Option<JoinHandle<Outcome>> {
        let request = self.registry.lookup(chord)?;
        tracing::debug!("Hotkey {} -> {:?}", chord, request);

        let relocator = self.relocator.clone();
        Some(tokio::spawn(async move { relocator.handle(request).await }))
    }

    fn rebuild_hotkeys(&mut self) {
        self.registry.clear();

        let displays = match self.platform.displays.displays() {
            Ok(displays) => displays,
            Err(e) => {
                tracing::warn!("Failed to enumerate displays: {}", e);
                Vec::new()
            }
        };

        self.bindings = self.store.resolve(&displays);
        self.registry = HotkeyRegistry::from_bindings(
            &self.bindings,
            self.config.hotkeys.window_move_modifier,
        );

        tracing::info!(
            "{} hotkey(s) active across {} display(s)",
            self.registry.len(),
            displays.len()
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::{Point, Size};
    use crate::hotkey::{Key, Modifier, ModifierSet, WindowMoveModifier};
    use crate::platform::fake::FakeDesktop;
    use crate::platform::DisplayProvider;
    use tempfile::TempDir;

    fn config(dir: &TempDir) -> Config {
        let mut config = Config::default();
        config.general.bindings_file = Some(dir.path().join("bindings.json"));
        config
    }

    fn cmd_shift(key: Key) -> KeyChord {
        KeyChord::new(key, ModifierSet::of(&[Modifier::Command, Modifier::Shift]))
    }

    #[tokio::test(start_paused = true)]
    async fn test_default_bindings_dispatch() {
        let dir = TempDir::new().unwrap();
        let desktop = FakeDesktop::dual();
        let context = AppContext::new(config(&dir), desktop.platform());

        assert_eq!(context.bindings().len(), 2);
        assert_eq!(context.registry().len(), 2);

        let outcome = context
            .dispatch(&cmd_shift(Key::Two))
            .unwrap()
            .await
            .unwrap();

        assert_eq!(
            outcome,
            Outcome::CursorMoved {
                display: DisplayId(2),
                target: Point::new(2432.0, 696.0),
            }
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_unregistered_chord() {
        let dir = TempDir::new().unwrap();
        let context = AppContext::new(config(&dir), FakeDesktop::dual().platform());

        assert!(context.dispatch(&cmd_shift(Key::Three)).is_none());
        assert!(context
            .dispatch(&KeyChord::new(Key::One, ModifierSet::EMPTY))
            .is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn test_reload_registers_window_variant() {
        let dir = TempDir::new().unwrap();
        let desktop = FakeDesktop::dual();
        desktop.add_window(Point::new(480.0, 270.0), Size::new(200.0, 100.0));
        let mut context = AppContext::new(config(&dir), desktop.platform());

        let chord = KeyChord::new(
            Key::Two,
            ModifierSet::of(&[Modifier::Command, Modifier::Shift, Modifier::Option]),
        );
        assert!(context.dispatch(&chord).is_none());

        let mut updated = config(&dir);
        updated.hotkeys.window_move_modifier = WindowMoveModifier::Option;
        context.reload(updated);

        assert_eq!(context.registry().len(), 4);
        let outcome = context.dispatch(&chord).unwrap().await.unwrap();
        assert!(matches!(outcome, Outcome::WindowMoved { display: DisplayId(2), .. }));
    }

    #[tokio::test(start_paused = true)]
    async fn test_reload_keeps_superseding_running_jump() {
        let dir = TempDir::new().unwrap();
        let desktop = FakeDesktop::dual();
        desktop.set_cursor(Point::new(960.0, 540.0));
        let mut slow = config(&dir);
        slow.animation.duration_ms = 1000;
        let mut context = AppContext::new(slow.clone(), desktop.platform());

        let first = context.dispatch(&cmd_shift(Key::Two)).unwrap();
        tokio::time::sleep(std::time::Duration::from_millis(100)).await;

        context.reload(slow);
        let second = context.dispatch(&cmd_shift(Key::One)).unwrap();

        assert_eq!(first.await.unwrap(), Outcome::Superseded);
        assert_eq!(
            second.await.unwrap(),
            Outcome::CursorMoved {
                display: DisplayId(1),
                target: Point::new(960.0, 540.0),
            }
        );
        assert_eq!(desktop.highlights().len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_set_bindings_persists() {
        let dir = TempDir::new().unwrap();
        let desktop = FakeDesktop::dual();
        let mut context = AppContext::new(config(&dir), desktop.platform());

        let binding = HotkeyBinding::new(
            DisplayId(1),
            Key::M,
            ModifierSet::of(&[Modifier::Control]),
        );
        tokio_test::assert_ok!(context.set_bindings(vec![binding]));

        assert_eq!(context.bindings(), &[binding]);
        assert!(context.dispatch(&cmd_shift(Key::One)).is_none());
        assert!(context.dispatch(&binding.chord()).is_some());

        // A fresh context picks the stored bindings up
        let reopened = AppContext::new(config(&dir), desktop.platform());
        assert_eq!(reopened.bindings(), &[binding]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_bind_replaces_display_chord() {
        let dir = TempDir::new().unwrap();
        let mut context = AppContext::new(config(&dir), FakeDesktop::dual().platform());

        let binding = HotkeyBinding::new(
            DisplayId(2),
            Key::L,
            ModifierSet::of(&[Modifier::Control, Modifier::Option]),
        );
        context.bind(binding).unwrap();

        assert_eq!(context.bindings().len(), 2);
        assert!(context.dispatch(&cmd_shift(Key::Two)).is_none());
        assert!(context.dispatch(&cmd_shift(Key::One)).is_some());
        assert_eq!(
            context.registry().lookup(&binding.chord()).map(|r| r.display),
            Some(DisplayId(2))
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_unbind_and_reset() {
        let dir = TempDir::new().unwrap();
        let mut context = AppContext::new(config(&dir), FakeDesktop::dual().platform());

        assert!(context.unbind(DisplayId(1)).unwrap());
        assert!(!context.unbind(DisplayId(1)).unwrap());
        assert_eq!(context.bindings().len(), 1);
        assert!(context.dispatch(&cmd_shift(Key::One)).is_none());

        context.reset_bindings().unwrap();
        assert_eq!(context.bindings().len(), 2);
        assert!(context.dispatch(&cmd_shift(Key::One)).is_some());
        assert!(!dir.path().join("bindings.json").exists());
    }

    #[tokio::test(start_paused = true)]
    async fn test_empty_binding_list_disables_hotkeys() {
        let dir = TempDir::new().unwrap();
        let mut context = AppContext::new(config(&dir), FakeDesktop::dual().platform());

        context.set_bindings(Vec::new()).unwrap();

        assert!(context.registry().is_empty());
        assert!(context.dispatch(&cmd_shift(Key::One)).is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn test_refresh_follows_display_changes() {
        let dir = TempDir::new().unwrap();
        let desktop = FakeDesktop::dual();
        let mut context = AppContext::new(config(&dir), desktop.platform());
        assert_eq!(context.bindings().len(), 2);

        let primary = desktop.displays().unwrap()[0].clone();
        desktop.set_displays(vec![primary]);
        context.refresh();

        assert_eq!(context.bindings().len(), 1);
        assert!(context.dispatch(&cmd_shift(Key::Two)).is_none());
    }
}
