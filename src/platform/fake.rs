//! In-memory window system used by tests

use std::sync::{Arc, Mutex, MutexGuard};

use crate::feedback::{HighlightStyle, Highlighter};
use crate::geometry::{to_desktop_space, Point, Rect, Size};
use crate::screen::Display;

use super::{
    AccessibilityBridge, DisplayProvider, ElementHandle, Platform, PlatformError, PlatformResult,
    PointerDevice, ProcessId, WindowHandle,
};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FakeWindow {
    pub position: Point,
    pub size: Size,
}

#[derive(Default)]
struct State {
    displays: Vec<Display>,
    cursor: Point,
    button_down: bool,
    secondary_down: bool,
    untrusted: bool,
    windows: Vec<FakeWindow>,
    max_window_size: Option<Size>,
    ignored_position_writes: u32,
    element_owner: Option<ProcessId>,
    warps: Vec<Point>,
    drags: Vec<Point>,
    size_writes: Vec<Size>,
    position_writes: Vec<Point>,
    highlights: Vec<Point>,
    activations: Vec<ProcessId>,
}

/// A scriptable desktop that records every side effect
#[derive(Default)]
pub struct FakeDesktop {
    state: Mutex<State>,
}

impl FakeDesktop {
    pub fn new(displays: Vec<Display>) -> Arc<Self> {
        let desktop = Self::default();
        desktop.lock().displays = displays;
        Arc::new(desktop)
    }

    /// 1920x1080 primary with a 25-unit menu bar, 1024x768 to its right
    pub fn dual() -> Arc<Self> {
        Self::new(vec![
            Display::new(
                1,
                "Primary",
                Rect::new(0.0, 0.0, 1920.0, 1080.0),
                Rect::new(0.0, 0.0, 1920.0, 1055.0),
            )
            .with_primary(true)
            .with_built_in(true),
            Display::new(
                2,
                "Secondary",
                Rect::new(1920.0, 0.0, 1024.0, 768.0),
                Rect::new(1920.0, 0.0, 1024.0, 768.0),
            ),
        ])
    }

    pub fn platform(self: &Arc<Self>) -> Platform {
        Platform {
            displays: self.clone(),
            pointer: self.clone(),
            accessibility: self.clone(),
            highlighter: self.clone(),
        }
    }

    fn lock(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap()
    }

    fn reference_height(state: &State) -> f64 {
        state.displays.first().map(|d| d.bounds.height()).unwrap_or(0.0)
    }

    pub fn set_displays(&self, displays: Vec<Display>) {
        self.lock().displays = displays;
    }

    /// Place the cursor at a desktop-space point
    pub fn set_cursor(&self, point: Point) {
        self.lock().cursor = point;
    }

    pub fn set_button_down(&self, down: bool) {
        self.lock().button_down = down;
    }

    pub fn set_secondary_button_down(&self, down: bool) {
        self.lock().secondary_down = down;
    }

    pub fn set_trusted(&self, trusted: bool) {
        self.lock().untrusted = !trusted;
    }

    /// Add a window (device-space position) to the frontmost application
    pub fn add_window(&self, position: Point, size: Size) {
        self.lock().windows.push(FakeWindow { position, size });
    }

    pub fn window(&self, index: usize) -> FakeWindow {
        self.lock().windows[index]
    }

    /// Sizes above this are silently reduced, as some applications do
    pub fn set_max_window_size(&self, size: Size) {
        self.lock().max_window_size = Some(size);
    }

    /// Swallow the next `count` position writes
    pub fn ignore_position_writes(&self, count: u32) {
        self.lock().ignored_position_writes = count;
    }

    pub fn set_element_owner(&self, pid: ProcessId) {
        self.lock().element_owner = Some(pid);
    }

    pub fn warps(&self) -> Vec<Point> {
        self.lock().warps.clone()
    }

    pub fn drags(&self) -> Vec<Point> {
        self.lock().drags.clone()
    }

    pub fn size_writes(&self) -> Vec<Size> {
        self.lock().size_writes.clone()
    }

    pub fn position_writes(&self) -> Vec<Point> {
        self.lock().position_writes.clone()
    }

    pub fn highlights(&self) -> Vec<Point> {
        self.lock().highlights.clone()
    }

    pub fn activations(&self) -> Vec<ProcessId> {
        self.lock().activations.clone()
    }

    fn check_trusted(state: &State) -> PlatformResult<()> {
        if state.untrusted {
            Err(PlatformError::PermissionDenied("accessibility".to_string()))
        } else {
            Ok(())
        }
    }

    fn window_mut(state: &mut State, window: WindowHandle) -> PlatformResult<&mut FakeWindow> {
        state
            .windows
            .get_mut(window.0 as usize)
            .ok_or_else(|| PlatformError::ElementNotFound(format!("window {}", window.0)))
    }
}

impl DisplayProvider for FakeDesktop {
    fn displays(&self) -> PlatformResult<Vec<Display>> {
        Ok(self.lock().displays.clone())
    }
}

impl PointerDevice for FakeDesktop {
    fn location(&self) -> PlatformResult<Point> {
        Ok(self.lock().cursor)
    }

    fn is_primary_button_down(&self) -> bool {
        self.lock().button_down
    }

    fn is_any_button_down(&self) -> bool {
        let state = self.lock();
        state.button_down || state.secondary_down
    }

    fn warp(&self, to: Point) -> PlatformResult<()> {
        let mut state = self.lock();
        let height = Self::reference_height(&state);
        state.cursor = to_desktop_space(to, height);
        state.warps.push(to);
        Ok(())
    }

    fn post_drag(&self, at: Point) -> PlatformResult<()> {
        let mut state = self.lock();
        Self::check_trusted(&state)?;
        state.drags.push(at);
        Ok(())
    }
}

impl AccessibilityBridge for FakeDesktop {
    fn is_trusted(&self) -> bool {
        !self.lock().untrusted
    }

    fn frontmost_windows(&self) -> PlatformResult<Vec<WindowHandle>> {
        let state = self.lock();
        Self::check_trusted(&state)?;
        Ok((0..state.windows.len() as u64).map(WindowHandle).collect())
    }

    fn window_position(&self, window: WindowHandle) -> PlatformResult<Point> {
        let mut state = self.lock();
        Ok(Self::window_mut(&mut state, window)?.position)
    }

    fn window_size(&self, window: WindowHandle) -> PlatformResult<Size> {
        let mut state = self.lock();
        Ok(Self::window_mut(&mut state, window)?.size)
    }

    fn set_window_position(&self, window: WindowHandle, position: Point) -> PlatformResult<()> {
        let mut state = self.lock();
        Self::check_trusted(&state)?;
        state.position_writes.push(position);

        if state.ignored_position_writes > 0 {
            state.ignored_position_writes -= 1;
            return Ok(());
        }

        Self::window_mut(&mut state, window)?.position = position;
        Ok(())
    }

    fn set_window_size(&self, window: WindowHandle, size: Size) -> PlatformResult<()> {
        let mut state = self.lock();
        Self::check_trusted(&state)?;
        state.size_writes.push(size);

        let applied = match state.max_window_size {
            Some(max) => Size::new(size.width.min(max.width), size.height.min(max.height)),
            None => size,
        };
        Self::window_mut(&mut state, window)?.size = applied;
        Ok(())
    }

    fn element_at(&self, _point: Point) -> PlatformResult<Option<ElementHandle>> {
        let state = self.lock();
        Self::check_trusted(&state)?;
        Ok(state.element_owner.map(|_| ElementHandle(0)))
    }

    fn owner_pid(&self, _element: ElementHandle) -> PlatformResult<ProcessId> {
        self.lock()
            .element_owner
            .ok_or_else(|| PlatformError::ElementNotFound("element".to_string()))
    }

    fn activate(&self, pid: ProcessId) -> PlatformResult<()> {
        self.lock().activations.push(pid);
        Ok(())
    }
}

impl Highlighter for FakeDesktop {
    fn highlight(&self, at: Point, _style: &HighlightStyle) {
        self.lock().highlights.push(at);
    }
}
