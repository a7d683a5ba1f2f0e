//! macOS window-system services
//!
//! - Displays: Quartz display services for bounds, AppKit (`NSScreen`) for
//!   the usable area and names
//! - Pointer: `CGWarpMouseCursorPosition`, drag events posted to the HID tap
//! - Accessibility: `AXUIElement` for window geometry and hit-testing
//! - Highlight: a borderless, click-through `NSPanel` animated frame by frame
//!
//! Requirements:
//! - Accessibility permissions must be granted for window moves, drag
//!   events and refocusing
//! - System Settings > Privacy & Security > Accessibility
//!
//! AppKit objects are only touched from the main thread. The binary runs a
//! current-thread runtime on the main thread, so spawned tasks qualify.

use std::collections::HashMap;
use std::ffi::{c_void, CStr};
use std::os::raw::c_char;
use std::ptr;
use std::sync::Mutex;
use std::time::Duration;

use cocoa::base::{id, nil, BOOL, NO, YES};
use cocoa::foundation::{NSPoint, NSRect, NSSize};
use core_foundation::base::TCFType;
use core_foundation::string::CFString;
use core_graphics::display::{CGDirectDisplayID, CGDisplay};
use core_graphics::event::{CGEvent, CGEventTapLocation, CGEventType, CGMouseButton};
use core_graphics::event_source::{CGEventSource, CGEventSourceStateID};
use core_graphics::geometry::{CGPoint, CGSize};
use objc::{class, msg_send, sel, sel_impl};
use tokio::time::{interval, Instant, MissedTickBehavior};

use crate::feedback::{HighlightStyle, Highlighter};
use crate::geometry::{Point, Rect, Size};
use crate::screen::Display;

use super::{
    AccessibilityBridge, DisplayProvider, ElementHandle, PlatformError, PlatformResult,
    PointerDevice, ProcessId, WindowHandle,
};

// ============================================================================
// Accessibility API
// ============================================================================

type AXUIElementRef = *mut c_void;
type AXError = i32;

const K_AX_ERROR_SUCCESS: AXError = 0;
const K_AX_ERROR_INVALID_UI_ELEMENT: AXError = -25202;
const K_AX_ERROR_CANNOT_COMPLETE: AXError = -25204;
const K_AX_ERROR_ATTRIBUTE_UNSUPPORTED: AXError = -25205;
const K_AX_ERROR_API_DISABLED: AXError = -25211;
const K_AX_ERROR_NO_VALUE: AXError = -25212;

const K_AX_VALUE_TYPE_CG_POINT: i32 = 1;
const K_AX_VALUE_TYPE_CG_SIZE: i32 = 2;

#[link(name = "ApplicationServices", kind = "framework")]
extern "C" {
    fn AXIsProcessTrusted() -> bool;
    fn AXUIElementCreateApplication(pid: i32) -> AXUIElementRef;
    fn AXUIElementCreateSystemWide() -> AXUIElementRef;
    fn AXUIElementCopyAttributeValue(
        element: AXUIElementRef,
        attribute: *const c_void,
        value: *mut *mut c_void,
    ) -> AXError;
    fn AXUIElementSetAttributeValue(
        element: AXUIElementRef,
        attribute: *const c_void,
        value: *const c_void,
    ) -> AXError;
    fn AXUIElementCopyElementAtPosition(
        element: AXUIElementRef,
        x: f32,
        y: f32,
        out: *mut AXUIElementRef,
    ) -> AXError;
    fn AXUIElementGetPid(element: AXUIElementRef, pid: *mut i32) -> AXError;
    fn AXValueCreate(value_type: i32, value: *const c_void) -> *mut c_void;
    fn AXValueGetValue(value: *const c_void, value_type: i32, value_ptr: *mut c_void) -> bool;
}

#[link(name = "CoreFoundation", kind = "framework")]
extern "C" {
    fn CFArrayGetCount(array: *const c_void) -> isize;
    fn CFArrayGetValueAtIndex(array: *const c_void, idx: isize) -> *const c_void;
    fn CFRetain(cf: *const c_void) -> *const c_void;
    fn CFRelease(cf: *const c_void);
}

/// Whether the process may use the accessibility API
pub fn is_process_trusted() -> bool {
    unsafe { AXIsProcessTrusted() }
}

fn ax_error(code: AXError, what: &str) -> PlatformError {
    match code {
        K_AX_ERROR_API_DISABLED => PlatformError::PermissionDenied(format!(
            "{}: accessibility access is not granted",
            what
        )),
        K_AX_ERROR_INVALID_UI_ELEMENT | K_AX_ERROR_NO_VALUE => {
            PlatformError::ElementNotFound(what.to_string())
        }
        K_AX_ERROR_ATTRIBUTE_UNSUPPORTED => PlatformError::AttributeUnsupported(what.to_string()),
        K_AX_ERROR_CANNOT_COMPLETE => {
            PlatformError::Platform(format!("{}: application did not respond", what))
        }
        other => PlatformError::Platform(format!("{}: AXError {}", what, other)),
    }
}

fn attribute(name: &'static str) -> CFString {
    CFString::from_static_string(name)
}

/// Owned (+1) reference to an accessibility element
struct AxElement(AXUIElementRef);

// SAFETY: AXUIElement references are CF objects, which may be retained,
// released and messaged from any thread
unsafe impl Send for AxElement {}

impl AxElement {
    /// Take ownership of a reference returned by a Create/Copy function
    fn from_create(raw: AXUIElementRef) -> Option<Self> {
        (!raw.is_null()).then_some(Self(raw))
    }

    /// Retain a reference borrowed from a container
    fn retained(raw: *const c_void) -> Option<Self> {
        if raw.is_null() {
            return None;
        }
        unsafe { CFRetain(raw) };
        Some(Self(raw as AXUIElementRef))
    }

    fn copy_attribute(&self, name: &'static str) -> PlatformResult<*mut c_void> {
        let attr = attribute(name);
        let mut value: *mut c_void = ptr::null_mut();
        let code = unsafe {
            AXUIElementCopyAttributeValue(
                self.0,
                attr.as_concrete_TypeRef() as *const c_void,
                &mut value,
            )
        };

        if code != K_AX_ERROR_SUCCESS {
            return Err(ax_error(code, name));
        }
        if value.is_null() {
            return Err(PlatformError::ElementNotFound(name.to_string()));
        }
        Ok(value)
    }

    fn get_value<T: Default>(&self, name: &'static str, value_type: i32) -> PlatformResult<T> {
        let value = self.copy_attribute(name)?;
        let mut out = T::default();
        let ok = unsafe { AXValueGetValue(value, value_type, &mut out as *mut T as *mut c_void) };
        unsafe { CFRelease(value) };

        if ok {
            Ok(out)
        } else {
            Err(PlatformError::AttributeUnsupported(name.to_string()))
        }
    }

    fn set_value<T>(&self, name: &'static str, value_type: i32, value: &T) -> PlatformResult<()> {
        let ax_value = unsafe { AXValueCreate(value_type, value as *const T as *const c_void) };
        if ax_value.is_null() {
            return Err(PlatformError::Platform(format!("{}: AXValueCreate failed", name)));
        }

        let attr = attribute(name);
        let code = unsafe {
            AXUIElementSetAttributeValue(
                self.0,
                attr.as_concrete_TypeRef() as *const c_void,
                ax_value,
            )
        };
        unsafe { CFRelease(ax_value) };

        if code == K_AX_ERROR_SUCCESS {
            Ok(())
        } else {
            Err(ax_error(code, name))
        }
    }

    fn windows(&self) -> PlatformResult<Vec<AxElement>> {
        let array = match self.copy_attribute("AXWindows") {
            Ok(array) => array,
            Err(PlatformError::ElementNotFound(_)) => return Ok(Vec::new()),
            Err(e) => return Err(e),
        };

        let count = unsafe { CFArrayGetCount(array) };
        let windows = (0..count)
            .filter_map(|i| AxElement::retained(unsafe { CFArrayGetValueAtIndex(array, i) }))
            .collect();

        unsafe { CFRelease(array) };
        Ok(windows)
    }
}

impl Drop for AxElement {
    fn drop(&mut self) {
        unsafe { CFRelease(self.0) };
    }
}

/// Point and size records share CoreGraphics' layout
#[derive(Default)]
#[repr(C)]
struct AxPoint {
    x: f64,
    y: f64,
}

#[derive(Default)]
#[repr(C)]
struct AxSize {
    width: f64,
    height: f64,
}

// ============================================================================
// AppKit helpers
// ============================================================================

unsafe fn ns_string_to_string(string: id) -> Option<String> {
    if string == nil {
        return None;
    }
    let utf8: *const c_char = msg_send![string, UTF8String];
    if utf8.is_null() {
        return None;
    }
    Some(CStr::from_ptr(utf8).to_string_lossy().into_owned())
}

fn is_main_thread() -> bool {
    unsafe {
        let main: BOOL = msg_send![class!(NSThread), isMainThread];
        main == YES
    }
}

fn frontmost_pid() -> PlatformResult<ProcessId> {
    unsafe {
        let workspace: id = msg_send![class!(NSWorkspace), sharedWorkspace];
        let app: id = msg_send![workspace, frontmostApplication];
        if app == nil {
            return Err(PlatformError::ElementNotFound(
                "frontmost application".to_string(),
            ));
        }
        let pid: i32 = msg_send![app, processIdentifier];
        Ok(pid)
    }
}

/// Name and usable frame (desktop space) of every `NSScreen`, by display id
fn screen_info() -> HashMap<CGDirectDisplayID, (String, Rect)> {
    let mut info = HashMap::new();

    unsafe {
        let screens: id = msg_send![class!(NSScreen), screens];
        if screens == nil {
            return info;
        }

        let count: usize = msg_send![screens, count];
        for i in 0..count {
            let screen: id = msg_send![screens, objectAtIndex: i];
            let description: id = msg_send![screen, deviceDescription];
            let key: id = msg_send![class!(NSString), stringWithUTF8String: c"NSScreenNumber".as_ptr()];
            let number: id = msg_send![description, objectForKey: key];
            if number == nil {
                continue;
            }
            let display_id: u32 = msg_send![number, unsignedIntValue];

            let name_object: id = msg_send![screen, localizedName];
            let name =
                ns_string_to_string(name_object).unwrap_or_else(|| format!("Display {}", display_id));

            let visible: NSRect = msg_send![screen, visibleFrame];
            let usable = Rect::new(
                visible.origin.x,
                visible.origin.y,
                visible.size.width,
                visible.size.height,
            );

            info.insert(display_id, (name, usable));
        }
    }

    info
}

// ============================================================================
// Displays
// ============================================================================

/// Display enumeration through Quartz display services
pub struct MacOSDisplays;

impl MacOSDisplays {
    pub fn new() -> Self {
        Self
    }
}

impl Default for MacOSDisplays {
    fn default() -> Self {
        Self::new()
    }
}

impl DisplayProvider for MacOSDisplays {
    fn displays(&self) -> PlatformResult<Vec<Display>> {
        let mut ids = CGDisplay::active_displays()
            .map_err(|e| PlatformError::Platform(format!("CGGetActiveDisplayList: {}", e)))?;

        let main = CGDisplay::main().id;
        // Primary first: its height is the reference for every flip
        ids.sort_by_key(|id| *id != main);

        let reference_height = ids
            .first()
            .map(|id| CGDisplay::new(*id).bounds().size.height)
            .unwrap_or(0.0);
        let screens = screen_info();

        let displays = ids
            .into_iter()
            .map(|display_id| {
                let cg = CGDisplay::new(display_id).bounds();
                // Quartz reports top-left origin rectangles
                let bounds =
                    Rect::new(cg.origin.x, cg.origin.y, cg.size.width, cg.size.height)
                        .flipped(reference_height);

                let (name, usable) = screens
                    .get(&display_id)
                    .cloned()
                    .unwrap_or_else(|| (format!("Display {}", display_id), bounds));

                Display::new(display_id, name, bounds, usable)
                    .with_primary(display_id == main)
                    .with_built_in(CGDisplay::new(display_id).is_builtin())
            })
            .collect::<Vec<_>>();

        tracing::trace!("Enumerated {} display(s)", displays.len());
        Ok(displays)
    }
}

// ============================================================================
// Pointer
// ============================================================================

/// Cursor access through AppKit and Quartz events
pub struct MacOSPointer;

impl MacOSPointer {
    pub fn new() -> Self {
        Self
    }
}

impl Default for MacOSPointer {
    fn default() -> Self {
        Self::new()
    }
}

impl PointerDevice for MacOSPointer {
    fn location(&self) -> PlatformResult<Point> {
        let location: NSPoint = unsafe { msg_send![class!(NSEvent), mouseLocation] };
        Ok(Point::new(location.x, location.y))
    }

    fn is_primary_button_down(&self) -> bool {
        let buttons: usize = unsafe { msg_send![class!(NSEvent), pressedMouseButtons] };
        buttons & 1 != 0
    }

    fn is_any_button_down(&self) -> bool {
        let buttons: usize = unsafe { msg_send![class!(NSEvent), pressedMouseButtons] };
        buttons != 0
    }

    fn warp(&self, to: Point) -> PlatformResult<()> {
        CGDisplay::warp_mouse_cursor_position(CGPoint::new(to.x, to.y))
            .map_err(|e| PlatformError::Platform(format!("CGWarpMouseCursorPosition: {}", e)))?;
        // Without this the hardware cursor stalls briefly after a warp
        let _ = CGDisplay::associate_mouse_and_mouse_cursor_position(true);
        Ok(())
    }

    fn post_drag(&self, at: Point) -> PlatformResult<()> {
        if !is_process_trusted() {
            return Err(PlatformError::PermissionDenied(
                "posting input events".to_string(),
            ));
        }

        let source = CGEventSource::new(CGEventSourceStateID::HIDSystemState)
            .map_err(|_| PlatformError::Platform("CGEventSourceCreate failed".to_string()))?;
        let event = CGEvent::new_mouse_event(
            source,
            CGEventType::LeftMouseDragged,
            CGPoint::new(at.x, at.y),
            CGMouseButton::Left,
        )
        .map_err(|_| PlatformError::Platform("CGEventCreateMouseEvent failed".to_string()))?;

        event.post(CGEventTapLocation::HID);
        Ok(())
    }
}

// ============================================================================
// Accessibility
// ============================================================================

#[derive(Default)]
struct HandleTable {
    windows: Vec<AxElement>,
    elements: Vec<AxElement>,
}

/// Window geometry and hit-testing through `AXUIElement`.
///
/// Handles index into tables that are replaced on every
/// `frontmost_windows`/`element_at` call.
pub struct MacOSAccessibility {
    handles: Mutex<HandleTable>,
}

impl MacOSAccessibility {
    pub fn new() -> Self {
        Self {
            handles: Mutex::new(HandleTable::default()),
        }
    }

    fn with_window<T>(
        &self,
        window: WindowHandle,
        f: impl FnOnce(&AxElement) -> PlatformResult<T>,
    ) -> PlatformResult<T> {
        let table = self
            .handles
            .lock()
            .map_err(|_| PlatformError::Platform("handle table poisoned".to_string()))?;
        let element = table
            .windows
            .get(window.0 as usize)
            .ok_or_else(|| PlatformError::ElementNotFound(format!("window {}", window.0)))?;
        f(element)
    }

    fn require_trusted(&self) -> PlatformResult<()> {
        if is_process_trusted() {
            Ok(())
        } else {
            Err(PlatformError::PermissionDenied(
                "Accessibility permission required. Please enable in System Settings > Privacy & Security > Accessibility".to_string(),
            ))
        }
    }
}

impl Default for MacOSAccessibility {
    fn default() -> Self {
        Self::new()
    }
}

impl AccessibilityBridge for MacOSAccessibility {
    fn is_trusted(&self) -> bool {
        is_process_trusted()
    }

    fn frontmost_windows(&self) -> PlatformResult<Vec<WindowHandle>> {
        self.require_trusted()?;

        let pid = frontmost_pid()?;
        let app = AxElement::from_create(unsafe { AXUIElementCreateApplication(pid) })
            .ok_or_else(|| PlatformError::ElementNotFound(format!("application {}", pid)))?;
        let windows = app.windows()?;

        let mut table = self
            .handles
            .lock()
            .map_err(|_| PlatformError::Platform("handle table poisoned".to_string()))?;
        table.windows = windows;

        tracing::trace!("Process {} has {} window(s)", pid, table.windows.len());
        Ok((0..table.windows.len() as u64).map(WindowHandle).collect())
    }

    fn window_position(&self, window: WindowHandle) -> PlatformResult<Point> {
        self.with_window(window, |element| {
            let p: AxPoint = element.get_value("AXPosition", K_AX_VALUE_TYPE_CG_POINT)?;
            Ok(Point::new(p.x, p.y))
        })
    }

    fn window_size(&self, window: WindowHandle) -> PlatformResult<Size> {
        self.with_window(window, |element| {
            let s: AxSize = element.get_value("AXSize", K_AX_VALUE_TYPE_CG_SIZE)?;
            Ok(Size::new(s.width, s.height))
        })
    }

    fn set_window_position(&self, window: WindowHandle, position: Point) -> PlatformResult<()> {
        self.with_window(window, |element| {
            let point = CGPoint::new(position.x, position.y);
            element.set_value("AXPosition", K_AX_VALUE_TYPE_CG_POINT, &point)
        })
    }

    fn set_window_size(&self, window: WindowHandle, size: Size) -> PlatformResult<()> {
        self.with_window(window, |element| {
            let size = CGSize::new(size.width, size.height);
            element.set_value("AXSize", K_AX_VALUE_TYPE_CG_SIZE, &size)
        })
    }

    fn element_at(&self, point: Point) -> PlatformResult<Option<ElementHandle>> {
        self.require_trusted()?;

        let system = AxElement::from_create(unsafe { AXUIElementCreateSystemWide() })
            .ok_or_else(|| PlatformError::Platform("AXUIElementCreateSystemWide failed".to_string()))?;

        let mut raw: AXUIElementRef = ptr::null_mut();
        let code = unsafe {
            AXUIElementCopyElementAtPosition(system.0, point.x as f32, point.y as f32, &mut raw)
        };

        match code {
            K_AX_ERROR_SUCCESS => {}
            K_AX_ERROR_NO_VALUE => return Ok(None),
            other => return Err(ax_error(other, "element at position")),
        }

        let Some(element) = AxElement::from_create(raw) else {
            return Ok(None);
        };

        let mut table = self
            .handles
            .lock()
            .map_err(|_| PlatformError::Platform("handle table poisoned".to_string()))?;
        table.elements = vec![element];
        Ok(Some(ElementHandle(0)))
    }

    fn owner_pid(&self, element: ElementHandle) -> PlatformResult<ProcessId> {
        let table = self
            .handles
            .lock()
            .map_err(|_| PlatformError::Platform("handle table poisoned".to_string()))?;
        let element = table
            .elements
            .get(element.0 as usize)
            .ok_or_else(|| PlatformError::ElementNotFound(format!("element {}", element.0)))?;

        let mut pid: i32 = 0;
        let code = unsafe { AXUIElementGetPid(element.0, &mut pid) };
        if code == K_AX_ERROR_SUCCESS {
            Ok(pid)
        } else {
            Err(ax_error(code, "element owner"))
        }
    }

    fn activate(&self, pid: ProcessId) -> PlatformResult<()> {
        unsafe {
            let app: id = msg_send![
                class!(NSRunningApplication),
                runningApplicationWithProcessIdentifier: pid
            ];
            if app == nil {
                return Err(PlatformError::ElementNotFound(format!("process {}", pid)));
            }

            // NSApplicationActivateIgnoringOtherApps
            let activated: BOOL = msg_send![app, activateWithOptions: 2u64];
            if activated == NO {
                return Err(PlatformError::Platform(format!(
                    "process {} refused activation",
                    pid
                )));
            }
        }
        Ok(())
    }
}

// ============================================================================
// Highlight
// ============================================================================

/// NSMainMenuWindowLevel
const MAIN_MENU_WINDOW_LEVEL: i64 = 24;
/// NSWindowStyleMaskBorderless | NSWindowStyleMaskNonactivatingPanel
const PANEL_STYLE_MASK: u64 = 1 << 7;
/// NSBackingStoreBuffered
const BACKING_BUFFERED: u64 = 2;
const FRAME_INTERVAL: Duration = Duration::from_millis(16);

/// Overlay panel and its ring layer
struct RingOverlay {
    panel: id,
    ring: id,
}

// SAFETY: overlays are created and driven on the main thread only; see the
// module documentation
unsafe impl Send for RingOverlay {}

impl RingOverlay {
    unsafe fn open(frame: Rect, style: &HighlightStyle) -> Option<Self> {
        let rect = NSRect::new(
            NSPoint::new(frame.min_x(), frame.min_y()),
            NSSize::new(frame.width(), frame.height()),
        );

        let panel: id = msg_send![class!(NSPanel), alloc];
        let panel: id = msg_send![panel, initWithContentRect: rect
                                            styleMask: PANEL_STYLE_MASK
                                            backing: BACKING_BUFFERED
                                            defer: NO];
        if panel == nil {
            return None;
        }

        let clear: id = msg_send![class!(NSColor), clearColor];
        let _: () = msg_send![panel, setBackgroundColor: clear];
        let _: () = msg_send![panel, setOpaque: NO];
        let _: () = msg_send![panel, setHasShadow: NO];
        let _: () = msg_send![panel, setLevel: MAIN_MENU_WINDOW_LEVEL];
        let _: () = msg_send![panel, setIgnoresMouseEvents: YES];
        let _: () = msg_send![panel, setReleasedWhenClosed: NO];

        let view: id = msg_send![panel, contentView];
        let _: () = msg_send![view, setWantsLayer: YES];
        let root: id = msg_send![view, layer];
        if root == nil {
            let _: () = msg_send![panel, release];
            return None;
        }

        let orange: id = msg_send![class!(NSColor), systemOrangeColor];
        let fill: id = msg_send![orange, colorWithAlphaComponent: 0.2f64];
        let border: *const c_void = msg_send![orange, CGColor];
        let background: *const c_void = msg_send![fill, CGColor];

        let ring: id = msg_send![class!(CALayer), layer];
        let _: () = msg_send![ring, setBorderWidth: style.ring_width];
        let _: () = msg_send![ring, setBorderColor: border];
        let _: () = msg_send![ring, setBackgroundColor: background];
        let _: () = msg_send![ring, setPosition: NSPoint::new(frame.width() / 2.0, frame.height() / 2.0)];
        let _: () = msg_send![root, addSublayer: ring];

        let _: () = msg_send![panel, orderFrontRegardless];
        Some(Self { panel, ring })
    }

    unsafe fn draw(&self, diameter: f64, opacity: f64) {
        let _: () = msg_send![class!(CATransaction), begin];
        let _: () = msg_send![class!(CATransaction), setDisableActions: YES];

        let bounds = NSRect::new(NSPoint::new(0.0, 0.0), NSSize::new(diameter, diameter));
        let _: () = msg_send![self.ring, setBounds: bounds];
        let _: () = msg_send![self.ring, setCornerRadius: diameter / 2.0];
        let _: () = msg_send![self.ring, setOpacity: opacity as f32];

        let _: () = msg_send![class!(CATransaction), commit];
        let _: () = msg_send![self.panel, display];
    }

    unsafe fn close(self) {
        let _: () = msg_send![self.panel, orderOut: nil];
        let _: () = msg_send![self.panel, close];
        let _: () = msg_send![self.panel, release];
    }
}

/// Cursor highlight drawn in a transient overlay panel
pub struct MacOSHighlighter;

impl MacOSHighlighter {
    pub fn new() -> Self {
        unsafe {
            // Overlay windows need an application object; stay out of the Dock
            let app: id = msg_send![class!(NSApplication), sharedApplication];
            // NSApplicationActivationPolicyAccessory
            let _: BOOL = msg_send![app, setActivationPolicy: 1i64];
        }
        Self
    }
}

impl Default for MacOSHighlighter {
    fn default() -> Self {
        Self::new()
    }
}

impl Highlighter for MacOSHighlighter {
    fn highlight(&self, at: Point, style: &HighlightStyle) {
        if !is_main_thread() {
            tracing::debug!("Highlight skipped: not on the main thread");
            return;
        }

        let Some(overlay) = (unsafe { RingOverlay::open(style.panel_rect(at), style) }) else {
            tracing::debug!("Highlight skipped: overlay panel could not be created");
            return;
        };

        let style = style.clone();
        tokio::spawn(async move {
            let start = Instant::now();
            let mut ticker = interval(FRAME_INTERVAL);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

            loop {
                ticker.tick().await;
                let elapsed = start.elapsed();
                let frame = style.frame_at(elapsed);
                unsafe { overlay.draw(style.diameter * frame.scale, frame.opacity) };

                if elapsed >= style.duration {
                    break;
                }
            }

            unsafe { overlay.close() };
        });
    }
}
