use crate::input::native_key;
use anyhow::Result;
use screenlink_core::utils::denormalize_coords;
use screenlink_core::{InputKind, InputMessage, MouseButton};
use std::sync::Arc;
use tracing::{debug, warn};

/// Lines scrolled per wheel event, regardless of the remote delta's magnitude.
pub const SCROLL_STEP: i32 = 3;

/// OS-level input backend on the host.
pub trait InputInjector: Send + Sync {
    /// Primary display size in pixels.
    fn screen_size(&self) -> Result<(u32, u32)>;

    fn move_mouse(&self, x: i32, y: i32) -> Result<()>;

    fn click(&self, button: MouseButton) -> Result<()>;

    fn toggle_button(&self, button: MouseButton, down: bool) -> Result<()>;

    fn scroll(&self, dx: i32, dy: i32) -> Result<()>;

    fn tap_key(&self, key: &str) -> Result<()>;

    fn release_key(&self, key: &str) -> Result<()>;
}

/// Applies remote admin input to the local machine.
#[derive(Clone)]
pub struct InputDispatcher {
    injector: Arc<dyn InputInjector>,
}

impl InputDispatcher {
    pub fn new(injector: Arc<dyn InputInjector>) -> Self {
        Self { injector }
    }

    /// Never fails: backend errors and unsupported keys are logged and dropped.
    pub fn dispatch(&self, msg: &InputMessage) {
        if let Err(e) = self.apply(msg) {
            warn!("Error executing input ({:?}): {:?}", msg.kind, e);
        }
    }

    fn apply(&self, msg: &InputMessage) -> Result<()> {
        let button = msg.button.unwrap_or(MouseButton::Left);

        match msg.kind {
            InputKind::MouseMove => {
                let (Some(x), Some(y)) = (msg.x, msg.y) else {
                    debug!("mouse-move without coordinates");
                    return Ok(());
                };
                let (width, height) = self.injector.screen_size()?;
                let (px, py) = denormalize_coords(x, y, width, height);
                self.injector.move_mouse(px, py)
            }

            InputKind::MouseClick => self.injector.click(button),
            InputKind::MouseDown => self.injector.toggle_button(button, true),
            InputKind::MouseUp => self.injector.toggle_button(button, false),

            InputKind::MouseScroll => match msg.delta {
                Some(d) if d > 0.0 => self.injector.scroll(0, -SCROLL_STEP),
                Some(_) => self.injector.scroll(0, SCROLL_STEP),
                None => Ok(()),
            },

            InputKind::KeyPress | InputKind::KeyRelease => {
                let Some(code) = msg.key.as_deref() else {
                    return Ok(());
                };
                let Some(key) = native_key(code) else {
                    warn!("Unsupported key code: {}", code);
                    return Ok(());
                };

                if msg.kind == InputKind::KeyPress {
                    self.injector.tap_key(key)
                } else {
                    self.injector.release_key(key)
                }
            }
        }
    }
}
