use anyhow::Result;
use screenlink_client::InputInjector;
use screenlink_core::MouseButton;
use std::sync::Mutex;

/// Records every injected input as a short string.
#[derive(Default)]
pub struct MockInjector {
    calls: Mutex<Vec<String>>,
}

impl MockInjector {
    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    fn record(&self, call: String) -> Result<()> {
        self.calls.lock().unwrap().push(call);
        Ok(())
    }
}

impl InputInjector for MockInjector {
    fn screen_size(&self) -> Result<(u32, u32)> {
        Ok((1920, 1080))
    }

    fn move_mouse(&self, x: i32, y: i32) -> Result<()> {
        self.record(format!("move {} {}", x, y))
    }

    fn click(&self, button: MouseButton) -> Result<()> {
        self.record(format!("click {:?}", button))
    }

    fn toggle_button(&self, button: MouseButton, down: bool) -> Result<()> {
        self.record(format!("toggle {:?} {}", button, down))
    }

    fn scroll(&self, dx: i32, dy: i32) -> Result<()> {
        self.record(format!("scroll {} {}", dx, dy))
    }

    fn tap_key(&self, key: &str) -> Result<()> {
        self.record(format!("tap {}", key))
    }

    fn release_key(&self, key: &str) -> Result<()> {
        self.record(format!("release {}", key))
    }
}
