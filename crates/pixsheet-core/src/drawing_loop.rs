//! Frame tick driver.
//!
//! The platform calls [`DrawingLoop::tick`] once per animation frame with a
//! millisecond timestamp; registered callbacks receive the delta since the
//! previous tick, in registration order.

/// Callback invoked on every tick with the elapsed milliseconds.
pub type TickCallback = Box<dyn FnMut(f64)>;

/// Largest delta handed to callbacks, so a backgrounded tab does not fast
/// forward animations on return.
pub const MAX_DELTA_MS: f64 = 250.0;

#[derive(Default)]
pub struct DrawingLoop {
    callbacks: Vec<TickCallback>,
    last_timestamp: Option<f64>,
    running: bool,
}

impl DrawingLoop {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_callback(&mut self, callback: impl FnMut(f64) + 'static) {
        self.callbacks.push(Box::new(callback));
    }

    pub fn start(&mut self) {
        self.running = true;
        self.last_timestamp = None;
    }

    pub fn stop(&mut self) {
        self.running = false;
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    /// Advance to `timestamp_ms`. Returns the delta passed to callbacks, or
    /// `None` while stopped. The first tick after `start` has a zero delta.
    pub fn tick(&mut self, timestamp_ms: f64) -> Option<f64> {
        if !self.running {
            return None;
        }
        let delta = match self.last_timestamp {
            Some(last) => (timestamp_ms - last).clamp(0.0, MAX_DELTA_MS),
            None => 0.0,
        };
        self.last_timestamp = Some(timestamp_ms);
        for callback in &mut self.callbacks {
            callback(delta);
        }
        Some(delta)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    #[test]
    fn test_callbacks_receive_deltas_in_order() {
        let calls = Rc::new(RefCell::new(Vec::new()));
        let mut drawing_loop = DrawingLoop::new();
        for name in ["drawing", "animation"] {
            let calls = calls.clone();
            drawing_loop.add_callback(move |delta| calls.borrow_mut().push((name, delta)));
        }

        assert_eq!(drawing_loop.tick(0.0), None);
        drawing_loop.start();
        assert_eq!(drawing_loop.tick(100.0), Some(0.0));
        assert_eq!(drawing_loop.tick(116.0), Some(16.0));

        assert_eq!(
            *calls.borrow(),
            vec![("drawing", 0.0), ("animation", 0.0), ("drawing", 16.0), ("animation", 16.0)]
        );
    }

    #[test]
    fn test_delta_is_clamped() {
        let mut drawing_loop = DrawingLoop::new();
        drawing_loop.start();
        drawing_loop.tick(0.0);
        assert_eq!(drawing_loop.tick(10_000.0), Some(MAX_DELTA_MS));
        assert_eq!(drawing_loop.tick(5_000.0), Some(0.0));

        drawing_loop.stop();
        assert!(!drawing_loop.is_running());
        assert_eq!(drawing_loop.tick(5_016.0), None);
    }
}
