//! Scoped progress indicator shown while a blocking call is in flight.

use std::io::{self, Write};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

const FRAMES: &[&str] = &["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"];

const TICK: Duration = Duration::from_millis(100);

/// A spinner line redrawn on a background thread.
///
/// The thread only draws; it shares nothing with the caller but a stop flag.
/// Dropping the indicator stops and joins the thread, so it is cleaned up on
/// every exit path of the enclosing scope, including `?` returns.
pub struct ProgressIndicator {
    running: Arc<AtomicBool>,
    handle: Option<JoinHandle<()>>,
}

impl ProgressIndicator {
    /// Start an indicator drawing to stderr.
    pub fn start(message: impl Into<String>) -> Self {
        Self::start_with_writer(message, io::stderr())
    }

    /// Start an indicator drawing to the given writer.
    pub fn start_with_writer<W>(message: impl Into<String>, mut writer: W) -> Self
    where
        W: Write + Send + 'static,
    {
        let message = message.into();
        let running = Arc::new(AtomicBool::new(true));
        let flag = Arc::clone(&running);

        let handle = thread::spawn(move || {
            let mut frame = 0;
            while flag.load(Ordering::Acquire) {
                // Drawing errors are ignored; the indicator is cosmetic.
                let _ = write!(writer, "\r  {} {}...", FRAMES[frame % FRAMES.len()], message);
                let _ = writer.flush();
                thread::sleep(TICK);
                frame += 1;
            }
            let _ = writeln!(writer, "\r  ✓ {}... done!     ", message);
            let _ = writer.flush();
        });

        Self {
            running,
            handle: Some(handle),
        }
    }

    /// Stop the indicator and wait for its thread to finish.
    pub fn stop(mut self) {
        self.shutdown();
    }

    fn shutdown(&mut self) {
        self.running.store(false, Ordering::Release);
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
    }
}

impl Drop for ProgressIndicator {
    fn drop(&mut self) {
        self.shutdown();
    }
}
