//! Live preview of the displayed image.
//!
//! The evaluation thread never shares the image itself: after a statement
//! leaves the display dirty it sends an owned snapshot over a channel. The
//! preview thread wakes every cadence tick, keeps only the newest snapshot
//! and hands it to its [`Surface`].

use std::path::PathBuf;
use std::sync::mpsc::{self, Receiver, RecvTimeoutError, Sender};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use crate::error::{MipaError, Result};
use crate::render::write_png;
use crate::types::Image;

/// Something a frame can be presented on.
pub trait Surface: Send + 'static {
    fn present(&mut self, image: &Image, scale: u32) -> Result<()>;
}

/// Writes each frame to a PNG file, nearest-neighbour upscaled.
#[derive(Debug, Clone)]
pub struct PngSurface {
    path: PathBuf,
}

impl PngSurface {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl Surface for PngSurface {
    fn present(&mut self, image: &Image, scale: u32) -> Result<()> {
        write_png(image, &self.path, scale)
    }
}

enum Message {
    Frame { image: Image, scale: u32 },
    Stop,
}

/// Handle on a running preview thread.
pub struct Preview {
    sender: Sender<Message>,
    thread: Option<JoinHandle<usize>>,
}

impl Preview {
    /// Start presenting on `surface`, polling every `cadence`.
    ///
    /// `on_error` runs on the preview thread for frames that failed to
    /// present.
    pub fn spawn<S: Surface>(
        mut surface: S,
        cadence: Duration,
        on_error: impl Fn(MipaError) + Send + 'static,
    ) -> Self {
        let (sender, receiver) = mpsc::channel();
        let thread = thread::spawn(move || {
            present_loop(&receiver, cadence, |image, scale| {
                surface.present(image, scale).map_err(&on_error).is_ok()
            })
        });
        Self {
            sender,
            thread: Some(thread),
        }
    }

    /// Queue a frame. Frames sent after the thread stopped are dropped.
    pub fn send(&self, image: Image, scale: u32) {
        let _ = self.sender.send(Message::Frame { image, scale });
    }

    /// Present whatever is queued, stop the thread and wait for it.
    /// Returns how many frames were presented successfully.
    pub fn stop(mut self) -> usize {
        self.shutdown()
    }

    fn shutdown(&mut self) -> usize {
        let _ = self.sender.send(Message::Stop);
        self.thread
            .take()
            .and_then(|thread| thread.join().ok())
            .unwrap_or(0)
    }
}

impl Drop for Preview {
    fn drop(&mut self) {
        if self.thread.is_some() {
            self.shutdown();
        }
    }
}

/// Wait up to `cadence` for messages, then present the newest frame seen.
/// `present` reports whether the frame made it out; failures are not counted.
fn present_loop(
    receiver: &Receiver<Message>,
    cadence: Duration,
    mut present: impl FnMut(&Image, u32) -> bool,
) -> usize {
    let mut presented = 0;
    let mut pending: Option<(Image, u32)> = None;
    loop {
        let stop = match receiver.recv_timeout(cadence) {
            Ok(Message::Frame { image, scale }) => {
                pending = Some((image, scale));
                // drain the backlog so only the newest frame is shown
                let mut stop = false;
                while let Ok(message) = receiver.try_recv() {
                    match message {
                        Message::Frame { image, scale } => pending = Some((image, scale)),
                        Message::Stop => {
                            stop = true;
                            break;
                        }
                    }
                }
                stop
            }
            Ok(Message::Stop) | Err(RecvTimeoutError::Disconnected) => true,
            Err(RecvTimeoutError::Timeout) => false,
        };

        if let Some((image, scale)) = pending.take() {
            if present(&image, scale) {
                presented += 1;
            }
        }
        if stop {
            return presented;
        }
    }
}
