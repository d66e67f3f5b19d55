// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Live scan session. Drives frames through detection and the stabilizer on a
// dedicated worker thread and reports overlay updates over a channel.
//
// The worker owns the stabilizer, so observations are always processed one
// at a time in frame order. The host controls the session through atomic
// flags on the returned `ScanHandle`.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{self, Receiver, Sender};
use std::thread::JoinHandle;

use quadscan_core::config::ScanConfig;
use quadscan_core::error::{QuadscanError, Result};
use quadscan_core::geometry::Size;
use quadscan_core::types::Quadrilateral;
use tracing::{debug, info, warn};

use super::detect::{RectangleDetector, detect_observation};
use super::stabilizer::{Decision, RectangleStabilizer};

/// One captured frame and its pixel dimensions.
#[derive(Debug, Clone)]
pub struct SourceFrame<F> {
    pub frame: F,
    pub size: Size,
}

/// A stream of camera frames.
pub trait FrameSource {
    type Frame;

    /// Block until the next frame is available. `None` ends the session.
    fn next_frame(&mut self) -> Option<Result<SourceFrame<Self::Frame>>>;
}

/// Frames pushed from another thread; the stream ends when every sender is
/// dropped.
impl<F> FrameSource for Receiver<SourceFrame<F>> {
    type Frame = F;

    fn next_frame(&mut self) -> Option<Result<SourceFrame<F>>> {
        self.recv().ok().map(Ok)
    }
}

/// Updates delivered to the host.
#[derive(Debug)]
pub enum ScanEvent {
    /// Redraw the overlay at `quad`, or remove it when `None`.
    Quad {
        quad: Option<Quadrilateral>,
        image_size: Size,
    },
    /// Redraw at `quad` and take the picture. Detection is paused until the
    /// host calls [`ScanHandle::set_detecting`].
    AutoCapture { quad: Quadrilateral, image_size: Size },
    /// The frame source failed; the session has stopped.
    Failed(QuadscanError),
    /// Last event of every session.
    Finished,
}

#[derive(Debug)]
struct SessionFlags {
    running: AtomicBool,
    detecting: AtomicBool,
    editing: AtomicBool,
    auto_scan_enabled: AtomicBool,
    /// Set when detection is switched back on; the worker resets the
    /// stabilizer before its next detection.
    reset_pending: AtomicBool,
}

/// Host-side control of a running session.
///
/// Dropping the handle stops the worker after its current frame.
pub struct ScanHandle {
    flags: Arc<SessionFlags>,
    events: Receiver<ScanEvent>,
    worker: Option<JoinHandle<()>>,
}

impl ScanHandle {
    pub fn events(&self) -> &Receiver<ScanEvent> {
        &self.events
    }

    /// Block for the next event.
    pub fn recv(&self) -> Result<ScanEvent> {
        self.events.recv().map_err(|_| QuadscanError::SessionClosed)
    }

    /// Pause or resume detection. Frames keep flowing while paused; resuming
    /// starts the stabilizer from scratch.
    pub fn set_detecting(&self, detecting: bool) {
        if detecting && !self.is_detecting() {
            self.flags.reset_pending.store(true, Ordering::Release);
        }
        self.flags.detecting.store(detecting, Ordering::Release);
    }

    pub fn is_detecting(&self) -> bool {
        self.flags.detecting.load(Ordering::Acquire)
    }

    /// While editing, auto-capture is downgraded to a plain overlay update.
    pub fn set_editing(&self, editing: bool) {
        self.flags.editing.store(editing, Ordering::Release);
    }

    pub fn set_auto_scan_enabled(&self, enabled: bool) {
        self.flags.auto_scan_enabled.store(enabled, Ordering::Release);
    }

    /// Ask the worker to stop. Takes effect once the source yields its next
    /// frame.
    pub fn stop(&self) {
        self.flags.running.store(false, Ordering::Release);
    }

    /// Wait for the worker thread to exit.
    pub fn join(mut self) -> Result<()> {
        match self.worker.take() {
            Some(worker) => worker.join().map_err(|_| QuadscanError::SessionClosed),
            None => Ok(()),
        }
    }
}

impl Drop for ScanHandle {
    fn drop(&mut self) {
        self.stop();
    }
}

/// Worker-side state of a scan session.
pub struct ScanSession<S, D> {
    source: S,
    detector: D,
    stabilizer: RectangleStabilizer,
    flags: Arc<SessionFlags>,
    events: Sender<ScanEvent>,
}

impl<S, D> ScanSession<S, D>
where
    S: FrameSource + Send + 'static,
    D: RectangleDetector<Frame = S::Frame> + Send + 'static,
{
    /// Validate `config` and start processing frames from `source` on a
    /// background thread.
    pub fn spawn(source: S, mut detector: D, config: ScanConfig) -> Result<ScanHandle> {
        let stabilizer = RectangleStabilizer::new(config.stabilizer.clone())?;
        detector.configure(&config.detection);

        let flags = Arc::new(SessionFlags {
            running: AtomicBool::new(true),
            detecting: AtomicBool::new(true),
            editing: AtomicBool::new(false),
            auto_scan_enabled: AtomicBool::new(config.auto_scan_enabled),
            reset_pending: AtomicBool::new(false),
        });
        let (tx, rx) = mpsc::channel();

        let session = Self {
            source,
            detector,
            stabilizer,
            flags: Arc::clone(&flags),
            events: tx,
        };
        let worker = std::thread::Builder::new()
            .name("quadscan-session".into())
            .spawn(move || session.run())?;

        info!(auto_scan = config.auto_scan_enabled, "scan session started");
        Ok(ScanHandle {
            flags,
            events: rx,
            worker: Some(worker),
        })
    }

    fn run(mut self) {
        while self.flags.running.load(Ordering::Acquire) {
            let frame = match self.source.next_frame() {
                Some(Ok(frame)) => frame,
                Some(Err(e)) => {
                    warn!(error = %e, "frame source failed");
                    let _ = self.events.send(ScanEvent::Failed(e));
                    break;
                }
                None => {
                    debug!("frame source exhausted");
                    break;
                }
            };

            if !self.flags.detecting.load(Ordering::Acquire) {
                continue;
            }
            if self.flags.reset_pending.swap(false, Ordering::AcqRel) {
                debug!("detection resumed");
                self.stabilizer.reset();
            }

            let Some(event) = self.process(&frame) else {
                continue;
            };
            if self.events.send(event).is_err() {
                debug!("event receiver dropped; stopping session");
                break;
            }
        }

        let _ = self.events.send(ScanEvent::Finished);
        info!("scan session finished");
    }

    fn process(&mut self, frame: &SourceFrame<S::Frame>) -> Option<ScanEvent> {
        let image_size = frame.size;
        let observation = detect_observation(&mut self.detector, &frame.frame, image_size);

        match self.stabilizer.observe(observation) {
            Decision::NoChange => None,
            Decision::Clear => Some(ScanEvent::Quad {
                quad: None,
                image_size,
            }),
            Decision::Show(quad) => Some(ScanEvent::Quad {
                quad: Some(quad),
                image_size,
            }),
            Decision::ShowAndAutoCapture(quad) => {
                let editing = self.flags.editing.load(Ordering::Acquire);
                let enabled = self.flags.auto_scan_enabled.load(Ordering::Acquire);
                if editing || !enabled {
                    return Some(ScanEvent::Quad {
                        quad: Some(quad),
                        image_size,
                    });
                }

                info!(quad = %quad, "auto-capture");
                self.flags.detecting.store(false, Ordering::Release);
                self.stabilizer.reset();
                Some(ScanEvent::AutoCapture { quad, image_size })
            }
        }
    }
}
