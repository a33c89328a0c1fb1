// RotationViewer: the headless core. Owns frames, index, drag state and the auto-rotation job.
// Talks to the page only through `Surface` and `Scheduler`, so it runs and tests natively.

use crate::animation::{AutoRotation, DEFAULT_DURATION_MS};
use crate::easing::{CubicBezier, Easing};
use crate::error::ViewerError;
use crate::events::{EventBus, ListenerId};
use crate::frames::FrameSet;
use crate::interaction::{DragMapper, DragState};
use crate::types::*;

pub const CONTAINER_CLASS: &str = "product-viewer";
pub const PRESS_ACTIVE_CLASS: &str = "product-viewer--js-press-active";
pub const IMAGE_CLASS: &str = "product-viewer__image";

/// The container the viewer draws into.
pub trait Surface {
    fn add_class(&mut self, class: &str);
    fn remove_class(&mut self, class: &str);
    /// Current rendered width in pixels. Read on every move.
    fn width(&self) -> f64;
    /// Create the image node showing `frame`.
    fn mount_image(&mut self, frame: &str);
    fn show_frame(&mut self, frame: &str);
    fn unmount_image(&mut self);
}

/// A cancellable repeating timer. The host calls `RotationViewer::tick` on each firing.
pub trait Scheduler {
    fn start(&mut self, period_ms: f64);
    fn cancel(&mut self);
}

/// Lifecycle phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// Frames are preloading; not interactive.
    Loading,
    Ready,
    /// A frame failed to preload. Never becomes interactive.
    Failed,
    /// Terminal.
    Destroyed,
}

pub struct RotationViewer<S: Surface, T: Scheduler> {
    frames: FrameSet,
    mapper: DragMapper,
    index: usize,
    drag: DragState,
    auto_rotation: Option<AutoRotation>,
    phase: Phase,
    surface: S,
    scheduler: T,
    bus: EventBus,
}

impl<S: Surface, T: Scheduler> RotationViewer<S, T> {
    /// Validate the configuration, build the frame list and tag the container.
    /// The viewer starts in `Loading`; call `mark_ready` once every frame has preloaded.
    pub fn new(config: &ViewerConfig, mut surface: S, scheduler: T) -> Result<Self, ViewerError> {
        config.validate()?;

        let frames = FrameSet::from_config(config);
        surface.add_class(CONTAINER_CLASS);
        log::debug!(
            "Viewer created with {} frames from {}",
            frames.len(),
            config.image_path
        );

        Ok(RotationViewer {
            mapper: DragMapper::new(frames.len(), config.invert_movement),
            frames,
            index: 0,
            drag: DragState::Idle,
            auto_rotation: None,
            phase: Phase::Loading,
            surface,
            scheduler,
            bus: EventBus::new(),
        })
    }

    pub fn frames(&self) -> &FrameSet {
        &self.frames
    }

    pub fn number_of_frames(&self) -> usize {
        self.frames.len()
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn current_frame(&self) -> Option<&str> {
        self.frames.get(self.index)
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn is_ready(&self) -> bool {
        self.phase == Phase::Ready
    }

    pub fn is_dragging(&self) -> bool {
        self.drag.is_dragging()
    }

    pub fn is_animating(&self) -> bool {
        self.auto_rotation.is_some()
    }

    pub fn surface(&self) -> &S {
        &self.surface
    }

    pub fn scheduler(&self) -> &T {
        &self.scheduler
    }

    pub fn scheduler_mut(&mut self) -> &mut T {
        &mut self.scheduler
    }

    pub fn subscribe(
        &mut self,
        kind: EventKind,
        listener: impl Fn(&ViewerEvent) + 'static,
    ) -> ListenerId {
        self.bus.subscribe(kind, listener)
    }

    pub fn unsubscribe(&mut self, id: ListenerId) -> bool {
        self.bus.unsubscribe(id)
    }

    fn emit(&self, event: ViewerEvent) {
        self.bus.emit(&event);
    }

    /// Readiness barrier passed: show frame 0 and become interactive.
    pub fn mark_ready(&mut self) -> Result<(), ViewerError> {
        match self.phase {
            Phase::Loading => {}
            Phase::Destroyed => return Err(ViewerError::Destroyed),
            Phase::Ready | Phase::Failed => {
                log::debug!("Ignoring readiness in phase {:?}", self.phase);
                return Ok(());
            }
        }

        if let Some(first) = self.frames.get(self.index) {
            self.surface.mount_image(first);
        }
        self.phase = Phase::Ready;
        log::info!("Viewer ready ({} frames)", self.frames.len());
        self.emit(ViewerEvent::Loaded);
        Ok(())
    }

    /// Readiness barrier failed. The viewer stays non-interactive.
    pub fn mark_failed(&mut self, error: &ViewerError) {
        if self.phase != Phase::Loading {
            return;
        }
        self.phase = Phase::Failed;
        log::error!("Viewer failed to load: {}", error);

        let frame = match error {
            ViewerError::PreloadFailed { frame, .. } => frame.clone(),
            _ => String::new(),
        };
        self.emit(ViewerEvent::Error(LoadFailure {
            frame,
            message: error.to_string(),
        }));
    }

    /// Start a drag at pointer position `x`. Ignored unless idle and ready.
    pub fn press(&mut self, x: f64) {
        if !self.is_ready() || self.drag.is_dragging() {
            return;
        }

        self.drag = DragState::Dragging {
            press_x: x,
            press_index: self.index,
        };
        self.surface.add_class(PRESS_ACTIVE_CLASS);
        self.emit(ViewerEvent::Press);
    }

    /// Follow the pointer to `x`. Ignored unless dragging. Cancels any auto-rotation.
    pub fn pointer_move(&mut self, x: f64) {
        let DragState::Dragging {
            press_x,
            press_index,
        } = self.drag
        else {
            return;
        };

        self.cancel_auto_rotation();

        let width = self.surface.width();
        let Some(step) = self.mapper.step(press_x, press_index, x, width) else {
            log::warn!("Container width {} is not measurable; skipping move", width);
            return;
        };

        self.apply_index(step.new_index);
        self.emit(ViewerEvent::Delta(DeltaPayload {
            pixel_offset: step.pixel_offset,
            number_of_images: self.frames.len(),
            offset_index: step.offset_index,
        }));
    }

    /// End the drag. Ignored unless dragging.
    pub fn release(&mut self) {
        if !self.drag.is_dragging() {
            return;
        }

        self.drag = DragState::Idle;
        self.surface.remove_class(PRESS_ACTIVE_CLASS);
        let image = self.current_frame().unwrap_or_default().to_string();
        self.emit(ViewerEvent::Release(ReleasePayload {
            index: self.index,
            image,
        }));
    }

    /// Show frame `index`. Returns `Ok(false)` when it is already displayed.
    pub fn update_index(&mut self, index: usize) -> Result<bool, ViewerError> {
        self.ensure_ready()?;
        if index >= self.frames.len() {
            return Err(ViewerError::IndexOutOfRange {
                index,
                len: self.frames.len(),
            });
        }
        Ok(self.apply_index(index))
    }

    // Only place that mutates `index`.
    fn apply_index(&mut self, index: usize) -> bool {
        if index == self.index {
            return false;
        }
        let Some(frame) = self.frames.get(index) else {
            return false;
        };

        self.index = index;
        self.surface.show_frame(frame);
        self.emit(ViewerEvent::Index(index));
        true
    }

    /// Auto-rotate once around with the default duration and easing.
    pub fn animate_360_default(&mut self) -> Result<(), ViewerError> {
        self.animate_360(DEFAULT_DURATION_MS, Easing::default())
    }

    /// Spin one full revolution over `duration_ms`, replacing any running spin.
    /// The curve is built once per spin.
    pub fn animate_360(
        &mut self,
        duration_ms: f64,
        easing: impl Into<CubicBezier>,
    ) -> Result<(), ViewerError> {
        self.ensure_ready()?;
        if !duration_ms.is_finite() || duration_ms <= 0.0 {
            return Err(ViewerError::InvalidDuration(duration_ms));
        }

        let curve: CubicBezier = easing.into();
        self.cancel_auto_rotation();
        let period = AutoRotation::interval_ms(duration_ms, self.frames.len());
        self.auto_rotation = Some(AutoRotation::new(
            self.index,
            self.frames.len(),
            Box::new(curve),
        ));
        self.scheduler.start(period);
        log::debug!("Auto-rotation started: {}ms, tick every {}ms", duration_ms, period);
        Ok(())
    }

    /// Timer callback. Stale ticks after the job ended are ignored.
    pub fn tick(&mut self) {
        let Some(rotation) = self.auto_rotation.as_mut() else {
            return;
        };
        let Some(tick) = rotation.advance() else {
            self.cancel_auto_rotation();
            return;
        };

        if tick.finished {
            self.auto_rotation = None;
            self.scheduler.cancel();
            log::debug!("Auto-rotation finished");
        }
        self.apply_index(tick.index);
    }

    /// Returns `true` if a running spin was cancelled.
    pub fn cancel_auto_rotation(&mut self) -> bool {
        if self.auto_rotation.take().is_some() {
            self.scheduler.cancel();
            true
        } else {
            false
        }
    }

    /// Release the image node and timer, notify, then drop all subscribers.
    pub fn destroy(&mut self) -> Result<(), ViewerError> {
        if self.phase == Phase::Destroyed {
            return Err(ViewerError::Destroyed);
        }

        self.cancel_auto_rotation();
        if self.drag.is_dragging() {
            self.surface.remove_class(PRESS_ACTIVE_CLASS);
        }
        self.drag = DragState::Idle;
        if self.phase == Phase::Ready {
            self.surface.unmount_image();
        }
        self.phase = Phase::Destroyed;
        log::info!("Viewer destroyed");

        self.emit(ViewerEvent::Destroyed);
        self.bus.clear();
        Ok(())
    }

    fn ensure_ready(&self) -> Result<(), ViewerError> {
        match self.phase {
            Phase::Ready => Ok(()),
            Phase::Destroyed => Err(ViewerError::Destroyed),
            Phase::Loading | Phase::Failed => Err(ViewerError::NotReady),
        }
    }
}

impl<S: Surface, T: Scheduler> std::fmt::Debug for RotationViewer<S, T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RotationViewer")
            .field("frames", &self.frames.len())
            .field("index", &self.index)
            .field("drag", &self.drag)
            .field("phase", &self.phase)
            .field("auto_rotation", &self.auto_rotation)
            .finish()
    }
}
