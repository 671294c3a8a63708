use std::cell::Cell;
use std::rc::Rc;

use crate::pointer::PointerTracker;
use crate::quality::{choose_downscale, internal_resolution};
use crate::surface::SurfaceSession;
use crate::types::SurfaceRect;

/// Result of applying one geometry change.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ResizeOutcome {
    /// Presented (layout) size in device pixels.
    pub external: (u32, u32),
    pub downscale: f32,
    /// Size handed to the session.
    pub requested: (u32, u32),
    /// Size the session actually allocated; reported to the kernel.
    pub actual: (u32, u32),
}

/// Keeps the render target proportional to the surface area.
#[derive(Debug)]
pub struct ResizeCoordinator {
    quality_override: Option<f32>,
    resolution: Rc<Cell<(u32, u32)>>,
    pointer: PointerTracker,
    last: Option<ResizeOutcome>,
}

impl ResizeCoordinator {
    pub(crate) fn new(
        quality_override: Option<f32>,
        resolution: Rc<Cell<(u32, u32)>>,
        pointer: PointerTracker,
    ) -> Self {
        Self {
            quality_override,
            resolution,
            pointer,
            last: None,
        }
    }

    /// Measures the surface, reallocates the render target and records the result.
    pub fn apply<S: SurfaceSession>(&mut self, rect: SurfaceRect, session: &mut S) -> ResizeOutcome {
        let external = rect.pixel_size();
        let downscale = choose_downscale(external.0, external.1, self.quality_override);
        let requested = internal_resolution(external, downscale);
        let actual = session.set_internal_resolution(requested.0, requested.1);
        session.set_presentation_size(external.0, external.1);

        self.resolution.set(actual);
        self.pointer.set_origin(rect.left, rect.top);

        let outcome = ResizeOutcome {
            external,
            downscale,
            requested,
            actual,
        };
        if actual != requested {
            tracing::debug!(?requested, ?actual, "render target clamped by device limits");
        }
        tracing::debug!(
            external = ?outcome.external,
            internal = ?outcome.actual,
            downscale,
            "resized plasma surface"
        );
        self.last = Some(outcome);
        outcome
    }

    pub fn last(&self) -> Option<ResizeOutcome> {
        self.last
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;

    use super::*;
    use crate::surface::testing::{FakeContainer, RecordingSession, SessionLog};
    use crate::types::RenderConfig;

    fn make_coordinator(quality_override: Option<f32>) -> (ResizeCoordinator, Rc<Cell<(u32, u32)>>, PointerTracker) {
        let resolution = Rc::new(Cell::new((1, 1)));
        let (pointer, _observer) = PointerTracker::new(true);
        (
            ResizeCoordinator::new(quality_override, resolution.clone(), pointer.clone()),
            resolution,
            pointer,
        )
    }

    fn make_session(max_dimension: Option<u32>) -> (RecordingSession, Rc<RefCell<SessionLog>>) {
        let container = FakeContainer {
            max_dimension,
            ..FakeContainer::default()
        };
        let log = container.log.clone();
        let session = RecordingSession::create(container, &RenderConfig::default()).expect("session");
        (session, log)
    }

    #[test]
    fn full_hd_renders_small_and_presents_full_size() {
        let (mut coordinator, resolution, _) = make_coordinator(None);
        let (mut session, log) = make_session(None);

        let outcome = coordinator.apply(SurfaceRect::from_size(1920, 1080), &mut session);

        assert_eq!(outcome.downscale, 1.9);
        assert_eq!(outcome.actual, (1010, 568));
        assert_eq!(resolution.get(), (1010, 568));
        let log = log.borrow();
        assert_eq!(log.internal, vec![(1010, 568)]);
        assert_eq!(log.presentation, vec![(1920, 1080)]);
    }

    #[test]
    fn records_actual_rather_than_requested_size() {
        let (mut coordinator, resolution, _) = make_coordinator(Some(0.5));
        let (mut session, _log) = make_session(Some(2048));

        let outcome = coordinator.apply(SurfaceRect::from_size(1920, 1080), &mut session);

        assert_eq!(outcome.requested, (3840, 2160));
        assert_eq!(outcome.actual, (2048, 2048));
        assert_eq!(resolution.get(), (2048, 2048));
    }

    #[test]
    fn tiny_surfaces_clamp_to_one_pixel() {
        let (mut coordinator, _, _) = make_coordinator(None);
        let (mut session, log) = make_session(None);

        coordinator.apply(SurfaceRect::new(0.0, 0.0, 0.0, 0.4), &mut session);

        assert_eq!(log.borrow().internal, vec![(1, 1)]);
        assert_eq!(log.borrow().presentation, vec![(1, 1)]);
    }

    #[test]
    fn records_origin_for_pointer_translation() {
        let resolution = Rc::new(Cell::new((1, 1)));
        let (pointer, observer) = PointerTracker::new(true);
        let mut coordinator = ResizeCoordinator::new(None, resolution, pointer.clone());
        let (mut session, _log) = make_session(None);

        coordinator.apply(SurfaceRect::new(32.0, 64.0, 800.0, 600.0), &mut session);
        observer.moved_client(132.0, 164.0);

        assert_eq!(pointer.position(), (100.0, 100.0));
        assert_eq!(coordinator.last().map(|o| o.external), Some((800, 600)));
    }
}
