use crate::types::{FrameUniforms, RenderConfig};

/// Failures surfaced by a [`SurfaceSession`].
#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    /// The GPU context (instance, adapter, device, surface) could not be created.
    #[error("failed to acquire GPU context: {0:#}")]
    Context(anyhow::Error),
    /// The fixed kernel or presentation program failed validation.
    #[error("failed to compile {stage} program: {message}")]
    Compile {
        stage: &'static str,
        message: String,
    },
    /// The presentation surface ran out of memory; the session cannot continue.
    #[error("surface out of memory")]
    OutOfMemory,
}

/// Owner of the GPU resources behind one mounted surface.
///
/// Exactly one session exists per engine instance. After [`dispose`] every
/// other method is a no-op.
///
/// [`dispose`]: SurfaceSession::dispose
pub trait SurfaceSession: Sized {
    /// Host object the session binds to (a window, a test fixture, ...).
    type Container;

    /// Creates the context and compiles the program; failure is fatal for the instance.
    fn create(container: Self::Container, config: &RenderConfig) -> Result<Self, SessionError>;

    /// Reallocates the render target and returns the size actually allocated.
    fn set_internal_resolution(&mut self, width: u32, height: u32) -> (u32, u32);

    /// Resizes the presented surface without touching the render target.
    fn set_presentation_size(&mut self, width: u32, height: u32);

    /// Uploads uniforms, draws the kernel once and presents the frame.
    fn render(&mut self, uniforms: &FrameUniforms) -> Result<(), SessionError>;

    /// Releases GPU resources. Safe to call more than once.
    fn dispose(&mut self);

    fn is_disposed(&self) -> bool;
}

#[cfg(test)]
pub(crate) mod testing {
    use std::cell::RefCell;
    use std::rc::Rc;

    use super::*;

    /// Everything a [`RecordingSession`] observed, shared with the test body.
    #[derive(Debug, Default)]
    pub(crate) struct SessionLog {
        pub renders: Vec<FrameUniforms>,
        pub internal: Vec<(u32, u32)>,
        pub presentation: Vec<(u32, u32)>,
        pub disposals: usize,
    }

    /// Construction parameters for a [`RecordingSession`].
    #[derive(Debug, Clone, Default)]
    pub(crate) struct FakeContainer {
        pub log: Rc<RefCell<SessionLog>>,
        /// Largest texture edge the fake device accepts.
        pub max_dimension: Option<u32>,
        pub fail_create: bool,
    }

    #[derive(Debug)]
    pub(crate) struct RecordingSession {
        log: Rc<RefCell<SessionLog>>,
        max_dimension: u32,
        disposed: bool,
    }

    impl SurfaceSession for RecordingSession {
        type Container = FakeContainer;

        fn create(container: FakeContainer, _config: &RenderConfig) -> Result<Self, SessionError> {
            if container.fail_create {
                return Err(SessionError::Compile {
                    stage: "fragment",
                    message: "injected failure".to_string(),
                });
            }
            Ok(Self {
                log: container.log,
                max_dimension: container.max_dimension.unwrap_or(u32::MAX),
                disposed: false,
            })
        }

        fn set_internal_resolution(&mut self, width: u32, height: u32) -> (u32, u32) {
            let actual = (width.min(self.max_dimension), height.min(self.max_dimension));
            if !self.disposed {
                self.log.borrow_mut().internal.push(actual);
            }
            actual
        }

        fn set_presentation_size(&mut self, width: u32, height: u32) {
            if !self.disposed {
                self.log.borrow_mut().presentation.push((width, height));
            }
        }

        fn render(&mut self, uniforms: &FrameUniforms) -> Result<(), SessionError> {
            if !self.disposed {
                self.log.borrow_mut().renders.push(*uniforms);
            }
            Ok(())
        }

        fn dispose(&mut self) {
            if !self.disposed {
                self.disposed = true;
                self.log.borrow_mut().disposals += 1;
            }
        }

        fn is_disposed(&self) -> bool {
            self.disposed
        }
    }
}
