//! Renderer interrupts.

use super::RenderResult;

/// Callback invoked with an intermediate (fully block-uniform) develop.
pub type CaptureCallback = Box<dyn FnOnce(RenderResult) + Send>;

/// Interrupts delivered to a running renderer through its thread-safe
/// queue.
pub enum Interrupt {
    /// Pauses the rendering. Does nothing if already paused or pausing.
    Pause,
    /// Resumes the rendering. Does nothing if not paused or pausing.
    Resume,
    /// Terminates the rendering: in-flight blocks run to completion, no
    /// new blocks are dispatched.
    Terminate,
    /// Queues capturing an intermediate rendered result: the current block
    /// row is completed so every block carries identical spe, the renderer
    /// pauses, all films are developed and the callback fires, then the
    /// previous pause state is restored.
    CaptureIntermediate(CaptureCallback),
}

impl std::fmt::Debug for Interrupt {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Pause => write!(f, "Pause"),
            Self::Resume => write!(f, "Resume"),
            Self::Terminate => write!(f, "Terminate"),
            Self::CaptureIntermediate(_) => write!(f, "CaptureIntermediate"),
        }
    }
}
