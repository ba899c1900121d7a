//! The graphics shim.
//!
//! The engine never talks to a graphics API directly. Passes and draw calls
//! go through [`GraphicsBackend`], which a platform layer implements on top
//! of whatever API it has. Two backends ship with the crate:
//!
//! - [`NullBackend`] checks that passes are opened and closed in pairs and
//!   otherwise drops everything. Headless runs use it.
//! - [`RecordingBackend`] keeps every command in memory. Tests use it.

use crate::component::AsAny;
use crate::error::FrameError;

#[cfg(feature = "render2d")]
use crate::render2d::BatchSubmission;
#[cfg(feature = "render3d")]
use crate::render3d::MeshDraw;

use super::pass::PassDescriptor;

/// The narrow interface the engine needs from a graphics API.
pub trait GraphicsBackend: AsAny {
    fn begin_pass(&mut self, pass: &PassDescriptor) -> Result<(), FrameError>;

    /// Draw a flushed 2D batch.
    #[cfg(feature = "render2d")]
    fn submit_batch(&mut self, batch: &BatchSubmission) -> Result<(), FrameError>;

    /// Draw one mesh immediately.
    #[cfg(feature = "render3d")]
    fn draw_mesh(&mut self, mesh: &MeshDraw) -> Result<(), FrameError>;

    fn end_pass(&mut self) -> Result<(), FrameError>;

    /// Show the finished frame.
    fn present(&mut self) -> Result<(), FrameError> {
        Ok(())
    }
}

impl dyn GraphicsBackend + '_ {
    pub fn downcast_ref<B: GraphicsBackend>(&self) -> Option<&B> {
        self.as_any().downcast_ref::<B>()
    }

    pub fn downcast_mut<B: GraphicsBackend>(&mut self) -> Option<&mut B> {
        self.as_any_mut().downcast_mut::<B>()
    }
}

/// Backend that draws nothing.
#[derive(Debug, Default)]
pub struct NullBackend {
    open_pass: bool,
    frames: u64,
}

impl NullBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of presented frames.
    pub fn frames(&self) -> u64 {
        self.frames
    }
}

impl GraphicsBackend for NullBackend {
    fn begin_pass(&mut self, pass: &PassDescriptor) -> Result<(), FrameError> {
        if std::mem::replace(&mut self.open_pass, true) {
            return Err(FrameError::Backend(format!(
                "pass `{}` begun while another pass is open",
                pass.label
            )));
        }
        Ok(())
    }

    #[cfg(feature = "render2d")]
    fn submit_batch(&mut self, _batch: &BatchSubmission) -> Result<(), FrameError> {
        Ok(())
    }

    #[cfg(feature = "render3d")]
    fn draw_mesh(&mut self, _mesh: &MeshDraw) -> Result<(), FrameError> {
        Ok(())
    }

    fn end_pass(&mut self) -> Result<(), FrameError> {
        if !std::mem::replace(&mut self.open_pass, false) {
            return Err(FrameError::Backend("end_pass without an open pass".into()));
        }
        Ok(())
    }

    fn present(&mut self) -> Result<(), FrameError> {
        self.frames += 1;
        Ok(())
    }
}

/// A command received by a [`RecordingBackend`].
#[derive(Debug, Clone, PartialEq)]
pub enum BackendCommand {
    BeginPass(PassDescriptor),
    #[cfg(feature = "render2d")]
    SubmitBatch(BatchSubmission),
    #[cfg(feature = "render3d")]
    DrawMesh(MeshDraw),
    EndPass,
    Present,
}

/// Backend that records commands instead of drawing.
#[derive(Debug, Default)]
pub struct RecordingBackend {
    commands: Vec<BackendCommand>,
    frames: u64,
    open_pass: bool,
}

impl RecordingBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn commands(&self) -> &[BackendCommand] {
        &self.commands
    }

    /// Drain the recorded commands.
    pub fn take_commands(&mut self) -> Vec<BackendCommand> {
        std::mem::take(&mut self.commands)
    }

    /// Number of presented frames.
    pub fn frames(&self) -> u64 {
        self.frames
    }

    #[cfg(feature = "render2d")]
    pub fn batches(&self) -> impl Iterator<Item = &BatchSubmission> {
        self.commands.iter().filter_map(|command| match command {
            BackendCommand::SubmitBatch(batch) => Some(batch),
            _ => None,
        })
    }

    #[cfg(feature = "render3d")]
    pub fn meshes(&self) -> impl Iterator<Item = &MeshDraw> {
        self.commands.iter().filter_map(|command| match command {
            BackendCommand::DrawMesh(mesh) => Some(mesh),
            _ => None,
        })
    }

    fn require_open(&self, what: &str) -> Result<(), FrameError> {
        if self.open_pass {
            Ok(())
        } else {
            Err(FrameError::Backend(format!("{what} outside of a pass")))
        }
    }
}

impl GraphicsBackend for RecordingBackend {
    fn begin_pass(&mut self, pass: &PassDescriptor) -> Result<(), FrameError> {
        if self.open_pass {
            return Err(FrameError::Backend(format!(
                "pass `{}` begun while another pass is open",
                pass.label
            )));
        }
        self.open_pass = true;
        self.commands.push(BackendCommand::BeginPass(pass.clone()));
        Ok(())
    }

    #[cfg(feature = "render2d")]
    fn submit_batch(&mut self, batch: &BatchSubmission) -> Result<(), FrameError> {
        self.require_open("batch submission")?;
        self.commands.push(BackendCommand::SubmitBatch(batch.clone()));
        Ok(())
    }

    #[cfg(feature = "render3d")]
    fn draw_mesh(&mut self, mesh: &MeshDraw) -> Result<(), FrameError> {
        self.require_open("mesh draw")?;
        self.commands.push(BackendCommand::DrawMesh(mesh.clone()));
        Ok(())
    }

    fn end_pass(&mut self) -> Result<(), FrameError> {
        self.require_open("end_pass")?;
        self.open_pass = false;
        self.commands.push(BackendCommand::EndPass);
        Ok(())
    }

    fn present(&mut self) -> Result<(), FrameError> {
        self.frames += 1;
        self.commands.push(BackendCommand::Present);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::math::Mat4;
    use crate::render::Viewport;

    fn descriptor(label: &str) -> PassDescriptor {
        PassDescriptor {
            label: label.into(),
            viewport: Viewport::default(),
            view: Mat4::IDENTITY,
            projection: Mat4::IDENTITY,
            clear: None,
        }
    }

    #[test]
    fn nested_pass_is_rejected() {
        let mut backend = RecordingBackend::new();
        backend.begin_pass(&descriptor("a")).unwrap();
        assert!(backend.begin_pass(&descriptor("b")).is_err());
        backend.end_pass().unwrap();
        assert!(backend.end_pass().is_err());
        assert_eq!(backend.commands().len(), 2);
    }

    #[test]
    fn null_backend_checks_pairing_only() {
        let mut backend = NullBackend::new();
        assert!(backend.end_pass().is_err());
        backend.begin_pass(&descriptor("a")).unwrap();
        assert!(backend.begin_pass(&descriptor("b")).is_err());
        backend.end_pass().unwrap();
        backend.present().unwrap();
        assert_eq!(backend.frames(), 1);
    }

    #[test]
    fn boxed_backend_downcasts() {
        let mut boxed: Box<dyn GraphicsBackend> = Box::new(RecordingBackend::new());
        boxed.present().unwrap();
        assert_eq!(boxed.downcast_ref::<RecordingBackend>().unwrap().frames(), 1);
        assert!(boxed.downcast_mut::<NullBackend>().is_none());
    }
}
