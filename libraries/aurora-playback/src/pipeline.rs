//! Audio pipeline collaborator
//!
//! The core never touches audio. It sends [`PipelineCommand`]s to an
//! [`AudioPipeline`] and is driven by the [`PipelineEvent`]s the pipeline
//! reports back through [`crate::PlaybackCore::handle_event`].

use crate::error::Result;
use aurora_core::{PipelineCommand, Track};

/// Sink for pipeline commands
pub trait AudioPipeline: Send {
    fn send(&mut self, command: PipelineCommand);
}

/// Turns a track into a URL the pipeline can load
///
/// Local tracks map to the media scheme, remote tracks to a signed stream URL.
pub trait SourceResolver: Send + Sync {
    fn resolve(&self, track: &Track) -> Result<String>;
}

/// Pipeline that buffers commands until someone drains them
///
/// Used when the real pipeline lives across a process boundary and pulls
/// its instructions.
#[derive(Debug, Default)]
pub struct CommandBuffer {
    commands: Vec<PipelineCommand>,
}

impl CommandBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Take every buffered command
    pub fn drain(&mut self) -> Vec<PipelineCommand> {
        std::mem::take(&mut self.commands)
    }

    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }
}

impl AudioPipeline for CommandBuffer {
    fn send(&mut self, command: PipelineCommand) {
        self.commands.push(command);
    }
}
