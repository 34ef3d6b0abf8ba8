/// Audio stream properties for the credits view
use crate::error::Result;
use lofty::{AudioFile, FileType, TaggedFileExt};
use serde::Serialize;
use std::path::Path;

/// Technical details of an audio file
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AudioDetails {
    /// Container/codec name, e.g. `Flac` or `Mpeg`
    pub codec: String,
    pub lossless: bool,
    /// Audio bitrate in kbps
    pub bitrate: Option<u32>,
    pub sample_rate: Option<u32>,
    pub bit_depth: Option<u8>,
    pub channels: Option<u8>,
    pub duration: f64,
}

/// Read stream properties of the file at `path`
pub fn read_audio_details(path: &Path) -> Result<AudioDetails> {
    let tagged_file = lofty::read_from_path(path)?;
    let file_type = tagged_file.file_type();
    let props = tagged_file.properties();

    Ok(AudioDetails {
        codec: format!("{file_type:?}"),
        lossless: matches!(
            file_type,
            FileType::Flac | FileType::Wav | FileType::Aiff | FileType::Ape | FileType::WavPack
        ),
        bitrate: props.audio_bitrate().or_else(|| props.overall_bitrate()),
        sample_rate: props.sample_rate(),
        bit_depth: props.bit_depth(),
        channels: props.channels(),
        duration: props.duration().as_millis() as f64 / 1000.0,
    })
}
