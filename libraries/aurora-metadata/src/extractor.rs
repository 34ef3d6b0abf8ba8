/// Tag extraction using lofty
use crate::cover_cache::CoverArtCache;
use crate::error::{MetadataError, Result};
use aurora_core::types::{RawTrack, Track, TrackSource};
use lofty::{AudioFile, ItemKey, PictureType, Tag, TaggedFileExt};
use std::path::Path;
use tracing::{debug, warn};

/// Reads a file's tags and turns them into a normalized [`Track`]
#[derive(Debug, Clone)]
pub struct MetadataExtractor {
    covers: CoverArtCache,
}

/// Leading integer of a tag value such as `"3/12"` or `"2019-05-01"`
fn leading_number(text: &str) -> Option<u32> {
    let digits: String = text
        .trim()
        .chars()
        .take_while(|c| c.is_ascii_digit())
        .collect();
    digits.parse().ok()
}

fn text(tag: &Tag, key: &ItemKey) -> Option<String> {
    tag.get_string(key).map(str::to_string)
}

impl MetadataExtractor {
    pub fn new(covers: CoverArtCache) -> Self {
        Self { covers }
    }

    pub fn covers(&self) -> &CoverArtCache {
        &self.covers
    }

    /// Extract a track from `path`
    ///
    /// Never fails: unreadable files produce a degraded track titled after the
    /// file name, with every other field at its default.
    pub fn extract(&self, path: &Path) -> Track {
        let path_str = path.to_string_lossy();
        let stem = path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| path_str.to_string());

        match self.read_raw(path) {
            Ok(raw) => raw.normalize(&path_str, &stem, TrackSource::Local),
            Err(e) => {
                warn!(path = %path.display(), error = %e, "Failed to parse tags, using filename");
                Track::degraded(&path_str, &stem)
            }
        }
    }

    fn read_raw(&self, path: &Path) -> Result<RawTrack> {
        if !path.exists() {
            return Err(MetadataError::FileNotFound(path.display().to_string()));
        }

        let tagged_file = lofty::read_from_path(path)?;
        let duration = tagged_file.properties().duration();
        // Rounded to whole milliseconds
        let duration_secs = duration.as_millis() as f64 / 1000.0;

        let mut raw = tagged_file
            .primary_tag()
            .or_else(|| tagged_file.first_tag())
            .map(Self::raw_from_tag)
            .unwrap_or_default();
        raw.duration = Some(duration_secs);

        if let Some(tag) = tagged_file
            .primary_tag()
            .or_else(|| tagged_file.first_tag())
        {
            raw.cover_art = self.cache_cover(tag, raw.album.as_deref(), path);
        }

        Ok(raw)
    }

    fn raw_from_tag(tag: &Tag) -> RawTrack {
        let mut raw = RawTrack {
            title: text(tag, &ItemKey::TrackTitle),
            artist: text(tag, &ItemKey::TrackArtist),
            album: text(tag, &ItemKey::AlbumTitle),
            album_artist: text(tag, &ItemKey::AlbumArtist),
            genre: text(tag, &ItemKey::Genre),
            track: tag.get_string(&ItemKey::TrackNumber).and_then(leading_number),
            disc: tag.get_string(&ItemKey::DiscNumber).and_then(leading_number),
            year: tag
                .get_string(&ItemKey::Year)
                .or_else(|| tag.get_string(&ItemKey::RecordingDate))
                .and_then(leading_number),
            ..RawTrack::default()
        };

        let credits = &mut raw.credits;
        credits.composer = text(tag, &ItemKey::Composer);
        credits.lyricist = text(tag, &ItemKey::Lyricist);
        credits.conductor = text(tag, &ItemKey::Conductor);
        credits.producer = text(tag, &ItemKey::Producer);
        credits.engineer = text(tag, &ItemKey::Engineer);
        credits.mixer = text(tag, &ItemKey::MixEngineer);
        credits.remixer = text(tag, &ItemKey::Remixer);
        credits.label = text(tag, &ItemKey::Label);
        credits.copyright = text(tag, &ItemKey::CopyrightMessage);
        credits.encoded_by = text(tag, &ItemKey::EncodedBy);
        credits.comment = text(tag, &ItemKey::Comment);
        credits.bpm = tag.get_string(&ItemKey::Bpm).and_then(leading_number);

        raw
    }

    /// Write the front cover (or the first picture) to the cache
    fn cache_cover(&self, tag: &Tag, album: Option<&str>, path: &Path) -> Option<String> {
        let pictures = tag.pictures();
        let picture = pictures
            .iter()
            .find(|p| p.pic_type() == PictureType::CoverFront)
            .or_else(|| pictures.first())?;

        let key = album
            .filter(|a| !a.trim().is_empty())
            .map(str::to_string)
            .unwrap_or_else(|| path.to_string_lossy().into_owned());

        match self.covers.store(&key, picture.data()) {
            Ok(cached) => {
                debug!(path = %path.display(), cover = %cached.display(), "Cached cover art");
                Some(cached.to_string_lossy().into_owned())
            }
            Err(e) => {
                warn!(path = %path.display(), error = %e, "Failed to cache cover art");
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn leading_number_parses_common_tag_shapes() {
        assert_eq!(leading_number("3/12"), Some(3));
        assert_eq!(leading_number(" 07"), Some(7));
        assert_eq!(leading_number("2019-05-01"), Some(2019));
        assert_eq!(leading_number("side A"), None);
    }

    #[test]
    fn missing_file_degrades_to_filename() {
        let dir = TempDir::new().unwrap();
        let extractor = MetadataExtractor::new(CoverArtCache::new(dir.path()));

        let track = extractor.extract(Path::new("/nonexistent/Some Song.mp3"));
        assert_eq!(track.title, "Some Song");
        assert_eq!(track.artist, "Unknown Artist");
        assert_eq!(track.duration, 0.0);
        assert_eq!(track.path, "/nonexistent/Some Song.mp3");
    }
}
