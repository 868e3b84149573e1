//! The image zones are drawn over.
//!
//! Pixels are never decoded: only the header is read to learn the
//! dimensions, which bound the pan range and the duplicate operation.

use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::document::scan::scan;
use crate::geometry::Region;

#[derive(Debug, Error)]
pub enum ImageError {
    #[error("cannot read image header of {path}: {source}")]
    Probe {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },
    #[error("image path {0} has no file name")]
    NoFileName(PathBuf),
}

/// Dimensions and name of the loaded image.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageInfo {
    pub path: PathBuf,
    /// Final path component; matched against `graphic/@url` when a new zone
    /// has no neighbour to insert after.
    pub file_name: String,
    pub width: u32,
    pub height: u32,
}

impl ImageInfo {
    /// Read the image header at `path`.
    ///
    /// # Errors
    ///
    /// Fails when the file cannot be opened or its format is not recognised.
    pub fn probe(path: &Path) -> Result<Self, ImageError> {
        let file_name = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .ok_or_else(|| ImageError::NoFileName(path.to_path_buf()))?;
        let (width, height) =
            image::image_dimensions(path).map_err(|source| ImageError::Probe {
                path: path.to_path_buf(),
                source,
            })?;
        tracing::debug!(path = %path.display(), width, height, "probed image");
        Ok(Self {
            path: path.to_path_buf(),
            file_name,
            width,
            height,
        })
    }

    /// Size in document units.
    pub fn size(&self) -> (i32, i32) {
        (saturate(self.width), saturate(self.height))
    }

    /// The whole image as a region; zones must stay inside it.
    pub fn bounds(&self) -> Region {
        let (w, h) = self.size();
        Region::new(0, 0, w, h)
    }
}

fn saturate(v: u32) -> i32 {
    i32::try_from(v).unwrap_or(i32::MAX)
}

/// Resolve an image reference relative to the markup file's directory.
pub fn resolve(base_dir: &Path, reference: &str) -> PathBuf {
    if Path::new(reference).is_absolute() {
        reference.into()
    } else {
        base_dir.join(reference)
    }
}

/// The image named by the first `graphic/@url` in the markup, if any.
pub fn referenced_image(markup_path: &Path, text: &str) -> Option<PathBuf> {
    let elements = scan(text).ok()?;
    let url = elements
        .iter()
        .filter(|el| el.local_name() == "graphic")
        .find_map(|el| el.attribute("url"))?;
    let base = markup_path.parent().unwrap_or_else(|| Path::new("."));
    Some(resolve(base, &url.value))
}
