//! Image scanning and validation

use std::path::{Path, PathBuf};

use parqueo_types::{Error, PhotoAngle, Result};
use walkdir::WalkDir;

/// Supported image extensions
const IMAGE_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "webp", "gif", "bmp"];

/// Check if a path is a supported image file
pub fn is_supported_image(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| IMAGE_EXTENSIONS.contains(&ext.to_lowercase().as_str()))
        .unwrap_or(false)
}

/// Validate an image file exists and is readable
pub fn validate_image(path: &Path) -> Result<()> {
    if !path.exists() {
        return Err(Error::FileNotFound(path.display().to_string()));
    }

    if !path.is_file() {
        return Err(Error::InvalidImageFormat(format!(
            "{} is not a file",
            path.display()
        )));
    }

    if !is_supported_image(path) {
        return Err(Error::InvalidImageFormat(format!(
            "Unsupported image format: {}",
            path.display()
        )));
    }

    // Try to open the image to validate it
    image::open(path)?;

    Ok(())
}

/// Scan a directory for image files, sorted by filename
pub fn scan_directory(dir: &Path) -> Result<Vec<PathBuf>> {
    if !dir.exists() {
        return Err(Error::FileNotFound(dir.display().to_string()));
    }

    if !dir.is_dir() {
        return Err(Error::InvalidImageFormat(format!(
            "{} is not a directory",
            dir.display()
        )));
    }

    let mut images = Vec::new();

    for entry in WalkDir::new(dir)
        .follow_links(true)
        .into_iter()
        .filter_map(|e| e.ok())
    {
        let path = entry.path();
        if path.is_file() && is_supported_image(path) {
            images.push(path.to_path_buf());
        }
    }

    images.sort_by(|a, b| {
        a.file_name()
            .and_then(|n| n.to_str())
            .unwrap_or("")
            .cmp(b.file_name().and_then(|n| n.to_str()).unwrap_or(""))
    });

    Ok(images)
}

/// Infer the camera angle from a filename suffix (`_left`, `_rear`).
/// Anything else is taken as the right-side first-angle shot.
pub fn angle_from_filename(path: &Path) -> PhotoAngle {
    let stem = path
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("")
        .to_lowercase();
    if stem.ends_with("_left") {
        PhotoAngle::EntryLeft
    } else if stem.ends_with("_rear") {
        PhotoAngle::EntryRear
    } else {
        PhotoAngle::EntryRight
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_supported_image() {
        assert!(is_supported_image(Path::new("cam/entry.jpg")));
        assert!(is_supported_image(Path::new("entry.JPEG")));
        assert!(is_supported_image(Path::new("entry.png")));
        assert!(!is_supported_image(Path::new("entry.txt")));
        assert!(!is_supported_image(Path::new("entry")));
    }

    #[test]
    fn test_validate_missing_file() {
        let err = validate_image(Path::new("/nonexistent/entry.jpg")).unwrap_err();
        assert!(matches!(err, Error::FileNotFound(_)));
    }

    #[test]
    fn test_angle_from_filename_suffix() {
        assert_eq!(
            angle_from_filename(Path::new("cam/20260825_101500_left.jpg")),
            PhotoAngle::EntryLeft
        );
        assert_eq!(
            angle_from_filename(Path::new("cam/20260825_101500_REAR.jpg")),
            PhotoAngle::EntryRear
        );
        assert_eq!(
            angle_from_filename(Path::new("cam/20260825_101500.jpg")),
            PhotoAngle::EntryRight
        );
    }

    #[test]
    fn test_scan_missing_directory() {
        let err = scan_directory(Path::new("/nonexistent/dir")).unwrap_err();
        assert!(matches!(err, Error::FileNotFound(_)));
    }
}
