//! Filesystem-backed media library: albums are directories under a root.

use std::ffi::OsStr;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use tracing::{debug, info};

use crate::error::CardError;
use crate::ports::media_library::{Asset, MediaFuture, MediaLibrary, Permission};

/// Media library rooted at a directory such as `~/Pictures`.
pub struct DirectoryGallery {
    root: PathBuf,
}

impl DirectoryGallery {
    /// Create a gallery rooted at `root`.
    #[must_use]
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Directory where assets land before being filed into an album.
    fn assets_dir(&self) -> PathBuf {
        self.root.join(".assets")
    }
}

impl MediaLibrary for DirectoryGallery {
    fn request_permission(&self) -> MediaFuture<'_, Permission> {
        Box::pin(async move {
            if std::fs::create_dir_all(&self.root).is_err() {
                return Ok(Permission::Denied);
            }
            let writable = std::fs::metadata(&self.root)
                .map(|m| !m.permissions().readonly())
                .unwrap_or(false);
            Ok(if writable { Permission::Granted } else { Permission::Denied })
        })
    }

    fn create_asset<'a>(&'a self, source: &'a Path) -> MediaFuture<'a, Asset> {
        Box::pin(async move {
            let name = source.file_name().ok_or_else(|| {
                CardError::InvalidArgument(format!("Not a file: {}", source.display()))
            })?;
            let dir = self.assets_dir();
            std::fs::create_dir_all(&dir)?;
            let mut input = std::fs::File::open(source)?;
            let path = claim_name(&dir, name, |candidate| {
                let mut output =
                    std::fs::OpenOptions::new().write(true).create_new(true).open(candidate)?;
                std::io::copy(&mut input, &mut output).map(drop)
            })?;
            debug!(path = %path.display(), "asset created");
            Ok(Asset { path })
        })
    }

    fn add_to_album<'a>(&'a self, album: &'a str, asset: &'a Asset) -> MediaFuture<'a, Asset> {
        Box::pin(async move {
            let album_dir = self.root.join(album);
            if !album_dir.exists() {
                std::fs::create_dir_all(&album_dir)?;
                info!(album, "created album");
            }
            let name = asset.path.file_name().ok_or_else(|| {
                CardError::InvalidArgument(format!("Not a file: {}", asset.path.display()))
            })?;
            let path = claim_name(&album_dir, name, |candidate| {
                std::fs::hard_link(&asset.path, candidate)
            })?;
            std::fs::remove_file(&asset.path)?;
            Ok(Asset { path })
        })
    }
}

/// Run `create` against `dir/name`, then `dir/<stem>-1.<ext>`, `-2`, ... until
/// one does not already exist. `create` must fail with `AlreadyExists` rather
/// than overwrite.
fn claim_name(
    dir: &Path,
    name: &OsStr,
    mut create: impl FnMut(&Path) -> std::io::Result<()>,
) -> Result<PathBuf, CardError> {
    let original = Path::new(name);
    let stem = original.file_stem().unwrap_or(name).to_string_lossy();
    let ext = original.extension().map(|e| format!(".{}", e.to_string_lossy())).unwrap_or_default();
    let mut candidate = dir.join(name);
    for n in 1..=u32::MAX {
        match create(&candidate) {
            Ok(()) => return Ok(candidate),
            Err(e) if e.kind() == ErrorKind::AlreadyExists => {
                candidate = dir.join(format!("{stem}-{n}{ext}"));
            }
            Err(e) => return Err(e.into()),
        }
    }
    Err(CardError::Io(std::io::Error::new(ErrorKind::AlreadyExists, "no free file name")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn saves_into_named_album() {
        let dir = std::env::temp_dir().join("quotecard_gallery_test");
        let _ = std::fs::remove_dir_all(&dir);
        let source = std::env::temp_dir().join("quotecard_gallery_source.png");
        std::fs::write(&source, b"png bytes").unwrap();

        let gallery = DirectoryGallery::new(&dir);
        assert_eq!(gallery.request_permission().await.unwrap(), Permission::Granted);

        let asset = gallery.create_asset(&source).await.unwrap();
        let saved = gallery.add_to_album("QuoteGenerator", &asset).await.unwrap();

        assert_eq!(saved.path, dir.join("QuoteGenerator").join("quotecard_gallery_source.png"));
        assert_eq!(std::fs::read(&saved.path).unwrap(), b"png bytes");
        assert!(!asset.path.exists());

        let _ = std::fs::remove_dir_all(&dir);
        let _ = std::fs::remove_file(&source);
    }

    #[tokio::test]
    async fn existing_album_is_reused() {
        let dir = std::env::temp_dir().join("quotecard_gallery_reuse_test");
        let _ = std::fs::remove_dir_all(&dir);
        std::fs::create_dir_all(dir.join("QuoteGenerator")).unwrap();
        std::fs::write(dir.join("QuoteGenerator").join("old.png"), b"old").unwrap();
        let source = std::env::temp_dir().join("quotecard_gallery_new.png");
        std::fs::write(&source, b"new").unwrap();

        let gallery = DirectoryGallery::new(&dir);
        let asset = gallery.create_asset(&source).await.unwrap();
        gallery.add_to_album("QuoteGenerator", &asset).await.unwrap();

        let count = std::fs::read_dir(dir.join("QuoteGenerator")).unwrap().count();
        assert_eq!(count, 2);

        let _ = std::fs::remove_dir_all(&dir);
        let _ = std::fs::remove_file(&source);
    }

    #[tokio::test]
    async fn same_name_exports_are_both_kept() {
        let dir = std::env::temp_dir().join("quotecard_gallery_collision_test");
        let _ = std::fs::remove_dir_all(&dir);
        let staging = std::env::temp_dir().join("quotecard_gallery_collision_src");
        std::fs::create_dir_all(&staging).unwrap();
        let source = staging.join("quote-1700000000000.png");
        let gallery = DirectoryGallery::new(&dir);

        std::fs::write(&source, b"first card").unwrap();
        let first = gallery.create_asset(&source).await.unwrap();
        std::fs::write(&source, b"second card").unwrap();
        let second = gallery.create_asset(&source).await.unwrap();
        assert_ne!(first.path, second.path);

        let first = gallery.add_to_album("QuoteGenerator", &first).await.unwrap();
        let second = gallery.add_to_album("QuoteGenerator", &second).await.unwrap();

        let album = dir.join("QuoteGenerator");
        assert_eq!(first.path, album.join("quote-1700000000000.png"));
        assert_eq!(second.path, album.join("quote-1700000000000-1.png"));
        assert_eq!(std::fs::read(&first.path).unwrap(), b"first card");
        assert_eq!(std::fs::read(&second.path).unwrap(), b"second card");
        assert_eq!(std::fs::read_dir(&album).unwrap().count(), 2);

        let _ = std::fs::remove_dir_all(&dir);
        let _ = std::fs::remove_dir_all(&staging);
    }
}
