//! In-memory port fakes shared by unit tests.

use std::collections::{HashMap, VecDeque};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use image::{Rgba, RgbaImage};

use crate::error::CardError;
use crate::ports::media_library::{Asset, MediaFuture};
use crate::ports::photo_source::{FetchFuture, FetchedImage};
use crate::ports::quote_source::QuoteFuture;
use crate::ports::{MediaLibrary, Permission, PhotoSource, Quote, QuoteSource};
use crate::render::encode_png;

pub fn quote(content: &str, author: &str) -> Quote {
    Quote { content: content.into(), author: author.into() }
}

pub fn solid_png(width: u32, height: u32, color: [u8; 4]) -> Vec<u8> {
    encode_png(&RgbaImage::from_pixel(width, height, Rgba(color))).unwrap()
}

/// Serves scripted responses in call order, each after its delay.
#[derive(Default)]
pub struct FakeQuotes {
    script: Mutex<VecDeque<(Duration, Result<Quote, String>)>>,
    pub tags: Mutex<Vec<String>>,
}

impl FakeQuotes {
    pub fn then(self, delay_ms: u64, result: Result<Quote, &str>) -> Self {
        self.script
            .lock()
            .unwrap()
            .push_back((Duration::from_millis(delay_ms), result.map_err(str::to_string)));
        self
    }
}

impl QuoteSource for FakeQuotes {
    fn random(&self, tag: &str) -> QuoteFuture<'_> {
        self.tags.lock().unwrap().push(tag.to_string());
        let next = self.script.lock().unwrap().pop_front();
        Box::pin(async move {
            let (delay, result) = next.ok_or_else(|| CardError::Api {
                status: 0,
                message: "no scripted quote".into(),
            })?;
            tokio::time::sleep(delay).await;
            result.map_err(|message| CardError::Api { status: 503, message })
        })
    }
}

/// Serves fixed bodies per URL after a per-URL delay.
#[derive(Default)]
pub struct FakePhotos {
    bodies: HashMap<String, (Duration, Vec<u8>)>,
    pub calls: Mutex<Vec<String>>,
}

impl FakePhotos {
    pub fn with(mut self, url: &str, delay_ms: u64, data: Vec<u8>) -> Self {
        self.bodies.insert(url.to_string(), (Duration::from_millis(delay_ms), data));
        self
    }
}

impl PhotoSource for FakePhotos {
    fn fetch(&self, url: &str) -> FetchFuture<'_> {
        self.calls.lock().unwrap().push(url.to_string());
        let body = self.bodies.get(url).cloned();
        let url = url.to_string();
        Box::pin(async move {
            let (delay, data) =
                body.ok_or_else(|| CardError::Api { status: 404, message: url.clone() })?;
            tokio::time::sleep(delay).await;
            Ok(FetchedImage { data, content_type: Some("image/png".into()) })
        })
    }
}

/// Keeps saved assets in memory.
pub struct FakeGallery {
    permission: Permission,
    pub saved: Mutex<Vec<(String, Vec<u8>)>>,
}

impl FakeGallery {
    pub fn new(permission: Permission) -> Self {
        Self { permission, saved: Mutex::new(Vec::new()) }
    }
}

impl MediaLibrary for FakeGallery {
    fn request_permission(&self) -> MediaFuture<'_, Permission> {
        let permission = self.permission;
        Box::pin(async move { Ok(permission) })
    }

    fn create_asset<'a>(&'a self, source: &'a Path) -> MediaFuture<'a, Asset> {
        Box::pin(async move {
            let data = std::fs::read(source)?;
            let path = PathBuf::from(source.file_name().unwrap_or_default());
            self.saved.lock().unwrap().push((String::new(), data));
            Ok(Asset { path })
        })
    }

    fn add_to_album<'a>(&'a self, album: &'a str, asset: &'a Asset) -> MediaFuture<'a, Asset> {
        Box::pin(async move {
            if let Some(last) = self.saved.lock().unwrap().last_mut() {
                last.0 = album.to_string();
            }
            Ok(Asset { path: Path::new(album).join(&asset.path) })
        })
    }
}

impl<T: QuoteSource> QuoteSource for Arc<T> {
    fn random(&self, tag: &str) -> QuoteFuture<'_> {
        self.as_ref().random(tag)
    }
}
