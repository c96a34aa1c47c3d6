//! Loading the raw feature collection
//!
//! The engine itself never performs I/O. These helpers parse an already
//! fetched document and keep the parsed collection around so repeated
//! renders reuse it instead of fetching again.

use crate::error::Result;
use geojson::{Feature, FeatureCollection, GeoJson};
use once_cell::unsync::OnceCell;
use std::io::Read;

/// Parse a GeoJSON document into a feature collection
///
/// A bare Feature or Geometry document becomes a one-feature collection.
pub fn parse_feature_collection(text: &str) -> Result<FeatureCollection> {
    let collection = match text.parse::<GeoJson>()? {
        GeoJson::FeatureCollection(collection) => collection,
        GeoJson::Feature(feature) => single(feature),
        GeoJson::Geometry(geometry) => single(Feature {
            bbox: None,
            geometry: Some(geometry),
            id: None,
            properties: None,
            foreign_members: None,
        }),
    };
    Ok(collection)
}

/// Read and parse a GeoJSON document
pub fn load_feature_collection<R: Read>(mut reader: R) -> Result<FeatureCollection> {
    let mut text = String::new();
    reader.read_to_string(&mut text)?;
    parse_feature_collection(&text)
}

fn single(feature: Feature) -> FeatureCollection {
    FeatureCollection {
        bbox: None,
        features: vec![feature],
        foreign_members: None,
    }
}

/// Raw source loaded at most once per session
///
/// The loader runs on the first successful [`get`](SourceCache::get); a
/// failed load is not cached and is retried on the next call.
pub struct SourceCache<L> {
    loader: L,
    cached: OnceCell<FeatureCollection>,
}

impl<L> SourceCache<L>
where
    L: Fn() -> Result<FeatureCollection>,
{
    pub fn new(loader: L) -> Self {
        Self {
            loader,
            cached: OnceCell::new(),
        }
    }

    pub fn get(&self) -> Result<&FeatureCollection> {
        self.cached.get_or_try_init(|| {
            tracing::debug!("loading raw feature source");
            (self.loader)()
        })
    }

    pub fn is_loaded(&self) -> bool {
        self.cached.get().is_some()
    }
}
