//! State boundary geometry.
//!
//! The boundary `FeatureCollection` is downloaded once per session and
//! converted into [`geo`] multipolygons for hit testing and tooltip
//! anchoring.

use std::sync::Arc;

use anomaly_atlas_client::ClientError;
use anomaly_atlas_client::provider::GeometryProvider;
use geo::{BoundingRect, Centroid, Contains, MultiPolygon, Point, Rect};
use geojson::{Feature, FeatureCollection};
use tokio::sync::OnceCell;

use crate::matching::feature_name;

/// One state boundary.
#[derive(Debug, Clone)]
pub struct MapFeature {
    /// Name from `NAME_1` or `name`, if present.
    pub name: Option<String>,
    /// Source feature, kept for its properties.
    pub feature: Feature,
    /// Polygonal geometry. `None` for null or non-areal geometry.
    pub shape: Option<MultiPolygon<f64>>,
    /// Tooltip anchor.
    pub anchor: Option<Point<f64>>,
}

impl MapFeature {
    fn from_feature(feature: Feature) -> Self {
        let name = feature_name(&feature).map(str::to_string);
        let shape = feature
            .geometry
            .clone()
            .and_then(geometry_to_multipolygon);

        if shape.is_none() {
            log::warn!(
                "Boundary feature '{}' has no polygon geometry",
                name.as_deref().unwrap_or("Unknown")
            );
        }

        let anchor = shape.as_ref().and_then(|mp| mp.centroid());

        Self {
            name,
            feature,
            shape,
            anchor,
        }
    }

    /// Whether the point (longitude, latitude) lies inside this boundary.
    #[must_use]
    pub fn contains(&self, point: &Point<f64>) -> bool {
        self.shape.as_ref().is_some_and(|mp| mp.contains(point))
    }
}

/// All state boundaries, in source order.
#[derive(Debug, Clone, Default)]
pub struct StateBoundaries {
    features: Vec<MapFeature>,
}

impl StateBoundaries {
    /// Converts a downloaded collection.
    #[must_use]
    pub fn from_collection(collection: FeatureCollection) -> Self {
        let features: Vec<MapFeature> = collection
            .features
            .into_iter()
            .map(MapFeature::from_feature)
            .collect();
        log::info!("Prepared {} state boundaries", features.len());
        Self { features }
    }

    #[must_use]
    pub fn features(&self) -> &[MapFeature] {
        &self.features
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.features.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.features.is_empty()
    }

    /// Position of the boundary containing a point.
    ///
    /// State boundaries do not overlap, so the first match wins.
    #[must_use]
    pub fn index_at(&self, lng: f64, lat: f64) -> Option<usize> {
        let point = Point::new(lng, lat);
        self.features.iter().position(|f| f.contains(&point))
    }

    /// Bounding box of every boundary, for fitting the initial map view.
    #[must_use]
    pub fn bounds(&self) -> Option<Rect<f64>> {
        self.features
            .iter()
            .filter_map(|f| f.shape.as_ref()?.bounding_rect())
            .reduce(|a, b| {
                Rect::new(
                    (a.min().x.min(b.min().x), a.min().y.min(b.min().y)),
                    (a.max().x.max(b.max().x), a.max().y.max(b.max().y)),
                )
            })
    }
}

/// Converts `Polygon` and `MultiPolygon` geometry; anything else is
/// `None`.
fn geometry_to_multipolygon(geom: geojson::Geometry) -> Option<MultiPolygon<f64>> {
    let geo_geom: geo::Geometry<f64> = geom.try_into().ok()?;
    match geo_geom {
        geo::Geometry::MultiPolygon(mp) => Some(mp),
        geo::Geometry::Polygon(p) => Some(MultiPolygon(vec![p])),
        _ => None,
    }
}

/// Session-lifetime cache of the state boundaries.
///
/// A failed download is not cached; the next call tries again.
#[derive(Debug, Default)]
pub struct GeometryCache {
    cell: OnceCell<Arc<StateBoundaries>>,
}

impl GeometryCache {
    /// Returns the boundaries, downloading them on first use.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError`] if the download fails.
    pub async fn get_or_fetch(
        &self,
        provider: &dyn GeometryProvider,
    ) -> Result<Arc<StateBoundaries>, ClientError> {
        self.cell
            .get_or_try_init(|| async {
                let collection = provider.feature_collection().await?;
                Ok::<_, ClientError>(Arc::new(StateBoundaries::from_collection(collection)))
            })
            .await
            .map(Arc::clone)
    }

    /// Returns the boundaries if they have been downloaded.
    #[must_use]
    pub fn get(&self) -> Option<Arc<StateBoundaries>> {
        self.cell.get().map(Arc::clone)
    }
}
