use anyhow::Result;
use async_trait::async_trait;
use tracing::info;

use leadfinder_common::{Anchor, GeoScope};

use crate::pipeline::{RunContext, Stage};

/// Downtown Vancouver, used when the scope has no explicit circle.
pub const FALLBACK_CENTER: (f64, f64) = (49.2827, -123.1207);
pub const FALLBACK_RADIUS_KM: f64 = 30.0;

/// Turns the geographic scope into search anchors.
///
/// Always a single anchor today. The multi-anchor shape is kept so that
/// tiling a region into several circles can slot in here without touching
/// discovery.
pub struct AnchorStage;

pub fn anchors_for(scope: &GeoScope, quota: u32) -> Vec<Anchor> {
    let (center_lat, center_lng, radius_km) =
        match (scope.center_lat, scope.center_lng, scope.radius_km) {
            (Some(lat), Some(lng), Some(radius)) => (lat, lng, radius),
            _ => (FALLBACK_CENTER.0, FALLBACK_CENTER.1, FALLBACK_RADIUS_KM),
        };

    vec![Anchor {
        center_lat,
        center_lng,
        radius_km,
        quota,
    }]
}

#[async_trait]
impl Stage for AnchorStage {
    fn name(&self) -> &'static str {
        "anchors"
    }

    async fn execute(&self, ctx: &mut RunContext) -> Result<()> {
        ctx.anchors = anchors_for(&ctx.request.geo_scope, ctx.plan.target_count);
        info!(search_id = ctx.search_id.as_str(), anchors = ctx.anchors.len(), "Anchors generated");
        Ok(())
    }
}
