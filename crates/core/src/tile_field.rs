//! The ordered collection of tiles covering the source region.
//!
//! Tiles are inserted in raster order when the grid is built and afterwards
//! only reordered by [`TileField::sort`], which puts the most energetic tiles
//! last so they paint on top. [`TileField::impact`] applies a randomized
//! shockwave using the max-force rule: a tile only takes the new impulse if
//! it is stronger than what it already carries.

use std::collections::HashSet;

use glam::DVec2;

use crate::error::TileError;
use crate::prng::RandomSource;
use crate::tile::{Phase, RenderInstruction, Tile};

/// Minimum blast radius of an impact, in surface units.
pub const BLAST_RADIUS_MIN: f64 = 220.0;
/// Random extra radius added per tile, drawn from `[0, BLAST_RADIUS_JITTER)`.
pub const BLAST_RADIUS_JITTER: f64 = 30.0;
/// Force given to a tile sitting exactly on the impact point.
pub const PEAK_FORCE: f64 = 3.0;

/// The rectangle of the source frame being tiled, anchored at (0, 0).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SourceRegion {
    width: usize,
    height: usize,
}

impl SourceRegion {
    /// Returns `TileError::UninitializedSource` until both dimensions are known.
    pub fn new(width: usize, height: usize) -> Result<Self, TileError> {
        if width == 0 || height == 0 {
            return Err(TileError::UninitializedSource);
        }
        Ok(Self { width, height })
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    /// Number of tiles a `tile_w × tile_h` grid needs to cover the region.
    pub fn cell_count(&self, tile_w: usize, tile_h: usize) -> usize {
        self.width.div_ceil(tile_w) * self.height.div_ceil(tile_h)
    }
}

/// Ordered tiles over one [`SourceRegion`], at most one per grid cell.
#[derive(Debug, Clone)]
pub struct TileField {
    region: SourceRegion,
    tile_size: (usize, usize),
    tiles: Vec<Tile>,
    occupied: HashSet<(usize, usize)>,
}

impl TileField {
    /// Creates an empty field over `region` with a `tile_size` grid.
    ///
    /// Returns `TileError::InvalidDimensions` if either tile side is zero.
    pub fn new(region: SourceRegion, tile_size: (usize, usize)) -> Result<Self, TileError> {
        if tile_size.0 == 0 || tile_size.1 == 0 {
            return Err(TileError::InvalidDimensions);
        }
        Ok(Self {
            region,
            tile_size,
            tiles: Vec::new(),
            occupied: HashSet::new(),
        })
    }

    /// Tiles `region` in `tile_size` steps, row by row, centering the grid
    /// on a surface of size `surface`.
    pub fn build(
        region: SourceRegion,
        surface: DVec2,
        tile_size: (usize, usize),
    ) -> Result<Self, TileError> {
        let mut field = Self::new(region, tile_size)?;
        let (tile_w, tile_h) = tile_size;
        let region_size = DVec2::new(region.width as f64, region.height as f64);
        let offset = DVec2::new(tile_w as f64, tile_h as f64) / 2.0 + (surface - region_size) / 2.0;

        field.tiles.reserve(region.cell_count(tile_w, tile_h));
        for y in (0..region.height).step_by(tile_h) {
            for x in (0..region.width).step_by(tile_w) {
                field.insert(Tile::new((x, y), offset))?;
            }
        }
        log::info!(
            "built tile field: {} tiles over {}x{} source",
            field.tiles.len(),
            region.width,
            region.height
        );
        Ok(field)
    }

    pub fn region(&self) -> SourceRegion {
        self.region
    }

    pub fn tile_size(&self) -> (usize, usize) {
        self.tile_size
    }

    pub fn len(&self) -> usize {
        self.tiles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tiles.is_empty()
    }

    /// Tiles in current draw order.
    pub fn tiles(&self) -> &[Tile] {
        &self.tiles
    }

    /// True when every tile is in the still phase.
    pub fn is_settled(&self) -> bool {
        self.tiles.iter().all(|t| t.phase() == Phase::Still)
    }

    /// Appends a tile.
    ///
    /// Returns `TileError::InvalidArgument` if the tile samples outside the
    /// region, is not aligned to the tile grid, or its cell is already
    /// present; the field is left unchanged.
    pub fn insert(&mut self, tile: Tile) -> Result<(), TileError> {
        let origin = tile.sample_origin();
        if origin.0 >= self.region.width || origin.1 >= self.region.height {
            return Err(TileError::InvalidArgument(format!(
                "tile origin ({}, {}) outside {}x{} region",
                origin.0, origin.1, self.region.width, self.region.height
            )));
        }
        let (tile_w, tile_h) = self.tile_size;
        if origin.0 % tile_w != 0 || origin.1 % tile_h != 0 {
            return Err(TileError::InvalidArgument(format!(
                "tile origin ({}, {}) is off the {tile_w}x{tile_h} grid",
                origin.0, origin.1
            )));
        }
        if !self.occupied.insert(origin) {
            return Err(TileError::InvalidArgument(format!(
                "duplicate tile at ({}, {})",
                origin.0, origin.1
            )));
        }
        self.tiles.push(tile);
        Ok(())
    }

    /// Applies a shockwave centred on `point` to every tile.
    ///
    /// Each tile draws its own blast radius, so the wavefront is ragged.
    /// Returns how many tiles took the new impulse. Callers that draw
    /// afterwards must [`sort`](Self::sort) first, or use
    /// [`explode`](Self::explode).
    pub fn impact(&mut self, point: DVec2, rng: &mut dyn RandomSource) -> usize {
        let mut raised = 0;
        for tile in &mut self.tiles {
            let diff = tile.position() - point;
            let distance = diff.length();
            let radius = rng.next_range(BLAST_RADIUS_MIN, BLAST_RADIUS_MIN + BLAST_RADIUS_JITTER);
            let force = PEAK_FORCE * (radius - distance) / radius;
            if force > tile.force() {
                let angle = diff.y.atan2(diff.x);
                let spin = 0.5 - rng.next_f64();
                tile.kick(force, DVec2::new(angle.cos(), angle.sin()), spin);
                raised += 1;
            }
        }
        log::debug!(
            "impact at ({:.1}, {:.1}) raised {raised} of {} tiles",
            point.x,
            point.y,
            self.tiles.len()
        );
        raised
    }

    /// Reorders tiles by ascending force so stronger tiles paint last.
    ///
    /// Ties may end up in any order.
    pub fn sort(&mut self) {
        self.tiles
            .sort_unstable_by(|a, b| a.force().total_cmp(&b.force()));
    }

    /// [`impact`](Self::impact) followed by [`sort`](Self::sort), so no draw
    /// can observe forces out of order.
    pub fn explode(&mut self, point: DVec2, rng: &mut dyn RandomSource) -> usize {
        let raised = self.impact(point, rng);
        self.sort();
        raised
    }

    /// Advances every tile in draw order and hands each result to `paint`.
    pub fn advance_and_draw_all<F>(&mut self, bounds: DVec2, mut paint: F)
    where
        F: FnMut(&RenderInstruction),
    {
        for tile in &mut self.tiles {
            let instruction = tile.advance(bounds);
            paint(&instruction);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::prng::{Scripted, Xorshift64};
    use crate::tile::{TILE_HEIGHT, TILE_WIDTH};

    const SURFACE: DVec2 = DVec2::new(1000.0, 600.0);
    const TILE: (usize, usize) = (TILE_WIDTH, TILE_HEIGHT);

    fn field(w: usize, h: usize) -> TileField {
        TileField::build(SourceRegion::new(w, h).unwrap(), SURFACE, TILE).unwrap()
    }

    #[test]
    fn region_rejects_unknown_dimensions() {
        assert!(matches!(
            SourceRegion::new(0, 480),
            Err(TileError::UninitializedSource)
        ));
        assert!(matches!(
            SourceRegion::new(640, 0),
            Err(TileError::UninitializedSource)
        ));
    }

    #[test]
    fn build_two_tile_strip() {
        let f = field(64, 24);
        assert_eq!(f.len(), 2);
        assert_eq!(f.tiles()[0].sample_origin(), (0, 0));
        assert_eq!(f.tiles()[1].sample_origin(), (32, 0));
    }

    #[test]
    fn build_centers_grid_on_surface() {
        let f = field(640, 480);
        // offset = (16, 12) + ((1000 - 640) / 2, (600 - 480) / 2)
        assert_eq!(f.tiles()[0].rest_position(), DVec2::new(196.0, 72.0));
        assert_eq!(f.len(), 20 * 20);
    }

    #[test]
    fn build_is_raster_order() {
        let f = field(70, 50);
        let origins: Vec<_> = f.tiles().iter().map(|t| t.sample_origin()).collect();
        assert_eq!(
            origins,
            vec![
                (0, 0),
                (32, 0),
                (64, 0),
                (0, 24),
                (32, 24),
                (64, 24),
                (0, 48),
                (32, 48),
                (64, 48),
            ]
        );
    }

    #[test]
    fn new_rejects_zero_tile_size() {
        let region = SourceRegion::new(64, 24).unwrap();
        assert!(matches!(
            TileField::new(region, (0, 24)),
            Err(TileError::InvalidDimensions)
        ));
        assert!(matches!(
            TileField::build(region, SURFACE, (32, 0)),
            Err(TileError::InvalidDimensions)
        ));
    }

    #[test]
    fn insert_rejects_tile_overlapping_a_cell() {
        let mut f = TileField::new(SourceRegion::new(64, 24).unwrap(), TILE).unwrap();
        f.insert(Tile::new((0, 0), DVec2::ZERO)).unwrap();
        assert!(matches!(
            f.insert(Tile::new((5, 5), DVec2::ZERO)),
            Err(TileError::InvalidArgument(_))
        ));
        assert!(matches!(
            f.insert(Tile::new((32, 5), DVec2::ZERO)),
            Err(TileError::InvalidArgument(_))
        ));
        f.insert(Tile::new((32, 0), DVec2::ZERO)).unwrap();
        assert_eq!(f.len(), 2);
    }

    #[test]
    fn insert_rejects_duplicates_and_out_of_region() {
        let mut f = TileField::new(SourceRegion::new(64, 24).unwrap(), TILE).unwrap();
        f.insert(Tile::new((0, 0), DVec2::ZERO)).unwrap();
        assert!(matches!(
            f.insert(Tile::new((0, 0), DVec2::ZERO)),
            Err(TileError::InvalidArgument(_))
        ));
        assert!(matches!(
            f.insert(Tile::new((64, 0), DVec2::ZERO)),
            Err(TileError::InvalidArgument(_))
        ));
        assert_eq!(f.len(), 1);
    }

    #[test]
    fn far_impact_leaves_tiles_still() {
        let mut f = field(64, 24);
        // Tiles rest near (484..516, 300); (100, 100) is > 400 away.
        let mut rng = Xorshift64::new(1);
        let raised = f.explode(DVec2::new(100.0, 100.0), &mut rng);
        assert_eq!(raised, 0);
        assert!(f.tiles().iter().all(|t| t.force() == 0.0));
        f.advance_and_draw_all(SURFACE, |ins| assert!(!ins.moving));
    }

    #[test]
    fn impact_sets_direction_away_from_point() {
        let mut f = field(32, 24);
        let pos = f.tiles()[0].position();
        let mut rng = Scripted::new(vec![0.0, 0.25]);
        f.impact(pos - DVec2::new(10.0, 0.0), &mut rng);
        let t = f.tiles()[0];
        assert!((t.force() - 3.0 * 210.0 / 220.0).abs() < 1e-9);
        assert!((t.velocity() - DVec2::X).length() < 1e-9);
        assert!((t.angular_velocity() - 0.25).abs() < 1e-12);
    }

    #[test]
    fn weaker_impact_is_ignored() {
        let mut f = field(32, 24);
        let pos = f.tiles()[0].position();
        let mut rng = Scripted::new(vec![0.0, 0.5]);
        f.impact(pos, &mut rng);
        let before = f.tiles()[0];
        f.impact(pos + DVec2::new(100.0, 0.0), &mut rng);
        assert_eq!(f.tiles()[0], before);
    }

    #[test]
    fn sort_orders_by_ascending_force() {
        let mut f = field(320, 240);
        let mut rng = Xorshift64::new(42);
        f.explode(DVec2::new(500.0, 300.0), &mut rng);
        let forces: Vec<f64> = f.tiles().iter().map(|t| t.force()).collect();
        assert!(forces.windows(2).all(|w| w[0] <= w[1]));
        assert!(*forces.last().unwrap() > 2.0);
    }

    #[test]
    fn field_settles_after_explosion() {
        let mut f = field(128, 96);
        let mut rng = Xorshift64::new(7);
        f.explode(DVec2::new(500.0, 300.0), &mut rng);
        assert!(!f.is_settled());
        for _ in 0..2_000 {
            f.advance_and_draw_all(SURFACE, |_| {});
        }
        assert!(f.is_settled());
        assert!(f
            .tiles()
            .iter()
            .all(|t| t.position() == t.rest_position() && t.rotation() == 0.0));
    }

    mod proptests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn grid_covers_region_exactly(w in 1_usize..400, h in 1_usize..300) {
                let f = field(w, h);
                prop_assert_eq!(f.len(), w.div_ceil(32) * h.div_ceil(24));
                let mut covered = vec![0u8; w * h];
                for t in f.tiles() {
                    let (ox, oy) = t.sample_origin();
                    for y in oy..(oy + TILE_HEIGHT).min(h) {
                        for x in ox..(ox + TILE_WIDTH).min(w) {
                            covered[y * w + x] += 1;
                        }
                    }
                }
                prop_assert!(covered.iter().all(|&c| c == 1));
            }

            #[test]
            fn impacts_never_lower_force(
                seed: u64,
                points in prop::collection::vec((0.0_f64..1000.0, 0.0_f64..600.0), 1..6),
            ) {
                let mut f = field(160, 120);
                let mut rng = Xorshift64::new(seed);
                let mut prev: Vec<((usize, usize), f64)> =
                    f.tiles().iter().map(|t| (t.sample_origin(), t.force())).collect();
                for (x, y) in points {
                    f.explode(DVec2::new(x, y), &mut rng);
                    for (origin, force) in &prev {
                        let now = f.tiles().iter().find(|t| t.sample_origin() == *origin).unwrap();
                        prop_assert!(now.force() >= *force);
                    }
                    prev = f.tiles().iter().map(|t| (t.sample_origin(), t.force())).collect();
                }
            }

            #[test]
            fn sort_is_ascending_for_any_seed(seed: u64, x in 0.0_f64..1000.0, y in 0.0_f64..600.0) {
                let mut f = field(256, 192);
                let mut rng = Xorshift64::new(seed);
                f.explode(DVec2::new(x, y), &mut rng);
                prop_assert!(f.tiles().windows(2).all(|w| w[0].force() <= w[1].force()));
            }
        }
    }
}
