//! User-facing integer options and their persistence seam.
//!
//! Values round-trip through an [`OptionStore`] as plain `i32`s; anything out
//! of range falls back to the default with a warning.

use std::collections::HashMap;

pub const RESOLUTION_SCALE_KEY: &str = "prison.resolution_scale";
pub const PALETTE_KEY: &str = "mandelbrot.palette";

/// Key-value persistence for integer options.
pub trait OptionStore {
    fn get_int(&self, key: &str) -> Option<i32>;
    fn set_int(&mut self, key: &str, value: i32);
}

/// In-memory store; the desktop host does not persist between runs.
#[derive(Debug, Default, Clone)]
pub struct MemoryOptionStore {
    values: HashMap<String, i32>,
}

impl MemoryOptionStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl OptionStore for MemoryOptionStore {
    fn get_int(&self, key: &str) -> Option<i32> {
        self.values.get(key).copied()
    }

    fn set_int(&mut self, key: &str, value: i32) {
        self.values.insert(key.to_string(), value);
    }
}

/// Off-screen render resolution relative to the surface.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Default)]
pub enum ResolutionScale {
    Full,
    #[default]
    Half,
    Quarter,
    Eighth,
}

impl ResolutionScale {
    pub const ALL: [ResolutionScale; 4] = [
        ResolutionScale::Full,
        ResolutionScale::Half,
        ResolutionScale::Quarter,
        ResolutionScale::Eighth,
    ];

    pub fn from_index(index: i32) -> Option<Self> {
        usize::try_from(index).ok().and_then(|i| Self::ALL.get(i).copied())
    }

    pub fn index(self) -> i32 {
        match self {
            ResolutionScale::Full => 0,
            ResolutionScale::Half => 1,
            ResolutionScale::Quarter => 2,
            ResolutionScale::Eighth => 3,
        }
    }

    pub fn factor(self) -> f32 {
        match self {
            ResolutionScale::Full => 1.0,
            ResolutionScale::Half => 0.5,
            ResolutionScale::Quarter => 0.25,
            ResolutionScale::Eighth => 0.125,
        }
    }

    /// Scaled size of a `width x height` surface; never zero.
    pub fn apply(self, width: u32, height: u32) -> (u32, u32) {
        let f = self.factor();
        let scale = |v: u32| ((v as f32 * f) as u32).max(1);
        (scale(width), scale(height))
    }

    pub fn load(store: &dyn OptionStore) -> Self {
        match store.get_int(RESOLUTION_SCALE_KEY) {
            None => Self::default(),
            Some(index) => Self::from_index(index).unwrap_or_else(|| {
                log::warn!("invalid resolution scale index {index}; using default");
                Self::default()
            }),
        }
    }

    pub fn save(self, store: &mut dyn OptionStore) {
        store.set_int(RESOLUTION_SCALE_KEY, self.index());
    }
}

/// Index of one of a scene's built-in color gradients.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Default)]
pub struct PaletteIndex(u32);

impl PaletteIndex {
    pub fn new(index: i32, count: u32) -> Option<Self> {
        u32::try_from(index).ok().filter(|&i| i < count).map(PaletteIndex)
    }

    #[inline]
    pub fn get(self) -> u32 {
        self.0
    }

    /// Next palette, wrapping around.
    pub fn cycle(self, count: u32) -> Self {
        PaletteIndex((self.0 + 1) % count.max(1))
    }

    pub fn load(store: &dyn OptionStore, count: u32) -> Self {
        match store.get_int(PALETTE_KEY) {
            None => Self::default(),
            Some(index) => Self::new(index, count).unwrap_or_else(|| {
                log::warn!("invalid palette index {index} (have {count}); using default");
                Self::default()
            }),
        }
    }

    pub fn save(self, store: &mut dyn OptionStore) {
        store.set_int(PALETTE_KEY, self.0 as i32);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // ── resolution scale ──────────────────────────────────────────────────

    #[test]
    fn index_maps_to_factor() {
        let factors: Vec<f32> = (0..4)
            .map(|i| ResolutionScale::from_index(i).unwrap().factor())
            .collect();
        assert_eq!(factors, [1.0, 0.5, 0.25, 0.125]);
        assert!(ResolutionScale::from_index(4).is_none());
        assert!(ResolutionScale::from_index(-1).is_none());
    }

    #[test]
    fn quarter_of_full_hd() {
        assert_eq!(ResolutionScale::Quarter.apply(1920, 1080), (480, 270));
        assert_eq!(ResolutionScale::Eighth.apply(4, 4), (1, 1));
    }

    #[test]
    fn scale_round_trips_through_store() {
        let mut store = MemoryOptionStore::new();
        assert_eq!(ResolutionScale::load(&store), ResolutionScale::Half);
        ResolutionScale::Eighth.save(&mut store);
        assert_eq!(store.get_int(RESOLUTION_SCALE_KEY), Some(3));
        assert_eq!(ResolutionScale::load(&store), ResolutionScale::Eighth);
    }

    #[test]
    fn invalid_stored_scale_falls_back() {
        let mut store = MemoryOptionStore::new();
        store.set_int(RESOLUTION_SCALE_KEY, 17);
        assert_eq!(ResolutionScale::load(&store), ResolutionScale::default());
    }

    // ── palette ───────────────────────────────────────────────────────────

    #[test]
    fn palette_bounds_and_cycle() {
        assert!(PaletteIndex::new(3, 4).is_some());
        assert!(PaletteIndex::new(4, 4).is_none());
        let p = PaletteIndex::new(3, 4).unwrap();
        assert_eq!(p.cycle(4).get(), 0);
    }

    #[test]
    fn palette_round_trips_through_store() {
        let mut store = MemoryOptionStore::new();
        PaletteIndex::new(2, 4).unwrap().save(&mut store);
        assert_eq!(PaletteIndex::load(&store, 4).get(), 2);
        store.set_int(PALETTE_KEY, 9);
        assert_eq!(PaletteIndex::load(&store, 4).get(), 0);
    }
}
