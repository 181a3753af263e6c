use crate::model::BandId;
use crate::render::RenderedBand;
use indexmap::IndexMap;

/// Rendered bands of a session in draw order, addressed by stable handle.
#[derive(Debug, Clone, Default)]
pub struct BandRegistry {
    bands: IndexMap<BandId, RenderedBand>,
}

impl BandRegistry {
    pub fn new() -> Self {
        BandRegistry::default()
    }

    pub fn insert(&mut self, band: RenderedBand) {
        self.bands.insert(band.id, band);
    }

    pub fn get(&self, id: BandId) -> Option<&RenderedBand> {
        self.bands.get(&id)
    }

    pub fn contains(&self, id: BandId) -> bool {
        self.bands.contains_key(&id)
    }

    pub fn len(&self) -> usize {
        self.bands.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bands.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &RenderedBand> {
        self.bands.values()
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut RenderedBand> {
        self.bands.values_mut()
    }

    pub fn clear(&mut self) {
        self.bands.clear();
    }

    pub fn visible_count(&self) -> usize {
        self.bands.values().filter(|b| b.visible).count()
    }

    /// Sets each band's `selected` flag from `is_selected`; returns the
    /// handles whose flag changed. Running it twice changes nothing.
    pub fn refresh_selected<F>(&mut self, is_selected: F) -> Vec<BandId>
    where
        F: Fn(BandId) -> bool,
    {
        let mut changed = Vec::new();
        for band in self.bands.values_mut() {
            let selected = is_selected(band.id);
            if band.selected != selected {
                band.selected = selected;
                changed.push(band.id);
            }
        }
        changed
    }
}
