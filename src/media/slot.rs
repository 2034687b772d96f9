/// Load-state tracking for the image currently on screen
///
/// Every accepted reference gets a fresh `Generation`. The render host
/// tags its load/error signals with the generation it was started for,
/// so a signal from a superseded reference can never touch the current
/// state. A load failure substitutes the default asset once; further
/// failures for the same generation change nothing.

use tracing::{debug, warn};

use super::resolver::{Degradation, ImageSourceResolver, ResolvedSource};

/// Identity of one accepted reference
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Generation(u64);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadPhase {
    Normal,
    Degraded,
}

/// What a render-host signal did to the slot
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SlotSignal {
    /// Signal belongs to an older generation; discarded
    Stale,
    /// Signal was current but had no effect
    Ignored,
    /// First failure: the default asset is now the active source
    Substituted(ResolvedSource),
    /// The active source finished loading
    Completed,
}

#[derive(Debug, Clone)]
pub struct ImageSlot {
    generation: Generation,
    phase: LoadPhase,
    active: ResolvedSource,
    fallback: ResolvedSource,
    loading: bool,
}

impl ImageSlot {
    /// An idle slot showing the default asset
    pub fn new(resolver: &ImageSourceResolver) -> Self {
        let fallback = resolver.default_source();
        Self {
            generation: Generation::default(),
            phase: LoadPhase::Normal,
            active: fallback.clone(),
            fallback,
            loading: false,
        }
    }

    /// Accept a new reference, resetting to `Normal`.
    /// Returns the generation the render host must tag its signals with.
    pub fn accept(&mut self, resolver: &ImageSourceResolver, reference: &str) -> Generation {
        self.generation = Generation(self.generation.0 + 1);
        self.phase = LoadPhase::Normal;
        self.active = resolver.resolve(reference);
        self.fallback = resolver.default_source();
        self.loading = true;

        debug!(
            generation = self.generation.0,
            location = %self.active.location,
            is_fallback = self.active.is_fallback,
            "Accepted image reference"
        );

        self.generation
    }

    pub fn on_load_error(&mut self, generation: Generation) -> SlotSignal {
        if generation != self.generation {
            return SlotSignal::Stale;
        }

        match self.phase {
            LoadPhase::Normal => {
                warn!(
                    generation = generation.0,
                    location = %self.active.location,
                    condition = ?Degradation::LoadFailure,
                    "Image failed to load, substituting default"
                );
                self.phase = LoadPhase::Degraded;
                self.active = self.fallback.clone();
                SlotSignal::Substituted(self.active.clone())
            }
            // The default itself failed; do not loop
            LoadPhase::Degraded => SlotSignal::Ignored,
        }
    }

    /// Marks loading complete. Does not leave `Degraded`.
    pub fn on_load_success(&mut self, generation: Generation) -> SlotSignal {
        if generation != self.generation {
            return SlotSignal::Stale;
        }
        self.loading = false;
        SlotSignal::Completed
    }

    #[cfg(test)]
    pub fn generation(&self) -> Generation {
        self.generation
    }

    pub fn phase(&self) -> LoadPhase {
        self.phase
    }

    pub fn active_source(&self) -> &ResolvedSource {
        &self.active
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }
}
