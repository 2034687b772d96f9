/// Listing image handling
///
/// This module handles:
/// - Classifying raw image references (reference.rs)
/// - The bundled asset table (assets.rs)
/// - Resolving references to renderable sources (resolver.rs)
/// - One-shot fallback and stale-signal tracking (slot.rs)
/// - Reading and decoding sources in the background (loader.rs)

pub mod assets;
pub mod loader;
pub mod reference;
pub mod resolver;
pub mod slot;

pub use resolver::ImageSourceResolver;
pub use slot::{Generation, ImageSlot, SlotSignal};
