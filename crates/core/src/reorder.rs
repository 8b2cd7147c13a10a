//! Slide reordering.
//!
//! The only place the slide sequence changes order. Slides are moved, never
//! rebuilt, so ids and content come through untouched.

use std::collections::{HashMap, HashSet};

use crate::error::{Error, Result};
use crate::slide::{Slide, SlideId};

/// Move the slide at `source` so that it ends up at `dest`.
///
/// Both indices must lie in `[0, len)`. The input is left unchanged.
pub fn reorder(slides: &[Slide], source: usize, dest: usize) -> Result<Vec<Slide>> {
    let len = slides.len();
    for index in [source, dest] {
        if index >= len {
            return Err(Error::IndexOutOfRange { index, len });
        }
    }

    let mut reordered = slides.to_vec();
    let moved = reordered.remove(source);
    reordered.insert(dest, moved);
    Ok(reordered)
}

/// Arrange slides in the order given by `order`, a permutation of their ids
/// as reported by the drag widget.
pub fn apply_order(slides: &[Slide], order: &[SlideId]) -> Result<Vec<Slide>> {
    if order.len() != slides.len() {
        return Err(Error::InvalidPermutation(format!(
            "expected {} ids, got {}",
            slides.len(),
            order.len()
        )));
    }

    let by_id: HashMap<&SlideId, &Slide> = slides.iter().map(|s| (s.id(), s)).collect();
    let mut seen = HashSet::with_capacity(order.len());
    let mut reordered = Vec::with_capacity(order.len());

    for id in order {
        if !seen.insert(id) {
            return Err(Error::InvalidPermutation(format!("duplicate id {}", id)));
        }
        let slide = by_id
            .get(id)
            .ok_or_else(|| Error::InvalidPermutation(format!("unknown id {}", id)))?;
        reordered.push((*slide).clone());
    }

    Ok(reordered)
}
