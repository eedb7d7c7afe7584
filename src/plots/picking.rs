use bevy::prelude::*;

/// Returns the tag of the highest-z rect containing `point`.
/// Later candidates win ties.
pub fn topmost_hit<T>(point: Vec2, candidates: impl IntoIterator<Item = (Rect, f32, T)>) -> Option<T> {
    let mut best: Option<(f32, T)> = None;
    for (rect, z, tag) in candidates {
        if !rect.contains(point) {
            continue;
        }
        if best.as_ref().map_or(true, |(best_z, _)| z >= *best_z) {
            best = Some((z, tag));
        }
    }
    best.map(|(_, tag)| tag)
}
