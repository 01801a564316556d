use crate::types::{FeatureVector, LandmarkSet, FEATURE_LEN};

/// Per-axis minimum over all landmarks, i.e. the low corner of the bounding box.
pub fn min_corner(set: &LandmarkSet) -> (f64, f64, f64) {
    set.iter().fold(
        (f64::INFINITY, f64::INFINITY, f64::INFINITY),
        |(mx, my, mz), lm| (mx.min(lm.x), my.min(lm.y), mz.min(lm.z)),
    )
}

/// Shift the point cloud so its bounding-box corner sits at the origin on each
/// axis and flatten it to `[x0, y0, z0, x1, ...]`.
///
/// Invariant to where the hand is in the frame; NOT invariant to scale or
/// rotation, which matches how the training data was normalized.
/// Offsets are computed in f64 and narrowed to the model's f32 afterwards.
pub fn build_features(set: &LandmarkSet) -> FeatureVector {
    let (min_x, min_y, min_z) = min_corner(set);

    let mut values = [0.0f32; FEATURE_LEN];
    for (i, lm) in set.iter().enumerate() {
        values[i * 3] = (lm.x - min_x) as f32;
        values[i * 3 + 1] = (lm.y - min_y) as f32;
        values[i * 3 + 2] = (lm.z - min_z) as f32;
    }
    FeatureVector(values)
}
