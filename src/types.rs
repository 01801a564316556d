use serde::{Deserialize, Serialize};

/// Number of tracked hand keypoints in one frame.
pub const LANDMARK_COUNT: usize = 21;

/// Length of the flattened, normalized model input.
pub const FEATURE_LEN: usize = LANDMARK_COUNT * 3;

/// Represents a single tracked hand keypoint in normalized camera space.
/// Extra fields sent by the tracker (visibility, presence, ...) are ignored.
///
/// Kept in double precision: the offsets from the minimum are taken in f64
/// and only narrowed when the model input is built.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Landmark {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl Landmark {
    pub fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }
}

/// The 21 keypoints of one hand, in anatomical order (0 is the wrist).
///
/// Only constructible with exactly [`LANDMARK_COUNT`] points, so anything
/// holding a `LandmarkSet` has already passed the count gate.
#[derive(Debug, Clone, PartialEq)]
pub struct LandmarkSet {
    points: [Landmark; LANDMARK_COUNT],
}

impl LandmarkSet {
    pub fn iter(&self) -> impl Iterator<Item = &Landmark> {
        self.points.iter()
    }
}

impl TryFrom<Vec<Landmark>> for LandmarkSet {
    type Error = usize;

    /// Fails with the offending length when it is not exactly 21.
    fn try_from(points: Vec<Landmark>) -> Result<Self, Self::Error> {
        let len = points.len();
        let points: [Landmark; LANDMARK_COUNT] = points.try_into().map_err(|_| len)?;
        Ok(Self { points })
    }
}

/// Translation-normalized model input: `(x_i - min_x, y_i - min_y, z_i - min_z)`
/// for every landmark, flattened in landmark order.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FeatureVector(pub [f32; FEATURE_LEN]);

impl FeatureVector {
    pub fn as_slice(&self) -> &[f32] {
        &self.0
    }
}
