use serde_json::Value;

use crate::error::FrameError;
use crate::types::{Landmark, LandmarkSet, LANDMARK_COUNT};

/// Outcome of decoding one inbound text frame.
#[derive(Debug)]
pub enum Admission {
    /// Exactly 21 well-formed landmarks; goes to the pipeline.
    Accepted(LandmarkSet),
    /// Empty, null, falsy or partial hand. Not an error, the frame is just dropped.
    Skipped { count: usize },
    /// Could not be read as landmarks at all; logged and dropped.
    Rejected(FrameError),
}

/// `null`, `false`, `0`, `""`, `{}` and `[]` all mean "no hand in this frame".
fn is_empty_value(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::Bool(b) => !b,
        Value::Number(n) => n.as_f64() == Some(0.0),
        Value::String(s) => s.is_empty(),
        Value::Array(items) => items.is_empty(),
        Value::Object(map) => map.is_empty(),
    }
}

fn kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

/// Decode a text frame into an [`Admission`].
///
/// The count gate runs before any landmark is inspected, so a 20-point
/// frame with garbage in it is still a silent skip.
pub fn admit(text: &str) -> Admission {
    let value: Value = match serde_json::from_str(text) {
        Ok(v) => v,
        Err(e) => return Admission::Rejected(FrameError::Json(e)),
    };

    if is_empty_value(&value) {
        return Admission::Skipped { count: 0 };
    }

    let items = match value {
        Value::Array(items) => items,
        other => return Admission::Rejected(FrameError::NotAnArray(kind(&other))),
    };

    if items.len() != LANDMARK_COUNT {
        return Admission::Skipped { count: items.len() };
    }

    let mut points = Vec::with_capacity(LANDMARK_COUNT);
    for (index, item) in items.into_iter().enumerate() {
        match serde_json::from_value::<Landmark>(item) {
            Ok(lm) => points.push(lm),
            Err(source) => return Admission::Rejected(FrameError::Landmark { index, source }),
        }
    }

    match LandmarkSet::try_from(points) {
        Ok(set) => Admission::Accepted(set),
        Err(count) => Admission::Skipped { count },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn hand(n: usize) -> String {
        let points: Vec<Value> = (0..n)
            .map(|i| json!({ "x": 0.1 * i as f64, "y": 0.5, "z": -0.02, "visibility": 0.9 }))
            .collect();
        Value::Array(points).to_string()
    }

    #[test]
    fn accepts_exactly_21_landmarks() {
        match admit(&hand(21)) {
            Admission::Accepted(set) => {
                assert_eq!(set.iter().count(), 21);
                assert_eq!(set.iter().next().map(|lm| lm.y), Some(0.5));
                assert_eq!(set.iter().nth(3).map(|lm| lm.x), Some(0.1 * 3.0));
            }
            other => panic!("expected Accepted, got {:?}", other),
        }
    }

    #[test]
    fn wrong_counts_are_skipped() {
        for n in [0, 1, 20, 22] {
            match admit(&hand(n)) {
                Admission::Skipped { count } => assert_eq!(count, n),
                other => panic!("expected Skipped for {} points, got {:?}", n, other),
            }
        }
        assert!(matches!(admit("null"), Admission::Skipped { count: 0 }));
    }

    #[test]
    fn falsy_values_are_skipped_not_rejected() {
        for text in ["null", "false", "0", "0.0", "\"\"", "{}", "[]"] {
            assert!(
                matches!(admit(text), Admission::Skipped { count: 0 }),
                "expected Skipped for {}",
                text
            );
        }
    }

    #[test]
    fn partial_hand_with_bad_fields_is_still_skipped() {
        let text = json!([{ "x": 1 }, { "nope": true }]).to_string();
        assert!(matches!(admit(&text), Admission::Skipped { count: 2 }));
    }

    #[test]
    fn invalid_json_is_rejected() {
        assert!(matches!(
            admit("not json at all"),
            Admission::Rejected(FrameError::Json(_))
        ));
        assert!(matches!(
            admit("[{\"x\": 1,"),
            Admission::Rejected(FrameError::Json(_))
        ));
    }

    #[test]
    fn non_array_json_is_rejected() {
        assert!(matches!(
            admit("{\"x\": 1}"),
            Admission::Rejected(FrameError::NotAnArray("an object"))
        ));
        assert!(matches!(
            admit("42"),
            Admission::Rejected(FrameError::NotAnArray("a number"))
        ));
    }

    #[test]
    fn missing_coordinate_is_rejected_with_index() {
        let mut points: Vec<Value> = (0..21).map(|_| json!({ "x": 0, "y": 0, "z": 0 })).collect();
        points[13] = json!({ "x": 0.2, "y": 0.3 });
        let text = Value::Array(points).to_string();

        match admit(&text) {
            Admission::Rejected(FrameError::Landmark { index, .. }) => assert_eq!(index, 13),
            other => panic!("expected Rejected, got {:?}", other),
        }
    }

    #[test]
    fn integer_coordinates_are_accepted() {
        let points: Vec<Value> = (0..21).map(|i| json!({ "x": i, "y": 1, "z": 0 })).collect();
        assert!(matches!(admit(&Value::Array(points).to_string()), Admission::Accepted(_)));
    }
}
