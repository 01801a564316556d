//! Real-time SIBI alphabet recognition over WebSocket.
//!
//! A client streams the 21 hand landmarks of each camera frame to
//! `/ws/predict`; every complete hand is normalized, scored by the CNN model
//! and answered with a single letter (`A`..`Z`, or `?` for an unmapped class).

pub mod args;
pub mod classifier;
pub mod config;
pub mod error;
pub mod features;
pub mod frame;
pub mod labels;
pub mod logging;
pub mod pipeline;
pub mod streaming;
pub mod types;
