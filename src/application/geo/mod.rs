//! Geo-classification: gazetteer matching and market-context proposals

pub mod classifier;
pub mod gazetteer;

pub use classifier::{Classification, Confidence, GeoClassifier};
pub use gazetteer::{Gazetteer, GazetteerMatch};
