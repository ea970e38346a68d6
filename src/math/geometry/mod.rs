// src/math/geometry/mod.rs

pub mod circle;

pub use self::circle::{circle_area, exact_circle_overlap_area};
