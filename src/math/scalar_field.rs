// src/math/scalar_field.rs

use crate::math::types::Point2D;

/// Trait für ein zweidimensionales Skalarfeld auf einem regelmäßigen Gitter.
/// Ermöglicht es Darstellung und Export, auf verschiedenen
/// Feldimplementierungen zu operieren.
pub trait ScalarField2D {
    /// Anzahl der Gitterpunkte in x-Richtung.
    fn width(&self) -> usize;

    /// Anzahl der Gitterpunkte in y-Richtung.
    fn height(&self) -> usize;

    /// Abstand benachbarter Gitterpunkte in Weltkoordinaten.
    fn cell_size(&self) -> f64;

    /// Gibt den Skalarwert am Gitterpunkt (x_idx, y_idx) zurück.
    /// Außerhalb des Gitters wird 0.0 geliefert.
    fn get_value(&self, x_idx: usize, y_idx: usize) -> f64;

    /// Konvertiert einen Gitterindex in Weltkoordinaten.
    fn cell_to_world(&self, x_idx: usize, y_idx: usize) -> Point2D {
        Point2D::new(
            x_idx as f64 * self.cell_size(),
            y_idx as f64 * self.cell_size(),
        )
    }
}
