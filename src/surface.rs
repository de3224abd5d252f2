//! The render surface: background, quote overlay, and export control.

use crate::cache::ImageRef;
use crate::error::CardError;
use crate::ports::Quote;
use crate::state::AppState;

/// Logical size of the surface and the device pixel density.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Layout {
    /// Logical width.
    pub width: u32,
    /// Logical height.
    pub height: u32,
    /// Device pixel ratio used when rasterizing.
    pub pixel_ratio: f32,
}

impl Default for Layout {
    fn default() -> Self {
        Self { width: 430, height: 764, pixel_ratio: 1.0 }
    }
}

/// Largest physical edge a capture may have.
pub const MAX_PIXEL_EDGE: u32 = 16_384;

impl Layout {
    /// Output size in physical pixels.
    ///
    /// # Errors
    ///
    /// Returns `CardError::InvalidArgument` if the ratio is not a positive
    /// finite number or either edge would exceed [`MAX_PIXEL_EDGE`].
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    pub fn pixel_size(&self) -> Result<(u32, u32), CardError> {
        let ratio = f64::from(self.pixel_ratio);
        if !(ratio.is_finite() && ratio > 0.0) {
            return Err(CardError::InvalidArgument(format!(
                "Scale must be a positive number, got {}",
                self.pixel_ratio
            )));
        }
        let physical = |logical: u32| {
            let edge = (f64::from(logical) * ratio).round();
            if edge <= f64::from(MAX_PIXEL_EDGE) {
                Ok(edge as u32)
            } else {
                Err(CardError::InvalidArgument(format!(
                    "Surface {}x{} at scale {} exceeds the {MAX_PIXEL_EDGE} pixel limit",
                    self.width, self.height, self.pixel_ratio
                )))
            }
        };
        Ok((physical(self.width)?, physical(self.height)?))
    }
}

/// What sits on top of the background.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Overlay {
    /// No quote yet.
    Empty,
    /// A quote fetch is in flight.
    Spinner,
    /// The current quote.
    Quote(Quote),
}

/// State of the export button.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Control {
    /// Pressable.
    Enabled,
    /// Disabled with a spinner while an export runs.
    Busy,
}

/// A snapshot of everything drawn on screen.
#[derive(Debug, Clone, PartialEq)]
pub struct Surface {
    /// Size and density.
    pub layout: Layout,
    /// Background layer; absent until the image has finished caching.
    pub background: Option<ImageRef>,
    /// Quote layer.
    pub overlay: Overlay,
    /// Export button.
    pub export_control: Control,
}

impl Surface {
    /// Derive the surface from application state.
    #[must_use]
    pub fn from_state(state: &AppState, layout: Layout) -> Self {
        let overlay = if state.is_loading {
            Overlay::Spinner
        } else {
            state.quote.clone().map_or(Overlay::Empty, Overlay::Quote)
        };
        let export_control = if state.is_exporting { Control::Busy } else { Control::Enabled };
        Self { layout, background: state.displayed_image().cloned(), overlay, export_control }
    }

    /// A working copy with the background layer pointed at `reference`.
    #[must_use]
    pub fn with_background(&self, reference: Option<ImageRef>) -> Self {
        Self { background: reference, ..self.clone() }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::Action;

    #[test]
    fn pixel_size_honors_ratio() {
        let layout = Layout { width: 430, height: 764, pixel_ratio: 2.0 };
        assert_eq!(layout.pixel_size().unwrap(), (860, 1528));
        let layout = Layout { width: 100, height: 50, pixel_ratio: 1.5 };
        assert_eq!(layout.pixel_size().unwrap(), (150, 75));
    }

    #[test]
    fn oversized_layouts_are_rejected() {
        for layout in [
            Layout { width: 430, height: 764, pixel_ratio: 1e10 },
            Layout { width: 430, height: 764, pixel_ratio: f32::MAX },
            Layout { width: u32::MAX, height: 764, pixel_ratio: 1.0 },
            Layout { width: 430, height: MAX_PIXEL_EDGE + 1, pixel_ratio: 1.0 },
        ] {
            let err = layout.pixel_size().unwrap_err();
            assert!(matches!(err, CardError::InvalidArgument(_)), "{layout:?}");
            assert!(err.to_string().contains("pixel limit"));
        }
        let edge = Layout { width: MAX_PIXEL_EDGE, height: 1, pixel_ratio: 1.0 };
        assert_eq!(edge.pixel_size().unwrap(), (MAX_PIXEL_EDGE, 1));
    }

    #[test]
    fn non_positive_ratios_are_rejected() {
        for ratio in [0.0, -1.0, f32::NAN, f32::INFINITY] {
            let layout = Layout { width: 430, height: 764, pixel_ratio: ratio };
            assert!(layout.pixel_size().unwrap_err().to_string().contains("Scale must be"));
        }
    }

    #[test]
    fn spinner_while_loading() {
        let state = AppState::new("life", "u").reduce(Action::QuoteRequested);
        let surface = Surface::from_state(&state, Layout::default());
        assert_eq!(surface.overlay, Overlay::Spinner);
        assert_eq!(surface.export_control, Control::Enabled);
    }

    #[test]
    fn background_gated_by_loaded_flag() {
        let reference = ImageRef::File("bg.jpg".into());
        let state = AppState::new("life", "u")
            .reduce(Action::ImageRequested("u".into()))
            .reduce(Action::ImageCached { token: 1, reference: reference.clone() });
        assert_eq!(Surface::from_state(&state, Layout::default()).background, Some(reference));

        let state = state.reduce(Action::ImageRequested("v".into()));
        assert!(Surface::from_state(&state, Layout::default()).background.is_none());
    }

    #[test]
    fn busy_control_while_exporting() {
        let state = AppState::new("life", "u").reduce(Action::ExportStarted);
        let surface = Surface::from_state(&state, Layout::default());
        assert_eq!(surface.export_control, Control::Busy);
        assert_eq!(surface.overlay, Overlay::Empty);
    }
}
