//! Viewport transform and animated fitting.
//!
//! The viewport maps layout coordinates to screen pixels with a uniform
//! scale followed by a translation. Changes requested by the controller are
//! applied as timed transitions eased with cubic in-out; callers sample the
//! current transform with [`Viewport::transform_at`].

use log::debug;

use nodemap_core::geometry::{Bounds, Insets, Point, Size};

use crate::config::ViewportConfig;

/// A screen-space transform: `screen = layout * scale + translate`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ViewTransform {
    translate: Point,
    scale: f32,
}

impl ViewTransform {
    pub fn new(translate: Point, scale: f32) -> Self {
        Self { translate, scale }
    }

    /// The transform that leaves layout coordinates unchanged.
    pub fn identity() -> Self {
        Self::new(Point::default(), 1.0)
    }

    pub fn translate(&self) -> Point {
        self.translate
    }

    pub fn scale(&self) -> f32 {
        self.scale
    }

    /// Maps a layout point to screen space.
    pub fn apply(&self, point: Point) -> Point {
        point.scale(self.scale).add_point(self.translate)
    }

    fn interpolate(&self, other: &Self, t: f32) -> Self {
        Self {
            translate: self.translate.lerp(other.translate, t),
            scale: self.scale + (other.scale - self.scale) * t,
        }
    }
}

impl Default for ViewTransform {
    fn default() -> Self {
        Self::identity()
    }
}

/// Computes the transform that fits `bounds` into a viewport of `size`.
///
/// The bounds are padded by the configured padding on every side, the scale
/// is the smaller of the two axis ratios times the configured multiplier,
/// and the translation centers the padded bounds in the viewport.
///
/// Returns `None` when the bounds or the viewport have a non-positive
/// width or height.
///
/// # Examples
///
/// ```
/// use nodemap::{config::ViewportConfig, viewport::fit_transform};
/// use nodemap_core::geometry::{Bounds, Point, Size};
///
/// let bounds = Bounds::new_from_top_left(Point::new(0.0, 0.0), Size::new(100.0, 100.0));
/// let fit = fit_transform(bounds, Size::new(400.0, 200.0), &ViewportConfig::default()).unwrap();
/// assert_eq!(fit.scale(), 0.9);
///
/// assert!(fit_transform(Bounds::empty(), Size::new(400.0, 200.0), &ViewportConfig::default()).is_none());
/// ```
pub fn fit_transform(bounds: Bounds, size: Size, config: &ViewportConfig) -> Option<ViewTransform> {
    if bounds.is_degenerate() || size.is_degenerate() {
        return None;
    }

    let padded = bounds.add_padding(Insets::uniform(config.zoom_padding()));
    let scale = (size.width() / padded.width()).min(size.height() / padded.height())
        * config.zoom_scale_multiplier();

    let center = padded.center();
    let translate = Point::new(
        size.width() / 2.0 - scale * center.x(),
        size.height() / 2.0 - scale * center.y(),
    );

    Some(ViewTransform::new(translate, scale))
}

/// Cubic in-out easing on `0..=1`.
pub fn ease_cubic_in_out(t: f32) -> f32 {
    let t = t.clamp(0.0, 1.0) * 2.0;
    if t <= 1.0 {
        t * t * t / 2.0
    } else {
        let t = t - 2.0;
        (t * t * t + 2.0) / 2.0
    }
}

/// A timed change from one transform to another.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transition {
    from: ViewTransform,
    to: ViewTransform,
    start_ms: f64,
    duration_ms: f64,
}

impl Transition {
    pub fn new(from: ViewTransform, to: ViewTransform, start_ms: f64, duration_ms: f64) -> Self {
        Self {
            from,
            to,
            start_ms,
            duration_ms,
        }
    }

    pub fn target(&self) -> ViewTransform {
        self.to
    }

    /// Linear progress in `0..=1` at `now_ms`.
    pub fn progress(&self, now_ms: f64) -> f32 {
        if self.duration_ms <= 0.0 {
            return 1.0;
        }
        ((now_ms - self.start_ms) / self.duration_ms).clamp(0.0, 1.0) as f32
    }

    pub fn is_finished(&self, now_ms: f64) -> bool {
        self.progress(now_ms) >= 1.0
    }

    /// Eased transform at `now_ms`.
    pub fn sample(&self, now_ms: f64) -> ViewTransform {
        self.from
            .interpolate(&self.to, ease_cubic_in_out(self.progress(now_ms)))
    }
}

/// The viewport of a node map: its pixel size, committed transform and an
/// optional transition in flight.
#[derive(Debug, Clone)]
pub struct Viewport {
    size: Size,
    transform: ViewTransform,
    transition: Option<Transition>,
}

impl Viewport {
    pub fn new(size: Size) -> Self {
        Self {
            size,
            transform: ViewTransform::identity(),
            transition: None,
        }
    }

    pub fn size(&self) -> Size {
        self.size
    }

    pub fn set_size(&mut self, size: Size) {
        self.size = size;
    }

    /// Transform at `now_ms`, taking a running transition into account.
    pub fn transform_at(&self, now_ms: f64) -> ViewTransform {
        match &self.transition {
            Some(transition) => transition.sample(now_ms),
            None => self.transform,
        }
    }

    /// Transform the viewport rests at once any transition has finished.
    pub fn target(&self) -> ViewTransform {
        self.transform
    }

    pub fn is_transitioning(&self, now_ms: f64) -> bool {
        self.transition
            .is_some_and(|transition| !transition.is_finished(now_ms))
    }

    /// Commits a finished transition. Returns the committed transform.
    pub fn advance(&mut self, now_ms: f64) -> ViewTransform {
        if let Some(transition) = self.transition.filter(|t| t.is_finished(now_ms)) {
            self.transform = transition.target();
            self.transition = None;
        }
        self.transform_at(now_ms)
    }

    /// Applies a transform immediately, cancelling any transition.
    ///
    /// This is what manual pan and zoom gestures do.
    pub fn set_transform(&mut self, transform: ViewTransform) {
        self.transform = transform;
        self.transition = None;
    }

    /// Starts a transition from the current transform to `target`.
    pub fn transition_to(&mut self, target: ViewTransform, now_ms: f64, duration_ms: f64) {
        let from = self.transform_at(now_ms);
        self.transform = target;
        self.transition = Some(Transition::new(from, target, now_ms, duration_ms));
    }

    /// Fits the viewport to `bounds` over `duration_ms`.
    ///
    /// Degenerate bounds leave the viewport untouched and return `None`.
    pub fn fit_to_bounds(
        &mut self,
        bounds: Bounds,
        config: &ViewportConfig,
        now_ms: f64,
        duration_ms: f64,
    ) -> Option<ViewTransform> {
        let Some(target) = fit_transform(bounds, self.size, config) else {
            debug!(
                width = bounds.width(),
                height = bounds.height();
                "Skipped viewport fit on degenerate bounds"
            );
            return None;
        };

        debug!(
            scale = target.scale(),
            translate_x = target.translate().x(),
            translate_y = target.translate().y(),
            duration_ms;
            "Fitting viewport to bounds"
        );
        self.transition_to(target, now_ms, duration_ms);
        Some(target)
    }

    /// Transitions back to the identity transform.
    pub fn reset(&mut self, now_ms: f64, duration_ms: f64) {
        debug!(duration_ms; "Resetting viewport");
        self.transition_to(ViewTransform::identity(), now_ms, duration_ms);
    }
}
