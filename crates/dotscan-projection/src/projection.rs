//! Off-axis perspective projection from intrinsics.
//!
//! The physical camera image may be rotated against the screen and cropped
//! by the background alignment, so focal lengths and principal point have to
//! be picked per orientation and sensor aspect before the usual OpenGL-style
//! frustum matrix is built.

use dotscan_core::{ImageSize, Orientation};
use nalgebra::{Matrix4, Vector2};

#[cfg(feature = "tracing")]
use tracing::instrument;

use crate::IntrinsicParams;

/// Row of the orientation table: how sensor axes land on screen axes.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FrustumLayout {
    /// Screen u runs along the sensor height (focal lengths swap as well).
    pub transposed: bool,
    /// Principal point is measured from the far edge of the u axis.
    pub flip_u: bool,
    /// Principal point is measured from the far edge of the v axis.
    pub flip_v: bool,
}

const fn layout(transposed: bool, flip_u: bool, flip_v: bool) -> FrustumLayout {
    FrustumLayout {
        transposed,
        flip_u,
        flip_v,
    }
}

/// Indexed by `[sensor is wide][orientation]`, orientations in
/// [`Orientation::ALL`] order.
const LAYOUTS: [[FrustumLayout; 4]; 2] = [
    // tall sensor
    [
        layout(false, false, false),
        layout(false, true, true),
        layout(true, false, false),
        layout(true, true, true),
    ],
    // wide sensor
    [
        layout(true, false, false),
        layout(true, true, true),
        layout(false, true, false),
        layout(false, false, true),
    ],
];

impl FrustumLayout {
    pub fn select(orientation: Orientation, sensor: ImageSize) -> Self {
        let row = usize::from(sensor.is_wide());
        let col = match orientation {
            Orientation::Portrait => 0,
            Orientation::PortraitUpsideDown => 1,
            Orientation::LandscapeLeft => 2,
            Orientation::LandscapeRight => 3,
        };
        LAYOUTS[row][col]
    }
}

/// Intermediate frustum values, in sensor pixels.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FrustumParams {
    pub px: f32,
    pub py: f32,
    pub u0: f32,
    pub v0: f32,
    pub width: f32,
    pub height: f32,
}

impl FrustumParams {
    /// `on_screen_ratio` is `(horizontal, vertical)` from the background
    /// alignment. Wide sensors pair u with the horizontal ratio, tall sensors
    /// with the vertical one.
    pub fn compute(
        intrinsics: &IntrinsicParams,
        orientation: Orientation,
        sensor: ImageSize,
        on_screen_ratio: Vector2<f32>,
    ) -> Self {
        let l = FrustumLayout::select(orientation, sensor);
        let (w, h) = (sensor.width as f32, sensor.height as f32);
        let IntrinsicParams { fx, fy, cx, cy } = *intrinsics;

        let (px, py, cu, cv, du, dv) = if l.transposed {
            (fy, fx, cy, cx, h, w)
        } else {
            (fx, fy, cx, cy, w, h)
        };
        let (ru, rv) = if sensor.is_wide() {
            (on_screen_ratio.x, on_screen_ratio.y)
        } else {
            (on_screen_ratio.y, on_screen_ratio.x)
        };

        let u0 = (if l.flip_u { du - cu } else { cu }) * ru;
        let v0 = (if l.flip_v { dv - cv } else { cv }) * rv;
        Self {
            px,
            py,
            u0,
            v0,
            width: du * ru,
            height: dv * rv,
        }
    }
}

/// Column-vector 4x4 projection, OpenGL clip conventions.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ProjectionMatrix {
    pub m: Matrix4<f32>,
}

impl ProjectionMatrix {
    pub fn new(m: Matrix4<f32>) -> Self {
        Self { m }
    }

    pub fn zero() -> Self {
        Self::new(Matrix4::zeros())
    }

    /// The all-zero matrix signals a failed build and must not be applied.
    pub fn is_degenerate(&self) -> bool {
        self.m.iter().all(|&v| v == 0.0)
    }

    pub fn to_rows(&self) -> [[f32; 4]; 4] {
        let mut rows = [[0.0; 4]; 4];
        for (r, row) in rows.iter_mut().enumerate() {
            for (c, v) in row.iter_mut().enumerate() {
                *v = self.m[(r, c)];
            }
        }
        rows
    }

    /// Flat column-major array, the layout most engines upload as-is.
    pub fn to_column_major(&self) -> [f32; 16] {
        let mut out = [0.0; 16];
        out.copy_from_slice(self.m.as_slice());
        out
    }
}

/// Builds projection matrices for one camera and clip range.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ProjectionMatrixBuilder {
    intrinsics: IntrinsicParams,
    near: f32,
    far: f32,
}

impl ProjectionMatrixBuilder {
    pub fn new(intrinsics: IntrinsicParams, near: f32, far: f32) -> Self {
        Self {
            intrinsics,
            near,
            far,
        }
    }

    pub fn intrinsics(&self) -> &IntrinsicParams {
        &self.intrinsics
    }

    pub fn clip_planes(&self) -> (f32, f32) {
        (self.near, self.far)
    }

    /// Build the projection for `orientation`. Returns the zero matrix when
    /// the inputs cannot produce a finite frustum.
    #[cfg_attr(feature = "tracing", instrument(level = "debug", skip(self)))]
    pub fn build(
        &self,
        orientation: Orientation,
        sensor: ImageSize,
        on_screen_ratio: Vector2<f32>,
    ) -> ProjectionMatrix {
        let (near, far) = (self.near, self.far);
        if sensor.is_empty() || far == near {
            log::warn!("cannot build projection for sensor {sensor}, near {near}, far {far}");
            return ProjectionMatrix::zero();
        }

        let p = FrustumParams::compute(&self.intrinsics, orientation, sensor, on_screen_ratio);
        if p.width <= 0.0 || p.height <= 0.0 {
            log::warn!("degenerate frustum {p:?}");
            return ProjectionMatrix::zero();
        }

        let mut m = Matrix4::zeros();
        m[(0, 0)] = 2.0 * p.px / p.width;
        m[(0, 2)] = 2.0 * (p.u0 / p.width) - 1.0;
        m[(1, 1)] = 2.0 * p.py / p.height;
        m[(1, 2)] = 2.0 * (p.v0 / p.height) - 1.0;
        m[(2, 2)] = -(far + near) / (far - near);
        m[(2, 3)] = -(2.0 * far * near) / (far - near);
        m[(3, 2)] = -1.0;

        if m.iter().any(|v| !v.is_finite()) {
            log::warn!("non-finite projection for {orientation:?}, sensor {sensor}");
            return ProjectionMatrix::zero();
        }
        ProjectionMatrix::new(m)
    }
}
