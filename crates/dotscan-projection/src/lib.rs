//! Projection synthesis for AR overlays.
//!
//! Builds an asymmetric perspective matrix from fixed camera intrinsics so a
//! rendering camera's frustum matches the physical camera, taking the device
//! orientation, the sensor aspect and the on-screen crop of the camera image
//! into account.
//!
//! - [`IntrinsicParams`] / [`DeviceProfile`]: per-device calibration table.
//! - [`BackgroundAlignment`]: how the camera image is fitted to the screen.
//! - [`ProjectionMatrixBuilder`]: the 8-branch orientation/aspect frustum table.
//! - [`ArCameraRig`]: recomputes both on display changes and hands them to a
//!   [`RenderCamera`], never applying a degenerate matrix.

mod alignment;
mod config;
mod intrinsics;
mod projection;
mod rig;

pub use alignment::BackgroundAlignment;
pub use config::{ProjectionConfig, ProjectionError};
pub use intrinsics::{DeviceProfile, IntrinsicParams, ParseDeviceError};
pub use projection::{FrustumLayout, FrustumParams, ProjectionMatrix, ProjectionMatrixBuilder};
pub use rig::{ArCameraRig, DisplayTracker, RenderCamera};
