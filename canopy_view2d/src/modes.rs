// Copyright 2026 the Canopy Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

/// How fitted content should be positioned inside the viewport.
///
/// Consulted by [`crate::Camera::fit_rect`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum FitMode {
    /// Center the fitted rectangle in the viewport.
    #[default]
    Center,
    /// Align the fitted rectangle's minimum corner with the viewport origin.
    AlignMin,
}
