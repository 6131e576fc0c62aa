// Copyright 2021 Nir H. All Rights Reserved.
// SPDX-License-Identifier: Apache-2.0

#![deny(missing_docs)]
//! Emulator hardware emulation configuration and preferences.
//!
//! Game Boy Color extensions are an explicit non-goal of this core, so
//! `HardwareModel` carries only the DMG variant for now. [`crate::cpu::Cpu::new`]
//! and [`crate::cpu::Cpu::reset`] take a `Config` so a second model could
//! steer power-on state without changing their signature, but with only one
//! variant there's nothing yet for it to select. `Mmu` has no model-dependent
//! behavior and does not take a `Config` at all.

/// The hardware specification for the emulated machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HardwareModel {
	/// Original Game Boy (DMG).
	Dmg,
}

/// Emulation settings and preferences.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Config {
	/// The model of the emulated machine.
	pub model: HardwareModel,
}

impl Default for Config {
	fn default() -> Self {
		Config { model: HardwareModel::Dmg }
	}
}
