// Copyright 2021 Nir H. All Rights Reserved.
// SPDX-License-Identifier: Apache-2.0

#![deny(missing_docs)]
//! The library's exported errors.
//!
//! Per the core's error handling design, a `GameboyError` can only ever be
//! produced while loading a cartridge image, from [`crate::system::System::new`]
//! or [`crate::system::System::load_rom`]. Every other operation on a loaded
//! core is total: undefined memory reads return `0xFF`, undefined writes are
//! ignored, and undefined opcodes execute as a 4-cycle NOP. There is no panic
//! path in steady state.

use core::fmt;

/// The library's exported errors.
///
/// All three variants surface only from `load_rom`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GameboyError {
	/// The cartridge header's type byte (0x0147) names a memory bank
	/// controller this core does not implement.
	UnsupportedCartridge(u8),
	/// The ROM is shorter than its header's declared size class (0x0148).
	RomTooSmall {
		/// Bytes actually supplied.
		actual: usize,
		/// Bytes required by the header's size class.
		expected: usize,
	},
	/// The ROM exceeds the implementation's maximum supported size.
	RomTooLarge {
		/// Bytes actually supplied.
		actual: usize,
		/// The implementation's maximum.
		max: usize,
	},
}

impl fmt::Display for GameboyError {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match *self {
			GameboyError::UnsupportedCartridge(byte) => {
				write!(f, "unsupported cartridge type: 0x{:02x}", byte)
			}
			GameboyError::RomTooSmall { actual, expected } => {
				write!(f, "rom too small: {} bytes, header declares {}", actual, expected)
			}
			GameboyError::RomTooLarge { actual, max } => {
				write!(f, "rom too large: {} bytes, maximum supported is {}", actual, max)
			}
		}
	}
}

#[cfg(feature = "std")]
impl std::error::Error for GameboyError {}
