// Copyright 2021 Nir H. All Rights Reserved.
// SPDX-License-Identifier: Apache-2.0

#![deny(missing_docs)]
//! Ties the CPU and MMU together into one runnable machine.
//!
//! `System` owns both halves and is the only type most callers need:
//! [`System::step`] drives the CPU for one instruction and then the timer
//! for exactly the T-cycles that instruction took, rather than folding the
//! tick into a peripheral-aggregating `Memory` trait.

use crate::config::Config;
use crate::cpu::Cpu;
use crate::error::GameboyError;
use crate::mmu::Mmu;

/// T-cycles in one 59.7 Hz DMG video frame.
pub const CYCLES_PER_FRAME: u32 = 70_224;

/// A complete, runnable Game Boy (DMG) core.
pub struct System<'a> {
	cpu: Cpu,
	mmu: Mmu<'a>,
	config: Config,
}

impl<'a> System<'a> {
	/// Validates `rom` and builds a system in its true power-on state
	/// (every CPU register zero; call [`System::skip_boot_rom`] to jump
	/// straight to the documented post-boot-ROM state instead). Equivalent
	/// to a default-constructed, powered-off `System` immediately followed
	/// by [`System::load_rom`].
	pub fn new(rom: &'a [u8]) -> Result<Self, GameboyError> {
		let config = Config::default();
		Ok(System { cpu: Cpu::new(&config), mmu: Mmu::new(rom)?, config })
	}

	/// Validates and swaps in a new cartridge image, re-initializing the
	/// MBC it selects and resetting the CPU to power-on state. Lets a
	/// caller re-use one `System` value across multiple ROMs instead of
	/// constructing a fresh one per cartridge, e.g. a test harness running
	/// a suite of Blargg ROMs back to back.
	pub fn load_rom(&mut self, rom: &'a [u8]) -> Result<(), GameboyError> {
		self.mmu = Mmu::new(rom)?;
		self.cpu.reset(&self.config);
		Ok(())
	}

	/// Resets the CPU to its true power-on state. The cartridge and its
	/// RAM are untouched; only the CPU registers, timer, and the
	/// interrupt/joypad/serial state on the bus are cleared.
	pub fn reset(&mut self) {
		self.cpu.reset(&self.config);
		self.mmu.reset();
	}

	/// Applies the documented post-boot-ROM CPU register values, for
	/// callers that don't run an actual boot ROM image.
	pub fn skip_boot_rom(&mut self) {
		self.cpu.skip_boot_rom();
	}

	/// Runs one CPU instruction (or interrupt service, or halted idle
	/// cycle) and advances the timer by the same number of T-cycles.
	/// Returns the T-cycle cost of the step.
	pub fn step(&mut self) -> u8 {
		let cycles = self.cpu.step(&mut self.mmu);
		self.mmu.timer.tick(cycles, &mut self.mmu.if_reg);
		cycles
	}

	/// Runs steps until at least one full video frame's worth of
	/// T-cycles ([`CYCLES_PER_FRAME`]) has elapsed, returning the exact
	/// number of T-cycles actually run (always `>= CYCLES_PER_FRAME`,
	/// since a step is never subdivided).
	pub fn run_frame(&mut self) -> u32 {
		let mut elapsed = 0u32;
		while elapsed < CYCLES_PER_FRAME {
			elapsed += self.step() as u32;
		}
		elapsed
	}

	/// Total T-cycles run since construction or the last `reset`.
	pub fn cycles_total(&self) -> u64 {
		self.cpu.cycles()
	}

	/// Updates live button/d-pad input (bit set = pressed): bits 0-3 are
	/// Right/Left/Up/Down, bits 4-7 are A/B/Select/Start.
	pub fn set_input(&mut self, pressed_mask: u8) {
		self.mmu.set_input(pressed_mask);
	}

	/// Reads one byte off the bus exactly as the CPU would.
	pub fn read(&self, addr: u16) -> u8 {
		self.mmu.read(addr)
	}

	/// Writes one byte to the bus exactly as the CPU would.
	pub fn write(&mut self, addr: u16, value: u8) {
		self.mmu.write(addr, value);
	}

	/// A contiguous view over work RAM followed by high RAM (WRAM at
	/// offset 0, HRAM at offset 8192).
	pub fn ram(&self) -> &[u8] {
		self.mmu.ram()
	}

	/// Takes and clears the most recently completed serial-transfer byte,
	/// if one is pending.
	pub fn serial_take(&mut self) -> Option<u8> {
		self.mmu.serial_take()
	}

	/// The cartridge header's raw cartridge type byte (0x0147).
	pub fn cartridge_type(&self) -> u8 {
		self.mmu.cartridge_type()
	}
}
