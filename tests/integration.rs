// Copyright 2021 Nir H. All Rights Reserved.
// SPDX-License-Identifier: Apache-2.0

//! Cross-module end-to-end scenarios. Unit tests live beside each module;
//! scenarios that only make sense driven through the full `System` (CPU +
//! MMU + MBC + Timer together) live here instead.

use gameboy_core::System;

/// Installs the `log` subscriber so `RUST_LOG=trace cargo test --
/// --nocapture` shows per-opcode tracing from the `debug` feature.
/// Idempotent: every test calls this before building its `System`.
fn init_logger() {
	let _ = env_logger::builder().is_test(true).try_init();
}

/// A minimal 32 KiB ROM-only cartridge header, with room left for the test
/// to place its own code at 0x0100 and at the interrupt vectors.
fn blank_rom() -> Vec<u8> {
	init_logger();
	let mut rom = vec![0u8; 0x8000];
	rom[0x0147] = 0x00; // ROM only, no MBC
	rom[0x0148] = 0x00; // 32 KiB
	rom
}

#[test]
fn halt_bug_executes_the_following_opcode_twice_end_to_end() {
	let mut rom = blank_rom();
	rom[0x0100] = 0x76; // HALT
	rom[0x0101] = 0x3C; // INC A: the byte the bug causes to run twice
	rom[0x0102] = 0xF5; // PUSH AF, reached once both INC A's have landed
	let mut gb = System::new(&rom).unwrap();
	gb.skip_boot_rom();
	// IME clear, but a timer interrupt is already pending: HALT triggers the
	// bug instead of actually halting. IME never becomes true in this test,
	// so IE/IF otherwise have no further effect.
	gb.write(0xFFFF, 0x04); // IE: Timer
	gb.write(0xFF0F, 0x04); // IF: Timer already pending

	gb.step(); // HALT: bug triggers, does not halt; PC advances to 0x0101
	gb.step(); // INC A fetched without incrementing PC (still 0x0101); A=1
	gb.step(); // same byte fetched again, PC now advances to 0x0102; A=2
	gb.step(); // PUSH AF

	// A==2 and F==0 (Z/N/H/C all clear after two INC A's from zero) are
	// confirmed by reading the bytes PUSH AF just placed on the stack,
	// since `System` does not expose CPU registers directly.
	assert_eq!(gb.read(0xFFFD), 0x02); // A, the high byte of AF
	assert_eq!(gb.read(0xFFFC), 0x00); // F, the low byte of AF
}

#[test]
fn timer_overflow_raises_interrupt_and_cpu_vectors_to_0x0050() {
	let mut rom = blank_rom();
	rom[0x0100] = 0xFB; // EI
	rom[0x0101] = 0x00; // NOP (IME becomes live once this completes)
	rom[0x0102] = 0x18; // JR -2 (spin, waiting for the timer interrupt)
	rom[0x0103] = 0xFE;
	// Timer interrupt service vector (0x0050). Landing here proves the
	// overflow/reload/IF/vector chain worked; the handler disables the
	// timer first (so TIMA freezes at its just-reloaded value) and then
	// latches a sentinel byte into HRAM, since `System` doesn't expose PC.
	rom[0x0050] = 0x3E; // LD A,0x00
	rom[0x0051] = 0x00;
	rom[0x0052] = 0xE0; // LDH (0x07),A -> TAC = 0, timer disabled
	rom[0x0053] = 0x07;
	rom[0x0054] = 0x3E; // LD A,0x99
	rom[0x0055] = 0x99;
	rom[0x0056] = 0xE0; // LDH (0x80),A -> writes 0xFF80
	rom[0x0057] = 0x80;
	rom[0x0058] = 0x18; // JR -2 (spin forever once serviced)
	rom[0x0059] = 0xFE;

	let mut gb = System::new(&rom).unwrap();
	gb.skip_boot_rom();
	gb.write(0xFFFF, 0x04); // IE: Timer
	gb.write(0xFF07, 0x07); // TAC: enabled, select 11 -> bit 7 (every 256 cycles)
	gb.write(0xFF06, 0xFE); // TMA
	gb.write(0xFF05, 0xFE); // TIMA: two edges away from overflow

	let mut serviced = false;
	for _ in 0..500 {
		gb.step();
		if gb.read(0xFF80) == 0x99 {
			serviced = true;
			break;
		}
	}

	assert!(serviced, "timer overflow never reached the interrupt vector");
	// TIMA reloaded from TMA, and the IF bit is cleared again by the CPU's
	// interrupt-service sequence (it only stays set until serviced); the
	// handler's own TAC=0 write keeps a later, unrelated edge from
	// incrementing TIMA again before we get to look at it.
	assert_eq!(gb.read(0xFF05), 0xFE);
	assert_eq!(gb.read(0xFF0F) & 0x04, 0);
}

#[test]
fn mbc1_bank_switch_is_visible_to_the_next_fetch() {
	// Selecting ROM bank 5 and reading 0x4000 should return the byte at ROM
	// offset 0x14000, exercised here through the same bus the CPU itself
	// reads through.
	init_logger();
	let mut rom = vec![0u8; 0x40000]; // 256 KiB, 16 banks
	rom[0x0147] = 0x01; // MBC1
	rom[0x0148] = 0x03; // 256 KiB
	rom[0x14000] = 0xAB;

	let mut gb = System::new(&rom).unwrap();
	gb.write(0x2100, 0x05); // select ROM bank 5
	assert_eq!(gb.read(0x4000), 0xAB);
	assert_eq!(gb.cartridge_type(), 0x01);
}

#[test]
fn push_pop_register_pair_round_trips_through_real_instructions() {
	let mut rom = blank_rom();
	rom[0x0100] = 0x01; // LD BC,0x1234
	rom[0x0101] = 0x34;
	rom[0x0102] = 0x12;
	rom[0x0103] = 0xC5; // PUSH BC
	rom[0x0104] = 0xC1; // POP BC (into BC again, proving the round trip)
	rom[0x0105] = 0xC5; // PUSH BC a second time so we can inspect the stack

	let mut gb = System::new(&rom).unwrap();
	gb.skip_boot_rom();
	let sp_before = 0xFFFEu16;

	gb.step(); // LD BC,0x1234
	gb.step(); // PUSH BC
	assert_eq!(gb.read(sp_before - 1), 0x12);
	assert_eq!(gb.read(sp_before - 2), 0x34);

	gb.step(); // POP BC: SP restored, BC back to 0x1234
	gb.step(); // PUSH BC again: should push the identical bytes
	assert_eq!(gb.read(sp_before - 1), 0x12);
	assert_eq!(gb.read(sp_before - 2), 0x34);
}

#[test]
fn serial_harness_observes_a_latched_blargg_style_byte() {
	// Blargg test ROMs report pass/fail one byte at a time by writing the
	// byte to 0xFF01 and then 0x81 to 0xFF02. A harness drains each byte
	// with `serial_take` the way a real one collects the "...Passed" string.
	let mut rom = blank_rom();
	let mut pc = 0x0100usize;
	let mut emit = |rom: &mut Vec<u8>, pc: &mut usize, byte: u8| {
		rom[*pc] = 0x3E; // LD A,byte
		rom[*pc + 1] = byte;
		rom[*pc + 2] = 0xE0; // LDH (0x01),A
		rom[*pc + 3] = 0x01;
		rom[*pc + 4] = 0x3E; // LD A,0x81
		rom[*pc + 5] = 0x81;
		rom[*pc + 6] = 0xE0; // LDH (0x02),A
		rom[*pc + 7] = 0x02;
		*pc += 8;
	};
	for &byte in b"OK" {
		emit(&mut rom, &mut pc, byte);
	}
	rom[pc] = 0x18; // JR -2, spin once both bytes are sent
	rom[pc + 1] = 0xFE;

	let mut gb = System::new(&rom).unwrap();
	gb.skip_boot_rom();

	let mut received = Vec::new();
	for _ in 0..64 {
		gb.step();
		if let Some(byte) = gb.serial_take() {
			received.push(byte);
		}
	}

	assert_eq!(received, b"OK");
	assert_eq!(gb.serial_take(), None);
}

#[test]
fn div_write_resets_counter_and_cycles_keep_advancing() {
	let mut rom = blank_rom();
	rom[0x0100] = 0x00; // NOP
	let mut gb = System::new(&rom).unwrap();
	gb.skip_boot_rom();

	for _ in 0..2000 {
		gb.step();
	}
	assert_ne!(gb.read(0xFF04), 0);

	let cycles_before = gb.cycles_total();
	gb.write(0xFF04, 0xFF); // any written value resets DIV to 0
	assert_eq!(gb.read(0xFF04), 0);
	gb.step();
	assert!(gb.cycles_total() > cycles_before);
}
