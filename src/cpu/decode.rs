// Copyright 2021 Nir H. All Rights Reserved.
// SPDX-License-Identifier: Apache-2.0

#![deny(missing_docs)]
//! Opcode fetch and dispatch.
//!
//! Both the base and `0xCB`-prefixed tables are implemented as one flat
//! `match` over the opcode byte rather than function-pointer tables or a
//! fully generalized `(x,y,z,p,q)` decomposition: a match arm per
//! documented opcode is the easiest of the three to audit byte-for-byte
//! against a reference opcode table. Undefined opcodes (the 11 bytes the
//! SM83 never decodes to anything) fall through to the catch-all arm and
//! execute as a 4-cycle NOP.

use super::alu;
use super::instructions::{
	check_condition, read_r16, read_r16_stk, read_r8, write_r16, write_r16_stk, write_r8,
};
use super::Cpu;
use crate::mmu::Mmu;

/// Fetches one opcode at `cpu.pc` and executes it, returning its T-cycle
/// cost. The `0xCB` prefix byte's own fetch is folded into the cost of
/// the CB-table instruction it introduces.
pub fn step(cpu: &mut Cpu, mmu: &mut Mmu) -> u8 {
	#[cfg(feature = "debug")]
	let address = cpu.pc;
	let opcode = cpu.fetch8(mmu);
	#[cfg(feature = "debug")]
	log::trace!("0x{:04x}: (0x{:02x}) af={:04x} bc={:04x} de={:04x} hl={:04x} sp={:04x}", address, opcode, cpu.af(), cpu.bc(), cpu.de(), cpu.hl(), cpu.sp);
	execute(cpu, mmu, opcode)
}

fn execute(cpu: &mut Cpu, mmu: &mut Mmu, opcode: u8) -> u8 {
	match opcode {
		0x00 => 4, // NOP
		0x01 => {
			let nn = cpu.fetch16(mmu);
			write_r16(cpu, 0, nn);
			12
		}
		0x02 => {
			mmu.write(cpu.bc(), cpu.a);
			8
		}
		0x03 => {
			write_r16(cpu, 0, read_r16(cpu, 0).wrapping_add(1));
			8
		}
		0x04 => {
			cpu.b = alu::inc8(cpu, cpu.b);
			4
		}
		0x05 => {
			cpu.b = alu::dec8(cpu, cpu.b);
			4
		}
		0x06 => {
			cpu.b = cpu.fetch8(mmu);
			8
		}
		0x07 => {
			cpu.a = alu::rlca(cpu, cpu.a);
			4
		}
		0x08 => {
			let nn = cpu.fetch16(mmu);
			mmu.write(nn, (cpu.sp & 0xFF) as u8);
			mmu.write(nn.wrapping_add(1), (cpu.sp >> 8) as u8);
			20
		}
		0x09 => {
			let result = alu::add_hl(cpu, cpu.hl(), read_r16(cpu, 0));
			cpu.set_hl(result);
			8
		}
		0x0A => {
			cpu.a = mmu.read(cpu.bc());
			8
		}
		0x0B => {
			write_r16(cpu, 0, read_r16(cpu, 0).wrapping_sub(1));
			8
		}
		0x0C => {
			cpu.c = alu::inc8(cpu, cpu.c);
			4
		}
		0x0D => {
			cpu.c = alu::dec8(cpu, cpu.c);
			4
		}
		0x0E => {
			cpu.c = cpu.fetch8(mmu);
			8
		}
		0x0F => {
			cpu.a = alu::rrca(cpu, cpu.a);
			4
		}

		0x10 => {
			let _ = cpu.fetch8(mmu); // STOP's mandatory second byte
			4
		}
		0x11 => {
			let nn = cpu.fetch16(mmu);
			write_r16(cpu, 1, nn);
			12
		}
		0x12 => {
			mmu.write(cpu.de(), cpu.a);
			8
		}
		0x13 => {
			write_r16(cpu, 1, read_r16(cpu, 1).wrapping_add(1));
			8
		}
		0x14 => {
			cpu.d = alu::inc8(cpu, cpu.d);
			4
		}
		0x15 => {
			cpu.d = alu::dec8(cpu, cpu.d);
			4
		}
		0x16 => {
			cpu.d = cpu.fetch8(mmu);
			8
		}
		0x17 => {
			cpu.a = alu::rla(cpu, cpu.a);
			4
		}
		0x18 => {
			jr(cpu, mmu);
			12
		}
		0x19 => {
			let result = alu::add_hl(cpu, cpu.hl(), read_r16(cpu, 1));
			cpu.set_hl(result);
			8
		}
		0x1A => {
			cpu.a = mmu.read(cpu.de());
			8
		}
		0x1B => {
			write_r16(cpu, 1, read_r16(cpu, 1).wrapping_sub(1));
			8
		}
		0x1C => {
			cpu.e = alu::inc8(cpu, cpu.e);
			4
		}
		0x1D => {
			cpu.e = alu::dec8(cpu, cpu.e);
			4
		}
		0x1E => {
			cpu.e = cpu.fetch8(mmu);
			8
		}
		0x1F => {
			cpu.a = alu::rra(cpu, cpu.a);
			4
		}

		0x20 => jr_cond(cpu, mmu, 0),
		0x21 => {
			let nn = cpu.fetch16(mmu);
			write_r16(cpu, 2, nn);
			12
		}
		0x22 => {
			mmu.write(cpu.hl(), cpu.a);
			cpu.set_hl(cpu.hl().wrapping_add(1));
			8
		}
		0x23 => {
			write_r16(cpu, 2, read_r16(cpu, 2).wrapping_add(1));
			8
		}
		0x24 => {
			cpu.h = alu::inc8(cpu, cpu.h);
			4
		}
		0x25 => {
			cpu.h = alu::dec8(cpu, cpu.h);
			4
		}
		0x26 => {
			cpu.h = cpu.fetch8(mmu);
			8
		}
		0x27 => {
			cpu.a = alu::daa(cpu, cpu.a);
			4
		}
		0x28 => jr_cond(cpu, mmu, 1),
		0x29 => {
			let result = alu::add_hl(cpu, cpu.hl(), read_r16(cpu, 2));
			cpu.set_hl(result);
			8
		}
		0x2A => {
			cpu.a = mmu.read(cpu.hl());
			cpu.set_hl(cpu.hl().wrapping_add(1));
			8
		}
		0x2B => {
			write_r16(cpu, 2, read_r16(cpu, 2).wrapping_sub(1));
			8
		}
		0x2C => {
			cpu.l = alu::inc8(cpu, cpu.l);
			4
		}
		0x2D => {
			cpu.l = alu::dec8(cpu, cpu.l);
			4
		}
		0x2E => {
			cpu.l = cpu.fetch8(mmu);
			8
		}
		0x2F => {
			cpu.a = alu::cpl(cpu, cpu.a);
			4
		}

		0x30 => jr_cond(cpu, mmu, 2),
		0x31 => {
			let nn = cpu.fetch16(mmu);
			write_r16(cpu, 3, nn);
			12
		}
		0x32 => {
			mmu.write(cpu.hl(), cpu.a);
			cpu.set_hl(cpu.hl().wrapping_sub(1));
			8
		}
		0x33 => {
			write_r16(cpu, 3, read_r16(cpu, 3).wrapping_add(1));
			8
		}
		0x34 => {
			let v = mmu.read(cpu.hl());
			let result = alu::inc8(cpu, v);
			mmu.write(cpu.hl(), result);
			12
		}
		0x35 => {
			let v = mmu.read(cpu.hl());
			let result = alu::dec8(cpu, v);
			mmu.write(cpu.hl(), result);
			12
		}
		0x36 => {
			let n = cpu.fetch8(mmu);
			mmu.write(cpu.hl(), n);
			12
		}
		0x37 => {
			alu::scf(cpu);
			4
		}
		0x38 => jr_cond(cpu, mmu, 3),
		0x39 => {
			let result = alu::add_hl(cpu, cpu.hl(), read_r16(cpu, 3));
			cpu.set_hl(result);
			8
		}
		0x3A => {
			cpu.a = mmu.read(cpu.hl());
			cpu.set_hl(cpu.hl().wrapping_sub(1));
			8
		}
		0x3B => {
			write_r16(cpu, 3, read_r16(cpu, 3).wrapping_sub(1));
			8
		}
		0x3C => {
			cpu.a = alu::inc8(cpu, cpu.a);
			4
		}
		0x3D => {
			cpu.a = alu::dec8(cpu, cpu.a);
			4
		}
		0x3E => {
			cpu.a = cpu.fetch8(mmu);
			8
		}
		0x3F => {
			alu::ccf(cpu);
			4
		}

		0x76 => {
			cpu.enter_halt(mmu);
			4
		}
		0x40..=0x7F => {
			let y = (opcode >> 3) & 0x07;
			let z = opcode & 0x07;
			let value = read_r8(cpu, mmu, z);
			write_r8(cpu, mmu, y, value);
			if y == 6 || z == 6 {
				8
			} else {
				4
			}
		}

		0x80..=0xBF => {
			let op = (opcode >> 3) & 0x07;
			let z = opcode & 0x07;
			let operand = read_r8(cpu, mmu, z);
			alu_op(cpu, op, operand);
			if z == 6 {
				8
			} else {
				4
			}
		}

		0xC0 => ret_cond(cpu, mmu, 0),
		0xC1 => {
			let v = cpu.pop16(mmu);
			write_r16_stk(cpu, 0, v);
			12
		}
		0xC2 => jp_cond(cpu, mmu, 0),
		0xC3 => {
			cpu.pc = cpu.fetch16(mmu);
			16
		}
		0xC4 => call_cond(cpu, mmu, 0),
		0xC5 => {
			cpu.push16(mmu, read_r16_stk(cpu, 0));
			16
		}
		0xC6 => {
			let n = cpu.fetch8(mmu);
			cpu.a = alu::add(cpu, cpu.a, n);
			8
		}
		0xC7 => rst(cpu, mmu, 0x00),
		0xC8 => ret_cond(cpu, mmu, 1),
		0xC9 => {
			cpu.pc = cpu.pop16(mmu);
			16
		}
		0xCA => jp_cond(cpu, mmu, 1),
		0xCB => {
			let cb = cpu.fetch8(mmu);
			execute_cb(cpu, mmu, cb)
		}
		0xCC => call_cond(cpu, mmu, 1),
		0xCD => {
			let nn = cpu.fetch16(mmu);
			cpu.push16(mmu, cpu.pc);
			cpu.pc = nn;
			24
		}
		0xCE => {
			let n = cpu.fetch8(mmu);
			cpu.a = alu::adc(cpu, cpu.a, n);
			8
		}
		0xCF => rst(cpu, mmu, 0x08),

		0xD0 => ret_cond(cpu, mmu, 2),
		0xD1 => {
			let v = cpu.pop16(mmu);
			write_r16_stk(cpu, 1, v);
			12
		}
		0xD2 => jp_cond(cpu, mmu, 2),
		0xD4 => call_cond(cpu, mmu, 2),
		0xD5 => {
			cpu.push16(mmu, read_r16_stk(cpu, 1));
			16
		}
		0xD6 => {
			let n = cpu.fetch8(mmu);
			cpu.a = alu::sub(cpu, cpu.a, n);
			8
		}
		0xD7 => rst(cpu, mmu, 0x10),
		0xD8 => ret_cond(cpu, mmu, 3),
		0xD9 => {
			cpu.pc = cpu.pop16(mmu);
			cpu.ime = true; // RETI: immediate, no EI-style delay
			16
		}
		0xDA => jp_cond(cpu, mmu, 3),
		0xDC => call_cond(cpu, mmu, 3),
		0xDE => {
			let n = cpu.fetch8(mmu);
			cpu.a = alu::sbc(cpu, cpu.a, n);
			8
		}
		0xDF => rst(cpu, mmu, 0x18),

		0xE0 => {
			let n = cpu.fetch8(mmu);
			mmu.write(0xFF00 + n as u16, cpu.a);
			12
		}
		0xE1 => {
			let v = cpu.pop16(mmu);
			write_r16_stk(cpu, 2, v);
			12
		}
		0xE2 => {
			mmu.write(0xFF00 + cpu.c as u16, cpu.a);
			8
		}
		0xE5 => {
			cpu.push16(mmu, read_r16_stk(cpu, 2));
			16
		}
		0xE6 => {
			let n = cpu.fetch8(mmu);
			cpu.a = alu::and(cpu, cpu.a, n);
			8
		}
		0xE7 => rst(cpu, mmu, 0x20),
		0xE8 => {
			let e = cpu.fetch8(mmu) as i8;
			cpu.sp = alu::add_sp_signed(cpu, cpu.sp, e);
			16
		}
		0xE9 => {
			cpu.pc = cpu.hl();
			4
		}
		0xEA => {
			let nn = cpu.fetch16(mmu);
			mmu.write(nn, cpu.a);
			16
		}
		0xEE => {
			let n = cpu.fetch8(mmu);
			cpu.a = alu::xor(cpu, cpu.a, n);
			8
		}
		0xEF => rst(cpu, mmu, 0x28),

		0xF0 => {
			let n = cpu.fetch8(mmu);
			cpu.a = mmu.read(0xFF00 + n as u16);
			12
		}
		0xF1 => {
			let v = cpu.pop16(mmu);
			write_r16_stk(cpu, 3, v);
			12
		}
		0xF2 => {
			cpu.a = mmu.read(0xFF00 + cpu.c as u16);
			8
		}
		0xF3 => {
			cpu.ime = false;
			cpu.cancel_pending_ei();
			4
		}
		0xF5 => {
			cpu.push16(mmu, read_r16_stk(cpu, 3));
			16
		}
		0xF6 => {
			let n = cpu.fetch8(mmu);
			cpu.a = alu::or(cpu, cpu.a, n);
			8
		}
		0xF7 => rst(cpu, mmu, 0x30),
		0xF8 => {
			let e = cpu.fetch8(mmu) as i8;
			let result = alu::add_sp_signed(cpu, cpu.sp, e);
			cpu.set_hl(result);
			12
		}
		0xF9 => {
			cpu.sp = cpu.hl();
			8
		}
		0xFA => {
			let nn = cpu.fetch16(mmu);
			cpu.a = mmu.read(nn);
			16
		}
		0xFB => {
			cpu.request_ei();
			4
		}
		0xFE => {
			let n = cpu.fetch8(mmu);
			alu::cp(cpu, cpu.a, n);
			8
		}
		0xFF => rst(cpu, mmu, 0x38),

		// 0xD3,0xDB,0xDD,0xE3,0xE4,0xEB,0xEC,0xED,0xF4,0xFC,0xFD: undefined.
		_ => 4,
	}
}

fn alu_op(cpu: &mut Cpu, op: u8, operand: u8) {
	match op {
		0 => cpu.a = alu::add(cpu, cpu.a, operand),
		1 => cpu.a = alu::adc(cpu, cpu.a, operand),
		2 => cpu.a = alu::sub(cpu, cpu.a, operand),
		3 => cpu.a = alu::sbc(cpu, cpu.a, operand),
		4 => cpu.a = alu::and(cpu, cpu.a, operand),
		5 => cpu.a = alu::xor(cpu, cpu.a, operand),
		6 => cpu.a = alu::or(cpu, cpu.a, operand),
		7 => alu::cp(cpu, cpu.a, operand),
		_ => unreachable!("alu op out of range"),
	}
}

fn jr(cpu: &mut Cpu, mmu: &Mmu) {
	let offset = cpu.fetch8(mmu) as i8;
	cpu.pc = (cpu.pc as i32 + offset as i32) as u16;
}

fn jr_cond(cpu: &mut Cpu, mmu: &Mmu, cc: u8) -> u8 {
	let offset = cpu.fetch8(mmu) as i8;
	if check_condition(cpu, cc) {
		cpu.pc = (cpu.pc as i32 + offset as i32) as u16;
		12
	} else {
		8
	}
}

fn jp_cond(cpu: &mut Cpu, mmu: &Mmu, cc: u8) -> u8 {
	let nn = cpu.fetch16(mmu);
	if check_condition(cpu, cc) {
		cpu.pc = nn;
		16
	} else {
		12
	}
}

fn call_cond(cpu: &mut Cpu, mmu: &mut Mmu, cc: u8) -> u8 {
	let nn = cpu.fetch16(mmu);
	if check_condition(cpu, cc) {
		cpu.push16(mmu, cpu.pc);
		cpu.pc = nn;
		24
	} else {
		12
	}
}

fn ret_cond(cpu: &mut Cpu, mmu: &Mmu, cc: u8) -> u8 {
	if check_condition(cpu, cc) {
		cpu.pc = cpu.pop16(mmu);
		20
	} else {
		8
	}
}

fn rst(cpu: &mut Cpu, mmu: &mut Mmu, vector: u16) -> u8 {
	cpu.push16(mmu, cpu.pc);
	cpu.pc = vector;
	16
}

fn execute_cb(cpu: &mut Cpu, mmu: &mut Mmu, cb: u8) -> u8 {
	let x = cb >> 6;
	let y = (cb >> 3) & 0x07;
	let z = cb & 0x07;
	let is_hl = z == 6;

	match x {
		0 => {
			let value = read_r8(cpu, mmu, z);
			let result = match y {
				0 => alu::rlc(cpu, value),
				1 => alu::rrc(cpu, value),
				2 => alu::rl(cpu, value),
				3 => alu::rr(cpu, value),
				4 => alu::sla(cpu, value),
				5 => alu::sra(cpu, value),
				6 => alu::swap(cpu, value),
				7 => alu::srl(cpu, value),
				_ => unreachable!("rot/shift select out of range"),
			};
			write_r8(cpu, mmu, z, result);
			if is_hl {
				16
			} else {
				8
			}
		}
		1 => {
			let value = read_r8(cpu, mmu, z);
			alu::bit(cpu, value, y);
			if is_hl {
				12
			} else {
				8
			}
		}
		2 => {
			let value = read_r8(cpu, mmu, z);
			let result = alu::res(value, y);
			write_r8(cpu, mmu, z, result);
			if is_hl {
				16
			} else {
				8
			}
		}
		3 => {
			let value = read_r8(cpu, mmu, z);
			let result = alu::set(value, y);
			write_r8(cpu, mmu, z, result);
			if is_hl {
				16
			} else {
				8
			}
		}
		_ => unreachable!("cb block out of range"),
	}
}
