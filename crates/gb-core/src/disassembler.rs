//! One-instruction disassembler used by the CLI's `--trace-cpu` option.
//!
//! Unlike `Cpu::step`, this never mutates CPU state and never ticks the
//! bus; it only reads bytes to render a mnemonic.

use crate::bus::Bus;

fn r8_name(code: u8) -> &'static str {
    match code & 0x07 {
        0 => "B",
        1 => "C",
        2 => "D",
        3 => "E",
        4 => "H",
        5 => "L",
        6 => "(HL)",
        _ => "A",
    }
}

fn cond_name(opcode: u8) -> &'static str {
    match opcode {
        0x20 | 0xC0 | 0xC2 | 0xC4 => "NZ",
        0x28 | 0xC8 | 0xCA | 0xCC => "Z",
        0x30 | 0xD0 | 0xD2 | 0xD4 => "NC",
        0x38 | 0xD8 | 0xDA | 0xDC => "C",
        _ => "",
    }
}

fn is_illegal_opcode(opcode: u8) -> bool {
    matches!(
        opcode,
        0xD3 | 0xDB | 0xDD | 0xE3 | 0xE4 | 0xEB | 0xEC | 0xED | 0xF4 | 0xFC | 0xFD
    )
}

fn disassemble_cb(bus: &mut Bus, pc: u16) -> (String, u16) {
    let cb = bus.read8(pc.wrapping_add(1));
    let r = r8_name(cb);
    let bit = (cb >> 3) & 0x07;

    let text = match cb {
        0x00..=0x07 => format!("RLC {r}"),
        0x08..=0x0F => format!("RRC {r}"),
        0x10..=0x17 => format!("RL {r}"),
        0x18..=0x1F => format!("RR {r}"),
        0x20..=0x27 => format!("SLA {r}"),
        0x28..=0x2F => format!("SRA {r}"),
        0x30..=0x37 => format!("SWAP {r}"),
        0x38..=0x3F => format!("SRL {r}"),
        0x40..=0x7F => format!("BIT {bit},{r}"),
        0x80..=0xBF => format!("RES {bit},{r}"),
        _ => format!("SET {bit},{r}"),
    };
    (text, pc.wrapping_add(2))
}

/// Disassembles the instruction at `pc`, returning its mnemonic and the
/// address of the instruction immediately following it.
pub fn disassemble_one(bus: &mut Bus, pc: u16) -> (String, u16) {
    let opcode = bus.read8(pc);

    if opcode == 0xCB {
        return disassemble_cb(bus, pc);
    }

    if is_illegal_opcode(opcode) {
        return (format!("DB ${opcode:02X} ; illegal"), pc.wrapping_add(1));
    }

    let d8 = || bus.read8(pc.wrapping_add(1));
    let a16 = |bus: &mut Bus| {
        let lo = bus.read8(pc.wrapping_add(1));
        let hi = bus.read8(pc.wrapping_add(2));
        u16::from_le_bytes([lo, hi])
    };

    let (text, len): (String, u16) = match opcode {
        0x00 => ("NOP".into(), 1),
        0x10 => ("STOP".into(), 2),
        0x76 => ("HALT".into(), 1),
        0xF3 => ("DI".into(), 1),
        0xFB => ("EI".into(), 1),
        0x07 => ("RLCA".into(), 1),
        0x0F => ("RRCA".into(), 1),
        0x17 => ("RLA".into(), 1),
        0x1F => ("RRA".into(), 1),
        0x27 => ("DAA".into(), 1),
        0x2F => ("CPL".into(), 1),
        0x37 => ("SCF".into(), 1),
        0x3F => ("CCF".into(), 1),
        0xC9 => ("RET".into(), 1),
        0xD9 => ("RETI".into(), 1),
        0xE9 => ("JP (HL)".into(), 1),
        0xF9 => ("LD SP,HL".into(), 1),

        0x01 => (format!("LD BC,${:04X}", a16(bus)), 3),
        0x11 => (format!("LD DE,${:04X}", a16(bus)), 3),
        0x21 => (format!("LD HL,${:04X}", a16(bus)), 3),
        0x31 => (format!("LD SP,${:04X}", a16(bus)), 3),
        0x08 => (format!("LD (${:04X}),SP", a16(bus)), 3),

        0x02 => ("LD (BC),A".into(), 1),
        0x0A => ("LD A,(BC)".into(), 1),
        0x12 => ("LD (DE),A".into(), 1),
        0x1A => ("LD A,(DE)".into(), 1),
        0x22 => ("LD (HL+),A".into(), 1),
        0x2A => ("LD A,(HL+)".into(), 1),
        0x32 => ("LD (HL-),A".into(), 1),
        0x3A => ("LD A,(HL-)".into(), 1),

        0xEA => (format!("LD (${:04X}),A", a16(bus)), 3),
        0xFA => (format!("LD A,(${:04X})", a16(bus)), 3),
        0xE0 => (format!("LDH ($FF{:02X}),A", d8()), 2),
        0xF0 => (format!("LDH A,($FF{:02X})", d8()), 2),
        0xE2 => ("LD (C),A".into(), 1),
        0xF2 => ("LD A,(C)".into(), 1),

        0x06 | 0x0E | 0x16 | 0x1E | 0x26 | 0x2E | 0x36 | 0x3E => {
            let r = r8_name((opcode >> 3) & 0x07);
            (format!("LD {r},${:02X}", d8()), 2)
        }

        0x40..=0x7F => {
            let dst = r8_name((opcode >> 3) & 0x07);
            let src = r8_name(opcode & 0x07);
            (format!("LD {dst},{src}"), 1)
        }

        0x04 | 0x0C | 0x14 | 0x1C | 0x24 | 0x2C | 0x34 | 0x3C => {
            (format!("INC {}", r8_name((opcode >> 3) & 0x07)), 1)
        }
        0x05 | 0x0D | 0x15 | 0x1D | 0x25 | 0x2D | 0x35 | 0x3D => {
            (format!("DEC {}", r8_name((opcode >> 3) & 0x07)), 1)
        }

        0x03 => ("INC BC".into(), 1),
        0x13 => ("INC DE".into(), 1),
        0x23 => ("INC HL".into(), 1),
        0x33 => ("INC SP".into(), 1),
        0x0B => ("DEC BC".into(), 1),
        0x1B => ("DEC DE".into(), 1),
        0x2B => ("DEC HL".into(), 1),
        0x3B => ("DEC SP".into(), 1),

        0x09 => ("ADD HL,BC".into(), 1),
        0x19 => ("ADD HL,DE".into(), 1),
        0x29 => ("ADD HL,HL".into(), 1),
        0x39 => ("ADD HL,SP".into(), 1),

        0x80..=0xBF => {
            let r = r8_name(opcode & 0x07);
            let mnemonic = match (opcode >> 3) & 0x07 {
                0 => "ADD A,",
                1 => "ADC A,",
                2 => "SUB ",
                3 => "SBC A,",
                4 => "AND ",
                5 => "XOR ",
                6 => "OR ",
                _ => "CP ",
            };
            (format!("{mnemonic}{r}"), 1)
        }

        0xC6 => (format!("ADD A,${:02X}", d8()), 2),
        0xCE => (format!("ADC A,${:02X}", d8()), 2),
        0xD6 => (format!("SUB ${:02X}", d8()), 2),
        0xDE => (format!("SBC A,${:02X}", d8()), 2),
        0xE6 => (format!("AND ${:02X}", d8()), 2),
        0xEE => (format!("XOR ${:02X}", d8()), 2),
        0xF6 => (format!("OR ${:02X}", d8()), 2),
        0xFE => (format!("CP ${:02X}", d8()), 2),

        0x18 => {
            let off = d8() as i8;
            (format!("JR {off}"), 2)
        }
        0x20 | 0x28 | 0x30 | 0x38 => {
            let off = d8() as i8;
            (format!("JR {},{off}", cond_name(opcode)), 2)
        }

        0xC3 => (format!("JP ${:04X}", a16(bus)), 3),
        0xC2 | 0xCA | 0xD2 | 0xDA => (format!("JP {},${:04X}", cond_name(opcode), a16(bus)), 3),

        0xCD => (format!("CALL ${:04X}", a16(bus)), 3),
        0xC4 | 0xCC | 0xD4 | 0xDC => {
            (format!("CALL {},${:04X}", cond_name(opcode), a16(bus)), 3)
        }

        0xC0 | 0xC8 | 0xD0 | 0xD8 => (format!("RET {}", cond_name(opcode)), 1),

        0xC7 | 0xCF | 0xD7 | 0xDF | 0xE7 | 0xEF | 0xF7 | 0xFF => {
            (format!("RST ${:02X}", opcode & 0x38), 1)
        }

        0xC5 => ("PUSH BC".into(), 1),
        0xD5 => ("PUSH DE".into(), 1),
        0xE5 => ("PUSH HL".into(), 1),
        0xF5 => ("PUSH AF".into(), 1),
        0xC1 => ("POP BC".into(), 1),
        0xD1 => ("POP DE".into(), 1),
        0xE1 => ("POP HL".into(), 1),
        0xF1 => ("POP AF".into(), 1),

        0xE8 => (format!("ADD SP,{}", d8() as i8), 2),
        0xF8 => (format!("LD HL,SP+{}", d8() as i8), 2),

        _ => (format!("DB ${opcode:02X} ; illegal"), 1),
    };

    (text, pc.wrapping_add(len))
}
