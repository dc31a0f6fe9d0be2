use gb_core::Engine;
use std::fs;
use std::io::Write;

/// Builds a ROM that writes "Passed\n" one byte at a time over serial
/// (LD A,byte; LD (SB),A; LD A,0x81; LD (SC),A) and then loops forever.
fn make_serial_output_rom() -> Vec<u8> {
    let mut rom = vec![0u8; 0x8000];

    let start = 0x0150usize;
    rom[0x0100] = 0xC3; // JP a16
    rom[0x0101] = (start & 0xFF) as u8;
    rom[0x0102] = (start >> 8) as u8;

    let mut pc = start;
    for &b in b"Passed\n" {
        rom[pc] = 0x3E; // LD A,d8
        rom[pc + 1] = b;
        pc += 2;
        rom[pc] = 0xEA; // LD (a16),A -> SB
        rom[pc + 1] = 0x01;
        rom[pc + 2] = 0xFF;
        pc += 3;
        rom[pc] = 0x3E; // LD A,0x81
        rom[pc + 1] = 0x81;
        pc += 2;
        rom[pc] = 0xEA; // LD (a16),A -> SC
        rom[pc + 1] = 0x02;
        rom[pc + 2] = 0xFF;
        pc += 3;
    }
    rom[pc] = 0x18; // JR -2 (infinite loop)
    rom[pc + 1] = 0xFE;

    rom[0x0147] = 0x00;
    let mut cks: u8 = 0;
    for &b in &rom[0x0134..=0x014C] {
        cks = cks.wrapping_sub(b).wrapping_sub(1);
    }
    rom[0x014D] = cks;
    rom
}

/// Scenario 2, in spirit: an end-to-end program drives the serial port
/// across many frames and the engine's `take_serial_output` surfaces the
/// transmitted bytes in order, without needing a second Game Boy.
#[test]
fn engine_surfaces_serial_output_from_a_running_program() {
    let dir = std::env::temp_dir();
    let rom_path = dir.join("gb_core_it_serial_program.gb");
    fs::write(&rom_path, make_serial_output_rom()).unwrap();

    let mut engine = Engine::new(&rom_path, None).unwrap();

    let mut collected = Vec::new();
    for _ in 0..60 {
        engine.step_frame().unwrap();
        collected.extend(engine.take_serial_output());
        if collected.len() >= b"Passed\n".len() {
            break;
        }
    }

    assert_eq!(collected, b"Passed\n");

    fs::remove_file(&rom_path).ok();
}
