//! Top-level façade that owns a CPU and a bus as sibling fields (no cyclic
//! ownership between them — the caller mediates every interaction via
//! `Cpu::step(&mut Bus)`).

use std::path::Path;

use crate::bus::Bus;
use crate::cartridge::Cartridge;
use crate::cpu::Cpu;
use crate::error::{CpuError, EngineError};
use crate::input::Button;
use crate::ppu::Framebuffer;

pub struct Engine {
    cpu: Cpu,
    bus: Bus,
}

impl Engine {
    /// Loads `rom_path` and an optional boot ROM (exactly 256 bytes).
    /// Without a boot ROM, registers are pre-set to the documented DMG
    /// post-boot handoff state and execution starts at 0x0100.
    pub fn new(rom_path: &Path, boot_rom_path: Option<&Path>) -> Result<Self, EngineError> {
        let cart = Cartridge::load(rom_path)?;

        let boot_rom = match boot_rom_path {
            Some(path) => {
                let bytes = std::fs::read(path).map_err(|source| EngineError::BootRomRead {
                    path: path.display().to_string(),
                    source,
                })?;
                if bytes.len() != 0x100 {
                    return Err(EngineError::BootRomWrongSize(bytes.len()));
                }
                let mut buf = [0u8; 0x100];
                buf.copy_from_slice(&bytes);
                buf
            }
            None => [0u8; 0x100],
        };

        let mut bus = Bus::new(cart, boot_rom);
        let mut cpu = Cpu::new();

        if boot_rom_path.is_none() {
            init_post_boot_state(&mut cpu, &mut bus);
        }

        Ok(Self { cpu, bus })
    }

    /// Executes one CPU instruction and ticks the rest of the hardware by
    /// its cycle cost, exactly once.
    pub fn step(&mut self) -> Result<u32, CpuError> {
        let cycles = self.cpu.step(&mut self.bus)?;
        self.bus.tick(cycles);
        Ok(cycles)
    }

    /// Runs until a full frame (one VBlank) has been produced.
    pub fn step_frame(&mut self) -> Result<(), CpuError> {
        while !self.bus.ppu.frame_ready() {
            self.step()?;
        }
        self.bus.ppu.clear_frame_ready();
        Ok(())
    }

    pub fn frame(&self) -> &Framebuffer {
        &self.bus.ppu.framebuffer
    }

    pub fn set_button(&mut self, button: Button, pressed: bool) {
        self.bus.set_button(button, pressed);
    }

    pub fn title(&self) -> &str {
        self.bus.cart.title()
    }

    /// Bytes shifted out over the serial port since the last call.
    pub fn take_serial_output(&mut self) -> Vec<u8> {
        self.bus.serial.take_output()
    }

    pub fn cpu(&self) -> &Cpu {
        &self.cpu
    }

    pub fn bus(&self) -> &Bus {
        &self.bus
    }

    pub fn bus_mut(&mut self) -> &mut Bus {
        &mut self.bus
    }
}

fn init_post_boot_state(cpu: &mut Cpu, bus: &mut Bus) {
    cpu.a = 0x01;
    cpu.f = 0xB0;
    cpu.b = 0x00;
    cpu.c = 0x13;
    cpu.d = 0x00;
    cpu.e = 0xD8;
    cpu.h = 0x01;
    cpu.l = 0x4D;
    cpu.sp = 0xFFFE;
    cpu.pc = 0x0100;

    bus.ie = 0x00;
    bus.iflag = 0x00;
    bus.write8(0xFF50, 0x01); // boot ROM disabled
    bus.write8(0xFF40, 0x91); // LCDC on, BG/window/sprites on
    bus.write8(0xFF47, 0xFC); // BGP
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use std::io::Write;

    fn write_test_rom(path: &std::path::Path) {
        let mut rom = vec![0u8; 0x8000];
        rom[0x0147] = 0x00;
        let cks = crate::cartridge::header::Header::compute_checksum(&rom);
        rom[0x014D] = cks;
        let mut f = fs::File::create(path).unwrap();
        f.write_all(&rom).unwrap();
    }

    #[test]
    fn new_without_boot_rom_starts_at_0100_with_documented_registers() {
        let dir = std::env::temp_dir();
        let path = dir.join("gb_core_engine_test_no_boot.gb");
        write_test_rom(&path);
        let engine = Engine::new(&path, None).unwrap();
        assert_eq!(engine.cpu().pc, 0x0100);
        assert_eq!(engine.cpu().sp, 0xFFFE);
        fs::remove_file(&path).ok();
    }

    #[test]
    fn new_rejects_wrong_sized_boot_rom() {
        let dir = std::env::temp_dir();
        let rom_path = dir.join("gb_core_engine_test_badboot.gb");
        write_test_rom(&rom_path);
        let boot_path = dir.join("gb_core_engine_test_badboot.bin");
        fs::write(&boot_path, vec![0u8; 10]).unwrap();

        let result = Engine::new(&rom_path, Some(&boot_path));
        assert!(matches!(result, Err(EngineError::BootRomWrongSize(10))));

        fs::remove_file(&rom_path).ok();
        fs::remove_file(&boot_path).ok();
    }

    #[test]
    fn step_frame_produces_a_fresh_framebuffer_each_call() {
        let dir = std::env::temp_dir();
        let path = dir.join("gb_core_engine_test_frame.gb");
        write_test_rom(&path);
        let mut engine = Engine::new(&path, None).unwrap();
        engine.step_frame().unwrap();
        assert_eq!(engine.frame().len(), crate::ppu::FRAMEBUFFER_LEN);
        fs::remove_file(&path).ok();
    }
}
