pub mod header;
pub mod mbc;

use std::fs;
use std::path::{Path, PathBuf};

use crate::error::EngineError;
use header::{Header, MbcKind};
use mbc::Mbc;

/// Fixed external RAM size per the simplified battery/save model; real
/// cartridges vary 0-32 KiB but this core always allocates the maximum.
const EXTERNAL_RAM_LEN: usize = 0x8000;

pub struct Cartridge {
    rom: Vec<u8>,
    ram: Vec<u8>,
    mbc: Mbc,
    header: Header,
    save_path: Option<PathBuf>,
}

impl Cartridge {
    pub fn load(rom_path: &Path) -> Result<Self, EngineError> {
        let rom = fs::read(rom_path).map_err(|source| EngineError::RomRead {
            path: rom_path.display().to_string(),
            source,
        })?;

        let header = Header::parse(&rom)?;
        let (kind, has_ram, has_battery) = MbcKind::from_cartridge_type(header.cartridge_type)?;

        let mbc = match kind {
            MbcKind::NoMbc => Mbc::no_mbc(),
            MbcKind::Mbc1 => Mbc::mbc1(),
            MbcKind::Mbc3 => Mbc::mbc3(),
        };

        let ram = if has_ram { vec![0u8; EXTERNAL_RAM_LEN] } else { Vec::new() };

        let save_path = has_battery.then(|| rom_path.with_extension("sav"));

        let mut cartridge = Cartridge {
            rom,
            ram,
            mbc,
            header,
            save_path,
        };

        if let Some(path) = cartridge.save_path.clone() {
            cartridge.load_save(&path)?;
        }

        Ok(cartridge)
    }

    fn load_save(&mut self, path: &Path) -> Result<(), EngineError> {
        match fs::read(path) {
            Ok(bytes) => {
                let len = bytes.len().min(self.ram.len());
                self.ram[..len].copy_from_slice(&bytes[..len]);
                Ok(())
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                fs::write(path, vec![0u8; EXTERNAL_RAM_LEN]).map_err(|source| {
                    EngineError::SaveIo {
                        path: path.display().to_string(),
                        source,
                    }
                })
            }
            Err(source) => Err(EngineError::SaveIo {
                path: path.display().to_string(),
                source,
            }),
        }
    }

    /// Flushes external RAM to the `.sav` path, if this cartridge has a battery.
    pub fn flush_save(&self) {
        if let Some(path) = &self.save_path {
            if let Err(e) = fs::write(path, &self.ram) {
                log::warn!("failed to write save file {}: {e}", path.display());
            }
        }
    }

    pub fn title(&self) -> &str {
        &self.header.title
    }

    pub fn checksum_nonzero(&self) -> bool {
        self.header.checksum_nonzero()
    }

    #[inline]
    pub fn read_rom(&self, addr: u16) -> u8 {
        self.mbc.read_rom(&self.rom, addr)
    }

    #[inline]
    pub fn write_rom(&mut self, addr: u16, val: u8) {
        self.mbc.write_rom(addr, val);
    }

    #[inline]
    pub fn read_ram(&self, addr: u16) -> u8 {
        self.mbc.read_ram(&self.ram, addr)
    }

    #[inline]
    pub fn write_ram(&mut self, addr: u16, val: u8) {
        self.mbc.write_ram(&mut self.ram, addr, val);
    }
}

impl Drop for Cartridge {
    fn drop(&mut self) {
        self.flush_save();
    }
}
