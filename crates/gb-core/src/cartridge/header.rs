use crate::error::EngineError;

/// The three byte ranges the core actually consults; ROM/RAM size bytes and
/// the CGB-support byte are not read — ROM bank count is derived from the
/// file's actual length and external RAM is fixed at 32 KiB.
pub struct Header {
    pub title: String,
    pub cartridge_type: u8,
    pub checksum: u8,
}

#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum MbcKind {
    NoMbc,
    Mbc1,
    Mbc3,
}

impl MbcKind {
    pub fn from_cartridge_type(byte: u8) -> Result<(Self, bool, bool), EngineError> {
        // Returns (kind, has_ram, has_battery).
        match byte {
            0x00 => Ok((Self::NoMbc, false, false)),
            0x01 => Ok((Self::Mbc1, false, false)),
            0x02 => Ok((Self::Mbc1, true, false)),
            0x03 => Ok((Self::Mbc1, true, true)),
            0x0F => Ok((Self::Mbc3, false, true)),
            0x10 => Ok((Self::Mbc3, true, true)),
            0x11 => Ok((Self::Mbc3, false, false)),
            0x12 => Ok((Self::Mbc3, true, false)),
            0x13 => Ok((Self::Mbc3, true, true)),
            _ => Err(EngineError::UnsupportedMbc(byte)),
        }
    }
}

impl Header {
    pub fn parse(rom: &[u8]) -> Result<Self, EngineError> {
        if rom.len() < 0x0150 {
            return Err(EngineError::RomTooSmall(rom.len()));
        }

        let title_bytes = &rom[0x0134..0x0144];
        let title = title_bytes
            .iter()
            .take_while(|&&b| b != 0)
            .map(|&b| b as char)
            .collect();

        let cartridge_type = rom[0x0147];
        let checksum = rom[0x014D];

        let computed = Self::compute_checksum(rom);
        if computed != checksum {
            log::warn!(
                "cartridge header checksum mismatch: stored {checksum:#04x}, computed {computed:#04x}"
            );
        }

        Ok(Header {
            title,
            cartridge_type,
            checksum,
        })
    }

    pub fn compute_checksum(rom: &[u8]) -> u8 {
        let mut cks: u8 = 0;
        for &byte in &rom[0x0134..=0x014C] {
            cks = cks.wrapping_sub(byte).wrapping_sub(1);
        }
        cks
    }

    pub fn checksum_nonzero(&self) -> bool {
        self.checksum != 0
    }
}
