use thiserror::Error;

/// Errors the CPU can return from a single `step()`.
#[derive(Debug, Error, Clone, Copy, Eq, PartialEq)]
pub enum CpuError {
    #[error("illegal opcode {0:#04x} at PC={1:#06x}")]
    IllegalOpcode(u8, u16),
}

/// Errors that can occur constructing an `Engine` or loading a cartridge.
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("failed to read ROM file {path}: {source}")]
    RomRead {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to read boot ROM file {path}: {source}")]
    BootRomRead {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("boot ROM must be exactly 256 bytes, got {0}")]
    BootRomWrongSize(usize),
    #[error("ROM is too small to contain a header ({0} bytes)")]
    RomTooSmall(usize),
    #[error("unsupported cartridge type byte {0:#04x}")]
    UnsupportedMbc(u8),
    #[error("failed to access save file {path}: {source}")]
    SaveIo {
        path: String,
        #[source]
        source: std::io::Error,
    },
}
