pub const LCD_WIDTH: usize = 160;
pub const LCD_HEIGHT: usize = 144;
pub const FRAMEBUFFER_LEN: usize = LCD_WIDTH * LCD_HEIGHT;

/// Raw 2-bit, palette-applied shade indices (0-3). RGB conversion is the
/// host's responsibility.
pub type Framebuffer = [u8; FRAMEBUFFER_LEN];

pub mod ppu;
pub mod render;

pub use ppu::Ppu;
