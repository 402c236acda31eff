//! SSD1306 128×32 status display adapter.
//!
//! Buffered graphics mode: each update clears the frame buffer, draws up to
//! three lines of 6×10 text and flushes the whole frame over I2C.

use embedded_graphics::mono_font::MonoTextStyle;
use embedded_graphics::mono_font::ascii::FONT_6X10;
use embedded_graphics::pixelcolor::BinaryColor;
use embedded_graphics::prelude::*;
use embedded_graphics::text::{Baseline, Text};
use embedded_hal::i2c::I2c;
use log::info;
use ssd1306::mode::BufferedGraphicsMode;
use ssd1306::prelude::*;
use ssd1306::{I2CDisplayInterface, Ssd1306};

use crate::app::ports::DisplayPort;
use crate::error::DisplayError;

/// Pixel rows per text line (10 px glyphs + 1 px gap).
const LINE_PITCH: i32 = 11;
/// Lines that fit on a 32 px tall panel.
pub const MAX_LINES: usize = 3;

type Panel<I2C> = Ssd1306<I2CInterface<I2C>, DisplaySize128x32, BufferedGraphicsMode<DisplaySize128x32>>;

pub struct OledDisplay<I2C> {
    panel: Panel<I2C>,
}

impl<I2C: I2c> OledDisplay<I2C> {
    pub fn new(i2c: I2C, addr: u8) -> Self {
        let interface = I2CDisplayInterface::new_custom_address(i2c, addr);
        let panel = Ssd1306::new(interface, DisplaySize128x32, DisplayRotation::Rotate0)
            .into_buffered_graphics_mode();
        Self { panel }
    }
}

impl<I2C: I2c> DisplayPort for OledDisplay<I2C> {
    fn init(&mut self) -> Result<(), DisplayError> {
        self.panel.init().map_err(|_| DisplayError::BusFault)?;
        DrawTarget::clear(&mut self.panel, BinaryColor::Off).map_err(|_| DisplayError::DrawFailed)?;
        self.panel.flush().map_err(|_| DisplayError::BusFault)?;
        info!("oled: initialised");
        Ok(())
    }

    fn show_lines(&mut self, lines: &[&str]) -> Result<(), DisplayError> {
        let style = MonoTextStyle::new(&FONT_6X10, BinaryColor::On);
        DrawTarget::clear(&mut self.panel, BinaryColor::Off).map_err(|_| DisplayError::DrawFailed)?;
        for (row, line) in lines.iter().take(MAX_LINES).enumerate() {
            Text::with_baseline(line, Point::new(0, row as i32 * LINE_PITCH), style, Baseline::Top)
                .draw(&mut self.panel)
                .map_err(|_| DisplayError::DrawFailed)?;
        }
        self.panel.flush().map_err(|_| DisplayError::BusFault)
    }
}
