//! SSD1306 OLED display wrapper.

use defmt::warn;
use embedded_graphics::mono_font::ascii::FONT_6X10;
use embedded_graphics::mono_font::{MonoTextStyle, MonoTextStyleBuilder};
use embedded_graphics::pixelcolor::BinaryColor;
use embedded_graphics::prelude::*;
use embedded_graphics::text::{Baseline, Text};
use mothership::ui::Display;
use ssd1306::mode::BufferedGraphicsMode;
use ssd1306::prelude::*;
use ssd1306::I2CDisplayInterface;
use ssd1306::Ssd1306;

/// Concrete 128x32 driver in buffered graphics mode.
type Driver<I2C> =
    Ssd1306<I2CInterface<I2C>, DisplaySize128x32, BufferedGraphicsMode<DisplaySize128x32>>;

pub struct Oled<I2C> {
    driver: Driver<I2C>,
}

impl<I2C> Oled<I2C>
where
    I2C: embedded_hal::i2c::I2c,
{
    /// Initialise the SSD1306 and blank the screen.
    pub fn new(i2c: I2C) -> Self {
        let interface = I2CDisplayInterface::new(i2c);
        let mut driver = Ssd1306::new(interface, DisplaySize128x32, DisplayRotation::Rotate0)
            .into_buffered_graphics_mode();
        if driver.init().is_err() {
            warn!("Display: init failed");
        }
        driver.clear_buffer();
        let _ = driver.flush();
        Self { driver }
    }
}

fn text_style() -> MonoTextStyle<'static, BinaryColor> {
    MonoTextStyleBuilder::new()
        .font(&FONT_6X10)
        .text_color(BinaryColor::On)
        .build()
}

impl<I2C> Display for Oled<I2C>
where
    I2C: embedded_hal::i2c::I2c,
{
    fn clear(&mut self) {
        self.driver.clear_buffer();
    }

    fn draw_text(&mut self, text: &str, y: i32) {
        let _ = Text::with_baseline(text, Point::new(0, y), text_style(), Baseline::Top)
            .draw(&mut self.driver);
    }

    fn present(&mut self) {
        if self.driver.flush().is_err() {
            warn!("Display: flush failed");
        }
    }
}
