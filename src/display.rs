//! Drawing backends for the face.
//
// - `GraphicsCanvas` turns face draw commands into embedded-graphics primitives,
//   so the face can render on any `DrawTarget<Color = Rgb565>`.
// - With the `firmware` feature, `setup_display` brings up the GC9A01 (240x240)
//   panel through mipidsi.

use embedded_graphics::{
    pixelcolor::Rgb565,
    prelude::{DrawTarget, Point, Primitive},
    primitives::{Circle, Line, PrimitiveStyle, Rectangle},
    Drawable,
};

use crate::host::Canvas;

pub struct GraphicsCanvas<'a, D> {
    target: &'a mut D,
}

impl<'a, D> GraphicsCanvas<'a, D>
where
    D: DrawTarget<Color = Rgb565>,
{
    pub fn new(target: &'a mut D) -> Self {
        Self { target }
    }
}

// embedded-graphics sizes circles by diameter; radius 0 is a single pixel.
fn diameter(radius: i32) -> u32 {
    radius.max(0) as u32 * 2 + 1
}

impl<D> Canvas for GraphicsCanvas<'_, D>
where
    D: DrawTarget<Color = Rgb565>,
{
    type Error = D::Error;

    fn fill_rect(&mut self, area: Rectangle, color: Rgb565) -> Result<(), Self::Error> {
        area.into_styled(PrimitiveStyle::with_fill(color))
            .draw(&mut *self.target)
    }

    fn draw_circle(
        &mut self,
        center: Point,
        radius: i32,
        color: Rgb565,
        stroke_width: u32,
    ) -> Result<(), Self::Error> {
        Circle::with_center(center, diameter(radius))
            .into_styled(PrimitiveStyle::with_stroke(color, stroke_width))
            .draw(&mut *self.target)
    }

    fn fill_circle(&mut self, center: Point, radius: i32, color: Rgb565) -> Result<(), Self::Error> {
        Circle::with_center(center, diameter(radius))
            .into_styled(PrimitiveStyle::with_fill(color))
            .draw(&mut *self.target)
    }

    fn draw_line(
        &mut self,
        from: Point,
        to: Point,
        color: Rgb565,
        stroke_width: u32,
    ) -> Result<(), Self::Error> {
        Line::new(from, to)
            .into_styled(PrimitiveStyle::with_stroke(color, stroke_width))
            .draw(&mut *self.target)
    }
}

// ==================================================================
// GC9A01 (240x240) backend
// ==================================================================
#[cfg(feature = "firmware")]
mod gc9a01_backend {
    use embedded_hal_bus::spi::{ExclusiveDevice, NoDelay};
    use esp_hal::{
        gpio::Output,
        spi::master::{Config as SpiConfig, Spi},
        spi::Mode,
        time::Rate,
        Blocking,
    };
    use mipidsi::interface::SpiInterface;
    use mipidsi::{
        models::GC9A01,
        options::{ColorInversion, ColorOrder, Orientation, Rotation},
        Builder as DisplayBuilder,
    };

    use crate::wiring::DisplayPins;

    pub const RESOLUTION: u32 = 240;

    // A tiny busy-wait delay that satisfies embedded-hal 1.0 DelayNs.
    struct SpinDelay;

    impl embedded_hal::delay::DelayNs for SpinDelay {
        #[inline]
        fn delay_ns(&mut self, ns: u32) {
            let mut n = ns / 50 + 1;
            while n != 0 {
                core::hint::spin_loop();
                n -= 1;
            }
        }
    }

    pub type DisplayType<'a> = mipidsi::Display<
        SpiInterface<'a, ExclusiveDevice<Spi<'a, Blocking>, Output<'a>, NoDelay>, Output<'a>>,
        GC9A01,
        Output<'a>,
    >;

    pub fn setup_display<'a>(display_pins: DisplayPins<'a>, display_buf: &'a mut [u8]) -> DisplayType<'a> {
        let DisplayPins {
            spi2,
            spi_sck,
            spi_mosi,
            lcd_cs,
            lcd_dc,
            lcd_rst,
            mut lcd_bl,
        } = display_pins;

        lcd_bl.set_high();

        // SPI @ 40 MHz, Mode 0
        let spi_cfg = SpiConfig::default()
            .with_frequency(Rate::from_hz(40_000_000))
            .with_mode(Mode::_0);

        let spi = Spi::new(spi2, spi_cfg)
            .expect("SPI config rejected")
            .with_sck(spi_sck)
            .with_mosi(spi_mosi);

        // SPI device + DisplayInterface (needs D/C and a buffer)
        let spi_dev = ExclusiveDevice::new(spi, lcd_cs, NoDelay).expect("LCD CS pin");
        let di = SpiInterface::new(spi_dev, lcd_dc, display_buf);
        let mut delay = SpinDelay;

        DisplayBuilder::new(GC9A01, di)
            .display_size(RESOLUTION as u16, RESOLUTION as u16)
            .display_offset(0, 0)
            .orientation(Orientation::new().rotate(Rotation::Deg180))
            .invert_colors(ColorInversion::Inverted)
            .color_order(ColorOrder::Bgr)
            .reset_pin(lcd_rst)
            .init(&mut delay)
            .expect("GC9A01 init failed")
    }
}

#[cfg(feature = "firmware")]
pub use gc9a01_backend::{setup_display, DisplayType, RESOLUTION};
