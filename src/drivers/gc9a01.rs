use embedded_graphics::{
    pixelcolor::{raw::RawU16, Rgb565},
    prelude::{Dimensions, DrawTarget, OriginDimensions, Pixel, RawData, Size},
    primitives::Rectangle,
};
use embedded_hal::{delay::DelayNs, digital::OutputPin, spi::SpiBus};

pub const PANEL_WIDTH: u16 = 240;
pub const PANEL_HEIGHT: u16 = 240;

const CMD_SWRESET: u8 = 0x01;
const CMD_SLPOUT: u8 = 0x11;
const CMD_INVON: u8 = 0x21;
const CMD_DISPON: u8 = 0x29;
const CMD_CASET: u8 = 0x2A;
const CMD_RASET: u8 = 0x2B;
const CMD_RAMWR: u8 = 0x2C;
const CMD_MADCTL: u8 = 0x36;
const CMD_COLMOD: u8 = 0x3A;
const MADCTL_BGR: u8 = 0x08;
const COLMOD_16BIT: u8 = 0x05;
const FILL_CHUNK_PIXELS: usize = 64;

/// Vendor power/gamma sequence; each entry is a command followed by its parameters.
const INIT_SEQUENCE: &[(u8, &[u8])] = &[
    (0xEF, &[]),
    (0xEB, &[0x14]),
    (0xFE, &[]),
    (0xEF, &[]),
    (0xEB, &[0x14]),
    (0x84, &[0x40]),
    (0x85, &[0xFF]),
    (0x86, &[0xFF]),
    (0x87, &[0xFF]),
    (0x88, &[0x0A]),
    (0x89, &[0x21]),
    (0x8A, &[0x00]),
    (0x8B, &[0x80]),
    (0x8C, &[0x01]),
    (0x8D, &[0x01]),
    (0x8E, &[0xFF]),
    (0x8F, &[0xFF]),
    (0xB6, &[0x00, 0x20]),
    (CMD_MADCTL, &[MADCTL_BGR]),
    (CMD_COLMOD, &[COLMOD_16BIT]),
    (0x90, &[0x08, 0x08, 0x08, 0x08]),
    (0xBD, &[0x06]),
    (0xBC, &[0x00]),
    (0xFF, &[0x60, 0x01, 0x04]),
    (0xC3, &[0x13]),
    (0xC4, &[0x13]),
    (0xC9, &[0x22]),
    (0xBE, &[0x11]),
    (0xE1, &[0x10, 0x0E]),
    (0xDF, &[0x21, 0x0C, 0x02]),
    (0xF0, &[0x45, 0x09, 0x08, 0x08, 0x26, 0x2A]),
    (0xF1, &[0x43, 0x70, 0x72, 0x36, 0x37, 0x6F]),
    (0xF2, &[0x45, 0x09, 0x08, 0x08, 0x26, 0x2A]),
    (0xF3, &[0x43, 0x70, 0x72, 0x36, 0x37, 0x6F]),
    (0xED, &[0x1B, 0x0B]),
    (0xAE, &[0x77]),
    (0xCD, &[0x63]),
    (
        0x70,
        &[0x07, 0x07, 0x04, 0x0E, 0x0F, 0x09, 0x07, 0x08, 0x03],
    ),
    (0xE8, &[0x34]),
    (
        0x62,
        &[
            0x18, 0x0D, 0x71, 0xED, 0x70, 0x70, 0x18, 0x0F, 0x71, 0xEF, 0x70, 0x70,
        ],
    ),
    (
        0x63,
        &[
            0x18, 0x11, 0x71, 0xF1, 0x70, 0x70, 0x18, 0x13, 0x71, 0xF3, 0x70, 0x70,
        ],
    ),
    (0x64, &[0x28, 0x29, 0xF1, 0x01, 0xF1, 0x00, 0x07]),
    (
        0x66,
        &[0x3C, 0x00, 0xCD, 0x67, 0x45, 0x45, 0x10, 0x00, 0x00, 0x00],
    ),
    (
        0x67,
        &[0x00, 0x3C, 0x00, 0x00, 0x00, 0x01, 0x54, 0x10, 0x32, 0x98],
    ),
    (0x74, &[0x10, 0x85, 0x80, 0x00, 0x00, 0x4E, 0x00]),
    (0x98, &[0x3E, 0x07]),
    (0x35, &[]),
    (CMD_INVON, &[]),
];

#[derive(Debug)]
pub enum PanelError<SpiE, PinE> {
    Spi(SpiE),
    Pin(PinE),
}

/// GC9A01 round panel on a 4-wire SPI bus.
pub struct Gc9a01<SPI, DC, CS, RST> {
    spi: SPI,
    dc: DC,
    cs: CS,
    rst: RST,
}

type PanelResult<SPI, DC> = Result<
    (),
    PanelError<<SPI as embedded_hal::spi::ErrorType>::Error, <DC as embedded_hal::digital::ErrorType>::Error>,
>;

impl<SPI, DC, CS, RST> Gc9a01<SPI, DC, CS, RST>
where
    SPI: SpiBus<u8>,
    DC: OutputPin,
    CS: OutputPin<Error = DC::Error>,
    RST: OutputPin<Error = DC::Error>,
{
    pub fn new(spi: SPI, dc: DC, cs: CS, rst: RST) -> Self {
        Self { spi, dc, cs, rst }
    }

    pub fn init(&mut self, delay: &mut impl DelayNs) -> PanelResult<SPI, DC> {
        self.cs.set_high().map_err(PanelError::Pin)?;
        self.rst.set_high().map_err(PanelError::Pin)?;
        delay.delay_ms(5);
        self.rst.set_low().map_err(PanelError::Pin)?;
        delay.delay_ms(10);
        self.rst.set_high().map_err(PanelError::Pin)?;
        delay.delay_ms(120);

        self.command(CMD_SWRESET, &[])?;
        delay.delay_ms(120);
        for (cmd, params) in INIT_SEQUENCE {
            self.command(*cmd, params)?;
        }
        self.command(CMD_SLPOUT, &[])?;
        delay.delay_ms(120);
        self.command(CMD_DISPON, &[])?;
        delay.delay_ms(20);
        Ok(())
    }

    pub fn fill_rect(&mut self, area: &Rectangle, color: Rgb565) -> PanelResult<SPI, DC> {
        let area = area.intersection(&self.bounding_box());
        let Some(bottom_right) = area.bottom_right() else {
            return Ok(());
        };
        self.set_window(
            area.top_left.x as u16,
            area.top_left.y as u16,
            bottom_right.x as u16,
            bottom_right.y as u16,
        )?;

        let raw = color_bytes(color);
        let mut chunk = [0u8; FILL_CHUNK_PIXELS * 2];
        for pair in chunk.chunks_exact_mut(2) {
            pair.copy_from_slice(&raw);
        }

        let mut remaining = area.size.width as usize * area.size.height as usize;
        self.begin_data()?;
        while remaining > 0 {
            let pixels = remaining.min(FILL_CHUNK_PIXELS);
            self.spi
                .write(&chunk[..pixels * 2])
                .map_err(PanelError::Spi)?;
            remaining -= pixels;
        }
        self.end()
    }

    fn set_window(&mut self, x0: u16, y0: u16, x1: u16, y1: u16) -> PanelResult<SPI, DC> {
        let [x0h, x0l] = x0.to_be_bytes();
        let [x1h, x1l] = x1.to_be_bytes();
        let [y0h, y0l] = y0.to_be_bytes();
        let [y1h, y1l] = y1.to_be_bytes();
        self.command(CMD_CASET, &[x0h, x0l, x1h, x1l])?;
        self.command(CMD_RASET, &[y0h, y0l, y1h, y1l])?;
        self.command(CMD_RAMWR, &[])
    }

    fn command(&mut self, cmd: u8, params: &[u8]) -> PanelResult<SPI, DC> {
        self.cs.set_low().map_err(PanelError::Pin)?;
        self.dc.set_low().map_err(PanelError::Pin)?;
        self.spi.write(&[cmd]).map_err(PanelError::Spi)?;
        if !params.is_empty() {
            self.dc.set_high().map_err(PanelError::Pin)?;
            self.spi.write(params).map_err(PanelError::Spi)?;
        }
        self.end()
    }

    fn begin_data(&mut self) -> PanelResult<SPI, DC> {
        self.cs.set_low().map_err(PanelError::Pin)?;
        self.dc.set_high().map_err(PanelError::Pin)
    }

    fn end(&mut self) -> PanelResult<SPI, DC> {
        self.spi.flush().map_err(PanelError::Spi)?;
        self.cs.set_high().map_err(PanelError::Pin)
    }
}

impl<SPI, DC, CS, RST> OriginDimensions for Gc9a01<SPI, DC, CS, RST> {
    fn size(&self) -> Size {
        Size::new(u32::from(PANEL_WIDTH), u32::from(PANEL_HEIGHT))
    }
}

impl<SPI, DC, CS, RST> DrawTarget for Gc9a01<SPI, DC, CS, RST>
where
    SPI: SpiBus<u8>,
    DC: OutputPin,
    CS: OutputPin<Error = DC::Error>,
    RST: OutputPin<Error = DC::Error>,
{
    type Color = Rgb565;
    type Error = PanelError<SPI::Error, DC::Error>;

    fn draw_iter<It>(&mut self, pixels: It) -> Result<(), Self::Error>
    where
        It: IntoIterator<Item = Pixel<Self::Color>>,
    {
        for Pixel(point, color) in pixels {
            if point.x < 0
                || point.y < 0
                || point.x >= i32::from(PANEL_WIDTH)
                || point.y >= i32::from(PANEL_HEIGHT)
            {
                continue;
            }
            let (x, y) = (point.x as u16, point.y as u16);
            self.set_window(x, y, x, y)?;
            self.begin_data()?;
            self.spi
                .write(&color_bytes(color))
                .map_err(PanelError::Spi)?;
            self.end()?;
        }
        Ok(())
    }

    fn fill_solid(&mut self, area: &Rectangle, color: Self::Color) -> Result<(), Self::Error> {
        self.fill_rect(area, color)
    }

    fn clear(&mut self, color: Self::Color) -> Result<(), Self::Error> {
        self.fill_rect(&self.bounding_box(), color)
    }
}

fn color_bytes(color: Rgb565) -> [u8; 2] {
    RawU16::from(color).into_inner().to_be_bytes()
}
