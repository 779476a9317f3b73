//! ST7789 panel: 320×170 over SPI with DMA, landscape.

use embedded_graphics::geometry::Size;
use embedded_hal_bus::spi::ExclusiveDevice;
use esp_hal::{
    Async,
    delay::Delay,
    dma::{
        DmaRxBuf,
        DmaTxBuf,
    },
    dma_buffers,
    gpio::{
        Level,
        Output,
        OutputConfig,
    },
    spi::master::{
        Config,
        Spi,
        SpiDmaBus,
    },
    time::Rate,
};
use mipidsi::{
    Builder,
    models::ST7789,
    options::{
        ColorInversion,
        Orientation,
        Rotation,
    },
};

use crate::DisplayResources;

/// Visible area after rotation.
pub const SCREEN_SIZE: Size = Size::new(320, 170);

const DMA_BUFFER_SIZE: usize = 32000;
const PIXEL_BUFFER_SIZE: usize = 32000;

type SpiInterface<'a> = mipidsi::interface::SpiInterface<
    'a,
    ExclusiveDevice<SpiDmaBus<'a, Async>, Output<'a>, Delay>,
    Output<'a>,
>;

/// The badge display, an `embedded-graphics` draw target in `Rgb565`.
pub type Display<'a> = mipidsi::Display<SpiInterface<'a>, ST7789, Output<'a>>;

impl<'a> From<DisplayResources<'a>> for Display<'a> {
    fn from(res: DisplayResources<'a>) -> Self {
        let (rx_buffer, rx_descriptors, tx_buffer, tx_descriptors) = dma_buffers!(DMA_BUFFER_SIZE);
        let dma_rx_buf = DmaRxBuf::new(rx_descriptors, rx_buffer).unwrap();
        let dma_tx_buf = DmaTxBuf::new(tx_descriptors, tx_buffer).unwrap();

        let mut delay = Delay::new();

        let dc = Output::new(res.dc, Level::Low, OutputConfig::default());
        let mut rst = Output::new(res.rst, Level::Low, OutputConfig::default());
        rst.set_high();

        let spi = Spi::new(res.spi, Config::default().with_frequency(Rate::from_mhz(80)))
            .unwrap()
            .with_sck(res.sck)
            .with_mosi(res.mosi)
            .with_miso(res.miso)
            .with_dma(res.dma)
            .with_buffers(dma_rx_buf, dma_tx_buf)
            .into_async();

        let cs = Output::new(res.cs, Level::High, OutputConfig::default());
        let spi_device = ExclusiveDevice::new(spi, cs, delay).unwrap();

        let buffer = crate::mk_static!([u8; PIXEL_BUFFER_SIZE], [0_u8; PIXEL_BUFFER_SIZE]);
        let di = mipidsi::interface::SpiInterface::new(spi_device, dc, buffer);

        Builder::new(ST7789, di)
            .reset_pin(rst)
            .display_size(SCREEN_SIZE.height as u16, SCREEN_SIZE.width as u16)
            .invert_colors(ColorInversion::Inverted)
            .orientation(Orientation::new().rotate(Rotation::Deg90))
            .display_offset(35, 0)
            .init(&mut delay)
            .unwrap()
    }
}
