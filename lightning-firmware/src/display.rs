//! Pico Display panel bring-up
//!
//! ST7789 in portrait, 135x240, on SPI0 (write only), CS on GPIO17, DC on GPIO16,
//! backlight on GPIO20 driven by PWM slice 2 channel A.

use defmt::*;
use embassy_rp::gpio::{Level, Output};
use embassy_rp::peripherals::{PIN_16, PIN_17, PIN_18, PIN_19, PIN_20, PWM_SLICE2, SPI0};
use embassy_rp::pwm::{self, Pwm};
use embassy_rp::spi::{self, Blocking, Spi};
use embassy_rp::Peri;
use embassy_time::Delay;
use embedded_hal_bus::spi::{ExclusiveDevice, NoDelay};
use mipidsi::interface::SpiInterface;
use mipidsi::models::ST7789;
use mipidsi::options::{ColorInversion, Orientation, Rotation};
use mipidsi::{Builder, NoResetPin};
use static_cell::StaticCell;

use lightning_display::{Palette, StripeSurface};

/// Panel SPI clock
const SPI_FREQUENCY_HZ: u32 = 62_500_000;

/// PWM counter wrap; one compare step per 0.1 %
const BACKLIGHT_TOP: u16 = 1000;

type PanelSpi = ExclusiveDevice<Spi<'static, SPI0, Blocking>, Output<'static>, NoDelay>;

/// The ST7789 as wired on the Pico Display pack
pub type Panel =
    mipidsi::Display<SpiInterface<'static, PanelSpi, Output<'static>>, ST7789, NoResetPin>;

/// The render surface the selector task draws on
pub type Surface = StripeSurface<Panel>;

static SPI_BUFFER: StaticCell<[u8; 512]> = StaticCell::new();

/// Display pins and peripherals
pub struct DisplayPins {
    pub spi: Peri<'static, SPI0>,
    pub clk: Peri<'static, PIN_18>,
    pub mosi: Peri<'static, PIN_19>,
    pub cs: Peri<'static, PIN_17>,
    pub dc: Peri<'static, PIN_16>,
    pub backlight_slice: Peri<'static, PWM_SLICE2>,
    pub backlight: Peri<'static, PIN_20>,
}

/// Bring up the panel and backlight
///
/// The returned `Pwm` keeps the backlight running and must stay alive.
pub fn init(pins: DisplayPins, backlight_percent: u8) -> (Surface, Pwm<'static>) {
    let mut config = spi::Config::default();
    config.frequency = SPI_FREQUENCY_HZ;
    let bus = Spi::new_blocking_txonly(pins.spi, pins.clk, pins.mosi, config);

    let cs = Output::new(pins.cs, Level::High);
    let dc = Output::new(pins.dc, Level::Low);
    let device = unwrap!(ExclusiveDevice::new_no_delay(bus, cs));

    let buffer = SPI_BUFFER.init([0; 512]);
    let interface = SpiInterface::new(device, dc, buffer);

    let panel = match Builder::new(ST7789, interface)
        .display_size(135, 240)
        .display_offset(52, 40)
        .invert_colors(ColorInversion::Inverted)
        .orientation(Orientation::new().rotate(Rotation::Deg0))
        .init(&mut Delay)
    {
        Ok(panel) => panel,
        Err(_) => defmt::panic!("ST7789 init failed"),
    };
    info!("ST7789 initialized");

    let backlight = Pwm::new_output_a(
        pins.backlight_slice,
        pins.backlight,
        backlight_config(backlight_percent),
    );
    debug!("Backlight at {}%", backlight_percent.min(100));

    (StripeSurface::new(panel, Palette::default()), backlight)
}

fn backlight_config(percent: u8) -> pwm::Config {
    let mut config = pwm::Config::default();
    config.top = BACKLIGHT_TOP;
    config.compare_a = u16::from(percent.min(100)) * (BACKLIGHT_TOP / 100);
    config
}
