//! ssd130x-demo
//!
//! Bring-up firmware for two OLED panels on a Raspberry Pi Pico 2:
//!
//! - a 128x64 SSD1306 on blocking I2C, redrawing a bouncing box at 30 Hz;
//! - a 128x64 SSD1307 on blocking 4-wire SPI (no DMA), sweeping a bar
//!   across the panel at 15 Hz.
//!
//! If a transfer fails the driver drops back to uninitialised and its task
//! re-runs the init sequence before the next frame.

#![no_std]
#![no_main]

use core::cell::RefCell;

use defmt::*;
use embassy_embedded_hal::shared_bus::blocking::spi::SpiDevice;
use embassy_executor::Spawner;
use embassy_rp::block::ImageDef;
use embassy_rp::gpio::{Level, Output};
use embassy_rp::i2c::{self, I2c};
use embassy_rp::peripherals::{I2C0, SPI0};
use embassy_rp::spi::{self, Spi};
use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::blocking_mutex::Mutex;
use embassy_time::{Delay, Duration, Ticker};
use embedded_graphics::{
    pixelcolor::BinaryColor,
    prelude::*,
    primitives::{PrimitiveStyle, Rectangle},
};
use static_cell::StaticCell;
use {defmt_rtt as _, panic_probe as _};

use ssd130x_oled::{size::Size128x64, Framebuffer, Ssd1307Config, Ssd1307Driver, Ssd130xDriver};
use ssd130x_transport::{I2cConfig, I2cTransport, SpiTransport};

// ---------------------------------------------------------------------------
// Boot block
// ---------------------------------------------------------------------------

/// Tell the RP2350 Boot ROM about our application.
#[link_section = ".start_block"]
#[used]
pub static IMAGE_DEF: ImageDef = embassy_rp::block::ImageDef::secure_exe();

// ---------------------------------------------------------------------------
// Static storage
// ---------------------------------------------------------------------------

/// SPI0 bus, wrapped so the panel's `SpiDevice` can drive chip select.
static SPI_BUS: StaticCell<Mutex<CriticalSectionRawMutex, RefCell<SpiBus>>> = StaticCell::new();

/// Framebuffer the SSD1307 driver borrows for its whole life.
static SSD1307_FRAME: StaticCell<Framebuffer<Size128x64>> = StaticCell::new();

// ---------------------------------------------------------------------------
// Type aliases
// ---------------------------------------------------------------------------

type I2cOled = Ssd130xDriver<I2cTransport<I2c<'static, I2C0, i2c::Blocking>>, Size128x64>;

type SpiBus = Spi<'static, SPI0, spi::Blocking>;

type SpiOled = Ssd1307Driver<
    SpiTransport<
        SpiDevice<'static, CriticalSectionRawMutex, SpiBus, Output<'static>>,
        Output<'static>,
        Output<'static>,
    >,
    Size128x64,
>;

/// Side length of the bouncing box, in pixels.
const BOX: i32 = 12;

/// Width of the sweeping bar, in pixels.
const BAR: u32 = 8;

// ---------------------------------------------------------------------------
// Tasks
// ---------------------------------------------------------------------------

#[embassy_executor::task]
async fn i2c_display_task(mut oled: I2cOled) {
    info!("I2C display task started");

    let mut ticker = Ticker::every(Duration::from_hz(30));
    let mut delay = Delay;
    let (mut x, mut y) = (0i32, 0i32);
    let (mut dx, mut dy) = (2i32, 1i32);

    loop {
        ticker.next().await;

        if !oled.is_initialized() {
            if let Err(e) = oled.init(&mut delay) {
                warn!("SSD1306 init failed: {}", e);
                continue;
            }
            info!("SSD1306 initialised");
        }

        let max_x = oled.width() as i32 - BOX;
        let max_y = oled.height() as i32 - BOX;
        if !(0..=max_x).contains(&(x + dx)) {
            dx = -dx;
        }
        if !(0..=max_y).contains(&(y + dy)) {
            dy = -dy;
        }
        x += dx;
        y += dy;

        // Drawing into the framebuffer is infallible.
        let _ = oled.clear(BinaryColor::Off);
        let _ = Rectangle::new(Point::new(x, y), Size::new(BOX as u32, BOX as u32))
            .into_styled(PrimitiveStyle::with_fill(BinaryColor::On))
            .draw(&mut oled);

        if let Err(e) = oled.update() {
            error!("SSD1306 update failed: {}", e);
        }
    }
}

#[embassy_executor::task]
async fn spi_display_task(mut oled: SpiOled) {
    info!("SPI display task started");

    let mut ticker = Ticker::every(Duration::from_hz(15));
    let mut delay = Delay;
    let mut x = 0u32;

    loop {
        ticker.next().await;

        if !oled.is_initialized() {
            if let Err(e) = oled.init(Ssd1307Config::default(), &mut delay) {
                warn!("SSD1307 init failed: {}", e);
                continue;
            }
            info!("SSD1307 initialised");
        }

        x = (x + 1) % (oled.width() as u32 - BAR);

        let _ = oled.clear(BinaryColor::Off);
        let _ = Rectangle::new(Point::new(x as i32, 0), Size::new(BAR, oled.height() as u32))
            .into_styled(PrimitiveStyle::with_fill(BinaryColor::On))
            .draw(&mut oled);

        if let Err(e) = oled.update() {
            error!("SSD1307 update failed: {}", e);
        }
    }
}

// ---------------------------------------------------------------------------
// Main
// ---------------------------------------------------------------------------

#[embassy_executor::main]
async fn main(spawner: Spawner) {
    let p = embassy_rp::init(Default::default());
    info!("ssd130x-demo starting");

    // -- Pin assignments --
    // I2C_SDA  -> GP20  (p.PIN_20)
    // I2C_SCL  -> GP21  (p.PIN_21)
    // SPI_CLK  -> GP18  (p.PIN_18)
    // SPI_MOSI -> GP19  (p.PIN_19)
    // SPI_CS   -> GP17  (p.PIN_17)
    // OLED_DC  -> GP16  (p.PIN_16)
    // OLED_RST -> GP15  (p.PIN_15)

    // SSD1306 on I2C0.
    let mut i2c_config = i2c::Config::default();
    i2c_config.frequency = 400_000;
    let i2c = I2c::new_blocking(p.I2C0, p.PIN_21, p.PIN_20, i2c_config);
    let i2c_oled: I2cOled = Ssd130xDriver::new(I2cTransport::new(i2c, I2cConfig::default()));

    // SSD1307 on SPI0, transmit only.
    let mut spi_config = spi::Config::default();
    spi_config.frequency = 8_000_000;
    let spi = Spi::new_blocking_txonly(p.SPI0, p.PIN_18, p.PIN_19, spi_config);
    let spi_bus = SPI_BUS.init(Mutex::new(RefCell::new(spi)));

    let cs = Output::new(p.PIN_17, Level::High);
    let dc = Output::new(p.PIN_16, Level::Low);
    let rst = Output::new(p.PIN_15, Level::High);
    let transport = SpiTransport::new(SpiDevice::new(spi_bus, cs), dc, rst);
    let spi_oled: SpiOled = Ssd1307Driver::new(transport, SSD1307_FRAME.init(Framebuffer::new()));

    spawner.spawn(unwrap!(i2c_display_task(i2c_oled)));
    spawner.spawn(unwrap!(spi_display_task(spi_oled)));

    info!("All tasks spawned");
}
