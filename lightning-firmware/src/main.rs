//! Lightning - Mode Selector Firmware
//!
//! Main firmware binary for a Raspberry Pi Pico W fitted with a Pimoroni
//! Pico Display pack. Four buttons pick one of a fixed list of lighting
//! modes; a confirmed mode is announced to the lighting controller over
//! UART and mirrored to an MQTT broker, which can also set the mode.

#![no_std]
#![no_main]

use cyw43_pio::{PioSpi, DEFAULT_CLOCK_DIVIDER};
use defmt::*;
use embassy_executor::Spawner;
use embassy_net::tcp::TcpSocket;
use embassy_net::{IpAddress, IpEndpoint, Ipv4Address, StackResources};
use embassy_rp::bind_interrupts;
use embassy_rp::clocks::RoscRng;
use embassy_rp::gpio::{Level, Output};
use embassy_rp::peripherals::PIO0;
use embassy_rp::pio::{InterruptHandler, Pio};
use embassy_rp::uart;
use rand_core::RngCore;
use static_cell::StaticCell;
use {defmt_rtt as _, panic_probe as _};

use lightning_core::config::DeviceConfig;
use lightning_core::input::ButtonPanel;
use lightning_core::link::Topics;
use lightning_core::menu::{Menu, ModeTable};
use lightning_core::executor::EffectExecutor;
use lightning_core::traits::{apply_render, SerialSink};
use lightning_hal_rp2040::{gpio_to_uart, to_embassy_config, Button, SerialTx};

use crate::display::DisplayPins;
use crate::mqtt::MqttClient;
use crate::tasks::Selector;

mod config;
mod display;
mod mqtt;
mod tasks;

bind_interrupts!(struct Irqs {
    PIO0_IRQ_0 => InterruptHandler<PIO0>;
});

/// GPIO carrying UART1 TX to the lighting controller
const SERIAL_TX_GPIO: u8 = 4;

/// Reference topic device name, used if the configured one is invalid
const FALLBACK_DEVICE: &str = "lightning_cloud";

// Static cells for state shared with tasks (must live forever)
static DEVICE_CONFIG: StaticCell<DeviceConfig> = StaticCell::new();
static CYW43_STATE: StaticCell<cyw43::State> = StaticCell::new();
static NET_RESOURCES: StaticCell<StackResources<3>> = StaticCell::new();
static TCP_RX_BUF: StaticCell<[u8; 1024]> = StaticCell::new();
static TCP_TX_BUF: StaticCell<[u8; 1024]> = StaticCell::new();

/// Main entry point
#[embassy_executor::main]
async fn main(spawner: Spawner) {
    info!("Lightning firmware starting...");

    let p = embassy_rp::init(Default::default());
    info!("Peripherals initialized");

    let config: &'static DeviceConfig = DEVICE_CONFIG.init(config::load());

    let table = match ModeTable::new(config.menu.labels()) {
        Ok(table) => table,
        Err(e) => {
            error!("Invalid mode list: {:?}, using reference modes", e);
            unwrap!(ModeTable::reference())
        }
    };
    info!("{} modes configured", table.len());
    let menu = Menu::new(table, config.menu.flash_ms);

    let topics = match Topics::for_device(config.broker.device.as_str()) {
        Ok(topics) => topics,
        Err(e) => {
            error!("Invalid device name: {:?}, using {}", e, FALLBACK_DEVICE);
            unwrap!(Topics::for_device(FALLBACK_DEVICE))
        }
    };

    // Display first so the menu is visible while the radio comes up
    // Pin assignments are board-specific (Pico Display: SPI0 on GPIO16-20)
    let (mut surface, _backlight) = display::init(
        DisplayPins {
            spi: p.SPI0,
            clk: p.PIN_18,
            mosi: p.PIN_19,
            cs: p.PIN_17,
            dc: p.PIN_16,
            backlight_slice: p.PWM_SLICE2,
            backlight: p.PIN_20,
        },
        config.display.backlight_percent,
    );
    for effect in menu.initial_render().iter() {
        if let Err(e) = apply_render(&mut surface, menu.table(), effect) {
            warn!("Initial render failed: {:?}", Debug2Format(&e));
        }
    }

    // Setup UART1 TX for the lighting controller
    let tx = uart::UartTx::new_blocking(
        p.UART1,
        p.PIN_4,
        to_embassy_config(&config.serial.uart_config()),
    );
    let serial = SerialSink::new(SerialTx::new(tx));
    info!(
        "Serial link on GPIO{} ({:?}) at {} baud",
        SERIAL_TX_GPIO,
        gpio_to_uart(SERIAL_TX_GPIO),
        config.serial.baudrate
    );

    // Pico Display buttons: A=GPIO12, B=GPIO13, X=GPIO14, Y=GPIO15
    let active_low = config.buttons.active_low;
    let panel = ButtonPanel::new(
        [
            Button::new(p.PIN_12, active_low),
            Button::new(p.PIN_13, active_low),
            Button::new(p.PIN_14, active_low),
            Button::new(p.PIN_15, active_low),
        ],
        config.buttons.map,
        active_low,
        config.buttons.timing,
    );
    info!("Buttons initialized");

    // CYW43 radio on PIO0 (Pico W: PWR=GPIO23, CS=GPIO25, DIO=GPIO24, CLK=GPIO29)
    let fw = include_bytes!(concat!(env!("CYW43_FW_DIR"), "/43439A0.bin"));
    let clm = include_bytes!(concat!(env!("CYW43_FW_DIR"), "/43439A0_clm.bin"));

    let pwr = Output::new(p.PIN_23, Level::Low);
    let cs = Output::new(p.PIN_25, Level::High);
    let mut pio = Pio::new(p.PIO0, Irqs);
    let spi = PioSpi::new(
        &mut pio.common,
        pio.sm0,
        DEFAULT_CLOCK_DIVIDER,
        pio.irq0,
        cs,
        p.PIN_24,
        p.PIN_29,
        p.DMA_CH0,
    );

    let state = CYW43_STATE.init(cyw43::State::new());
    let (net_device, mut control, runner) = cyw43::new(state, pwr, spi, fw).await;
    spawner.spawn(tasks::cyw43_task(runner)).unwrap();

    control.init(clm).await;
    control
        .set_power_management(cyw43::PowerManagementMode::PowerSave)
        .await;
    info!("Radio initialized");

    let seed = RoscRng.next_u64();
    let (stack, runner) = embassy_net::new(
        net_device,
        embassy_net::Config::dhcpv4(Default::default()),
        NET_RESOURCES.init(StackResources::new()),
        seed,
    );
    spawner.spawn(tasks::net_task(runner)).unwrap();

    tasks::join(&mut control, &config.wifi).await;
    stack.wait_config_up().await;
    if let Some(v4) = stack.config_v4() {
        info!("DHCP address {}", v4.address);
    }

    let [a, b, c, d] = config.broker.host;
    let endpoint = IpEndpoint::new(
        IpAddress::Ipv4(Ipv4Address::new(a, b, c, d)),
        config.broker.port,
    );
    let socket = TcpSocket::new(
        stack,
        TCP_RX_BUF.init([0; 1024]),
        TCP_TX_BUF.init([0; 1024]),
    );
    let client = MqttClient::new(socket, endpoint, &config.broker, topics);

    spawner
        .spawn(tasks::selector_task(Selector {
            menu,
            panel,
            outputs: EffectExecutor::new(surface, serial, client, embassy_time::Delay),
        }))
        .unwrap();

    info!("All tasks spawned, firmware running");

    // Main task has nothing else to do - all work happens in spawned tasks
    // Holding control and the backlight PWM here keeps both alive
    let _control = control;
    loop {
        embassy_time::Timer::after_secs(60).await;
        trace!("Main loop heartbeat");
    }
}
