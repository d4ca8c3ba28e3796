//! Radio and network stack tasks
//!
//! The CYW43 driver and the embassy-net stack each need a runner polled
//! forever. Neither touches menu state.

use cyw43::{Control, JoinOptions};
use cyw43_pio::PioSpi;
use defmt::*;
use embassy_rp::gpio::Output;
use embassy_rp::peripherals::{DMA_CH0, PIO0};
use embassy_time::Timer;

use lightning_core::config::WifiConfig;

/// CYW43 driver runner
#[embassy_executor::task]
pub async fn cyw43_task(
    runner: cyw43::Runner<'static, Output<'static>, PioSpi<'static, PIO0, 0, DMA_CH0>>,
) -> ! {
    runner.run().await
}

/// embassy-net stack runner
#[embassy_executor::task]
pub async fn net_task(mut runner: embassy_net::Runner<'static, cyw43::NetDriver<'static>>) -> ! {
    runner.run().await
}

/// Join the configured network, retrying until the access point accepts
///
/// An empty password joins an open network.
pub async fn join(control: &mut Control<'static>, wifi: &WifiConfig) {
    let mut attempts: u32 = 0;
    loop {
        attempts += 1;
        let options = if wifi.password.is_empty() {
            JoinOptions::new_open()
        } else {
            JoinOptions::new(wifi.password.as_bytes())
        };
        match control.join(wifi.ssid.as_str(), options).await {
            Ok(()) => {
                info!("Joined {} after {} attempt(s)", wifi.ssid.as_str(), attempts);
                return;
            }
            Err(e) => {
                warn!("Join {} failed, status={}", wifi.ssid.as_str(), e.status);
                Timer::after_millis(u64::from(wifi.join_retry_ms)).await;
            }
        }
    }
}
