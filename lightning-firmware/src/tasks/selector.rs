//! Mode selector control loop
//!
//! One cooperative loop owns the menu, the buttons and the effect executor
//! (panel, serial link and broker session). The boot render has already
//! happened by the time it starts. Each pass:
//!
//! 1. Make sure the broker session is up (blocks while retrying)
//! 2. Apply at most one inbound mode command
//! 3. Apply at most one button edge
//! 4. Sleep for the poll interval
//!
//! Failures are logged and never end the loop. A broker error drops the
//! session so the next pass reconnects.

use defmt::*;
use embassy_time::{Delay, Instant, Timer};

use lightning_core::executor::EffectExecutor;
use lightning_core::input::ButtonPanel;
use lightning_core::menu::{Effects, Menu};
use lightning_core::traits::{SerialSink, StatePublisher};
use lightning_hal_rp2040::{Button, SerialTx};

use crate::display::Surface;
use crate::mqtt::MqttClient;

/// Delay between loop passes
const POLL_INTERVAL_MS: u64 = 100;

/// Effect executor wired to the Pico Display, UART1 and the broker
pub type Outputs =
    EffectExecutor<Surface, SerialSink<SerialTx<'static>>, MqttClient<'static>, Delay>;

/// Everything the control loop drives
pub struct Selector {
    pub menu: Menu,
    pub panel: ButtonPanel<Button<'static>>,
    pub outputs: Outputs,
}

/// Selector task - runs the menu against buttons, broker and display
#[embassy_executor::task]
pub async fn selector_task(mut selector: Selector) {
    info!(
        "Selector task started with {} modes",
        selector.menu.table().len()
    );

    loop {
        selector.outputs.publisher_mut().ensure_connected().await;

        let incoming = selector.outputs.publisher_mut().poll_incoming().await;
        match incoming {
            Ok(Some(message)) => match message.payload_str() {
                Some(label) => {
                    debug!("Remote mode command: {}", label);
                    let effects = selector.menu.apply_remote(label);
                    if effects.is_empty() {
                        debug!("Ignored remote mode {}", label);
                    }
                    selector.run_effects(&effects).await;
                }
                None => debug!("Remote mode command is not UTF-8, ignored"),
            },
            Ok(None) => {}
            Err(e) => {
                warn!("Broker session lost: {:?}", e);
                selector.outputs.publisher_mut().mark_lost();
            }
        }

        let action = selector.panel.poll(Instant::now().as_millis());
        if let Some(action) = action {
            debug!("Button: {:?}", action);
        }
        let effects = selector.menu.handle_local_input(action);
        selector.run_effects(&effects).await;

        Timer::after_millis(POLL_INTERVAL_MS).await;
    }
}

impl Selector {
    async fn run_effects(&mut self, effects: &Effects) {
        if effects.is_empty() {
            return;
        }

        let report = self.outputs.run(self.menu.table(), effects).await;
        if let Some(e) = report.render_error {
            warn!("Render failed: {:?}", Debug2Format(&e));
        }
        if let Some(e) = report.transport_error {
            warn!("Serial write failed: {:?}", e);
        }
        if report.publish_skipped > 0 {
            warn!(
                "Broker offline, state {} not published",
                self.menu.selected_label()
            );
        }
        if let Some(e) = report.publish_error {
            warn!("Publish failed: {:?}", e);
        }
        if report.transmitted > 0 {
            debug!("Sent {} to peer", self.menu.selected_label());
        }
        debug!("Selection now {}", self.menu.selected_label());
    }
}
