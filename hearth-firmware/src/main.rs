//! Hearth - Solid Fuel Boiler Controller Firmware
//!
//! Main firmware binary for the RP2040-based burner panel. Drives the
//! auger feeder, combustion fan and circulation pumps from the boiler
//! probes, flame sensor and safety chain.

#![no_std]
#![no_main]

use defmt::*;
use embassy_executor::Spawner;
use embassy_rp::adc::{Adc, Channel, InterruptHandler as AdcInterruptHandler};
use embassy_rp::bind_interrupts;
use embassy_rp::gpio::{Input, Level, Output, Pull};
use embassy_rp::peripherals::UART0;
use embassy_rp::pwm::{Config as PwmConfig, Pwm};
use embassy_rp::uart::{BufferedInterruptHandler, BufferedUart, Config as UartConfig};
use embassy_rp::watchdog::Watchdog;
use static_cell::StaticCell;
use {defmt_rtt as _, panic_probe as _};

use hearth_core::config::{PanelConfig, Polarity};
use hearth_core::Burner;
use hearth_drivers::{Contact, PanelActuators, PwmFan, Relay};

use crate::board::{AnalogInputs, BoardContact, ContactInputs, FAN_PWM_TOP};

mod board;
mod channels;
mod config;
mod tasks;

bind_interrupts!(struct Irqs {
    UART0_IRQ => BufferedInterruptHandler<UART0>;
    ADC_IRQ_FIFO => AdcInterruptHandler;
});

// Static cells for UART buffers (must live forever)
static TX_BUF: StaticCell<[u8; 256]> = StaticCell::new();
static RX_BUF: StaticCell<[u8; 256]> = StaticCell::new();

/// Main entry point
#[embassy_executor::main]
async fn main(spawner: Spawner) {
    info!("Hearth firmware starting...");

    let p = embassy_rp::init(Default::default());
    info!("Peripherals initialized");

    let config = config::load();
    let panel = config.panel.clone();

    // Outputs first, all released, so nothing runs while the rest boots
    let feeder = Relay::new_active_high(Output::new(p.PIN_14, Level::Low));
    let hot_water_pump = Relay::new_active_high(Output::new(p.PIN_15, Level::Low));
    let central_heating_pump = Relay::new_active_high(Output::new(p.PIN_16, Level::Low));

    let mut fan_config = PwmConfig::default();
    fan_config.top = FAN_PWM_TOP;
    fan_config.compare_a = 0;
    let fan_pwm = Pwm::new_output_a(p.PWM_SLICE1, p.PIN_18, fan_config);
    let (fan_output, _) = fan_pwm.split();
    let fan = PwmFan::new(unwrap!(fan_output));

    let actuators = PanelActuators::new(feeder, fan, hot_water_pump, central_heating_pump);
    info!("Relays and fan initialized");

    // Safety and stall contacts read as asserted when unreadable
    let contacts = ContactInputs {
        estop: Contact::fail_asserted(Input::new(p.PIN_2, Pull::Up), panel.safety.estop),
        high_limit: Contact::fail_asserted(
            Input::new(p.PIN_3, Pull::Up),
            panel.safety.high_limit,
        ),
        backfire: Contact::fail_asserted(Input::new(p.PIN_4, Pull::Up), panel.safety.backfire),
        demand: Contact::fail_released(Input::new(p.PIN_5, Pull::Up), panel.demand),
        stall: [
            stall_contact(Input::new(p.PIN_6, Pull::Up), &panel, 0),
            stall_contact(Input::new(p.PIN_7, Pull::Up), &panel, 1),
            stall_contact(Input::new(p.PIN_8, Pull::Up), &panel, 2),
            stall_contact(Input::new(p.PIN_9, Pull::Up), &panel, 3),
            stall_contact(Input::new(p.PIN_10, Pull::Up), &panel, 4),
            stall_contact(Input::new(p.PIN_11, Pull::Up), &panel, 5),
            stall_contact(Input::new(p.PIN_12, Pull::Up), &panel, 6),
            stall_contact(Input::new(p.PIN_13, Pull::Up), &panel, 7),
        ],
    };
    info!("Contacts initialized");

    let adc = Adc::new(p.ADC, Irqs, embassy_rp::adc::Config::default());
    let analog = AnalogInputs::new(
        adc,
        Channel::new_pin(p.PIN_26, Pull::None),
        Channel::new_pin(p.PIN_27, Pull::None),
        Channel::new_pin(p.PIN_28, Pull::None),
        Channel::new_pin(p.PIN_29, Pull::None),
    );
    info!("ADC initialized");

    // Panel link (115200 baud default)
    let tx_buf = TX_BUF.init([0u8; 256]);
    let rx_buf = RX_BUF.init([0u8; 256]);
    let uart = BufferedUart::new(
        p.UART0,
        p.PIN_0,
        p.PIN_1,
        Irqs,
        tx_buf,
        rx_buf,
        UartConfig::default(),
    );
    let (tx, rx) = uart.split();
    info!("UART initialized for panel communication");

    let watchdog = Watchdog::new(p.WATCHDOG);
    let burner = Burner::new(config.burner, config.panel);

    spawner.spawn(tasks::panel_rx_task(rx)).unwrap();
    spawner.spawn(tasks::panel_tx_task(tx)).unwrap();
    spawner
        .spawn(tasks::control_task(burner, analog, contacts, actuators, watchdog))
        .unwrap();

    info!("All tasks spawned, firmware running");

    loop {
        embassy_time::Timer::after_secs(60).await;
        trace!("Main loop heartbeat");
    }
}

/// Stall contact for line `index`, active-low when the line is unconfigured
fn stall_contact(pin: Input<'static>, panel: &PanelConfig, index: usize) -> BoardContact {
    let polarity = panel
        .stall_lines
        .get(index)
        .map(|line| line.polarity)
        .unwrap_or(Polarity::ActiveLow);
    Contact::fail_asserted(pin, polarity)
}
