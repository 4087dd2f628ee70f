//! Panel board wiring
//!
//! Pin assignments for the Hearth controller board:
//!
//! | Function            | GPIO        |
//! |---------------------|-------------|
//! | Panel UART TX/RX    | 0 / 1       |
//! | E-stop              | 2           |
//! | High limit          | 3           |
//! | Backfire            | 4           |
//! | Heat demand         | 5           |
//! | Stall lines 0..8    | 6..=13      |
//! | Feeder relay        | 14          |
//! | Hot water pump      | 15          |
//! | Heating pump        | 16          |
//! | Fan PWM (slice 1A)  | 18          |
//! | Boiler probe        | 26 (ADC0)   |
//! | Hot water probe     | 27 (ADC1)   |
//! | Chimney probe       | 28 (ADC2)   |
//! | Flame sensor        | 29 (ADC3)   |

use embassy_rp::adc::{Adc, Async, Channel};
use embassy_rp::gpio::{Input, Output};
use embassy_rp::pwm::PwmOutput;

use hearth_core::config::MAX_STALL_LINES;
use hearth_core::safety::SafetyContact;
use hearth_core::sensor::{ProbeId, ProbeSample};
use hearth_core::traits::{ContactId, InputSource};
use hearth_drivers::sensor::flame::brightness;
use hearth_drivers::{Contact, NtcCurve, PanelActuators, PwmFan, Relay};

/// Fan PWM wrap value: 125 MHz / 5000 = 25 kHz
pub const FAN_PWM_TOP: u16 = 4_999;

pub type BoardRelay = Relay<Output<'static>>;
pub type BoardFan = PwmFan<PwmOutput<'static>>;
pub type BoardActuators = PanelActuators<BoardRelay, BoardFan>;
pub type BoardContact = Contact<Input<'static>>;

/// ADC channels for the probes and flame sensor
pub struct AnalogInputs {
    adc: Adc<'static, Async>,
    boiler: Channel<'static>,
    hot_water: Channel<'static>,
    chimney: Channel<'static>,
    flame: Channel<'static>,
    curve: NtcCurve,
}

/// One pass over every analog input
#[derive(Debug, Clone, Copy)]
pub struct AnalogSnapshot {
    pub boiler: ProbeSample,
    pub hot_water: ProbeSample,
    pub chimney: ProbeSample,
    pub flame_raw: u16,
}

impl AnalogInputs {
    pub fn new(
        adc: Adc<'static, Async>,
        boiler: Channel<'static>,
        hot_water: Channel<'static>,
        chimney: Channel<'static>,
        flame: Channel<'static>,
    ) -> Self {
        Self {
            adc,
            boiler,
            hot_water,
            chimney,
            flame,
            curve: NtcCurve::default(),
        }
    }

    /// Convert every channel in turn
    ///
    /// The RP2040 has a single converter, so channels are read
    /// sequentially and the result handed to the burner as a snapshot.
    pub async fn sample(&mut self) -> AnalogSnapshot {
        let boiler = self.probe(ProbeId::Boiler).await;
        let hot_water = self.probe(ProbeId::HotWater).await;
        let chimney = self.probe(ProbeId::Chimney).await;
        // A failed conversion reads as darkness
        let flame_raw = match self.adc.read(&mut self.flame).await {
            Ok(value) => brightness(value, false),
            Err(_) => 0,
        };

        AnalogSnapshot {
            boiler,
            hot_water,
            chimney,
            flame_raw,
        }
    }

    async fn probe(&mut self, probe: ProbeId) -> ProbeSample {
        let channel = match probe {
            ProbeId::Boiler => &mut self.boiler,
            ProbeId::HotWater => &mut self.hot_water,
            ProbeId::Chimney => &mut self.chimney,
        };
        match self.adc.read(channel).await {
            Ok(value) => match self.curve.celsius_x10(value) {
                Ok(x10) => ProbeSample::ok(x10),
                Err(_) => ProbeSample::faulted(),
            },
            Err(_) => ProbeSample::faulted(),
        }
    }
}

/// Digital inputs: safety chain, heat demand and stall switches
pub struct ContactInputs {
    pub estop: BoardContact,
    pub high_limit: BoardContact,
    pub backfire: BoardContact,
    pub demand: BoardContact,
    pub stall: [BoardContact; MAX_STALL_LINES],
}

/// Input source for one tick: analog values from the snapshot, contacts
/// read live
pub struct BoardInputs<'a> {
    analog: &'a AnalogSnapshot,
    contacts: &'a mut ContactInputs,
}

impl<'a> BoardInputs<'a> {
    pub fn new(analog: &'a AnalogSnapshot, contacts: &'a mut ContactInputs) -> Self {
        Self { analog, contacts }
    }
}

impl InputSource for BoardInputs<'_> {
    fn read_temperature(&mut self, probe: ProbeId) -> ProbeSample {
        match probe {
            ProbeId::Boiler => self.analog.boiler,
            ProbeId::HotWater => self.analog.hot_water,
            ProbeId::Chimney => self.analog.chimney,
        }
    }

    fn read_demand(&mut self) -> bool {
        self.contacts.demand.level()
    }

    fn read_flame_raw(&mut self) -> u16 {
        self.analog.flame_raw
    }

    fn read_contact(&mut self, contact: ContactId) -> bool {
        match contact {
            ContactId::Safety(SafetyContact::EStop) => self.contacts.estop.level(),
            ContactId::Safety(SafetyContact::HighLimit) => self.contacts.high_limit.level(),
            ContactId::Safety(SafetyContact::Backfire) => self.contacts.backfire.level(),
            // Lines beyond the board's inputs are never configured
            ContactId::Stall(line) => self
                .contacts
                .stall
                .get_mut(line as usize)
                .map(|c| c.level())
                .unwrap_or(false),
        }
    }
}
