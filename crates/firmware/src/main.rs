//! MIDI Deck is [Embassy](https://embassy.dev)-based firmware for a configurable USB MIDI controller. The firmware
//! runs on the [Nucleo-F767ZI development board](https://www.st.com/en/evaluation-tools/nucleo-f767zi.html), which
//! is powered by an F7-series STM32 microcontroller.
//!
//! Analog inputs are scanned every millisecond and turned into MIDI messages by `midi_deck_lib`, which also keeps
//! the LEDs in sync with both the generated messages and the MIDI received from the host. See [`board`] for the
//! pin assignment and the factory configuration.

#![no_std]
#![no_main]

mod board;
mod hwa;

use crate::hwa::{AdcSnapshot, ButtonLog, GpioLeds};
use defmt::{panic, *};
use embassy_executor::Spawner;
use embassy_futures::select::select;
use embassy_stm32::{
    Config,
    adc::{Adc, AdcChannel, AnyAdcChannel},
    bind_interrupts,
    exti::ExtiInput,
    gpio::{Level, Output, Pull, Speed},
    peripherals::{self, ADC3},
    time::Hertz,
    usb,
};
use embassy_sync::{blocking_mutex::raw::CriticalSectionRawMutex, channel, signal::Signal};
use embassy_time::{Duration, Instant, Ticker, Timer};
use embassy_usb::{
    Builder, UsbDevice,
    class::midi::{MidiClass, Receiver, Sender},
    driver::EndpointError,
};
use midi_deck_lib::{
    analog::{AdcType, Analog},
    configuration::Database as _,
    dispatch::{Dispatcher, MidiBuffer, Operation, Targets},
    hwa::LedHwa,
    leds::Leds,
};
use static_cell::StaticCell;

use {defmt_rtt as _, panic_probe as _};

bind_interrupts!(
    #[doc(hidden)]
    struct Irqs {
        OTG_FS => usb::InterruptHandler<peripherals::USB_OTG_FS>;
    }
);

type UsbDriver = usb::Driver<'static, peripherals::USB_OTG_FS>;

/// Size of a full-speed bulk packet.
const USB_PACKET_SIZE: usize = 64;

/// Period of the control loop.
const CONTROL_PERIOD: Duration = Duration::from_millis(1);

/// How long every LED stays lit during the startup animation.
const STARTUP_ANIMATION: Duration = Duration::from_millis(500);

/// Virtual cable number of every outgoing USB-MIDI Event Packet.
const USB_MIDI_CABLE: u8 = 0;

/// One bulk transfer as received from the host, holding one or more USB-MIDI Event Packets.
struct UsbData {
    data: [u8; USB_PACKET_SIZE],
    len: usize,
}

const INCOMING_DEPTH: usize = 4;
const OUTGOING_DEPTH: usize = 64;

/// MIDI received from the host, waiting for the control loop.
static INCOMING: channel::Channel<CriticalSectionRawMutex, UsbData, INCOMING_DEPTH> =
    channel::Channel::new();

/// USB-MIDI Event Packets generated by the control loop, waiting for the host.
static OUTGOING: channel::Channel<CriticalSectionRawMutex, [u8; 4], OUTGOING_DEPTH> =
    channel::Channel::new();

/// Requests that the configuration be returned to the factory defaults.
static FACTORY_RESET: Signal<CriticalSectionRawMutex, ()> = Signal::new();

#[embassy_executor::main]
async fn main(spawner: Spawner) {
    info!("Initializing MIDI Deck");

    let mut config = Config::default();
    {
        use embassy_stm32::rcc::*;
        // hse: high-speed external clock
        config.rcc.hse = Some(Hse {
            freq: Hertz(8_000_000),
            mode: HseMode::Bypass,
        });

        // pll: phase-locked loop, crucial for dividing clock
        config.rcc.pll_src = PllSource::HSE;
        config.rcc.pll = Some(Pll {
            prediv: PllPreDiv::DIV4,
            mul: PllMul::MUL216,
            divp: Some(PllPDiv::DIV2), // 8mhz / 4 * 216 / 2 = 216Mhz
            // USB OTG FS runs from the 48MHz PLLQ clock rather than its bus clock (RM0410, section 5.2)
            divq: Some(PllQDiv::DIV9), // 8mhz / 4 * 216 / 9 = 48Mhz
            divr: None,
        });
        config.rcc.ahb_pre = AHBPrescaler::DIV1;
        config.rcc.apb1_pre = APBPrescaler::DIV4;
        config.rcc.apb2_pre = APBPrescaler::DIV2;
        config.rcc.sys = Sysclk::PLL1_P;
        config.rcc.mux.clk48sel = mux::Clk48sel::PLL1_Q;
    }
    let p = embassy_stm32::init(config);

    let button = ExtiInput::new(p.PC13, p.EXTI13, Pull::None);
    unwrap!(spawner.spawn(factory_reset_input_task(button)));

    static ENDPOINT_OUT_BUFFER: StaticCell<[u8; 256]> = StaticCell::new();
    let mut config = embassy_stm32::usb::Config::default();

    // the board is self-powered (CN13 cannot power it, UM1974 section 6.10), which requires VBUS detection
    config.vbus_detection = true;

    let driver = usb::Driver::new_fs(
        p.USB_OTG_FS,
        Irqs,
        p.PA12,
        p.PA11,
        ENDPOINT_OUT_BUFFER.init([0; 256]),
        config,
    );

    // pid.codes test vendor and product IDs
    let vendor_id = 0x1209;
    let product_id = 0x0001;

    let mut config = embassy_usb::Config::new(vendor_id, product_id);
    config.manufacturer = Some("MIDI Deck");
    config.product = Some("MIDI Deck");
    config.self_powered = true;
    config.max_power = 0;

    static CONFIG_DESCRIPTOR: StaticCell<[u8; 256]> = StaticCell::new();
    static BOS_DESCRIPTOR: StaticCell<[u8; 256]> = StaticCell::new();
    static CONTROL_BUFFER: StaticCell<[u8; 64]> = StaticCell::new();

    let mut builder = Builder::new(
        driver,
        config,
        CONFIG_DESCRIPTOR.init([0; 256]),
        BOS_DESCRIPTOR.init([0; 256]),
        &mut [], // no msos descriptors
        CONTROL_BUFFER.init([0; 64]),
    );

    let class = MidiClass::new(&mut builder, 1, 1, USB_PACKET_SIZE as u16);
    let usb = builder.build();

    unwrap!(spawner.spawn(usb_task(usb)));
    unwrap!(spawner.spawn(midi_task(class)));

    // Arduino header A0-A5
    let adc = Adc::new(p.ADC3);
    let inputs = [
        p.PA3.degrade_adc(),
        p.PC0.degrade_adc(),
        p.PC3.degrade_adc(),
        p.PF3.degrade_adc(),
        p.PF5.degrade_adc(),
        p.PF10.degrade_adc(),
    ];

    // LD1 (green), LD2 (blue), LD3 (red)
    let leds = [
        Output::new(p.PB0, Level::Low, Speed::Low),
        Output::new(p.PB7, Level::Low, Speed::Low),
        Output::new(p.PB14, Level::Low, Speed::Low),
    ];

    unwrap!(spawner.spawn(control_task(adc, inputs, leds)));
}

/// Task running the controller itself: scans the analog inputs, routes MIDI and advances the blink clock.
#[embassy_executor::task]
async fn control_task(
    mut adc: Adc<'static, ADC3>,
    mut inputs: [AnyAdcChannel<ADC3>; board::ANALOG_INPUTS],
    outputs: [Output<'static>; board::LEDS],
) -> ! {
    let mut database = board::Database::new();
    if let Err(err) = board::apply_factory_defaults(&mut database) {
        error!("Board defaults rejected: {}", err);
    }

    let mut analog: Analog<AdcSnapshot<{ board::ANALOG_INPUTS }>, { board::ANALOG_INPUTS }> =
        Analog::new(AdcSnapshot::default(), AdcType::Adc12Bit);
    let mut leds: Leds<GpioLeds<{ board::LEDS }>, { board::LEDS }> =
        Leds::new(GpioLeds::new(outputs));
    let mut dispatcher = Dispatcher::<{ board::ENCODERS }>::new();
    let mut buttons = ButtonLog;
    let mut generated: MidiBuffer = MidiBuffer::new();

    if leds.init(&database) {
        startup_animation(&mut leds).await;
    }
    dispatcher.init(&mut Targets {
        database: &mut database,
        leds: &mut leds,
        encoders: &mut (),
        display: &mut (),
    });

    let mut ticker = Ticker::every(CONTROL_PERIOD);
    loop {
        ticker.next().await;
        let now = Instant::now();

        for (index, input) in inputs.iter_mut().enumerate() {
            let sample = adc.blocking_read(input);
            analog.hwa_mut().store(index, sample);
        }
        analog.update(&database, &mut generated, &mut buttons);

        let mut targets = Targets {
            database: &mut database,
            leds: &mut leds,
            encoders: &mut (),
            display: &mut (),
        };

        if FACTORY_RESET.try_take().is_some() {
            info!("Restoring factory configuration");
            targets.database.factory_reset();
            if let Err(err) = board::apply_factory_defaults(targets.database) {
                error!("Board defaults rejected: {}", err);
            }
            let preset = targets.database.preset();
            dispatcher.preset_changed(preset, &mut targets);
            (0..board::ANALOG_INPUTS).for_each(|index| analog.debounce_reset(index));
        }

        for raw in generated.drain() {
            if let Some(message) = raw.message() {
                dispatcher.local(&message, &mut targets);
            }
            if OUTGOING.try_send(raw.usb_packet(USB_MIDI_CABLE)).is_err() {
                debug!("USB transmit queue full, dropping {}", raw.bytes());
            }
        }

        while let Ok(received) = INCOMING.try_receive() {
            let operation =
                dispatcher.process_packets(&received.data[..received.len], now, &mut targets);

            // current positions are sent again under the new preset's mapping
            if operation.contains(Operation::PresetChange) {
                (0..board::ANALOG_INPUTS).for_each(|index| analog.debounce_reset(index));
            }
        }

        targets.leds.check_blinking(now, false);
    }
}

/// Lights every LED for a moment.
async fn startup_animation<H: LedHwa, const N: usize>(leds: &mut Leds<H, N>) {
    leds.set_all_on();
    Timer::after(STARTUP_ANIMATION).await;
    leds.set_all_off();
}

/// Handles presses of the user button, which restore the factory configuration.
#[embassy_executor::task]
async fn factory_reset_input_task(mut button: ExtiInput<'static>) -> ! {
    loop {
        button.wait_for_rising_edge().await;
        FACTORY_RESET.signal(());
    }
}

#[embassy_executor::task]
async fn usb_task(mut usb: UsbDevice<'static, UsbDriver>) -> ! {
    usb.run().await
}

#[embassy_executor::task]
async fn midi_task(class: MidiClass<'static, UsbDriver>) -> ! {
    let (mut sender, mut receiver) = class.split();
    loop {
        receiver.wait_connection().await;
        info!("USB connected");
        let _ = select(receive(&mut receiver), transmit(&mut sender)).await;
        info!("USB disconnected");
    }
}

#[doc(hidden)]
struct Disconnected {}

impl From<EndpointError> for Disconnected {
    fn from(val: EndpointError) -> Self {
        match val {
            EndpointError::BufferOverflow => panic!("Buffer overflow"),
            EndpointError::Disabled => Disconnected {},
        }
    }
}

/// Forwards bulk transfers from the host to the control loop.
async fn receive(receiver: &mut Receiver<'static, UsbDriver>) -> Result<(), Disconnected> {
    loop {
        let mut data = [0; USB_PACKET_SIZE];
        let len = receiver.read_packet(&mut data).await?;
        if INCOMING.try_send(UsbData { data, len }).is_err() {
            warn!("Incoming MIDI queue full, dropping {} bytes", len);
        }
    }
}

/// Sends generated USB-MIDI Event Packets to the host.
async fn transmit(sender: &mut Sender<'static, UsbDriver>) -> Result<(), Disconnected> {
    loop {
        let packet = OUTGOING.receive().await;
        sender.write_packet(&packet).await?;
    }
}
