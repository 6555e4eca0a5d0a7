#![no_std]
#![no_main]

use static_cell::StaticCell;

use embassy_sync::channel::Channel;

use embassy_executor::Spawner;
use embassy_stm32::bind_interrupts;
use embassy_stm32::i2c::Config as I2cConfig;
use embassy_stm32::i2c::I2c;
use embassy_stm32::mode::Async;
use embassy_stm32::time::Hertz;
use embassy_stm32::usart::Config as UsartConfig;
use embassy_stm32::{
    gpio::{AnyPin, Input, Level, Output, Pin, Pull, Speed},
    usart::{Uart, UartRx},
};
use embassy_time::{Duration, Timer};
use {defmt_rtt as _, panic_probe as _};
use cortex_m_semihosting::hprintln;

use nucleo_f767zi::button::button_watcher;
use nucleo_f767zi::cmd::str_to_command;
use nucleo_f767zi::cmd::{CommandChannel, CommandReceiver, CommandSender, Commands};
use nucleo_f767zi::console::print_status;
use nucleo_f767zi::led::{led_controller_simple, LedSignal};
use nucleo_f767zi::setup_usart_developer_console;
use nucleo_f767zi::storage::{Storage, LED_COUNT};
use nucleo_f767zi::uart::parse_uart_tx_as_utf8;

static CHANNEL_COMMANDS: CommandChannel = Channel::new();

static LED_SIGNALS: [LedSignal; LED_COUNT] = [LedSignal::new(), LedSignal::new(), LedSignal::new()];

#[embassy_executor::task(pool_size = 3)]
async fn led_wrapper(pin: AnyPin, signal: &'static LedSignal) {
    let led = Output::new(pin, Level::Low, Speed::Low);
    led_controller_simple(led, signal).await;
}

#[embassy_executor::task(pool_size = 3)]
async fn button_wrapper(pin: AnyPin, led: u8, sender: CommandSender) {
    let button = Input::new(pin, Pull::Up);
    button_watcher(button, led, sender).await;
}

/// The only task touching the EEPROM, log writes therefore never overlap.
#[embassy_executor::task]
async fn command_executor(
    command_receiver: CommandReceiver,
    storage: &'static mut Storage,
    mut leds: [bool; LED_COUNT],
) {
    loop {
        let cmd = command_receiver.receive().await;
        match cmd {
            Commands::ReadLog => storage.print_log(),
            Commands::EraseLog => storage.erase_log(),
            Commands::Status => {
                print_status(&leds);
                hprintln!("{} log writes failed since boot", storage.log_failures());
            }
            Commands::Toggle(index) => {
                let index = usize::from(index);
                if index >= LED_COUNT {
                    continue;
                }
                leds[index] = !leds[index];
                LED_SIGNALS[index].signal(leds[index]);
                storage.record_toggle(&leds, index);
                print_status(&leds);
            }
        }
    }
}

#[embassy_executor::task]
async fn uart_receiver_and_cmd_forwarder(mut usart_rx: UartRx<'static, Async>, command_sender: CommandSender) {
    let mut buf: [u8; 48] = [0; 48];
    loop {
        let msg = match parse_uart_tx_as_utf8(&mut usart_rx, &mut buf).await {
            Ok(msg) => msg,
            Err(_) => continue,
        };

        if let Some(cmd) = str_to_command(msg) {
            defmt::info!("UART sends command {}", cmd);
            command_sender.send(cmd).await;
        }

        // Add a small delay to yield control back to the executor
        Timer::after(Duration::from_millis(10)).await;
    }
}

#[embassy_executor::main]
async fn main(spawner: Spawner) {
    let p = embassy_stm32::init(Default::default());

    hprintln!("Boot");

    // bind interrupts
    bind_interrupts!(struct Irqs {
        USART3 => embassy_stm32::usart::InterruptHandler<embassy_stm32::peripherals::USART3>;
    });

    // 24C256 on I2C1, accessed blocking byte by byte
    let i2c = I2c::new_blocking(
        p.I2C1,
        p.PB8, // scl
        p.PB9, // sda
        Hertz(100_000),
        I2cConfig::default(),
    );
    static STORAGE: StaticCell<Storage> = StaticCell::new();
    let storage = match Storage::open(i2c) {
        Ok(storage) => STORAGE.init(storage),
        Err(err) => defmt::panic!("EEPROM layout rejected: {}", err),
    };

    let leds = storage.load_leds();
    for (signal, on) in LED_SIGNALS.iter().zip(leds) {
        signal.signal(on);
    }
    print_status(&leds);

    // D1 green, D2 blue, D3 red
    spawner.spawn(led_wrapper(p.PB0.degrade(), &LED_SIGNALS[0])).unwrap();
    spawner.spawn(led_wrapper(p.PB7.degrade(), &LED_SIGNALS[1])).unwrap();
    spawner.spawn(led_wrapper(p.PB14.degrade(), &LED_SIGNALS[2])).unwrap();

    // SW0 toggles D3, SW1 D2, SW2 D1
    spawner.spawn(button_wrapper(p.PF12.degrade(), 2, CHANNEL_COMMANDS.sender())).unwrap();
    spawner.spawn(button_wrapper(p.PF13.degrade(), 1, CHANNEL_COMMANDS.sender())).unwrap();
    spawner.spawn(button_wrapper(p.PF14.degrade(), 0, CHANNEL_COMMANDS.sender())).unwrap();

    // start developer usart
    let mut usart = setup_usart_developer_console!(p, Irqs);
    usart.write(b"EEPROM logger started, commands: read, erase, status, toggle <1-3>\r\n").await.unwrap();

    let (_tx, rx) = usart.split();
    spawner.spawn(uart_receiver_and_cmd_forwarder(rx, CHANNEL_COMMANDS.sender())).unwrap();

    spawner.spawn(command_executor(CHANNEL_COMMANDS.receiver(), storage, leds)).unwrap();
}
