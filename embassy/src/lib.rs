#![no_std]

//! Board support for the EEPROM logger on a Nucleo-F767ZI: three LEDs toggled by three
//! push buttons, LED state and an event log kept in a 24C256 EEPROM on I2C1, and a
//! developer console on USART3 that understands `read`, `erase` and `status`.

pub mod button;
pub mod cmd;
pub mod console;
pub mod led;
pub mod storage;
pub mod uart;
