use heapless::String;

use embassy_stm32::mode::Async;
use embassy_stm32::usart::UartRx;

use cortex_m_semihosting::hprintln;

#[macro_export]
macro_rules! setup_usart_developer_console {
    ($p:ident, $irqs:ident) => {
        // setup usart
        Uart::new(
            $p.USART3,
            $p.PD9, // rx
            $p.PD8, // tx
            $irqs,
            $p.DMA1_CH4, // tx
            $p.DMA1_CH1, // rx
            UsartConfig::default(),
        ).expect("USART generation failed")
    }
}

/// Reads one console line (until the line goes idle) and returns it trimmed.
///
/// Errors carry a short description that is also printed over semihosting.
pub async fn parse_uart_tx_as_utf8<'a, const N: usize>(
    usart_rx: &mut UartRx<'static, Async>,
    buf: &'a mut [u8; N])
    -> Result<&'a str, String<64>>
{
    let len = match usart_rx.read_until_idle(buf).await {
        Ok(len) => len,
        Err(err) => {
            hprintln!("USART error {:?}, ignore transmission", err);
            return Err(reason("USART related error, ignore transmission"));
        }
    };

    match core::str::from_utf8(&buf[..len]) {
        Ok(msg) => Ok(msg.trim()),
        Err(_err) => {
            hprintln!("Received invalid utf-8 over USART, ignore transmission");
            Err(reason("Received invalid utf-8 over USART, ignore transmission"))
        }
    }
}

fn reason(text: &str) -> String<64> {
    let mut msg = String::new();
    // the fixed texts above fit, anything longer is dropped
    let _ = msg.push_str(text);
    msg
}
