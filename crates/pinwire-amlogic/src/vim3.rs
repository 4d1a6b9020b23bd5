//! Khadas VIM3 (Amlogic A311D)
//!
//! The G12-generation register layout: four banks (GPIOA, GPIOH, GPIOZ in
//! the peripheral block at 0xFF634000, GPIOAO in the always-on block at
//! 0xFF800000), full pull control everywhere, 2-bit pad drive-strength
//! registers, and proper 4-bit mux fields that make function readback a
//! plain register read instead of probe tables. Native pins live at 300+.

use pinwire_core::types::BoardModel;

use crate::{AltReadback, Bank, BoardDesc, Window};

const GPIO_BASE: u64 = 0xFF63_4000;
const GPIOAO_BASE: u64 = 0xFF80_0000;

const PIN_BASE: u32 = 300;

const A_START: u32 = PIN_BASE; // GPIOA_0 = 300
const A_END: u32 = PIN_BASE + 15;
const H_START: u32 = PIN_BASE + 20; // GPIOH_0 = 320
const H_END: u32 = PIN_BASE + 29;
const Z_START: u32 = PIN_BASE + 30; // GPIOZ_0 = 330
const Z_END: u32 = PIN_BASE + 45;
const AO_START: u32 = PIN_BASE + 50; // GPIOAO_0 = 350
const AO_END: u32 = PIN_BASE + 61; // AO pads 0..11 incl. GPIOAO_10/11

static BANKS: [Bank; 4] = [
    Bank {
        start: A_START,
        end: A_END,
        window: Window::Periphs,
        fsel: 0x120,
        outp: 0x121,
        inp: 0x122,
        puen: Some(0x14D),
        pupd: Some(0x13F),
        shift_bias: 0,
        out_shift_bias: 0,
        ds: Some(0x1D6),
        mux: [Some(0x1BD), Some(0x1BE)],
    },
    Bank {
        start: H_START,
        end: H_END,
        window: Window::Periphs,
        fsel: 0x119,
        outp: 0x11A,
        inp: 0x11B,
        puen: Some(0x14B),
        pupd: Some(0x13D),
        shift_bias: 0,
        out_shift_bias: 0,
        ds: Some(0x1D4),
        mux: [Some(0x1BB), None],
    },
    Bank {
        start: Z_START,
        end: Z_END,
        window: Window::Periphs,
        fsel: 0x11C,
        outp: 0x11D,
        inp: 0x11E,
        puen: Some(0x13E),
        pupd: Some(0x14C),
        shift_bias: 0,
        out_shift_bias: 0,
        ds: Some(0x1D5),
        mux: [Some(0x1B6), Some(0x1B7)],
    },
    Bank {
        start: AO_START,
        end: AO_END,
        window: Window::Ao,
        fsel: 0x009,
        outp: 0x00D,
        inp: 0x00A,
        puen: Some(0x00C),
        pupd: Some(0x00B),
        shift_bias: 0,
        out_shift_bias: 0,
        ds: Some(0x007),
        mux: [Some(0x005), Some(0x006)],
    },
];

static PIN_TO_GPIO: [i32; 64] = [
    // wiringPi logical number to native gpio number
     -1, 353, //  0 |  1 :           | GPIOAO_3
    360,  -1, //  2 |  3 : GPIOAO_10 |
    300, 301, //  4 |  5 : GPIOA_0   | GPIOA_1
    303,  -1, //  6 |  7 : GPIOA_3   |
     -1,  -1, //  8 |  9 :
    302, 304, // 10 | 11 : GPIOA_2   | GPIOA_4
     -1,  -1, // 12 | 13 :
     -1, 315, // 14 | 15 :           | GPIOA_15
    352,  -1, // 16 | 17 : GPIOAO_2  |
     -1,  -1, // 18 | 19 :
     -1, 326, // 20 | 21 :           | GPIOH_6
    327,  -1, // 22 | 23 : GPIOH_7   |
    351, 350, // 24 | 25 : GPIOAO_1  | GPIOAO_0
     -1,  -1, // 26 | 27 :
     -1, 314, // 28 | 29 :           | GPIOA_14
    325, 324, // 30 | 31 : GPIOH_5   | GPIOH_4
    -1, -1, -1, -1, -1, -1, -1, -1, -1, -1, -1, -1, -1, -1, -1, -1, // 32..47
    -1, -1, -1, -1, -1, -1, -1, -1, -1, -1, -1, -1, -1, -1, -1, -1, // 48..63
];

static PHY_TO_GPIO: [i32; 64] = [
    // physical header pin number to native gpio number
     -1,      //  0
     -1, -1,  //  1 | 21 :                       5V | GND
     -1, 315, //  2 | 22 :                       5V | GPIOA_15
     -1, 314, //  3 | 23 :                   USB_DM | GPIOA_14
     -1, -1,  //  4 | 24 :                   USB_DP | GND
     -1, 352, //  5 | 25 :                      GND | GPIOAO_2
     -1, 353, //  6 | 26 :                   MCU3.3 | GPIOAO_3
     -1, -1,  //  7 | 27 :                  MCUNrST | 3.3V
     -1, -1,  //  8 | 28 :                  MCUSWIM | GND
     -1, 301, //  9 | 29 :                      GND | GPIOA_1
     -1, 300, // 10 | 30 :                     ADC0 | GPIOA_0
     -1, 303, // 11 | 31 :                     1.8V | GPIOA_3
     -1, 302, // 12 | 32 :                     ADC1 | GPIOA_2
    360, 304, // 13 | 33 :                GPIOAO_10 | GPIOA_4
     -1, -1,  // 14 | 34 :                      GND | GND
    326, 325, // 15 | 35 :  (GPIOH_6) UART_RX_AO_B | PWM-F (GPIOH_5)
    327, -1,  // 16 | 36 :  (GPIOH_7) UART_TX_AO_B | RTC_CLK
     -1, 324, // 17 | 37 :                      GND | GPIOH_4
    351, -1,  // 18 | 38 :      (GPIOAO_1) Linux_RX | MCUFA_1
    350, -1,  // 19 | 39 :      (GPIOAO_0) Linux_TX | GPIOZ_15
     -1, -1,  // 20 | 40 :                     3.3V | GND
    -1, -1, -1, -1, -1, -1, -1, -1, -1, -1,
    -1, -1, -1, -1, -1, -1, -1, -1, -1, -1,
    -1, -1, -1, // 41..63
];

pub(crate) fn describe() -> BoardDesc {
    BoardDesc {
        model: BoardModel::Vim3,
        pin_base: PIN_BASE,
        periphs_base: GPIO_BASE,
        ao_base: GPIOAO_BASE,
        banks: &BANKS,
        pin_to_gpio: &PIN_TO_GPIO,
        phy_to_gpio: &PHY_TO_GPIO,
        alt: AltReadback::MuxField,
    }
}
