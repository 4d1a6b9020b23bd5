//! Khadas VIM2 (Amlogic S912)
//!
//! Same register scheme and window addresses as the VIM1; the S912 routes
//! more GPIODV pads to the header and moves a few logical pins. Native pins
//! live at 200+.

use pinwire_core::types::BoardModel;

use crate::{AltProbe, AltReadback, Bank, BoardDesc, Window};

const GPIO_BASE: u64 = 0xC883_4000;
const GPIOAO_BASE: u64 = 0xC810_0000;

const PIN_BASE: u32 = 200;

const DV_START: u32 = PIN_BASE + 49; // GPIODV_0 = 249
const DV_END: u32 = PIN_BASE + 78;
const H_START: u32 = PIN_BASE + 16; // GPIOH_0 = 216
const H_END: u32 = PIN_BASE + 25;
const AO_START: u32 = PIN_BASE + 30; // GPIOAO_0 = 230
const AO_END: u32 = PIN_BASE + 39;

const MUX_1: usize = 0x12D;
const MUX_2: usize = 0x12E;
const MUX_3: usize = 0x12F;
const MUX_6: usize = 0x132;
const AO_MUX_1: usize = 0x005;

static BANKS: [Bank; 3] = [
    Bank {
        start: DV_START,
        end: DV_END,
        window: Window::Periphs,
        fsel: 0x10C,
        outp: 0x10D,
        inp: 0x10E,
        puen: Some(0x148),
        pupd: Some(0x13A),
        shift_bias: 0,
        out_shift_bias: 0,
        ds: None,
        mux: [None, None],
    },
    Bank {
        start: H_START,
        end: H_END,
        window: Window::Periphs,
        fsel: 0x10F,
        outp: 0x110,
        inp: 0x111,
        puen: Some(0x149),
        pupd: Some(0x13B),
        shift_bias: 20,
        out_shift_bias: 0,
        ds: None,
        mux: [None, None],
    },
    Bank {
        start: AO_START,
        end: AO_END,
        window: Window::Ao,
        fsel: 0x009,
        outp: 0x009,
        inp: 0x00A,
        puen: None,
        pupd: None,
        shift_bias: 0,
        out_shift_bias: 16,
        ds: None,
        mux: [None, None],
    },
];

static PIN_TO_GPIO: [i32; 64] = [
    // wiringPi logical number to native gpio number
    270, 275, //  0 |  1 : GPIODV_21 | GPIODV_26
    271, 272, //  2 |  3 : GPIODV_22 | GPIODV_23
     -1, 223, //  4 |  5 :           | GPIOH_7
    225,  -1, //  6 |  7 : GPIOH_9   |
     -1,  -1, //  8 |  9 :
    224, 236, // 10 | 11 : GPIOH_8   | GPIOAO_6
     -1,  -1, // 12 | 13 :
     -1,  -1, // 14 | 15 :
    276,  -1, // 16 | 17 : GPIODV_27 |
     -1,  -1, // 18 | 19 :
     -1, 235, // 20 | 21 :           | GPIOAO_5
    234,  -1, // 22 | 23 : GPIOAO_4  |
    231, 230, // 24 | 25 : GPIOAO_1  | GPIOAO_0
     -1,  -1, // 26 | 27 :
    262,  -1, // 28 | 29 : GPIODV_13 |
     -1,  -1, // 30 | 31 :
    -1, -1, -1, -1, -1, -1, -1, -1, -1, -1, -1, -1, -1, -1, -1, -1, // 32..47
    -1, -1, -1, -1, -1, -1, -1, -1, -1, -1, -1, -1, -1, -1, -1, -1, // 48..63
];

static PHY_TO_GPIO: [i32; 64] = [
    // physical header pin number to native gpio number
     -1,      //  0
     -1, -1,  //  1 | 21 :                       5V | GND
     -1, -1,  //  2 | 22 :                       5V | GPIODV_25
     -1, -1,  //  3 | 23 :                   USB_DM | GPIODV_24
     -1, -1,  //  4 | 24 :                   USB_DP | GND
     -1, 276, //  5 | 25 :                      GND | GPIODV_27
    270, 275, //  6 | 26 :                GPIODV_21 | GPIODV_26
    271, -1,  //  7 | 27 :                GPIODV_22 | 3.3V
    272, -1,  //  8 | 28 :                GPIODV_23 | GND
     -1, 223, //  9 | 29 :                      GND | GPIOH_7
     -1, -1,  // 10 | 30 :                     ADC0 | GPIOH_6
     -1, 225, // 11 | 31 :                     1.8V | GPIOH_9
     -1, 224, // 12 | 32 :                     ADC1 | GPIOH_8
     -1, 236, // 13 | 33 :                    SPDIF | GPIOAO_6
     -1, -1,  // 14 | 34 :                      GND | GND
    235, -1,  // 15 | 35 : (GPIOAO_5) UART_RX_AO_B | GPIODV_29
    234, -1,  // 16 | 36 : (GPIOAO_4) UART_TX_AO_B | RTC_CLK
     -1, -1,  // 17 | 37 :                      GND | GPIOH_5
    231, -1,  // 18 | 38 :      (GPIOAO_1) Linux_RX | EXP_INT
    230, 262, // 19 | 39 :      (GPIOAO_0) Linux_TX | GPIODV_13
     -1, -1,  // 20 | 40 :                     3.3V | GND
    -1, -1, -1, -1, -1, -1, -1, -1, -1, -1,
    -1, -1, -1, -1, -1, -1, -1, -1, -1, -1,
    -1, -1, -1, // 41..63
];

static ALT_PROBES: [AltProbe; 36] = [
    // GPIODV_13, 21..23, 26, 27
    AltProbe { gpio: 262, window: Window::Periphs, reg: MUX_3, bit: 7, mode: 2 },
    AltProbe { gpio: 262, window: Window::Periphs, reg: MUX_1, bit: 29, mode: 5 },
    AltProbe { gpio: 270, window: Window::Periphs, reg: MUX_3, bit: 5, mode: 2 },
    AltProbe { gpio: 270, window: Window::Periphs, reg: MUX_1, bit: 25, mode: 5 },
    AltProbe { gpio: 271, window: Window::Periphs, reg: MUX_3, bit: 5, mode: 2 },
    AltProbe { gpio: 271, window: Window::Periphs, reg: MUX_2, bit: 18, mode: 4 },
    AltProbe { gpio: 271, window: Window::Periphs, reg: MUX_1, bit: 25, mode: 5 },
    AltProbe { gpio: 272, window: Window::Periphs, reg: MUX_3, bit: 5, mode: 2 },
    AltProbe { gpio: 272, window: Window::Periphs, reg: MUX_2, bit: 17, mode: 4 },
    AltProbe { gpio: 272, window: Window::Periphs, reg: MUX_1, bit: 25, mode: 5 },
    AltProbe { gpio: 275, window: Window::Periphs, reg: MUX_1, bit: 20, mode: 2 },
    AltProbe { gpio: 275, window: Window::Periphs, reg: MUX_1, bit: 13, mode: 3 },
    AltProbe { gpio: 275, window: Window::Periphs, reg: MUX_2, bit: 14, mode: 4 },
    AltProbe { gpio: 276, window: Window::Periphs, reg: MUX_1, bit: 18, mode: 2 },
    AltProbe { gpio: 276, window: Window::Periphs, reg: MUX_1, bit: 12, mode: 3 },
    AltProbe { gpio: 276, window: Window::Periphs, reg: MUX_2, bit: 13, mode: 4 },
    // GPIOH_7..9
    AltProbe { gpio: 223, window: Window::Periphs, reg: MUX_6, bit: 25, mode: 4 },
    AltProbe { gpio: 223, window: Window::Periphs, reg: MUX_6, bit: 22, mode: 5 },
    AltProbe { gpio: 223, window: Window::Periphs, reg: MUX_6, bit: 19, mode: 6 },
    AltProbe { gpio: 224, window: Window::Periphs, reg: MUX_6, bit: 24, mode: 4 },
    AltProbe { gpio: 224, window: Window::Periphs, reg: MUX_6, bit: 21, mode: 5 },
    AltProbe { gpio: 224, window: Window::Periphs, reg: MUX_6, bit: 18, mode: 6 },
    AltProbe { gpio: 225, window: Window::Periphs, reg: MUX_6, bit: 23, mode: 4 },
    AltProbe { gpio: 225, window: Window::Periphs, reg: MUX_6, bit: 17, mode: 6 },
    // GPIOAO_0, 1, 4, 5, 6
    AltProbe { gpio: 230, window: Window::Ao, reg: AO_MUX_1, bit: 12, mode: 2 },
    AltProbe { gpio: 230, window: Window::Ao, reg: AO_MUX_1, bit: 26, mode: 3 },
    AltProbe { gpio: 231, window: Window::Ao, reg: AO_MUX_1, bit: 11, mode: 2 },
    AltProbe { gpio: 231, window: Window::Ao, reg: AO_MUX_1, bit: 25, mode: 3 },
    AltProbe { gpio: 234, window: Window::Ao, reg: AO_MUX_1, bit: 24, mode: 2 },
    AltProbe { gpio: 234, window: Window::Ao, reg: AO_MUX_1, bit: 6, mode: 3 },
    AltProbe { gpio: 234, window: Window::Ao, reg: AO_MUX_1, bit: 2, mode: 4 },
    AltProbe { gpio: 235, window: Window::Ao, reg: AO_MUX_1, bit: 23, mode: 2 },
    AltProbe { gpio: 235, window: Window::Ao, reg: AO_MUX_1, bit: 5, mode: 3 },
    AltProbe { gpio: 235, window: Window::Ao, reg: AO_MUX_1, bit: 1, mode: 4 },
    AltProbe { gpio: 236, window: Window::Ao, reg: AO_MUX_1, bit: 16, mode: 4 },
    AltProbe { gpio: 236, window: Window::Ao, reg: AO_MUX_1, bit: 18, mode: 5 },
];

pub(crate) fn describe() -> BoardDesc {
    BoardDesc {
        model: BoardModel::Vim2,
        pin_base: PIN_BASE,
        periphs_base: GPIO_BASE,
        ao_base: GPIOAO_BASE,
        banks: &BANKS,
        pin_to_gpio: &PIN_TO_GPIO,
        phy_to_gpio: &PHY_TO_GPIO,
        alt: AltReadback::Probe(&ALT_PROBES),
    }
}
