//! Khadas VIM1 (Amlogic S905X)
//!
//! Three usable banks: GPIODV and GPIOH in the peripheral block at
//! 0xC8834000, GPIOAO in the always-on block at 0xC8100000. The AO domain
//! shares one register for function select and output level (outputs in
//! bits [25:16]) and has no pull control.

use pinwire_core::types::BoardModel;

use crate::{AltProbe, AltReadback, Bank, BoardDesc, Window};

const GPIO_BASE: u64 = 0xC883_4000;
const GPIOAO_BASE: u64 = 0xC810_0000;

const PIN_BASE: u32 = 100;

const DV_START: u32 = PIN_BASE + 49; // GPIODV_0 = 149
const DV_END: u32 = PIN_BASE + 78;
const H_START: u32 = PIN_BASE + 16; // GPIOH_0 = 116
const H_END: u32 = PIN_BASE + 25;
const AO_START: u32 = PIN_BASE + 30; // GPIOAO_0 = 130
const AO_END: u32 = PIN_BASE + 39;

const MUX_1: usize = 0x12D;
const MUX_2: usize = 0x12E;
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
        // GPIOH occupies bits [29:20] of its registers.
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
     -1, 175, //  0 |  1 :          | GPIODV_26
     -1,  -1, //  2 |  3 :
    122, 123, //  4 |  5 : GPIOH_6  | GPIOH_7
    125,  -1, //  6 |  7 : GPIOH_9  |
     -1,  -1, //  8 |  9 :
    124, 136, // 10 | 11 : GPIOH_8  | GPIOAO_6
     -1,  -1, // 12 | 13 :
     -1, 174, // 14 | 15 :          | GPIODV_25
    176,  -1, // 16 | 17 : GPIODV_27|
     -1,  -1, // 18 | 19 :
     -1, 135, // 20 | 21 :          | GPIOAO_5
    134,  -1, // 22 | 23 : GPIOAO_4 |
    121, 132, // 24 | 25 : GPIOAO_1 | GPIOAO_2
     -1,  -1, // 26 | 27 :
     -1, 173, // 28 | 29 :          | GPIODV_24
     -1, 121, // 30 | 31 :          | GPIOH_5
    -1, -1, -1, -1, -1, -1, -1, -1, -1, -1, -1, -1, -1, -1, -1, -1, // 32..47
    -1, -1, -1, -1, -1, -1, -1, -1, -1, -1, -1, -1, -1, -1, -1, -1, // 48..63
];

static PHY_TO_GPIO: [i32; 64] = [
    // physical header pin number to native gpio number
     -1,      //  0
     -1, -1,  //  1 | 21 :                       5V | GND
     -1, 174, //  2 | 22 :                       5V | I2C_SCK_A (GPIODV_25)
     -1, 173, //  3 | 23 :                  HUB_DM1 | I2C_SDA_A (GPIODV_24)
     -1, -1,  //  4 | 24 :                  HUB_DP1 | GND
     -1, 176, //  5 | 25 :                      GND | I2C_SCK_B (GPIODV_27)
     -1, 175, //  6 | 26 :                       5V | I2C_SDA_B (GPIODV_26)
     -1, -1,  //  7 | 27 :                  HUB_DM2 | 3.3V
     -1, -1,  //  8 | 28 :                  HUB_DP2 | GND
     -1, 123, //  9 | 29 :                      GND | GPIOH_7
     -1, 122, // 10 | 30 :                  ADC_CH0 | GPIOH_6
     -1, 125, // 11 | 31 :                      GND | GPIOH_9
     -1, 124, // 12 | 32 :                  ADC_CH2 | GPIOH_8
     -1, 136, // 13 | 33 :                    SPDIF | GPIOAO_6
     -1, -1,  // 14 | 34 :                      GND | GND
    135, -1,  // 15 | 35 : (GPIOAO_5) UART_RX_AO_B | PWM_AO_A
    134, -1,  // 16 | 36 : (GPIOAO_4) UART_TX_AO_B | RTC_CLK
     -1, 121, // 17 | 37 :                      GND | GPIOH_5
    121, -1,  // 18 | 38 :      (GPIOAO_1) Linux_RX | PWR_EN
    122, -1,  // 19 | 39 :      (GPIOAO_2) Linux_TX | PWM_F
     -1, -1,  // 20 | 40 :                     3.3V | GND
    -1, -1, -1, -1, -1, -1, -1, -1, -1, -1,
    -1, -1, -1, -1, -1, -1, -1, -1, -1, -1,
    -1, -1, -1, // 41..63
];

// Mux readback probes: which function a pad is muxed to, from the
// pin-mux registers the S905X scatters the fields across.
static ALT_PROBES: [AltProbe; 26] = [
    // GPIODV_24..27
    AltProbe { gpio: 173, window: Window::Periphs, reg: MUX_2, bit: 16, mode: 2 },
    AltProbe { gpio: 173, window: Window::Periphs, reg: MUX_1, bit: 15, mode: 4 },
    AltProbe { gpio: 174, window: Window::Periphs, reg: MUX_2, bit: 15, mode: 2 },
    AltProbe { gpio: 174, window: Window::Periphs, reg: MUX_1, bit: 14, mode: 4 },
    AltProbe { gpio: 175, window: Window::Periphs, reg: MUX_2, bit: 14, mode: 2 },
    AltProbe { gpio: 175, window: Window::Periphs, reg: MUX_1, bit: 13, mode: 4 },
    AltProbe { gpio: 176, window: Window::Periphs, reg: MUX_2, bit: 13, mode: 2 },
    AltProbe { gpio: 176, window: Window::Periphs, reg: MUX_1, bit: 12, mode: 4 },
    // GPIOH_6..9
    AltProbe { gpio: 122, window: Window::Periphs, reg: MUX_6, bit: 26, mode: 4 },
    AltProbe { gpio: 123, window: Window::Periphs, reg: MUX_6, bit: 22, mode: 4 },
    AltProbe { gpio: 123, window: Window::Periphs, reg: MUX_6, bit: 25, mode: 5 },
    AltProbe { gpio: 124, window: Window::Periphs, reg: MUX_6, bit: 21, mode: 4 },
    AltProbe { gpio: 124, window: Window::Periphs, reg: MUX_6, bit: 24, mode: 5 },
    AltProbe { gpio: 125, window: Window::Periphs, reg: MUX_6, bit: 23, mode: 4 },
    // GPIOAO_1..6
    AltProbe { gpio: 131, window: Window::Ao, reg: AO_MUX_1, bit: 11, mode: 2 },
    AltProbe { gpio: 131, window: Window::Ao, reg: AO_MUX_1, bit: 25, mode: 3 },
    AltProbe { gpio: 132, window: Window::Ao, reg: AO_MUX_1, bit: 10, mode: 2 },
    AltProbe { gpio: 132, window: Window::Ao, reg: AO_MUX_1, bit: 8, mode: 3 },
    AltProbe { gpio: 134, window: Window::Ao, reg: AO_MUX_1, bit: 24, mode: 2 },
    AltProbe { gpio: 134, window: Window::Ao, reg: AO_MUX_1, bit: 6, mode: 3 },
    AltProbe { gpio: 134, window: Window::Ao, reg: AO_MUX_1, bit: 2, mode: 4 },
    AltProbe { gpio: 135, window: Window::Ao, reg: AO_MUX_1, bit: 23, mode: 2 },
    AltProbe { gpio: 135, window: Window::Ao, reg: AO_MUX_1, bit: 5, mode: 3 },
    AltProbe { gpio: 135, window: Window::Ao, reg: AO_MUX_1, bit: 1, mode: 4 },
    AltProbe { gpio: 136, window: Window::Ao, reg: AO_MUX_1, bit: 16, mode: 4 },
    AltProbe { gpio: 136, window: Window::Ao, reg: AO_MUX_1, bit: 1, mode: 5 },
];

pub(crate) fn describe() -> BoardDesc {
    BoardDesc {
        model: BoardModel::Vim1,
        pin_base: PIN_BASE,
        periphs_base: GPIO_BASE,
        ao_base: GPIOAO_BASE,
        banks: &BANKS,
        pin_to_gpio: &PIN_TO_GPIO,
        phy_to_gpio: &PHY_TO_GPIO,
        alt: AltReadback::Probe(&ALT_PROBES),
    }
}
