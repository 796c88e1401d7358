//! Implementation of controller input ($4016/$4017)
//! Reference: https://www.nesdev.org/wiki/Standard_controller

bitflags! {
    // https://wiki.nesdev.com/w/index.php/Controller_reading_code
    #[derive(Clone, Copy)]
    pub struct JoypadButton: u8 {
        const BUTTON_A  = 1 << 0;
        const BUTTON_B  = 1 << 1;
        const SELECT    = 1 << 2;
        const START     = 1 << 3;
        const UP        = 1 << 4;
        const DOWN      = 1 << 5;
        const LEFT      = 1 << 6;
        const RIGHT     = 1 << 7;
    }
}

/// One standard controller: an 8-bit button latch, a 3-bit read cursor, and the
/// strobe flag shared by the write side. $4016 and $4017 each own one of these.
#[derive(Clone, Copy)]
pub struct Joypad {
    strobe: bool,
    button_index: u8,
    pub button_status: JoypadButton,
}

impl Joypad {
    pub fn new() -> Self {
        Joypad {
            strobe: false,
            button_index: 0,
            button_status: JoypadButton::from_bits_truncate(0),
        }
    }

    pub fn write(&mut self, data: u8) {
        self.strobe = data & 1 == 1;
        if self.strobe {
            self.button_index = 0;
        }
    }

    pub fn read(&mut self) -> u8 {
        if self.button_index > 7 {
            return 0x40;
        }
        let response =
            (self.button_status.bits() & (1 << self.button_index)) >> self.button_index;
        if !self.strobe {
            self.button_index += 1;
        }
        0x40 | response
    }
}

impl Default for Joypad {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_strobe_mode_always_reports_button_a() {
        let mut joypad = Joypad::new();
        joypad.write(1);
        joypad.button_status.insert(JoypadButton::BUTTON_A);
        for _ in 0..5 {
            assert_eq!(joypad.read(), 0x41);
        }
    }

    #[test]
    fn test_button_order_and_cursor_wrap() {
        let mut joypad = Joypad::new();
        joypad.button_status.insert(JoypadButton::RIGHT);
        joypad.write(1);
        joypad.write(0);

        let expected: [u8; 8] = [0, 0, 0, 0, 0, 0, 0, 1];
        for bit in expected {
            assert_eq!(joypad.read() & 1, bit);
        }
        // cursor ran past 7; further reads report 1 with the open-bus high bits set
        assert_eq!(joypad.read(), 0x41);
        assert_eq!(joypad.read(), 0x41);
    }

    #[test]
    fn test_strobe_resets_cursor() {
        let mut joypad = Joypad::new();
        joypad.button_status.insert(JoypadButton::BUTTON_B);
        joypad.write(1);
        joypad.write(0);
        joypad.read();
        joypad.write(1);
        assert_eq!(joypad.read() & 1, 1);
    }
}
