//! An implementation of the NES picture processing unit.
//! Reference: https://www.nesdev.org/wiki/PPU

use log::debug;

use crate::cartridge::Mirroring;
use crate::render::frame::FrameBuffer;
use crate::render;
use registers::addr::PPUADDR;
use registers::controller::PPUCTRL;
use registers::mask::PPUMASK;
use registers::scroll::PPUSCROLL;
use registers::status::PPUSTATUS;

pub mod registers;

// Memory map constants.
const CHR_ROM_START: u16 = 0x0000;
const CHR_ROM_END: u16 = 0x1fff;
const VRAM_START: u16 = 0x2000;
const VRAM_END: u16 = 0x2fff;
const UNUSED_START: u16 = 0x3000;
const UNUSED_END: u16 = 0x3eff;
const PALETTE_TABLE_START: u16 = 0x3f00;
const PALETTE_TABLE_END: u16 = 0x3fff;

const NAMETABLE_SIZE: u16 = 0x0400;

// Storage size constants.
const PALETTE_TABLE_SIZE: usize = 32;
const VRAM_SIZE: usize = 2048;
const OAM_DATA_SIZE: usize = 256;

pub struct PPU {
    pub chr_rom: Vec<u8>,
    pub chr_is_ram: bool,
    pub palette_table: [u8; PALETTE_TABLE_SIZE],
    pub vram: [u8; VRAM_SIZE],
    pub oam_data: [u8; OAM_DATA_SIZE],

    pub controller: PPUCTRL,
    pub ppu_addr: PPUADDR,
    pub mirroring: Mirroring,
    pub ppu_mask: PPUMASK,
    pub oam_addr: u8,
    pub ppu_scroll: PPUSCROLL,
    pub status: PPUSTATUS,

    // Shared by PPUSCROLL/PPUADDR: true means the next write is the "first" (hi/x) half.
    w_latch: bool,
    internal_data_buf: u8,

    pub scanline: u16,
    pub cycles: usize,

    pub nmi_pending: bool,
}

impl PPU {
    pub fn new(chr_rom: Vec<u8>, chr_is_ram: bool, mirroring: Mirroring) -> Self {
        if mirroring == Mirroring::FourScreen {
            panic!("four-screen mirroring is not supported");
        }

        PPU {
            chr_rom,
            chr_is_ram,
            mirroring,
            controller: PPUCTRL::new(),
            palette_table: [0; PALETTE_TABLE_SIZE],
            vram: [0; VRAM_SIZE],
            oam_data: [0; OAM_DATA_SIZE],
            ppu_addr: PPUADDR::new(),
            ppu_mask: PPUMASK::new(),
            ppu_scroll: PPUSCROLL::new(),
            status: PPUSTATUS::new(),
            oam_addr: 0,

            w_latch: true,
            internal_data_buf: 0,

            scanline: 0,
            cycles: 21,

            nmi_pending: false,
        }
    }

    pub fn tick(&mut self, cycles: usize) -> bool {
        self.cycles += cycles;

        let mut frame_complete = false;

        while self.cycles >= 341 {
            if self.sprite_zero_hit(self.cycles) {
                self.status.set(PPUSTATUS::SPRITE_ZERO_HIT, true);
            }

            self.cycles -= 341;
            self.scanline += 1;

            if self.scanline == 241 {
                self.status.set(PPUSTATUS::VBLANK_STARTED, true);
                self.status.set(PPUSTATUS::SPRITE_ZERO_HIT, false);
                if self.controller.generate_nmi() {
                    self.nmi_pending = true;
                }
            }

            if self.scanline >= 262 {
                self.scanline = 0;
                self.nmi_pending = false;
                self.status.set(PPUSTATUS::VBLANK_STARTED, false);
                self.status.set(PPUSTATUS::SPRITE_ZERO_HIT, false);
                frame_complete = true;
            }
        }

        frame_complete
    }

    fn sprite_zero_hit(&self, dot: usize) -> bool {
        let y = self.oam_data[0] as u16;
        let x = self.oam_data[3] as usize;
        y == self.scanline && x <= dot && self.ppu_mask.show_sprites()
    }

    pub fn write_to_controller(&mut self, value: u8) {
        let before_nmi = self.controller.generate_nmi();
        self.controller = PPUCTRL::from_bits_truncate(value);
        let after_nmi = self.controller.generate_nmi();

        if !before_nmi && after_nmi && self.status.contains(PPUSTATUS::VBLANK_STARTED) {
            self.nmi_pending = true;
        }

        debug!("PPUCTRL <- {:#04x}", value);
    }

    pub fn write_to_mask(&mut self, value: u8) {
        self.ppu_mask = PPUMASK::from_bits_truncate(value);
        debug!("PPUMASK <- {:#04x}", value);
    }

    pub fn read_status(&mut self) -> u8 {
        let data = self.status.bits();
        self.status.set(PPUSTATUS::VBLANK_STARTED, false);
        self.w_latch = true;
        data
    }

    pub fn write_to_oam_addr(&mut self, value: u8) {
        self.oam_addr = value;
    }

    pub fn write_to_oam_data(&mut self, value: u8) {
        self.oam_data[self.oam_addr as usize] = value;
        self.oam_addr = self.oam_addr.wrapping_add(1);
    }

    pub fn read_oam_data(&self) -> u8 {
        self.oam_data[self.oam_addr as usize]
    }

    pub fn write_oam_dma(&mut self, buffer: &[u8; 256]) {
        for byte in buffer.iter() {
            self.oam_data[self.oam_addr as usize] = *byte;
            self.oam_addr = self.oam_addr.wrapping_add(1);
        }
    }

    pub fn write_to_scroll(&mut self, value: u8) {
        self.ppu_scroll.write(value, self.w_latch);
        self.w_latch = !self.w_latch;
        debug!("PPUSCROLL <- {:#04x}", value);
    }

    pub fn write_to_ppu_addr(&mut self, value: u8) {
        self.ppu_addr.update(value, self.w_latch);
        self.w_latch = !self.w_latch;
        debug!("PPUADDR <- {:#04x}", value);
    }

    fn increment_vram_addr(&mut self) {
        self.ppu_addr.increment(self.controller.vram_addr_increment());
    }

    pub fn write_to_data(&mut self, value: u8) {
        let addr = self.ppu_addr.get();
        match addr {
            CHR_ROM_START..=CHR_ROM_END => {
                if self.chr_is_ram {
                    self.chr_rom[addr as usize] = value;
                }
            }
            VRAM_START..=VRAM_END => self.vram[self.mirror_vram_addr(addr) as usize] = value,
            UNUSED_START..=UNUSED_END => {
                self.vram[self.mirror_vram_addr(addr - 0x1000) as usize] = value
            }

            // $3f10, $3f14, $3f18, $3f1c are mirrors of $3f00, $3f04, $3f08, $3f0c respectively.
            // Reference: https://www.nesdev.org/wiki/PPU_palettes
            0x3f10 | 0x3f14 | 0x3f18 | 0x3f1c => {
                self.palette_table[(addr - 0x10 - PALETTE_TABLE_START) as usize] = value;
            }

            PALETTE_TABLE_START..=PALETTE_TABLE_END => {
                self.palette_table[(addr - PALETTE_TABLE_START) as usize] = value;
            }

            _ => panic!("unexpected access to mirrored space {}", addr),
        }
        self.increment_vram_addr();
    }

    pub fn read_data(&mut self) -> u8 {
        let addr = self.ppu_addr.get();
        self.increment_vram_addr();

        match addr {
            CHR_ROM_START..=CHR_ROM_END => {
                let result = self.internal_data_buf;
                self.internal_data_buf = self.chr_rom[addr as usize];
                result
            }
            VRAM_START..=VRAM_END => {
                let result = self.internal_data_buf;
                self.internal_data_buf = self.vram[self.mirror_vram_addr(addr) as usize];
                result
            }
            UNUSED_START..=UNUSED_END => {
                panic!("addr space 0x3000 ~ 0x3eff should not be read from, requested = {}", addr)
            }
            0x3f10 | 0x3f14 | 0x3f18 | 0x3f1c => {
                let mirrored = addr - 0x10;
                self.internal_data_buf = self.vram[self.mirror_vram_addr(mirrored - 0x1000) as usize];
                self.palette_table[(mirrored - PALETTE_TABLE_START) as usize]
            }
            PALETTE_TABLE_START..=PALETTE_TABLE_END => {
                self.internal_data_buf = self.vram[self.mirror_vram_addr(addr - 0x1000) as usize];
                self.palette_table[(addr - PALETTE_TABLE_START) as usize]
            }
            _ => panic!("unexpected access to mirrored space {}", addr),
        }
    }

    // Nametables:
    // [ 0 ] [ 1 ]
    // [ 2 ] [ 3 ]
    //
    // Horizontal:
    // [ A ] [ a ]
    // [ B ] [ b ]
    //
    // Vertical:
    // [ A ] [ B ]
    // [ a ] [ b ]
    //
    // Maps into VRAM.
    pub fn mirror_vram_addr(&self, addr: u16) -> u16 {
        // Maps into 0x2000 -> 0x2fff, in case data is not there
        let mirrored_vram = addr & 0x2fff;
        let vram_index = mirrored_vram - VRAM_START;
        let name_table = vram_index / NAMETABLE_SIZE;
        match (&self.mirroring, name_table) {
            (Mirroring::Vertical, 2) | (Mirroring::Vertical, 3) => vram_index - (2 * NAMETABLE_SIZE),
            (Mirroring::Horizontal, 2) => vram_index - NAMETABLE_SIZE,
            (Mirroring::Horizontal, 1) => vram_index - NAMETABLE_SIZE,
            (Mirroring::Horizontal, 3) => vram_index - (2 * NAMETABLE_SIZE),
            _ => vram_index,
        }
    }

    /// Renders the current PPU state into a framebuffer. Called by the bus on frame
    /// completion.
    pub fn render(&self) -> FrameBuffer {
        render::render(self)
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::cartridge::test::create_test_cartridge;

    fn new_test_ppu() -> PPU {
        let cart = create_test_cartridge();
        PPU::new(cart.chr_rom, cart.chr_is_ram, cart.screen_mirroring)
    }

    #[test]
    fn test_vram_writes() {
        let mut ppu = new_test_ppu();
        ppu.write_to_ppu_addr(0x23);
        ppu.write_to_ppu_addr(0x05);
        ppu.write_to_data(0x66);
        assert_eq!(ppu.vram[0x0305], 0x66);
    }

    #[test]
    fn test_ppu_vram_reads() {
        let mut ppu = new_test_ppu();
        ppu.write_to_controller(0);
        ppu.vram[0x0305] = 0x66;

        ppu.write_to_ppu_addr(0x23);
        ppu.write_to_ppu_addr(0x05);

        ppu.read_data(); // load into buffer
        assert_eq!(ppu.ppu_addr.get(), 0x2306);
        assert_eq!(ppu.read_data(), 0x66);
    }

    #[test]
    fn test_status_read_resets_latch() {
        let mut ppu = new_test_ppu();
        ppu.write_to_ppu_addr(0x21);
        ppu.read_status();
        ppu.write_to_ppu_addr(0x23);
        ppu.write_to_ppu_addr(0x05);
        ppu.read_data();
        assert_eq!(ppu.read_data(), 0);
    }

    #[test]
    fn test_ppu_vram_mirroring() {
        let mut ppu = new_test_ppu();
        ppu.write_to_controller(0);
        ppu.vram[0x0305] = 0x66;

        ppu.write_to_ppu_addr(0x63);
        ppu.write_to_ppu_addr(0x05);

        ppu.read_data();
        assert_eq!(ppu.read_data(), 0x66);
    }

    #[test]
    fn test_read_status_resets_vblank() {
        let mut ppu = new_test_ppu();
        ppu.status.set(PPUSTATUS::VBLANK_STARTED, true);
        let status = ppu.read_status();
        assert_eq!(status >> 7, 1);
        assert_eq!(ppu.status.bits() >> 7, 0);
    }

    #[test]
    fn test_oam_read_write() {
        let mut ppu = new_test_ppu();
        ppu.write_to_oam_addr(0x10);
        ppu.write_to_oam_data(0x66);
        ppu.write_to_oam_data(0x77);

        ppu.write_to_oam_addr(0x10);
        assert_eq!(ppu.read_oam_data(), 0x66);

        ppu.write_to_oam_addr(0x11);
        assert_eq!(ppu.read_oam_data(), 0x77);
    }

    #[test]
    fn test_oam_dma() {
        let mut ppu = new_test_ppu();
        let mut buffer = [0x66; 256];
        buffer[1] = 0x77;
        buffer[255] = 0x88;

        ppu.write_to_oam_addr(0x00);
        ppu.write_oam_dma(&buffer);

        ppu.write_to_oam_addr(0x00);
        assert_eq!(ppu.read_oam_data(), 0x66);
        ppu.write_to_oam_addr(0x01);
        assert_eq!(ppu.read_oam_data(), 0x77);
        ppu.write_to_oam_addr(0xff);
        assert_eq!(ppu.read_oam_data(), 0x88);
    }

    #[test]
    fn test_palette_mirroring() {
        let mut ppu = new_test_ppu();
        ppu.write_to_ppu_addr(0x3f);
        ppu.write_to_ppu_addr(0x10);
        ppu.write_to_data(0x32);
        assert_eq!(ppu.palette_table[0x00], 0x32);

        // Palette reads are unbuffered, so $3F00 reads the byte $3F10 just wrote.
        ppu.write_to_ppu_addr(0x3f);
        ppu.write_to_ppu_addr(0x00);
        assert_eq!(ppu.read_data(), 0x32);

        ppu.write_to_ppu_addr(0x3f);
        ppu.write_to_ppu_addr(0x00);
        ppu.write_to_data(0x33);
        assert_eq!(ppu.palette_table[0x00], 0x33);

        ppu.write_to_ppu_addr(0x3f);
        ppu.write_to_ppu_addr(0x10);
        assert_eq!(ppu.read_data(), 0x33);
    }

    #[test]
    fn test_vblank_set_on_scanline_241() {
        let mut ppu = new_test_ppu();
        ppu.write_to_controller(0b1000_0000);
        assert!(!ppu.nmi_pending);
        ppu.tick(341 * 241);
        assert!(ppu.status.contains(PPUSTATUS::VBLANK_STARTED));
        assert!(ppu.nmi_pending);
    }

    #[test]
    fn test_frame_completes_at_scanline_262() {
        let mut ppu = new_test_ppu();
        let mut completed = false;
        for _ in 0..262 {
            completed = ppu.tick(341) || completed;
        }
        assert!(completed);
        assert_eq!(ppu.scanline, 0);
        assert!(!ppu.status.contains(PPUSTATUS::VBLANK_STARTED));
    }

    #[test]
    fn test_nametable_mirror_vertical() {
        let ppu = new_test_ppu();
        // 0x2800 is nametable 2, should mirror to same offset as nametable 0 under Vertical.
        assert_eq!(ppu.mirror_vram_addr(0x2800), ppu.mirror_vram_addr(0x2000));
    }

    #[test]
    #[should_panic]
    fn test_four_screen_mirroring_rejected() {
        PPU::new(vec![0; 8192], false, Mirroring::FourScreen);
    }
}
