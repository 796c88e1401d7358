//! Composes a [`FrameBuffer`] out of the PPU's nametables, pattern tables, palette RAM
//! and OAM. Called once per completed frame.

use crate::cartridge::Mirroring;
use crate::ppu::palette::{Rgb, SYSTEM_PALETTE};
use crate::ppu::PPU;
use frame::FrameBuffer;

pub mod frame;

/// An axis-aligned pixel rectangle used to clip a nametable's contribution to the
/// framebuffer when the current scroll splits it across two nametables.
struct Rect {
    x1: usize,
    y1: usize,
    x2: usize,
    y2: usize,
}

impl Rect {
    fn new(x1: usize, y1: usize, x2: usize, y2: usize) -> Self {
        Rect { x1, y1, x2, y2 }
    }
}

pub fn render(ppu: &PPU) -> FrameBuffer {
    let mut frame = FrameBuffer::new();

    let scroll_x = ppu.ppu_scroll.scroll_x as usize;
    let scroll_y = ppu.ppu_scroll.scroll_y as usize;

    let (main_nametable, second_nametable) =
        match (ppu.mirroring, ppu.controller.nametable_base()) {
            (Mirroring::Vertical, 0x2000)
            | (Mirroring::Vertical, 0x2800)
            | (Mirroring::Horizontal, 0x2000)
            | (Mirroring::Horizontal, 0x2400) => {
                (&ppu.vram[0..0x400], &ppu.vram[0x400..0x800])
            }
            (Mirroring::Vertical, 0x2400)
            | (Mirroring::Vertical, 0x2c00)
            | (Mirroring::Horizontal, 0x2800)
            | (Mirroring::Horizontal, 0x2c00) => {
                (&ppu.vram[0x400..0x800], &ppu.vram[0..0x400])
            }
            (mirroring, base) => {
                panic!("unsupported nametable/mirroring combination {:?}/{:#06x}", mirroring, base)
            }
        };

    render_name_table(
        ppu,
        &mut frame,
        main_nametable,
        Rect::new(scroll_x, scroll_y, 256, 240),
        -(scroll_x as isize),
        -(scroll_y as isize),
    );

    if scroll_x > 0 {
        render_name_table(
            ppu,
            &mut frame,
            second_nametable,
            Rect::new(0, 0, scroll_x, 240),
            (256 - scroll_x) as isize,
            0,
        );
    } else if scroll_y > 0 {
        render_name_table(
            ppu,
            &mut frame,
            second_nametable,
            Rect::new(0, 0, 256, scroll_y),
            0,
            (240 - scroll_y) as isize,
        );
    }

    render_sprites(ppu, &mut frame);

    frame
}

fn bg_palette(ppu: &PPU, nametable: &[u8], tile_col: usize, tile_row: usize) -> [Rgb; 4] {
    let attr_table_idx = (tile_row / 4) * 8 + (tile_col / 4);
    let attr_byte = nametable[0x3c0 + attr_table_idx];

    let palette_idx = match (tile_col % 4 / 2, tile_row % 4 / 2) {
        (0, 0) => attr_byte & 0b11,
        (1, 0) => (attr_byte >> 2) & 0b11,
        (0, 1) => (attr_byte >> 4) & 0b11,
        (1, 1) => (attr_byte >> 6) & 0b11,
        (_, _) => unreachable!(),
    };

    let palette_start = 1 + (palette_idx as usize) * 4;
    [
        SYSTEM_PALETTE[ppu.palette_table[0] as usize],
        SYSTEM_PALETTE[ppu.palette_table[palette_start] as usize],
        SYSTEM_PALETTE[ppu.palette_table[palette_start + 1] as usize],
        SYSTEM_PALETTE[ppu.palette_table[palette_start + 2] as usize],
    ]
}

fn sprite_palette(ppu: &PPU, palette_idx: u8) -> [Rgb; 4] {
    let start = 0x11 + (palette_idx as usize) * 4;
    [
        Rgb(0, 0, 0),
        SYSTEM_PALETTE[ppu.palette_table[start] as usize],
        SYSTEM_PALETTE[ppu.palette_table[start + 1] as usize],
        SYSTEM_PALETTE[ppu.palette_table[start + 2] as usize],
    ]
}

fn render_name_table(
    ppu: &PPU,
    frame: &mut FrameBuffer,
    nametable: &[u8],
    viewport: Rect,
    shift_x: isize,
    shift_y: isize,
) {
    let bank = ppu.controller.background_pattern_addr() as usize;

    for i in 0..0x3c0 {
        let tile_col = i % 32;
        let tile_row = i / 32;
        let tile_idx = nametable[i] as usize;
        let tile = &ppu.chr_rom[(bank + tile_idx * 16)..(bank + tile_idx * 16 + 16)];
        let palette = bg_palette(ppu, nametable, tile_col, tile_row);

        for y in 0..8 {
            let mut upper = tile[y];
            let mut lower = tile[y + 8];

            for x in (0..8).rev() {
                let value = (1 & lower) << 1 | (1 & upper);
                upper >>= 1;
                lower >>= 1;
                let rgb = match value {
                    0 | 1 | 2 | 3 => palette[value as usize],
                    _ => unreachable!(),
                };
                let pixel_x = tile_col * 8 + x;
                let pixel_y = tile_row * 8 + y;

                if pixel_x >= viewport.x1
                    && pixel_x < viewport.x2
                    && pixel_y >= viewport.y1
                    && pixel_y < viewport.y2
                {
                    frame.set_pixel(
                        (shift_x + pixel_x as isize) as usize,
                        (shift_y + pixel_y as isize) as usize,
                        rgb,
                    );
                }
            }
        }
    }
}

fn render_sprites(ppu: &PPU, frame: &mut FrameBuffer) {
    for i in (0..ppu.oam_data.len()).step_by(4).rev() {
        let tile_idx = ppu.oam_data[i + 1] as usize;
        let tile_x = ppu.oam_data[i + 3] as usize;
        let tile_y = ppu.oam_data[i] as usize;

        let flip_vertical = ppu.oam_data[i + 2] >> 7 & 1 == 1;
        let flip_horizontal = ppu.oam_data[i + 2] >> 6 & 1 == 1;
        let palette_idx = ppu.oam_data[i + 2] & 0b11;
        let sprite_palette = sprite_palette(ppu, palette_idx);

        let bank = ppu.controller.sprite_pattern_addr() as usize;
        let tile = &ppu.chr_rom[(bank + tile_idx * 16)..(bank + tile_idx * 16 + 16)];

        for y in 0..8 {
            let mut upper = tile[y];
            let mut lower = tile[y + 8];

            'x: for x in (0..8).rev() {
                let value = (1 & lower) << 1 | (1 & upper);
                upper >>= 1;
                lower >>= 1;
                let rgb = match value {
                    0 => continue 'x, // transparent.
                    1 | 2 | 3 => sprite_palette[value as usize],
                    _ => unreachable!(),
                };

                match (flip_horizontal, flip_vertical) {
                    (false, false) => frame.set_pixel(tile_x + x, tile_y + y, rgb),
                    (true, false) => frame.set_pixel(tile_x + 7 - x, tile_y + y, rgb),
                    (false, true) => frame.set_pixel(tile_x + x, tile_y + 7 - y, rgb),
                    (true, true) => frame.set_pixel(tile_x + 7 - x, tile_y + 7 - y, rgb),
                }
            }
        }
    }
}
