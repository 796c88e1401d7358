//! CLI driver: loads a `.nes` ROM and runs it behind a `macroquad` presenter, or (with
//! no arguments) runs the in-process self-test suite.
//!
//! Exit codes: 0 success, 1 cartridge-format rejection, 2 self-test failure, 23 window
//! closed by the OS, 24 Escape pressed.

use std::cell::RefCell;
use std::rc::Rc;

use macroquad::prelude::*;

use nes_rs::bus::Bus;
use nes_rs::cartridge::Cartridge;
use nes_rs::cpu::CPU;
use nes_rs::joypad::{Joypad, JoypadButton};
use nes_rs::presenter::FramePresenter;
use nes_rs::render::frame::{FrameBuffer, NES_PIXEL_HEIGHT, NES_PIXEL_WIDTH};

mod selftest;

const PIXEL_SCALE: f32 = 3.0;

/// Maps a held keyboard key to the button it drives on both controllers, matching the
/// shift-out order A/B/Select/Start/Up/Down/Left/Right from `Joypad`.
const KEY_BINDINGS: &[(KeyCode, JoypadButton)] = &[
    (KeyCode::Z, JoypadButton::BUTTON_A),
    (KeyCode::X, JoypadButton::BUTTON_B),
    (KeyCode::RightShift, JoypadButton::SELECT),
    (KeyCode::Enter, JoypadButton::START),
    (KeyCode::Up, JoypadButton::UP),
    (KeyCode::Down, JoypadButton::DOWN),
    (KeyCode::Left, JoypadButton::LEFT),
    (KeyCode::Right, JoypadButton::RIGHT),
];

/// Bridges the synchronous `FramePresenter` callback (invoked from inside `bus.tick`,
/// mid-instruction) to the async `macroquad` frame loop: each completed PPU frame is
/// stashed here and drained once per `next_frame().await` in `main`.
struct MacroquadPresenter {
    pending: Rc<RefCell<Option<FrameBuffer>>>,
}

impl FramePresenter for MacroquadPresenter {
    fn present(&mut self, frame: &FrameBuffer, joy1: &mut Joypad, _joy2: &mut Joypad) {
        *self.pending.borrow_mut() = Some(frame.clone());

        let mut buttons = JoypadButton::empty();
        for (key, button) in KEY_BINDINGS {
            if is_key_down(*key) {
                buttons.insert(*button);
            }
        }
        joy1.button_status = buttons;
    }
}

fn frame_to_texture(frame: &FrameBuffer, texture: &Texture2D) {
    let mut image = Image::gen_image_color(NES_PIXEL_WIDTH as u16, NES_PIXEL_HEIGHT as u16, BLACK);
    for y in 0..NES_PIXEL_HEIGHT {
        for x in 0..NES_PIXEL_WIDTH {
            let px = frame.get_pixel(x, y);
            image.set_pixel(x as u32, y as u32, Color::from_rgba(px.0, px.1, px.2, 255));
        }
    }
    texture.update(&image);
}

fn window_conf() -> Conf {
    Conf {
        window_title: "nes_rs".to_owned(),
        window_width: (NES_PIXEL_WIDTH as f32 * PIXEL_SCALE) as i32,
        window_height: (NES_PIXEL_HEIGHT as f32 * PIXEL_SCALE) as i32,
        ..Default::default()
    }
}

#[macroquad::main(window_conf)]
async fn main() {
    env_logger::init();

    let path = std::env::args().nth(1);
    let Some(path) = path else {
        std::process::exit(if selftest::run_all() { 0 } else { 2 });
    };

    let bytes = match std::fs::read(&path) {
        Ok(bytes) => bytes,
        Err(err) => {
            log::error!("failed to read {}: {}", path, err);
            std::process::exit(1);
        }
    };

    let cartridge = match Cartridge::new(&bytes) {
        Ok(cartridge) => cartridge,
        Err(err) => {
            log::error!("rejecting cartridge {}: {}", path, err);
            std::process::exit(1);
        }
    };

    prevent_quit();

    let pending = Rc::new(RefCell::new(None));
    let presenter = MacroquadPresenter { pending: pending.clone() };
    let bus = Bus::with_presenter(cartridge, Box::new(presenter));
    let mut cpu = CPU::new(bus);
    cpu.reset();

    let texture = Texture2D::from_image(&Image::gen_image_color(
        NES_PIXEL_WIDTH as u16,
        NES_PIXEL_HEIGHT as u16,
        BLACK,
    ));
    let dest_size = Some(vec2(
        NES_PIXEL_WIDTH as f32 * PIXEL_SCALE,
        NES_PIXEL_HEIGHT as f32 * PIXEL_SCALE,
    ));

    loop {
        while pending.borrow().is_none() && !cpu.halted {
            cpu.run_once();
        }
        if cpu.halted {
            std::process::exit(0);
        }
        if let Some(frame) = pending.borrow_mut().take() {
            frame_to_texture(&frame, &texture);
        }

        draw_texture_ex(
            &texture,
            0.,
            0.,
            WHITE,
            DrawTextureParams { dest_size, ..Default::default() },
        );

        if is_key_pressed(KeyCode::Escape) {
            std::process::exit(24);
        }
        if is_quit_requested() {
            std::process::exit(23);
        }

        next_frame().await;
    }
}
