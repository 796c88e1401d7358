//! iNES (.NES) file parser
//!
//! Reference: https://www.nesdev.org/wiki/INES

use crate::error::CartridgeError;

const INES_IDENTIFIER: [u8; 4] = [0x4E, 0x45, 0x53, 0x1A];
const HEADER_SIZE: usize = 16;
const TRAINER_SIZE: usize = 512;
const PRG_ROM_PAGE_SIZE: usize = 16384;
const CHR_ROM_PAGE_SIZE: usize = 8192;
const CHR_RAM_SIZE: usize = 8192;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mirroring {
    Vertical,
    Horizontal,
    FourScreen,
}

/// A parsed, immutable cartridge image: PRG-ROM, CHR storage, mapper id and mirroring.
///
/// `chr_is_ram` distinguishes a writable CHR-RAM bank (header byte 5 == 0) from
/// CHR-ROM; the PPU consults it to decide whether pattern-table writes stick.
pub struct Cartridge {
    pub prg_rom: Vec<u8>,
    pub chr_rom: Vec<u8>,
    pub chr_is_ram: bool,
    pub mapper: u8,
    pub screen_mirroring: Mirroring,
}

impl Cartridge {
    pub fn new(raw: &[u8]) -> Result<Cartridge, CartridgeError> {
        if raw.len() < HEADER_SIZE {
            return Err(CartridgeError::TooShort);
        }
        if raw[0..4] != INES_IDENTIFIER {
            return Err(CartridgeError::BadMagic);
        }

        let mapper = (raw[7] & 0b1111_0000) | (raw[6] >> 4);

        let ines_ver = (raw[7] >> 2) & 0b11;
        if ines_ver != 0 {
            return Err(CartridgeError::Nes2NotSupported);
        }

        let four_screen = raw[6] & 0b1000 != 0;
        let vertical_mirroring = raw[6] & 0b1 != 0;
        let screen_mirroring = match (four_screen, vertical_mirroring) {
            (true, _) => Mirroring::FourScreen,
            (false, true) => Mirroring::Vertical,
            (false, false) => Mirroring::Horizontal,
        };

        let prg_rom_pages = raw[4] as usize;
        let chr_rom_pages = raw[5] as usize;
        let prg_rom_size = prg_rom_pages * PRG_ROM_PAGE_SIZE;
        let chr_rom_size = chr_rom_pages * CHR_ROM_PAGE_SIZE;

        let skip_trainer = raw[6] & 0b100 != 0;
        let prg_rom_start = HEADER_SIZE + if skip_trainer { TRAINER_SIZE } else { 0 };
        let chr_rom_start = prg_rom_start + prg_rom_size;
        let expected_len = chr_rom_start + chr_rom_size;

        if raw.len() < expected_len {
            return Err(CartridgeError::Truncated {
                expected: expected_len,
                actual: raw.len(),
            });
        }

        let chr_is_ram = chr_rom_pages == 0;
        let chr_rom = if chr_is_ram {
            vec![0; CHR_RAM_SIZE]
        } else {
            raw[chr_rom_start..chr_rom_start + chr_rom_size].to_vec()
        };

        log::debug!(
            "loaded cartridge: {} KiB PRG, {} KiB CHR ({}), mapper {}, {:?} mirroring",
            prg_rom_size / 1024,
            chr_rom.len() / 1024,
            if chr_is_ram { "RAM" } else { "ROM" },
            mapper,
            screen_mirroring,
        );

        Ok(Cartridge {
            prg_rom: raw[prg_rom_start..chr_rom_start].to_vec(),
            chr_rom,
            chr_is_ram,
            mapper,
            screen_mirroring,
        })
    }

    /// A blank, mapper-0 cartridge with a full 32 KiB PRG-ROM bank and CHR-RAM:
    /// scaffolding for `CPU::default()` and other call sites that need *a* bus but
    /// don't care what's on it.
    pub fn blank() -> Cartridge {
        Cartridge {
            prg_rom: vec![0; 2 * PRG_ROM_PAGE_SIZE],
            chr_rom: vec![0; CHR_RAM_SIZE],
            chr_is_ram: true,
            mapper: 0,
            screen_mirroring: Mirroring::Horizontal,
        }
    }
}

#[cfg(test)]
pub mod test {
    use super::*;

    /// Builds a minimal, well-formed iNES image with 2 PRG banks and 1 CHR bank,
    /// vertical mirroring and mapper 3. Used throughout the test suite as a stand-in
    /// cartridge; callers set the reset vector themselves.
    pub fn create_test_cartridge() -> Cartridge {
        let mut header = vec![
            0x4E, 0x45, 0x53, 0x1A, 0x02, 0x01, 0x31, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00,
            0x00, 0x00,
        ];
        let mut prg_rom = vec![0; 2 * PRG_ROM_PAGE_SIZE];
        let mut chr_rom = vec![0; CHR_ROM_PAGE_SIZE];
        header.append(&mut prg_rom);
        header.append(&mut chr_rom);
        Cartridge::new(&header).unwrap()
    }

    /// Same as `create_test_cartridge`, but CHR size 0, so the PPU substitutes CHR-RAM.
    pub fn create_test_cartridge_chr_ram() -> Cartridge {
        let mut header = vec![
            0x4E, 0x45, 0x53, 0x1A, 0x02, 0x00, 0x31, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00,
            0x00, 0x00,
        ];
        let mut prg_rom = vec![0; 2 * PRG_ROM_PAGE_SIZE];
        header.append(&mut prg_rom);
        Cartridge::new(&header).unwrap()
    }

    #[test]
    fn test_invalid_ines_identifier() {
        let raw_data = vec![
            0x00, 0x00, 0x00, 0x00, 0x02, 0x01, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00,
            0x00, 0x00,
        ];

        let result = Cartridge::new(&raw_data);
        assert_eq!(result.unwrap_err(), CartridgeError::BadMagic);
    }

    #[test]
    fn test_unsupported_nes_version() {
        let raw_data = vec![
            0x4E, 0x45, 0x53, 0x1A, 0x02, 0x01, 0x00, 0x08, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00,
            0x00, 0x00,
        ];

        let result = Cartridge::new(&raw_data);
        assert_eq!(result.unwrap_err(), CartridgeError::Nes2NotSupported);
    }

    #[test]
    fn test_truncated_file() {
        let raw_data = vec![
            0x4E, 0x45, 0x53, 0x1A, 0x02, 0x01, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00,
            0x00, 0x00,
        ];

        let result = Cartridge::new(&raw_data);
        assert!(matches!(result, Err(CartridgeError::Truncated { .. })));
    }

    #[test]
    fn test_mapper_and_mirroring() {
        let cart = create_test_cartridge();
        assert_eq!(cart.mapper, 3);
        assert_eq!(cart.screen_mirroring, Mirroring::Vertical);
        assert!(!cart.chr_is_ram);
        assert_eq!(cart.chr_rom.len(), CHR_ROM_PAGE_SIZE);
    }

    #[test]
    fn test_chr_ram_substitution() {
        let cart = create_test_cartridge_chr_ram();
        assert!(cart.chr_is_ram);
        assert_eq!(cart.chr_rom.len(), CHR_RAM_SIZE);
    }

    #[test]
    fn test_trainer_offset() {
        let mut header = vec![
            0x4E, 0x45, 0x53, 0x1A, 0x02, 0x01, 0x31 | 0b100, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00,
            0x00, 0x00, 0x00,
        ];
        let mut trainer = vec![0u8; TRAINER_SIZE];
        let mut prg_rom = vec![1; 2 * PRG_ROM_PAGE_SIZE];
        let mut chr_rom = vec![2; CHR_ROM_PAGE_SIZE];
        header.append(&mut trainer);
        header.append(&mut prg_rom);
        header.append(&mut chr_rom);

        let cart = Cartridge::new(&header).unwrap();
        assert_eq!(cart.prg_rom, vec![1; 2 * PRG_ROM_PAGE_SIZE]);
        assert_eq!(cart.chr_rom, vec![2; CHR_ROM_PAGE_SIZE]);
    }
}
