//! memory provides the 64k machine image the assembler writes into along
//! with the export helpers used to persist it.

use std::fmt;

pub mod ihex;

#[cfg(test)]
mod tests;

/// Size of a complete image. IL addresses are 16 bit.
pub const MAX_SIZE: usize = 65536;

/// Representation of IL program memory.
pub trait Memory {
    /// Return the byte at `addr`.
    fn read(&self, addr: u16) -> u8;
    /// Set the byte at `addr`.
    fn write(&mut self, addr: u16, val: u8);
}

impl Memory for [u8; MAX_SIZE] {
    fn read(&self, addr: u16) -> u8 {
        self[usize::from(addr)]
    }
    fn write(&mut self, addr: u16, val: u8) {
        self[usize::from(addr)] = val;
    }
}

/// `Image` is a zero initialized 64k block. It's boxed so passing one
/// around moves a pointer and not the whole block.
#[derive(Clone, PartialEq, Eq)]
pub struct Image {
    memory: Box<[u8; MAX_SIZE]>,
}

impl Memory for Image {
    fn read(&self, addr: u16) -> u8 {
        self.memory[usize::from(addr)]
    }
    fn write(&mut self, addr: u16, val: u8) {
        self.memory[usize::from(addr)] = val;
    }
}

impl Default for Image {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Image {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let used = self.memory.iter().filter(|b| **b != 0).count();
        write!(f, "Image {{ {used} non-zero bytes }}")
    }
}

impl Image {
    /// Returns an all zero image.
    #[must_use]
    pub fn new() -> Self {
        Image {
            memory: Box::new([0; MAX_SIZE]),
        }
    }

    /// `load` copies `bytes` into a new image starting at `offset`.
    /// Anything which would land past the end of the image is dropped
    /// and the number of bytes actually copied is returned alongside.
    #[must_use]
    pub fn load(bytes: &[u8], offset: u16) -> (Self, usize) {
        let mut img = Self::new();
        let start = usize::from(offset);
        let len = bytes.len().min(MAX_SIZE - start);
        img.memory[start..start + len].copy_from_slice(&bytes[..len]);
        (img, len)
    }

    /// `store` writes `data` starting at `addr`. Nothing is written and false
    /// is returned if any of it would land past the end of the image.
    pub fn store(&mut self, addr: u32, data: &[u8]) -> bool {
        let Ok(start) = usize::try_from(addr) else {
            return false;
        };
        match start.checked_add(data.len()) {
            Some(end) if end <= MAX_SIZE => {
                self.memory[start..end].copy_from_slice(data);
                true
            }
            _ => false,
        }
    }

    /// The full 64k block.
    #[must_use]
    pub fn bytes(&self) -> &[u8; MAX_SIZE] {
        &self.memory
    }

    /// `export` returns the leading part of the image sized by `export_size`
    /// for the given final address.
    #[must_use]
    pub fn export(&self, final_address: u32) -> &[u8] {
        &self.memory[..export_size(final_address)]
    }
}

/// `export_size` returns the smallest power of two strictly greater than
/// `final_address`, capped at the image size.
#[must_use]
pub fn export_size(final_address: u32) -> usize {
    // Can't overflow as anything past the cap is clamped first.
    let clamped = final_address.min(MAX_SIZE as u32 - 1);
    (clamped + 1).next_power_of_two() as usize
}
