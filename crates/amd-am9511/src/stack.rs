//! The 16-byte circular operand stack.
//!
//! The pointer addresses the next free slot; multi-byte operands sit in
//! the bytes immediately below it, least significant byte first. Pushing
//! past capacity silently overwrites the oldest bytes, exactly as the
//! hardware does. All offset arithmetic funnels through [`Stack::index`]
//! so the mod-16 wrap is computed in one place.

pub struct Stack {
    bytes: [u8; 16],
    /// Next free slot, always in 0..16.
    ptr: u8,
}

impl Stack {
    #[must_use]
    pub fn new() -> Self {
        Self {
            bytes: [0; 16],
            ptr: 0,
        }
    }

    pub fn reset(&mut self) {
        self.bytes = [0; 16];
        self.ptr = 0;
    }

    /// Resolve a signed offset from the pointer to a buffer index.
    fn index(&self, offset: i32) -> usize {
        ((i32::from(self.ptr) + offset) & 0xF) as usize
    }

    /// Store at the pointer and advance it.
    pub fn push(&mut self, v: u8) {
        self.bytes[self.index(0)] = v;
        self.ptr = self.index(1) as u8;
    }

    /// Retreat the pointer and return the byte it lands on.
    pub fn pop(&mut self) -> u8 {
        self.ptr = self.index(-1) as u8;
        self.bytes[self.index(0)]
    }

    /// Read a byte at a signed offset without moving the pointer.
    /// Offset -1 is the byte pushed last.
    #[must_use]
    pub fn get(&self, offset: i32) -> u8 {
        self.bytes[self.index(offset)]
    }

    /// Write a byte at a signed offset without moving the pointer.
    pub fn set(&mut self, offset: i32, v: u8) {
        let i = self.index(offset);
        self.bytes[i] = v;
    }

    /// Read an N-byte little-endian operand starting at a signed offset.
    #[must_use]
    pub fn read<const N: usize>(&self, offset: i32) -> [u8; N] {
        let mut out = [0; N];
        for (i, b) in out.iter_mut().enumerate() {
            *b = self.get(offset + i as i32);
        }
        out
    }

    /// Write an N-byte little-endian operand starting at a signed offset.
    pub fn write<const N: usize>(&mut self, offset: i32, bytes: [u8; N]) {
        for (i, b) in bytes.into_iter().enumerate() {
            self.set(offset + i as i32, b);
        }
    }

    /// Move the pointer by a signed delta, mod 16.
    pub fn adjust(&mut self, delta: i32) {
        self.ptr = self.index(delta) as u8;
    }
}

impl Default for Stack {
    fn default() -> Self {
        Self::new()
    }
}
