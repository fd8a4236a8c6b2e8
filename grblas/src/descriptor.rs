//! Operation descriptors
//!
//! A descriptor modifies how an operation reads its inputs and writes
//! its output: transposed inputs, complemented or structural masks, and
//! replace-mode output.

/// Modifiers for a single operation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Descriptor {
    /// Use the transpose of the first matrix operand
    pub transpose_a: bool,
    /// Use the transpose of the second matrix operand
    pub transpose_b: bool,
    /// Write only where the mask does NOT allow
    pub complement_mask: bool,
    /// Mask by stored pattern, ignoring mask values
    pub structural_mask: bool,
    /// Clear output entries the mask does not allow
    pub replace: bool,
}

impl Descriptor {
    /// Default descriptor: no transposes, value mask, merge output
    pub const fn new() -> Self {
        Self {
            transpose_a: false,
            transpose_b: false,
            complement_mask: false,
            structural_mask: false,
            replace: false,
        }
    }

    pub const fn transpose_a(mut self) -> Self {
        self.transpose_a = true;
        self
    }

    pub const fn transpose_b(mut self) -> Self {
        self.transpose_b = true;
        self
    }

    pub const fn complement_mask(mut self) -> Self {
        self.complement_mask = true;
        self
    }

    pub const fn structural_mask(mut self) -> Self {
        self.structural_mask = true;
        self
    }

    pub const fn replace(mut self) -> Self {
        self.replace = true;
        self
    }

    /// Transpose first input
    pub const fn t0() -> Self {
        Self::new().transpose_a()
    }

    /// Transpose second input
    pub const fn t1() -> Self {
        Self::new().transpose_b()
    }

    /// Complement mask
    pub const fn c() -> Self {
        Self::new().complement_mask()
    }

    /// Structural mask
    pub const fn s() -> Self {
        Self::new().structural_mask()
    }

    /// Replace output and complement mask
    pub const fn rc() -> Self {
        Self::new().replace().complement_mask()
    }
}
