//! Filter and address mode enums.

/// Texture filtering mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum FilterMode {
    /// Nearest neighbor filtering.
    #[default]
    Nearest,
    /// Linear filtering.
    Linear,
}

/// Texture address mode (wrapping behavior).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum AddressMode {
    /// Repeat.
    #[default]
    Repeat,
    /// Clamp to edge.
    ClampToEdge,
    /// Mirrored repeat.
    MirrorRepeat,
}

/// Comparison function for depth/shadow sampling.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CompareFunction {
    /// Never pass.
    Never,
    /// Pass if less than.
    Less,
    /// Pass if equal.
    Equal,
    /// Pass if less than or equal.
    LessEqual,
    /// Pass if greater than.
    Greater,
    /// Pass if not equal.
    NotEqual,
    /// Pass if greater than or equal.
    GreaterEqual,
    /// Always pass.
    Always,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        assert_eq!(FilterMode::default(), FilterMode::Nearest);
        assert_eq!(AddressMode::default(), AddressMode::Repeat);
    }
}
