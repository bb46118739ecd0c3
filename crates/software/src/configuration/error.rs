/// Errors that can occur when writing the configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ConfigError {
    /// Component index is out of bounds for the section.
    InvalidIndex,
    /// Value does not fit the section's width or isn't a valid variant of the section's enum.
    ValueOutOfRange,
    /// Preset index is out of bounds.
    InvalidPreset,
}
