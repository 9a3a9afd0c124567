//! Error types for hardware operations.
//!
//! Covers the failure scenarios of the three capabilities this crate
//! abstracts: reader disconnection and initialization failure, relay faults,
//! and non-volatile memory addressing or endurance violations.

/// Result type alias for hardware operations.
pub type Result<T> = std::result::Result<T, HardwareError>;

/// Errors that can occur during hardware device operations.
#[derive(Debug, thiserror::Error)]
pub enum HardwareError {
    /// Device is not connected or has been disconnected.
    #[error("Device disconnected: {device}")]
    Disconnected { device: String },

    /// Device initialization failed.
    ///
    /// For the card reader this is fatal at boot: the controller cannot
    /// operate safely without it.
    #[error("Initialization failed: {message}")]
    InitializationFailed { message: String },

    /// Invalid data received from a device.
    #[error("Invalid data: {message}")]
    InvalidData { message: String },

    /// Non-volatile memory access outside the device capacity.
    #[error("Storage offset {offset} out of bounds (capacity {capacity})")]
    OutOfBounds { offset: usize, capacity: usize },

    /// A non-volatile memory cell has exhausted its write endurance.
    #[error("Write endurance exhausted at offset {offset} after {writes} writes")]
    EnduranceExhausted { offset: usize, writes: u32 },

    /// Generic I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl HardwareError {
    /// Create a new disconnected error.
    pub fn disconnected(device: impl Into<String>) -> Self {
        Self::Disconnected {
            device: device.into(),
        }
    }

    /// Create a new initialization failed error.
    pub fn initialization_failed(message: impl Into<String>) -> Self {
        Self::InitializationFailed {
            message: message.into(),
        }
    }

    /// Create a new invalid data error.
    pub fn invalid_data(message: impl Into<String>) -> Self {
        Self::InvalidData {
            message: message.into(),
        }
    }

    /// Create a new out-of-bounds error.
    pub fn out_of_bounds(offset: usize, capacity: usize) -> Self {
        Self::OutOfBounds { offset, capacity }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_disconnected_error() {
        let error = HardwareError::disconnected("PN532");
        assert!(matches!(error, HardwareError::Disconnected { .. }));
        assert_eq!(error.to_string(), "Device disconnected: PN532");
    }

    #[test]
    fn test_initialization_failed_error() {
        let error = HardwareError::initialization_failed("no firmware response");
        assert_eq!(
            error.to_string(),
            "Initialization failed: no firmware response"
        );
    }

    #[test]
    fn test_out_of_bounds_error() {
        let error = HardwareError::out_of_bounds(601, 601);
        assert_eq!(
            error.to_string(),
            "Storage offset 601 out of bounds (capacity 601)"
        );
    }
}
