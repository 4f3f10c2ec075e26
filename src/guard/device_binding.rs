//! Device binding validation.
//!
//! Each employee may act from one registered device. The binding is created
//! by the first successful clock-in, never by validation.

use crate::error::Rejection;

/// Outcome of a successful device check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BindingStatus {
    /// The device matches the existing binding.
    Bound,
    /// No device is bound yet; the caller may bind this one.
    Unbound,
}

/// Checks a request's device against the employee's binding.
#[derive(Debug, Clone, Copy, Default)]
pub struct DeviceBindingValidator;

impl DeviceBindingValidator {
    /// Validates `device_id` against the current `binding`.
    ///
    /// An absent binding is accepted as [`BindingStatus::Unbound`]. This
    /// check raises no fraud alert on its own.
    ///
    /// # Examples
    ///
    /// ```
    /// use shift_guard::error::Rejection;
    /// use shift_guard::guard::{BindingStatus, DeviceBindingValidator};
    ///
    /// let validator = DeviceBindingValidator;
    /// assert_eq!(validator.validate(None, "PHONE-1"), Ok(BindingStatus::Unbound));
    /// assert_eq!(validator.validate(Some("PHONE-1"), "PHONE-1"), Ok(BindingStatus::Bound));
    /// assert_eq!(
    ///     validator.validate(Some("PHONE-1"), "PHONE-2"),
    ///     Err(Rejection::DeviceMismatch)
    /// );
    /// ```
    pub fn validate(&self, binding: Option<&str>, device_id: &str) -> Result<BindingStatus, Rejection> {
        let device_id = device_id.trim();
        if device_id.is_empty() {
            return Err(Rejection::MissingDeviceId);
        }

        match binding {
            None => Ok(BindingStatus::Unbound),
            Some(bound) if bound == device_id => Ok(BindingStatus::Bound),
            Some(_) => Err(Rejection::DeviceMismatch),
        }
    }

    /// Like [`validate`](Self::validate), but an absent binding is
    /// [`Rejection::DeviceNotBound`]. Used by actions on an existing shift.
    pub fn require_bound(&self, binding: Option<&str>, device_id: &str) -> Result<(), Rejection> {
        match self.validate(binding, device_id)? {
            BindingStatus::Bound => Ok(()),
            BindingStatus::Unbound => Err(Rejection::DeviceNotBound),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_device_id_is_rejected() {
        let validator = DeviceBindingValidator;
        assert_eq!(validator.validate(None, ""), Err(Rejection::MissingDeviceId));
        assert_eq!(
            validator.validate(Some("PHONE-1"), "   "),
            Err(Rejection::MissingDeviceId)
        );
    }

    #[test]
    fn test_surrounding_whitespace_is_ignored() {
        let validator = DeviceBindingValidator;
        assert_eq!(
            validator.validate(Some("PHONE-1"), " PHONE-1 "),
            Ok(BindingStatus::Bound)
        );
    }

    #[test]
    fn test_require_bound() {
        let validator = DeviceBindingValidator;
        assert_eq!(
            validator.require_bound(None, "PHONE-1"),
            Err(Rejection::DeviceNotBound)
        );
        assert_eq!(validator.require_bound(Some("PHONE-1"), "PHONE-1"), Ok(()));
        assert_eq!(
            validator.require_bound(Some("PHONE-1"), "PHONE-9"),
            Err(Rejection::DeviceMismatch)
        );
    }
}
