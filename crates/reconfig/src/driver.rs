//! Switch driver interface.

use crate::types::Configuration;
use common::Result;

/// Changes the physical state of the switch fabric.
///
/// Both operations are synchronous and return only once the hardware has
/// accepted the change. Any error is fatal to the reconfiguration loop.
#[cfg_attr(test, mockall::automock)]
pub trait SwitchDriver: Send {
    /// Drive every channel to zero
    fn reset_all(&mut self) -> Result<()>;

    /// Apply the fabric settings of `configuration`
    fn apply(&mut self, configuration: &Configuration) -> Result<()>;
}

impl<D: SwitchDriver + ?Sized> SwitchDriver for Box<D> {
    fn reset_all(&mut self) -> Result<()> {
        (**self).reset_all()
    }

    fn apply(&mut self, configuration: &Configuration) -> Result<()> {
        (**self).apply(configuration)
    }
}
