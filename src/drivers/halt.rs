//! Terminal halt for unrecoverable configuration errors.
//!
//! There is no recovery path: the record is logged and the calling thread
//! stops for good.  On target, a hardware watchdog (if enabled in sdkconfig)
//! turns this into a reset.

use log::error;

use crate::diagnostics::FatalRecord;

pub fn halt(record: &FatalRecord) -> ! {
    error!(
        "HALT in {:?} at tick {}: {}",
        record.state, record.tick, record.reason
    );
    loop {
        std::thread::park();
    }
}
