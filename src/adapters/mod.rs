//! Adapters: concrete implementations of the hexagonal port traits.
//!
//! | Adapter        | Implements                     | Connects to                 |
//! |----------------|--------------------------------|-----------------------------|
//! | `hardware`     | PlatformPort, AlarmPort,       | power mgmt, esp_timer,      |
//! |                | SensorPort, IdlePort, HaltPort | LIS2DE12, task notification |
//! | `log_sink`     | EventSink                      | Serial log output           |

pub mod hardware;
pub mod log_sink;
