//! Adapters: concrete implementations of the hexagonal port traits.
//!
//! | Adapter       | Implements        | Connects to                  |
//! |---------------|-------------------|------------------------------|
//! | `config_file` | ConfigPort        | JSON file on disk            |
//! | `log_sink`    | EventSink         | `log` facade (env_logger)    |
//! | `sim`         | SensorRegistry    | In-memory switches           |
//! |               | StatusSource      | In-memory machine state      |
//! |               | ControlChannel    | Recorded command log         |

pub mod config_file;
pub mod log_sink;
pub mod sim;
