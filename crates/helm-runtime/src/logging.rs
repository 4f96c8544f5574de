//! Subscriber installation from the `logging` settings section.

use helm_core::logging::{init_json_subscriber, init_subscriber};
use helm_settings::LoggingSettings;

/// Install the global subscriber described by `settings`.
///
/// `RUST_LOG` still wins over `settings.level`. Only the first call in a
/// process takes effect.
pub fn init_logging(settings: &LoggingSettings) {
    if settings.json {
        init_json_subscriber(&settings.level);
    } else {
        init_subscriber(&settings.level);
    }
}
