// src/macros.rs

/// Logs a driver notification under the `s33drax::<component>` target.
/// Usage:
/// ```rust
/// use s33drax::{drv_log, log::Level};
///
/// drv_log!(Level::Info, "open", "{}: opened device", "s33drax");
/// ```
/// With the tester's logger installed this prints:
/// [2025-04-25T16:32:10+02:00][INFO ][s33drax::open][pid=4568][tid=ThreadId(1)] s33drax: opened device
#[macro_export]
macro_rules! drv_log {
    ($level:expr, $component:expr, $fmt:expr $(, $($arg:tt)+)?) => {
        $crate::log::log!(
            target: concat!("s33drax::", $component),
            $level,
            $fmt
            $(, $($arg)+)?
        )
    };
}
