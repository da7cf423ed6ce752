/// Name used for the device number region, the class and the node.
pub const DEVICE_NAME: &str = "s33drax";
/// Node the host publishes for `DEVICE_NAME`.
pub const DEVICE_PATH: &str = "/dev/s33drax";
/// Default size of the shared buffer, in bytes.
pub const BUF_LENGTH: usize = 1024;

/// Directory device nodes live under.
pub const DEV_DIR: &str = "/dev";
