//! Commands emitted by rule evaluation and routed to providers.

use indexmap::IndexMap;

use crate::id::{DeviceId, FunctionId};
use crate::variant::Variant;

/// A deferred action targeted at an external device.
///
/// Commands are queued by the engine during rule evaluation and drained
/// by the coordinator once per tick, then fanned out to the provider
/// session that owns the target device.
#[derive(Clone, Debug, PartialEq)]
pub struct Command {
    /// Target device.
    pub device: DeviceId,
    /// Function to invoke on the device.
    pub function: FunctionId,
    /// Named arguments, in rule-declaration order.
    pub args: IndexMap<String, Variant>,
}

impl Command {
    /// Construct a command with no arguments.
    pub fn new(device: DeviceId, function: FunctionId) -> Self {
        Self {
            device,
            function,
            args: IndexMap::new(),
        }
    }
}

impl Default for Command {
    fn default() -> Self {
        Self::new(DeviceId::INVALID, FunctionId::INVALID)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_command_uses_sentinels() {
        let cmd = Command::default();
        assert!(!cmd.device.is_valid());
        assert!(!cmd.function.is_valid());
        assert!(cmd.args.is_empty());
    }

    #[test]
    fn args_preserve_insertion_order() {
        let mut cmd = Command::new(DeviceId(0), FunctionId(1));
        cmd.args.insert("z".to_string(), Variant::Int(1));
        cmd.args.insert("a".to_string(), Variant::Bool(true));
        let keys: Vec<&str> = cmd.args.keys().map(String::as_str).collect();
        assert_eq!(keys, vec!["z", "a"]);
    }
}
