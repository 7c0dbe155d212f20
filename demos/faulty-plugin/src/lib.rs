//! Plugin whose component name cannot be produced.
//!
//! The exported factory panics while evaluating the name. The panic is
//! caught inside this library and the host refuses the empty name, so
//! loading this plugin fails startup instead of aborting the process.

use storeplug::component::Component;

struct Unreachable;

impl Component for Unreachable {
    fn name(&self) -> &str {
        "unreachable"
    }
}

fn component_name() -> &'static str {
    panic!("component name is not configured")
}

fn new_unreachable() -> Box<dyn Component> {
    Box::new(Unreachable)
}

storeplug::export_component!(component_name(), new_unreachable);
