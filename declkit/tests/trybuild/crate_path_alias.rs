//! Trybuild fixture verifying `#[declkit(crate = "...")]` works with a
//! re-exported runtime crate.

mod reexport {
    pub use declkit as kit;
}

use reexport::kit::{Persistence, RawRepresentable};

/// Generated impls must name the runtime crate through the alias.
#[derive(Debug, PartialEq, Persistence)]
#[declkit(crate = "reexport::kit")]
struct AliasedSettings {
    #[coding_key("n")]
    count: u32,
}

fn main() {
    let settings = AliasedSettings { count: 2 };
    let raw = settings.raw_value();
    assert_eq!(raw, r#"{"n":2}"#);
    assert_eq!(AliasedSettings::from_raw_value(raw), Some(settings));
}
