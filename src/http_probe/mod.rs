pub mod probe;
pub mod result;

pub mod prelude {
    pub use super::probe::{build_client, probe_url};
    pub use super::result::ProbeAttempt;
}

use std::fmt::Write;

/// Renders an error and its whole source chain; reqwest's top-level message
/// ("error sending request for url ...") rarely names the actual fault.
pub fn report(mut err: &(dyn std::error::Error + 'static)) -> String {
    let mut s = format!("{}", err);
    while let Some(src) = err.source() {
        let _ = write!(s, ": {}", src);
        err = src;
    }
    s
}
