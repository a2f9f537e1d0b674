pub mod health;
pub mod probe;
pub mod result;
pub mod retry;
pub mod tls;

pub mod prelude {
    pub use super::probe::{build_client, probe_url};
    pub use super::result::{HttpResponse, ProbeErrorKind, ProbeOutcome, ProbeResult};
    pub use super::retry::{Retried, RetryPolicy, retry};
}

use std::fmt::Write;

/// Render an error and its whole `source()` chain on a single line.
pub(crate) fn report(mut err: &(dyn std::error::Error + 'static)) -> String {
    let mut s = format!("{}", err);
    while let Some(src) = err.source() {
        let _ = write!(s, ": {}", src);
        err = src;
    }
    s
}
