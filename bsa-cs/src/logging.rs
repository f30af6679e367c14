//! Tracing setup
//!
//! The subscriber is installed before configuration is loaded so config
//! resolution is logged. The configured level is applied afterwards through
//! a reload handle unless `RUST_LOG` is set.

use bsa_common::{Error, Result};
use tracing::subscriber::Subscriber;
use tracing_subscriber::fmt::MakeWriter;
use tracing_subscriber::{layer::SubscriberExt, reload, EnvFilter, Registry};

/// Handle for swapping the active filter
pub type FilterHandle = reload::Handle<EnvFilter, Registry>;

/// Filter directives for this service's crates at `level`
pub fn directives(level: &str) -> String {
    format!(
        "bsa_cs={level},bsa_common={level},tower_http={level}",
        level = level
    )
}

/// `RUST_LOG` if set, otherwise info for this service's crates
pub fn bootstrap_filter() -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| directives("info").into())
}

/// Reloadable subscriber writing formatted events to `writer`
pub fn subscriber<W>(
    filter: EnvFilter,
    writer: W,
) -> (impl Subscriber + Send + Sync + 'static, FilterHandle)
where
    W: for<'a> MakeWriter<'a> + Send + Sync + 'static,
{
    let (filter_layer, handle) = reload::Layer::new(filter);
    let subscriber = tracing_subscriber::registry()
        .with(filter_layer)
        .with(tracing_subscriber::fmt::layer().with_writer(writer));
    (subscriber, handle)
}

/// Install the global subscriber (stdout)
pub fn init() -> Result<FilterHandle> {
    let (subscriber, handle) = subscriber(bootstrap_filter(), std::io::stdout);
    tracing::subscriber::set_global_default(subscriber)
        .map_err(|e| Error::Config(format!("Tracing already initialized: {}", e)))?;
    Ok(handle)
}

/// Switch to the configured level
pub fn apply_level(handle: &FilterHandle, level: &str) -> Result<()> {
    let filter = EnvFilter::try_new(directives(level))
        .map_err(|e| Error::Config(format!("Invalid log level {:?}: {}", level, e)))?;
    handle
        .reload(filter)
        .map_err(|e| Error::Config(format!("Failed to apply log level: {}", e)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_directives() {
        assert_eq!(
            directives("debug"),
            "bsa_cs=debug,bsa_common=debug,tower_http=debug"
        );
    }
}
