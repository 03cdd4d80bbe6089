use tracing_subscriber::EnvFilter;

/// Default filter directive for the given verbosity flags.
fn directive(verbose: u8, quiet: bool) -> &'static str {
    match (quiet, verbose) {
        (true, _) => "warn",
        (false, 0) => "info",
        (false, 1) => "debug",
        (false, _) => "trace",
    }
}

/// Install the global subscriber. Log output goes to stderr so that command
/// output on stdout stays clean; `RUST_LOG` takes precedence over the flags.
pub fn init(verbose: u8, quiet: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(directive(verbose, quiet)));
    tracing_subscriber::fmt().with_env_filter(filter).with_writer(std::io::stderr).with_target(verbose > 1).init();
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(0, false, "info")]
    #[case(1, false, "debug")]
    #[case(3, false, "trace")]
    #[case(0, true, "warn")]
    fn test_directive(#[case] verbose: u8, #[case] quiet: bool, #[case] expected: &str) {
        assert_eq!(directive(verbose, quiet), expected);
    }
}
