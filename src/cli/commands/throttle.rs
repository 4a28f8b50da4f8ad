use clap::{Arg, Command};

pub const ARG_MAX_ATTEMPTS: &str = "max-login-attempts";
pub const ARG_WINDOW_SECONDS: &str = "login-window-seconds";
pub const ARG_SWEEP_INTERVAL_SECONDS: &str = "throttle-sweep-interval-seconds";

#[must_use]
pub fn with_args(command: Command) -> Command {
    command
        .arg(
            Arg::new(ARG_MAX_ATTEMPTS)
                .long(ARG_MAX_ATTEMPTS)
                .help("Maximum login attempts per client/account key within one window")
                .env("GATEHOUSE_MAX_LOGIN_ATTEMPTS")
                .default_value("10")
                .value_parser(clap::value_parser!(u32)),
        )
        .arg(
            Arg::new(ARG_WINDOW_SECONDS)
                .long(ARG_WINDOW_SECONDS)
                .help("Fixed window length for the login throttle in seconds")
                .env("GATEHOUSE_LOGIN_WINDOW_SECONDS")
                .default_value("900")
                .value_parser(clap::value_parser!(u64)),
        )
        .arg(
            Arg::new(ARG_SWEEP_INTERVAL_SECONDS)
                .long(ARG_SWEEP_INTERVAL_SECONDS)
                .help("Interval between sweeps of expired throttle records in seconds")
                .env("GATEHOUSE_THROTTLE_SWEEP_INTERVAL_SECONDS")
                .default_value("300")
                .value_parser(clap::value_parser!(u64)),
        )
}
