use clap::{
    Arg, ArgAction, ColorChoice, Command,
    builder::styling::{AnsiColor, Effects, Styles},
};

/// Pure clap command definitions with zero business logic
#[must_use]
pub fn new() -> Command {
    let styles = Styles::styled()
        .header(AnsiColor::Yellow.on_default() | Effects::BOLD)
        .usage(AnsiColor::Green.on_default() | Effects::BOLD)
        .literal(AnsiColor::Blue.on_default() | Effects::BOLD)
        .placeholder(AnsiColor::Green.on_default());

    Command::new(env!("CARGO_PKG_NAME"))
        .about(env!("CARGO_PKG_DESCRIPTION"))
        .version(env!("CARGO_PKG_VERSION"))
        .color(ColorChoice::Auto)
        .styles(styles)
        .arg(
            Arg::new("settings")
                .default_value("settings.json")
                .env("CERTPULSE_SETTINGS")
                .help("path to the JSON settings file")
                .long("settings")
                .long_help(
                    "Path to the JSON settings file:\n\n\
                    {\n  \
                      \"SendGrid\": \"<api key>\",\n  \
                      \"Sites\": [\"https://example.com\"],\n  \
                      \"From\": { \"Email\": \"certs@example.com\", \"DisplayName\": \"Certificates\" },\n  \
                      \"To\": [{ \"Email\": \"ops@example.com\", \"DisplayName\": \"Ops\" }]\n\
                    }",
                )
                .short('s')
                .value_name("PATH"),
        )
        .arg(
            Arg::new("concurrency")
                .default_value("4")
                .env("CERTPULSE_CONCURRENCY")
                .help("number of sites inspected at the same time")
                .long("concurrency")
                .short('c')
                .value_parser(clap::value_parser!(u8).range(1..)),
        )
        .arg(
            Arg::new("timeout")
                .default_value("10")
                .env("CERTPULSE_TIMEOUT")
                .help("seconds allowed per site for connect, handshake and fetch")
                .long("timeout")
                .short('t')
                .value_parser(clap::value_parser!(u16).range(1..)),
        )
        .arg(
            Arg::new("subject")
                .default_value("Status for certificates")
                .env("CERTPULSE_SUBJECT")
                .help("subject line of the report email")
                .long("subject"),
        )
        .arg(
            Arg::new("dry-run")
                .action(ArgAction::SetTrue)
                .help("print the report to stdout instead of sending it")
                .long("dry-run")
                .short('n'),
        )
        .arg(
            Arg::new("verbose")
                .action(ArgAction::Count)
                .help("increase verbosity, -v for debug and -vv for trace")
                .long("verbose")
                .short('v'),
        )
}
